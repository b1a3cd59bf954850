//! Joins catalog rows into table descriptors.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use super::queries::{self, catalog_query, OWNER_BIND, TABLE_BIND};
use super::{QueryExecutor, Row, RowSet};
use crate::builder::SqlValue;
use crate::config::EngineConfig;
use crate::dialect::{IdentifierKind, IdentifierValidator, ValidIdentifier};
use crate::error::{BuildError, MetadataClass, MetadataError, Operation};
use crate::model::{
    qualify, ColumnDescriptor, ConstraintDescriptor, ConstraintKind, ForeignKeyTarget,
    IndexDescriptor, OnDelete, SchemaModel, TableDescriptor,
};
use crate::types::{CatalogType, NativeType};

type Result<T> = core::result::Result<T, MetadataError>;

/// The condition Oracle generates for a NOT NULL column.
static NOT_NULL_CHECK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*"[^"]+"\s+IS\s+NOT\s+NULL\s*$"#).expect("NOT NULL pattern is valid")
});

/// Reads schema metadata through a [`QueryExecutor`].
///
/// Catalog names are validated in quoted mode so their exact case
/// survives; names Oracle would accept unquoted still render bare.
#[derive(Debug, Clone, Copy)]
pub struct MetadataExtractor<'a> {
    config: &'a EngineConfig,
    validator: IdentifierValidator<'a>,
}

impl<'a> MetadataExtractor<'a> {
    /// Creates an extractor for a configuration.
    #[must_use]
    pub const fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            validator: IdentifierValidator::new(config),
        }
    }

    /// Extracts every table of `schema`.
    ///
    /// Fails as a whole if a row is malformed, names a table the tables
    /// query did not return, or references a column its table lacks.
    pub fn extract<E>(&self, schema: &str, executor: &E) -> Result<SchemaModel>
    where
        E: QueryExecutor + ?Sized,
    {
        let owner = self
            .validator
            .check(schema, IdentifierKind::Schema, Operation::Extract)
            .map_err(MetadataError::InvalidSchema)?;
        info!(schema = %owner, "extracting schema metadata");

        let tables = self.read(&owner, None, executor)?;
        let model = SchemaModel::new(owner.clone(), tables).map_err(|source| {
            MetadataError::Inconsistent {
                schema: owner.name().to_string(),
                table: source.table.clone().unwrap_or_default(),
                source,
            }
        })?;
        info!(schema = %owner, tables = model.len(), "extracted schema metadata");
        Ok(model)
    }

    /// Extracts a single table.
    pub fn extract_table<E>(&self, schema: &str, table: &str, executor: &E) -> Result<TableDescriptor>
    where
        E: QueryExecutor + ?Sized,
    {
        let owner = self
            .validator
            .check(schema, IdentifierKind::Schema, Operation::Extract)
            .map_err(MetadataError::InvalidSchema)?;
        let name = self
            .validator
            .check(table, IdentifierKind::Table, Operation::Extract)
            .map_err(|source| MetadataError::InvalidName {
                schema: owner.name().to_string(),
                class: MetadataClass::Tables,
                source,
            })?;
        info!(schema = %owner, table = %name, "extracting table metadata");

        self.read(&owner, Some(&name), executor)?
            .into_iter()
            .find(|t| t.name() == &name)
            .ok_or_else(|| MetadataError::TableNotFound {
                schema: owner.name().to_string(),
                table: name.name().to_string(),
            })
    }

    fn read<E>(
        &self,
        owner: &ValidIdentifier,
        table: Option<&ValidIdentifier>,
        executor: &E,
    ) -> Result<Vec<TableDescriptor>>
    where
        E: QueryExecutor + ?Sized,
    {
        let schema = owner.name();
        let mut binds = vec![(OWNER_BIND.to_string(), SqlValue::Text(schema.to_string()))];
        if let Some(table) = table {
            binds.push((TABLE_BIND.to_string(), SqlValue::Text(table.name().to_string())));
        }
        let run = |class: MetadataClass| -> Result<RowSet> {
            let sql = catalog_query(class, table.is_some());
            debug!(class = %class, sql = %sql, "running catalog query");
            let rows = executor
                .execute(&sql, &binds)
                .map_err(|source| MetadataError::Execution {
                    schema: schema.to_string(),
                    class,
                    source,
                })?;
            debug!(class = %class, rows = rows.len(), "catalog query returned");
            Ok(rows)
        };

        let mut entries = BTreeMap::new();
        let class = MetadataClass::Tables;
        for (index, row) in run(class)?.rows().iter().enumerate() {
            let cells = Cells::new(schema, class, index, row);
            let raw = cells.text(queries::tables::TABLE_NAME, "TABLE_NAME")?;
            let name = self.catalog_name(schema, class, raw, IdentifierKind::Table)?;
            let comment = cells.optional_text(queries::tables::COMMENTS, "COMMENTS")?;
            entries.insert(raw.to_string(), TableEntry::new(name, comment));
        }

        self.read_columns(schema, &run(MetadataClass::Columns)?, &mut entries)?;
        self.read_constraints(schema, &run(MetadataClass::Constraints)?, &mut entries)?;
        self.read_indexes(schema, &run(MetadataClass::Indexes)?, &mut entries)?;

        entries
            .into_iter()
            .map(|(raw, entry)| {
                let counts = (entry.columns.len(), entry.constraints.len(), entry.indexes.len());
                let table = entry.into_table(self.config, owner).map_err(|source| {
                    MetadataError::Inconsistent {
                        schema: schema.to_string(),
                        table: raw.clone(),
                        source,
                    }
                })?;
                debug!(
                    table = %table.qualified_name(),
                    columns = counts.0,
                    constraints = counts.1,
                    indexes = counts.2,
                    "assembled table"
                );
                Ok(table)
            })
            .collect()
    }

    fn read_columns(
        &self,
        schema: &str,
        rows: &RowSet,
        entries: &mut BTreeMap<String, TableEntry>,
    ) -> Result<()> {
        use queries::columns as col;
        let class = MetadataClass::Columns;

        for (index, row) in rows.rows().iter().enumerate() {
            let cells = Cells::new(schema, class, index, row);
            let table = cells.text(col::TABLE_NAME, "TABLE_NAME")?;
            let raw = cells.text(col::COLUMN_NAME, "COLUMN_NAME")?;
            let entry = entries
                .get_mut(table)
                .ok_or_else(|| unknown_table(schema, class, table, raw))?;

            let name = self.catalog_name(schema, class, raw, IdentifierKind::Column)?;
            let native_type = NativeType::from_catalog(&CatalogType {
                data_type: cells.text(col::DATA_TYPE, "DATA_TYPE")?,
                data_length: cells.optional_int(col::DATA_LENGTH, "DATA_LENGTH")?,
                data_precision: cells.optional_int(col::DATA_PRECISION, "DATA_PRECISION")?,
                data_scale: cells.optional_int(col::DATA_SCALE, "DATA_SCALE")?,
                char_length: cells.optional_int(col::CHAR_LENGTH, "CHAR_LENGTH")?,
                char_used: cells.optional_text(col::CHAR_USED, "CHAR_USED")?,
            });
            let position = cells.int(col::COLUMN_ID, "COLUMN_ID")?;
            let position = u32::try_from(position)
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| cells.malformed("COLUMN_ID", format!("invalid position {position}")))?;
            let nullable = cells.optional_text(col::NULLABLE, "NULLABLE")? != Some("N");

            let mut column = ColumnDescriptor::new(name, native_type)
                .with_nullable(nullable)
                .with_ordinal_position(position);
            // DATA_DEFAULT keeps the whitespace of the original DDL.
            if let Some(default) = cells
                .optional_text(col::DATA_DEFAULT, "DATA_DEFAULT")?
                .map(str::trim)
                .filter(|d| !d.is_empty())
            {
                column = column.with_default(default);
            }
            if let Some(comment) = cells.optional_text(col::COMMENTS, "COMMENTS")? {
                column = column.with_comment(comment);
            }
            entry.columns.push(column);
        }
        Ok(())
    }

    fn read_constraints(
        &self,
        schema: &str,
        rows: &RowSet,
        entries: &mut BTreeMap<String, TableEntry>,
    ) -> Result<()> {
        use queries::constraints as col;
        let class = MetadataClass::Constraints;

        for (index, row) in rows.rows().iter().enumerate() {
            let cells = Cells::new(schema, class, index, row);
            let table = cells.text(col::TABLE_NAME, "TABLE_NAME")?;
            let raw = cells.text(col::CONSTRAINT_NAME, "CONSTRAINT_NAME")?;
            let entry = entries
                .get_mut(table)
                .ok_or_else(|| unknown_table(schema, class, table, raw))?;

            let column = cells.text(col::COLUMN_NAME, "COLUMN_NAME")?;
            let column = self.catalog_name(schema, class, column, IdentifierKind::Column)?;
            let target_column = cells
                .optional_text(col::R_COLUMN_NAME, "R_COLUMN_NAME")?
                .map(|c| self.catalog_name(schema, class, c, IdentifierKind::Column))
                .transpose()?;

            if let Some(pending) = entry.constraints.iter_mut().find(|p| p.name.name() == raw) {
                pending.columns.push(column);
                pending.target_columns.extend(target_column);
                continue;
            }

            let name = self.catalog_name(schema, class, raw, IdentifierKind::Constraint)?;
            let kind = match cells.text(col::CONSTRAINT_TYPE, "CONSTRAINT_TYPE")? {
                "P" => PendingKind::PrimaryKey,
                "U" => PendingKind::Unique,
                "R" => {
                    let target_schema = cells
                        .optional_text(col::R_OWNER, "R_OWNER")?
                        .map(|s| self.catalog_name(schema, class, s, IdentifierKind::Schema))
                        .transpose()?;
                    let target_table = cells.text(col::R_TABLE_NAME, "R_TABLE_NAME")?;
                    PendingKind::ForeignKey {
                        schema: target_schema,
                        table: self.catalog_name(schema, class, target_table, IdentifierKind::Table)?,
                        on_delete: OnDelete::from_catalog(
                            cells
                                .optional_text(col::DELETE_RULE, "DELETE_RULE")?
                                .unwrap_or_default(),
                        ),
                    }
                }
                "C" => {
                    let condition = cells.text(col::SEARCH_CONDITION, "SEARCH_CONDITION")?;
                    let generated = cells.optional_text(col::GENERATED, "GENERATED")?
                        == Some("GENERATED NAME");
                    PendingKind::Check {
                        condition: condition.trim().to_string(),
                        not_null: generated && NOT_NULL_CHECK.is_match(condition),
                    }
                }
                other => {
                    return Err(cells.malformed(
                        "CONSTRAINT_TYPE",
                        format!("unsupported constraint type {other:?}"),
                    ))
                }
            };
            let enabled = cells.optional_text(col::STATUS, "STATUS")? != Some("DISABLED");

            entry.constraints.push(PendingConstraint {
                name,
                kind,
                enabled,
                columns: vec![column],
                target_columns: target_column.into_iter().collect(),
            });
        }
        Ok(())
    }

    fn read_indexes(
        &self,
        schema: &str,
        rows: &RowSet,
        entries: &mut BTreeMap<String, TableEntry>,
    ) -> Result<()> {
        use queries::indexes as col;
        let class = MetadataClass::Indexes;

        for (index, row) in rows.rows().iter().enumerate() {
            let cells = Cells::new(schema, class, index, row);
            let table = cells.text(col::TABLE_NAME, "TABLE_NAME")?;
            let raw = cells.text(col::INDEX_NAME, "INDEX_NAME")?;
            let entry = entries
                .get_mut(table)
                .ok_or_else(|| unknown_table(schema, class, table, raw))?;

            let column = cells.text(col::COLUMN_NAME, "COLUMN_NAME")?;
            let column = self.catalog_name(schema, class, column, IdentifierKind::Column)?;
            if let Some(pending) = entry.indexes.iter_mut().find(|p| p.name.name() == raw) {
                pending.columns.push(column);
                continue;
            }

            let name = self.catalog_name(schema, class, raw, IdentifierKind::Index)?;
            let tablespace = cells
                .optional_text(col::TABLESPACE_NAME, "TABLESPACE_NAME")?
                .map(|ts| self.catalog_name(schema, class, ts, IdentifierKind::Tablespace))
                .transpose()?;
            entry.indexes.push(PendingIndex {
                name,
                columns: vec![column],
                unique: cells.optional_text(col::UNIQUENESS, "UNIQUENESS")? == Some("UNIQUE"),
                tablespace,
                parallel_degree: cells.degree(col::DEGREE, "DEGREE")?,
            });
        }
        Ok(())
    }

    /// Validates a catalog name, keeping its exact case.
    fn catalog_name(
        &self,
        schema: &str,
        class: MetadataClass,
        raw: &str,
        kind: IdentifierKind,
    ) -> Result<ValidIdentifier> {
        let quoted = format!("\"{}\"", raw.replace('"', "\"\""));
        self.validator
            .check(&quoted, kind, Operation::Extract)
            .map_err(|source| MetadataError::InvalidName {
                schema: schema.to_string(),
                class,
                source,
            })
    }
}

fn unknown_table(schema: &str, class: MetadataClass, table: &str, object: &str) -> MetadataError {
    MetadataError::UnknownTable {
        schema: schema.to_string(),
        class,
        table: table.to_string(),
        object: object.to_string(),
    }
}

/// Typed access to one catalog row.
struct Cells<'r> {
    schema: &'r str,
    class: MetadataClass,
    index: usize,
    row: &'r Row,
}

impl<'r> Cells<'r> {
    const fn new(schema: &'r str, class: MetadataClass, index: usize, row: &'r Row) -> Self {
        Self {
            schema,
            class,
            index,
            row,
        }
    }

    fn malformed(&self, column: &'static str, reason: impl Into<String>) -> MetadataError {
        MetadataError::MalformedRow {
            schema: self.schema.to_string(),
            class: self.class,
            row: self.index,
            column,
            reason: reason.into(),
        }
    }

    fn value(&self, at: usize, column: &'static str) -> Result<&'r SqlValue> {
        self.row
            .get(at)
            .ok_or_else(|| self.malformed(column, format!("row has only {} values", self.row.len())))
    }

    /// Text or NULL. Oracle makes no difference between an empty string
    /// and NULL, so neither do we.
    fn optional_text(&self, at: usize, column: &'static str) -> Result<Option<&'r str>> {
        match self.value(at, column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(text) if text.is_empty() => Ok(None),
            SqlValue::Text(text) => Ok(Some(text.as_str())),
            other => Err(self.malformed(column, format!("expected text, found {other:?}"))),
        }
    }

    fn text(&self, at: usize, column: &'static str) -> Result<&'r str> {
        self.optional_text(at, column)?
            .ok_or_else(|| self.malformed(column, "value is missing"))
    }

    /// Integer, NULL, or a number the driver handed over as float or text.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    fn optional_int(&self, at: usize, column: &'static str) -> Result<Option<i64>> {
        match self.value(at, column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Int(n) => Ok(Some(*n)),
            SqlValue::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(Some(*f as i64)),
            SqlValue::Text(text) if text.trim().is_empty() => Ok(None),
            SqlValue::Text(text) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.malformed(column, format!("expected a number, found {text:?}"))),
            other => Err(self.malformed(column, format!("expected a number, found {other:?}"))),
        }
    }

    fn int(&self, at: usize, column: &'static str) -> Result<i64> {
        self.optional_int(at, column)?
            .ok_or_else(|| self.malformed(column, "value is missing"))
    }

    /// `ALL_INDEXES.DEGREE`: a number, or `DEFAULT`. Degree 1 is serial.
    fn degree(&self, at: usize, column: &'static str) -> Result<Option<u32>> {
        let degree = match self.value(at, column)? {
            SqlValue::Text(text) if text.trim().eq_ignore_ascii_case("DEFAULT") => None,
            _ => self.optional_int(at, column)?,
        };
        Ok(degree
            .and_then(|d| u32::try_from(d).ok())
            .filter(|d| *d > 1))
    }
}

enum PendingKind {
    PrimaryKey,
    Unique,
    ForeignKey {
        schema: Option<ValidIdentifier>,
        table: ValidIdentifier,
        on_delete: OnDelete,
    },
    Check {
        condition: String,
        not_null: bool,
    },
}

struct PendingConstraint {
    name: ValidIdentifier,
    kind: PendingKind,
    enabled: bool,
    columns: Vec<ValidIdentifier>,
    target_columns: Vec<ValidIdentifier>,
}

struct PendingIndex {
    name: ValidIdentifier,
    columns: Vec<ValidIdentifier>,
    unique: bool,
    tablespace: Option<ValidIdentifier>,
    parallel_degree: Option<u32>,
}

/// Everything read for one table before it is assembled.
struct TableEntry {
    name: ValidIdentifier,
    comment: Option<String>,
    columns: Vec<ColumnDescriptor>,
    constraints: Vec<PendingConstraint>,
    indexes: Vec<PendingIndex>,
}

impl TableEntry {
    fn new(name: ValidIdentifier, comment: Option<&str>) -> Self {
        Self {
            name,
            comment: comment.map(String::from),
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
        }
    }

    fn into_table(
        self,
        config: &EngineConfig,
        owner: &ValidIdentifier,
    ) -> core::result::Result<TableDescriptor, BuildError> {
        let qualified = qualify(Some(owner), &self.name);
        let mut builder = TableDescriptor::builder_for(config, Some(owner.clone()), self.name);
        for column in self.columns {
            builder = builder.add_column(column);
        }

        for pending in self.constraints {
            let kind = match pending.kind {
                PendingKind::PrimaryKey => ConstraintKind::PrimaryKey,
                PendingKind::Unique => ConstraintKind::Unique,
                PendingKind::ForeignKey {
                    schema,
                    table,
                    on_delete,
                } => ConstraintKind::ForeignKey {
                    target: ForeignKeyTarget::new(schema, table, pending.target_columns),
                    on_delete,
                },
                PendingKind::Check {
                    not_null: true,
                    condition,
                } => {
                    warn!(
                        table = %qualified,
                        constraint = %pending.name,
                        condition = %condition,
                        "skipping generated NOT NULL check, kept as column nullability"
                    );
                    continue;
                }
                PendingKind::Check { condition, .. } => ConstraintKind::Check { condition },
            };
            builder = builder.add_constraint(
                ConstraintDescriptor::new(pending.name, kind, pending.columns)
                    .with_enabled(pending.enabled),
            );
        }

        for pending in self.indexes {
            let mut index = IndexDescriptor::new(pending.name, pending.columns).with_unique(pending.unique);
            if let Some(tablespace) = pending.tablespace {
                index = index.with_tablespace(tablespace);
            }
            if let Some(degree) = pending.parallel_degree {
                index = index.with_parallel_degree(degree);
            }
            builder = builder.add_index(index);
        }

        if let Some(comment) = self.comment {
            builder = builder.comment(comment);
        }
        builder.assemble()
    }
}
