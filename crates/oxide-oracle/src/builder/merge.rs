//! MERGE (upsert) construction.

use crate::dialect::IdentifierKind;
use crate::error::{BuildError, BuildIssue, Operation, Result};
use crate::model::{qualify, ColumnDescriptor, TableDescriptor};

use super::{BindParameter, BindRole, BuiltStatement, StatementBuilder, StatementKind};

/// Alias of the merge target.
const TARGET: &str = "TGT";
/// Alias of the merge source.
const SOURCE: &str = "SRC";

/// Where merged rows come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MergeSource {
    /// One row of bind values, selected from DUAL.
    #[default]
    Binds,
    /// Another table, such as a staging table.
    Table {
        /// Owning schema of the source table.
        schema: Option<String>,
        /// Source table name.
        table: String,
    },
}

/// A MERGE request.
///
/// Rows are matched on `match_on` columns. Matched rows have their
/// `update` columns overwritten, unmatched rows are inserted with their
/// `insert` columns. Either branch may be left empty, not both.
#[derive(Debug, Clone)]
pub struct MergeConfig<'t> {
    target: &'t TableDescriptor,
    source: MergeSource,
    source_columns: Vec<String>,
    match_columns: Vec<String>,
    update_columns: Vec<String>,
    insert_columns: Vec<String>,
}

fn owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| String::from(*c)).collect()
}

impl<'t> MergeConfig<'t> {
    /// Starts a merge into `target` from bind values.
    #[must_use]
    pub const fn new(target: &'t TableDescriptor) -> Self {
        Self {
            target,
            source: MergeSource::Binds,
            source_columns: Vec::new(),
            match_columns: Vec::new(),
            update_columns: Vec::new(),
            insert_columns: Vec::new(),
        }
    }

    /// Sets the source.
    #[must_use]
    pub fn source(mut self, source: MergeSource) -> Self {
        self.source = source;
        self
    }

    /// Merges from a table instead of bind values.
    #[must_use]
    pub fn source_table(self, schema: Option<&str>, table: &str) -> Self {
        self.source(MergeSource::Table {
            schema: schema.map(String::from),
            table: String::from(table),
        })
    }

    /// Lists the columns the source provides.
    ///
    /// Defaults to every column named by the other lists.
    #[must_use]
    pub fn source_columns(mut self, columns: &[&str]) -> Self {
        self.source_columns = owned(columns);
        self
    }

    /// Sets the columns rows are matched on.
    #[must_use]
    pub fn match_on(mut self, columns: &[&str]) -> Self {
        self.match_columns = owned(columns);
        self
    }

    /// Sets the columns overwritten in matched rows.
    #[must_use]
    pub fn update(mut self, columns: &[&str]) -> Self {
        self.update_columns = owned(columns);
        self
    }

    /// Sets the columns written for unmatched rows.
    #[must_use]
    pub fn insert(mut self, columns: &[&str]) -> Self {
        self.insert_columns = owned(columns);
        self
    }
}

fn borrowed(columns: &[String]) -> Vec<&str> {
    columns.iter().map(String::as_str).collect()
}

fn contains(columns: &[&ColumnDescriptor], column: &ColumnDescriptor) -> bool {
    columns.iter().any(|c| c.name() == column.name())
}

impl StatementBuilder<'_> {
    /// Builds a MERGE.
    ///
    /// ```text
    /// MERGE INTO T TGT USING (SELECT :K AS K, ... FROM DUAL) SRC
    /// ON (TGT.K = SRC.K)
    /// WHEN MATCHED THEN UPDATE SET TGT.A = SRC.A
    /// WHEN NOT MATCHED THEN INSERT (K, A) VALUES (SRC.K, SRC.A)
    /// ```
    pub fn build_merge(&self, config: &MergeConfig<'_>) -> Result<BuiltStatement> {
        let op = Operation::Merge;
        let table = config.target;
        let fail = |issue| BuildError::new(op, table.qualified_name(), issue);

        if config.match_columns.is_empty() {
            return Err(fail(BuildIssue::NoMatchColumns).into());
        }
        if config.update_columns.is_empty() && config.insert_columns.is_empty() {
            return Err(fail(BuildIssue::EmptyMerge).into());
        }

        let keys = self.resolve(table, &borrowed(&config.match_columns), op)?;
        let updates = self.resolve(table, &borrowed(&config.update_columns), op)?;
        let inserts = self.resolve(table, &borrowed(&config.insert_columns), op)?;
        if let Some(column) = updates.iter().find(|c| contains(&keys, c)) {
            return Err(fail(BuildIssue::UpdatesMatchColumn(column.name().as_sql())).into());
        }

        let source_columns = if config.source_columns.is_empty() {
            table
                .columns()
                .iter()
                .filter(|c| contains(&keys, c) || contains(&updates, c) || contains(&inserts, c))
                .collect()
        } else {
            self.resolve(table, &borrowed(&config.source_columns), op)?
        };
        if let Some(missing) = keys
            .iter()
            .chain(&updates)
            .chain(&inserts)
            .find(|c| !contains(&source_columns, c))
        {
            return Err(fail(BuildIssue::NotInSource(missing.name().as_sql())).into());
        }

        let mut binds = Vec::new();
        let using = match &config.source {
            MergeSource::Binds => {
                let mut names = self.bind_names();
                let selected: Vec<String> = source_columns
                    .iter()
                    .copied()
                    .map(|c| {
                        let bind = names.allocate(c.name().name(), "");
                        let item = format!(":{bind} AS {}", c.name());
                        binds.push(BindParameter::new(bind, Some(c), BindRole::Value));
                        item
                    })
                    .collect();
                format!("(SELECT {} FROM DUAL)", selected.join(", "))
            }
            MergeSource::Table { schema, table: name } => {
                let validator = self.validator();
                let schema = schema
                    .as_deref()
                    .map(|s| validator.check(s, IdentifierKind::Schema, op))
                    .transpose()?;
                let name = validator.check(name, IdentifierKind::Table, op)?;
                qualify(schema.as_ref(), &name)
            }
        };

        let on: Vec<String> = keys
            .iter()
            .map(|c| format!("{TARGET}.{0} = {SOURCE}.{0}", c.name()))
            .collect();
        let mut sql = format!(
            "MERGE INTO {} {TARGET} USING {using} {SOURCE} ON ({})",
            table.qualified_name(),
            on.join(" AND ")
        );

        if !updates.is_empty() {
            let set: Vec<String> = updates
                .iter()
                .map(|c| format!("{TARGET}.{0} = {SOURCE}.{0}", c.name()))
                .collect();
            sql.push_str(&format!(" WHEN MATCHED THEN UPDATE SET {}", set.join(", ")));
        }
        if !inserts.is_empty() {
            let values: Vec<String> = inserts
                .iter()
                .map(|c| format!("{SOURCE}.{}", c.name()))
                .collect();
            sql.push_str(&format!(
                " WHEN NOT MATCHED THEN INSERT ({}) VALUES ({})",
                super::column_list(&inserts),
                values.join(", ")
            ));
        }

        Ok(BuiltStatement::new(StatementKind::Merge, sql, binds))
    }
}
