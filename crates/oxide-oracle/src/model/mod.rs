//! The metadata model: schemas, tables, columns, constraints and indexes.
//!
//! Descriptors are immutable once built. [`TableBuilder`] checks every
//! structural invariant before handing out a [`TableDescriptor`], so code
//! that receives one can rely on it:
//!
//! - column names are unique and ordinals run from 1 without gaps,
//! - at most one primary key exists,
//! - every constraint and index names at least one column, all of which
//!   exist on the table,
//! - foreign keys reference as many columns as they declare.
//!
//! # Example
//!
//! ```rust
//! use oxide_oracle::config::EngineConfig;
//! use oxide_oracle::model::{ColumnSpec, TableDescriptor};
//! use oxide_oracle::types::NativeType;
//!
//! let config = EngineConfig::default();
//! let table = TableDescriptor::builder(&config, Some("hr"), "employees")
//!     .column(ColumnSpec::new("employee_id", NativeType::number(6, 0)).not_null())
//!     .column(ColumnSpec::new("last_name", NativeType::varchar2(25)).not_null())
//!     .primary_key("emp_emp_id_pk", &["employee_id"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(table.qualified_name(), "HR.EMPLOYEES");
//! assert_eq!(table.columns()[1].ordinal_position(), 2);
//! ```

use std::collections::{BTreeMap, HashSet};

use crate::config::EngineConfig;
use crate::dialect::{IdentifierKind, IdentifierValidator, ValidIdentifier};
use crate::error::{BuildError, BuildIssue, Error, InvalidIdentifierError, Operation, Result};
use crate::types::NativeType;

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    name: ValidIdentifier,
    native_type: NativeType,
    nullable: bool,
    default_value: Option<String>,
    ordinal_position: u32,
    comment: Option<String>,
}

impl ColumnDescriptor {
    /// Creates a nullable column without default or comment.
    ///
    /// An ordinal position of zero asks the table builder to assign one.
    #[must_use]
    pub const fn new(name: ValidIdentifier, native_type: NativeType) -> Self {
        Self {
            name,
            native_type,
            nullable: true,
            default_value: None,
            ordinal_position: 0,
            comment: None,
        }
    }

    /// Sets nullability.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets the default expression (catalog text, emitted verbatim in DDL).
    #[must_use]
    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default_value = Some(expression.into());
        self
    }

    /// Sets the ordinal position.
    #[must_use]
    pub fn with_ordinal_position(mut self, position: u32) -> Self {
        self.ordinal_position = position;
        self
    }

    /// Sets the column comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// The column name.
    #[must_use]
    pub const fn name(&self) -> &ValidIdentifier {
        &self.name
    }

    /// The Oracle column type.
    #[must_use]
    pub const fn native_type(&self) -> &NativeType {
        &self.native_type
    }

    /// Whether the column accepts NULL.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The default expression, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// 1-based position within the table.
    #[must_use]
    pub const fn ordinal_position(&self) -> u32 {
        self.ordinal_position
    }

    /// The column comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// The referential action of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OnDelete {
    /// Reject deletes of referenced rows.
    #[default]
    NoAction,
    /// Delete referencing rows.
    Cascade,
    /// Set referencing columns to NULL.
    SetNull,
}

impl OnDelete {
    /// Parses the `DELETE_RULE` column of `ALL_CONSTRAINTS`.
    #[must_use]
    pub fn from_catalog(rule: &str) -> Self {
        match rule.trim().to_ascii_uppercase().as_str() {
            "CASCADE" => Self::Cascade,
            "SET NULL" => Self::SetNull,
            _ => Self::NoAction,
        }
    }

    /// The DDL clause, or `None` for the default action.
    #[must_use]
    pub const fn as_sql(self) -> Option<&'static str> {
        match self {
            Self::NoAction => None,
            Self::Cascade => Some("ON DELETE CASCADE"),
            Self::SetNull => Some("ON DELETE SET NULL"),
        }
    }
}

/// The table and columns a foreign key references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyTarget {
    schema: Option<ValidIdentifier>,
    table: ValidIdentifier,
    columns: Vec<ValidIdentifier>,
}

impl ForeignKeyTarget {
    /// Creates a target.
    #[must_use]
    pub const fn new(
        schema: Option<ValidIdentifier>,
        table: ValidIdentifier,
        columns: Vec<ValidIdentifier>,
    ) -> Self {
        Self {
            schema,
            table,
            columns,
        }
    }

    /// The referenced schema.
    #[must_use]
    pub const fn schema(&self) -> Option<&ValidIdentifier> {
        self.schema.as_ref()
    }

    /// The referenced table.
    #[must_use]
    pub const fn table(&self) -> &ValidIdentifier {
        &self.table
    }

    /// The referenced columns, in key order.
    #[must_use]
    pub fn columns(&self) -> &[ValidIdentifier] {
        &self.columns
    }

    /// The referenced table as SQL text.
    #[must_use]
    pub fn qualified_table(&self) -> String {
        qualify(self.schema.as_ref(), &self.table)
    }
}

/// What a constraint enforces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    /// PRIMARY KEY.
    PrimaryKey,
    /// UNIQUE.
    Unique,
    /// FOREIGN KEY ... REFERENCES.
    ForeignKey {
        /// Referenced table and columns.
        target: ForeignKeyTarget,
        /// Referential action.
        on_delete: OnDelete,
    },
    /// CHECK (condition).
    Check {
        /// The condition text.
        condition: String,
    },
}

impl ConstraintKind {
    /// A short name for logs and errors.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryKey => "primary key",
            Self::Unique => "unique",
            Self::ForeignKey { .. } => "foreign key",
            Self::Check { .. } => "check",
        }
    }
}

/// A named table constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintDescriptor {
    name: ValidIdentifier,
    kind: ConstraintKind,
    columns: Vec<ValidIdentifier>,
    enabled: bool,
}

impl ConstraintDescriptor {
    /// Creates an enabled constraint.
    #[must_use]
    pub const fn new(name: ValidIdentifier, kind: ConstraintKind, columns: Vec<ValidIdentifier>) -> Self {
        Self {
            name,
            kind,
            columns,
            enabled: true,
        }
    }

    /// Sets whether the constraint is enabled.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The constraint name.
    #[must_use]
    pub const fn name(&self) -> &ValidIdentifier {
        &self.name
    }

    /// The constraint kind.
    #[must_use]
    pub const fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    /// The constrained columns, in key order.
    #[must_use]
    pub fn columns(&self) -> &[ValidIdentifier] {
        &self.columns
    }

    /// Whether the constraint is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns true for a primary key.
    #[must_use]
    pub const fn is_primary_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::PrimaryKey)
    }

    /// Returns true for primary key and unique constraints.
    #[must_use]
    pub const fn is_unique_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::PrimaryKey | ConstraintKind::Unique)
    }
}

/// A table index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescriptor {
    name: ValidIdentifier,
    columns: Vec<ValidIdentifier>,
    unique: bool,
    tablespace: Option<ValidIdentifier>,
    parallel_degree: Option<u32>,
}

impl IndexDescriptor {
    /// Creates a non-unique index.
    #[must_use]
    pub const fn new(name: ValidIdentifier, columns: Vec<ValidIdentifier>) -> Self {
        Self {
            name,
            columns,
            unique: false,
            tablespace: None,
            parallel_degree: None,
        }
    }

    /// Sets uniqueness.
    #[must_use]
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Sets the tablespace.
    #[must_use]
    pub fn with_tablespace(mut self, tablespace: ValidIdentifier) -> Self {
        self.tablespace = Some(tablespace);
        self
    }

    /// Sets the PARALLEL degree.
    #[must_use]
    pub fn with_parallel_degree(mut self, degree: u32) -> Self {
        self.parallel_degree = Some(degree);
        self
    }

    /// The index name.
    #[must_use]
    pub const fn name(&self) -> &ValidIdentifier {
        &self.name
    }

    /// The indexed columns, in key order.
    #[must_use]
    pub fn columns(&self) -> &[ValidIdentifier] {
        &self.columns
    }

    /// Whether the index is unique.
    #[must_use]
    pub const fn is_unique(&self) -> bool {
        self.unique
    }

    /// The tablespace, if set.
    #[must_use]
    pub const fn tablespace(&self) -> Option<&ValidIdentifier> {
        self.tablespace.as_ref()
    }

    /// The PARALLEL degree, if set.
    #[must_use]
    pub const fn parallel_degree(&self) -> Option<u32> {
        self.parallel_degree
    }
}

/// A table and everything attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    schema: Option<ValidIdentifier>,
    name: ValidIdentifier,
    columns: Vec<ColumnDescriptor>,
    constraints: Vec<ConstraintDescriptor>,
    indexes: Vec<IndexDescriptor>,
    comment: Option<String>,
}

impl TableDescriptor {
    /// Starts a table from unvalidated names.
    #[must_use]
    pub fn builder<'a>(config: &'a EngineConfig, schema: Option<&str>, table: &str) -> TableBuilder<'a> {
        let validator = IdentifierValidator::new(config);
        let mut pending = None;
        let schema = schema.and_then(|s| {
            validator
                .check(s, IdentifierKind::Schema, Operation::Describe)
                .map_err(|e| pending = Some(e))
                .ok()
        });
        let name = match validator.check(table, IdentifierKind::Table, Operation::Describe) {
            Ok(name) => Some(name),
            Err(e) => {
                pending.get_or_insert(e);
                None
            }
        };
        TableBuilder {
            validator,
            schema,
            name,
            raw_name: table.to_string(),
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            comment: None,
            pending,
        }
    }

    /// Starts a table from names that were already validated.
    #[must_use]
    pub fn builder_for(
        config: &EngineConfig,
        schema: Option<ValidIdentifier>,
        name: ValidIdentifier,
    ) -> TableBuilder<'_> {
        TableBuilder {
            validator: IdentifierValidator::new(config),
            raw_name: name.as_sql(),
            schema,
            name: Some(name),
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            comment: None,
            pending: None,
        }
    }

    /// The owning schema, if qualified.
    #[must_use]
    pub const fn schema(&self) -> Option<&ValidIdentifier> {
        self.schema.as_ref()
    }

    /// The table name.
    #[must_use]
    pub const fn name(&self) -> &ValidIdentifier {
        &self.name
    }

    /// `SCHEMA.TABLE` (or `TABLE`) as SQL text.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualify(self.schema.as_ref(), &self.name)
    }

    /// Columns in ordinal order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Finds a column by name (see [`ValidIdentifier::matches`]).
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name.matches(name))
    }

    /// Finds a column by validated identifier.
    #[must_use]
    pub fn column_by_identifier(&self, name: &ValidIdentifier) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| &c.name == name)
    }

    /// All constraints.
    #[must_use]
    pub fn constraints(&self) -> &[ConstraintDescriptor] {
        &self.constraints
    }

    /// The primary key, if any.
    #[must_use]
    pub fn primary_key(&self) -> Option<&ConstraintDescriptor> {
        self.constraints.iter().find(|c| c.is_primary_key())
    }

    /// All indexes.
    #[must_use]
    pub fn indexes(&self) -> &[IndexDescriptor] {
        &self.indexes
    }

    /// The table comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// Renders `SCHEMA.NAME` or `NAME`.
pub(crate) fn qualify(schema: Option<&ValidIdentifier>, name: &ValidIdentifier) -> String {
    match schema {
        Some(schema) => format!("{schema}.{name}"),
        None => name.as_sql(),
    }
}

/// A column given by unvalidated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    name: String,
    native_type: NativeType,
    nullable: bool,
    default_value: Option<String>,
    ordinal_position: u32,
    comment: Option<String>,
}

impl ColumnSpec {
    /// Creates a nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, native_type: NativeType) -> Self {
        Self {
            name: name.into(),
            native_type,
            nullable: true,
            default_value: None,
            ordinal_position: 0,
            comment: None,
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the default expression.
    #[must_use]
    pub fn default_value(mut self, expression: impl Into<String>) -> Self {
        self.default_value = Some(expression.into());
        self
    }

    /// Sets an explicit ordinal position.
    #[must_use]
    pub fn ordinal_position(mut self, position: u32) -> Self {
        self.ordinal_position = position;
        self
    }

    /// Sets the column comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// A foreign key target given by unvalidated names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySpec {
    schema: Option<String>,
    table: String,
    columns: Vec<String>,
    on_delete: OnDelete,
}

impl ForeignKeySpec {
    /// References `table (columns)`.
    #[must_use]
    pub fn new(table: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            schema: None,
            table: table.into(),
            columns: columns.iter().map(|c| String::from(*c)).collect(),
            on_delete: OnDelete::NoAction,
        }
    }

    /// Qualifies the referenced table.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the referential action.
    #[must_use]
    pub fn on_delete(mut self, action: OnDelete) -> Self {
        self.on_delete = action;
        self
    }
}

/// An index given by unvalidated names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    name: String,
    columns: Vec<String>,
    unique: bool,
    tablespace: Option<String>,
    parallel: Option<u32>,
}

impl IndexSpec {
    /// Creates a non-unique index.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| String::from(*c)).collect(),
            unique: false,
            tablespace: None,
            parallel: None,
        }
    }

    /// Makes the index unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Places the index in a tablespace.
    #[must_use]
    pub fn tablespace(mut self, tablespace: impl Into<String>) -> Self {
        self.tablespace = Some(tablespace.into());
        self
    }

    /// Sets the PARALLEL degree.
    #[must_use]
    pub fn parallel(mut self, degree: u32) -> Self {
        self.parallel = Some(degree);
        self
    }
}

/// Builds a [`TableDescriptor`], validating names as they are added and
/// structural invariants in [`TableBuilder::build`].
///
/// The first invalid name is remembered and reported by `build`.
#[derive(Debug)]
pub struct TableBuilder<'a> {
    validator: IdentifierValidator<'a>,
    schema: Option<ValidIdentifier>,
    name: Option<ValidIdentifier>,
    raw_name: String,
    columns: Vec<ColumnDescriptor>,
    constraints: Vec<ConstraintDescriptor>,
    indexes: Vec<IndexDescriptor>,
    comment: Option<String>,
    pending: Option<InvalidIdentifierError>,
}

impl TableBuilder<'_> {
    fn ident(&mut self, raw: &str, kind: IdentifierKind) -> Option<ValidIdentifier> {
        match self.validator.check(raw, kind, Operation::Describe) {
            Ok(id) => Some(id),
            Err(e) => {
                self.pending.get_or_insert(e);
                None
            }
        }
    }

    fn idents(&mut self, raws: &[&str], kind: IdentifierKind) -> Option<Vec<ValidIdentifier>> {
        raws.iter().map(|raw| self.ident(raw, kind)).collect()
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, spec: ColumnSpec) -> Self {
        if let Some(name) = self.ident(&spec.name, IdentifierKind::Column) {
            let mut column = ColumnDescriptor::new(name, spec.native_type)
                .with_nullable(spec.nullable)
                .with_ordinal_position(spec.ordinal_position);
            column.default_value = spec.default_value;
            column.comment = spec.comment;
            self.columns.push(column);
        }
        self
    }

    /// Adds an already validated column.
    #[must_use]
    pub fn add_column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a primary key.
    #[must_use]
    pub fn primary_key(self, name: &str, columns: &[&str]) -> Self {
        self.keyed_constraint(name, ConstraintKind::PrimaryKey, columns)
    }

    /// Adds a unique constraint.
    #[must_use]
    pub fn unique(self, name: &str, columns: &[&str]) -> Self {
        self.keyed_constraint(name, ConstraintKind::Unique, columns)
    }

    /// Adds a check constraint over `columns`.
    #[must_use]
    pub fn check(self, name: &str, condition: &str, columns: &[&str]) -> Self {
        self.keyed_constraint(
            name,
            ConstraintKind::Check {
                condition: condition.to_string(),
            },
            columns,
        )
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, name: &str, columns: &[&str], target: ForeignKeySpec) -> Self {
        let schema = match target.schema.as_deref() {
            Some(s) => match self.ident(s, IdentifierKind::Schema) {
                Some(id) => Some(id),
                None => return self,
            },
            None => None,
        };
        let Some(table) = self.ident(&target.table, IdentifierKind::Table) else {
            return self;
        };
        let target_columns: Vec<&str> = target.columns.iter().map(String::as_str).collect();
        let Some(target_columns) = self.idents(&target_columns, IdentifierKind::Column) else {
            return self;
        };
        self.keyed_constraint(
            name,
            ConstraintKind::ForeignKey {
                target: ForeignKeyTarget::new(schema, table, target_columns),
                on_delete: target.on_delete,
            },
            columns,
        )
    }

    fn keyed_constraint(mut self, name: &str, kind: ConstraintKind, columns: &[&str]) -> Self {
        let name = self.ident(name, IdentifierKind::Constraint);
        let columns = self.idents(columns, IdentifierKind::Column);
        if let (Some(name), Some(columns)) = (name, columns) {
            self.constraints
                .push(ConstraintDescriptor::new(name, kind, columns));
        }
        self
    }

    /// Adds an already validated constraint.
    #[must_use]
    pub fn add_constraint(mut self, constraint: ConstraintDescriptor) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, spec: IndexSpec) -> Self {
        let name = self.ident(&spec.name, IdentifierKind::Index);
        let columns: Vec<&str> = spec.columns.iter().map(String::as_str).collect();
        let columns = self.idents(&columns, IdentifierKind::Column);
        let tablespace = match spec.tablespace.as_deref() {
            Some(ts) => match self.ident(ts, IdentifierKind::Tablespace) {
                Some(id) => Some(id),
                None => return self,
            },
            None => None,
        };
        if let (Some(name), Some(columns)) = (name, columns) {
            let mut index = IndexDescriptor::new(name, columns).with_unique(spec.unique);
            index.tablespace = tablespace;
            index.parallel_degree = spec.parallel;
            self.indexes.push(index);
        }
        self
    }

    /// Adds an already validated index.
    #[must_use]
    pub fn add_index(mut self, index: IndexDescriptor) -> Self {
        self.indexes.push(index);
        self
    }

    /// Sets the table comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Validates and returns the table.
    pub fn build(mut self) -> Result<TableDescriptor> {
        if let Some(e) = self.pending.take() {
            return Err(Error::InvalidIdentifier(e));
        }
        Ok(self.assemble()?)
    }

    /// Checks structural invariants. Names are assumed valid.
    pub(crate) fn assemble(self) -> core::result::Result<TableDescriptor, BuildError> {
        let Some(name) = self.name else {
            return Err(BuildError::new(
                Operation::Describe,
                self.raw_name,
                BuildIssue::NoColumns,
            ));
        };
        let table = qualify(self.schema.as_ref(), &name);
        let fail = |issue| BuildError::new(Operation::Describe, table.clone(), issue);

        if self.columns.is_empty() {
            return Err(fail(BuildIssue::NoColumns));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(&column.name) {
                return Err(fail(BuildIssue::DuplicateColumn(column.name.as_sql())));
            }
        }

        let columns = order_columns(self.columns).map_err(&fail)?;
        let has_column = |id: &ValidIdentifier| columns.iter().any(|c| &c.name == id);

        let mut constraint_names = HashSet::new();
        let mut primary_keys = 0;
        for constraint in &self.constraints {
            let cname = constraint.name.as_sql();
            if !constraint_names.insert(&constraint.name) {
                return Err(fail(BuildIssue::DuplicateName {
                    object: "constraint",
                    name: cname,
                }));
            }
            if constraint.is_primary_key() {
                primary_keys += 1;
                if primary_keys > 1 {
                    return Err(fail(BuildIssue::MultiplePrimaryKeys));
                }
            }
            if constraint.columns.is_empty() {
                return Err(fail(BuildIssue::EmptyColumnList {
                    object: "constraint",
                    name: cname,
                }));
            }
            if let Some(missing) = constraint.columns.iter().find(|c| !has_column(*c)) {
                return Err(fail(BuildIssue::DanglingColumn {
                    object: "constraint",
                    name: cname,
                    column: missing.as_sql(),
                }));
            }
            if let ConstraintKind::ForeignKey { target, .. } = &constraint.kind {
                if target.columns.len() != constraint.columns.len() {
                    return Err(fail(BuildIssue::ForeignKeyArity {
                        constraint: cname,
                        local: constraint.columns.len(),
                        target: target.columns.len(),
                    }));
                }
            }
        }

        let mut index_names = HashSet::new();
        for index in &self.indexes {
            let iname = index.name.as_sql();
            if !index_names.insert(&index.name) {
                return Err(fail(BuildIssue::DuplicateName {
                    object: "index",
                    name: iname,
                }));
            }
            if index.columns.is_empty() {
                return Err(fail(BuildIssue::EmptyColumnList {
                    object: "index",
                    name: iname,
                }));
            }
            if let Some(missing) = index.columns.iter().find(|c| !has_column(*c)) {
                return Err(fail(BuildIssue::DanglingColumn {
                    object: "index",
                    name: iname,
                    column: missing.as_sql(),
                }));
            }
            if index.parallel_degree == Some(0) {
                return Err(fail(BuildIssue::InvalidParallelDegree));
            }
        }

        Ok(TableDescriptor {
            schema: self.schema,
            name,
            columns,
            constraints: self.constraints,
            indexes: self.indexes,
            comment: self.comment,
        })
    }
}

/// Sorts columns by ordinal, assigning positions when none were given.
fn order_columns(
    mut columns: Vec<ColumnDescriptor>,
) -> core::result::Result<Vec<ColumnDescriptor>, BuildIssue> {
    let explicit = columns.iter().filter(|c| c.ordinal_position != 0).count();
    if explicit == 0 {
        for (position, column) in (1_u32..).zip(columns.iter_mut()) {
            column.ordinal_position = position;
        }
        return Ok(columns);
    }
    if explicit != columns.len() {
        return Err(BuildIssue::MixedOrdinals);
    }

    columns.sort_by_key(|c| c.ordinal_position);
    for (expected, column) in (1_u32..).zip(&columns) {
        if column.ordinal_position != expected {
            return Err(BuildIssue::OrdinalGap {
                column: column.name.as_sql(),
                expected,
                found: column.ordinal_position,
            });
        }
    }
    Ok(columns)
}

/// All tables of one schema, keyed and ordered by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaModel {
    schema: ValidIdentifier,
    tables: BTreeMap<String, TableDescriptor>,
}

impl SchemaModel {
    /// Creates a model. Unqualified tables are placed in `schema`.
    pub fn new(
        schema: ValidIdentifier,
        tables: impl IntoIterator<Item = TableDescriptor>,
    ) -> core::result::Result<Self, BuildError> {
        let mut map = BTreeMap::new();
        for mut table in tables {
            match &table.schema {
                Some(s) if s != &schema => {
                    return Err(BuildError::new(
                        Operation::Describe,
                        table.qualified_name(),
                        BuildIssue::SchemaMismatch {
                            table: table.name.as_sql(),
                            expected: schema.as_sql(),
                            found: s.as_sql(),
                        },
                    ));
                }
                Some(_) => {}
                None => table.schema = Some(schema.clone()),
            }
            let key = table.name.name().to_string();
            if map.contains_key(&key) {
                return Err(BuildError::new(
                    Operation::Describe,
                    table.qualified_name(),
                    BuildIssue::DuplicateName {
                        object: "table",
                        name: table.name.as_sql(),
                    },
                ));
            }
            map.insert(key, table);
        }
        Ok(Self {
            schema,
            tables: map,
        })
    }

    /// The schema name.
    #[must_use]
    pub const fn schema_name(&self) -> &ValidIdentifier {
        &self.schema
    }

    /// Tables in name order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.values()
    }

    /// Finds a table by name (see [`ValidIdentifier::matches`]).
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables
            .get(name)
            .or_else(|| self.tables.values().find(|t| t.name.matches(name)))
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the schema has no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
