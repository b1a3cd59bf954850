//! Parameterized statement construction.
//!
//! [`StatementBuilder`] turns a [`TableDescriptor`] and an operation
//! request into a [`BuiltStatement`]: SQL text in which every identifier
//! is validated literal text and every value is a `:name` placeholder.
//!
//! # Example
//!
//! ```rust
//! use oxide_oracle::builder::{SqlValue, StatementBuilder};
//! use oxide_oracle::config::EngineConfig;
//! use oxide_oracle::model::{ColumnSpec, TableDescriptor};
//! use oxide_oracle::types::NativeType;
//!
//! let config = EngineConfig::default();
//! let employees = TableDescriptor::builder(&config, None, "employees")
//!     .column(ColumnSpec::new("employee_id", NativeType::number(6, 0)))
//!     .column(ColumnSpec::new("last_name", NativeType::varchar2(25)))
//!     .build()
//!     .unwrap();
//!
//! let insert = StatementBuilder::new(&config)
//!     .build_insert(&employees, &["employee_id", "last_name"], &[])
//!     .unwrap();
//! assert_eq!(
//!     insert.sql(),
//!     "INSERT INTO EMPLOYEES (EMPLOYEE_ID, LAST_NAME) VALUES (:EMPLOYEE_ID, :LAST_NAME)"
//! );
//!
//! let values = insert
//!     .bind([
//!         ("EMPLOYEE_ID", SqlValue::Int(207)),
//!         ("LAST_NAME", SqlValue::Text("Feeney".into())),
//!     ])
//!     .unwrap();
//! assert_eq!(values[0].0, "EMPLOYEE_ID");
//! ```

mod binds;
mod index;
mod insert;
mod merge;
mod select;
mod update;
pub mod value;

use core::fmt;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::EngineConfig;
use crate::dialect::{IdentifierKind, IdentifierValidator, ValidIdentifier};
use crate::error::{BuildError, BuildIssue, Operation, Result};
use crate::model::{ColumnDescriptor, TableDescriptor};

pub use binds::MAX_BIND_NAME_LENGTH;
pub(crate) use binds::BindNames;
pub use index::IndexConfig;
pub(crate) use index::render_create_index;
pub use merge::{MergeConfig, MergeSource};
pub use select::{SelectRequest, SortOrder};
pub use value::{SqlValue, ToSqlValue};

/// The kind of statement that was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// SELECT.
    Select,
    /// INSERT.
    Insert,
    /// UPDATE.
    Update,
    /// DELETE.
    Delete,
    /// MERGE.
    Merge,
    /// CREATE TABLE.
    CreateTable,
    /// ALTER TABLE.
    AlterTable,
    /// CREATE INDEX.
    CreateIndex,
    /// DROP INDEX.
    DropIndex,
    /// DROP TABLE.
    DropTable,
    /// COMMENT ON.
    Comment,
}

impl StatementKind {
    /// Returns true for statements that change data rather than structure.
    #[must_use]
    pub const fn is_dml(self) -> bool {
        matches!(
            self,
            Self::Select | Self::Insert | Self::Update | Self::Delete | Self::Merge
        )
    }
}

/// What a bind variable carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindRole {
    /// An inserted or merged value.
    Value,
    /// The new value of an updated column.
    Set,
    /// A predicate value.
    Where,
    /// A RETURNING ... INTO output variable, filled by the database.
    ReturningOut,
    /// The row limit of a paged query.
    Limit,
    /// The row offset of a paged query.
    Offset,
}

/// A `:name` placeholder in a built statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindParameter {
    name: String,
    column: Option<String>,
    role: BindRole,
}

impl BindParameter {
    pub(crate) fn new(name: String, column: Option<&ColumnDescriptor>, role: BindRole) -> Self {
        Self {
            name,
            column: column.map(|c| c.name().name().to_string()),
            role,
        }
    }

    /// The bind name, without the colon.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The placeholder as it appears in SQL, `:NAME`.
    #[must_use]
    pub fn placeholder(&self) -> String {
        format!(":{}", self.name)
    }

    /// The column the value belongs to, in catalog form.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// What the bind carries.
    #[must_use]
    pub const fn role(&self) -> BindRole {
        self.role
    }

    /// Returns true if the caller supplies a value for this bind.
    #[must_use]
    pub const fn is_input(&self) -> bool {
        !matches!(self.role, BindRole::ReturningOut)
    }
}

/// Override token for UPDATE and DELETE without a WHERE clause.
///
/// Passing it is the only way to build an unconditional mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowUnconditional;

/// SQL text plus the binds it expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltStatement {
    sql: String,
    binds: Vec<BindParameter>,
    kind: StatementKind,
}

impl BuiltStatement {
    pub(crate) fn new(kind: StatementKind, sql: String, binds: Vec<BindParameter>) -> Self {
        debug!(kind = ?kind, sql = %sql, binds = binds.len(), "built statement");
        Self { sql, binds, kind }
    }

    /// The SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Binds in the order they appear in the SQL text.
    #[must_use]
    pub fn binds(&self) -> &[BindParameter] {
        &self.binds
    }

    /// The statement kind.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Binds the caller supplies values for.
    pub fn input_binds(&self) -> impl Iterator<Item = &BindParameter> {
        self.binds.iter().filter(|b| b.is_input())
    }

    /// RETURNING ... INTO output binds.
    pub fn output_binds(&self) -> impl Iterator<Item = &BindParameter> {
        self.binds.iter().filter(|b| !b.is_input())
    }

    /// Splits into SQL text and binds.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<BindParameter>) {
        (self.sql, self.binds)
    }

    /// Pairs values with the statement's input binds.
    ///
    /// Names match case-insensitively, with or without the leading colon.
    /// Booleans are passed as 1 or 0, matching their NUMBER(1,0) storage.
    /// Every input bind needs exactly one value and no other names are
    /// accepted. The result follows bind order and is ready for
    /// [`QueryExecutor::execute`](crate::introspect::QueryExecutor::execute).
    pub fn bind<I, K, V>(&self, values: I) -> core::result::Result<Vec<(String, SqlValue)>, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToSqlValue,
    {
        let fail = |issue| BuildError::detached(Operation::Bind, issue);

        let mut supplied: HashMap<String, SqlValue> = HashMap::new();
        for (name, value) in values {
            let key = name.as_ref().trim_start_matches(':').to_ascii_uppercase();
            if !self.input_binds().any(|b| b.name == key) {
                return Err(fail(BuildIssue::UnexpectedBindValue(key)));
            }
            if supplied.contains_key(&key) {
                return Err(fail(BuildIssue::DuplicateBindValue(key)));
            }
            supplied.insert(key, value.to_sql_value().into_oracle());
        }

        self.input_binds()
            .map(|b| {
                supplied
                    .remove(&b.name)
                    .map(|v| (b.name.clone(), v))
                    .ok_or_else(|| fail(BuildIssue::MissingBindValue(b.name.clone())))
            })
            .collect()
    }
}

impl fmt::Display for BuiltStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Builds parameterized DML and index DDL.
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder<'a> {
    config: &'a EngineConfig,
    validator: IdentifierValidator<'a>,
}

impl<'a> StatementBuilder<'a> {
    /// Creates a builder for a configuration.
    #[must_use]
    pub const fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            validator: IdentifierValidator::new(config),
        }
    }

    pub(crate) fn bind_names(&self) -> BindNames<'a> {
        BindNames::new(&self.config.reserved_words)
    }

    pub(crate) const fn validator(&self) -> &IdentifierValidator<'a> {
        &self.validator
    }

    /// Validates caller-supplied column names and resolves them against
    /// the table, rejecting unknown and repeated columns.
    fn resolve<'t>(
        &self,
        table: &'t TableDescriptor,
        raws: &[&str],
        operation: Operation,
    ) -> Result<Vec<&'t ColumnDescriptor>> {
        let mut seen: HashSet<ValidIdentifier> = HashSet::new();
        let mut columns = Vec::with_capacity(raws.len());
        for raw in raws {
            let id = self.validator.check(raw, IdentifierKind::Column, operation)?;
            let column = table.column_by_identifier(&id).ok_or_else(|| {
                BuildError::new(
                    operation,
                    table.qualified_name(),
                    BuildIssue::UnknownColumn(id.as_sql()),
                )
            })?;
            if !seen.insert(id) {
                return Err(BuildError::new(
                    operation,
                    table.qualified_name(),
                    BuildIssue::DuplicateColumn(column.name().as_sql()),
                )
                .into());
            }
            columns.push(column);
        }
        Ok(columns)
    }
}

/// Renders `COL = :BIND` predicates joined with AND and records the binds.
fn predicates(
    columns: &[&ColumnDescriptor],
    names: &mut BindNames<'_>,
    suffix: &str,
    binds: &mut Vec<BindParameter>,
) -> String {
    columns
        .iter()
        .copied()
        .map(|c| {
            let bind = names.allocate(c.name().name(), suffix);
            let sql = format!("{} = :{bind}", c.name());
            binds.push(BindParameter::new(bind, Some(c), BindRole::Where));
            sql
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn column_list(columns: &[&ColumnDescriptor]) -> String {
    columns
        .iter()
        .map(|c| c.name().as_sql())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnSpec;
    use crate::types::NativeType;

    fn table(config: &EngineConfig) -> TableDescriptor {
        TableDescriptor::builder(config, Some("hr"), "employees")
            .column(ColumnSpec::new("employee_id", NativeType::number(6, 0)))
            .column(ColumnSpec::new("last_name", NativeType::varchar2(25)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_resolve_rejects_unknown_and_duplicate() {
        let config = EngineConfig::default();
        let builder = StatementBuilder::new(&config);
        let table = table(&config);

        let err = builder
            .resolve(&table, &["salary"], Operation::Select)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "select on HR.EMPLOYEES: unknown column SALARY"
        );

        let err = builder
            .resolve(&table, &["last_name", "LAST_NAME"], Operation::Select)
            .unwrap_err();
        assert!(err.to_string().contains("listed more than once"));
    }

    #[test]
    fn test_bind_checks_names() {
        let config = EngineConfig::default();
        let builder = StatementBuilder::new(&config);
        let table = table(&config);
        let stmt = builder
            .build_insert(&table, &["employee_id", "last_name"], &[])
            .unwrap();

        let values = stmt
            .bind([(":employee_id", SqlValue::Int(1)), ("LAST_NAME", SqlValue::Text("King".into()))])
            .unwrap();
        assert_eq!(
            values,
            vec![
                ("EMPLOYEE_ID".to_string(), SqlValue::Int(1)),
                ("LAST_NAME".to_string(), SqlValue::Text("King".into())),
            ]
        );

        let err = stmt.bind([("EMPLOYEE_ID", 1)]).unwrap_err();
        assert_eq!(err.issue, BuildIssue::MissingBindValue("LAST_NAME".into()));

        let err = stmt
            .bind([("EMPLOYEE_ID", 1), ("LAST_NAME", 2), ("SALARY", 3)])
            .unwrap_err();
        assert_eq!(err.issue, BuildIssue::UnexpectedBindValue("SALARY".into()));

        let err = stmt
            .bind([("EMPLOYEE_ID", 1), ("employee_id", 2)])
            .unwrap_err();
        assert_eq!(err.issue, BuildIssue::DuplicateBindValue("EMPLOYEE_ID".into()));
    }

    #[test]
    fn test_output_binds_are_not_supplied() {
        let config = EngineConfig::default();
        let builder = StatementBuilder::new(&config);
        let table = table(&config);
        let stmt = builder
            .build_insert(&table, &["last_name"], &["employee_id"])
            .unwrap();
        assert_eq!(stmt.output_binds().count(), 1);
        let err = stmt
            .bind([("LAST_NAME", "King"), ("EMPLOYEE_ID_OUT", "x")])
            .unwrap_err();
        assert_eq!(
            err.issue,
            BuildIssue::UnexpectedBindValue("EMPLOYEE_ID_OUT".into())
        );
    }
}
