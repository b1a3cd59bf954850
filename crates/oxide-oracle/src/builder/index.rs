//! CREATE INDEX construction.

use std::collections::HashSet;

use crate::dialect::{IdentifierKind, ValidIdentifier};
use crate::error::{BuildError, BuildIssue, Operation, Result};
use crate::model::{qualify, IndexDescriptor};

use super::{BuiltStatement, StatementBuilder, StatementKind};

/// A CREATE INDEX request given by unvalidated names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    schema: Option<String>,
    table: String,
    name: String,
    columns: Vec<String>,
    unique: bool,
    tablespace: Option<String>,
    parallel: Option<u32>,
}

impl IndexConfig {
    /// Creates a non-unique index on `columns` of `table`.
    #[must_use]
    pub fn new(table: impl Into<String>, name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            schema: None,
            table: table.into(),
            name: name.into(),
            columns: columns.iter().map(|c| String::from(*c)).collect(),
            unique: false,
            tablespace: None,
            parallel: None,
        }
    }

    /// Places the table and index in a schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Makes the index unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Stores the index in a tablespace.
    #[must_use]
    pub fn tablespace(mut self, tablespace: impl Into<String>) -> Self {
        self.tablespace = Some(tablespace.into());
        self
    }

    /// Builds the index with a PARALLEL degree.
    #[must_use]
    pub fn parallel(mut self, degree: u32) -> Self {
        self.parallel = Some(degree);
        self
    }
}

impl StatementBuilder<'_> {
    /// Builds `CREATE [UNIQUE] INDEX S.NAME ON S.TABLE (cols)
    /// [TABLESPACE ts] [PARALLEL n]`.
    ///
    /// Every name is validated before anything else is checked.
    pub fn build_create_index(&self, config: &IndexConfig) -> Result<BuiltStatement> {
        let op = Operation::CreateIndex;
        let validator = self.validator();

        let schema = config
            .schema
            .as_deref()
            .map(|s| validator.check(s, IdentifierKind::Schema, op))
            .transpose()?;
        let table = validator.check(&config.table, IdentifierKind::Table, op)?;
        let name = validator.check(&config.name, IdentifierKind::Index, op)?;
        let columns = config
            .columns
            .iter()
            .map(|c| validator.check(c, IdentifierKind::Column, op))
            .collect::<core::result::Result<Vec<_>, _>>()?;
        let tablespace = config
            .tablespace
            .as_deref()
            .map(|ts| validator.check(ts, IdentifierKind::Tablespace, op))
            .transpose()?;

        let fail = |issue| BuildError::new(op, qualify(schema.as_ref(), &table), issue);
        if columns.is_empty() {
            return Err(fail(BuildIssue::EmptyColumnList {
                object: "index",
                name: name.as_sql(),
            })
            .into());
        }
        let repeated = {
            let mut seen = HashSet::new();
            columns.iter().find(|c| !seen.insert(*c)).cloned()
        };
        if let Some(repeated) = repeated {
            return Err(fail(BuildIssue::DuplicateColumn(repeated.as_sql())).into());
        }
        if config.parallel == Some(0) {
            return Err(fail(BuildIssue::InvalidParallelDegree).into());
        }

        let mut index = IndexDescriptor::new(name, columns).with_unique(config.unique);
        if let Some(tablespace) = tablespace {
            index = index.with_tablespace(tablespace);
        }
        if let Some(degree) = config.parallel {
            index = index.with_parallel_degree(degree);
        }

        let sql = render_create_index(schema.as_ref(), &table, &index);
        Ok(BuiltStatement::new(StatementKind::CreateIndex, sql, Vec::new()))
    }
}

/// Renders CREATE INDEX for a validated index. The index lives in the
/// table's schema.
pub(crate) fn render_create_index(
    schema: Option<&ValidIdentifier>,
    table: &ValidIdentifier,
    index: &IndexDescriptor,
) -> String {
    let mut sql = String::from("CREATE ");
    if index.is_unique() {
        sql.push_str("UNIQUE ");
    }
    sql.push_str("INDEX ");
    sql.push_str(&qualify(schema, index.name()));
    sql.push_str(" ON ");
    sql.push_str(&qualify(schema, table));

    let cols: Vec<String> = index.columns().iter().map(ValidIdentifier::as_sql).collect();
    sql.push_str(" (");
    sql.push_str(&cols.join(", "));
    sql.push(')');

    if let Some(tablespace) = index.tablespace() {
        sql.push_str(&format!(" TABLESPACE {tablespace}"));
    }
    if let Some(degree) = index.parallel_degree() {
        sql.push_str(&format!(" PARALLEL {degree}"));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::error::Error;

    #[test]
    fn test_create_index() {
        let config = EngineConfig::default();
        let stmt = StatementBuilder::new(&config)
            .build_create_index(
                &IndexConfig::new("employees", "emp_name_ix", &["last_name", "first_name"])
                    .schema("hr"),
            )
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "CREATE INDEX HR.EMP_NAME_IX ON HR.EMPLOYEES (LAST_NAME, FIRST_NAME)"
        );
        assert_eq!(stmt.kind(), StatementKind::CreateIndex);
        assert!(stmt.binds().is_empty());
    }

    #[test]
    fn test_create_unique_index_with_storage() {
        let config = EngineConfig::default();
        let stmt = StatementBuilder::new(&config)
            .build_create_index(
                &IndexConfig::new("employees", "emp_email_uk", &["email"])
                    .unique()
                    .tablespace("users")
                    .parallel(4),
            )
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "CREATE UNIQUE INDEX EMP_EMAIL_UK ON EMPLOYEES (EMAIL) TABLESPACE USERS PARALLEL 4"
        );
    }

    #[test]
    fn test_create_index_validates_names_first() {
        let config = EngineConfig::default();
        // Bad name and bad degree: the name is reported.
        let err = StatementBuilder::new(&config)
            .build_create_index(&IndexConfig::new("employees", "1ix", &["email"]).parallel(0))
            .unwrap_err();
        match err {
            Error::InvalidIdentifier(e) => {
                assert_eq!(e.kind, IdentifierKind::Index);
                assert_eq!(e.operation, Operation::CreateIndex);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_create_index_rejects_zero_degree_and_empty_columns() {
        let config = EngineConfig::default();
        let builder = StatementBuilder::new(&config);

        let err = builder
            .build_create_index(&IndexConfig::new("employees", "ix", &["email"]).parallel(0))
            .unwrap_err();
        assert!(err.to_string().contains("parallel degree"));

        let err = builder
            .build_create_index(&IndexConfig::new("employees", "ix", &[]))
            .unwrap_err();
        assert!(err.to_string().contains("lists no columns"));

        let err = builder
            .build_create_index(&IndexConfig::new("employees", "ix", &["email", "EMAIL"]))
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
