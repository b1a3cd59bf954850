//! DDL generation from the metadata model.
//!
//! Oracle DDL does not accept bind variables, so everything in a DDL
//! statement is literal text: identifiers come validated from the model,
//! default and check expressions must pass
//! [`validate_expression`](crate::dialect::validate_expression), and
//! comments are emitted as escaped string literals.
//!
//! # Example
//!
//! ```rust
//! use oxide_oracle::config::EngineConfig;
//! use oxide_oracle::ddl::DdlGenerator;
//! use oxide_oracle::model::{ColumnSpec, TableDescriptor};
//! use oxide_oracle::types::NativeType;
//!
//! let config = EngineConfig::default();
//! let regions = TableDescriptor::builder(&config, Some("hr"), "regions")
//!     .column(ColumnSpec::new("region_id", NativeType::number(10, 0)).not_null())
//!     .column(ColumnSpec::new("region_name", NativeType::varchar2(25)))
//!     .primary_key("reg_id_pk", &["region_id"])
//!     .build()
//!     .unwrap();
//!
//! let script = DdlGenerator::new(&config)
//!     .generate_create_table(&regions, false)
//!     .unwrap();
//! assert_eq!(
//!     script.create_table.sql(),
//!     "CREATE TABLE HR.REGIONS (\n    REGION_ID NUMBER(10,0) CONSTRAINT REG_ID_PK PRIMARY KEY,\n    REGION_NAME VARCHAR2(25)\n)"
//! );
//! ```

use tracing::{debug, warn};

use crate::builder::{render_create_index, BuiltStatement, StatementKind};
use crate::config::EngineConfig;
use crate::dialect::{quote_literal, validate_expression, IdentifierKind, IdentifierValidator, ValidIdentifier};
use crate::error::{BuildError, BuildIssue, Error, Operation, Result};
use crate::model::{qualify, ColumnDescriptor, ConstraintDescriptor, ConstraintKind, SchemaModel, TableDescriptor};
use crate::types::{is_safe_type_name, NativeType};

/// Longest comment Oracle stores, in bytes.
pub const MAX_COMMENT_LENGTH: usize = 4000;

/// Statements that create one table.
#[derive(Debug)]
pub struct DdlScript {
    /// CREATE TABLE.
    pub create_table: BuiltStatement,
    /// ALTER TABLE ... ADD CONSTRAINT, when constraints are not inlined.
    pub constraints: Vec<BuiltStatement>,
    /// CREATE INDEX for indexes not implied by a key constraint.
    pub indexes: Vec<BuiltStatement>,
    /// COMMENT ON statements. Each may fail on its own.
    pub comments: Vec<Result<BuiltStatement>>,
}

impl DdlScript {
    /// Every statement that was built, in execution order. Failed comments
    /// are skipped.
    pub fn statements(&self) -> impl Iterator<Item = &BuiltStatement> {
        core::iter::once(&self.create_table)
            .chain(&self.constraints)
            .chain(&self.indexes)
            .chain(self.comments.iter().filter_map(|c| c.as_ref().ok()))
    }
}

/// Statements that create a whole schema.
#[derive(Debug, Default)]
pub struct SchemaScript {
    /// CREATE TABLE for every table, in name order.
    pub create_tables: Vec<BuiltStatement>,
    /// ALTER TABLE ... ADD CONSTRAINT, foreign keys last.
    pub constraints: Vec<BuiltStatement>,
    /// CREATE INDEX statements.
    pub indexes: Vec<BuiltStatement>,
    /// COMMENT ON statements. Each may fail on its own.
    pub comments: Vec<Result<BuiltStatement>>,
}

impl SchemaScript {
    /// Every statement that was built, in execution order. Failed comments
    /// are skipped.
    pub fn statements(&self) -> impl Iterator<Item = &BuiltStatement> {
        self.create_tables
            .iter()
            .chain(&self.constraints)
            .chain(&self.indexes)
            .chain(self.comments.iter().filter_map(|c| c.as_ref().ok()))
    }
}

/// Options for DROP TABLE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropTableOptions {
    /// Adds CASCADE CONSTRAINTS, dropping referencing foreign keys.
    pub cascade_constraints: bool,
    /// Adds PURGE, bypassing the recycle bin.
    pub purge: bool,
}

/// A CREATE TABLE statement plus the constraints that go after it.
struct TableParts {
    create: BuiltStatement,
    alters: Vec<BuiltStatement>,
    foreign_keys: Vec<BuiltStatement>,
}

/// Generates Oracle DDL.
#[derive(Debug, Clone, Copy)]
pub struct DdlGenerator<'a> {
    config: &'a EngineConfig,
}

impl<'a> DdlGenerator<'a> {
    /// Creates a generator for a configuration.
    #[must_use]
    pub const fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Generates CREATE TABLE and its follow-up statements.
    ///
    /// A single-column primary key is declared on its column, a composite
    /// one as the first table clause. Other constraints become table
    /// clauses or separate ALTER statements depending on
    /// [`EngineConfig::multi_constraint_per_statement`].
    pub fn generate_create_table(
        &self,
        table: &TableDescriptor,
        include_comments: bool,
    ) -> Result<DdlScript> {
        let parts = self.table_parts(table, false)?;
        Ok(DdlScript {
            create_table: parts.create,
            constraints: parts.alters,
            indexes: table_indexes(table),
            comments: if include_comments {
                table_comments(table)
            } else {
                Vec::new()
            },
        })
    }

    /// Generates DDL for every table of a schema.
    ///
    /// Foreign keys are always separate ALTER statements placed after every
    /// CREATE TABLE, so tables that reference each other can be created.
    pub fn generate_schema(&self, model: &SchemaModel, include_comments: bool) -> Result<SchemaScript> {
        let mut script = SchemaScript::default();
        let mut foreign_keys = Vec::new();
        for table in model.tables() {
            let parts = self.table_parts(table, true)?;
            script.create_tables.push(parts.create);
            script.constraints.extend(parts.alters);
            foreign_keys.extend(parts.foreign_keys);
            script.indexes.extend(table_indexes(table));
            if include_comments {
                script.comments.extend(table_comments(table));
            }
        }
        script.constraints.extend(foreign_keys);
        debug!(
            schema = %model.schema_name(),
            tables = script.create_tables.len(),
            constraints = script.constraints.len(),
            indexes = script.indexes.len(),
            "generated schema ddl"
        );
        Ok(script)
    }

    /// Generates `DROP TABLE S.T`.
    pub fn generate_drop_table(&self, schema: Option<&str>, table: &str) -> Result<BuiltStatement> {
        self.generate_drop_table_with(schema, table, DropTableOptions::default())
    }

    /// Generates `DROP TABLE S.T [CASCADE CONSTRAINTS] [PURGE]`.
    pub fn generate_drop_table_with(
        &self,
        schema: Option<&str>,
        table: &str,
        options: DropTableOptions,
    ) -> Result<BuiltStatement> {
        let name = self.qualified(schema, table, IdentifierKind::Table, Operation::DropTable)?;
        let mut sql = format!("DROP TABLE {name}");
        if options.cascade_constraints {
            sql.push_str(" CASCADE CONSTRAINTS");
        }
        if options.purge {
            sql.push_str(" PURGE");
        }
        Ok(BuiltStatement::new(StatementKind::DropTable, sql, Vec::new()))
    }

    /// Generates `DROP INDEX S.IX`.
    pub fn generate_drop_index(&self, schema: Option<&str>, index: &str) -> Result<BuiltStatement> {
        let name = self.qualified(schema, index, IdentifierKind::Index, Operation::DropIndex)?;
        Ok(BuiltStatement::new(
            StatementKind::DropIndex,
            format!("DROP INDEX {name}"),
            Vec::new(),
        ))
    }

    /// Generates `ALTER TABLE S.T ADD CONSTRAINT ...` for a constraint that
    /// is not part of the table yet.
    pub fn generate_add_constraint(
        &self,
        table: &TableDescriptor,
        constraint: &ConstraintDescriptor,
    ) -> Result<BuiltStatement> {
        let op = Operation::AddConstraint;
        let fail = |issue| BuildError::new(op, table.qualified_name(), issue);
        if constraint.columns().is_empty() {
            return Err(fail(BuildIssue::EmptyColumnList {
                object: "constraint",
                name: constraint.name().as_sql(),
            })
            .into());
        }
        if let Some(missing) = constraint
            .columns()
            .iter()
            .find(|c| table.column_by_identifier(c).is_none())
        {
            return Err(fail(BuildIssue::DanglingColumn {
                object: "constraint",
                name: constraint.name().as_sql(),
                column: missing.as_sql(),
            })
            .into());
        }
        if constraint.is_primary_key() && table.primary_key().is_some() {
            return Err(fail(BuildIssue::MultiplePrimaryKeys).into());
        }
        let clause = constraint_clause(constraint).map_err(fail)?;
        Ok(alter_add(table, &clause))
    }

    fn table_parts(&self, table: &TableDescriptor, defer_foreign_keys: bool) -> Result<TableParts> {
        let fail = |issue| BuildError::new(Operation::CreateTable, table.qualified_name(), issue);

        let inline_pk = table.primary_key().filter(|pk| pk.columns().len() == 1);
        let mut lines = Vec::with_capacity(table.columns().len());
        for column in table.columns() {
            let pk = inline_pk.filter(|pk| &pk.columns()[0] == column.name());
            lines.push(column_definition(column, pk).map_err(fail)?);
        }

        let mut alters = Vec::new();
        let mut foreign_keys = Vec::new();
        if let Some(pk) = table.primary_key().filter(|pk| pk.columns().len() > 1) {
            lines.push(constraint_clause(pk).map_err(fail)?);
        }
        for constraint in table.constraints().iter().filter(|c| !c.is_primary_key()) {
            let clause = constraint_clause(constraint).map_err(fail)?;
            let is_foreign_key = matches!(constraint.kind(), ConstraintKind::ForeignKey { .. });
            if is_foreign_key && defer_foreign_keys {
                foreign_keys.push(alter_add(table, &clause));
            } else if self.config.multi_constraint_per_statement {
                lines.push(clause);
            } else {
                alters.push(alter_add(table, &clause));
            }
        }

        let body: Vec<String> = lines.iter().map(|l| format!("    {l}")).collect();
        let sql = format!(
            "CREATE TABLE {} (\n{}\n)",
            table.qualified_name(),
            body.join(",\n")
        );
        Ok(TableParts {
            create: BuiltStatement::new(StatementKind::CreateTable, sql, Vec::new()),
            alters,
            foreign_keys,
        })
    }

    fn qualified(
        &self,
        schema: Option<&str>,
        name: &str,
        kind: IdentifierKind,
        operation: Operation,
    ) -> Result<String> {
        let validator = IdentifierValidator::new(self.config);
        let schema = schema
            .map(|s| validator.check(s, IdentifierKind::Schema, operation))
            .transpose()?;
        let name: ValidIdentifier = validator.check(name, kind, operation)?;
        Ok(qualify(schema.as_ref(), &name))
    }
}

fn table_indexes(table: &TableDescriptor) -> Vec<BuiltStatement> {
    table
        .indexes()
        .iter()
        .filter(|index| {
            let implied = table.constraints().iter().any(|c| {
                c.is_unique_key()
                    && (c.name() == index.name()
                        || (index.is_unique() && c.columns() == index.columns()))
            });
            if implied {
                debug!(
                    table = %table.qualified_name(),
                    index = %index.name(),
                    "skipping index implied by key constraint"
                );
            }
            !implied
        })
        .map(|index| {
            let sql = render_create_index(table.schema(), table.name(), index);
            BuiltStatement::new(StatementKind::CreateIndex, sql, Vec::new())
        })
        .collect()
}

fn table_comments(table: &TableDescriptor) -> Vec<Result<BuiltStatement>> {
    let qualified = table.qualified_name();
    let mut targets = Vec::new();
    if let Some(text) = table.comment() {
        targets.push((format!("TABLE {qualified}"), text));
    }
    for column in table.columns() {
        if let Some(text) = column.comment() {
            targets.push((format!("COLUMN {qualified}.{}", column.name()), text));
        }
    }

    targets
        .into_iter()
        .map(|(target, text)| {
            comment_literal(text)
                .map(|literal| {
                    BuiltStatement::new(
                        StatementKind::Comment,
                        format!("COMMENT ON {target} IS {literal}"),
                        Vec::new(),
                    )
                })
                .map_err(|issue| {
                    warn!(object = %target, issue = %issue, "skipping comment");
                    Error::Build(BuildError::new(Operation::Comment, qualified.clone(), issue))
                })
        })
        .collect()
}

fn alter_add(table: &TableDescriptor, clause: &str) -> BuiltStatement {
    BuiltStatement::new(
        StatementKind::AlterTable,
        format!("ALTER TABLE {} ADD {clause}", table.qualified_name()),
        Vec::new(),
    )
}

/// `NAME TYPE [DEFAULT expr] [CONSTRAINT PK PRIMARY KEY [DISABLE]] [NOT NULL]`.
///
/// An enabled inline key implies NOT NULL. A disabled one enforces nothing,
/// so the column keeps its own NOT NULL.
fn column_definition(
    column: &ColumnDescriptor,
    primary_key: Option<&ConstraintDescriptor>,
) -> core::result::Result<String, BuildIssue> {
    if let NativeType::Other(name) = column.native_type() {
        if !is_safe_type_name(name) {
            return Err(BuildIssue::UnsafeTypeName(name.clone()));
        }
    }

    let mut sql = format!("{} {}", column.name(), column.native_type());
    if let Some(expression) = column.default_value() {
        validate_expression(expression)?;
        sql.push_str(" DEFAULT ");
        sql.push_str(expression.trim());
    }
    match primary_key {
        Some(pk) => {
            sql.push_str(&format!(" CONSTRAINT {} PRIMARY KEY", pk.name()));
            if !pk.is_enabled() {
                sql.push_str(" DISABLE");
                if !column.is_nullable() {
                    sql.push_str(" NOT NULL");
                }
            }
        }
        None if !column.is_nullable() => sql.push_str(" NOT NULL"),
        None => {}
    }
    Ok(sql)
}

/// `CONSTRAINT NAME ...` as used in a table clause or ALTER TABLE ADD.
fn constraint_clause(constraint: &ConstraintDescriptor) -> core::result::Result<String, BuildIssue> {
    let columns = join(constraint.columns());
    let mut sql = format!("CONSTRAINT {} ", constraint.name());
    match constraint.kind() {
        ConstraintKind::PrimaryKey => sql.push_str(&format!("PRIMARY KEY ({columns})")),
        ConstraintKind::Unique => sql.push_str(&format!("UNIQUE ({columns})")),
        ConstraintKind::ForeignKey { target, on_delete } => {
            sql.push_str(&format!(
                "FOREIGN KEY ({columns}) REFERENCES {} ({})",
                target.qualified_table(),
                join(target.columns())
            ));
            if let Some(action) = on_delete.as_sql() {
                sql.push(' ');
                sql.push_str(action);
            }
        }
        ConstraintKind::Check { condition } => {
            validate_expression(condition)?;
            sql.push_str(&format!("CHECK ({})", condition.trim()));
        }
    }
    if !constraint.is_enabled() {
        sql.push_str(" DISABLE");
    }
    Ok(sql)
}

fn join(columns: &[ValidIdentifier]) -> String {
    columns
        .iter()
        .map(ValidIdentifier::as_sql)
        .collect::<Vec<_>>()
        .join(", ")
}

fn comment_literal(text: &str) -> core::result::Result<String, BuildIssue> {
    if text.contains('\0') {
        return Err(BuildIssue::InvalidComment(String::from(
            "comment contains a NUL character",
        )));
    }
    if text.len() > MAX_COMMENT_LENGTH {
        return Err(BuildIssue::InvalidComment(format!(
            "comment is {} bytes long, the limit is {MAX_COMMENT_LENGTH}",
            text.len()
        )));
    }
    Ok(quote_literal(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnSpec, ForeignKeySpec, IndexSpec, OnDelete};

    fn departments(config: &EngineConfig) -> TableDescriptor {
        TableDescriptor::builder(config, Some("hr"), "departments")
            .column(ColumnSpec::new("department_id", NativeType::number(4, 0)).not_null())
            .column(ColumnSpec::new("department_name", NativeType::varchar2(30)).not_null())
            .column(ColumnSpec::new("manager_id", NativeType::number(6, 0)))
            .primary_key("dept_id_pk", &["department_id"])
            .unique("dept_name_uk", &["department_name"])
            .foreign_key(
                "dept_mgr_fk",
                &["manager_id"],
                ForeignKeySpec::new("employees", &["employee_id"])
                    .schema("hr")
                    .on_delete(OnDelete::SetNull),
            )
            .index(IndexSpec::new("dept_name_uk", &["department_name"]).unique())
            .index(IndexSpec::new("dept_mgr_ix", &["manager_id"]))
            .comment("Departments of the company")
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_table_with_inline_constraints() {
        let config = EngineConfig::default();
        let script = DdlGenerator::new(&config)
            .generate_create_table(&departments(&config), false)
            .unwrap();
        assert_eq!(
            script.create_table.sql(),
            "CREATE TABLE HR.DEPARTMENTS (\n    \
             DEPARTMENT_ID NUMBER(4,0) CONSTRAINT DEPT_ID_PK PRIMARY KEY,\n    \
             DEPARTMENT_NAME VARCHAR2(30) NOT NULL,\n    \
             MANAGER_ID NUMBER(6,0),\n    \
             CONSTRAINT DEPT_NAME_UK UNIQUE (DEPARTMENT_NAME),\n    \
             CONSTRAINT DEPT_MGR_FK FOREIGN KEY (MANAGER_ID) REFERENCES HR.EMPLOYEES (EMPLOYEE_ID) ON DELETE SET NULL\n)"
        );
        assert!(script.constraints.is_empty());
        let indexes: Vec<&str> = script.indexes.iter().map(BuiltStatement::sql).collect();
        assert_eq!(
            indexes,
            vec!["CREATE INDEX HR.DEPT_MGR_IX ON HR.DEPARTMENTS (MANAGER_ID)"]
        );
        assert!(script.comments.is_empty());
    }

    #[test]
    fn test_create_table_with_separate_constraints() {
        let config = EngineConfig::default().multi_constraint_per_statement(false);
        let script = DdlGenerator::new(&config)
            .generate_create_table(&departments(&config), false)
            .unwrap();
        assert!(!script.create_table.sql().contains("DEPT_NAME_UK"));
        let alters: Vec<&str> = script.constraints.iter().map(BuiltStatement::sql).collect();
        assert_eq!(
            alters,
            vec![
                "ALTER TABLE HR.DEPARTMENTS ADD CONSTRAINT DEPT_NAME_UK UNIQUE (DEPARTMENT_NAME)",
                "ALTER TABLE HR.DEPARTMENTS ADD CONSTRAINT DEPT_MGR_FK FOREIGN KEY (MANAGER_ID) \
                 REFERENCES HR.EMPLOYEES (EMPLOYEE_ID) ON DELETE SET NULL",
            ]
        );
        assert!(script
            .constraints
            .iter()
            .all(|s| s.kind() == StatementKind::AlterTable));
    }

    #[test]
    fn test_disabled_inline_primary_key_keeps_not_null() {
        let config = EngineConfig::default();
        let validator = IdentifierValidator::new(&config);
        let pk = ConstraintDescriptor::new(
            validator.validate("t_pk", IdentifierKind::Constraint).unwrap(),
            ConstraintKind::PrimaryKey,
            vec![validator.validate("id", IdentifierKind::Column).unwrap()],
        )
        .with_enabled(false);
        let table = TableDescriptor::builder(&config, None, "t")
            .column(ColumnSpec::new("id", NativeType::number(10, 0)).not_null())
            .column(ColumnSpec::new("label", NativeType::varchar2(20)))
            .add_constraint(pk)
            .build()
            .unwrap();
        let script = DdlGenerator::new(&config)
            .generate_create_table(&table, false)
            .unwrap();
        assert_eq!(
            script.create_table.sql(),
            "CREATE TABLE T (\n    \
             ID NUMBER(10,0) CONSTRAINT T_PK PRIMARY KEY DISABLE NOT NULL,\n    \
             LABEL VARCHAR2(20)\n)"
        );
    }

    #[test]
    fn test_composite_primary_key_and_defaults() {
        let config = EngineConfig::default();
        let table = TableDescriptor::builder(&config, None, "job_history")
            .column(ColumnSpec::new("employee_id", NativeType::number(6, 0)).not_null())
            .column(ColumnSpec::new("start_date", NativeType::Date).not_null())
            .column(
                ColumnSpec::new("status", NativeType::varchar2(10))
                    .default_value("'ACTIVE'")
                    .not_null(),
            )
            .primary_key("jhist_pk", &["employee_id", "start_date"])
            .check("jhist_status_ck", "status IN ('ACTIVE', 'CLOSED')", &["status"])
            .build()
            .unwrap();
        let script = DdlGenerator::new(&config)
            .generate_create_table(&table, false)
            .unwrap();
        assert_eq!(
            script.create_table.sql(),
            "CREATE TABLE JOB_HISTORY (\n    \
             EMPLOYEE_ID NUMBER(6,0) NOT NULL,\n    \
             START_DATE DATE NOT NULL,\n    \
             STATUS VARCHAR2(10) DEFAULT 'ACTIVE' NOT NULL,\n    \
             CONSTRAINT JHIST_PK PRIMARY KEY (EMPLOYEE_ID, START_DATE),\n    \
             CONSTRAINT JHIST_STATUS_CK CHECK (status IN ('ACTIVE', 'CLOSED'))\n)"
        );
    }

    #[test]
    fn test_unsafe_default_is_rejected() {
        let config = EngineConfig::default();
        let table = TableDescriptor::builder(&config, None, "t")
            .column(ColumnSpec::new("c", NativeType::Date).default_value("SYSDATE; DROP TABLE x"))
            .build()
            .unwrap();
        let err = DdlGenerator::new(&config)
            .generate_create_table(&table, false)
            .unwrap_err();
        match err {
            Error::Build(e) => {
                assert_eq!(e.operation, Operation::CreateTable);
                assert!(matches!(e.issue, BuildIssue::UnsafeExpression(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unsafe_type_name_is_rejected() {
        let config = EngineConfig::default();
        let table = TableDescriptor::builder(&config, None, "t")
            .column(ColumnSpec::new("c", NativeType::Other("XMLTYPE); DROP TABLE x --".into())))
            .build()
            .unwrap();
        let err = DdlGenerator::new(&config)
            .generate_create_table(&table, false)
            .unwrap_err();
        assert!(err.to_string().contains("unsafe type name"));
    }

    #[test]
    fn test_comments_are_escaped_and_independent() {
        let config = EngineConfig::default();
        let table = TableDescriptor::builder(&config, Some("hr"), "regions")
            .column(ColumnSpec::new("region_id", NativeType::number(10, 0)).comment("Region's key"))
            .column(ColumnSpec::new("region_name", NativeType::varchar2(25)).comment("x".repeat(4001)))
            .comment("Regions")
            .build()
            .unwrap();
        let script = DdlGenerator::new(&config)
            .generate_create_table(&table, true)
            .unwrap();
        assert_eq!(script.comments.len(), 3);
        assert_eq!(
            script.comments[0].as_ref().unwrap().sql(),
            "COMMENT ON TABLE HR.REGIONS IS 'Regions'"
        );
        assert_eq!(
            script.comments[1].as_ref().unwrap().sql(),
            "COMMENT ON COLUMN HR.REGIONS.REGION_ID IS 'Region''s key'"
        );
        assert!(script.comments[2].is_err());
        assert_eq!(script.statements().count(), 3);
    }

    #[test]
    fn test_drop_statements() {
        let config = EngineConfig::default();
        let generator = DdlGenerator::new(&config);
        assert_eq!(
            generator.generate_drop_table(Some("hr"), "regions").unwrap().sql(),
            "DROP TABLE HR.REGIONS"
        );
        let options = DropTableOptions {
            cascade_constraints: true,
            purge: true,
        };
        assert_eq!(
            generator
                .generate_drop_table_with(None, "regions", options)
                .unwrap()
                .sql(),
            "DROP TABLE REGIONS CASCADE CONSTRAINTS PURGE"
        );
        assert_eq!(
            generator.generate_drop_index(Some("hr"), "dept_mgr_ix").unwrap().sql(),
            "DROP INDEX HR.DEPT_MGR_IX"
        );
        assert!(matches!(
            generator.generate_drop_table(None, "regions; --"),
            Err(Error::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_add_constraint() {
        let config = EngineConfig::default();
        let table = departments(&config);
        let validator = IdentifierValidator::new(&config);
        let column = validator.validate("manager_id", IdentifierKind::Column).unwrap();
        let check = ConstraintDescriptor::new(
            validator.validate("dept_mgr_ck", IdentifierKind::Constraint).unwrap(),
            ConstraintKind::Check {
                condition: "manager_id > 0".into(),
            },
            vec![column],
        )
        .with_enabled(false);
        let stmt = DdlGenerator::new(&config)
            .generate_add_constraint(&table, &check)
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "ALTER TABLE HR.DEPARTMENTS ADD CONSTRAINT DEPT_MGR_CK CHECK (manager_id > 0) DISABLE"
        );

        let pk = ConstraintDescriptor::new(
            validator.validate("dept_pk2", IdentifierKind::Constraint).unwrap(),
            ConstraintKind::PrimaryKey,
            vec![validator.validate("manager_id", IdentifierKind::Column).unwrap()],
        );
        let err = DdlGenerator::new(&config)
            .generate_add_constraint(&table, &pk)
            .unwrap_err();
        assert!(err.to_string().contains("more than one primary key"));
    }
}
