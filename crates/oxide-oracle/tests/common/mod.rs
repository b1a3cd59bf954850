#![allow(dead_code)]

use std::sync::Mutex;

use oxide_oracle::error::ExecutionError;
use oxide_oracle::{
    ColumnSpec, EngineConfig, ForeignKeySpec, IndexSpec, NativeType, OnDelete, QueryExecutor, Row,
    RowSet, SqlValue, TableDescriptor,
};

/// Routes engine logs to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn employees(config: &EngineConfig) -> TableDescriptor {
    TableDescriptor::builder(config, Some("hr"), "employees")
        .column(ColumnSpec::new("employee_id", NativeType::number(6, 0)).not_null())
        .column(ColumnSpec::new("first_name", NativeType::varchar2(20)))
        .column(ColumnSpec::new("last_name", NativeType::varchar2(25)).not_null())
        .column(ColumnSpec::new("email", NativeType::varchar2(25)).not_null())
        .column(ColumnSpec::new("salary", NativeType::number(8, 2)))
        .column(ColumnSpec::new("department_id", NativeType::number(4, 0)))
        .primary_key("emp_emp_id_pk", &["employee_id"])
        .unique("emp_email_uk", &["email"])
        .check("emp_salary_min", "salary > 0", &["salary"])
        .foreign_key(
            "emp_dept_fk",
            &["department_id"],
            ForeignKeySpec::new("departments", &["department_id"]).schema("hr"),
        )
        .index(IndexSpec::new("emp_department_ix", &["department_id"]))
        .comment("Employees of the company")
        .build()
        .unwrap()
}

pub fn departments(config: &EngineConfig) -> TableDescriptor {
    TableDescriptor::builder(config, Some("hr"), "departments")
        .column(ColumnSpec::new("department_id", NativeType::number(4, 0)).not_null())
        .column(ColumnSpec::new("department_name", NativeType::varchar2(30)).not_null())
        .column(ColumnSpec::new("manager_id", NativeType::number(6, 0)))
        .primary_key("dept_id_pk", &["department_id"])
        .foreign_key(
            "dept_mgr_fk",
            &["manager_id"],
            ForeignKeySpec::new("employees", &["employee_id"])
                .schema("hr")
                .on_delete(OnDelete::SetNull),
        )
        .build()
        .unwrap()
}

pub fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_string())
}

/// An in-memory catalog answering the engine's four catalog queries.
#[derive(Default)]
pub struct FakeCatalog {
    pub tables: Vec<Row>,
    pub columns: Vec<Row>,
    pub constraints: Vec<Row>,
    pub indexes: Vec<Row>,
    pub fail_on: Option<&'static str>,
    log: Mutex<Vec<(String, Vec<(String, SqlValue)>)>>,
}

impl FakeCatalog {
    pub fn table(mut self, name: &str, comment: Option<&str>) -> Self {
        self.tables
            .push(Row::new(vec![text(name), comment.map_or(SqlValue::Null, text)]));
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn column(
        mut self,
        table: &str,
        name: &str,
        data_type: &str,
        length: i64,
        precision: Option<i64>,
        scale: Option<i64>,
        nullable: bool,
        position: i64,
    ) -> Self {
        let char_type = data_type.starts_with("VARCHAR2") || data_type.starts_with("CHAR");
        self.columns.push(Row::new(vec![
            text(table),
            text(name),
            text(data_type),
            SqlValue::Int(length),
            precision.map_or(SqlValue::Null, SqlValue::Int),
            scale.map_or(SqlValue::Null, SqlValue::Int),
            SqlValue::Int(if char_type { length } else { 0 }),
            if char_type { text("B") } else { SqlValue::Null },
            text(if nullable { "Y" } else { "N" }),
            SqlValue::Null,
            SqlValue::Int(position),
            SqlValue::Null,
        ]));
        self
    }

    /// Adds one constraint column row. Foreign keys pass their target.
    pub fn constraint(
        mut self,
        table: &str,
        name: &str,
        kind: &str,
        column: &str,
        condition: Option<&str>,
        target: Option<(&str, &str, &str)>,
    ) -> Self {
        let (r_owner, r_table, r_column) = match target {
            Some((owner, table, column)) => (text(owner), text(table), text(column)),
            None => (SqlValue::Null, SqlValue::Null, SqlValue::Null),
        };
        let generated = if name.starts_with("SYS_C") {
            "GENERATED NAME"
        } else {
            "USER NAME"
        };
        self.constraints.push(Row::new(vec![
            text(table),
            text(name),
            text(kind),
            condition.map_or(SqlValue::Null, text),
            text("ENABLED"),
            if kind == "R" { text("NO ACTION") } else { SqlValue::Null },
            text(generated),
            r_owner,
            r_table,
            text(column),
            r_column,
        ]));
        self
    }

    pub fn index(mut self, table: &str, name: &str, unique: bool, column: &str, degree: &str) -> Self {
        self.indexes.push(Row::new(vec![
            text(table),
            text(name),
            text(if unique { "UNIQUE" } else { "NONUNIQUE" }),
            text("USERS"),
            text(degree),
            text(column),
        ]));
        self
    }

    /// Every query run so far, with its binds.
    pub fn queries(&self) -> Vec<(String, Vec<(String, SqlValue)>)> {
        self.log.lock().unwrap().clone()
    }
}

impl QueryExecutor for FakeCatalog {
    fn execute(&self, sql: &str, binds: &[(String, SqlValue)]) -> Result<RowSet, ExecutionError> {
        self.log
            .lock()
            .unwrap()
            .push((sql.to_string(), binds.to_vec()));
        if let Some(view) = self.fail_on {
            if sql.contains(view) {
                return Err(ExecutionError::new(format!("ORA-00942: {view} is not accessible")));
            }
        }
        let rows = if sql.contains("FROM ALL_TAB_COLUMNS") {
            &self.columns
        } else if sql.contains("FROM ALL_CONSTRAINTS") {
            &self.constraints
        } else if sql.contains("FROM ALL_INDEXES") {
            &self.indexes
        } else {
            &self.tables
        };
        Ok(rows.iter().cloned().collect())
    }
}

/// A catalog holding HR.DEPARTMENTS and HR.EMPLOYEES.
pub fn hr_catalog() -> FakeCatalog {
    FakeCatalog::default()
        .table("DEPARTMENTS", Some("Departments of the company"))
        .table("EMPLOYEES", None)
        .column("DEPARTMENTS", "DEPARTMENT_ID", "NUMBER", 22, Some(4), Some(0), false, 1)
        .column("DEPARTMENTS", "DEPARTMENT_NAME", "VARCHAR2", 30, None, None, false, 2)
        .column("EMPLOYEES", "EMPLOYEE_ID", "NUMBER", 22, Some(6), Some(0), false, 1)
        .column("EMPLOYEES", "LAST_NAME", "VARCHAR2", 25, None, None, false, 2)
        .column("EMPLOYEES", "HIRE_DATE", "DATE", 7, None, None, true, 3)
        .column("EMPLOYEES", "DEPARTMENT_ID", "NUMBER", 22, Some(4), Some(0), true, 4)
        .constraint("DEPARTMENTS", "DEPT_ID_PK", "P", "DEPARTMENT_ID", None, None)
        .constraint(
            "DEPARTMENTS",
            "SYS_C007001",
            "C",
            "DEPARTMENT_NAME",
            Some("\"DEPARTMENT_NAME\" IS NOT NULL"),
            None,
        )
        .constraint(
            "EMPLOYEES",
            "EMP_DEPT_FK",
            "R",
            "DEPARTMENT_ID",
            None,
            Some(("HR", "DEPARTMENTS", "DEPARTMENT_ID")),
        )
        .constraint("EMPLOYEES", "EMP_EMP_ID_PK", "P", "EMPLOYEE_ID", None, None)
        .index("DEPARTMENTS", "DEPT_ID_PK", true, "DEPARTMENT_ID", "1")
        .index("EMPLOYEES", "EMP_EMP_ID_PK", true, "EMPLOYEE_ID", "1")
        .index("EMPLOYEES", "EMP_NAME_IX", false, "LAST_NAME", "4")
}
