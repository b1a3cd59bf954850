//! SELECT construction.

use crate::error::{Operation, Result};
use crate::model::TableDescriptor;

use super::{column_list, predicates, BindParameter, BindRole, BuiltStatement, StatementBuilder, StatementKind};

/// Bind name of the paging offset.
const OFFSET_BIND: &str = "ROW_OFFSET";
/// Bind name of the paging limit.
const LIMIT_BIND: &str = "ROW_LIMIT";

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A SELECT with ordering and paging.
///
/// Paging values are binds (`:ROW_OFFSET`, `:ROW_LIMIT`) supplied with
/// the other values at execution time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectRequest {
    columns: Vec<String>,
    predicate_columns: Vec<String>,
    order_by: Vec<(String, SortOrder)>,
    offset: bool,
    limit: bool,
}

impl SelectRequest {
    /// Selects every column with no predicate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the select list.
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| String::from(*c)).collect();
        self
    }

    /// Adds `COL = :COL` predicates.
    #[must_use]
    pub fn filter(mut self, columns: &[&str]) -> Self {
        self.predicate_columns = columns.iter().map(|c| String::from(*c)).collect();
        self
    }

    /// Appends an ORDER BY column.
    #[must_use]
    pub fn order_by(mut self, column: &str, order: SortOrder) -> Self {
        self.order_by.push((String::from(column), order));
        self
    }

    /// Skips `:ROW_OFFSET` rows.
    #[must_use]
    pub fn with_offset(mut self) -> Self {
        self.offset = true;
        self
    }

    /// Returns at most `:ROW_LIMIT` rows.
    #[must_use]
    pub fn with_limit(mut self) -> Self {
        self.limit = true;
        self
    }
}

impl StatementBuilder<'_> {
    /// Builds `SELECT cols FROM table [WHERE COL = :COL AND ...]`.
    ///
    /// An empty `columns` selects every column in ordinal order; an empty
    /// `predicate_columns` selects all rows.
    pub fn build_select(
        &self,
        table: &TableDescriptor,
        columns: &[&str],
        predicate_columns: &[&str],
    ) -> Result<BuiltStatement> {
        let request = SelectRequest::new().columns(columns).filter(predicate_columns);
        self.build_select_with(table, &request)
    }

    /// Builds a SELECT with ordering and paging.
    pub fn build_select_with(
        &self,
        table: &TableDescriptor,
        request: &SelectRequest,
    ) -> Result<BuiltStatement> {
        let op = Operation::Select;
        let requested: Vec<&str> = request.columns.iter().map(String::as_str).collect();
        let columns = if requested.is_empty() {
            table.columns().iter().collect()
        } else {
            self.resolve(table, &requested, op)?
        };
        let filter: Vec<&str> = request.predicate_columns.iter().map(String::as_str).collect();
        let filter = self.resolve(table, &filter, op)?;
        let order: Vec<&str> = request.order_by.iter().map(|(c, _)| c.as_str()).collect();
        let order = self.resolve(table, &order, op)?;

        let mut names = self.bind_names();
        let mut binds = Vec::new();
        let mut sql = format!(
            "SELECT {} FROM {}",
            column_list(&columns),
            table.qualified_name()
        );

        if !filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates(&filter, &mut names, "", &mut binds));
        }

        if !order.is_empty() {
            let terms: Vec<String> = order
                .iter()
                .zip(&request.order_by)
                .map(|(c, (_, direction))| format!("{} {}", c.name(), direction.as_str()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        if request.offset {
            let bind = names.allocate(OFFSET_BIND, "");
            sql.push_str(&format!(" OFFSET :{bind} ROWS"));
            binds.push(BindParameter::new(bind, None, BindRole::Offset));
        }
        if request.limit {
            let bind = names.allocate(LIMIT_BIND, "");
            let first = if request.offset { "NEXT" } else { "FIRST" };
            sql.push_str(&format!(" FETCH {first} :{bind} ROWS ONLY"));
            binds.push(BindParameter::new(bind, None, BindRole::Limit));
        }

        Ok(BuiltStatement::new(StatementKind::Select, sql, binds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::model::ColumnSpec;
    use crate::types::NativeType;

    fn employees(config: &EngineConfig) -> TableDescriptor {
        TableDescriptor::builder(config, Some("hr"), "employees")
            .column(ColumnSpec::new("employee_id", NativeType::number(6, 0)))
            .column(ColumnSpec::new("last_name", NativeType::varchar2(25)))
            .column(ColumnSpec::new("department_id", NativeType::number(4, 0)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_select_all_columns() {
        let config = EngineConfig::default();
        let stmt = StatementBuilder::new(&config)
            .build_select(&employees(&config), &[], &[])
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT EMPLOYEE_ID, LAST_NAME, DEPARTMENT_ID FROM HR.EMPLOYEES"
        );
        assert!(stmt.binds().is_empty());
    }

    #[test]
    fn test_select_with_predicates() {
        let config = EngineConfig::default();
        let stmt = StatementBuilder::new(&config)
            .build_select(
                &employees(&config),
                &["last_name"],
                &["department_id", "employee_id"],
            )
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT LAST_NAME FROM HR.EMPLOYEES WHERE DEPARTMENT_ID = :DEPARTMENT_ID AND EMPLOYEE_ID = :EMPLOYEE_ID"
        );
        assert_eq!(stmt.binds()[0].role(), BindRole::Where);
        assert_eq!(stmt.binds()[0].column(), Some("DEPARTMENT_ID"));
    }

    #[test]
    fn test_select_ordered_and_paged() {
        let config = EngineConfig::default();
        let request = SelectRequest::new()
            .columns(&["employee_id", "last_name"])
            .filter(&["department_id"])
            .order_by("last_name", SortOrder::Asc)
            .order_by("employee_id", SortOrder::Desc)
            .with_offset()
            .with_limit();
        let stmt = StatementBuilder::new(&config)
            .build_select_with(&employees(&config), &request)
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT EMPLOYEE_ID, LAST_NAME FROM HR.EMPLOYEES WHERE DEPARTMENT_ID = :DEPARTMENT_ID \
             ORDER BY LAST_NAME ASC, EMPLOYEE_ID DESC \
             OFFSET :ROW_OFFSET ROWS FETCH NEXT :ROW_LIMIT ROWS ONLY"
        );
        let roles: Vec<BindRole> = stmt.binds().iter().map(|b| b.role()).collect();
        assert_eq!(roles, vec![BindRole::Where, BindRole::Offset, BindRole::Limit]);
    }

    #[test]
    fn test_select_limit_only() {
        let config = EngineConfig::default();
        let request = SelectRequest::new().with_limit();
        let stmt = StatementBuilder::new(&config)
            .build_select_with(&employees(&config), &request)
            .unwrap();
        assert!(stmt.sql().ends_with("FETCH FIRST :ROW_LIMIT ROWS ONLY"));
    }

    #[test]
    fn test_select_rejects_invalid_column() {
        let config = EngineConfig::default();
        let err = StatementBuilder::new(&config)
            .build_select(&employees(&config), &["last_name; DROP TABLE x"], &[])
            .unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidIdentifier(_)));
    }
}
