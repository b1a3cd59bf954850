//! UPDATE and DELETE construction.
//!
//! Both refuse to run without predicate columns unless the caller passes
//! [`AllowUnconditional`].

use tracing::warn;

use crate::error::{BuildError, BuildIssue, Operation, Result, UnsafeStatementError};
use crate::model::TableDescriptor;

use super::{predicates, AllowUnconditional, BindParameter, BindRole, BuiltStatement, StatementBuilder, StatementKind};

impl StatementBuilder<'_> {
    /// Builds `UPDATE table SET COL = :COL, ... WHERE KEY = :KEY_WHERE`.
    ///
    /// Fails with [`UnsafeStatementError`] when `where_columns` is empty.
    pub fn build_update(
        &self,
        table: &TableDescriptor,
        set_columns: &[&str],
        where_columns: &[&str],
    ) -> Result<BuiltStatement> {
        if where_columns.is_empty() {
            return Err(UnsafeStatementError {
                table: table.qualified_name(),
                operation: Operation::Update,
            }
            .into());
        }
        self.update(table, set_columns, where_columns)
    }

    /// Builds an UPDATE of every row.
    pub fn build_update_all(
        &self,
        table: &TableDescriptor,
        set_columns: &[&str],
        _allow: AllowUnconditional,
    ) -> Result<BuiltStatement> {
        warn!(table = %table.qualified_name(), "building unconditional update");
        self.update(table, set_columns, &[])
    }

    fn update(
        &self,
        table: &TableDescriptor,
        set_columns: &[&str],
        where_columns: &[&str],
    ) -> Result<BuiltStatement> {
        let op = Operation::Update;
        if set_columns.is_empty() {
            return Err(BuildError::new(op, table.qualified_name(), BuildIssue::NoColumns).into());
        }
        let set = self.resolve(table, set_columns, op)?;
        let filter = self.resolve(table, where_columns, op)?;

        let mut names = self.bind_names();
        let mut binds = Vec::with_capacity(set.len() + filter.len());
        let assignments: Vec<String> = set
            .iter()
            .copied()
            .map(|c| {
                let bind = names.allocate(c.name().name(), "");
                let sql = format!("{} = :{bind}", c.name());
                binds.push(BindParameter::new(bind, Some(c), BindRole::Set));
                sql
            })
            .collect();

        let mut sql = format!(
            "UPDATE {} SET {}",
            table.qualified_name(),
            assignments.join(", ")
        );
        if !filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates(&filter, &mut names, "_WHERE", &mut binds));
        }

        Ok(BuiltStatement::new(StatementKind::Update, sql, binds))
    }

    /// Builds `DELETE FROM table WHERE KEY = :KEY`.
    ///
    /// Fails with [`UnsafeStatementError`] when `where_columns` is empty.
    pub fn build_delete(
        &self,
        table: &TableDescriptor,
        where_columns: &[&str],
    ) -> Result<BuiltStatement> {
        if where_columns.is_empty() {
            return Err(UnsafeStatementError {
                table: table.qualified_name(),
                operation: Operation::Delete,
            }
            .into());
        }
        self.delete(table, where_columns)
    }

    /// Builds a DELETE of every row.
    pub fn build_delete_all(
        &self,
        table: &TableDescriptor,
        _allow: AllowUnconditional,
    ) -> Result<BuiltStatement> {
        warn!(table = %table.qualified_name(), "building unconditional delete");
        self.delete(table, &[])
    }

    fn delete(&self, table: &TableDescriptor, where_columns: &[&str]) -> Result<BuiltStatement> {
        let filter = self.resolve(table, where_columns, Operation::Delete)?;
        let mut sql = format!("DELETE FROM {}", table.qualified_name());
        let mut binds = Vec::with_capacity(filter.len());
        if !filter.is_empty() {
            let mut names = self.bind_names();
            sql.push_str(" WHERE ");
            sql.push_str(&predicates(&filter, &mut names, "", &mut binds));
        }
        Ok(BuiltStatement::new(StatementKind::Delete, sql, binds))
    }
}
