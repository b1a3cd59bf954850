//! INSERT construction.

use crate::error::{BuildError, BuildIssue, Operation, Result};
use crate::model::TableDescriptor;

use super::{column_list, BindParameter, BindRole, BuiltStatement, StatementBuilder, StatementKind};

impl StatementBuilder<'_> {
    /// Builds `INSERT INTO table (cols) VALUES (:COL, ...)`.
    ///
    /// Non-empty `returning_columns` add `RETURNING cols INTO :COL_OUT, ...`.
    pub fn build_insert(
        &self,
        table: &TableDescriptor,
        columns: &[&str],
        returning_columns: &[&str],
    ) -> Result<BuiltStatement> {
        let op = Operation::Insert;
        if columns.is_empty() {
            return Err(BuildError::new(op, table.qualified_name(), BuildIssue::NoColumns).into());
        }
        let columns = self.resolve(table, columns, op)?;
        let returning = self.resolve(table, returning_columns, op)?;

        let mut names = self.bind_names();
        let mut binds = Vec::with_capacity(columns.len() + returning.len());
        let mut placeholders = Vec::with_capacity(columns.len());
        for column in columns.iter().copied() {
            let bind = names.allocate(column.name().name(), "");
            placeholders.push(format!(":{bind}"));
            binds.push(BindParameter::new(bind, Some(column), BindRole::Value));
        }

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.qualified_name(),
            column_list(&columns),
            placeholders.join(", ")
        );

        if !returning.is_empty() {
            let mut outputs = Vec::with_capacity(returning.len());
            for column in returning.iter().copied() {
                let bind = names.allocate(column.name().name(), "_OUT");
                outputs.push(format!(":{bind}"));
                binds.push(BindParameter::new(bind, Some(column), BindRole::ReturningOut));
            }
            sql.push_str(&format!(
                " RETURNING {} INTO {}",
                column_list(&returning),
                outputs.join(", ")
            ));
        }

        Ok(BuiltStatement::new(StatementKind::Insert, sql, binds))
    }
}
