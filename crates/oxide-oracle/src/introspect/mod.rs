//! Catalog introspection.
//!
//! The engine never talks to a database itself. Callers implement
//! [`QueryExecutor`] on top of their driver, and [`MetadataExtractor`]
//! uses it to read `ALL_*` catalog views into a
//! [`SchemaModel`](crate::model::SchemaModel).

mod extractor;
pub(crate) mod queries;

pub use extractor::MetadataExtractor;

use crate::builder::SqlValue;
use crate::error::ExecutionError;

/// Runs one SQL statement with named binds and returns its rows.
///
/// Values in each [`Row`] follow the statement's select list.
/// Implementations wrap a driver connection; the engine only ever issues
/// catalog SELECTs through this trait.
pub trait QueryExecutor {
    /// Executes `sql` with `binds` given as `(name, value)` pairs, names
    /// without the leading colon.
    fn execute(&self, sql: &str, binds: &[(String, SqlValue)]) -> Result<RowSet, ExecutionError>;
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for &T {
    fn execute(&self, sql: &str, binds: &[(String, SqlValue)]) -> Result<RowSet, ExecutionError> {
        (**self).execute(sql, binds)
    }
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for Box<T> {
    fn execute(&self, sql: &str, binds: &[(String, SqlValue)]) -> Result<RowSet, ExecutionError> {
        (**self).execute(sql, binds)
    }
}

/// One result row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row from values in select-list order.
    #[must_use]
    pub const fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    /// The value at `index`, or `None` past the end of the row.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// All values.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<SqlValue>> for Row {
    fn from(values: Vec<SqlValue>) -> Self {
        Self::new(values)
    }
}

/// The rows a statement returned, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    rows: Vec<Row>,
}

impl RowSet {
    /// Creates a row set.
    #[must_use]
    pub const fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// The rows.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows were returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<Row> for RowSet {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for RowSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a Row;
    type IntoIter = core::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
