//! Error types for the engine.
//!
//! Each failure kind is its own type so call sites can match on exactly
//! what went wrong. [`Error`] wraps all of them for operations that can
//! fail in more than one way.

use core::fmt;

use thiserror::Error;

use crate::dialect::IdentifierKind;

/// The engine operation that was being attempted when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Identifier validation.
    Validate,
    /// Portable to native type mapping.
    ToNative,
    /// Native to portable type mapping.
    ToPortable,
    /// Building a table or schema descriptor.
    Describe,
    /// Catalog extraction.
    Extract,
    /// SELECT construction.
    Select,
    /// INSERT construction.
    Insert,
    /// UPDATE construction.
    Update,
    /// DELETE construction.
    Delete,
    /// MERGE construction.
    Merge,
    /// CREATE INDEX construction.
    CreateIndex,
    /// DROP INDEX construction.
    DropIndex,
    /// CREATE TABLE generation.
    CreateTable,
    /// DROP TABLE generation.
    DropTable,
    /// ALTER TABLE ... ADD CONSTRAINT generation.
    AddConstraint,
    /// COMMENT ON generation.
    Comment,
    /// Binding values to a built statement.
    Bind,
}

impl Operation {
    /// Returns a short lowercase name for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::ToNative => "to_native",
            Self::ToPortable => "to_portable",
            Self::Describe => "describe",
            Self::Extract => "extract",
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Merge => "merge",
            Self::CreateIndex => "create_index",
            Self::DropIndex => "drop_index",
            Self::CreateTable => "create_table",
            Self::DropTable => "drop_table",
            Self::AddConstraint => "add_constraint",
            Self::Comment => "comment",
            Self::Bind => "bind",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an identifier was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierIssue {
    /// The identifier is empty.
    #[error("identifier is empty")]
    Empty,
    /// The identifier exceeds the active profile's length limit.
    #[error("identifier is {length} bytes long, the limit is {max}")]
    TooLong {
        /// Actual length in bytes.
        length: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// The first character is not an ASCII letter.
    #[error("identifier must start with a letter, found {0:?}")]
    LeadingCharacter(char),
    /// A character outside `[A-Za-z0-9_$#]` was found.
    #[error("illegal character {character:?} at position {position}")]
    IllegalCharacter {
        /// The offending character.
        character: char,
        /// Character position (zero based).
        position: usize,
    },
    /// The identifier is a reserved word.
    #[error("{0} is a reserved word")]
    ReservedWord(String),
    /// A quoted identifier contains an unescaped double quote.
    #[error("unescaped double quote at position {0}")]
    EmbeddedQuote(usize),
    /// The identifier contains a NUL character.
    #[error("identifier contains a NUL character")]
    NulCharacter,
}

/// A candidate SQL name failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} identifier {raw:?} during {operation}: {issue}")]
pub struct InvalidIdentifierError {
    /// The text as supplied by the caller or the catalog.
    pub raw: String,
    /// What the identifier names.
    pub kind: IdentifierKind,
    /// Why it was rejected.
    pub issue: IdentifierIssue,
    /// The operation that requested validation.
    pub operation: Operation,
}

/// A portable type lacks the information needed to pick a native type,
/// or a native type has no portable counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot map {type_name} during {operation}: {reason}")]
pub struct AmbiguousTypeMappingError {
    /// A rendering of the type being mapped.
    pub type_name: String,
    /// Why no mapping exists.
    pub reason: String,
    /// Mapping direction.
    pub operation: Operation,
}

/// An UPDATE or DELETE without a WHERE clause was requested without the
/// explicit override.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("refusing unconditional {operation} on {table}: no predicate columns given")]
pub struct UnsafeStatementError {
    /// The target table.
    pub table: String,
    /// The attempted mutation.
    pub operation: Operation,
}

/// Why a request was structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildIssue {
    /// No columns were given where at least one is required.
    #[error("at least one column is required")]
    NoColumns,
    /// A column does not exist on the table.
    #[error("unknown column {0}")]
    UnknownColumn(String),
    /// A column was listed twice.
    #[error("column {0} is listed more than once")]
    DuplicateColumn(String),
    /// Two objects of the same kind share a name.
    #[error("duplicate {object} name {name}")]
    DuplicateName {
        /// Object kind (constraint, index, table).
        object: &'static str,
        /// The duplicated name.
        name: String,
    },
    /// Column ordinal positions are not unique and contiguous from 1.
    #[error("column {column} has ordinal position {found}, expected {expected}")]
    OrdinalGap {
        /// The column at the wrong position.
        column: String,
        /// The position that was expected.
        expected: u32,
        /// The position that was found.
        found: u32,
    },
    /// Some but not all columns carry explicit ordinal positions.
    #[error("ordinal positions must be given for every column or for none")]
    MixedOrdinals,
    /// More than one primary key constraint.
    #[error("table has more than one primary key")]
    MultiplePrimaryKeys,
    /// A constraint or index lists no columns.
    #[error("{object} {name} lists no columns")]
    EmptyColumnList {
        /// Object kind.
        object: &'static str,
        /// Object name.
        name: String,
    },
    /// A constraint or index references a column the table does not have.
    #[error("{object} {name} references unknown column {column}")]
    DanglingColumn {
        /// Object kind.
        object: &'static str,
        /// Object name.
        name: String,
        /// The missing column.
        column: String,
    },
    /// Foreign key column count differs from its target column count.
    #[error("foreign key {constraint} has {local} columns but references {target}")]
    ForeignKeyArity {
        /// Constraint name.
        constraint: String,
        /// Number of local columns.
        local: usize,
        /// Number of referenced columns.
        target: usize,
    },
    /// A table belongs to a different schema than its model.
    #[error("table {table} belongs to schema {found}, expected {expected}")]
    SchemaMismatch {
        /// Table name.
        table: String,
        /// Schema of the model.
        expected: String,
        /// Schema of the table.
        found: String,
    },
    /// MERGE was requested without match columns.
    #[error("merge requires at least one match column")]
    NoMatchColumns,
    /// MERGE was requested with neither update nor insert columns.
    #[error("merge requires update columns, insert columns, or both")]
    EmptyMerge,
    /// MERGE would update a column used in the ON clause.
    #[error("merge cannot update match column {0}")]
    UpdatesMatchColumn(String),
    /// A MERGE branch uses a column not provided by the source.
    #[error("column {0} is not provided by the merge source")]
    NotInSource(String),
    /// An expression contains text that could terminate or comment out the statement.
    #[error("unsafe expression {0:?}")]
    UnsafeExpression(String),
    /// A native type name cannot be rendered safely.
    #[error("unsafe type name {0:?}")]
    UnsafeTypeName(String),
    /// A comment cannot be emitted.
    #[error("invalid comment: {0}")]
    InvalidComment(String),
    /// PARALLEL degree must be positive.
    #[error("parallel degree must be at least 1")]
    InvalidParallelDegree,
    /// A bind value was not supplied.
    #[error("no value supplied for bind :{0}")]
    MissingBindValue(String),
    /// A value was supplied for a bind the statement does not have.
    #[error("statement has no bind :{0}")]
    UnexpectedBindValue(String),
    /// A value was supplied twice for the same bind.
    #[error("bind :{0} supplied more than once")]
    DuplicateBindValue(String),
}

/// A structurally invalid request (a caller programming error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} on {}: {issue}", .table.as_deref().unwrap_or("<no table>"))]
pub struct BuildError {
    /// The attempted operation.
    pub operation: Operation,
    /// The table involved, if any.
    pub table: Option<String>,
    /// What was wrong.
    pub issue: BuildIssue,
}

impl BuildError {
    /// Creates a build error for an operation on a table.
    #[must_use]
    pub fn new(operation: Operation, table: impl Into<String>, issue: BuildIssue) -> Self {
        Self {
            operation,
            table: Some(table.into()),
            issue,
        }
    }

    /// Creates a build error that is not tied to a table.
    #[must_use]
    pub const fn detached(operation: Operation, issue: BuildIssue) -> Self {
        Self {
            operation,
            table: None,
            issue,
        }
    }
}

/// The query executor failed to run a statement.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExecutionError {
    /// Description of the failure.
    pub message: String,
    /// Underlying driver error, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ExecutionError {
    /// Creates an execution error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an execution error wrapping a driver error.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// The class of catalog metadata a query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataClass {
    /// Tables and their comments.
    Tables,
    /// Columns and their comments.
    Columns,
    /// Primary key, unique, foreign key and check constraints.
    Constraints,
    /// Indexes and their columns.
    Indexes,
}

impl fmt::Display for MetadataClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tables => "tables",
            Self::Columns => "columns",
            Self::Constraints => "constraints",
            Self::Indexes => "indexes",
        })
    }
}

/// A catalog read failed or returned inconsistent data.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The executor failed.
    #[error("reading {class} of schema {schema} failed: {source}")]
    Execution {
        /// Schema being extracted.
        schema: String,
        /// Query class.
        class: MetadataClass,
        /// Executor failure.
        #[source]
        source: ExecutionError,
    },
    /// The schema name itself is invalid.
    #[error("invalid schema name: {0}")]
    InvalidSchema(#[source] InvalidIdentifierError),
    /// A catalog-supplied name failed validation.
    #[error("{class} of schema {schema} returned an invalid name: {source}")]
    InvalidName {
        /// Schema being extracted.
        schema: String,
        /// Query class.
        class: MetadataClass,
        /// Validation failure.
        #[source]
        source: InvalidIdentifierError,
    },
    /// A row references a table the table query did not return.
    #[error("{class} row {object} references table {schema}.{table} which is not in the table list")]
    UnknownTable {
        /// Schema being extracted.
        schema: String,
        /// Query class.
        class: MetadataClass,
        /// Referenced table.
        table: String,
        /// The referencing object (column, constraint or index name).
        object: String,
    },
    /// A requested table does not exist in the catalog.
    #[error("table {schema}.{table} was not found")]
    TableNotFound {
        /// Schema being extracted.
        schema: String,
        /// Requested table.
        table: String,
    },
    /// A row is missing a value or carries an unexpected type.
    #[error("{class} row {row} of schema {schema} has a malformed {column}: {reason}")]
    MalformedRow {
        /// Schema being extracted.
        schema: String,
        /// Query class.
        class: MetadataClass,
        /// Zero-based row index.
        row: usize,
        /// Column name in the select list.
        column: &'static str,
        /// What was wrong.
        reason: String,
    },
    /// The joined rows do not form a valid model.
    #[error("catalog for {schema}.{table} is inconsistent: {source}")]
    Inconsistent {
        /// Schema being extracted.
        schema: String,
        /// Affected table.
        table: String,
        /// The violated invariant.
        #[source]
        source: BuildError,
    },
}

/// Errors raised by the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid identifier.
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifierError),
    /// No native/portable type mapping.
    #[error(transparent)]
    AmbiguousTypeMapping(#[from] AmbiguousTypeMappingError),
    /// Unconditional mutation refused.
    #[error(transparent)]
    UnsafeStatement(#[from] UnsafeStatementError),
    /// Catalog extraction failure.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    /// Structurally invalid request.
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_identifier_message_names_everything() {
        let err = InvalidIdentifierError {
            raw: "1BADNAME".to_string(),
            kind: IdentifierKind::Table,
            issue: IdentifierIssue::LeadingCharacter('1'),
            operation: Operation::Validate,
        };
        let msg = err.to_string();
        assert!(msg.contains("1BADNAME"));
        assert!(msg.contains("table"));
        assert!(msg.contains("validate"));
    }

    #[test]
    fn test_build_error_without_table() {
        let err = BuildError::detached(Operation::Bind, BuildIssue::MissingBindValue("ID".into()));
        assert_eq!(err.to_string(), "bind on <no table>: no value supplied for bind :ID");
    }

    #[test]
    fn test_metadata_error_keeps_execution_source() {
        let io = std::io::Error::other("connection reset");
        let err = MetadataError::Execution {
            schema: "HR".to_string(),
            class: MetadataClass::Columns,
            source: ExecutionError::with_source("query failed", io),
        };
        let source = std::error::Error::source(&err).expect("has source");
        assert_eq!(source.to_string(), "query failed");
        assert!(source.source().is_some());
    }
}
