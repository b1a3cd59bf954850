//! # oxide-oracle
//!
//! An injection-safe statement builder and catalog metadata engine for
//! Oracle.
//!
//! This crate provides:
//! - Identifier validation against Oracle's naming rules and reserved words
//! - A metadata model of tables, columns, constraints and indexes
//! - Parameterized DML construction where every value is a `:name` bind
//! - DDL generation from the model, with expressions and comments checked
//!   before they reach SQL text
//! - Catalog extraction through a caller-supplied [`QueryExecutor`]
//! - Mapping between Oracle column types and a portable type vocabulary
//!
//! ## Building Statements
//!
//! ```rust
//! use oxide_oracle::{ColumnSpec, EngineConfig, NativeType, StatementBuilder, TableDescriptor};
//!
//! let config = EngineConfig::default();
//! let employees = TableDescriptor::builder(&config, Some("hr"), "employees")
//!     .column(ColumnSpec::new("employee_id", NativeType::number(6, 0)).not_null())
//!     .column(ColumnSpec::new("salary", NativeType::number(8, 2)))
//!     .primary_key("emp_pk", &["employee_id"])
//!     .build()
//!     .unwrap();
//!
//! let update = StatementBuilder::new(&config)
//!     .build_update(&employees, &["salary"], &["employee_id"])
//!     .unwrap();
//! assert_eq!(
//!     update.sql(),
//!     "UPDATE HR.EMPLOYEES SET SALARY = :SALARY WHERE EMPLOYEE_ID = :EMPLOYEE_ID_WHERE"
//! );
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Values never become SQL text. Names that could not be written as
//! Oracle identifiers are rejected before any statement is produced:
//!
//! ```rust
//! use oxide_oracle::{EngineConfig, Error, StatementBuilder, TableDescriptor, ColumnSpec, NativeType};
//!
//! let config = EngineConfig::default();
//! let result = TableDescriptor::builder(&config, None, "users; DROP TABLE users")
//!     .column(ColumnSpec::new("id", NativeType::number(10, 0)))
//!     .build();
//! assert!(matches!(result, Err(Error::InvalidIdentifier(_))));
//! ```

pub mod builder;
pub mod config;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod introspect;
pub mod model;
pub mod types;

pub use builder::{
    AllowUnconditional, BindParameter, BindRole, BuiltStatement, IndexConfig, MergeConfig,
    MergeSource, SelectRequest, SortOrder, SqlValue, StatementBuilder, StatementKind, ToSqlValue,
};
pub use config::{CaseMode, EngineConfig, IdentifierProfile, ReservedWords};
pub use ddl::{DdlGenerator, DdlScript, DropTableOptions, SchemaScript};
pub use dialect::{IdentifierKind, IdentifierValidator, ValidIdentifier};
pub use error::{Error, MetadataError, Result};
pub use introspect::{MetadataExtractor, QueryExecutor, Row, RowSet};
pub use model::{
    ColumnDescriptor, ColumnSpec, ConstraintDescriptor, ConstraintKind, ForeignKeySpec,
    IndexDescriptor, IndexSpec, OnDelete, SchemaModel, TableDescriptor,
};
pub use types::{NativeType, PortableTypeDescriptor, PrimitiveKind, TypeFormat, TypeMapper};
