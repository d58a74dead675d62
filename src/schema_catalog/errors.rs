//! # Schema Catalog Error Types
//!
//! Errors raised while loading table definitions and building the in-memory
//! [`DatabaseSchema`](super::DatabaseSchema) the join planner runs over.
//!
//! ## Error Categories
//!
//! - **Integrity Errors**: foreign keys naming unknown tables or columns, duplicate or
//!   unusable table names
//! - **Configuration Errors**: file I/O and YAML parsing issues during schema loading
//!
//! Every variant is fatal for a generation run: the planner never sees a
//! partially loaded schema.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaCatalogError {
    #[error("Foreign key `{table}.{column}` references unknown table `{target}`")]
    UnknownForeignKeyTarget {
        table: String,
        column: String,
        target: String,
    },
    #[error("Column `{column}` is not declared on table `{table}`")]
    UnknownColumn { table: String, column: String },
    #[error(
        "Invalid table name `{table}`: expected an ASCII identifier without `__` or a trailing `_`"
    )]
    InvalidTableName { table: String },
    #[error("Duplicate table definition: `{table}`")]
    DuplicateTable { table: String },
    #[error("Duplicate column `{column}` on table `{table}`")]
    DuplicateColumn { table: String, column: String },
    #[error("Failed to read schema file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse schema: {error}")]
    ConfigParseError { error: String },
    #[error("Invalid schema: {message}")]
    InvalidConfig { message: String },
}
