pub mod config;
pub mod errors;
pub mod table_schema;


pub use config::{ColumnDefinition, ForeignKeyDefinition, SchemaConfig, TableDefinition};
pub use errors::SchemaCatalogError;
pub use table_schema::{ColumnSchema, DatabaseSchema, ForeignKey, TableSchema};
