use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::SchemaCatalogError;
use crate::utils::join_naming::is_valid_table_name;
use super::table_schema::{ColumnSchema, DatabaseSchema, ForeignKey, TableSchema};

/// Table definitions are read from YAML with the following structure:
///
/// ```yaml
/// name: shop                  # Schema name (optional)
/// tables:
///   - name: users
///     columns:
///       - name: id
///         type: BIGINT
///       - name: email
///         type: TEXT
///         nullable: true
///     primary_key: [id]
///   - name: orders
///     columns:
///       - name: id
///         type: BIGINT
///       - name: user_id
///         type: BIGINT
///     foreign_keys:
///       - column: user_id      # Column on this table
///         references: users    # Referenced table
///         referenced_column: id  # Defaults to `id`
/// ```
///
/// # Usage
///
/// ```ignore
/// use ormjoin::schema_catalog::SchemaConfig;
///
/// let schema = SchemaConfig::from_yaml_file("schema.yaml")?.to_database_schema()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Optional schema name, defaults to `default`
    #[serde(default)]
    pub name: Option<String>,
    pub tables: Vec<TableDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyDefinition {
    pub column: String,
    pub references: String,
    #[serde(default = "default_referenced_column")]
    pub referenced_column: String,
}

fn default_referenced_column() -> String {
    "id".to_string()
}

impl SchemaConfig {
    /// Load schema configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaCatalogError> {
        let contents = fs::read_to_string(path).map_err(|e| SchemaCatalogError::ConfigReadError {
            error: e.to_string(),
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse schema configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemaCatalogError> {
        serde_yaml::from_str(yaml).map_err(|e| SchemaCatalogError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Structural validation of the table definitions
    pub fn validate(&self) -> Result<(), SchemaCatalogError> {
        if self.tables.is_empty() {
            return Err(SchemaCatalogError::InvalidConfig {
                message: "Schema must contain at least one table definition".to_string(),
            });
        }

        let mut seen_tables = HashSet::new();
        for table in &self.tables {
            if !is_valid_table_name(&table.name) {
                return Err(SchemaCatalogError::InvalidTableName {
                    table: table.name.clone(),
                });
            }
            if !seen_tables.insert(table.name.as_str()) {
                return Err(SchemaCatalogError::DuplicateTable {
                    table: table.name.clone(),
                });
            }
            table.validate_columns()?;
        }

        self.validate_foreign_keys()
    }

    /// Foreign keys must point at declared tables, and at declared columns
    /// whenever the table on either side lists its columns.
    fn validate_foreign_keys(&self) -> Result<(), SchemaCatalogError> {
        for table in &self.tables {
            for fk in &table.foreign_keys {
                let target = self
                    .tables
                    .iter()
                    .find(|t| t.name == fk.references)
                    .ok_or_else(|| SchemaCatalogError::UnknownForeignKeyTarget {
                        table: table.name.clone(),
                        column: fk.column.clone(),
                        target: fk.references.clone(),
                    })?;

                if !table.declares_column(&fk.column) {
                    return Err(SchemaCatalogError::UnknownColumn {
                        table: table.name.clone(),
                        column: fk.column.clone(),
                    });
                }
                if !target.declares_column(&fk.referenced_column) {
                    return Err(SchemaCatalogError::UnknownColumn {
                        table: target.name.clone(),
                        column: fk.referenced_column.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate and convert into the planner's input schema
    pub fn to_database_schema(&self) -> Result<DatabaseSchema, SchemaCatalogError> {
        self.validate()?;

        let tables = self.tables.iter().map(TableDefinition::to_table_schema).collect();
        let name = self.name.clone().unwrap_or_else(|| "default".to_string());

        DatabaseSchema::build(name, tables)
    }
}

impl TableDefinition {
    fn declares_column(&self, column: &str) -> bool {
        self.columns.is_empty() || self.columns.iter().any(|c| c.name == column)
    }

    fn validate_columns(&self) -> Result<(), SchemaCatalogError> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaCatalogError::DuplicateColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        for key in &self.primary_key {
            if !self.declares_column(key) {
                return Err(SchemaCatalogError::UnknownColumn {
                    table: self.name.clone(),
                    column: key.clone(),
                });
            }
        }
        Ok(())
    }

    fn to_table_schema(&self) -> TableSchema {
        TableSchema {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| ColumnSchema {
                    name: c.name.clone(),
                    data_type: c.data_type.clone(),
                    nullable: c.nullable,
                })
                .collect(),
            primary_key: self.primary_key.clone(),
            foreign_keys: self
                .foreign_keys
                .iter()
                .map(|fk| ForeignKey::new(&fk.column, &fk.references, &fk.referenced_column))
                .collect(),
        }
    }
}
