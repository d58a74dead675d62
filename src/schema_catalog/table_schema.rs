//! In-memory table metadata consumed by the join planner.
//!
//! A [`DatabaseSchema`] is an ordered, immutable snapshot of the tables found
//! by schema discovery. The position of a table in [`DatabaseSchema::tables`]
//! is its planner index for the whole run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::SchemaCatalogError;
use crate::utils::join_naming::is_valid_table_name;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: false,
        }
    }
}

/// A forward foreign key declared on the owning table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Column on the owning table
    pub column: String,
    /// Referenced table
    pub ref_table: String,
    /// Referenced column on `ref_table`
    pub ref_column: String,
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            ref_table: ref_table.into(),
            ref_column: ref_column.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSchema {
    /// Table with no declared columns. Column checks are skipped for such tables.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn with_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.name == column)
    }

    /// Foreign keys pointing at another table (self references excluded)
    pub fn outgoing_foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(move |fk| fk.ref_table != self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseSchema {
    name: String,
    tables: Vec<TableSchema>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DatabaseSchema {
    /// Build a schema snapshot, rejecting unusable or duplicate table names and
    /// dangling foreign keys.
    pub fn build(
        name: impl Into<String>,
        tables: Vec<TableSchema>,
    ) -> Result<DatabaseSchema, SchemaCatalogError> {
        let mut index = HashMap::with_capacity(tables.len());
        for (position, table) in tables.iter().enumerate() {
            if !is_valid_table_name(&table.name) {
                return Err(SchemaCatalogError::InvalidTableName {
                    table: table.name.clone(),
                });
            }
            if index.insert(table.name.clone(), position).is_some() {
                return Err(SchemaCatalogError::DuplicateTable {
                    table: table.name.clone(),
                });
            }
        }

        for table in &tables {
            for fk in &table.foreign_keys {
                if !index.contains_key(&fk.ref_table) {
                    return Err(SchemaCatalogError::UnknownForeignKeyTarget {
                        table: table.name.clone(),
                        column: fk.column.clone(),
                        target: fk.ref_table.clone(),
                    });
                }
                if fk.ref_table == table.name {
                    log::warn!(
                        "Self-referencing foreign key {}.{} is kept as a reference but cannot be joined",
                        table.name,
                        fk.column
                    );
                }
            }
        }

        Ok(DatabaseSchema {
            name: name.into(),
            tables,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.table_index(name).map(|idx| &self.tables[idx])
    }

    pub fn table_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
