//! End-to-end generation: schema YAML in, join plan JSON out.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::join_planner::{plan_joins, JoinPlannerError, PlannedSchema};
use crate::schema_catalog::{SchemaCatalogError, SchemaConfig};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Schema error: {0}")]
    SchemaCatalog(#[from] SchemaCatalogError),

    #[error("Join planning failed: {0}")]
    JoinPlanner(#[from] JoinPlannerError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize join plan: {0}")]
    Json(#[from] serde_json::Error),
}

/// Summary of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub output_path: PathBuf,
    pub table_count: usize,
    pub joined_table_count: usize,
}

/// Parse a schema document and plan its joins.
pub fn plan_from_yaml_str(text: &str, join_num: usize) -> Result<PlannedSchema, GenerationError> {
    let schema = SchemaConfig::from_yaml_str(text)?.to_database_schema()?;
    Ok(plan_joins(&schema, join_num)?)
}

pub fn run_with_config(config: &GeneratorConfig) -> Result<GenerationReport, GenerationError> {
    log::info!(
        "Loading schema from {} (join_num {})",
        config.source.display(),
        config.join_num
    );
    let schema = SchemaConfig::from_yaml_file(&config.source)?.to_database_schema()?;
    let planned = plan_joins(&schema, config.join_num)?;

    let json = if config.pretty {
        serde_json::to_string_pretty(&planned)?
    } else {
        serde_json::to_string(&planned)?
    };

    fs::create_dir_all(&config.destination).map_err(|source| GenerationError::Io {
        path: config.destination.clone(),
        source,
    })?;
    let output_path = config.output_path();
    fs::write(&output_path, json).map_err(|source| GenerationError::Io {
        path: output_path.clone(),
        source,
    })?;

    log::info!(
        "Wrote {} tables and {} joined tables to {}",
        planned.tables.len(),
        planned.joined_tables.len(),
        output_path.display()
    );

    Ok(GenerationReport {
        output_path,
        table_count: planned.tables.len(),
        joined_table_count: planned.joined_tables.len(),
    })
}
