use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::join_planner::DEFAULT_JOIN_NUM;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Generator configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Schema definition file (YAML)
    #[validate(custom(function = "validate_path"))]
    pub source: PathBuf,

    /// Directory receiving the generated plan
    #[validate(custom(function = "validate_path"))]
    pub destination: PathBuf,

    /// Package the generated code belongs to
    #[validate(custom(function = "validate_package_name"))]
    pub package: String,

    /// Maximum number of tables in one join combination (1 disables joins)
    #[validate(range(min = 1, max = 8, message = "Join width must be between 1 and 8"))]
    pub join_num: usize,

    /// Pretty-print the generated JSON
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("schema.yaml"),
            destination: PathBuf::from("generated"),
            package: "model".to_string(),
            join_num: DEFAULT_JOIN_NUM,
            pretty: true,
        }
    }
}

impl GeneratorConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_cli(CliOverrides::default().resolve()?)
    }

    /// Create configuration from CLI arguments with validation
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let config = Self {
            source: cli.source,
            destination: cli.destination,
            package: cli.package,
            join_num: cli.join_num,
            pretty: cli.pretty,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Merge with another configuration (CLI overrides environment)
    pub fn merge(&mut self, other: Self) {
        self.source = other.source;
        self.destination = other.destination;
        self.package = other.package;
        self.join_num = other.join_num;
        self.pretty = other.pretty;
    }

    /// File the plan is written to
    pub fn output_path(&self) -> PathBuf {
        self.destination.join(format!("{}_joins.json", self.package))
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub package: String,
    pub join_num: usize,
    pub pretty: bool,
}

/// Flags given on the command line. Anything left unset is read from the
/// environment, and only those variables are parsed.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub package: Option<String>,
    pub join_num: Option<usize>,
    pub compact: bool,
}

impl CliOverrides {
    pub fn resolve(self) -> Result<CliConfig, ConfigError> {
        Ok(CliConfig {
            source: self
                .source
                .unwrap_or_else(|| PathBuf::from(env_or("ORMJOIN_SOURCE", "schema.yaml"))),
            destination: self
                .destination
                .unwrap_or_else(|| PathBuf::from(env_or("ORMJOIN_DESTINATION", "generated"))),
            package: self
                .package
                .unwrap_or_else(|| env_or("ORMJOIN_PACKAGE", "model")),
            join_num: match self.join_num {
                Some(join_num) => join_num,
                None => parse_env_var("ORMJOIN_JOIN_NUM", "5")?,
            },
            pretty: if self.compact {
                false
            } else {
                parse_env_var("ORMJOIN_PRETTY", "true")?
            },
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn validate_path(path: &Path) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::new("empty_path"));
    }
    Ok(())
}

/// Package names become module identifiers: ASCII letters, digits and `_`,
/// not starting with a digit.
fn validate_package_name(name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::new("invalid_package_name"));
    }
    Ok(())
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env_or(key, default);
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
