//! gv-project: engine configuration file format and validation.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, ValidationErrors, collect_issues, validate_config};

use std::path::Path;

/// Newest configuration format this crate reads and writes.
pub const LATEST_VERSION: u32 = 1;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Parse a configuration from YAML text and validate it.
pub fn from_yaml_str(content: &str) -> ProjectResult<EngineConfig> {
    let config: EngineConfig = serde_yaml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn to_yaml_string(config: &EngineConfig) -> ProjectResult<String> {
    validate_config(config)?;
    Ok(serde_yaml::to_string(config)?)
}

pub fn load_yaml(path: &Path) -> ProjectResult<EngineConfig> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &Path, config: &EngineConfig) -> ProjectResult<()> {
    let content = to_yaml_string(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
