//! Configuration loading and saving.

use std::path::Path;

use gv_project::EngineConfig;
use tracing::info;

use crate::error::{AppError, AppResult};

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> AppResult<EngineConfig> {
    gv_project::load_yaml(path).map_err(|e| match e {
        gv_project::ProjectError::Validation(errors) => AppError::Validation(errors.to_string()),
        other => AppError::ConfigLoad {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })
}

pub fn save_config(path: &Path, config: &EngineConfig) -> AppResult<()> {
    gv_project::save_yaml(path, config)?;
    Ok(())
}

/// Write the reference configuration to a new file.
///
/// Refuses to overwrite an existing file.
pub fn init_config(path: &Path, name: &str) -> AppResult<EngineConfig> {
    if path.exists() {
        return Err(AppError::InvalidInput(format!(
            "{} already exists",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let config = EngineConfig::reference(name);
    save_config(path, &config)?;
    info!(path = %path.display(), "wrote reference configuration");
    Ok(config)
}
