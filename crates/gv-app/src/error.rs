//! Error types for the gv-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration {path}: {message}")]
    ConfigLoad { path: PathBuf, message: String },

    #[error("Configuration validation failed: {0}")]
    Validation(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to open telemetry file: {path}")]
    TelemetryFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<gv_project::ProjectError> for AppError {
    fn from(err: gv_project::ProjectError) -> Self {
        match err {
            gv_project::ProjectError::Validation(errors) => AppError::Validation(errors.to_string()),
            other => AppError::Config(other.to_string()),
        }
    }
}

impl From<gv_project::ValidationErrors> for AppError {
    fn from(err: gv_project::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<gv_sim::SimError> for AppError {
    fn from(err: gv_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}
