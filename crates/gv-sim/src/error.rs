//! Error types for simulation operations.

use gv_core::CoreError;
use thiserror::Error;

/// Errors encountered while building or running the engine simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid parameter: {0}")]
    Parameter(#[from] CoreError),

    #[error(
        "Stroke did not converge within {iterations} iterations (velocity gap {velocity_gap_rad_s:.3e} rad/s)"
    )]
    ConvergenceFailed {
        iterations: u64,
        velocity_gap_rad_s: f64,
    },

    #[error("No completed stroke: {what}")]
    NoStroke { what: &'static str },

    #[error("Telemetry I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
