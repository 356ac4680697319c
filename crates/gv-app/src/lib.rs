//! Shared application service layer for the vane engine simulator.
//!
//! Turns configuration files into engines, runs them, and writes telemetry
//! files. The CLI is a thin frontend over this crate.

pub mod config_service;
pub mod engine_build;
pub mod error;
pub mod run_service;
pub mod summary;
pub mod telemetry_files;

pub use config_service::{init_config, load_config, save_config};
pub use engine_build::{build_engine, build_params, leading_vane};
pub use error::{AppError, AppResult};
pub use run_service::{RunOverrides, RunRequest, RunResponse, reference_stroke, run, summarize};
pub use summary::{ShaftKinematics, SummaryReport};
pub use telemetry_files::FileTelemetrySink;
