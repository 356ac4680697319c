//! Stroke execution service.

use std::path::Path;

use gv_project::EngineConfig;
use gv_sim::{Direction, Engine, LeadingVane, NullSink, StrokeReport};
use tracing::{info, warn};

use crate::engine_build::{build_engine, leading_vane};
use crate::error::{AppError, AppResult};
use crate::summary::SummaryReport;
use crate::telemetry_files::FileTelemetrySink;

/// Command-line style overrides of the configuration's `run` section.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub strokes: Option<usize>,
    pub leading_vane: Option<u8>,
    pub initial_speed_rad_s: Option<f64>,
}

/// Request to run a sequence of strokes.
pub struct RunRequest<'a> {
    pub config: &'a EngineConfig,
    pub telemetry_path: Option<&'a Path>,
    pub positions_path: Option<&'a Path>,
    pub overrides: RunOverrides,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    /// Present when the starting speed was inferred from a stroke from rest
    pub reference: Option<SummaryReport>,
    pub initial_speed_rad_s: f64,
    pub leading_vane: LeadingVane,
    pub strokes: Vec<StrokeReport>,
    pub records_written: usize,
    pub positions_written: usize,
}

impl RunResponse {
    pub fn total_time_s(&self) -> f64 {
        self.strokes.last().map_or(0.0, |s| s.ended_at_s)
    }

    pub fn converged_strokes(&self) -> usize {
        self.strokes.iter().filter(|s| s.is_converged()).count()
    }
}

/// Run one stroke from rest with shaft 1 leading.
///
/// Fails if the stroke hits the iteration ceiling, since nothing derived
/// from its duration would be meaningful.
pub fn reference_stroke(engine: &mut Engine) -> AppResult<StrokeReport> {
    engine.initialize_shafts(0.0);
    let report = engine
        .execute_stroke(Direction::Forward, &mut NullSink)?
        .require_converged()?;
    Ok(report)
}

/// Build the engine and report its derived quantities after one stroke from rest.
pub fn summarize(config: &EngineConfig) -> AppResult<SummaryReport> {
    let mut engine = build_engine(config)?;
    let stroke = reference_stroke(&mut engine)?;
    SummaryReport::from_engine(&config.name, &engine, stroke)
}

/// Run the configured number of strokes, writing telemetry to the requested files.
///
/// Without an explicit starting speed the reference stroke is executed first
/// and the inferred speed is used.
pub fn run(request: &RunRequest<'_>) -> AppResult<RunResponse> {
    let config = request.config;
    let overrides = &request.overrides;

    let strokes = overrides.strokes.unwrap_or(config.run.strokes);
    if strokes == 0 {
        return Err(AppError::InvalidInput(
            "stroke count must be at least 1".to_string(),
        ));
    }
    let leading = leading_vane(overrides.leading_vane.unwrap_or(config.run.leading_vane))?;

    let mut engine = build_engine(config)?;

    let (initial_speed, reference) = match overrides
        .initial_speed_rad_s
        .or(config.run.initial_speed_rad_s)
    {
        Some(speed) => {
            if !speed.is_finite() {
                return Err(AppError::InvalidInput(format!(
                    "initial speed must be finite, got {speed}"
                )));
            }
            (speed, None)
        }
        None => {
            let stroke = reference_stroke(&mut engine)?;
            let summary = SummaryReport::from_engine(&config.name, &engine, stroke)?;
            info!(
                initial_speed_rad_s = summary.initial_speed_rad_s,
                "inferred initial speed from a stroke from rest"
            );
            (summary.initial_speed_rad_s, Some(summary))
        }
    };

    let mut sink = FileTelemetrySink::create(request.telemetry_path, request.positions_path)?;
    let reports = engine.run_strokes(strokes, initial_speed, leading, &mut sink)?;
    let records_written = sink.records_written();
    let positions_written = sink.positions_written();
    sink.finish()?;

    let response = RunResponse {
        reference,
        initial_speed_rad_s: initial_speed,
        leading_vane: leading,
        strokes: reports,
        records_written,
        positions_written,
    };
    let stalled = strokes - response.converged_strokes();
    if stalled > 0 {
        warn!(stalled, "strokes ended at the iteration ceiling");
    }
    info!(
        strokes,
        total_time_ms = response.total_time_s() * 1e3,
        "run complete"
    );
    Ok(response)
}
