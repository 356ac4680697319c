//! Telemetry written to CSV files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use gv_sim::{
    Direction, PositionSample, SimResult, StrokeReport, TelemetryRecord, TelemetrySink,
};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// Writes telemetry records and shaft positions to separate files.
///
/// Either file may be omitted. Lines are buffered; call
/// [`FileTelemetrySink::finish`] to flush and surface write errors.
#[derive(Debug, Default)]
pub struct FileTelemetrySink {
    telemetry: Option<BufWriter<File>>,
    positions: Option<BufWriter<File>>,
    records_written: usize,
    positions_written: usize,
}

impl FileTelemetrySink {
    pub fn create(telemetry: Option<&Path>, positions: Option<&Path>) -> AppResult<Self> {
        Ok(Self {
            telemetry: telemetry.map(open_writer).transpose()?,
            positions: positions.map(open_writer).transpose()?,
            records_written: 0,
            positions_written: 0,
        })
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn positions_written(&self) -> usize {
        self.positions_written
    }

    /// Flush both files.
    pub fn finish(mut self) -> AppResult<()> {
        if let Some(w) = self.telemetry.as_mut() {
            w.flush()?;
        }
        if let Some(w) = self.positions.as_mut() {
            w.flush()?;
        }
        debug!(
            records = self.records_written,
            positions = self.positions_written,
            "telemetry flushed"
        );
        Ok(())
    }
}

impl TelemetrySink for FileTelemetrySink {
    fn begin_stroke(&mut self, index: usize, direction: Direction) -> SimResult<()> {
        debug!(stroke = index, ?direction, "recording stroke");
        Ok(())
    }

    fn record(&mut self, record: &TelemetryRecord) -> SimResult<()> {
        if let Some(w) = self.telemetry.as_mut() {
            writeln!(w, "{record}")?;
            self.records_written += 1;
        }
        Ok(())
    }

    fn record_positions(&mut self, sample: &PositionSample) -> SimResult<()> {
        if let Some(w) = self.positions.as_mut() {
            writeln!(w, "{sample}")?;
            self.positions_written += 1;
        }
        Ok(())
    }

    fn end_stroke(&mut self, _report: &StrokeReport) -> SimResult<()> {
        if let Some(w) = self.telemetry.as_mut() {
            w.flush()?;
        }
        Ok(())
    }
}

fn open_writer(path: &Path) -> AppResult<BufWriter<File>> {
    let wrap = |source: std::io::Error| AppError::TelemetryFile {
        path: PathBuf::from(path),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    let file = File::create(path).map_err(wrap)?;
    info!(path = %path.display(), "opened telemetry file");
    Ok(BufWriter::new(file))
}
