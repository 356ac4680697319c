//! Telemetry emitted by the stroke integrator.

use crate::error::SimResult;
use crate::rotor::Direction;
use crate::stroke::StrokeReport;
use std::fmt;

/// Downsampled snapshot of the engine during a stroke.
///
/// Serialised as 17 comma-separated scientific-notation fields in declaration
/// order, with C-style exponents (`e+02`, `e-04`). Torques and reaction
/// moments are multiplied by the stroke direction.
#[derive(Clone, Debug, PartialEq)]
pub struct TelemetryRecord {
    /// Cumulative simulated time since the shafts were initialised (s)
    pub time_s: f64,
    pub work_shaft1_j: f64,
    pub work_shaft2_j: f64,
    /// Shaft 1 displacement since the previous sample (rad)
    pub shaft1_sample_displacement_rad: f64,
    /// Shaft 2 displacement since the previous sample (rad)
    pub shaft2_sample_displacement_rad: f64,
    pub shaft1_position_rad: f64,
    pub shaft2_position_rad: f64,
    pub bisector_position_rad: f64,
    pub shaft1_rpm: f64,
    pub shaft2_rpm: f64,
    pub bisector_rpm: f64,
    pub expansion_torque_nm: f64,
    pub compression_torque_nm: f64,
    pub shaft1_acceleration_rad_s2: f64,
    pub shaft2_acceleration_rad_s2: f64,
    pub shaft1_reaction_nm: f64,
    pub shaft2_reaction_nm: f64,
}

impl TelemetryRecord {
    pub const FIELD_COUNT: usize = 17;
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            Sci(self.time_s, 10),
            Sci(self.work_shaft1_j, 10),
            Sci(self.work_shaft2_j, 10),
            Sci(self.shaft1_sample_displacement_rad, 10),
            Sci(self.shaft2_sample_displacement_rad, 10),
        )?;
        for v in [
            self.shaft1_position_rad,
            self.shaft2_position_rad,
            self.bisector_position_rad,
            self.shaft1_rpm,
            self.shaft2_rpm,
            self.bisector_rpm,
            self.expansion_torque_nm,
            self.compression_torque_nm,
            self.shaft1_acceleration_rad_s2,
            self.shaft2_acceleration_rad_s2,
            self.shaft1_reaction_nm,
            self.shaft2_reaction_nm,
        ] {
            write!(f, ",{}", Sci(v, 2))?;
        }
        Ok(())
    }
}

/// Scientific notation with a signed exponent of at least two digits
/// (`1.50e+02`, `2.0000000000e-04`).
struct Sci(f64, usize);

impl fmt::Display for Sci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = format!("{:.*e}", self.1, self.0);
        match raw.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exp),
                };
                write!(f, "{mantissa}e{sign}{digits:0>2}")
            }
            // NaN and infinities carry no exponent
            None => f.write_str(&raw),
        }
    }
}

/// Shaft positions at a sample point, with stroke-relative time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionSample {
    pub stroke_time_s: f64,
    pub shaft1_position_rad: f64,
    pub shaft2_position_rad: f64,
}

impl fmt::Display for PositionSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} , {} , {}",
            self.stroke_time_s, self.shaft1_position_rad, self.shaft2_position_rad
        )
    }
}

/// Destination for stroke telemetry.
///
/// The integrator calls [`TelemetrySink::record`] and
/// [`TelemetrySink::record_positions`] once per sample interval. Errors abort
/// the stroke.
pub trait TelemetrySink {
    fn begin_stroke(&mut self, _index: usize, _direction: Direction) -> SimResult<()> {
        Ok(())
    }

    fn record(&mut self, record: &TelemetryRecord) -> SimResult<()>;

    fn record_positions(&mut self, sample: &PositionSample) -> SimResult<()>;

    fn end_stroke(&mut self, _report: &StrokeReport) -> SimResult<()> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&mut self, _record: &TelemetryRecord) -> SimResult<()> {
        Ok(())
    }

    fn record_positions(&mut self, _sample: &PositionSample) -> SimResult<()> {
        Ok(())
    }
}

/// Keeps all telemetry in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub records: Vec<TelemetryRecord>,
    pub positions: Vec<PositionSample>,
    /// (stroke index, direction) per started stroke
    pub strokes: Vec<(usize, Direction)>,
    pub reports: Vec<StrokeReport>,
}

impl TelemetrySink for MemorySink {
    fn begin_stroke(&mut self, index: usize, direction: Direction) -> SimResult<()> {
        self.strokes.push((index, direction));
        Ok(())
    }

    fn record(&mut self, record: &TelemetryRecord) -> SimResult<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn record_positions(&mut self, sample: &PositionSample) -> SimResult<()> {
        self.positions.push(*sample);
        Ok(())
    }

    fn end_stroke(&mut self, report: &StrokeReport) -> SimResult<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> TelemetryRecord {
        TelemetryRecord {
            time_s: 2.0e-4,
            work_shaft1_j: 1.5,
            work_shaft2_j: -1.5,
            shaft1_sample_displacement_rad: 1e-3,
            shaft2_sample_displacement_rad: -1e-3,
            shaft1_position_rad: 0.0883,
            shaft2_position_rad: -0.0883,
            bisector_position_rad: 0.0,
            shaft1_rpm: 120.0,
            shaft2_rpm: -120.0,
            bisector_rpm: 0.0,
            expansion_torque_nm: 5718.0,
            compression_torque_nm: 57.3,
            shaft1_acceleration_rad_s2: 2.0e4,
            shaft2_acceleration_rad_s2: -2.0e4,
            shaft1_reaction_nm: -691.4,
            shaft2_reaction_nm: 691.4,
        }
    }

    #[test]
    fn record_line_has_seventeen_scientific_fields() {
        let line = sample_record().to_string();
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), TelemetryRecord::FIELD_COUNT);
        for field in &fields {
            assert!(field.contains('e'), "not scientific: {field}");
            assert!(field.parse::<f64>().is_ok(), "unparsable: {field}");
        }
        assert_eq!(fields[0], "2.0000000000e-04");
        assert_eq!(fields[1], "1.5000000000e+00");
        assert_eq!(fields[16], "6.91e+02");
    }

    #[test]
    fn exponents_are_signed_and_padded() {
        assert_eq!(Sci(0.0, 2).to_string(), "0.00e+00");
        assert_eq!(Sci(-1.234e-7, 3).to_string(), "-1.234e-07");
        assert_eq!(Sci(5.5e123, 1).to_string(), "5.5e+123");
        assert_eq!(Sci(f64::NAN, 2).to_string(), "NaN");
    }

    #[test]
    fn position_sample_line() {
        let sample = PositionSample {
            stroke_time_s: 0.5,
            shaft1_position_rad: 0.25,
            shaft2_position_rad: -0.25,
        };
        assert_eq!(sample.to_string(), "0.5 , 0.25 , -0.25");
    }

    #[test]
    fn memory_sink_collects() {
        let mut sink = MemorySink::default();
        sink.begin_stroke(0, Direction::Forward).unwrap();
        sink.record(&sample_record()).unwrap();
        assert_eq!(sink.strokes, vec![(0, Direction::Forward)]);
        assert_eq!(sink.records.len(), 1);
    }
}
