//! Fixed-step integration of a single combustion stroke.

use crate::engine::Drivetrain;
use crate::error::{SimError, SimResult};
use crate::rotor::Direction;
use crate::telemetry::{PositionSample, TelemetryRecord, TelemetrySink};
use crate::thermo::ThermodynamicModel;
use gv_core::angle::{deg_to_rad, rad_s_to_rpm, rad_to_deg};
use tracing::{debug, info, warn};

/// Options for stroke integration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeOptions {
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Iteration ceiling (safety limit)
    pub max_iterations: u64,
    /// Emit telemetry every N-th iteration (decimation)
    pub sample_every: u64,
    /// Shaft speeds closer than this end the stroke (rad/s)
    pub tolerance: f64,
    /// No termination test before this many iterations
    pub iteration_floor: u64,
    /// Half-opening of the working chamber reported once per stroke (degrees);
    /// the marker fires when the chamber is wider than twice this angle
    pub opening_marker_deg: f64,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            dt: 1e-7,
            max_iterations: 1_000_000,
            sample_every: 2000,
            tolerance: 1e-3,
            iteration_floor: 100,
            opening_marker_deg: 45.0,
        }
    }
}

impl StrokeOptions {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if self.max_iterations == 0 {
            return Err(SimError::InvalidArg {
                what: "max_iterations must be positive",
            });
        }
        if self.sample_every == 0 {
            return Err(SimError::InvalidArg {
                what: "sample_every must be positive",
            });
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(SimError::InvalidArg {
                what: "tolerance must be non-negative",
            });
        }
        if !self.opening_marker_deg.is_finite() {
            return Err(SimError::InvalidArg {
                what: "opening marker angle must be finite",
            });
        }
        Ok(())
    }
}

/// How a stroke ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeStatus {
    /// Shaft speeds matched within tolerance.
    Converged,
    /// The iteration ceiling was hit first; results are ceiling-time values.
    CeilingReached,
}

/// Outcome of one stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeReport {
    pub direction: Direction,
    pub status: StrokeStatus,
    pub iterations: u64,
    /// Simulated stroke duration (s)
    pub duration_s: f64,
    /// Bisector position at the end of the stroke (rad)
    pub bisector_angle_rad: f64,
    /// Cumulative simulated time at the end of the stroke (s)
    pub ended_at_s: f64,
    pub work_shaft1_j: f64,
    pub work_shaft2_j: f64,
    /// |ω1 - ω2| at the end of the stroke (rad/s)
    pub velocity_gap_rad_s: f64,
    /// Stroke time at which the working chamber first opened past the marker (s)
    pub chamber_opened_at_s: Option<f64>,
}

impl StrokeReport {
    pub fn is_converged(&self) -> bool {
        self.status == StrokeStatus::Converged
    }

    /// Turn a ceiling-limited stroke into [`SimError::ConvergenceFailed`].
    pub fn require_converged(self) -> SimResult<Self> {
        match self.status {
            StrokeStatus::Converged => Ok(self),
            StrokeStatus::CeilingReached => Err(SimError::ConvergenceFailed {
                iterations: self.iterations,
                velocity_gap_rad_s: self.velocity_gap_rad_s,
            }),
        }
    }
}

/// Fixed-step stroke integrator.
///
/// Each iteration applies the gas moment and the machine reaction moments to
/// both shafts and the bisector, moves the chamber boundary by the relative
/// shaft displacement, and recomputes the gas moment from the new chamber
/// widths. The stroke ends when the two shafts reach the same speed.
#[derive(Clone, Copy, Debug)]
pub struct StrokeIntegrator {
    options: StrokeOptions,
}

impl StrokeIntegrator {
    pub fn new(options: StrokeOptions) -> SimResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &StrokeOptions {
        &self.options
    }

    /// Integrate one stroke starting from the current drivetrain state.
    pub fn execute(
        &self,
        drive: &mut Drivetrain,
        thermo: &ThermodynamicModel,
        direction: Direction,
        sink: &mut dyn TelemetrySink,
    ) -> SimResult<StrokeReport> {
        let opts = &self.options;
        let dt = opts.dt;
        let d = direction.sign();

        let mut gas_moment = thermo.gas_moment();
        let mut stroke_time = 0.0;
        let mut iterations: u64 = 0;
        let mut work1 = 0.0;
        let mut work2 = 0.0;
        let mut sampled1 = 0.0;
        let mut sampled2 = 0.0;
        let mut chamber_opened_at = None;
        let opening_threshold = 2.0 * deg_to_rad(opts.opening_marker_deg);
        let mut status = StrokeStatus::CeilingReached;

        debug!(?direction, gas_moment, "stroke start");

        while iterations < opts.max_iterations {
            if iterations % opts.sample_every == 0 {
                let elapsed = stroke_time;
                sink.record(&TelemetryRecord {
                    time_s: drive.elapsed_s,
                    work_shaft1_j: work1,
                    work_shaft2_j: work2,
                    shaft1_sample_displacement_rad: drive.shaft1.position() - sampled1,
                    shaft2_sample_displacement_rad: drive.shaft2.position() - sampled2,
                    shaft1_position_rad: drive.shaft1.position(),
                    shaft2_position_rad: drive.shaft2.position(),
                    bisector_position_rad: drive.bisector.position(),
                    shaft1_rpm: rad_s_to_rpm(drive.shaft1.velocity()),
                    shaft2_rpm: rad_s_to_rpm(drive.shaft2.velocity()),
                    bisector_rpm: rad_s_to_rpm(drive.bisector.velocity()),
                    expansion_torque_nm: d * drive.expansion_torque,
                    compression_torque_nm: d * drive.compression_torque,
                    shaft1_acceleration_rad_s2: drive.shaft1.acceleration(),
                    shaft2_acceleration_rad_s2: drive.shaft2.acceleration(),
                    shaft1_reaction_nm: d * drive.shaft1.reaction_moment(elapsed),
                    shaft2_reaction_nm: d * drive.shaft2.reaction_moment(elapsed),
                })?;
                sampled1 = drive.shaft1.position();
                sampled2 = drive.shaft2.position();
                sink.record_positions(&PositionSample {
                    stroke_time_s: stroke_time,
                    shaft1_position_rad: drive.shaft1.position(),
                    shaft2_position_rad: drive.shaft2.position(),
                })?;
            }

            iterations += 1;

            let m1 = drive.shaft1.reaction_moment(stroke_time);
            let m2 = drive.shaft2.reaction_moment(stroke_time);
            drive.shaft1.apply_torque(direction, gas_moment + m1, dt);
            drive.shaft2.apply_torque(direction, m2 - gas_moment, dt);
            drive.bisector.apply_torque(direction, m1 + m2, dt);

            work1 += drive.shaft1.displacement() * (gas_moment + m1);
            work2 += drive.shaft2.displacement() * (m2 - gas_moment);

            let delta_angle = d * (drive.shaft1.displacement() - drive.shaft2.displacement());
            drive.expansion_width += delta_angle;
            drive.compression_width = drive.summed_width - drive.expansion_width;

            drive.expansion_torque = thermo.expansion_torque(drive.expansion_width);
            drive.compression_torque = thermo.compression_torque(drive.compression_width);
            gas_moment = drive.expansion_torque - drive.compression_torque;

            stroke_time += dt;
            drive.elapsed_s += dt;

            if iterations <= opts.iteration_floor {
                continue;
            }

            if chamber_opened_at.is_none() && drive.expansion_width > opening_threshold {
                chamber_opened_at = Some(stroke_time);
                info!(
                    stroke_time_s = stroke_time,
                    shaft1_speed_rad_s = drive.shaft1.velocity(),
                    shaft2_speed_rad_s = drive.shaft2.velocity(),
                    "working chamber opened to {:.0} degrees",
                    2.0 * opts.opening_marker_deg
                );
            }

            if (drive.shaft1.velocity() - drive.shaft2.velocity()).abs() < opts.tolerance {
                status = StrokeStatus::Converged;
                break;
            }
        }

        let report = StrokeReport {
            direction,
            status,
            iterations,
            duration_s: stroke_time,
            bisector_angle_rad: drive.bisector.position(),
            ended_at_s: drive.elapsed_s,
            work_shaft1_j: work1,
            work_shaft2_j: work2,
            velocity_gap_rad_s: (drive.shaft1.velocity() - drive.shaft2.velocity()).abs(),
            chamber_opened_at_s: chamber_opened_at,
        };

        match status {
            StrokeStatus::Converged => info!(
                iterations,
                duration_ms = stroke_time * 1e3,
                bisector_deg = rad_to_deg(report.bisector_angle_rad),
                "stroke complete"
            ),
            StrokeStatus::CeilingReached => warn!(
                iterations,
                velocity_gap_rad_s = report.velocity_gap_rad_s,
                "stroke hit the iteration ceiling without converging"
            ),
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_options_defaults() {
        let opts = StrokeOptions::default();
        assert_eq!(opts.dt, 1e-7);
        assert_eq!(opts.max_iterations, 1_000_000);
        assert_eq!(opts.sample_every, 2000);
        assert_eq!(opts.tolerance, 1e-3);
        assert_eq!(opts.iteration_floor, 100);
        assert!(StrokeIntegrator::new(opts).is_ok());
    }

    #[test]
    fn stroke_options_invalid() {
        let base = StrokeOptions::default();
        for opts in [
            StrokeOptions { dt: 0.0, ..base },
            StrokeOptions { dt: f64::NAN, ..base },
            StrokeOptions {
                max_iterations: 0,
                ..base
            },
            StrokeOptions {
                sample_every: 0,
                ..base
            },
            StrokeOptions {
                tolerance: -1e-3,
                ..base
            },
        ] {
            assert!(StrokeIntegrator::new(opts).is_err(), "{opts:?}");
        }
        // Zero tolerance is allowed; such a stroke can only end at the ceiling.
        assert!(StrokeIntegrator::new(StrokeOptions {
            tolerance: 0.0,
            ..base
        })
        .is_ok());
    }

    #[test]
    fn ceiling_report_converts_to_error() {
        let report = StrokeReport {
            direction: Direction::Forward,
            status: StrokeStatus::CeilingReached,
            iterations: 10,
            duration_s: 1e-6,
            bisector_angle_rad: 0.0,
            ended_at_s: 1e-6,
            work_shaft1_j: 0.0,
            work_shaft2_j: 0.0,
            velocity_gap_rad_s: 4.0,
            chamber_opened_at_s: None,
        };
        assert!(!report.is_converged());
        let err = report.require_converged().unwrap_err();
        assert!(matches!(
            err,
            SimError::ConvergenceFailed { iterations: 10, .. }
        ));
    }
}
