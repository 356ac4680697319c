//! Summary of an engine configuration after one stroke from rest.

use std::fmt;

use gv_core::angle::{rad_s_to_rpm, rad_to_deg};
use gv_sim::{Engine, EngineSummary, RotatingBody, StrokeReport, StrokeStatus};

use crate::error::AppResult;

/// End-of-stroke state of one shaft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaftKinematics {
    pub acceleration_rad_s2: f64,
    pub speed_rad_s: f64,
    pub location_deg: f64,
}

impl ShaftKinematics {
    pub fn of(body: &RotatingBody) -> Self {
        Self {
            acceleration_rad_s2: body.acceleration(),
            speed_rad_s: body.velocity(),
            location_deg: rad_to_deg(body.position()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub name: String,
    pub engine: EngineSummary,
    pub stroke: StrokeReport,
    /// Moment assigned to the shaft 2 machine, zero when none is fitted (N·m)
    pub machine_moment_nm: f64,
    pub shafts: [ShaftKinematics; 2],
    pub initial_speed_rad_s: f64,
    pub average_power_w: f64,
}

impl SummaryReport {
    /// Collect the report from an engine that has just run its reference stroke.
    pub fn from_engine(name: &str, engine: &Engine, stroke: StrokeReport) -> AppResult<Self> {
        Ok(Self {
            name: name.to_string(),
            engine: engine.summary(),
            machine_moment_nm: engine.shaft2().machine().map_or(0.0, |m| m.moment()),
            shafts: [
                ShaftKinematics::of(engine.shaft1()),
                ShaftKinematics::of(engine.shaft2()),
            ],
            initial_speed_rad_s: engine.inferred_initial_speed()?,
            average_power_w: engine.average_power()?,
            stroke,
        })
    }

    pub fn initial_speed_rpm(&self) -> f64 {
        rad_s_to_rpm(self.initial_speed_rad_s)
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.engine;
        writeln!(f, "Engine: {}", self.name)?;
        writeln!(f, "U1 [degrees]: {:.6}", e.min_angular_width_deg)?;
        writeln!(f, "U2 [degrees]: {:.6}", e.max_angular_width_deg)?;
        writeln!(f, "R1 [m]: {:.6}", e.shaft_radius_m)?;
        writeln!(f, "R2 [m]: {:.6}", e.vane_radius_m)?;
        writeln!(f, "J1 [kgm^2]: {:.6}", e.shaft1_inertia_kg_m2)?;
        writeln!(f, "J2 [kgm^2]: {:.6}", e.shaft2_inertia_kg_m2)?;
        writeln!(f, "Compression ratio: {:.6}", e.compression_ratio)?;
        writeln!(f, "stroke time [ms]: {:.6}", self.stroke.duration_s * 1e3)?;
        if self.stroke.status == StrokeStatus::CeilingReached {
            writeln!(
                f,
                "  (iteration ceiling reached after {} steps)",
                self.stroke.iterations
            )?;
        }
        writeln!(f, "reaction moment [Nm]: {:.6}", self.machine_moment_nm)?;
        for (i, shaft) in self.shafts.iter().enumerate() {
            writeln!(f, "shaft {}:", i + 1)?;
            writeln!(f, "  accel [rad/s^2]: {:.6}", shaft.acceleration_rad_s2)?;
            writeln!(f, "  speed [rad/s]: {:.6}", shaft.speed_rad_s)?;
            writeln!(f, "  loc [degrees]: {:.6}", shaft.location_deg)?;
        }
        writeln!(f, "axt [degrees]: {:.6}", e.expansion_width_deg)?;
        writeln!(
            f,
            "loc bisector [degrees]: {:.6}",
            rad_to_deg(self.stroke.bisector_angle_rad)
        )?;
        writeln!(f, "work done by gases, Ag [J]: {:.6}", e.net_work_j)?;
        writeln!(f, "speed w0 [rad/s]: {:.6}", self.initial_speed_rad_s)?;
        writeln!(f, "speed w0 [RPM]: {:.6}", self.initial_speed_rpm())?;
        write!(f, "ave power [W]: {:.6}", self.average_power_w)
    }
}
