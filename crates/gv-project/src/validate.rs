//! Configuration validation.
//!
//! All problems are collected so a user sees every bad field at once.

use crate::LATEST_VERSION;
use crate::schema::{EngineConfig, MachineDef, ProfileDef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Expected exactly 2 machine entries, found {count}")]
    MachineCount { count: usize },
}

/// Every issue found in one configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{} issue(s): {}", .0.len(), join_issues(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationError] {
        &self.0
    }
}

fn join_issues(issues: &[ValidationError]) -> String {
    issues
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn validate_config(config: &EngineConfig) -> Result<(), ValidationErrors> {
    let issues = collect_issues(config);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(issues))
    }
}

pub fn collect_issues(config: &EngineConfig) -> Vec<ValidationError> {
    let mut issues = Issues::default();

    if config.version == 0 || config.version > LATEST_VERSION {
        issues.0.push(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    let g = &config.geometry;
    issues.open_range("geometry.vane_angle_deg", g.vane_angle_deg, 0.0, 90.0);
    issues.positive("geometry.chamber_volume_m3", g.chamber_volume_m3);
    // The working chamber must start narrower than the compressed one.
    if g.vane_angle_deg.is_finite() && g.vane_angle_deg > 0.0 && g.vane_angle_deg < 90.0 {
        issues.open_range(
            "geometry.initial_compression_angle_deg",
            g.initial_compression_angle_deg,
            0.0,
            90.0 - g.vane_angle_deg,
        );
    } else {
        issues.positive(
            "geometry.initial_compression_angle_deg",
            g.initial_compression_angle_deg,
        );
    }

    if config.machines.len() != 2 {
        issues.0.push(ValidationError::MachineCount {
            count: config.machines.len(),
        });
    }
    for (i, machine) in config.machines.iter().enumerate() {
        issues.machine(i, machine);
    }

    let gas = &config.gas;
    issues.positive("gas.initial_pressure_pa", gas.initial_pressure_pa);
    issues.positive("gas.initial_temperature_k", gas.initial_temperature_k);
    issues.positive(
        "gas.ignition_temperature_step_k",
        gas.ignition_temperature_step_k,
    );
    issues.exponent("gas.contraction_exponent", gas.contraction_exponent);
    issues.exponent("gas.expansion_exponent", gas.expansion_exponent);

    let stroke = &config.stroke;
    issues.positive("stroke.dt_s", stroke.dt_s);
    issues.nonzero("stroke.max_iterations", stroke.max_iterations);
    issues.nonzero("stroke.sample_every", stroke.sample_every);
    issues.non_negative("stroke.tolerance_rad_s", stroke.tolerance_rad_s);
    if !stroke.opening_marker_deg.is_finite() {
        issues.invalid(
            "stroke.opening_marker_deg",
            stroke.opening_marker_deg,
            "must be finite",
        );
    }

    let run = &config.run;
    issues.nonzero("run.strokes", run.strokes as u64);
    if !matches!(run.leading_vane, 1 | 2) {
        issues.invalid("run.leading_vane", run.leading_vane, "must be 1 or 2");
    }
    if let Some(speed) = run.initial_speed_rad_s {
        if !speed.is_finite() {
            issues.invalid("run.initial_speed_rad_s", speed, "must be finite");
        }
    }

    issues.0
}

#[derive(Default)]
struct Issues(Vec<ValidationError>);

impl Issues {
    fn invalid(&mut self, field: &str, value: impl ToString, reason: &str) {
        self.0.push(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        });
    }

    fn positive(&mut self, field: &str, value: f64) {
        if !(value.is_finite() && value > 0.0) {
            self.invalid(field, value, "must be positive");
        }
    }

    fn non_negative(&mut self, field: &str, value: f64) {
        if !(value.is_finite() && value >= 0.0) {
            self.invalid(field, value, "must be non-negative");
        }
    }

    fn nonzero(&mut self, field: &str, value: u64) {
        if value == 0 {
            self.invalid(field, value, "must be at least 1");
        }
    }

    fn exponent(&mut self, field: &str, value: f64) {
        if !(value.is_finite() && value > 1.0) {
            self.invalid(field, value, "must exceed 1");
        }
    }

    fn open_range(&mut self, field: &str, value: f64, lo: f64, hi: f64) {
        if !(value.is_finite() && value > lo && value < hi) {
            self.invalid(field, value, &format!("must lie in ({lo}, {hi})"));
        }
    }

    fn machine(&mut self, index: usize, machine: &MachineDef) {
        self.non_negative(
            &format!("machines[{index}].rotor_inertia_kg_m2"),
            machine.rotor_inertia_kg_m2,
        );
        if let ProfileDef::Triangular {
            gradient_nm_s,
            period_s,
        } = machine.profile
        {
            if !gradient_nm_s.is_finite() {
                self.invalid(
                    &format!("machines[{index}].profile.gradient_nm_s"),
                    gradient_nm_s,
                    "must be finite",
                );
            }
            self.positive(&format!("machines[{index}].profile.period_s"), period_s);
        }
    }
}
