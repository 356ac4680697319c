//! Engine configuration schema.
//!
//! Every section except `version` and `name` may be omitted; missing values
//! fall back to the reference engine (40° vanes, 1 L chambers, 10°
//! compression angle, a machine on each shaft).

use gv_core::constants::{AMBIENT_TEMPERATURE_K, ATMOSPHERIC_PRESSURE_PA};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub geometry: GeometryDef,
    #[serde(default = "default_machines")]
    pub machines: Vec<MachineDef>,
    #[serde(default)]
    pub gas: GasDef,
    #[serde(default)]
    pub stroke: StrokeDef,
    #[serde(default)]
    pub run: RunDef,
}

impl EngineConfig {
    /// Reference engine under the given name.
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            version: crate::LATEST_VERSION,
            name: name.into(),
            geometry: GeometryDef::default(),
            machines: default_machines(),
            gas: GasDef::default(),
            stroke: StrokeDef::default(),
            run: RunDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeometryDef {
    pub vane_angle_deg: f64,
    pub chamber_volume_m3: f64,
    pub initial_compression_angle_deg: f64,
}

impl Default for GeometryDef {
    fn default() -> Self {
        Self {
            vane_angle_deg: 40.0,
            chamber_volume_m3: 1.0e-3,
            initial_compression_angle_deg: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MachineDef {
    #[serde(default = "default_true")]
    pub attached: bool,
    #[serde(default)]
    pub rotor_inertia_kg_m2: f64,
    #[serde(default)]
    pub profile: ProfileDef,
}

impl Default for MachineDef {
    fn default() -> Self {
        Self {
            attached: true,
            rotor_inertia_kg_m2: 0.0,
            profile: ProfileDef::Constant,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum ProfileDef {
    #[default]
    Constant,
    Triangular { gradient_nm_s: f64, period_s: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GasDef {
    pub initial_pressure_pa: f64,
    pub initial_temperature_k: f64,
    pub ignition_temperature_step_k: f64,
    pub contraction_exponent: f64,
    pub expansion_exponent: f64,
}

impl Default for GasDef {
    fn default() -> Self {
        Self {
            initial_pressure_pa: ATMOSPHERIC_PRESSURE_PA,
            initial_temperature_k: AMBIENT_TEMPERATURE_K,
            ignition_temperature_step_k: 2000.0,
            contraction_exponent: 1.3,
            expansion_exponent: 1.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrokeDef {
    pub dt_s: f64,
    pub max_iterations: u64,
    pub sample_every: u64,
    pub tolerance_rad_s: f64,
    pub iteration_floor: u64,
    pub opening_marker_deg: f64,
}

impl Default for StrokeDef {
    fn default() -> Self {
        Self {
            dt_s: 1.0e-7,
            max_iterations: 1_000_000,
            sample_every: 2000,
            tolerance_rad_s: 1.0e-3,
            iteration_floor: 100,
            opening_marker_deg: 45.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunDef {
    pub strokes: usize,
    /// Shaft (1 or 2) whose vane leads the first stroke
    pub leading_vane: u8,
    /// Common starting speed (rad/s); inferred from a stroke from rest when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_speed_rad_s: Option<f64>,
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            strokes: 4,
            leading_vane: 1,
            initial_speed_rad_s: None,
        }
    }
}

fn default_machines() -> Vec<MachineDef> {
    vec![MachineDef::default(), MachineDef::default()]
}

fn default_true() -> bool {
    true
}
