//! Configuration to engine compilation.

use gv_core::units::{deg, delta_k, k, m3, pa};
use gv_project::{EngineConfig, MachineDef, ProfileDef, validate_config};
use gv_sim::{
    Engine, EngineParams, GasProperties, LeadingVane, MachineSpec, MomentProfile, StrokeOptions,
};

use crate::error::{AppError, AppResult};

/// Translate a configuration into engine parameters.
pub fn build_params(config: &EngineConfig) -> AppResult<EngineParams> {
    validate_config(config)?;

    let [machine1, machine2]: [MachineSpec; 2] = config
        .machines
        .iter()
        .map(build_machine)
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|specs: Vec<MachineSpec>| {
            AppError::InvalidInput(format!("expected 2 machines, found {}", specs.len()))
        })?;

    let g = &config.geometry;
    let gas = &config.gas;
    let stroke = &config.stroke;

    Ok(EngineParams {
        vane_angle: deg(g.vane_angle_deg),
        chamber_volume: m3(g.chamber_volume_m3),
        initial_compression_angle: deg(g.initial_compression_angle_deg),
        machines: [machine1, machine2],
        gas: GasProperties {
            initial_pressure: pa(gas.initial_pressure_pa),
            initial_temperature: k(gas.initial_temperature_k),
            ignition_temperature_step: delta_k(gas.ignition_temperature_step_k),
            contraction_exponent: gas.contraction_exponent,
            expansion_exponent: gas.expansion_exponent,
        },
        stroke: StrokeOptions {
            dt: stroke.dt_s,
            max_iterations: stroke.max_iterations,
            sample_every: stroke.sample_every,
            tolerance: stroke.tolerance_rad_s,
            iteration_floor: stroke.iteration_floor,
            opening_marker_deg: stroke.opening_marker_deg,
        },
    })
}

pub fn build_engine(config: &EngineConfig) -> AppResult<Engine> {
    let params = build_params(config)?;
    Ok(Engine::new(params)?)
}

/// Map the 1-based shaft number of the leading vane.
pub fn leading_vane(shaft: u8) -> AppResult<LeadingVane> {
    match shaft {
        1 => Ok(LeadingVane::Shaft1),
        2 => Ok(LeadingVane::Shaft2),
        other => Err(AppError::InvalidInput(format!(
            "leading vane must be 1 or 2, got {other}"
        ))),
    }
}

fn build_machine(def: &MachineDef) -> MachineSpec {
    MachineSpec {
        attached: def.attached,
        rotor_inertia_kg_m2: def.rotor_inertia_kg_m2,
        profile: match def.profile {
            ProfileDef::Constant => MomentProfile::Constant,
            ProfileDef::Triangular {
                gradient_nm_s,
                period_s,
            } => MomentProfile::Triangular {
                gradient_nm_s,
                period_s,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uom::si::angle::degree;

    #[test]
    fn reference_config_matches_reference_params() {
        let params = build_params(&EngineConfig::reference("ref")).unwrap();
        let reference = EngineParams::reference();
        assert!((params.vane_angle.get::<degree>() - 40.0).abs() < 1e-12);
        assert!((params.chamber_volume.value - reference.chamber_volume.value).abs() < 1e-15);
        assert_eq!(params.machines, reference.machines);
        assert_eq!(params.gas, reference.gas);
        assert_eq!(params.stroke, reference.stroke);
    }

    #[test]
    fn triangular_profile_carried_over() {
        let mut config = EngineConfig::reference("ramp");
        config.machines[1] = MachineDef {
            attached: true,
            rotor_inertia_kg_m2: 0.01,
            profile: ProfileDef::Triangular {
                gradient_nm_s: 5.0e4,
                period_s: 0.02,
            },
        };
        let params = build_params(&config).unwrap();
        assert_eq!(
            params.machines[1].profile,
            MomentProfile::Triangular {
                gradient_nm_s: 5.0e4,
                period_s: 0.02
            }
        );
        assert_eq!(params.machines[1].rotor_inertia_kg_m2, 0.01);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::reference("bad");
        config.machines.push(MachineDef::default());
        assert!(matches!(build_params(&config), Err(AppError::Validation(_))));
    }

    #[test]
    fn leading_vane_numbers() {
        assert_eq!(leading_vane(1).unwrap(), LeadingVane::Shaft1);
        assert_eq!(leading_vane(2).unwrap(), LeadingVane::Shaft2);
        assert!(leading_vane(0).is_err());
    }
}
