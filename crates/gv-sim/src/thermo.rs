//! Polytropic compression/expansion model and gas torque on the vanes.

use crate::error::{SimError, SimResult};
use crate::geometry::VaneGeometry;
use gv_core::constants::{AMBIENT_TEMPERATURE_K, ATMOSPHERIC_PRESSURE_PA};
use gv_core::ensure_positive;
use gv_core::units::{Energy, Pressure, TempInterval, Temperature, Volume, delta_k, j, k, pa};

/// Intake charge and polytropic exponents.
#[derive(Clone, Debug, PartialEq)]
pub struct GasProperties {
    pub initial_pressure: Pressure,
    pub initial_temperature: Temperature,
    /// Temperature rise from combustion at constant volume
    pub ignition_temperature_step: TempInterval,
    /// Polytropic exponent of contraction (γc)
    pub contraction_exponent: f64,
    /// Polytropic exponent of expansion (γx)
    pub expansion_exponent: f64,
}

impl Default for GasProperties {
    fn default() -> Self {
        Self {
            initial_pressure: pa(ATMOSPHERIC_PRESSURE_PA),
            initial_temperature: k(AMBIENT_TEMPERATURE_K),
            ignition_temperature_step: delta_k(2000.0),
            contraction_exponent: 1.3,
            expansion_exponent: 1.3,
        }
    }
}

impl GasProperties {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.initial_pressure.value, "initial pressure")?;
        ensure_positive(self.initial_temperature.value, "initial temperature")?;
        ensure_positive(
            self.ignition_temperature_step.value,
            "ignition temperature step",
        )?;
        // Work integrals divide by (γ - 1)
        if !(self.contraction_exponent.is_finite() && self.contraction_exponent > 1.0) {
            return Err(SimError::InvalidArg {
                what: "contraction exponent must exceed 1",
            });
        }
        if !(self.expansion_exponent.is_finite() && self.expansion_exponent > 1.0) {
            return Err(SimError::InvalidArg {
                what: "expansion exponent must exceed 1",
            });
        }
        Ok(())
    }
}

/// End state of one polytropic process.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolytropicState {
    pub pressure: Pressure,
    pub temperature: Temperature,
    /// Work done by the gas over the process (J); negative for compression
    pub work: Energy,
}

/// Compression end state and the post-ignition state derived from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermodynamicState {
    pub compression: PolytropicState,
    pub ignition: PolytropicState,
}

impl ThermodynamicState {
    /// Net gas work over one stroke (J).
    pub fn net_work(&self) -> f64 {
        self.ignition.work.value + self.compression.work.value
    }
}

/// Gas model for one engine configuration.
///
/// The end states are computed once from the compression ratio. During a
/// stroke the chamber pressures are followed through the instantaneous
/// angular widths instead:
///
/// ```text
/// τ_exp(w)  = vmax / w^γx,   vmax = torque(P_ign * w_min^γx)
/// τ_comp(w) = vmac / w^γc,   vmac = torque(P_0 * w_max^γc)
/// ```
#[derive(Clone, Debug)]
pub struct ThermodynamicModel {
    gas: GasProperties,
    /// Vane area × lever arm (m³)
    torque_factor: f64,
    compression_ratio: f64,
    state: ThermodynamicState,
    expansion_reference: f64,
    compression_reference: f64,
}

impl ThermodynamicModel {
    /// Build the model for chambers spanning `min_width..max_width` radians.
    pub fn new(
        gas: GasProperties,
        geometry: &VaneGeometry,
        min_width: f64,
        max_width: f64,
    ) -> SimResult<Self> {
        gas.validate()?;
        ensure_positive(min_width, "minimum angular width")?;
        if max_width <= min_width {
            return Err(SimError::InvalidArg {
                what: "maximum angular width must exceed minimum angular width",
            });
        }

        let torque_factor = geometry.vane_area().value * geometry.lever_arm().value;
        let compression_ratio = max_width / min_width;

        let mut model = Self {
            gas,
            torque_factor,
            compression_ratio,
            state: ThermodynamicState {
                compression: zero_state(),
                ignition: zero_state(),
            },
            expansion_reference: 0.0,
            compression_reference: 0.0,
        };

        let compression = model.compression(compression_ratio, geometry.angle_to_volume(max_width));
        let ignition = model.ignition(
            &compression,
            compression_ratio,
            geometry.angle_to_volume(min_width),
        );
        model.state = ThermodynamicState {
            compression,
            ignition,
        };
        model.expansion_reference = model.pressure_to_torque(
            ignition.pressure.value * min_width.powf(model.gas.expansion_exponent),
        );
        model.compression_reference = model.pressure_to_torque(
            model.gas.initial_pressure.value * max_width.powf(model.gas.contraction_exponent),
        );
        Ok(model)
    }

    /// Polytropic compression of the intake charge by `ratio` from `max_volume`.
    pub fn compression(&self, ratio: f64, max_volume: Volume) -> PolytropicState {
        let gc = self.gas.contraction_exponent;
        let p0 = self.gas.initial_pressure.value;
        let t0 = self.gas.initial_temperature.value;

        PolytropicState {
            pressure: pa(p0 * ratio.powf(gc)),
            temperature: k(t0 * ratio.powf(gc - 1.0)),
            work: j((p0 * max_volume.value / (gc - 1.0)) * (1.0 - ratio.powf(gc - 1.0))),
        }
    }

    /// Constant-volume temperature step followed by polytropic expansion from
    /// `min_volume` back through `ratio`.
    pub fn ignition(
        &self,
        compression: &PolytropicState,
        ratio: f64,
        min_volume: Volume,
    ) -> PolytropicState {
        let gx = self.gas.expansion_exponent;
        let tc = compression.temperature.value;
        let ti = tc + self.gas.ignition_temperature_step.value;
        let p_ign = compression.pressure.value * (ti / tc);

        PolytropicState {
            pressure: pa(p_ign),
            temperature: k(ti),
            work: j((p_ign * min_volume.value / (gx - 1.0)) * (1.0 - (1.0 / ratio).powf(gx - 1.0))),
        }
    }

    /// Torque (N·m) exerted on a vane by a pressure (Pa).
    #[inline]
    pub fn pressure_to_torque(&self, pressure: f64) -> f64 {
        pressure * self.torque_factor
    }

    #[inline]
    pub fn torque_to_pressure(&self, torque: f64) -> f64 {
        torque / self.torque_factor
    }

    /// Torque from the expanding chamber at angular width `width` (rad).
    #[inline]
    pub fn expansion_torque(&self, width: f64) -> f64 {
        self.expansion_reference / width.powf(self.gas.expansion_exponent)
    }

    /// Torque from the compressing chamber at angular width `width` (rad).
    #[inline]
    pub fn compression_torque(&self, width: f64) -> f64 {
        self.compression_reference / width.powf(self.gas.contraction_exponent)
    }

    /// Net gas moment on the vanes at the start of a stroke.
    pub fn gas_moment(&self) -> f64 {
        self.pressure_to_torque(
            self.state.ignition.pressure.value - self.state.compression.pressure.value,
        )
    }

    pub fn state(&self) -> &ThermodynamicState {
        &self.state
    }

    pub fn gas(&self) -> &GasProperties {
        &self.gas
    }

    pub fn compression_ratio(&self) -> f64 {
        self.compression_ratio
    }

    pub fn expansion_reference(&self) -> f64 {
        self.expansion_reference
    }

    pub fn compression_reference(&self) -> f64 {
        self.compression_reference
    }
}

fn zero_state() -> PolytropicState {
    PolytropicState {
        pressure: pa(0.0),
        temperature: k(0.0),
        work: j(0.0),
    }
}
