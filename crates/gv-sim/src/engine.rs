//! Engine controller: configuration, shaft initialisation and multi-stroke runs.

use crate::error::{SimError, SimResult};
use crate::geometry::VaneGeometry;
use crate::machine::{ElectricMachine, MomentProfile};
use crate::rotor::{Direction, RotatingBody};
use crate::stroke::{StrokeIntegrator, StrokeOptions, StrokeReport};
use crate::telemetry::TelemetrySink;
use crate::thermo::{GasProperties, ThermodynamicModel};
use gv_core::ensure_finite;
use gv_core::units::{Angle, Volume, deg, m3};
use std::f64::consts::{FRAC_PI_2, PI};
use tracing::{info, warn};
use uom::si::angle::radian;

/// Electric machine fitted (or not) to one shaft.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MachineSpec {
    pub attached: bool,
    /// Rotor inertia added to the shaft (kg·m²), counted even when detached
    pub rotor_inertia_kg_m2: f64,
    pub profile: MomentProfile,
}

impl MachineSpec {
    pub fn attached() -> Self {
        Self {
            attached: true,
            ..Self::default()
        }
    }
}

/// Which shaft carries the leading vane in the first stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LeadingVane {
    #[default]
    Shaft1,
    Shaft2,
}

impl LeadingVane {
    pub fn direction(self) -> Direction {
        match self {
            LeadingVane::Shaft1 => Direction::Forward,
            LeadingVane::Shaft2 => Direction::Reverse,
        }
    }
}

/// Everything needed to build an [`Engine`].
#[derive(Clone, Debug)]
pub struct EngineParams {
    /// Angular width of each vane
    pub vane_angle: Angle,
    /// Combined volume of the chambers adjacent to a vane
    pub chamber_volume: Volume,
    /// Working chamber width at ignition
    pub initial_compression_angle: Angle,
    pub machines: [MachineSpec; 2],
    pub gas: GasProperties,
    pub stroke: StrokeOptions,
}

impl EngineParams {
    /// 40° vanes, 1 L chambers, 10° compression angle, machines on both
    /// shafts with no rotor inertia.
    pub fn reference() -> Self {
        Self {
            vane_angle: deg(40.0),
            chamber_volume: m3(10e-4),
            initial_compression_angle: deg(10.0),
            machines: [MachineSpec::attached(), MachineSpec::attached()],
            gas: GasProperties::default(),
            stroke: StrokeOptions::default(),
        }
    }
}

/// Kinematic state carried from stroke to stroke.
#[derive(Clone, Debug)]
pub struct Drivetrain {
    pub(crate) shaft1: RotatingBody,
    pub(crate) shaft2: RotatingBody,
    pub(crate) bisector: RotatingBody,
    /// Angular width of the expanding chamber (rad)
    pub(crate) expansion_width: f64,
    /// Angular width of the compressing chamber (rad)
    pub(crate) compression_width: f64,
    /// Expansion + compression width, fixed by the vane geometry (rad)
    pub(crate) summed_width: f64,
    pub(crate) expansion_torque: f64,
    pub(crate) compression_torque: f64,
    /// Simulated time since the shafts were initialised (s)
    pub(crate) elapsed_s: f64,
}

impl Drivetrain {
    pub fn shaft1(&self) -> &RotatingBody {
        &self.shaft1
    }

    pub fn shaft2(&self) -> &RotatingBody {
        &self.shaft2
    }

    pub fn bisector(&self) -> &RotatingBody {
        &self.bisector
    }

    pub fn expansion_width(&self) -> f64 {
        self.expansion_width
    }

    pub fn compression_width(&self) -> f64 {
        self.compression_width
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }
}

/// Derived parameters and the most recent stroke, for display.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineSummary {
    pub min_angular_width_deg: f64,
    pub max_angular_width_deg: f64,
    pub shaft_radius_m: f64,
    pub vane_radius_m: f64,
    pub shaft1_inertia_kg_m2: f64,
    pub shaft2_inertia_kg_m2: f64,
    pub compression_ratio: f64,
    pub reaction_moment_nm: f64,
    pub net_work_j: f64,
    pub expansion_width_deg: f64,
    pub stroke: Option<StrokeReport>,
}

/// Two vane shafts, the bisector and the gas between them.
#[derive(Clone, Debug)]
pub struct Engine {
    geometry: VaneGeometry,
    thermo: ThermodynamicModel,
    min_width: f64,
    max_width: f64,
    reaction_moment: f64,
    drive: Drivetrain,
    integrator: StrokeIntegrator,
    last_stroke: Option<StrokeReport>,
}

impl Engine {
    /// Build and validate an engine.
    ///
    /// The chamber widths follow from the vane angle α and the initial
    /// compression angle:
    ///
    /// ```text
    /// w_min = compression angle
    /// w_max = (2π - 2 w_min - 4α) / 2
    /// ```
    pub fn new(params: EngineParams) -> SimResult<Self> {
        let geometry = VaneGeometry::new(params.vane_angle, params.chamber_volume)?;
        let integrator = StrokeIntegrator::new(params.stroke)?;

        let min_width = ensure_finite(
            params.initial_compression_angle.get::<radian>(),
            "initial compression angle",
        )?;
        if min_width <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "initial compression angle must be positive",
            });
        }
        let max_width = (2.0 * PI - 2.0 * min_width - 4.0 * geometry.vane_angle()) / 2.0;
        if max_width <= min_width {
            return Err(SimError::InvalidArg {
                what: "compression angle too large for the vane angle",
            });
        }

        let thermo = ThermodynamicModel::new(params.gas, &geometry, min_width, max_width)?;

        let [spec1, spec2] = params.machines;
        let shaft1 = build_shaft(&geometry, &spec1)?;
        let shaft2 = build_shaft(&geometry, &spec2)?;
        let bisector = RotatingBody::new(shaft1.inertia() + shaft2.inertia(), None)?;

        let drive = Drivetrain {
            shaft1,
            shaft2,
            bisector,
            expansion_width: min_width,
            compression_width: max_width,
            summed_width: geometry.summed_chamber_angle(),
            expansion_torque: 0.0,
            compression_torque: 0.0,
            elapsed_s: 0.0,
        };

        let reaction_moment =
            2.0 * thermo.state().net_work() / (max_width - min_width);

        let mut engine = Self {
            geometry,
            thermo,
            min_width,
            max_width,
            reaction_moment,
            drive,
            integrator,
            last_stroke: None,
        };
        engine.assign_reaction_moments(Direction::Forward);
        Ok(engine)
    }

    /// Split the required reaction moment between the fitted machines.
    ///
    /// With two machines each carries half, shaft 1 braking against the
    /// direction and shaft 2 with it; a single machine carries the whole
    /// moment.
    pub fn assign_reaction_moments(&mut self, direction: Direction) {
        let d = direction.sign();
        let moment = self.reaction_moment;
        let has1 = self.drive.shaft1.has_machine();
        let has2 = self.drive.shaft2.has_machine();

        let (m1, m2) = match (has1, has2) {
            (true, true) => (-d * moment / 2.0, d * moment / 2.0),
            (true, false) => (-d * moment, 0.0),
            (false, true) => (0.0, d * moment),
            (false, false) => {
                warn!("no electric machine fitted; gas work is not absorbed");
                return;
            }
        };
        if let Some(machine) = self.drive.shaft1.machine_mut() {
            machine.set_moment(m1);
        }
        if let Some(machine) = self.drive.shaft2.machine_mut() {
            machine.set_moment(m2);
        }
    }

    /// Moment that absorbs one stroke's net gas work over the angular travel
    /// between the chamber limits (N·m).
    pub fn required_reaction_moment(&self) -> f64 {
        self.reaction_moment
    }

    /// Reset all bodies and place the shafts symmetrically about zero.
    pub fn initialize_shafts(&mut self, initial_speed: f64) {
        let drive = &mut self.drive;
        drive.expansion_width = self.min_width;
        drive.compression_width = self.max_width;
        drive.expansion_torque = 0.0;
        drive.compression_torque = 0.0;
        drive.elapsed_s = 0.0;

        drive.shaft1.reset();
        drive.shaft2.reset();
        drive.bisector.reset();

        let p1 = self.min_width / 2.0;
        let p2 = -self.min_width / 2.0;
        drive.shaft1.initialize(p1, initial_speed);
        drive.shaft2.initialize(p2, initial_speed);
        drive.bisector.initialize((p1 + p2) / 2.0, initial_speed);
    }

    /// Integrate one stroke from the current state.
    pub fn execute_stroke(
        &mut self,
        direction: Direction,
        sink: &mut dyn TelemetrySink,
    ) -> SimResult<StrokeReport> {
        let report = self
            .integrator
            .execute(&mut self.drive, &self.thermo, direction, sink)?;
        self.last_stroke = Some(report.clone());
        Ok(report)
    }

    /// Run `count` consecutive strokes, alternating the leading vane.
    ///
    /// After each stroke the compressed chamber becomes the next working
    /// chamber.
    pub fn run_strokes(
        &mut self,
        count: usize,
        initial_speed: f64,
        leading: LeadingVane,
        sink: &mut dyn TelemetrySink,
    ) -> SimResult<Vec<StrokeReport>> {
        ensure_finite(initial_speed, "initial speed")?;
        self.initialize_shafts(initial_speed);

        let mut direction = leading.direction();
        let mut reports = Vec::with_capacity(count);
        for index in 0..count {
            sink.begin_stroke(index, direction)?;
            let report = self.execute_stroke(direction, sink)?;
            sink.end_stroke(&report)?;
            info!(
                stroke = index,
                ?direction,
                duration_ms = report.duration_s * 1e3,
                "stroke finished"
            );
            reports.push(report);

            direction = direction.flipped();
            self.drive.expansion_width = self.drive.compression_width;
        }
        Ok(reports)
    }

    /// Common shaft speed that brings the bisector to 90° in one stroke,
    /// from the last stroke's duration and bisector angle (rad/s).
    pub fn inferred_initial_speed(&self) -> SimResult<f64> {
        let stroke = self.completed_stroke()?;
        Ok((FRAC_PI_2 - stroke.bisector_angle_rad) / stroke.duration_s)
    }

    /// Net gas work over the last stroke's duration (W).
    pub fn average_power(&self) -> SimResult<f64> {
        let stroke = self.completed_stroke()?;
        Ok(self.thermo.state().net_work() / stroke.duration_s)
    }

    fn completed_stroke(&self) -> SimResult<&StrokeReport> {
        let stroke = self.last_stroke.as_ref().ok_or(SimError::NoStroke {
            what: "no stroke has been executed",
        })?;
        if stroke.duration_s <= 0.0 {
            return Err(SimError::NoStroke {
                what: "last stroke has zero duration",
            });
        }
        Ok(stroke)
    }

    /// Volume swept between the chamber limits.
    pub fn volume_exhaust_intake(&self) -> Volume {
        self.geometry
            .angle_to_volume(self.max_width - self.min_width)
    }

    pub fn max_volume(&self) -> Volume {
        self.geometry.angle_to_volume(self.max_width)
    }

    pub fn min_volume(&self) -> Volume {
        self.geometry.angle_to_volume(self.min_width)
    }

    pub fn summary(&self) -> EngineSummary {
        EngineSummary {
            min_angular_width_deg: self.min_width.to_degrees(),
            max_angular_width_deg: self.max_width.to_degrees(),
            shaft_radius_m: self.geometry.shaft_radius().value,
            vane_radius_m: self.geometry.vane_radius().value,
            shaft1_inertia_kg_m2: self.drive.shaft1.inertia(),
            shaft2_inertia_kg_m2: self.drive.shaft2.inertia(),
            compression_ratio: self.thermo.compression_ratio(),
            reaction_moment_nm: self.reaction_moment,
            net_work_j: self.thermo.state().net_work(),
            expansion_width_deg: self.drive.expansion_width.to_degrees(),
            stroke: self.last_stroke.clone(),
        }
    }

    pub fn geometry(&self) -> &VaneGeometry {
        &self.geometry
    }

    pub fn thermo(&self) -> &ThermodynamicModel {
        &self.thermo
    }

    pub fn drivetrain(&self) -> &Drivetrain {
        &self.drive
    }

    pub fn shaft1(&self) -> &RotatingBody {
        &self.drive.shaft1
    }

    pub fn shaft2(&self) -> &RotatingBody {
        &self.drive.shaft2
    }

    pub fn bisector(&self) -> &RotatingBody {
        &self.drive.bisector
    }

    pub fn min_angular_width(&self) -> f64 {
        self.min_width
    }

    pub fn max_angular_width(&self) -> f64 {
        self.max_width
    }

    pub fn compression_ratio(&self) -> f64 {
        self.thermo.compression_ratio()
    }

    pub fn stroke_options(&self) -> &StrokeOptions {
        self.integrator.options()
    }

    pub fn last_stroke(&self) -> Option<&StrokeReport> {
        self.last_stroke.as_ref()
    }
}

fn build_shaft(geometry: &VaneGeometry, spec: &MachineSpec) -> SimResult<RotatingBody> {
    let inertia = geometry.loaded_inertia(spec.rotor_inertia_kg_m2)?;
    let machine = if spec.attached {
        Some(ElectricMachine::new(spec.profile)?)
    } else {
        None
    };
    RotatingBody::new(inertia, machine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::NullSink;
    use proptest::prelude::*;

    #[test]
    fn reference_widths_and_ratio() {
        let engine = Engine::new(EngineParams::reference()).unwrap();
        assert!((engine.min_angular_width() - 10f64.to_radians()).abs() < 1e-12);
        assert!((engine.max_angular_width() - FRAC_PI_2).abs() < 1e-12);
        assert!((engine.compression_ratio() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn reference_reaction_moment() {
        let engine = Engine::new(EngineParams::reference()).unwrap();
        assert!((engine.required_reaction_moment() - 1382.885_611_630_664_7).abs() < 1e-6);
    }

    #[test]
    fn symmetric_machines_get_opposite_moments() {
        let engine = Engine::new(EngineParams::reference()).unwrap();
        let m1 = engine.shaft1().reaction_moment(0.0);
        let m2 = engine.shaft2().reaction_moment(0.0);
        assert!(m1 < 0.0);
        assert_eq!(m1, -m2);
        assert!((m2 - engine.required_reaction_moment() / 2.0).abs() < 1e-12);
        assert_eq!(engine.shaft1().inertia(), engine.shaft2().inertia());
    }

    #[test]
    fn single_machine_carries_whole_moment() {
        let mut params = EngineParams::reference();
        params.machines[0] = MachineSpec::default();
        let engine = Engine::new(params).unwrap();
        assert_eq!(engine.shaft1().reaction_moment(0.0), 0.0);
        assert_eq!(
            engine.shaft2().reaction_moment(0.0),
            engine.required_reaction_moment()
        );
    }

    #[test]
    fn rotor_inertia_loads_shaft_even_without_machine() {
        let mut params = EngineParams::reference();
        params.machines[1] = MachineSpec {
            attached: false,
            rotor_inertia_kg_m2: 0.0134,
            profile: MomentProfile::Constant,
        };
        let engine = Engine::new(params).unwrap();
        let diff = engine.shaft2().inertia() - engine.shaft1().inertia();
        assert!((diff - 0.0134).abs() < 1e-12);
        assert_eq!(
            engine.bisector().inertia(),
            engine.shaft1().inertia() + engine.shaft2().inertia()
        );
    }

    #[test]
    fn initialize_places_shafts_symmetrically() {
        let mut engine = Engine::new(EngineParams::reference()).unwrap();
        engine.initialize_shafts(12.0);
        let half = engine.min_angular_width() / 2.0;
        assert_eq!(engine.shaft1().position(), half);
        assert_eq!(engine.shaft2().position(), -half);
        assert_eq!(engine.bisector().position(), 0.0);
        assert_eq!(engine.shaft1().velocity(), 12.0);
        assert_eq!(engine.bisector().velocity(), 12.0);
        assert_eq!(
            engine.drivetrain().expansion_width(),
            engine.min_angular_width()
        );
        assert_eq!(engine.drivetrain().elapsed_s(), 0.0);
    }

    #[test]
    fn rejects_compression_angle_beyond_geometry() {
        let mut params = EngineParams::reference();
        params.initial_compression_angle = deg(60.0);
        assert!(Engine::new(params).is_err());

        let mut params = EngineParams::reference();
        params.initial_compression_angle = deg(0.0);
        assert!(Engine::new(params).is_err());
    }

    #[test]
    fn derived_outputs_need_a_stroke() {
        let engine = Engine::new(EngineParams::reference()).unwrap();
        assert!(matches!(
            engine.inferred_initial_speed(),
            Err(SimError::NoStroke { .. })
        ));
        assert!(engine.average_power().is_err());
    }

    #[test]
    fn zero_strokes_only_initializes() {
        let mut engine = Engine::new(EngineParams::reference()).unwrap();
        let reports = engine
            .run_strokes(0, 5.0, LeadingVane::Shaft1, &mut NullSink)
            .unwrap();
        assert!(reports.is_empty());
        assert_eq!(engine.shaft1().velocity(), 5.0);
    }

    #[test]
    fn volumes_follow_widths() {
        let engine = Engine::new(EngineParams::reference()).unwrap();
        let swept = engine.volume_exhaust_intake().value;
        assert!((swept - (engine.max_volume().value - engine.min_volume().value)).abs() < 1e-15);
    }

    proptest! {
        #[test]
        fn valid_geometry_orders_widths(
            vane_deg in 5.0_f64..60.0,
            compression_deg in 1.0_f64..20.0,
            volume in 1e-5_f64..1e-2,
        ) {
            let params = EngineParams {
                vane_angle: deg(vane_deg),
                chamber_volume: m3(volume),
                initial_compression_angle: deg(compression_deg),
                ..EngineParams::reference()
            };
            if let Ok(engine) = Engine::new(params) {
                prop_assert!(engine.min_angular_width() < engine.max_angular_width());
                prop_assert!(engine.compression_ratio() > 1.0);
                let m1 = engine.shaft1().reaction_moment(0.0);
                let m2 = engine.shaft2().reaction_moment(0.0);
                prop_assert_eq!(m1, -m2);
            }
        }
    }
}
