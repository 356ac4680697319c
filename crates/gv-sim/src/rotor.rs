//! Rotating body dynamics for the vane shafts and the bisector.

use crate::error::SimResult;
use crate::machine::ElectricMachine;
use gv_core::angle::rad_s_to_rpm;
use gv_core::ensure_positive;

/// Sign applied to every torque during a stroke.
///
/// The leading and trailing vanes swap each stroke, so the controller flips
/// the direction between consecutive strokes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    /// +1.0 for forward, -1.0 for reverse.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// A shaft (or the virtual bisector) rotating under applied torque.
///
/// Each call to [`RotatingBody::apply_torque`] advances the body by one fixed
/// time step:
///
/// ```text
/// α  = d * τ / J
/// Δω = α * Δt
/// Δθ = (ω + Δω / 2) * Δt
/// θ += Δθ,  ω += Δω
/// ```
///
/// The position update uses the average of the old and new velocity rather
/// than the old velocity alone; the stroke termination test depends on it.
///
/// The moment of inertia is fixed at construction. For a vane shaft it is the
/// geometric inertia plus the rotor inertia of the machine mounted on it.
#[derive(Clone, Debug)]
pub struct RotatingBody {
    /// Moment of inertia (kg·m²)
    inertia: f64,
    /// Angular position (rad)
    position: f64,
    /// Angular velocity (rad/s)
    velocity: f64,
    /// Angular acceleration from the last step (rad/s²)
    acceleration: f64,
    /// Position change during the last step (rad)
    displacement: f64,
    /// Velocity change during the last step (rad/s)
    velocity_delta: f64,
    machine: Option<ElectricMachine>,
}

impl RotatingBody {
    /// Create a body at rest.
    ///
    /// # Errors
    /// Returns error if `inertia` is not finite and positive.
    pub fn new(inertia: f64, machine: Option<ElectricMachine>) -> SimResult<Self> {
        let inertia = ensure_positive(inertia, "moment of inertia")?;
        Ok(Self {
            inertia,
            position: 0.0,
            velocity: 0.0,
            acceleration: 0.0,
            displacement: 0.0,
            velocity_delta: 0.0,
            machine,
        })
    }

    /// Zero the step deltas and acceleration, then place the body.
    pub fn initialize(&mut self, position: f64, velocity: f64) {
        self.acceleration = 0.0;
        self.displacement = 0.0;
        self.velocity_delta = 0.0;
        self.position = position;
        self.velocity = velocity;
    }

    /// Return to the canonical zero state.
    pub fn reset(&mut self) {
        self.initialize(0.0, 0.0);
    }

    /// Advance one time step under `torque` (N·m) applied with `direction`.
    pub fn apply_torque(&mut self, direction: Direction, torque: f64, dt: f64) {
        self.acceleration = direction.sign() * torque / self.inertia;
        self.velocity_delta = self.acceleration * dt;
        let average_velocity = self.velocity + self.velocity_delta / 2.0;
        self.displacement = average_velocity * dt;
        self.position += self.displacement;
        self.velocity += self.velocity_delta;
    }

    /// Reaction moment of the attached machine `elapsed` seconds into the
    /// stroke, or zero without a machine.
    pub fn reaction_moment(&self, elapsed: f64) -> f64 {
        self.machine
            .as_ref()
            .map_or(0.0, |machine| machine.moment_at(elapsed))
    }

    pub fn has_machine(&self) -> bool {
        self.machine.is_some()
    }

    pub fn machine(&self) -> Option<&ElectricMachine> {
        self.machine.as_ref()
    }

    pub fn machine_mut(&mut self) -> Option<&mut ElectricMachine> {
        self.machine.as_mut()
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    pub fn displacement(&self) -> f64 {
        self.displacement
    }

    pub fn velocity_delta(&self) -> f64 {
        self.velocity_delta
    }

    pub fn speed_rpm(&self) -> f64 {
        rad_s_to_rpm(self.velocity)
    }
}
