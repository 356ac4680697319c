//! Stroke simulation for the opposed-vane rotary engine.
//!
//! Provides:
//! - Rotating bodies (two vane shafts plus the virtual bisector) with a
//!   fixed-step average-velocity torque update
//! - Electric machines supplying the reaction moment that absorbs gas work
//! - Vane geometry derivation and the polytropic thermodynamic torque model
//! - The fixed-step stroke integrator and the multi-stroke engine controller
//! - Telemetry records and the sink trait they are written through

pub mod engine;
pub mod error;
pub mod geometry;
pub mod machine;
pub mod rotor;
pub mod stroke;
pub mod telemetry;
pub mod thermo;

// Re-exports for public API
pub use engine::{Drivetrain, Engine, EngineParams, EngineSummary, LeadingVane, MachineSpec};
pub use error::{SimError, SimResult};
pub use geometry::VaneGeometry;
pub use machine::{ElectricMachine, MomentProfile};
pub use rotor::{Direction, RotatingBody};
pub use stroke::{StrokeIntegrator, StrokeOptions, StrokeReport, StrokeStatus};
pub use telemetry::{MemorySink, NullSink, PositionSample, TelemetryRecord, TelemetrySink};
pub use thermo::{GasProperties, PolytropicState, ThermodynamicModel, ThermodynamicState};
