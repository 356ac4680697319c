//! gv-core: shared foundation for the vane engine simulator.
//!
//! Contains:
//! - units (uom SI types + constructors, angle and speed conversions)
//! - numeric (finite/positive argument checks)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
