//! Vane and shaft geometry.

use crate::error::{SimError, SimResult};
use gv_core::constants::STEEL_DENSITY_KG_M3;
use gv_core::units::{Angle, Area, Inertia, Length, Volume, kg_m2, m, m2, m3};
use gv_core::{ensure_finite, ensure_positive};
use std::f64::consts::{FRAC_PI_2, PI};
use uom::si::angle::radian;
use uom::si::volume::cubic_meter;

/// Geometry of one vane shaft, derived from the vane angular width and the
/// combined volume of the two chambers next to a vane.
///
/// ## Assumptions
///
/// - The vane cross-section is square: chamber depth equals the shaft radius
///   and the vane outer radius is three shaft radii.
/// - The width of a vane is twice the shaft radius.
///
/// ```text
/// R1  = (V / (π - 2α))^(1/3) / 2
/// R2  = 3 * R1
/// ssa = π - 2α                  (summed angular width of two neighbouring chambers)
/// V(θ) = 8 * R1³ * θ
/// ```
#[derive(Clone, Debug)]
pub struct VaneGeometry {
    /// Angular width of one vane (rad)
    vane_angle: f64,
    /// Volume of the two chambers adjacent to a vane (m³)
    chamber_volume: f64,
}

impl VaneGeometry {
    /// # Errors
    /// Returns error unless `0 < vane_angle < π/2` and `chamber_volume > 0`.
    pub fn new(vane_angle: Angle, chamber_volume: Volume) -> SimResult<Self> {
        let vane_angle = ensure_positive(vane_angle.get::<radian>(), "vane angle")?;
        if vane_angle >= FRAC_PI_2 {
            return Err(SimError::InvalidArg {
                what: "vane angle must be below 90 degrees",
            });
        }
        let chamber_volume = ensure_positive(chamber_volume.get::<cubic_meter>(), "chamber volume")?;
        Ok(Self {
            vane_angle,
            chamber_volume,
        })
    }

    /// Vane angular width (rad).
    pub fn vane_angle(&self) -> f64 {
        self.vane_angle
    }

    pub fn chamber_volume(&self) -> Volume {
        m3(self.chamber_volume)
    }

    /// Summed angular width of two neighbouring chambers (rad).
    pub fn summed_chamber_angle(&self) -> f64 {
        PI - 2.0 * self.vane_angle
    }

    fn shaft_radius_m(&self) -> f64 {
        (self.chamber_volume / self.summed_chamber_angle()).cbrt() / 2.0
    }

    pub fn shaft_radius(&self) -> Length {
        m(self.shaft_radius_m())
    }

    pub fn vane_radius(&self) -> Length {
        m(3.0 * self.shaft_radius_m())
    }

    /// Chamber volume spanned by an angular width (rad).
    pub fn angle_to_volume(&self, angle: f64) -> Volume {
        m3(8.0 * self.shaft_radius_m().powi(3) * angle)
    }

    pub fn vane_area(&self) -> Area {
        m2(4.0 * self.shaft_radius_m().powi(2))
    }

    /// Distance from the shaft axis to the centre of pressure on a vane.
    pub fn lever_arm(&self) -> Length {
        m(2.0 * self.shaft_radius_m())
    }

    /// Moment of inertia of a steel shaft with its two vanes.
    pub fn moment_of_inertia(&self) -> Inertia {
        let r1 = self.shaft_radius_m();
        let r2 = 3.0 * r1;
        let ring = PI * r1 * STEEL_DENSITY_KG_M3 * (r2.powi(4) - r1.powi(4));
        kg_m2(2.0 * (ring * 2.0 * self.vane_angle) / PI)
    }

    /// Inertia of the shaft plus an attached machine rotor (kg·m²).
    pub fn loaded_inertia(&self, rotor_inertia: f64) -> SimResult<f64> {
        let rotor = ensure_finite(rotor_inertia, "rotor inertia")?;
        if rotor < 0.0 {
            return Err(SimError::InvalidArg {
                what: "rotor inertia cannot be negative",
            });
        }
        Ok(self.moment_of_inertia().value + rotor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gv_core::units::deg;
    use uom::si::length::meter;

    fn reference() -> VaneGeometry {
        VaneGeometry::new(deg(40.0), m3(10e-4)).unwrap()
    }

    #[test]
    fn reference_radii() {
        let g = reference();
        let r1 = g.shaft_radius().get::<meter>();
        assert!((r1 - 0.041_528_305_920_770_746).abs() < 1e-12);
        assert!((g.vane_radius().get::<meter>() - 3.0 * r1).abs() < 1e-15);
    }

    #[test]
    fn reference_inertia() {
        let g = reference();
        assert!((g.moment_of_inertia().value - 0.215_230_104_042_610_56).abs() < 1e-9);
    }

    #[test]
    fn area_and_arm_follow_radius() {
        let g = reference();
        let r1 = g.shaft_radius().value;
        assert!((g.vane_area().value - 4.0 * r1 * r1).abs() < 1e-15);
        assert!((g.lever_arm().value - 2.0 * r1).abs() < 1e-15);
    }

    #[test]
    fn volume_is_linear_in_angle() {
        let g = reference();
        let v1 = g.angle_to_volume(0.5).value;
        let v2 = g.angle_to_volume(1.0).value;
        assert!((2.0 * v1 - v2).abs() < 1e-15);
        // The summed chamber angle spans the configured chamber volume.
        let full = g.angle_to_volume(g.summed_chamber_angle()).value;
        assert!((full - 10e-4).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_geometry() {
        assert!(VaneGeometry::new(deg(0.0), m3(1e-3)).is_err());
        assert!(VaneGeometry::new(deg(95.0), m3(1e-3)).is_err());
        assert!(VaneGeometry::new(deg(40.0), m3(0.0)).is_err());
        assert!(VaneGeometry::new(deg(40.0), m3(-1e-3)).is_err());
    }

    #[test]
    fn loaded_inertia_adds_rotor() {
        let g = reference();
        let loaded = g.loaded_inertia(0.6234e-3).unwrap();
        assert!((loaded - g.moment_of_inertia().value - 0.6234e-3).abs() < 1e-15);
        assert!(g.loaded_inertia(-1.0).is_err());
    }
}
