use uom::si::f64::{
    Angle as UomAngle, Area as UomArea, Energy as UomEnergy, Length as UomLength,
    MomentOfInertia as UomMomentOfInertia, Pressure as UomPressure,
    TemperatureInterval as UomTemperatureInterval,
    ThermodynamicTemperature as UomThermodynamicTemperature, Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Angle = UomAngle;
pub type Area = UomArea;
pub type Energy = UomEnergy;
pub type Inertia = UomMomentOfInertia;
pub type Length = UomLength;
pub type Pressure = UomPressure;
pub type TempInterval = UomTemperatureInterval;
pub type Temperature = UomThermodynamicTemperature;
pub type Volume = UomVolume;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn delta_k(v: f64) -> TempInterval {
    use uom::si::temperature_interval::kelvin;
    TempInterval::new::<kelvin>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

#[inline]
pub fn kg_m2(v: f64) -> Inertia {
    use uom::si::moment_of_inertia::kilogram_square_meter;
    Inertia::new::<kilogram_square_meter>(v)
}

#[inline]
pub fn j(v: f64) -> Energy {
    use uom::si::energy::joule;
    Energy::new::<joule>(v)
}

/// Raw-float angle helpers for hot loops that stay in radians.
pub mod angle {
    use std::f64::consts::PI;

    #[inline]
    pub fn deg_to_rad(v: f64) -> f64 {
        v * PI / 180.0
    }

    #[inline]
    pub fn rad_to_deg(v: f64) -> f64 {
        v * 180.0 / PI
    }

    /// Angular speed in revolutions per minute.
    #[inline]
    pub fn rad_s_to_rpm(v: f64) -> f64 {
        v * 60.0 / (2.0 * PI)
    }
}

pub mod constants {
    /// Density of the steel used for shafts and vanes (kg/m³).
    pub const STEEL_DENSITY_KG_M3: f64 = 7800.0;

    /// Atmospheric intake pressure (Pa).
    pub const ATMOSPHERIC_PRESSURE_PA: f64 = 1.0e5;

    /// Intake charge temperature (K).
    pub const AMBIENT_TEMPERATURE_K: f64 = 300.0;
}

#[cfg(test)]
mod tests {
    use super::angle::*;
    use super::*;
    use std::f64::consts::FRAC_PI_2;
    use uom::si::angle::radian;
    use uom::si::thermodynamic_temperature::degree_celsius;

    #[test]
    fn degree_constructor_matches_raw_conversion() {
        let a = deg(40.0);
        assert!((a.get::<radian>() - deg_to_rad(40.0)).abs() < 1e-12);
        assert!((deg(90.0).get::<radian>() - FRAC_PI_2).abs() < 1e-15);
    }

    #[test]
    fn constructors_store_si_values() {
        assert_eq!(pa(1.0e5).value, 1.0e5);
        assert!((k(300.0).get::<degree_celsius>() - 26.85).abs() < 1e-9);
        assert_eq!(delta_k(2000.0).value, 2000.0);
        assert_eq!(m3(1.0e-3).value, 1.0e-3);
        assert_eq!(kg_m2(0.2).value, 0.2);
    }

    #[test]
    fn angle_helpers_invert() {
        assert!((rad_to_deg(deg_to_rad(123.4)) - 123.4).abs() < 1e-12);
        assert!((rad_s_to_rpm(2.0 * std::f64::consts::PI) - 60.0).abs() < 1e-12);
    }
}
