use uom::si::f64::{Length, Pressure, ThermodynamicTemperature};
use uom::si::length::{foot, meter};
use uom::si::pressure::{bar, pound_force_per_square_inch};
use uom::si::thermodynamic_temperature::{degree_celsius, degree_fahrenheit};

/// Weight of one metre of sea water column in mbar/cm units: density × g
pub const SPECIFIC_WEIGHT: f64 = 1.024 * 0.980665;

/// Depth in metres below the surface for an absolute pressure reading
pub fn pressure_to_depth(pressure_mbar: u32, surface_mbar: u32) -> f64 {
    f64::from(pressure_mbar.saturating_sub(surface_mbar)) / SPECIFIC_WEIGHT / 100.0
}

pub fn feet_to_meters(feet: f64) -> f64 {
    Length::new::<foot>(feet).get::<meter>()
}

pub fn psi_to_bar(psi: f64) -> f64 {
    Pressure::new::<pound_force_per_square_inch>(psi).get::<bar>()
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    ThermodynamicTemperature::new::<degree_fahrenheit>(fahrenheit).get::<degree_celsius>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_pressure_is_zero_depth() {
        for surface in [0, 980, 1013, 1030, u32::MAX] {
            assert_eq!(pressure_to_depth(surface, surface), 0.0, "surface {surface}");
        }
        assert_eq!(pressure_to_depth(900, 1013), 0.0, "Below-surface readings clamp to zero");
    }

    #[test]
    fn test_depth_is_monotonic() {
        let mut previous = 0.0;
        for mbar in (1000..6000).step_by(7) {
            let depth = pressure_to_depth(mbar, 1013);
            assert!(depth >= previous, "{mbar} mbar gave {depth} < {previous}");
            previous = depth;
        }
        // 10 m of sea water is about 1004 mbar
        assert!((pressure_to_depth(2017, 1013) - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_unit_conversions() {
        assert!((feet_to_meters(100.0) - 30.48).abs() < 1e-9);
        assert!((psi_to_bar(3000.0) - 206.843).abs() < 1e-3);
        assert!((fahrenheit_to_celsius(77.0) - 25.0).abs() < 1e-9);
    }
}
