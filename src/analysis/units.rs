// rust/src/analysis/units.rs

//! Canonical SI units and the physical constants the formula catalog is written against.

use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use std::fmt;

pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;
pub const STEFAN_BOLTZMANN: f64 = 5.670_374_419e-8;
/// Wien displacement constant, m·K.
pub const WIEN_DISPLACEMENT: f64 = 2.897_771_955e-3;

pub const SOLAR_MASS: f64 = 1.988_47e30;
pub const SOLAR_RADIUS: f64 = 6.957e8;
pub const SOLAR_LUMINOSITY: f64 = 3.828e26;
pub const SOLAR_TEMPERATURE: f64 = 5778.0;

pub const EARTH_MASS: f64 = 5.9722e24;
pub const EARTH_RADIUS: f64 = 6.371e6;
pub const JUPITER_MASS: f64 = 1.898_13e27;

pub const ASTRONOMICAL_UNIT: f64 = 1.495_978_707e11;
pub const LIGHT_YEAR: f64 = 9.460_730_472_580_8e15;

pub const YEAR: f64 = 3.155_76e7;
pub const GIGAYEAR: f64 = 1e9 * YEAR;
pub const HOUR: f64 = 3600.0;

pub const STANDARD_ATMOSPHERE: f64 = 101_325.0;

/// Orbit-averaged flux of one solar luminosity at one astronomical unit.
pub const SOLAR_FLUX: f64 = SOLAR_LUMINOSITY / (4.0 * PI * ASTRONOMICAL_UNIT * ASTRONOMICAL_UNIT);

#[inline(always)]
pub fn au(x: f64) -> f64 { x * ASTRONOMICAL_UNIT }
#[inline(always)]
pub fn to_au(meters: f64) -> f64 { meters / ASTRONOMICAL_UNIT }
#[inline(always)]
pub fn solar_masses(x: f64) -> f64 { x * SOLAR_MASS }
#[inline(always)]
pub fn to_solar_masses(kg: f64) -> f64 { kg / SOLAR_MASS }
#[inline(always)]
pub fn solar_luminosities(x: f64) -> f64 { x * SOLAR_LUMINOSITY }
#[inline(always)]
pub fn to_solar_luminosities(watts: f64) -> f64 { watts / SOLAR_LUMINOSITY }
#[inline(always)]
pub fn earth_masses(x: f64) -> f64 { x * EARTH_MASS }
#[inline(always)]
pub fn to_earth_masses(kg: f64) -> f64 { kg / EARTH_MASS }
#[inline(always)]
pub fn to_earth_radii(meters: f64) -> f64 { meters / EARTH_RADIUS }
#[inline(always)]
pub fn gigayears(x: f64) -> f64 { x * GIGAYEAR }
#[inline(always)]
pub fn to_gigayears(seconds: f64) -> f64 { seconds / GIGAYEAR }
#[inline(always)]
pub fn to_solar_flux(flux: f64) -> f64 { flux / SOLAR_FLUX }

/// The canonical unit of a quantity. Values are always stored in these units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Kilogram,
    Meter,
    SquareMeter,
    CubicMeter,
    Second,
    Watt,
    WattPerSquareMeter,
    Kelvin,
    KilogramPerCubicMeter,
    MeterPerSecond,
    MeterPerSecondSquared,
    Pascal,
    Radian,
    Dimensionless,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Kilogram => "kg",
            Unit::Meter => "m",
            Unit::SquareMeter => "m^2",
            Unit::CubicMeter => "m^3",
            Unit::Second => "s",
            Unit::Watt => "W",
            Unit::WattPerSquareMeter => "W/m^2",
            Unit::Kelvin => "K",
            Unit::KilogramPerCubicMeter => "kg/m^3",
            Unit::MeterPerSecond => "m/s",
            Unit::MeterPerSecondSquared => "m/s^2",
            Unit::Pascal => "Pa",
            Unit::Radian => "rad",
            Unit::Dimensionless => "1",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_solar_flux_matches_solar_constant() {
        assert_relative_eq!(SOLAR_FLUX, 1361.0, max_relative = 1e-3);
        assert_relative_eq!(to_solar_flux(SOLAR_FLUX), 1.0);
    }

    #[test]
    fn test_conversions_invert() {
        assert_relative_eq!(to_au(au(5.2)), 5.2);
        assert_relative_eq!(to_solar_masses(solar_masses(0.8)), 0.8);
        assert_relative_eq!(to_gigayears(gigayears(4.6)), 4.6);
        assert_relative_eq!(SOLAR_MASS / EARTH_MASS, 332_946.0, max_relative = 1e-4);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(Unit::WattPerSquareMeter.to_string(), "W/m^2");
        assert_eq!(Unit::Dimensionless.symbol(), "1");
    }
}
