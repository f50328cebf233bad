//! Quantity identifiers: the storage key for seeds and cache entries and the
//! reference used by formula dependencies.

use crate::analysis::units::Unit;
use serde::{Serialize, Deserialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityId {
    // Bulk properties
    Mass,
    Radius,
    Luminosity,
    Temperature,
    PeakWavelength,
    Lifetime,
    Age,
    Density,
    Circumference,
    SurfaceArea,
    Volume,
    SurfaceGravity,
    EscapeVelocity,
    SurfacePressure,
    AppearanceFrequency,

    // Orbit
    SemiMajorAxis,
    Eccentricity,
    SemiMinorAxis,
    Periapsis,
    Apoapsis,
    OrbitalPeriod,
    OrbitalVelocity,
    SpinPeriod,
    DayLength,

    // Orbital limits
    RoughInnerOrbitLimit,
    RoughOuterOrbitLimit,
    DenseRocheLimit,
    RocheLimit,
    HillSphereRadius,
    RocheLobeRadius,
    TidalLockingRadius,
    StypeCriticalOrbit,
    PtypeCriticalOrbit,
    SecondaryMassRatio,
    InnerOrbitLimit,
    OuterOrbitLimit,
    SemiMajorAxisMinimum,
    SemiMajorAxisMaximum,

    // Radiation and zones
    Insolation,
    ThermalInsolation,
    CompanionInsolation,
    HabitableZoneInner,
    HabitableZoneOuter,
    OptimisticHabitableZoneInner,
    OptimisticHabitableZoneOuter,
    WaterFrostLine,
    RockLine,
    Albedo,
    Greenhouse,
    HeatDistribution,
    Emissivity,

    // Geophysics
    TidalHeating,
    PrimordialHeating,
    RadiogenicHeating,
    InternalHeating,
    ParentAngularDiameter,
    TideHeight,
    ParentTideHeight,
}

impl QuantityId {
    pub const ALL: [QuantityId; 58] = [
        QuantityId::Mass,
        QuantityId::Radius,
        QuantityId::Luminosity,
        QuantityId::Temperature,
        QuantityId::PeakWavelength,
        QuantityId::Lifetime,
        QuantityId::Age,
        QuantityId::Density,
        QuantityId::Circumference,
        QuantityId::SurfaceArea,
        QuantityId::Volume,
        QuantityId::SurfaceGravity,
        QuantityId::EscapeVelocity,
        QuantityId::SurfacePressure,
        QuantityId::AppearanceFrequency,
        QuantityId::SemiMajorAxis,
        QuantityId::Eccentricity,
        QuantityId::SemiMinorAxis,
        QuantityId::Periapsis,
        QuantityId::Apoapsis,
        QuantityId::OrbitalPeriod,
        QuantityId::OrbitalVelocity,
        QuantityId::SpinPeriod,
        QuantityId::DayLength,
        QuantityId::RoughInnerOrbitLimit,
        QuantityId::RoughOuterOrbitLimit,
        QuantityId::DenseRocheLimit,
        QuantityId::RocheLimit,
        QuantityId::HillSphereRadius,
        QuantityId::RocheLobeRadius,
        QuantityId::TidalLockingRadius,
        QuantityId::StypeCriticalOrbit,
        QuantityId::PtypeCriticalOrbit,
        QuantityId::SecondaryMassRatio,
        QuantityId::InnerOrbitLimit,
        QuantityId::OuterOrbitLimit,
        QuantityId::SemiMajorAxisMinimum,
        QuantityId::SemiMajorAxisMaximum,
        QuantityId::Insolation,
        QuantityId::ThermalInsolation,
        QuantityId::CompanionInsolation,
        QuantityId::HabitableZoneInner,
        QuantityId::HabitableZoneOuter,
        QuantityId::OptimisticHabitableZoneInner,
        QuantityId::OptimisticHabitableZoneOuter,
        QuantityId::WaterFrostLine,
        QuantityId::RockLine,
        QuantityId::Albedo,
        QuantityId::Greenhouse,
        QuantityId::HeatDistribution,
        QuantityId::Emissivity,
        QuantityId::TidalHeating,
        QuantityId::PrimordialHeating,
        QuantityId::RadiogenicHeating,
        QuantityId::InternalHeating,
        QuantityId::ParentAngularDiameter,
        QuantityId::TideHeight,
        QuantityId::ParentTideHeight,
    ];

    /// The snake_case identifier, identical to the serialized form.
    pub fn name(&self) -> &'static str {
        use QuantityId::*;
        match self {
            Mass => "mass",
            Radius => "radius",
            Luminosity => "luminosity",
            Temperature => "temperature",
            PeakWavelength => "peak_wavelength",
            Lifetime => "lifetime",
            Age => "age",
            Density => "density",
            Circumference => "circumference",
            SurfaceArea => "surface_area",
            Volume => "volume",
            SurfaceGravity => "surface_gravity",
            EscapeVelocity => "escape_velocity",
            SurfacePressure => "surface_pressure",
            AppearanceFrequency => "appearance_frequency",
            SemiMajorAxis => "semi_major_axis",
            Eccentricity => "eccentricity",
            SemiMinorAxis => "semi_minor_axis",
            Periapsis => "periapsis",
            Apoapsis => "apoapsis",
            OrbitalPeriod => "orbital_period",
            OrbitalVelocity => "orbital_velocity",
            SpinPeriod => "spin_period",
            DayLength => "day_length",
            RoughInnerOrbitLimit => "rough_inner_orbit_limit",
            RoughOuterOrbitLimit => "rough_outer_orbit_limit",
            DenseRocheLimit => "dense_roche_limit",
            RocheLimit => "roche_limit",
            HillSphereRadius => "hill_sphere_radius",
            RocheLobeRadius => "roche_lobe_radius",
            TidalLockingRadius => "tidal_locking_radius",
            StypeCriticalOrbit => "stype_critical_orbit",
            PtypeCriticalOrbit => "ptype_critical_orbit",
            SecondaryMassRatio => "secondary_mass_ratio",
            InnerOrbitLimit => "inner_orbit_limit",
            OuterOrbitLimit => "outer_orbit_limit",
            SemiMajorAxisMinimum => "semi_major_axis_minimum",
            SemiMajorAxisMaximum => "semi_major_axis_maximum",
            Insolation => "insolation",
            ThermalInsolation => "thermal_insolation",
            CompanionInsolation => "companion_insolation",
            HabitableZoneInner => "habitable_zone_inner",
            HabitableZoneOuter => "habitable_zone_outer",
            OptimisticHabitableZoneInner => "optimistic_habitable_zone_inner",
            OptimisticHabitableZoneOuter => "optimistic_habitable_zone_outer",
            WaterFrostLine => "water_frost_line",
            RockLine => "rock_line",
            Albedo => "albedo",
            Greenhouse => "greenhouse",
            HeatDistribution => "heat_distribution",
            Emissivity => "emissivity",
            TidalHeating => "tidal_heating",
            PrimordialHeating => "primordial_heating",
            RadiogenicHeating => "radiogenic_heating",
            InternalHeating => "internal_heating",
            ParentAngularDiameter => "parent_angular_diameter",
            TideHeight => "tide_height",
            ParentTideHeight => "parent_tide_height",
        }
    }

    pub fn canonical_unit(&self) -> Unit {
        use QuantityId::*;
        match self {
            Mass => Unit::Kilogram,
            Luminosity => Unit::Watt,
            Temperature => Unit::Kelvin,
            Density => Unit::KilogramPerCubicMeter,
            SurfaceArea => Unit::SquareMeter,
            Volume => Unit::CubicMeter,
            SurfaceGravity => Unit::MeterPerSecondSquared,
            EscapeVelocity | OrbitalVelocity => Unit::MeterPerSecond,
            SurfacePressure => Unit::Pascal,
            Lifetime | Age | OrbitalPeriod | SpinPeriod | DayLength => Unit::Second,
            Insolation | ThermalInsolation | CompanionInsolation => Unit::WattPerSquareMeter,
            TidalHeating | PrimordialHeating | RadiogenicHeating | InternalHeating => {
                Unit::WattPerSquareMeter
            }
            ParentAngularDiameter => Unit::Radian,
            Eccentricity | SecondaryMassRatio | AppearanceFrequency | Albedo | Greenhouse | HeatDistribution
            | Emissivity => Unit::Dimensionless,
            Radius | PeakWavelength | Circumference | SemiMajorAxis | SemiMinorAxis | Periapsis
            | Apoapsis | RoughInnerOrbitLimit | RoughOuterOrbitLimit | DenseRocheLimit
            | RocheLimit | HillSphereRadius | RocheLobeRadius | TidalLockingRadius
            | StypeCriticalOrbit | PtypeCriticalOrbit | InnerOrbitLimit | OuterOrbitLimit
            | SemiMajorAxisMinimum | SemiMajorAxisMaximum | HabitableZoneInner
            | HabitableZoneOuter | OptimisticHabitableZoneInner | OptimisticHabitableZoneOuter
            | WaterFrostLine | RockLine | TideHeight | ParentTideHeight => Unit::Meter,
        }
    }
}

impl fmt::Display for QuantityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_is_exhaustive_and_unique() {
        let names: HashSet<&str> = QuantityId::ALL.iter().map(|q| q.name()).collect();
        assert_eq!(names.len(), QuantityId::ALL.len());
    }

    #[test]
    fn test_name_matches_serialized_form() {
        for q in QuantityId::ALL {
            let json = serde_json::to_string(&q).unwrap();
            assert_eq!(json, format!("\"{}\"", q.name()));
        }
    }
}
