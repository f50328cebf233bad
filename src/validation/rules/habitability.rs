//! Mass and radius ranges that allow an Earth-like surface.

use crate::analysis::units::{to_earth_masses, to_earth_radii};
use crate::compute::ResolutionError;
use crate::formulas::QuantityId as Q;
use crate::store::Composition;
use crate::validation::finding::{FindingKind, Severity};
use crate::validation::validator::Scope;
use std::ops::RangeInclusive;

/// Habitable mass and radius ranges in Earth units.
struct WorldLimits {
    mass: RangeInclusive<f64>,
    radius: RangeInclusive<f64>,
}

const ROCKY: WorldLimits = WorldLimits { mass: 0.1..=5.0, radius: 0.45..=2.0 };
const WATERY: WorldLimits = WorldLimits { mass: 0.0268..=12.0, radius: 0.45..=2.8 };

fn limits_for(composition: Composition) -> Option<&'static WorldLimits> {
    if composition.is_water() {
        Some(&WATERY)
    } else if composition.is_rocky() && !composition.is_iron() {
        Some(&ROCKY)
    } else {
        None
    }
}

pub(crate) fn check(scope: &mut Scope<'_, '_>) -> Result<(), ResolutionError> {
    if !scope.is_world() {
        return Ok(());
    }
    let Some(limits) = scope.composition.and_then(limits_for) else { return Ok(()) };

    if let Some(mass) = scope.own(Q::Mass)? {
        let me = to_earth_masses(mass);
        if !limits.mass.contains(&me) {
            scope.report(
                Severity::Info,
                FindingKind::HabitableMass,
                Q::Mass,
                format!(
                    "mass of {:.3} Earth masses is outside the habitable range ({} to {})",
                    me,
                    limits.mass.start(),
                    limits.mass.end()
                ),
            );
        }
    }

    if let Some(radius) = scope.own(Q::Radius)? {
        let re = to_earth_radii(radius);
        if !limits.radius.contains(&re) {
            scope.report(
                Severity::Info,
                FindingKind::HabitableRadius,
                Q::Radius,
                format!(
                    "radius of {:.3} Earth radii is outside the habitable range ({} to {})",
                    re,
                    limits.radius.start(),
                    limits.radius.end()
                ),
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::analysis::units::*;
    use crate::compute::ResolutionEngine;
    use crate::formulas::QuantityId as Q;
    use crate::store::{BodyKind, Composition, Seeds, SystemHierarchy};
    use crate::validation::{FindingKind, Severity, Validator};
    use rstest::rstest;

    #[rstest]
    #[case::earth(Composition::Rockworld70, 1.0, 1.0, vec![])]
    #[case::heavy_super_earth(Composition::Rockworld70, 8.0, 1.8, vec![FindingKind::HabitableMass])]
    #[case::swollen_rock(Composition::Rockworld100, 1.0, 2.5, vec![FindingKind::HabitableRadius])]
    #[case::heavy_ocean_world(Composition::Waterworld45, 8.0, 2.5, vec![])]
    #[case::tiny_ocean_world(Composition::Waterworld45, 0.05, 0.3, vec![FindingKind::HabitableRadius])]
    #[case::iron_not_checked(Composition::Ironworld67, 8.0, 3.0, vec![])]
    #[case::giant_not_checked(Composition::Gasgiant, 317.8, 11.2, vec![])]
    fn test_habitable_mass_and_radius(
        #[case] composition: Composition,
        #[case] mass_earths: f64,
        #[case] radius_earths: f64,
        #[case] expected: Vec<FindingKind>,
    ) {
        let mut sys = SystemHierarchy::new();
        let star = sys
            .add_body(
                None,
                BodyKind::Star,
                Seeds::named("Sun").with(Q::Mass, SOLAR_MASS).with(Q::Luminosity, SOLAR_LUMINOSITY),
            )
            .unwrap();
        let world = sys
            .add_body(
                Some(star),
                BodyKind::Planet,
                Seeds::named("w")
                    .with(Q::Mass, earth_masses(mass_earths))
                    .with(Q::Radius, radius_earths * EARTH_RADIUS)
                    .with(Q::SemiMajorAxis, au(5.0))
                    .composition(composition),
            )
            .unwrap();
        let engine = ResolutionEngine::new(&sys);
        let findings = Validator::new(&engine).validate(world).unwrap();
        let kinds: Vec<FindingKind> = findings
            .iter()
            .filter(|f| matches!(f.kind, FindingKind::HabitableMass | FindingKind::HabitableRadius))
            .map(|f| f.kind)
            .collect();
        assert_eq!(kinds, expected, "Findings: {:?}", findings);
        assert!(findings
            .iter()
            .filter(|f| matches!(f.kind, FindingKind::HabitableMass | FindingKind::HabitableRadius))
            .all(|f| f.severity == Severity::Info));
    }
}
