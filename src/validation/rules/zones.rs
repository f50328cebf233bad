//! Placement of worlds relative to their host's formation lines and habitable zone.

use crate::analysis::units::to_au;
use crate::compute::ResolutionError;
use crate::config::HabitableZoneFlavor;
use crate::formulas::{QuantityId as Q, Target};
use crate::store::BodyKind;
use crate::validation::finding::{FindingKind, Severity};
use crate::validation::validator::Scope;

pub(crate) fn check(scope: &mut Scope<'_, '_>) -> Result<(), ResolutionError> {
    if !scope.is_world() {
        return Ok(());
    }
    // Satellites are measured by their planet's distance to the host.
    let distance = match scope.kind {
        BodyKind::Satellite => scope.of(Target::Parent, Q::SemiMajorAxis)?,
        _ => scope.own(Q::SemiMajorAxis)?,
    };
    let Some(d) = distance else { return Ok(()) };

    if let Some(composition) = scope.composition {
        if composition.is_rocky() {
            if let Some(rock_line) = scope.of(Target::RootStar, Q::RockLine)? {
                if d < rock_line {
                    scope.report(
                        Severity::Warning,
                        FindingKind::RockLine,
                        Q::SemiMajorAxis,
                        format!(
                            "orbit at {:.4} AU is inside the host's rock line ({:.4} AU), {:?} worlds cannot form there",
                            to_au(d),
                            to_au(rock_line),
                            composition
                        ),
                    );
                }
            }
        }

        if composition.is_giant() {
            if let Some(frost_line) = scope.of(Target::RootStar, Q::WaterFrostLine)? {
                if d < frost_line {
                    scope.report(
                        Severity::Info,
                        FindingKind::FrostLine,
                        Q::SemiMajorAxis,
                        format!(
                            "giant at {:.4} AU is inside the host's water frost line ({:.4} AU), probably migrated inward",
                            to_au(d),
                            to_au(frost_line)
                        ),
                    );
                }
            }
            return Ok(());
        }

        if composition.is_iron() {
            return Ok(());
        }
    }

    let (inner_q, outer_q, label) = match scope.config.habitable_zone {
        HabitableZoneFlavor::Conservative => (Q::HabitableZoneInner, Q::HabitableZoneOuter, "conservative"),
        HabitableZoneFlavor::Optimistic => {
            (Q::OptimisticHabitableZoneInner, Q::OptimisticHabitableZoneOuter, "optimistic")
        }
    };
    let inner = scope.of(Target::RootStar, inner_q)?;
    let outer = scope.of(Target::RootStar, outer_q)?;
    let message = match (inner, outer) {
        (Some(i), Some(o)) if i >= o => "host has no habitable zone".to_string(),
        (Some(i), Some(o)) if (i..=o).contains(&d) => format!(
            "orbit at {:.4} AU is inside the {} habitable zone ({:.4} to {:.4} AU)",
            to_au(d),
            label,
            to_au(i),
            to_au(o)
        ),
        (Some(i), Some(o)) => format!(
            "orbit at {:.4} AU is outside the {} habitable zone ({:.4} to {:.4} AU)",
            to_au(d),
            label,
            to_au(i),
            to_au(o)
        ),
        _ => return Ok(()),
    };
    scope.report(Severity::Info, FindingKind::HabitableZone, Q::SemiMajorAxis, message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::analysis::units::*;
    use crate::compute::ResolutionEngine;
    use crate::config::{HabitableZoneFlavor, ValidationConfig};
    use crate::formulas::QuantityId as Q;
    use crate::store::{BodyKind, Composition, Seeds, SystemHierarchy};
    use crate::validation::{Finding, FindingKind, Severity, Validator};
    use rstest::rstest;

    fn validate_world(composition: Composition, distance_au: f64, flavor: HabitableZoneFlavor) -> Vec<Finding> {
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
                Seeds::named("w").with(Q::SemiMajorAxis, au(distance_au)).composition(composition),
            )
            .unwrap();
        let engine = ResolutionEngine::new(&sys);
        let config = ValidationConfig { habitable_zone: flavor, ..Default::default() };
        Validator::with_config(&engine, config).validate(world).unwrap()
    }

    fn kinds(findings: &[Finding]) -> Vec<FindingKind> {
        findings.iter().map(|f| f.kind).filter(|k| *k != FindingKind::Tectonics).collect()
    }

    #[rstest]
    #[case::iron_too_close(Composition::Ironworld67, 0.1, vec![FindingKind::RockLine])]
    #[case::hot_jupiter(Composition::Gasgiant, 0.05, vec![FindingKind::FrostLine])]
    #[case::cold_giant(Composition::Gasgiant, 5.2, vec![])]
    #[case::temperate_water_world(Composition::Waterworld45, 1.0, vec![FindingKind::HabitableZone])]
    fn test_zone_findings(#[case] composition: Composition, #[case] distance_au: f64, #[case] expected: Vec<FindingKind>) {
        let findings = validate_world(composition, distance_au, HabitableZoneFlavor::Optimistic);
        let zone_kinds: Vec<FindingKind> = kinds(&findings)
            .into_iter()
            .filter(|k| matches!(k, FindingKind::RockLine | FindingKind::FrostLine | FindingKind::HabitableZone))
            .collect();
        assert_eq!(zone_kinds, expected, "Findings: {:?}", findings);
    }

    #[test]
    fn test_world_without_composition_is_placed_in_zone() {
        let mut sys = SystemHierarchy::new();
        let star = sys
            .add_body(
                None,
                BodyKind::Star,
                Seeds::named("Sun").with(Q::Mass, SOLAR_MASS).with(Q::Luminosity, SOLAR_LUMINOSITY),
            )
            .unwrap();
        let planet = sys
            .add_body(
                Some(star),
                BodyKind::Planet,
                Seeds::named("p").with(Q::SemiMajorAxis, au(1.0)).with(Q::Eccentricity, 0.0),
            )
            .unwrap();
        let engine = ResolutionEngine::new(&sys);
        let insolation = engine.resolve(planet, Q::Insolation).unwrap().value().unwrap();
        approx::assert_relative_eq!(to_solar_flux(insolation), 1.0, max_relative = 1e-12);

        let findings = Validator::new(&engine).validate(planet).unwrap();
        let hz = findings.iter().find(|f| f.kind == FindingKind::HabitableZone).expect("HZ finding");
        assert!(hz.message.contains("inside"), "Msg: {}", hz.message);
        assert!(findings.iter().all(|f| f.severity != Severity::Warning), "Findings: {:?}", findings);
        assert!(findings.iter().all(|f| f.kind != FindingKind::FrostLine));
    }

    #[test]
    fn test_flavor_changes_zone_edges() {
        // 0.9 AU is inside the recent-Venus limit but closer than the runaway greenhouse limit.
        let optimistic = validate_world(Composition::Rockworld70, 0.9, HabitableZoneFlavor::Optimistic);
        let conservative = validate_world(Composition::Rockworld70, 0.9, HabitableZoneFlavor::Conservative);
        let message = |f: &[Finding]| {
            f.iter().find(|x| x.kind == FindingKind::HabitableZone).map(|x| x.message.clone()).unwrap()
        };
        assert!(message(&optimistic).contains("inside the optimistic"));
        assert!(message(&conservative).contains("outside the conservative"));
    }
}
