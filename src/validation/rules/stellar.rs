//! Checks on stars and binary pairs.

use crate::analysis::units::{gigayears, to_au, to_gigayears};
use crate::compute::ResolutionError;
use crate::config::HabitableZoneFlavor;
use crate::formulas::QuantityId as Q;
use crate::store::{BodyKind, Placement};
use crate::validation::finding::{FindingKind, Severity};
use crate::validation::validator::Scope;

pub(crate) fn check(scope: &mut Scope<'_, '_>) -> Result<(), ResolutionError> {
    if !matches!(scope.kind, BodyKind::Star | BodyKind::Barycenter) {
        return Ok(());
    }

    if let Some(lifetime) = scope.own(Q::Lifetime)? {
        let minimum = gigayears(scope.config.minimum_stellar_lifetime_gyr);
        if lifetime < minimum {
            scope.report(
                Severity::Info,
                FindingKind::ShortLifetime,
                Q::Lifetime,
                format!(
                    "lifetime of {:.3} Gyr is below {:.1} Gyr, too short for life to develop",
                    to_gigayears(lifetime),
                    scope.config.minimum_stellar_lifetime_gyr
                ),
            );
        }
    }

    if scope.kind == BodyKind::Star && scope.placement == Placement::PairMember {
        if let (Some(radius), Some(lobe)) = (scope.own(Q::Radius)?, scope.own(Q::RocheLobeRadius)?) {
            if radius > lobe {
                scope.report(
                    Severity::Warning,
                    FindingKind::ContactBinary,
                    Q::RocheLobeRadius,
                    format!(
                        "radius {:.4} AU overflows the Roche lobe ({:.4} AU), contact binary",
                        to_au(radius),
                        to_au(lobe)
                    ),
                );
            }
        }
    }

    let (inner_q, outer_q) = match scope.config.habitable_zone {
        HabitableZoneFlavor::Conservative => (Q::HabitableZoneInner, Q::HabitableZoneOuter),
        HabitableZoneFlavor::Optimistic => (Q::OptimisticHabitableZoneInner, Q::OptimisticHabitableZoneOuter),
    };
    let zone = (scope.own(inner_q)?, scope.own(outer_q)?);
    let orbits = (scope.own(Q::InnerOrbitLimit)?, scope.own(Q::OuterOrbitLimit)?);
    if let ((Some(hz_in), Some(hz_out)), (Some(min), Some(max))) = (zone, orbits) {
        let message = if hz_in >= hz_out {
            Some("no habitable zone".to_string())
        } else if min > hz_out || max < hz_in {
            Some(format!(
                "habitable zone ({:.4} to {:.4} AU) lies outside the stable orbits ({:.4} to {:.4} AU)",
                to_au(hz_in),
                to_au(hz_out),
                to_au(min),
                to_au(max)
            ))
        } else {
            None
        };
        if let Some(message) = message {
            scope.report(Severity::Info, FindingKind::UnreachableHabitableZone, inner_q, message);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::analysis::units::*;
    use crate::compute::ResolutionEngine;
    use crate::formulas::QuantityId as Q;
    use crate::store::{BodyId, BodyKind, Seeds, SystemHierarchy};
    use crate::validation::{Finding, FindingKind, Severity, Validator};

    /// Two Sun-like stars `sep_au` apart. Returns the system and the first member.
    fn pair(sep_au: f64) -> (SystemHierarchy, BodyId) {
        let mut sys = SystemHierarchy::new();
        let ab = sys
            .add_body(None, BodyKind::Barycenter, Seeds::named("AB").with(Q::SemiMajorAxis, au(sep_au)))
            .unwrap();
        let sun = |name: &str| {
            Seeds::named(name)
                .with(Q::Mass, SOLAR_MASS)
                .with(Q::Luminosity, SOLAR_LUMINOSITY)
                .with(Q::Radius, SOLAR_RADIUS)
        };
        let a = sys.add_body(Some(ab), BodyKind::Star, sun("A")).unwrap();
        sys.add_body(Some(ab), BodyKind::Star, sun("B")).unwrap();
        (sys, a)
    }

    fn find(findings: &[Finding], kind: FindingKind) -> Option<&Finding> {
        findings.iter().find(|f| f.kind == kind)
    }

    #[test]
    fn test_contact_binary() {
        let (sys, a) = pair(0.01);
        let engine = ResolutionEngine::new(&sys);
        let findings = Validator::new(&engine).validate(a).unwrap();
        let contact = find(&findings, FindingKind::ContactBinary).expect("contact finding");
        assert_eq!(contact.severity, Severity::Warning);

        let (sys, a) = pair(1.0);
        let engine = ResolutionEngine::new(&sys);
        let findings = Validator::new(&engine).validate(a).unwrap();
        assert!(find(&findings, FindingKind::ContactBinary).is_none());
    }

    #[test]
    fn test_close_pair_leaves_no_room_for_stype_habitable_orbits() {
        // The S-type stability limit at 1 AU separation is well inside a Sun-like habitable zone.
        let (sys, a) = pair(1.0);
        let engine = ResolutionEngine::new(&sys);
        let findings = Validator::new(&engine).validate(a).unwrap();
        let unreachable = find(&findings, FindingKind::UnreachableHabitableZone).expect("HZ finding");
        assert_eq!(unreachable.severity, Severity::Info);
    }

    #[test]
    fn test_short_lived_star() {
        let mut sys = SystemHierarchy::new();
        let massive = sys
            .add_body(None, BodyKind::Star, Seeds::named("O").with(Q::Mass, 10.0 * SOLAR_MASS))
            .unwrap();
        let sun = sys.add_body(None, BodyKind::Star, Seeds::named("Sun").with(Q::Mass, SOLAR_MASS)).unwrap();
        let engine = ResolutionEngine::new(&sys);
        let validator = Validator::new(&engine);
        let findings = validator.validate(massive).unwrap();
        assert!(find(&findings, FindingKind::ShortLifetime).is_some(), "Findings: {:?}", findings);
        assert!(validator.validate(sun).unwrap().is_empty());
    }
}
