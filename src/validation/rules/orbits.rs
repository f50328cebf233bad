//! Orbital stability of planets and satellites.

use crate::analysis::units::to_au;
use crate::compute::ResolutionError;
use crate::formulas::{QuantityId as Q, Target};
use crate::store::Placement;
use crate::validation::finding::{FindingKind, Severity};
use crate::validation::validator::Scope;

pub(crate) fn check(scope: &mut Scope<'_, '_>) -> Result<(), ResolutionError> {
    if !scope.is_world() {
        return Ok(());
    }

    if let Some(e) = scope.own(Q::Eccentricity)? {
        if !(0.0..1.0).contains(&e) {
            scope.report(
                Severity::Warning,
                FindingKind::UnboundOrbit,
                Q::Eccentricity,
                format!("eccentricity {:.3} does not describe a bound orbit", e),
            );
        }
    }

    let periapsis = scope.own(Q::Periapsis)?;
    let sma = scope.own(Q::SemiMajorAxis)?;

    // Without its own density a body is held to the parent's dense-body limit.
    let roche = match scope.own(Q::RocheLimit)? {
        Some(r) => Some((r, "Roche limit")),
        None => scope.of(Target::Parent, Q::DenseRocheLimit)?.map(|r| (r, "parent's dense-body Roche limit")),
    };
    if let (Some(p), Some((limit, label))) = (periapsis.or(sma), roche) {
        if p < limit {
            scope.report(
                Severity::Warning,
                FindingKind::RocheLimit,
                Q::Periapsis,
                format!("periapsis {:.4} AU is inside the {} ({:.4} AU), orbit unstable", to_au(p), label, to_au(limit)),
            );
        }
    }

    let Some(a) = sma else { return Ok(()) };

    if let Some(inner) = scope.of(Target::Parent, Q::InnerOrbitLimit)? {
        if a < inner {
            scope.report(
                Severity::Warning,
                FindingKind::InnerOrbitLimit,
                Q::SemiMajorAxis,
                format!(
                    "semi-major axis {:.4} AU is inside the parent's inner orbit limit ({:.4} AU), orbit unstable",
                    to_au(a),
                    to_au(inner)
                ),
            );
        }
    }

    match scope.placement {
        Placement::PType => {
            if let Some(critical) = scope.of(Target::Parent, Q::PtypeCriticalOrbit)? {
                if a < critical {
                    scope.report(
                        Severity::Warning,
                        FindingKind::PtypeCriticalOrbit,
                        Q::SemiMajorAxis,
                        format!(
                            "semi-major axis {:.4} AU is inside the P-type critical orbit ({:.4} AU), orbit unstable",
                            to_au(a),
                            to_au(critical)
                        ),
                    );
                }
            }
        }
        Placement::SType => {
            if let Some(critical) = scope.of(Target::Parent, Q::StypeCriticalOrbit)? {
                if a > critical {
                    scope.report(
                        Severity::Warning,
                        FindingKind::StypeCriticalOrbit,
                        Q::SemiMajorAxis,
                        format!(
                            "semi-major axis {:.4} AU is beyond the S-type critical orbit ({:.4} AU), orbit unstable",
                            to_au(a),
                            to_au(critical)
                        ),
                    );
                }
            }
        }
        _ => {}
    }

    if let Some(max) = scope.own(Q::SemiMajorAxisMaximum)? {
        if a > max {
            scope.report(
                Severity::Warning,
                FindingKind::OuterOrbitLimit,
                Q::SemiMajorAxis,
                format!(
                    "semi-major axis {:.4} AU is beyond the outermost stable orbit ({:.4} AU)",
                    to_au(a),
                    to_au(max)
                ),
            );
        }
    }

    if let (Some(p), Some(locking)) = (periapsis, scope.of(Target::Parent, Q::TidalLockingRadius)?) {
        if p < locking {
            scope.report(
                Severity::Info,
                FindingKind::TidalLocking,
                Q::Periapsis,
                format!(
                    "periapsis {:.4} AU is inside the parent's tidal locking radius ({:.4} AU), probably tidally locked",
                    to_au(p),
                    to_au(locking)
                ),
            );
        }
    }

    Ok(())
}
