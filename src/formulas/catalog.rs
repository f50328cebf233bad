//! The built-in formula set.
//!
//! Rules inside a formula are tried in order; the first one matching the body's
//! kind and placement is used, so specific placements come before general ones.

use super::descriptor::{Fallback, Formula, Rule};
use super::classification::StellarClass;
use super::habitability::{self as hz, ZoneLimit};
use super::physics as phys;
use super::quantity::QuantityId as Q;
use super::registry::RegistryBuilder;
use crate::analysis::units::{LIGHT_YEAR, HOUR, SOLAR_TEMPERATURE};
use crate::compute::ledger::UnresolvedReason;
use crate::store::{BodyKind, Composition, Placement};
use std::f64::consts::PI;
use BodyKind::*;
use Placement::*;
use super::descriptor::Target::*;

const STAR: &[BodyKind] = &[Star];
const BARYCENTER: &[BodyKind] = &[Barycenter];
const STELLAR: &[BodyKind] = &[Star, Barycenter];
const PLANET: &[BodyKind] = &[Planet];
const SATELLITE: &[BodyKind] = &[Satellite];
const WORLDS: &[BodyKind] = &[Planet, Satellite];
const SOLID: &[BodyKind] = &[Star, Planet, Satellite];
const ORBITING: &[BodyKind] = &[Planet, Satellite, Barycenter];
const ANY: &[BodyKind] = &[Star, Planet, Satellite, Barycenter];

const ROOT: &[Placement] = &[Root];
const MEMBER: &[Placement] = &[PairMember];
const AROUND_BODY: &[Placement] = &[Orbiting, SType];
const STYPE: &[Placement] = &[SType];
const PTYPE: &[Placement] = &[PType];

/// A rule for bodies on their own orbit plus a copy for stars bound in a pair.
fn orbital(build: impl Fn(Rule) -> Rule) -> [Rule; 2] {
    [build(Rule::new(ORBITING)), build(Rule::new(STAR).placed(MEMBER))]
}

fn min_present(values: impl IntoIterator<Item = Option<f64>>) -> f64 {
    values.into_iter().flatten().fold(f64::NAN, f64::min)
}

pub fn standard() -> RegistryBuilder {
    let builder = RegistryBuilder::default();
    let builder = bulk(builder);
    let builder = orbits(builder);
    let builder = limits(builder);
    let builder = radiation(builder);
    geophysics(builder)
}

fn bulk(b: RegistryBuilder) -> RegistryBuilder {
    b.register(
        Formula::new(Q::Mass, "input; barycenter = primary + secondary")
            .rule(Rule::input(SOLID))
            .rule(
                Rule::new(BARYCENTER)
                    .needs(Primary, Q::Mass)
                    .needs(Secondary, Q::Mass)
                    .eval(|x| x.get(0) + x.get(1)),
            ),
    )
    .register(
        Formula::new(Q::Radius, "main-sequence fit for stars; mass/radius model for worlds")
            .rule(
                Rule::new(STAR)
                    .needs(Own, Q::Mass)
                    .needs(Own, Q::Luminosity)
                    .eval(|x| phys::main_sequence_radius(x.get(0), x.get(1))),
            )
            .rule(
                Rule::new(WORLDS)
                    .needs(Own, Q::Mass)
                    .may_use(Own, Q::Insolation)
                    .compute(|x, ctx| {
                        let composition = ctx.composition()?;
                        let radius = phys::planetary_radius(x.get(0), composition);
                        let inflation = match (composition, x.optional(1)) {
                            (Composition::Gasgiant, Some(flux)) => phys::hot_giant_inflation(x.get(0), flux),
                            _ => 1.0,
                        };
                        Ok(radius * inflation)
                    }),
            ),
    )
    .register(
        Formula::new(Q::Luminosity, "mass/luminosity relation; thermal emission plus reflection for worlds")
            .rule(Rule::new(STAR).needs(Own, Q::Mass).eval(|x| phys::main_sequence_luminosity(x.get(0))))
            .rule(
                Rule::new(BARYCENTER)
                    .needs(Primary, Q::Luminosity)
                    .needs(Secondary, Q::Luminosity)
                    .eval(|x| x.get(0) + x.get(1)),
            )
            .rule(
                Rule::new(WORLDS)
                    .needs(Own, Q::Temperature)
                    .needs(Own, Q::SurfaceArea)
                    .needs(Own, Q::Albedo)
                    .needs(Own, Q::ThermalInsolation)
                    .eval(|x| phys::planetary_luminosity(x.get(0), x.get(1), x.get(2), x.get(3))),
            ),
    )
    .register(
        Formula::new(Q::Temperature, "effective temperature; equilibrium temperature for worlds")
            .rule(
                Rule::new(STAR)
                    .needs(Own, Q::Luminosity)
                    .needs(Own, Q::Radius)
                    .eval(|x| phys::stellar_temperature(x.get(0), x.get(1))),
            )
            .rule(
                Rule::new(WORLDS)
                    .needs(Own, Q::ThermalInsolation)
                    .needs(Own, Q::Albedo)
                    .needs(Own, Q::HeatDistribution)
                    .needs(Own, Q::Emissivity)
                    .needs(Own, Q::Greenhouse)
                    .eval(|x| phys::planetary_temperature(x.get(0), x.get(1), x.get(2), x.get(3), x.get(4))),
            ),
    )
    .register(
        Formula::new(Q::PeakWavelength, "Wien's displacement law")
            .rule(Rule::new(SOLID).needs(Own, Q::Temperature).eval(|x| phys::peak_wavelength(x.get(0)))),
    )
    .register(
        Formula::new(Q::Lifetime, "10 Gyr * M/L; shorter-lived member for pairs")
            .rule(
                Rule::new(STAR)
                    .needs(Own, Q::Mass)
                    .needs(Own, Q::Luminosity)
                    .eval(|x| phys::stellar_lifetime(x.get(0), x.get(1))),
            )
            .rule(
                Rule::new(BARYCENTER)
                    .needs(Primary, Q::Lifetime)
                    .needs(Secondary, Q::Lifetime)
                    .eval(|x| x.get(0).min(x.get(1))),
            )
            .rule(Rule::new(WORLDS).needs(RootStar, Q::Lifetime).eval(|x| x.get(0))),
    )
    .register(
        Formula::new(Q::Age, "half the lifetime for roots; inherited by members; parent age minus formation delay")
            .rule(Rule::new(STELLAR).placed(ROOT).needs(Own, Q::Lifetime).eval(|x| x.get(0) / 2.0))
            .rule(Rule::new(STELLAR).placed(MEMBER).needs(Parent, Q::Age).eval(|x| x.get(0)))
            .rule(Rule::new(WORLDS).needs(Parent, Q::Age).compute(|x, ctx| {
                let delay = crate::analysis::units::gigayears(ctx.config().planet_formation_delay_gyr);
                Ok((x.get(0) - delay).max(0.0))
            })),
    )
    .register(
        Formula::new(Q::Density, "mass / volume; composition estimate as fallback")
            .rule(Rule::new(SOLID).needs(Own, Q::Mass).needs(Own, Q::Volume).eval(|x| x.get(0) / x.get(1)))
            .with_fallback(Fallback::Derived(
                Rule::new(WORLDS).compute(|_, ctx| Ok(phys::composition_density(ctx.composition()?))),
            )),
    )
    .register(
        Formula::new(Q::Circumference, "2 pi R")
            .rule(Rule::new(SOLID).needs(Own, Q::Radius).eval(|x| 2.0 * PI * x.get(0))),
    )
    .register(
        Formula::new(Q::SurfaceArea, "4 pi R^2")
            .rule(Rule::new(SOLID).needs(Own, Q::Radius).eval(|x| phys::sphere_area(x.get(0)))),
    )
    .register(
        Formula::new(Q::Volume, "4/3 pi R^3")
            .rule(Rule::new(SOLID).needs(Own, Q::Radius).eval(|x| phys::sphere_volume(x.get(0)))),
    )
    .register(
        Formula::new(Q::SurfaceGravity, "G M / R^2").rule(
            Rule::new(SOLID)
                .needs(Own, Q::Mass)
                .needs(Own, Q::Radius)
                .eval(|x| phys::surface_gravity(x.get(0), x.get(1))),
        ),
    )
    .register(
        Formula::new(Q::EscapeVelocity, "sqrt(2 G M / R)").rule(
            Rule::new(SOLID)
                .needs(Own, Q::Mass)
                .needs(Own, Q::Radius)
                .eval(|x| phys::escape_velocity(x.get(0), x.get(1))),
        ),
    )
    .register(
        Formula::new(Q::SurfacePressure, "Earth-scaled m^2 / r^4 for solid worlds").rule(
            Rule::new(WORLDS).needs(Own, Q::Mass).needs(Own, Q::Radius).compute(|x, ctx| {
                match ctx.composition() {
                    Ok(c) if c.is_giant() => Err(UnresolvedReason::NotApplicable),
                    _ => Ok(phys::surface_pressure(x.get(0), x.get(1))),
                }
            }),
        ),
    )
    .register(
        Formula::new(Q::AppearanceFrequency, "share of main-sequence stars in the same mass class").rule(
            Rule::new(STAR).needs(Own, Q::Mass).eval(|x| {
                StellarClass::from_mass(x.get(0)).map_or(0.0, |class| class.appearance_frequency())
            }),
        ),
    )
}

fn orbits(b: RegistryBuilder) -> RegistryBuilder {
    b.register(
        Formula::new(Q::SemiMajorAxis, "input; pair separation on a barycenter; barycentric distance for members")
            .rule(
                Rule::new(STAR)
                    .placed(MEMBER)
                    .needs(Parent, Q::SemiMajorAxis)
                    .needs(Own, Q::Mass)
                    .needs(PairPartner, Q::Mass)
                    .eval(|x| phys::barycentric_distance(x.get(0), x.get(1), x.get(2))),
            )
            .rule(Rule::input(ORBITING)),
    )
    .register(
        Formula::new(Q::Eccentricity, "input; forced eccentricity in binaries; 0 if unknown")
            .rule(
                Rule::new(PLANET)
                    .placed(STYPE)
                    .needs(Own, Q::SemiMajorAxis)
                    .needs(Grandparent, Q::SemiMajorAxis)
                    .needs(Grandparent, Q::Eccentricity)
                    .eval(|x| phys::forced_eccentricity_wide(x.get(0), x.get(1), x.get(2))),
            )
            .rule(
                Rule::new(PLANET)
                    .placed(PTYPE)
                    .needs(Own, Q::SemiMajorAxis)
                    .needs(Parent, Q::SemiMajorAxis)
                    .needs(Parent, Q::Eccentricity)
                    .needs(Parent, Q::SecondaryMassRatio)
                    .eval(|x| phys::forced_eccentricity_close(x.get(0), x.get(1), x.get(2), x.get(3))),
            )
            .rule(Rule::new(STAR).placed(MEMBER).needs(Parent, Q::Eccentricity).eval(|x| x.get(0)))
            .rule(Rule::input(ORBITING))
            .with_fallback(Fallback::Constant(0.0)),
    )
    .register(
        Formula::new(Q::SemiMinorAxis, "a sqrt(1 - e^2)").rules(orbital(|r| {
            r.needs(Own, Q::SemiMajorAxis)
                .needs(Own, Q::Eccentricity)
                .eval(|x| x.get(0) * (1.0 - x.get(1).powi(2)).sqrt())
        })),
    )
    .register(
        Formula::new(Q::Periapsis, "a (1 - e)").rules(orbital(|r| {
            r.needs(Own, Q::SemiMajorAxis).needs(Own, Q::Eccentricity).eval(|x| x.get(0) * (1.0 - x.get(1)))
        })),
    )
    .register(
        Formula::new(Q::Apoapsis, "a (1 + e)").rules(orbital(|r| {
            r.needs(Own, Q::SemiMajorAxis).needs(Own, Q::Eccentricity).eval(|x| x.get(0) * (1.0 + x.get(1)))
        })),
    )
    .register(
        Formula::new(Q::OrbitalPeriod, "Kepler's third law; members share the pair period")
            .rule(
                Rule::new(WORLDS)
                    .needs(Own, Q::SemiMajorAxis)
                    .needs(Parent, Q::Mass)
                    .may_use(Own, Q::Mass)
                    .eval(|x| phys::orbital_period(x.get(0), x.get(1), x.optional(2).unwrap_or(0.0))),
            )
            .rule(
                Rule::new(BARYCENTER)
                    .needs(Own, Q::SemiMajorAxis)
                    .needs(Primary, Q::Mass)
                    .needs(Secondary, Q::Mass)
                    .eval(|x| phys::orbital_period(x.get(0), x.get(1), x.get(2))),
            )
            .rule(Rule::new(STAR).placed(MEMBER).needs(Parent, Q::OrbitalPeriod).eval(|x| x.get(0))),
    )
    .register(
        Formula::new(Q::OrbitalVelocity, "mean orbital speed 2 pi a / P").rules(orbital(|r| {
            r.needs(Own, Q::SemiMajorAxis)
                .needs(Own, Q::OrbitalPeriod)
                .eval(|x| 2.0 * PI * x.get(0) / x.get(1))
        })),
    )
    .register(
        Formula::new(Q::SpinPeriod, "orbital period when tidally locked, else mass/rotation trend")
            .rule(
                Rule::new(WORLDS)
                    .needs(Own, Q::Mass)
                    .needs(Own, Q::Radius)
                    .may_use(Own, Q::SemiMajorAxis)
                    .may_use(Own, Q::OrbitalPeriod)
                    .may_use(Parent, Q::TidalLockingRadius)
                    .eval(|x| match (x.optional(2), x.optional(3), x.optional(4)) {
                        (Some(a), Some(period), Some(locking)) if a < locking => period,
                        _ => phys::planetary_rotation_period(x.get(0), x.get(1)),
                    }),
            )
            .rule(Rule::input(STAR)),
    )
    .register(
        Formula::new(Q::DayLength, "synodic day from spin and orbital periods").rule(
            Rule::new(WORLDS)
                .needs(Own, Q::SpinPeriod)
                .needs(Own, Q::OrbitalPeriod)
                .eval(|x| phys::synodic_period(x.get(0), x.get(1))),
        ),
    )
}

fn limits(b: RegistryBuilder) -> RegistryBuilder {
    b.register(
        Formula::new(Q::RoughInnerOrbitLimit, "0.1 AU per solar mass")
            .rule(Rule::new(STELLAR).needs(Own, Q::Mass).eval(|x| phys::rough_inner_orbit_limit(x.get(0)))),
    )
    .register(
        Formula::new(Q::RoughOuterOrbitLimit, "40 AU per solar mass")
            .rule(Rule::new(STELLAR).needs(Own, Q::Mass).eval(|x| phys::rough_outer_orbit_limit(x.get(0)))),
    )
    .register(
        Formula::new(Q::DenseRocheLimit, "Roche limit for bodies a tenth as dense")
            .rule(Rule::new(SOLID).needs(Own, Q::Radius).eval(|x| phys::dense_roche_limit(x.get(0)))),
    )
    .register(
        Formula::new(Q::RocheLimit, "fluid Roche limit against the parent")
            .rule(
                Rule::new(WORLDS)
                    .placed(AROUND_BODY)
                    .needs(Parent, Q::Radius)
                    .needs(Parent, Q::Density)
                    .needs(Own, Q::Density)
                    .eval(|x| phys::roche_limit(x.get(0), x.get(1), x.get(2))),
            )
            .rule(
                Rule::new(WORLDS)
                    .placed(PTYPE)
                    .needs(Parent, Q::Mass)
                    .needs(Own, Q::Mass)
                    .needs(Own, Q::Radius)
                    .eval(|x| phys::roche_limit_by_mass(x.get(0), x.get(1), x.get(2))),
            ),
    )
    .register(
        Formula::new(Q::HillSphereRadius, "a (1 - e) (m / 3M)^(1/3); Roche lobe for members; 2 ly for roots")
            .rule(Rule::new(STELLAR).placed(ROOT).eval(|_| 2.0 * LIGHT_YEAR))
            .rule(Rule::new(STELLAR).placed(MEMBER).needs(Own, Q::RocheLobeRadius).eval(|x| x.get(0)))
            .rule(
                Rule::new(WORLDS)
                    .needs(Own, Q::SemiMajorAxis)
                    .needs(Own, Q::Eccentricity)
                    .needs(Own, Q::Mass)
                    .needs(Parent, Q::Mass)
                    .eval(|x| phys::hill_sphere(x.get(0), x.get(1), x.get(2), x.get(3))),
            ),
    )
    .register(
        Formula::new(Q::RocheLobeRadius, "Eggleton approximation").rule(
            Rule::new(STELLAR)
                .placed(MEMBER)
                .needs(Own, Q::Mass)
                .needs(PairPartner, Q::Mass)
                .needs(Parent, Q::SemiMajorAxis)
                .eval(|x| phys::roche_lobe(x.get(0), x.get(1), x.get(2))),
        ),
    )
    .register(
        Formula::new(Q::TidalLockingRadius, "Peale's locking distance for this mass and age").rule(
            Rule::new(ANY).needs(Own, Q::Mass).needs(Own, Q::Age).compute(|x, ctx| {
                let p0 = ctx.config().initial_spin_period_hours * HOUR;
                Ok(phys::tidal_locking_radius(x.get(0), x.get(1), p0))
            }),
        ),
    )
    .register(
        Formula::new(Q::StypeCriticalOrbit, "Holman-Wiegert limit around one member").rule(
            Rule::new(STELLAR)
                .placed(MEMBER)
                .needs(Own, Q::Mass)
                .needs(PairPartner, Q::Mass)
                .needs(Parent, Q::SemiMajorAxis)
                .needs(Parent, Q::Eccentricity)
                .eval(|x| phys::stype_critical_orbit(x.get(0), x.get(1), x.get(2), x.get(3))),
        ),
    )
    .register(
        Formula::new(Q::PtypeCriticalOrbit, "Holman-Wiegert limit around the pair").rule(
            Rule::new(BARYCENTER)
                .needs(Own, Q::SecondaryMassRatio)
                .needs(Own, Q::SemiMajorAxis)
                .needs(Own, Q::Eccentricity)
                .eval(|x| phys::ptype_critical_orbit(x.get(0), x.get(1), x.get(2))),
        ),
    )
    .register(
        Formula::new(Q::SecondaryMassRatio, "m2 / (m1 + m2)").rule(
            Rule::new(BARYCENTER)
                .needs(Primary, Q::Mass)
                .needs(Secondary, Q::Mass)
                .eval(|x| x.get(1) / (x.get(0) + x.get(1))),
        ),
    )
    .register(
        Formula::new(Q::InnerOrbitLimit, "innermost orbit available to children")
            .rule(Rule::new(STAR).needs(Own, Q::RoughInnerOrbitLimit).eval(|x| x.get(0)))
            .rule(
                Rule::new(BARYCENTER)
                    .needs(Own, Q::RoughInnerOrbitLimit)
                    .needs(Own, Q::PtypeCriticalOrbit)
                    .eval(|x| x.get(0).max(x.get(1))),
            )
            .rule(Rule::new(WORLDS).needs(Own, Q::DenseRocheLimit).eval(|x| x.get(0))),
    )
    .register(
        Formula::new(Q::OuterOrbitLimit, "outermost orbit available to children")
            .rule(
                Rule::new(STELLAR)
                    .needs(Own, Q::RoughOuterOrbitLimit)
                    .needs(Own, Q::HillSphereRadius)
                    .may_use(Own, Q::StypeCriticalOrbit)
                    .eval(|x| min_present([x.optional(0), x.optional(1), x.optional(2)])),
            )
            .rule(Rule::new(WORLDS).needs(Own, Q::HillSphereRadius).eval(|x| x.get(0))),
    )
    .register(
        Formula::new(Q::SemiMajorAxisMinimum, "Roche limit, raised to the P-type critical orbit").rule(
            Rule::new(WORLDS)
                .needs(Own, Q::RocheLimit)
                .may_use(Parent, Q::PtypeCriticalOrbit)
                .eval(|x| x.get(0).max(x.optional(1).unwrap_or(f64::NEG_INFINITY))),
        ),
    )
    .register(
        Formula::new(Q::SemiMajorAxisMaximum, "parent's outer orbit limit; prograde fraction for satellites")
            .rule(Rule::new(PLANET).needs(Parent, Q::OuterOrbitLimit).eval(|x| x.get(0)))
            .rule(
                Rule::new(SATELLITE)
                    .needs(Parent, Q::OuterOrbitLimit)
                    .needs(Parent, Q::Eccentricity)
                    .needs(Own, Q::Eccentricity)
                    .eval(|x| x.get(0) * phys::prograde_orbit_factor(x.get(1), x.get(2))),
            ),
    )
}

/// Threshold distance around a single star, a pair member (radiative S-type)
/// or a barycenter (radiative P-type).
fn zone(quantity: Q, summary: &'static str, limit: ZoneLimit) -> Formula {
    Formula::new(quantity, summary)
        .rule(
            Rule::new(STAR)
                .placed(ROOT)
                .needs(Own, Q::Luminosity)
                .needs(Own, Q::Temperature)
                .compute(move |x, ctx| {
                    let model = ctx.config().insolation_model;
                    Ok(hz::single_star_limit(hz::weighted_luminosity(model, limit, x.get(0), x.get(1))))
                }),
        )
        .rule(
            Rule::new(STAR)
                .placed(MEMBER)
                .needs(Own, Q::Luminosity)
                .needs(Own, Q::Temperature)
                .needs(PairPartner, Q::Luminosity)
                .needs(PairPartner, Q::Temperature)
                .needs(Parent, Q::SemiMajorAxis)
                .compute(move |x, ctx| {
                    let model = ctx.config().insolation_model;
                    let own = hz::weighted_luminosity(model, limit, x.get(0), x.get(1));
                    let companion = hz::weighted_luminosity(model, limit, x.get(2), x.get(3));
                    Ok(hz::stype_radiative_limit(own, companion, x.get(4), limit.edge()))
                }),
        )
        .rule(
            Rule::new(BARYCENTER)
                .needs(Primary, Q::Luminosity)
                .needs(Primary, Q::Temperature)
                .needs(Secondary, Q::Luminosity)
                .needs(Secondary, Q::Temperature)
                .needs(Own, Q::SemiMajorAxis)
                .compute(move |x, ctx| {
                    let model = ctx.config().insolation_model;
                    let primary = hz::weighted_luminosity(model, limit, x.get(0), x.get(1));
                    let secondary = hz::weighted_luminosity(model, limit, x.get(2), x.get(3));
                    Ok(hz::ptype_radiative_limit(primary, secondary, x.get(4), limit.edge()))
                }),
        )
        .with_fallback(single_star_estimate(limit))
}

/// Orbit-averaged threshold distance: single star, S-type average for pair
/// members, P-type average for barycenters.
fn line(quantity: Q, summary: &'static str, limit: ZoneLimit) -> Formula {
    Formula::new(quantity, summary)
        .rule(
            Rule::new(STAR)
                .placed(ROOT)
                .needs(Own, Q::Luminosity)
                .needs(Own, Q::Temperature)
                .compute(move |x, ctx| {
                    let model = ctx.config().insolation_model;
                    Ok(hz::single_star_limit(hz::weighted_luminosity(model, limit, x.get(0), x.get(1))))
                }),
        )
        .rule(
            Rule::new(STAR)
                .placed(MEMBER)
                .needs(Own, Q::Luminosity)
                .needs(Own, Q::Temperature)
                .needs(PairPartner, Q::Luminosity)
                .needs(PairPartner, Q::Temperature)
                .needs(Parent, Q::SemiMajorAxis)
                .needs(Parent, Q::Eccentricity)
                .compute(move |x, ctx| {
                    let model = ctx.config().insolation_model;
                    let own = hz::weighted_luminosity(model, limit, x.get(0), x.get(1));
                    let companion = hz::weighted_luminosity(model, limit, x.get(2), x.get(3));
                    Ok(hz::stype_average_limit(own, companion, x.get(4), x.get(5)))
                }),
        )
        .rule(
            Rule::new(BARYCENTER)
                .needs(Primary, Q::Luminosity)
                .needs(Primary, Q::Temperature)
                .needs(Secondary, Q::Luminosity)
                .needs(Secondary, Q::Temperature)
                .needs(Own, Q::SemiMajorAxis)
                .needs(Own, Q::Eccentricity)
                .needs(Own, Q::SecondaryMassRatio)
                .compute(move |x, ctx| {
                    let model = ctx.config().insolation_model;
                    let primary = hz::weighted_luminosity(model, limit, x.get(0), x.get(1));
                    let secondary = hz::weighted_luminosity(model, limit, x.get(2), x.get(3));
                    Ok(hz::ptype_average_limit(primary, secondary, x.get(4), x.get(5), x.get(6)))
                }),
        )
        .with_fallback(single_star_estimate(limit))
}

/// Single-star distance from the body's own luminosity, assuming a solar
/// spectrum when no temperature is known.
fn single_star_estimate(limit: ZoneLimit) -> Fallback {
    Fallback::Derived(
        Rule::new(STELLAR)
            .needs(Own, Q::Luminosity)
            .may_use(Own, Q::Temperature)
            .compute(move |x, ctx| {
                let model = ctx.config().insolation_model;
                let temperature = x.optional(1).unwrap_or(SOLAR_TEMPERATURE);
                Ok(hz::single_star_limit(hz::weighted_luminosity(model, limit, x.get(0), temperature)))
            }),
    )
}

fn radiation(b: RegistryBuilder) -> RegistryBuilder {
    b.register(
        Formula::new(Q::Insolation, "orbit-averaged flux from the parent; satellites add the parent's own")
            .rule(
                Rule::new(PLANET)
                    .needs(Parent, Q::Luminosity)
                    .needs(Own, Q::SemiMajorAxis)
                    .needs(Own, Q::Eccentricity)
                    .eval(|x| phys::incident_flux(x.get(0), x.get(1), x.get(2))),
            )
            .rule(
                Rule::new(SATELLITE)
                    .needs(Parent, Q::Insolation)
                    .needs(Parent, Q::Luminosity)
                    .needs(Own, Q::SemiMajorAxis)
                    .needs(Own, Q::Eccentricity)
                    .eval(|x| x.get(0) + phys::incident_flux(x.get(1), x.get(2), x.get(3))),
            ),
    )
    .register(
        Formula::new(Q::ThermalInsolation, "temperature-averaged flux, including a wide companion")
            .rule(
                Rule::new(PLANET)
                    .needs(Parent, Q::Luminosity)
                    .needs(Own, Q::SemiMajorAxis)
                    .needs(Own, Q::Eccentricity)
                    .may_use(Own, Q::CompanionInsolation)
                    .eval(|x| {
                        phys::thermal_incident_flux(x.get(0), x.get(1), x.get(2)) + x.optional(3).unwrap_or(0.0)
                    }),
            )
            .rule(
                Rule::new(SATELLITE)
                    .needs(Parent, Q::ThermalInsolation)
                    .needs(Parent, Q::Luminosity)
                    .needs(Own, Q::SemiMajorAxis)
                    .needs(Own, Q::Eccentricity)
                    .eval(|x| x.get(0) + phys::thermal_incident_flux(x.get(1), x.get(2), x.get(3))),
            ),
    )
    .register(
        Formula::new(Q::CompanionInsolation, "flux from the far member of a wide binary").rule(
            Rule::new(PLANET)
                .placed(STYPE)
                .needs(ParentPartner, Q::Luminosity)
                .needs(Own, Q::SemiMajorAxis)
                .needs(Own, Q::Eccentricity)
                .needs(Grandparent, Q::SemiMajorAxis)
                .needs(Grandparent, Q::Eccentricity)
                .eval(|x| phys::companion_incident_flux(x.get(0), x.get(1), x.get(2), x.get(3), x.get(4))),
        ),
    )
    .register(zone(Q::HabitableZoneInner, "runaway greenhouse limit", ZoneLimit::ConservativeInner))
    .register(zone(Q::HabitableZoneOuter, "maximum greenhouse limit", ZoneLimit::ConservativeOuter))
    .register(zone(Q::OptimisticHabitableZoneInner, "recent Venus limit", ZoneLimit::OptimisticInner))
    .register(zone(Q::OptimisticHabitableZoneOuter, "early Mars limit", ZoneLimit::OptimisticOuter))
    .register(line(Q::WaterFrostLine, "water frost line", ZoneLimit::WaterFrost))
    .register(line(Q::RockLine, "rock vaporization line", ZoneLimit::Rock))
    .register(
        Formula::new(Q::Albedo, "input; Earth-like 0.3 if unknown")
            .rule(Rule::input(WORLDS))
            .with_fallback(Fallback::Constant(0.3)),
    )
    .register(
        Formula::new(Q::Greenhouse, "input; none if unknown")
            .rule(Rule::input(WORLDS))
            .with_fallback(Fallback::Constant(0.0)),
    )
    .register(
        Formula::new(Q::HeatDistribution, "input; full redistribution if unknown")
            .rule(Rule::input(WORLDS))
            .with_fallback(Fallback::Constant(1.0)),
    )
    .register(
        Formula::new(Q::Emissivity, "input; black body if unknown")
            .rule(Rule::input(WORLDS))
            .with_fallback(Fallback::Constant(1.0)),
    )
}

fn geophysics(b: RegistryBuilder) -> RegistryBuilder {
    b.register(
        Formula::new(Q::TidalHeating, "tidal dissipation from an eccentric orbit").rule(
            Rule::new(WORLDS)
                .needs(Parent, Q::Mass)
                .needs(Own, Q::SemiMajorAxis)
                .needs(Own, Q::Eccentricity)
                .needs(Own, Q::Radius)
                .compute(|x, ctx| {
                    let q = ctx.config().tidal_quality_factor;
                    Ok(phys::tidal_heating(x.get(0), x.get(1), x.get(2), x.get(3), q))
                }),
        ),
    )
    .register(
        Formula::new(Q::PrimordialHeating, "decaying heat of formation; none for giants and iron worlds").rule(
            Rule::new(WORLDS)
                .needs(Own, Q::Age)
                .needs(Own, Q::Mass)
                .needs(Own, Q::SurfaceArea)
                .compute(|x, ctx| {
                    let composition = ctx.composition()?;
                    if composition.is_giant() || composition.is_iron() {
                        return Ok(0.0);
                    }
                    Ok(phys::primordial_heating(x.get(0), x.get(1), x.get(2)))
                }),
        ),
    )
    .register(
        Formula::new(Q::RadiogenicHeating, "K40, Th232, U235 and U238 decay in the mantle").rule(
            Rule::new(WORLDS)
                .needs(Own, Q::Age)
                .needs(Own, Q::Mass)
                .needs(Own, Q::SurfaceArea)
                .compute(|x, ctx| {
                    let mantle = ctx.composition()?.mantle_fraction();
                    Ok(phys::radiogenic_heating(x.get(0), x.get(1), x.get(2), mantle))
                }),
        ),
    )
    .register(
        Formula::new(Q::InternalHeating, "primordial + radiogenic + tidal").rule(
            Rule::new(WORLDS)
                .needs(Own, Q::PrimordialHeating)
                .needs(Own, Q::RadiogenicHeating)
                .may_use(Own, Q::TidalHeating)
                .eval(|x| x.get(0) + x.get(1) + x.optional(2).unwrap_or(0.0)),
        ),
    )
    .register(
        Formula::new(Q::TideHeight, "tide raised on this body by its parent").rule(
            Rule::new(WORLDS)
                .needs(Parent, Q::Mass)
                .needs(Own, Q::Mass)
                .needs(Own, Q::Radius)
                .needs(Own, Q::SemiMajorAxis)
                .eval(|x| phys::tide_height(x.get(0), x.get(1), x.get(2), x.get(3))),
        ),
    )
    .register(
        Formula::new(Q::ParentTideHeight, "tide raised on the parent by this body").rule(
            Rule::new(WORLDS)
                .placed(AROUND_BODY)
                .needs(Own, Q::Mass)
                .needs(Parent, Q::Mass)
                .needs(Parent, Q::Radius)
                .needs(Own, Q::SemiMajorAxis)
                .eval(|x| phys::tide_height(x.get(0), x.get(1), x.get(2), x.get(3))),
        ),
    )
    .register(
        Formula::new(Q::ParentAngularDiameter, "2 asin(R / a)").rule(
            Rule::new(WORLDS)
                .needs(Parent, Q::Radius)
                .needs(Own, Q::SemiMajorAxis)
                .eval(|x| phys::angular_diameter(x.get(0), x.get(1))),
        ),
    )
}
