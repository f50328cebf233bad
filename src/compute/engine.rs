use super::ledger::{CacheEntry, Computed, Provenance, Resolution, ResolutionError, UnresolvedReason};
use crate::analysis::telemetry::Telemetry;
use crate::formulas::{Fallback, Formula, FormulaContext, FormulaRegistry, Inputs, QuantityId, Rule, Target};
use crate::store::{BodyId, BodyKind, Placement, SystemHierarchy};
use rayon::prelude::*;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace, warn};

/// Resolved quantities of one body. Quantities with no rule for the body are omitted.
pub type QuantityMap = BTreeMap<QuantityId, Resolution>;

/// Resolves quantities on demand against a hierarchy, memoizing into each
/// body's cache.
///
/// The engine borrows the hierarchy immutably, so no edit can happen while it
/// is alive. Each top-level call snapshots the edit generation and stamps every
/// entry it writes with that snapshot.
pub struct ResolutionEngine<'a> {
    registry: &'a FormulaRegistry,
    system: &'a SystemHierarchy,
    telemetry: Telemetry,
}

/// Per-call resolution state.
struct Frame {
    generation: u64,
    in_progress: HashSet<(BodyId, QuantityId)>,
    path: Vec<(BodyId, QuantityId)>,
    effective: HashMap<BodyId, u64>,
}

impl Frame {
    fn new(generation: u64) -> Self {
        Self { generation, in_progress: HashSet::new(), path: Vec::new(), effective: HashMap::new() }
    }
}

impl<'a> ResolutionEngine<'a> {
    pub fn new(system: &'a SystemHierarchy) -> Self {
        Self::with_registry(FormulaRegistry::standard(), system)
    }

    pub fn with_registry(registry: &'a FormulaRegistry, system: &'a SystemHierarchy) -> Self {
        Self { registry, system, telemetry: Telemetry::default() }
    }

    pub fn system(&self) -> &'a SystemHierarchy {
        self.system
    }

    pub fn registry(&self) -> &'a FormulaRegistry {
        self.registry
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Resolves one quantity. `Unresolved` is an ordinary outcome; errors are
    /// reserved for registry defects and unknown bodies.
    pub fn resolve(&self, body: BodyId, quantity: QuantityId) -> Result<Resolution, ResolutionError> {
        self.system.body(body).ok_or(ResolutionError::UnknownBody(body))?;
        let mut frame = Frame::new(self.system.generation());
        self.resolve_in(&mut frame, body, quantity).map(|(r, _)| r)
    }

    /// Resolves every registered quantity that applies to the body.
    pub fn resolve_all(&self, body: BodyId) -> Result<QuantityMap, ResolutionError> {
        self.system.body(body).ok_or(ResolutionError::UnknownBody(body))?;
        let mut frame = Frame::new(self.system.generation());
        let mut out = QuantityMap::new();
        for quantity in self.registry.quantities() {
            let (resolution, _) = self.resolve_in(&mut frame, body, quantity)?;
            if resolution.reason() != Some(UnresolvedReason::NotApplicable) {
                out.insert(quantity, resolution);
            }
        }
        Ok(out)
    }

    /// Resolves every body in parallel.
    pub fn resolve_system(&self) -> Result<BTreeMap<BodyId, QuantityMap>, ResolutionError> {
        let ids: Vec<BodyId> = self.system.ids().collect();
        ids.par_iter()
            .map(|&id| self.resolve_all(id).map(|values| (id, values)))
            .collect()
    }

    /// Where the current value of a quantity comes from, if it has one.
    pub fn provenance(&self, body: BodyId, quantity: QuantityId) -> Result<Provenance, ResolutionError> {
        let b = self.system.body(body).ok_or(ResolutionError::UnknownBody(body))?;
        if b.seed(quantity).is_some() {
            return Ok(Provenance::Seed);
        }
        let mut frame = Frame::new(self.system.generation());
        self.resolve_in(&mut frame, body, quantity).map(|(_, p)| p)
    }

    fn resolve_in(
        &self,
        frame: &mut Frame,
        body: BodyId,
        quantity: QuantityId,
    ) -> Result<(Resolution, Provenance), ResolutionError> {
        let formula = self.registry.lookup(quantity)?;
        let b = self.system.body(body).ok_or(ResolutionError::UnknownBody(body))?;

        if let Some(value) = b.seed(quantity) {
            self.telemetry.record_seed();
            return Ok((Resolution::Value(value), Provenance::Seed));
        }

        let effective = *frame
            .effective
            .entry(body)
            .or_insert_with(|| self.system.effective_generation(body));
        if let Some(entry) = b.fresh(quantity, effective) {
            self.telemetry.record_cache_hit();
            trace!(%body, %quantity, generation = entry.generation, "cache hit");
            return Ok((entry.resolution, entry.provenance));
        }

        if !frame.in_progress.insert((body, quantity)) {
            let mut path = frame.path.clone();
            path.push((body, quantity));
            warn!(%body, %quantity, depth = path.len(), "cyclic dependency");
            return Err(ResolutionError::CyclicDependency { body, quantity, path });
        }
        frame.path.push((body, quantity));

        let outcome = self.evaluate(frame, body, b.kind(), formula);

        frame.path.pop();
        frame.in_progress.remove(&(body, quantity));

        let (resolution, provenance) = outcome?;
        b.store(quantity, CacheEntry { resolution, generation: frame.generation, provenance });
        Ok((resolution, provenance))
    }

    fn evaluate(
        &self,
        frame: &mut Frame,
        body: BodyId,
        kind: BodyKind,
        formula: &Formula,
    ) -> Result<(Resolution, Provenance), ResolutionError> {
        let placement = self.system.placement_of(body).unwrap_or(Placement::Root);
        let Some(rule) = formula.rule_for(kind, placement) else {
            return Ok((Resolution::Unresolved(UnresolvedReason::NotApplicable), Provenance::Computed));
        };

        let primary = Resolution::from(self.apply(frame, body, formula.quantity, rule)?);
        if primary.is_resolved() {
            return Ok((primary, Provenance::Computed));
        }

        let fallback = match &formula.fallback {
            Fallback::None => None,
            Fallback::Constant(value) => Some(Resolution::Value(*value)),
            Fallback::Derived(derived) if derived.applies_to(kind, placement) => {
                Some(Resolution::from(self.apply(frame, body, formula.quantity, derived)?))
            }
            Fallback::Derived(_) => None,
        };
        match fallback {
            Some(resolution) if resolution.is_resolved() => {
                self.telemetry.record_fallback();
                debug!(%body, quantity = %formula.quantity, reason = ?primary.reason(), "fallback applied");
                Ok((resolution, Provenance::Fallback))
            }
            _ => Ok((primary, Provenance::Computed)),
        }
    }

    /// Resolves a rule's dependencies and runs it.
    fn apply(
        &self,
        frame: &mut Frame,
        body: BodyId,
        quantity: QuantityId,
        rule: &Rule,
    ) -> Result<Computed, ResolutionError> {
        if rule.is_input() {
            return Ok(Err(UnresolvedReason::MissingInput { quantity, target: Target::Own }));
        }

        let mut values: SmallVec<[Option<f64>; 8]> = SmallVec::with_capacity(rule.deps.len());
        for dep in &rule.deps {
            let value = match self.system.target_of(body, dep.target) {
                Some(target) => self.resolve_in(frame, target, dep.quantity)?.0.value(),
                None => None,
            };
            match value {
                Some(v) => values.push(Some(v)),
                None if dep.optional => values.push(None),
                None => {
                    return Ok(Err(UnresolvedReason::MissingInput { quantity: dep.quantity, target: dep.target }));
                }
            }
        }

        self.telemetry.record_evaluation();
        let ctx = FormulaContext { body, system: self.system };
        let result = rule
            .evaluate(&Inputs(values), &ctx)
            .unwrap_or(Err(UnresolvedReason::MissingInput { quantity, target: Target::Own }));
        debug!(%body, %quantity, ?result, "evaluated");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::units::*;
    use crate::store::{Composition, Seeds};
    use approx::assert_relative_eq;
    use BodyKind::*;
    use QuantityId as Q;

    /// Sun-like star with an Earth-like planet at 1 AU.
    fn sun_and_earth() -> (SystemHierarchy, BodyId, BodyId) {
        let mut sys = SystemHierarchy::new();
        let sun = sys
            .add_body(
                None,
                Star,
                Seeds::named("Sun").with(Q::Mass, SOLAR_MASS).with(Q::Luminosity, SOLAR_LUMINOSITY),
            )
            .unwrap();
        let earth = sys
            .add_body(
                Some(sun),
                Planet,
                Seeds::named("Earth")
                    .with(Q::Mass, EARTH_MASS)
                    .with(Q::SemiMajorAxis, ASTRONOMICAL_UNIT)
                    .with(Q::Eccentricity, 0.0)
                    .composition(Composition::Rockworld70),
            )
            .unwrap();
        (sys, sun, earth)
    }

    /// Two Sun-like stars 20 AU apart; `A` is twice as luminous. `Ab` orbits `A`
    /// at 1 AU, `ABc` orbits the pair at 60 AU.
    fn binary() -> (SystemHierarchy, [BodyId; 5]) {
        let mut sys = SystemHierarchy::new();
        let ab = sys
            .add_body(None, Barycenter, Seeds::named("AB").with(Q::SemiMajorAxis, au(20.0)))
            .unwrap();
        let a = sys
            .add_body(
                Some(ab),
                Star,
                Seeds::named("A").with(Q::Mass, SOLAR_MASS).with(Q::Luminosity, 2.0 * SOLAR_LUMINOSITY),
            )
            .unwrap();
        let b = sys
            .add_body(
                Some(ab),
                Star,
                Seeds::named("B").with(Q::Mass, SOLAR_MASS).with(Q::Luminosity, SOLAR_LUMINOSITY),
            )
            .unwrap();
        let s = sys
            .add_body(Some(a), Planet, Seeds::named("Ab").with(Q::SemiMajorAxis, au(1.0)))
            .unwrap();
        let p = sys
            .add_body(Some(ab), Planet, Seeds::named("ABc").with(Q::SemiMajorAxis, au(60.0)))
            .unwrap();
        (sys, [ab, a, b, s, p])
    }

    fn value(engine: &ResolutionEngine, body: BodyId, q: QuantityId) -> f64 {
        engine.resolve(body, q).unwrap().value().unwrap()
    }

    #[test]
    fn test_single_star_insolation_is_one_solar_flux() {
        let (sys, _, earth) = sun_and_earth();
        let engine = ResolutionEngine::new(&sys);
        let flux = value(&engine, earth, Q::Insolation);
        assert_relative_eq!(to_solar_flux(flux), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_memoized_until_an_edit() {
        let (mut sys, sun, earth) = sun_and_earth();
        let first = {
            let engine = ResolutionEngine::new(&sys);
            let t1 = value(&engine, earth, Q::Temperature);
            let before = engine.telemetry().report();
            let t2 = value(&engine, earth, Q::Temperature);
            let delta = engine.telemetry().report().since(&before);
            assert_eq!(t1.to_bits(), t2.to_bits());
            assert_eq!(delta.evaluations, 0);
            assert_eq!(delta.cache_hits, 1);
            t1
        };

        // A fresh engine reuses the body caches.
        {
            let engine = ResolutionEngine::new(&sys);
            assert_eq!(value(&engine, earth, Q::Temperature).to_bits(), first.to_bits());
            assert_eq!(engine.telemetry().report().evaluations, 0);
        }

        sys.set_attribute(sun, Q::Luminosity, 2.0 * SOLAR_LUMINOSITY).unwrap();
        let engine = ResolutionEngine::new(&sys);
        let hotter = value(&engine, earth, Q::Temperature);
        assert!(hotter > first);
        assert_relative_eq!(hotter / first, 2f64.powf(0.25), max_relative = 1e-12);
        assert!(engine.telemetry().report().evaluations > 0);
    }

    #[test]
    fn test_resolution_is_bit_identical_across_engines() {
        let (sys, _, earth) = sun_and_earth();
        let a = ResolutionEngine::new(&sys).resolve_all(earth).unwrap();
        let (sys2, _, earth2) = sun_and_earth();
        let b = ResolutionEngine::new(&sys2).resolve_all(earth2).unwrap();
        assert_eq!(a.len(), b.len());
        for (q, ra) in &a {
            match (ra.value(), b[q].value()) {
                (Some(x), Some(y)) => assert_eq!(x.to_bits(), y.to_bits(), "{}", q),
                (x, y) => assert_eq!(x, y, "{}", q),
            }
        }
    }

    #[test]
    fn test_unrelated_edit_keeps_cache_generation() {
        let (mut sys, sun, earth) = sun_and_earth();
        let other = sys
            .add_body(None, Star, Seeds::named("Other").with(Q::Mass, 0.5 * SOLAR_MASS))
            .unwrap();
        let mars = sys
            .add_body(Some(sun), Planet, Seeds::named("Mars").with(Q::SemiMajorAxis, au(1.52)))
            .unwrap();
        ResolutionEngine::new(&sys).resolve(earth, Q::Insolation).unwrap();
        let stamped = sys.cached_generation(earth, Q::Insolation);
        assert!(stamped.is_some());

        sys.set_attribute(other, Q::Mass, 0.6 * SOLAR_MASS).unwrap();
        sys.set_attribute(mars, Q::Eccentricity, 0.09).unwrap();
        let engine = ResolutionEngine::new(&sys);
        engine.resolve(earth, Q::Insolation).unwrap();
        assert_eq!(sys.cached_generation(earth, Q::Insolation), stamped);
        assert_eq!(engine.telemetry().report().evaluations, 0);
    }

    #[test]
    fn test_cycle_in_malformed_registry_is_reported() {
        let registry = FormulaRegistry::builder()
            .register(
                Formula::new(Q::Density, "a")
                    .rule(Rule::new(&[Planet]).needs(Target::Own, Q::Volume).eval(|x| x.get(0))),
            )
            .register(
                Formula::new(Q::Volume, "b")
                    .rule(Rule::new(&[Planet]).needs(Target::Own, Q::Density).eval(|x| x.get(0))),
            )
            .build();
        let (sys, _, earth) = sun_and_earth();
        let engine = ResolutionEngine::with_registry(&registry, &sys);
        match engine.resolve(earth, Q::Density) {
            Err(ResolutionError::CyclicDependency { body, quantity, path }) => {
                assert_eq!(body, earth);
                assert_eq!(quantity, Q::Density);
                assert_eq!(path, vec![(earth, Q::Density), (earth, Q::Volume), (earth, Q::Density)]);
            }
            other => panic!("Expected CyclicDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_quantity_and_body() {
        let registry = FormulaRegistry::builder().build();
        let (sys, sun, _) = sun_and_earth();
        let engine = ResolutionEngine::with_registry(&registry, &sys);
        assert_eq!(engine.resolve(sun, Q::Mass), Err(ResolutionError::UnknownQuantity(Q::Mass)));

        let engine = ResolutionEngine::new(&sys);
        assert_eq!(engine.resolve(BodyId(99), Q::Mass), Err(ResolutionError::UnknownBody(BodyId(99))));
    }

    #[test]
    fn test_density_falls_back_to_composition_estimate() {
        let mut sys = SystemHierarchy::new();
        let sun = sys.add_body(None, Star, Seeds::named("Sun").with(Q::Mass, SOLAR_MASS)).unwrap();
        let rock = sys
            .add_body(Some(sun), Planet, Seeds::named("Rock").composition(Composition::Rockworld70))
            .unwrap();
        let engine = ResolutionEngine::new(&sys);

        let density = value(&engine, rock, Q::Density);
        assert_relative_eq!(density, crate::formulas::physics::composition_density(Composition::Rockworld70));
        assert_eq!(engine.provenance(rock, Q::Density), Ok(Provenance::Fallback));

        // Without a composition there is nothing to fall back on.
        let bare = {
            let mut sys = SystemHierarchy::new();
            let sun = sys.add_body(None, Star, Seeds::named("Sun")).unwrap();
            let p = sys.add_body(Some(sun), Planet, Seeds::named("p")).unwrap();
            ResolutionEngine::new(&sys).resolve(p, Q::Density).unwrap()
        };
        assert_eq!(
            bare,
            Resolution::Unresolved(UnresolvedReason::MissingInput { quantity: Q::Mass, target: Target::Own })
        );
    }

    #[test]
    fn test_constant_fallbacks_and_provenance() {
        let (sys, sun, earth) = sun_and_earth();
        let engine = ResolutionEngine::new(&sys);
        assert_eq!(engine.resolve(earth, Q::Albedo).unwrap(), Resolution::Value(0.3));
        assert_eq!(engine.provenance(earth, Q::Albedo), Ok(Provenance::Fallback));
        assert_eq!(engine.provenance(earth, Q::Mass), Ok(Provenance::Seed));
        assert_eq!(engine.provenance(earth, Q::Insolation), Ok(Provenance::Computed));
        // No fallback for quantities that do not apply.
        assert_eq!(
            engine.resolve(sun, Q::Albedo).unwrap(),
            Resolution::Unresolved(UnresolvedReason::NotApplicable)
        );
    }

    #[test]
    fn test_stype_and_ptype_insolation_targets() {
        let (sys, [ab, _, _, s, p]) = binary();
        let engine = ResolutionEngine::new(&sys);

        // S-type: only the designated member's light.
        let s_flux = value(&engine, s, Q::Insolation);
        assert_relative_eq!(to_solar_flux(s_flux), 2.0, max_relative = 1e-12);

        // P-type: the pair's combined light.
        let total = value(&engine, ab, Q::Luminosity);
        assert_relative_eq!(total, 3.0 * SOLAR_LUMINOSITY);
        let p_flux = value(&engine, p, Q::Insolation);
        let e = value(&engine, p, Q::Eccentricity);
        let expected = crate::formulas::physics::incident_flux(total, au(60.0), e);
        assert_relative_eq!(p_flux, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_companion_light_reaches_stype_planet() {
        let (sys, [_, _, _, s, _]) = binary();
        let engine = ResolutionEngine::new(&sys);
        let companion = value(&engine, s, Q::CompanionInsolation);
        assert!(companion > 0.0 && companion < 0.01 * value(&engine, s, Q::Insolation));
        // Circular pair: no forced eccentricity.
        assert_eq!(value(&engine, s, Q::Eccentricity), 0.0);
    }

    #[test]
    fn test_missing_input_names_the_dependency() {
        let mut sys = SystemHierarchy::new();
        let sun = sys.add_body(None, Star, Seeds::named("Sun")).unwrap();
        let engine = ResolutionEngine::new(&sys);
        assert_eq!(
            engine.resolve(sun, Q::Luminosity).unwrap(),
            Resolution::Unresolved(UnresolvedReason::MissingInput { quantity: Q::Mass, target: Target::Own })
        );
        // Habitable zone falls back to the single-star estimate, which also needs luminosity.
        assert!(!engine.resolve(sun, Q::HabitableZoneInner).unwrap().is_resolved());
    }

    #[test]
    fn test_resolve_all_skips_inapplicable_quantities() {
        let (sys, sun, earth) = sun_and_earth();
        let engine = ResolutionEngine::new(&sys);
        let star = engine.resolve_all(sun).unwrap();
        assert!(star.contains_key(&Q::HabitableZoneInner));
        assert!(!star.contains_key(&Q::Albedo));
        assert!(!star.contains_key(&Q::SemiMajorAxis));
        let planet = engine.resolve_all(earth).unwrap();
        assert!(planet.contains_key(&Q::RadiogenicHeating));
        assert!(!planet.contains_key(&Q::HabitableZoneInner));
    }

    #[test]
    fn test_resolve_system_matches_sequential() {
        let (sys, ids) = binary();
        let engine = ResolutionEngine::new(&sys);
        let all = engine.resolve_system().unwrap();
        assert_eq!(all.len(), ids.len());
        for id in ids {
            let sequential = ResolutionEngine::new(&sys).resolve_all(id).unwrap();
            assert_eq!(all[&id], sequential);
        }
    }

    #[test]
    fn test_config_change_invalidates_everything() {
        let (mut sys, sun, _) = sun_and_earth();
        let kopparapu = value(&ResolutionEngine::new(&sys), sun, Q::HabitableZoneInner);
        let mut config = sys.model_config().clone();
        config.insolation_model = crate::config::InsolationModel::Selsis;
        sys.set_model_config(config);
        let selsis = value(&ResolutionEngine::new(&sys), sun, Q::HabitableZoneInner);
        assert_ne!(kopparapu.to_bits(), selsis.to_bits());
    }
}
