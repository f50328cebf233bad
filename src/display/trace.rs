use crate::analysis::units::Unit;
use crate::compute::{Provenance, Resolution, ResolutionEngine, ResolutionError};
use crate::formulas::{Fallback, QuantityId, Rule};
use crate::store::{BodyId, Placement};
use std::collections::HashMap;
use std::fmt::Write;

/// Renders the dependency tree behind one resolved quantity.
///
/// Each line shows the body, the quantity and its value, then how the value was
/// obtained. Dependencies already printed higher up are shown as references.
pub fn format_trace(
    engine: &ResolutionEngine<'_>,
    body: BodyId,
    quantity: QuantityId,
) -> Result<String, ResolutionError> {
    engine.resolve(body, quantity)?;
    let name = engine.system().name_of(body).ok_or(ResolutionError::UnknownBody(body))?;

    let mut tracer = Tracer { engine, visited_at_level: HashMap::new(), output: String::new() };
    let _ = writeln!(tracer.output, "TRACE for '{}.{}':", name, quantity);
    let _ = writeln!(tracer.output, "--------------------------------------------------");
    tracer.trace_node(body, quantity, 1, "")?;
    Ok(tracer.output)
}

struct Tracer<'e, 'a> {
    engine: &'e ResolutionEngine<'a>,
    visited_at_level: HashMap<(BodyId, QuantityId), usize>,
    output: String,
}

impl<'e, 'a> Tracer<'e, 'a> {
    fn trace_node(
        &mut self,
        body: BodyId,
        quantity: QuantityId,
        level: usize,
        prefix: &str,
    ) -> Result<(), ResolutionError> {
        if let Some(&first_seen) = self.visited_at_level.get(&(body, quantity)) {
            let _ = writeln!(self.output, "{}-> (Ref to L{})", prefix, first_seen);
            return Ok(());
        }
        self.visited_at_level.insert((body, quantity), level);

        let system = self.engine.system();
        let resolution = self.engine.resolve(body, quantity)?;
        let provenance = self.engine.provenance(body, quantity)?;
        let formula = self.engine.registry().lookup(quantity)?;
        let kind = system.kind_of(body).ok_or(ResolutionError::UnknownBody(body))?;
        let placement = system.placement_of(body).unwrap_or(Placement::Root);

        let line_header = format!(
            "[L{}] {}.{}{}",
            level,
            system.name_of(body).unwrap_or("?"),
            quantity,
            format_value(quantity, &resolution)
        );

        let rule: &Rule = match provenance {
            Provenance::Seed => {
                let _ = writeln!(self.output, "{}{} -> Seed", prefix, line_header);
                return Ok(());
            }
            Provenance::Fallback => match &formula.fallback {
                Fallback::Derived(rule) => {
                    let _ = writeln!(self.output, "{}{} = fallback estimate", prefix, line_header);
                    rule
                }
                _ => {
                    let _ = writeln!(self.output, "{}{} -> Fallback default", prefix, line_header);
                    return Ok(());
                }
            },
            Provenance::Computed => match formula.rule_for(kind, placement) {
                None => {
                    let _ = writeln!(self.output, "{}{}", prefix, line_header);
                    return Ok(());
                }
                Some(rule) if rule.is_input() => {
                    let _ = writeln!(self.output, "{}{} -> Input", prefix, line_header);
                    return Ok(());
                }
                Some(rule) => {
                    let _ = writeln!(self.output, "{}{} = {}", prefix, line_header, formula.summary);
                    rule
                }
            },
        };

        self.recurse_dependencies(body, rule, level, prefix)
    }

    fn recurse_dependencies(
        &mut self,
        body: BodyId,
        rule: &Rule,
        level: usize,
        prefix: &str,
    ) -> Result<(), ResolutionError> {
        let stem = build_child_stem(prefix);
        for (i, dep) in rule.deps.iter().enumerate() {
            let connector = if i == rule.deps.len() - 1 { "`--" } else { "|--" };
            let full_prefix = format!("{}{}", stem, connector);
            match self.engine.system().target_of(body, dep.target) {
                Some(target) => self.trace_node(target, dep.quantity, level + 1, &full_prefix)?,
                None => {
                    let _ = writeln!(
                        self.output,
                        "{}[L{}] {}.{} -> (no such body)",
                        full_prefix,
                        level + 1,
                        dep.target,
                        dep.quantity
                    );
                }
            }
        }
        Ok(())
    }
}

fn format_value(quantity: QuantityId, resolution: &Resolution) -> String {
    match resolution {
        Resolution::Value(v) => match quantity.canonical_unit() {
            Unit::Dimensionless => format!("[{:.4}]", v),
            unit => format!("[{:.4e} {}]", v, unit),
        },
        Resolution::Unresolved(reason) => format!("[{}]", reason),
    }
}

fn build_child_stem(current_prefix: &str) -> String {
    current_prefix.replace("`--", "   ").replace("|--", "|  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::units::*;
    use crate::store::{BodyKind, Composition, Seeds, SystemHierarchy};
    use QuantityId as Q;

    fn sun_and_earth(earth: Seeds) -> (SystemHierarchy, BodyId, BodyId) {
        let mut sys = SystemHierarchy::new();
        let sun = sys
            .add_body(
                None,
                BodyKind::Star,
                Seeds::named("Sun").with(Q::Mass, SOLAR_MASS).with(Q::Luminosity, SOLAR_LUMINOSITY),
            )
            .unwrap();
        let planet = sys.add_body(Some(sun), BodyKind::Planet, earth).unwrap();
        (sys, sun, planet)
    }

    fn earth() -> Seeds {
        Seeds::named("Earth")
            .with(Q::Mass, EARTH_MASS)
            .with(Q::SemiMajorAxis, ASTRONOMICAL_UNIT)
            .with(Q::Eccentricity, 0.0)
            .composition(Composition::Rockworld70)
    }

    #[test]
    fn test_trace_lists_dependencies_across_bodies() {
        let (sys, _, planet) = sun_and_earth(earth());
        let engine = ResolutionEngine::new(&sys);
        let trace = format_trace(&engine, planet, Q::Insolation).unwrap();

        let lines: Vec<&str> = trace.lines().collect();
        assert_eq!(lines[0], "TRACE for 'Earth.insolation':");
        assert!(lines[2].starts_with("[L1] Earth.insolation["), "Trace:\n{}", trace);
        assert!(lines[3].starts_with("|--[L2] Sun.luminosity["), "Trace:\n{}", trace);
        assert!(lines[3].ends_with("-> Seed"));
        assert!(lines[5].starts_with("`--[L2] Earth.eccentricity[0.0000]"), "Trace:\n{}", trace);
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_repeated_dependency_is_a_reference() {
        let (sys, _, planet) = sun_and_earth(earth());
        let engine = ResolutionEngine::new(&sys);
        let trace = format_trace(&engine, planet, Q::Density).unwrap();
        // Radius reads the mass already printed at level 2.
        assert!(trace.contains("|--[L2] Earth.mass["), "Trace:\n{}", trace);
        assert!(trace.contains("-> (Ref to L2)"), "Trace:\n{}", trace);
        assert!(trace.contains("   `--[L3] Earth.radius["), "Trace:\n{}", trace);
    }

    #[test]
    fn test_fallbacks_and_missing_inputs() {
        let (sys, _, planet) = sun_and_earth(Seeds::named("Rock").composition(Composition::Rockworld70));
        let engine = ResolutionEngine::new(&sys);

        let density = format_trace(&engine, planet, Q::Density).unwrap();
        assert!(density.contains("Rock.density[") && density.contains("= fallback estimate"), "Trace:\n{}", density);

        let albedo = format_trace(&engine, planet, Q::Albedo).unwrap();
        assert!(albedo.contains("[L1] Rock.albedo[0.3000] -> Fallback default"), "Trace:\n{}", albedo);

        let flux = format_trace(&engine, planet, Q::Insolation).unwrap();
        assert!(flux.contains("Rock.insolation[insufficient data (semi_major_axis of self)]"), "Trace:\n{}", flux);
        assert!(flux.contains("Rock.semi_major_axis[insufficient data (semi_major_axis of self)] -> Input"));
    }

    #[test]
    fn test_unknown_body() {
        let (sys, _, _) = sun_and_earth(earth());
        let engine = ResolutionEngine::new(&sys);
        assert_eq!(format_trace(&engine, BodyId(42), Q::Mass), Err(ResolutionError::UnknownBody(BodyId(42))));
    }
}
