//! Formula descriptors: which inputs a quantity needs, on which body, and how
//! to combine them.

use super::quantity::QuantityId;
use crate::compute::ledger::{Computed, UnresolvedReason};
use crate::config::ModelConfig;
use crate::store::{BodyId, BodyKind, Composition, Placement, SystemHierarchy};
use serde::{Serialize, Deserialize};
use smallvec::SmallVec;
use std::fmt;

/// The body a dependency is evaluated against, relative to the body being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Own,
    Parent,
    Grandparent,
    /// The other member of the pair this body belongs to.
    PairPartner,
    /// The companion of the star this body orbits.
    ParentPartner,
    /// Nearest stellar ancestor (star or barycenter).
    RootStar,
    /// First member of a barycenter.
    Primary,
    /// Second member of a barycenter.
    Secondary,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Target::Own => "self",
            Target::Parent => "parent",
            Target::Grandparent => "grandparent",
            Target::PairPartner => "pair partner",
            Target::ParentPartner => "parent's partner",
            Target::RootStar => "root star",
            Target::Primary => "primary",
            Target::Secondary => "secondary",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub target: Target,
    pub quantity: QuantityId,
    /// Optional inputs are passed as absent instead of failing the rule.
    pub optional: bool,
}

pub type ComputeFn = Box<dyn Fn(&Inputs, &FormulaContext<'_>) -> Computed + Send + Sync>;

/// One way of computing a quantity, valid for some body kinds and placements.
///
/// A rule without a compute function marks the quantity as user input for
/// those bodies: it resolves only from a seed.
pub struct Rule {
    pub kinds: &'static [BodyKind],
    pub placements: Option<&'static [Placement]>,
    pub deps: SmallVec<[Dependency; 6]>,
    compute: Option<ComputeFn>,
}

impl Rule {
    pub fn new(kinds: &'static [BodyKind]) -> Self {
        Self { kinds, placements: None, deps: SmallVec::new(), compute: None }
    }

    /// A seed-only rule.
    pub fn input(kinds: &'static [BodyKind]) -> Self {
        Self::new(kinds)
    }

    pub fn placed(mut self, placements: &'static [Placement]) -> Self {
        self.placements = Some(placements);
        self
    }

    pub fn needs(mut self, target: Target, quantity: QuantityId) -> Self {
        self.deps.push(Dependency { target, quantity, optional: false });
        self
    }

    pub fn may_use(mut self, target: Target, quantity: QuantityId) -> Self {
        self.deps.push(Dependency { target, quantity, optional: true });
        self
    }

    pub fn compute<F>(mut self, f: F) -> Self
    where
        F: Fn(&Inputs, &FormulaContext<'_>) -> Computed + Send + Sync + 'static,
    {
        self.compute = Some(Box::new(f));
        self
    }

    /// Shorthand for computations that depend on the inputs alone and cannot fail.
    pub fn eval<F>(self, f: F) -> Self
    where
        F: Fn(&Inputs) -> f64 + Send + Sync + 'static,
    {
        self.compute(move |x, _| Ok(f(x)))
    }

    #[inline(always)]
    pub fn is_input(&self) -> bool {
        self.compute.is_none()
    }

    pub fn applies_to(&self, kind: BodyKind, placement: Placement) -> bool {
        self.kinds.contains(&kind) && self.placements.map_or(true, |p| p.contains(&placement))
    }

    pub(crate) fn evaluate(&self, inputs: &Inputs, ctx: &FormulaContext<'_>) -> Option<Computed> {
        self.compute.as_ref().map(|f| f(inputs, ctx))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("kinds", &self.kinds)
            .field("placements", &self.placements)
            .field("deps", &self.deps)
            .field("input", &self.is_input())
            .finish()
    }
}

/// What to do when the applicable rule cannot produce a finite value.
#[derive(Debug)]
pub enum Fallback {
    None,
    Constant(f64),
    /// A simpler rule with weaker assumptions.
    Derived(Rule),
}

#[derive(Debug)]
pub struct Formula {
    pub quantity: QuantityId,
    pub summary: &'static str,
    pub rules: Vec<Rule>,
    pub fallback: Fallback,
}

impl Formula {
    pub fn new(quantity: QuantityId, summary: &'static str) -> Self {
        Self { quantity, summary, rules: Vec::new(), fallback: Fallback::None }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// First rule that applies to a body of this kind and placement.
    pub fn rule_for(&self, kind: BodyKind, placement: Placement) -> Option<&Rule> {
        self.rules.iter().find(|r| r.applies_to(kind, placement))
    }

    /// Every rule plus the derived fallback, for static analysis.
    pub fn all_rules(&self) -> impl Iterator<Item = &Rule> {
        let derived = match &self.fallback {
            Fallback::Derived(rule) => Some(rule),
            _ => None,
        };
        self.rules.iter().chain(derived)
    }
}

/// Resolved dependency values, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Inputs(pub(crate) SmallVec<[Option<f64>; 8]>);

impl Inputs {
    /// Value of dependency `i`. Mandatory dependencies are always present when a
    /// rule runs; an absent optional one reads as NaN.
    #[inline(always)]
    pub fn get(&self, i: usize) -> f64 {
        self.0.get(i).copied().flatten().unwrap_or(f64::NAN)
    }

    #[inline(always)]
    pub fn optional(&self, i: usize) -> Option<f64> {
        self.0.get(i).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-only view of the body being resolved.
pub struct FormulaContext<'a> {
    pub body: BodyId,
    pub system: &'a SystemHierarchy,
}

impl<'a> FormulaContext<'a> {
    pub fn kind(&self) -> Option<BodyKind> {
        self.system.kind_of(self.body)
    }

    pub fn placement(&self) -> Option<Placement> {
        self.system.placement_of(self.body)
    }

    pub fn composition(&self) -> Result<Composition, UnresolvedReason> {
        self.system
            .body(self.body)
            .and_then(|b| b.composition())
            .ok_or(UnresolvedReason::MissingComposition)
    }

    pub fn config(&self) -> &ModelConfig {
        self.system.model_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BodyKind::*;
    use Placement::*;

    #[test]
    fn test_rule_selection_follows_declaration_order() {
        let formula = Formula::new(QuantityId::Eccentricity, "test")
            .rule(Rule::new(&[Planet]).placed(&[SType]).eval(|_| 1.0))
            .rule(Rule::input(&[Planet, Satellite]));

        assert!(!formula.rule_for(Planet, SType).unwrap().is_input());
        assert!(formula.rule_for(Planet, PType).unwrap().is_input());
        assert!(formula.rule_for(Satellite, Orbiting).unwrap().is_input());
        assert!(formula.rule_for(Star, Root).is_none());
    }

    #[test]
    fn test_dependency_builders() {
        let rule = Rule::new(&[Planet])
            .needs(Target::Own, QuantityId::Mass)
            .may_use(Target::Parent, QuantityId::Luminosity);
        assert_eq!(rule.deps.len(), 2);
        assert!(!rule.deps[0].optional);
        assert!(rule.deps[1].optional);
        assert_eq!(rule.deps[1].target, Target::Parent);
    }

    #[test]
    fn test_inputs_absent_reads_nan() {
        let inputs = Inputs(SmallVec::from_slice(&[Some(2.0), None]));
        assert_eq!(inputs.get(0), 2.0);
        assert!(inputs.get(1).is_nan());
        assert_eq!(inputs.optional(1), None);
        assert!(inputs.get(7).is_nan());
    }

    #[test]
    fn test_all_rules_includes_derived_fallback() {
        let formula = Formula::new(QuantityId::Density, "test")
            .rule(Rule::new(&[Planet]).eval(|_| 1.0))
            .with_fallback(Fallback::Derived(Rule::new(&[Planet]).eval(|_| 2.0)));
        assert_eq!(formula.all_rules().count(), 2);
    }
}
