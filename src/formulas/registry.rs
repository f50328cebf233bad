use super::catalog;
use super::descriptor::Formula;
use super::quantity::QuantityId;
use crate::compute::ledger::ResolutionError;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Immutable map from quantity to formula.
///
/// The standard registry is built once per process. Custom registries go
/// through [`RegistryBuilder`] and are frozen by `build()`.
#[derive(Debug, Default)]
pub struct FormulaRegistry {
    formulas: HashMap<QuantityId, Formula>,
}

static STANDARD: OnceLock<FormulaRegistry> = OnceLock::new();

impl FormulaRegistry {
    /// The process-wide catalog of every built-in quantity.
    pub fn standard() -> &'static FormulaRegistry {
        STANDARD.get_or_init(|| catalog::standard().build())
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn lookup(&self, quantity: QuantityId) -> Result<&Formula, ResolutionError> {
        self.formulas.get(&quantity).ok_or(ResolutionError::UnknownQuantity(quantity))
    }

    pub fn get(&self, quantity: QuantityId) -> Option<&Formula> {
        self.formulas.get(&quantity)
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Registered quantities in declaration order of [`QuantityId`].
    pub fn quantities(&self) -> Vec<QuantityId> {
        let mut out: Vec<QuantityId> = self.formulas.keys().copied().collect();
        out.sort();
        out
    }

    pub fn formulas(&self) -> impl Iterator<Item = &Formula> {
        self.formulas.values()
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    formulas: HashMap<QuantityId, Formula>,
}

impl RegistryBuilder {
    /// Adds a formula, replacing any previous one for the same quantity.
    pub fn register(mut self, formula: Formula) -> Self {
        self.formulas.insert(formula.quantity, formula);
        self
    }

    pub fn remove(mut self, quantity: QuantityId) -> Self {
        self.formulas.remove(&quantity);
        self
    }

    pub fn build(self) -> FormulaRegistry {
        FormulaRegistry { formulas: self.formulas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulas::{Rule, Target};
    use crate::store::BodyKind;

    #[test]
    fn test_standard_registry_covers_every_quantity() {
        let registry = FormulaRegistry::standard();
        assert_eq!(registry.len(), QuantityId::ALL.len());
        assert_eq!(registry.quantities(), QuantityId::ALL.to_vec());
        // Same instance on every call.
        assert!(std::ptr::eq(registry, FormulaRegistry::standard()));
    }

    #[test]
    fn test_lookup_unknown_quantity() {
        let registry = FormulaRegistry::builder().build();
        match registry.lookup(QuantityId::Mass) {
            Err(ResolutionError::UnknownQuantity(q)) => assert_eq!(q, QuantityId::Mass),
            other => panic!("Expected UnknownQuantity, got {:?}", other),
        }
    }

    #[test]
    fn test_register_replaces_and_remove_drops() {
        let registry = FormulaRegistry::builder()
            .register(Formula::new(QuantityId::Mass, "first").rule(Rule::input(&[BodyKind::Star])))
            .register(
                Formula::new(QuantityId::Mass, "second")
                    .rule(Rule::new(&[BodyKind::Star]).needs(Target::Own, QuantityId::Radius).eval(|x| x.get(0))),
            )
            .register(Formula::new(QuantityId::Radius, "radius"))
            .remove(QuantityId::Radius)
            .build();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(QuantityId::Mass).unwrap().summary, "second");
        assert!(registry.get(QuantityId::Radius).is_none());
    }
}
