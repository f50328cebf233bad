use crate::formulas::{QuantityId, Target};
use crate::store::BodyId;
use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Fatal resolution failures. These indicate a defect in the registry or in the
/// caller, never a property of the modelled system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("No formula registered for quantity '{0}'")]
    UnknownQuantity(QuantityId),
    #[error("Cyclic dependency resolving '{quantity}' on body {body}: {}", format_path(.path))]
    CyclicDependency {
        body: BodyId,
        quantity: QuantityId,
        path: Vec<(BodyId, QuantityId)>,
    },
    #[error("Body {0} does not exist")]
    UnknownBody(BodyId),
}

fn format_path(path: &[(BodyId, QuantityId)]) -> String {
    path.iter()
        .map(|(b, q)| format!("{}.{}", b, q))
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Why a quantity has no value. Unresolved is an ordinary result, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnresolvedReason {
    /// A mandatory input was absent, or its target body does not exist.
    MissingInput { quantity: QuantityId, target: Target },
    /// The formula needs a composition model and none was assigned.
    MissingComposition,
    /// No rule exists for this body kind and placement.
    NotApplicable,
    /// The formula produced a non-finite value for these inputs.
    Undefined,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::MissingInput { quantity, target } => {
                write!(f, "insufficient data ({} of {})", quantity, target)
            }
            UnresolvedReason::MissingComposition => f.write_str("insufficient data (composition)"),
            UnresolvedReason::NotApplicable => f.write_str("not applicable"),
            UnresolvedReason::Undefined => f.write_str("undefined for these inputs"),
        }
    }
}

/// Outcome of a formula evaluation before it is wrapped into a [`Resolution`].
pub type Computed = Result<f64, UnresolvedReason>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Resolution {
    Value(f64),
    Unresolved(UnresolvedReason),
}

impl Resolution {
    #[inline(always)]
    pub fn value(&self) -> Option<f64> {
        match self { Resolution::Value(v) => Some(*v), Resolution::Unresolved(_) => None }
    }

    #[inline(always)]
    pub fn is_resolved(&self) -> bool { matches!(self, Resolution::Value(_)) }

    pub fn reason(&self) -> Option<UnresolvedReason> {
        match self { Resolution::Unresolved(r) => Some(*r), Resolution::Value(_) => None }
    }
}

impl From<Computed> for Resolution {
    fn from(c: Computed) -> Self {
        match c {
            Ok(v) if v.is_finite() => Resolution::Value(v),
            Ok(_) => Resolution::Unresolved(UnresolvedReason::Undefined),
            Err(reason) => Resolution::Unresolved(reason),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Value(v) => write!(f, "{:.6e}", v),
            Resolution::Unresolved(r) => write!(f, "{}", r),
        }
    }
}

/// How a cached value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// User-supplied value. Never cached.
    Seed,
    Computed,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheEntry {
    pub resolution: Resolution,
    /// Hierarchy generation snapshotted by the resolve call that produced this entry.
    pub generation: u64,
    pub provenance: Provenance,
}

/// Per-body memo of resolved quantities, tagged by generation.
/// Stale entries are not purged; they are overwritten on the next resolve.
#[derive(Debug, Clone, Default)]
pub struct QuantityCache {
    entries: HashMap<QuantityId, CacheEntry>,
}

impl QuantityCache {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, quantity: QuantityId) -> Option<&CacheEntry> {
        self.entries.get(&quantity)
    }

    /// Returns the entry only if it was computed at or after `effective_generation`.
    pub fn get_fresh(&self, quantity: QuantityId, effective_generation: u64) -> Option<CacheEntry> {
        self.entries
            .get(&quantity)
            .filter(|e| e.generation >= effective_generation)
            .copied()
    }

    pub fn insert(&mut self, quantity: QuantityId, entry: CacheEntry) {
        self.entries.insert(quantity, entry);
    }

    pub fn clear(&mut self) { self.entries.clear(); }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(v: f64, generation: u64) -> CacheEntry {
        CacheEntry { resolution: Resolution::Value(v), generation, provenance: Provenance::Computed }
    }

    #[test]
    fn test_freshness_is_generation_bounded() {
        let mut cache = QuantityCache::new();
        cache.insert(QuantityId::Mass, entry(1.0, 5));

        assert!(cache.get_fresh(QuantityId::Mass, 5).is_some());
        assert!(cache.get_fresh(QuantityId::Mass, 3).is_some());
        assert!(cache.get_fresh(QuantityId::Mass, 6).is_none());
        // Stale entries stay until overwritten.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_non_finite_values_become_undefined() {
        assert_eq!(Resolution::from(Ok(f64::NAN)), Resolution::Unresolved(UnresolvedReason::Undefined));
        assert_eq!(Resolution::from(Ok(f64::INFINITY)).value(), None);
        assert_eq!(Resolution::from(Ok(2.0)).value(), Some(2.0));
    }

    #[test]
    fn test_cycle_error_lists_path() {
        let err = ResolutionError::CyclicDependency {
            body: BodyId(1),
            quantity: QuantityId::Mass,
            path: vec![(BodyId(1), QuantityId::Mass), (BodyId(1), QuantityId::Density)],
        };
        let msg = err.to_string();
        assert!(msg.contains("#1.mass -> #1.density"), "Msg: {}", msg);
    }
}
