use super::types::*;
use crate::compute::ledger::{CacheEntry, QuantityCache};
use crate::formulas::QuantityId;
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// User-supplied inputs for a new body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seeds {
    pub name: String,
    pub composition: Option<Composition>,
    pub values: BTreeMap<QuantityId, f64>,
}

impl Seeds {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with(mut self, quantity: QuantityId, value: f64) -> Self {
        self.values.insert(quantity, value);
        self
    }

    pub fn composition(mut self, composition: Composition) -> Self {
        self.composition = Some(composition);
        self
    }
}

/// A celestial body. Links to parent and children are ids owned by the hierarchy;
/// the body exclusively owns its quantity cache.
#[derive(Debug, Serialize, Deserialize)]
pub struct Body {
    pub(crate) name: String,
    pub(crate) kind: BodyKind,
    pub(crate) composition: Option<Composition>,
    pub(crate) parent: Option<BodyId>,
    pub(crate) children: Vec<BodyId>,
    pub(crate) pair: Option<PairId>,
    pub(crate) seeds: BTreeMap<QuantityId, f64>,
    /// Generation of the last edit that can change this body's own formulas.
    pub(crate) edited_at: u64,

    // Derived state is always recomputable and never serialized.
    #[serde(skip)]
    cache: RwLock<QuantityCache>,
}

impl Body {
    pub(crate) fn new(kind: BodyKind, parent: Option<BodyId>, seeds: Seeds, generation: u64) -> Self {
        Self {
            name: seeds.name,
            kind,
            composition: seeds.composition,
            parent,
            children: Vec::new(),
            pair: None,
            seeds: seeds.values,
            edited_at: generation,
            cache: RwLock::default(),
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn kind(&self) -> BodyKind { self.kind }
    pub fn composition(&self) -> Option<Composition> { self.composition }
    pub fn parent(&self) -> Option<BodyId> { self.parent }
    pub fn children(&self) -> &[BodyId] { &self.children }
    pub fn pair(&self) -> Option<PairId> { self.pair }
    pub fn edited_at(&self) -> u64 { self.edited_at }

    #[inline(always)]
    pub fn seed(&self, quantity: QuantityId) -> Option<f64> {
        self.seeds.get(&quantity).copied()
    }

    pub fn seeds(&self) -> &BTreeMap<QuantityId, f64> { &self.seeds }

    pub fn cached(&self, quantity: QuantityId) -> Option<CacheEntry> {
        self.read_cache().get(quantity).copied()
    }

    pub(crate) fn fresh(&self, quantity: QuantityId, effective_generation: u64) -> Option<CacheEntry> {
        self.read_cache().get_fresh(quantity, effective_generation)
    }

    pub(crate) fn store(&self, quantity: QuantityId, entry: CacheEntry) {
        self.write_cache().insert(quantity, entry);
    }

    pub fn cache_len(&self) -> usize { self.read_cache().len() }

    // Writers only insert whole entries, so a poisoned lock still guards a consistent map.
    fn read_cache(&self) -> RwLockReadGuard<'_, QuantityCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, QuantityCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}
