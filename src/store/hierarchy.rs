use super::body::{Body, Seeds};
use super::error::HierarchyError;
use super::types::*;
use crate::compute::ledger::CacheEntry;
use crate::config::ModelConfig;
use crate::formulas::{QuantityId, Target};
use serde::{Serialize, Deserialize};
use smallvec::SmallVec;
use std::collections::HashSet;
use tracing::debug;

/// The forest of bodies. Slots of removed bodies stay empty so ids are never reused.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SystemHierarchy {
    bodies: Vec<Option<Body>>,
    generation: u64,
    #[serde(default)]
    config: ModelConfig,

    // Ephemeral state for uniqueness checks (Not serialized, rebuilt on load)
    #[serde(skip)]
    used_names: HashSet<String>,
}

impl SystemHierarchy {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(config: ModelConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// The edit generation. Bumped by every successful mutation.
    #[inline(always)]
    pub fn generation(&self) -> u64 { self.generation }

    pub fn model_config(&self) -> &ModelConfig { &self.config }

    /// Number of live bodies.
    pub fn count(&self) -> usize { self.bodies.iter().flatten().count() }

    #[inline(always)]
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())?.as_ref()
    }

    /// Live body ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_some())
            .map(|(i, _)| BodyId::new(i))
    }

    pub fn roots(&self) -> Vec<BodyId> {
        self.ids().filter(|&id| self.parent_of(id).is_none()).collect()
    }

    /// Rebuilds the `used_names` set after deserialization.
    pub fn rebuild_name_cache(&mut self) {
        self.used_names = self.bodies.iter().flatten().map(|b| b.name.clone()).collect();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut system: Self = serde_json::from_str(json)?;
        system.rebuild_name_cache();
        Ok(system)
    }

    // --- Edits ---

    pub fn add_body(
        &mut self,
        parent: Option<BodyId>,
        kind: BodyKind,
        mut seeds: Seeds,
    ) -> Result<BodyId, HierarchyError> {
        self.check_placement(kind, parent)?;
        Self::check_seeds(&seeds)?;

        let id = BodyId::new(self.bodies.len());
        let generation = self.bump();
        seeds.name = self.claim_name(&seeds.name, kind);

        debug!(body = %id, %kind, name = %seeds.name, generation, "adding body");
        self.bodies.push(Some(Body::new(kind, parent, seeds, generation)));
        if let Some(parent) = parent {
            self.attach(id, parent, generation);
        }
        Ok(id)
    }

    /// Removes a body and its whole subtree. Returns the removed ids, root first.
    pub fn remove_body(&mut self, id: BodyId) -> Result<Vec<BodyId>, HierarchyError> {
        self.body(id).ok_or(HierarchyError::UnknownBody(id))?;
        let removed = self.subtree(id);
        let generation = self.bump();

        self.detach(id, generation);
        for &gone in &removed {
            if let Some(body) = self.bodies[gone.index()].take() {
                self.used_names.remove(&body.name);
            }
        }
        debug!(body = %id, removed = removed.len(), generation, "removed subtree");
        Ok(removed)
    }

    /// Sets a user-supplied value. Caches are not touched; staleness is detected lazily.
    pub fn set_attribute(&mut self, id: BodyId, quantity: QuantityId, value: f64) -> Result<(), HierarchyError> {
        if !value.is_finite() {
            return Err(HierarchyError::NonFiniteAttribute { quantity, value });
        }
        self.body(id).ok_or(HierarchyError::UnknownBody(id))?;
        let generation = self.bump();
        if let Some(body) = self.body_mut(id) {
            body.seeds.insert(quantity, value);
            body.edited_at = generation;
        }
        debug!(body = %id, %quantity, value, generation, "attribute set");
        Ok(())
    }

    /// Removes a user-supplied value. Returns whether one was present.
    pub fn clear_attribute(&mut self, id: BodyId, quantity: QuantityId) -> Result<bool, HierarchyError> {
        let present = self.body(id).ok_or(HierarchyError::UnknownBody(id))?.seeds.contains_key(&quantity);
        if present {
            let generation = self.bump();
            if let Some(body) = self.body_mut(id) {
                body.seeds.remove(&quantity);
                body.edited_at = generation;
            }
        }
        Ok(present)
    }

    pub fn set_composition(&mut self, id: BodyId, composition: Option<Composition>) -> Result<(), HierarchyError> {
        self.body(id).ok_or(HierarchyError::UnknownBody(id))?;
        let generation = self.bump();
        if let Some(body) = self.body_mut(id) {
            body.composition = composition;
            body.edited_at = generation;
        }
        Ok(())
    }

    /// Renames a body, returning the unique name actually assigned.
    pub fn rename(&mut self, id: BodyId, name: &str) -> Result<String, HierarchyError> {
        let (old, kind) = {
            let body = self.body(id).ok_or(HierarchyError::UnknownBody(id))?;
            (body.name.clone(), body.kind)
        };
        self.used_names.remove(&old);
        let assigned = self.claim_name(name, kind);
        self.bump();
        if let Some(body) = self.body_mut(id) {
            body.name = assigned.clone();
        }
        Ok(assigned)
    }

    /// Re-attaches a body (with its subtree) under a new parent, or at the root.
    pub fn move_body(&mut self, id: BodyId, new_parent: Option<BodyId>) -> Result<(), HierarchyError> {
        let kind = self.kind_of(id).ok_or(HierarchyError::UnknownBody(id))?;
        if let Some(target) = new_parent {
            if target == id || self.ancestors(target).any(|a| a == id) {
                return Err(HierarchyError::Cycle { body: id, new_parent: target });
            }
        }
        if self.parent_of(id) == new_parent {
            return Ok(());
        }
        self.check_placement(kind, new_parent)?;

        let generation = self.bump();
        self.detach(id, generation);
        if let Some(body) = self.body_mut(id) {
            body.parent = new_parent;
            body.edited_at = generation;
        }
        if let Some(parent) = new_parent {
            self.attach(id, parent, generation);
        }
        debug!(body = %id, parent = ?new_parent, generation, "moved body");
        Ok(())
    }

    /// Replaces the model configuration. Every cached value becomes stale.
    pub fn set_model_config(&mut self, config: ModelConfig) {
        let generation = self.bump();
        self.config = config;
        for body in self.bodies.iter_mut().flatten() {
            body.edited_at = generation;
        }
    }

    // --- Structure accessors ---

    pub fn parent_of(&self, id: BodyId) -> Option<BodyId> {
        self.body(id)?.parent
    }

    pub fn children_of(&self, id: BodyId) -> &[BodyId] {
        self.body(id).map(|b| b.children.as_slice()).unwrap_or(&[])
    }

    pub fn kind_of(&self, id: BodyId) -> Option<BodyKind> {
        self.body(id).map(|b| b.kind)
    }

    pub fn name_of(&self, id: BodyId) -> Option<&str> {
        self.body(id).map(|b| b.name.as_str())
    }

    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.ids().find(|&id| self.name_of(id) == Some(name))
    }

    /// The stellar members of a barycenter, primary first.
    pub fn members_of(&self, id: BodyId) -> SmallVec<[BodyId; 2]> {
        match self.body(id) {
            Some(b) if b.kind == BodyKind::Barycenter => b
                .children
                .iter()
                .copied()
                .filter(|&c| self.kind_of(c).map_or(false, |k| k.is_stellar()))
                .collect(),
            _ => SmallVec::new(),
        }
    }

    pub fn pair_partner_of(&self, id: BodyId) -> Option<BodyId> {
        let body = self.body(id)?;
        body.pair?;
        let parent = body.parent?;
        self.members_of(parent).into_iter().find(|&m| m != id)
    }

    pub fn placement_of(&self, id: BodyId) -> Option<Placement> {
        let body = self.body(id)?;
        let placement = match body.parent.and_then(|p| self.body(p)) {
            None => Placement::Root,
            Some(parent) => match parent.kind {
                BodyKind::Barycenter if body.kind.is_stellar() => Placement::PairMember,
                BodyKind::Barycenter => Placement::PType,
                BodyKind::Star if parent.pair.is_some() => Placement::SType,
                _ => Placement::Orbiting,
            },
        };
        Some(placement)
    }

    pub fn orbit_type_of(&self, id: BodyId) -> Option<OrbitType> {
        match self.placement_of(id)? {
            Placement::PType => Some(OrbitType::PType),
            Placement::SType => Some(OrbitType::SType),
            _ => None,
        }
    }

    /// Nearest stellar ancestor (star or barycenter), excluding the body itself.
    pub fn root_star_of(&self, id: BodyId) -> Option<BodyId> {
        self.ancestors(id).find(|&a| self.kind_of(a).map_or(false, |k| k.is_stellar()))
    }

    /// Resolves a dependency target relative to `id`.
    pub fn target_of(&self, id: BodyId, target: Target) -> Option<BodyId> {
        match target {
            Target::Own => self.body(id).map(|_| id),
            Target::Parent => self.parent_of(id),
            Target::Grandparent => self.parent_of(id).and_then(|p| self.parent_of(p)),
            Target::PairPartner => self.pair_partner_of(id),
            Target::ParentPartner => self.parent_of(id).and_then(|p| self.pair_partner_of(p)),
            Target::RootStar => self.root_star_of(id),
            Target::Primary => self.members_of(id).first().copied(),
            Target::Secondary => self.members_of(id).get(1).copied(),
        }
    }

    pub fn ancestors(&self, id: BodyId) -> impl Iterator<Item = BodyId> + '_ {
        std::iter::successors(self.parent_of(id), move |&p| self.parent_of(p))
    }

    /// The body and all its descendants, pre-order.
    pub fn subtree(&self, id: BodyId) -> Vec<BodyId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if self.body(next).is_none() {
                continue;
            }
            out.push(next);
            stack.extend(self.children_of(next).iter().rev().copied());
        }
        out
    }

    /// Latest edit stamp over every body whose quantities `id` can depend on:
    /// itself, its ancestors, pair partners and barycenter members, transitively.
    pub fn effective_generation(&self, id: BodyId) -> u64 {
        let mut latest = 0;
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            let Some(body) = self.body(next) else { continue };
            latest = latest.max(body.edited_at);
            stack.extend(body.parent);
            stack.extend(self.pair_partner_of(next));
            stack.extend(self.members_of(next));
        }
        latest
    }

    /// Generation stamp of the cached entry for `quantity`, fresh or not.
    pub fn cached_generation(&self, id: BodyId, quantity: QuantityId) -> Option<u64> {
        self.body(id)?.cached(quantity).map(|e: CacheEntry| e.generation)
    }

    // --- Internals ---

    fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.index())?.as_mut()
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn check_seeds(seeds: &Seeds) -> Result<(), HierarchyError> {
        match seeds.values.iter().find(|(_, v)| !v.is_finite()) {
            Some((&quantity, &value)) => Err(HierarchyError::NonFiniteAttribute { quantity, value }),
            None => Ok(()),
        }
    }

    fn check_placement(&self, kind: BodyKind, parent: Option<BodyId>) -> Result<(), HierarchyError> {
        let parent_kind = match parent {
            Some(p) => Some(self.kind_of(p).ok_or(HierarchyError::UnknownBody(p))?),
            None => None,
        };
        if !kind.may_orbit(parent_kind) {
            return Err(HierarchyError::IncompatibleKind { child: kind, parent: parent_kind });
        }
        if let (Some(p), Some(BodyKind::Barycenter)) = (parent, parent_kind) {
            if kind.is_stellar() && self.members_of(p).len() >= 2 {
                return Err(HierarchyError::PairFull(p));
            }
        }
        Ok(())
    }

    /// Links `id` under `parent`, completing a pair when it is the second member.
    fn attach(&mut self, id: BodyId, parent: BodyId, generation: u64) {
        let is_member = self.kind_of(parent) == Some(BodyKind::Barycenter)
            && self.kind_of(id).map_or(false, |k| k.is_stellar());
        if let Some(p) = self.body_mut(parent) {
            p.children.push(id);
            if is_member {
                p.edited_at = generation;
            }
        }
        if is_member {
            let members = self.members_of(parent);
            if members.len() == 2 {
                for m in members {
                    if let Some(body) = self.body_mut(m) {
                        body.pair = Some(PairId(parent.0));
                    }
                }
            }
        }
    }

    /// Unlinks `id` from its parent, dissolving its pair if it was a member.
    fn detach(&mut self, id: BodyId, generation: u64) {
        let Some(parent) = self.parent_of(id) else { return };
        let partner = self.pair_partner_of(id);
        if let Some(p) = self.body_mut(parent) {
            p.children.retain(|&c| c != id);
            if p.kind == BodyKind::Barycenter {
                p.edited_at = generation;
            }
        }
        for member in partner.into_iter().chain(std::iter::once(id)) {
            if let Some(body) = self.body_mut(member) {
                body.pair = None;
            }
        }
    }

    fn claim_name(&mut self, requested: &str, kind: BodyKind) -> String {
        // --- Unique Name Enforcement ---
        let original_name = if requested.trim().is_empty() { kind.to_string() } else { requested.to_string() };
        let mut candidate_name = original_name.clone();
        let mut counter = 1;

        while self.used_names.contains(&candidate_name) {
            candidate_name = format!("{}_{}", original_name, counter);
            counter += 1;
        }
        self.used_names.insert(candidate_name.clone());
        candidate_name
    }
}
