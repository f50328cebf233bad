//! Static audit of a formula registry.
//!
//! Only same-body dependencies are checked here, one graph per body kind.
//! Cross-body dependencies point along the hierarchy and their cycles can only
//! be detected at resolution time.

use crate::formulas::{FormulaRegistry, QuantityId, Target};
use crate::store::BodyKind;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("Cyclic same-body dependency on a {kind} involving '{quantity}'")]
    Cycle { kind: BodyKind, quantity: QuantityId },
    #[error("'{quantity}' depends on '{missing}', which has no formula")]
    Dangling { quantity: QuantityId, missing: QuantityId },
}

const KINDS: [BodyKind; 4] = [BodyKind::Star, BodyKind::Planet, BodyKind::Satellite, BodyKind::Barycenter];

/// Same-body dependency graph of one body kind over registered quantities.
/// Edges point from a dependency to the quantity that consumes it.
#[derive(Debug)]
pub struct DependencyGraph {
    kind: BodyKind,
    graph: DiGraph<QuantityId, ()>,
    index: HashMap<QuantityId, NodeIndex>,
}

impl DependencyGraph {
    pub fn of(registry: &FormulaRegistry, kind: BodyKind) -> Self {
        let mut dg = Self { kind, graph: DiGraph::new(), index: HashMap::new() };
        for quantity in registry.quantities() {
            dg.node(quantity);
        }
        for formula in registry.formulas() {
            let consumer = dg.node(formula.quantity);
            for rule in formula.all_rules().filter(|r| r.kinds.contains(&kind)) {
                for dep in rule.deps.iter().filter(|d| d.target == Target::Own) {
                    let source = dg.node(dep.quantity);
                    dg.graph.update_edge(source, consumer, ());
                }
            }
        }
        dg
    }

    fn node(&mut self, quantity: QuantityId) -> NodeIndex {
        if let Some(&idx) = self.index.get(&quantity) {
            return idx;
        }
        let idx = self.graph.add_node(quantity);
        self.index.insert(quantity, idx);
        idx
    }

    pub fn kind(&self) -> BodyKind { self.kind }

    pub fn node_count(&self) -> usize { self.graph.node_count() }

    pub fn edge_count(&self) -> usize { self.graph.edge_count() }

    /// Quantities ordered so every same-body dependency precedes its consumers.
    pub fn evaluation_order(&self) -> Result<Vec<QuantityId>, AuditError> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|idx| self.graph[idx]).collect())
            .map_err(|cycle| AuditError::Cycle { kind: self.kind, quantity: self.graph[cycle.node_id()] })
    }

    /// Quantities that read `quantity` directly on the same body.
    pub fn dependents_of(&self, quantity: QuantityId) -> Vec<QuantityId> {
        let Some(&idx) = self.index.get(&quantity) else { return Vec::new() };
        let mut out: Vec<QuantityId> =
            self.graph.neighbors_directed(idx, Direction::Outgoing).map(|n| self.graph[n]).collect();
        out.sort();
        out
    }

    /// Every quantity whose value can change when `quantity` changes, the start included.
    pub fn downstream_from(&self, quantity: QuantityId) -> HashSet<QuantityId> {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<QuantityId> = VecDeque::from([quantity]);
        while let Some(next) = queue.pop_front() {
            if visited.insert(next) {
                queue.extend(self.dependents_of(next));
            }
        }
        visited
    }
}

/// Checks that every dependency is registered and that each body kind's
/// same-body graph is acyclic.
pub fn audit(registry: &FormulaRegistry) -> Result<(), AuditError> {
    for formula in registry.formulas() {
        for rule in formula.all_rules() {
            if let Some(dep) = rule.deps.iter().find(|d| registry.get(d.quantity).is_none()) {
                return Err(AuditError::Dangling { quantity: formula.quantity, missing: dep.quantity });
            }
        }
    }
    for kind in KINDS {
        DependencyGraph::of(registry, kind).evaluation_order()?;
    }
    Ok(())
}
