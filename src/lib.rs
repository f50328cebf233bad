//! Core of a stellar system modeller: a hierarchy of stars, binary pairs,
//! planets and satellites whose physical quantities are derived on demand from
//! a fixed formula registry, memoized per body and checked by an advisory
//! validator.

pub mod analysis;
pub mod compute;
pub mod config;
pub mod display;
pub mod formulas;
pub mod store;
pub mod validation;

pub use compute::{Provenance, Resolution, ResolutionEngine, ResolutionError, UnresolvedReason};
pub use config::{EngineConfig, ModelConfig, ValidationConfig};
pub use display::format_trace;
pub use formulas::{FormulaRegistry, QuantityId, StellarClass, Target};
pub use store::{BodyId, BodyKind, Composition, HierarchyError, Seeds, SystemHierarchy};
pub use validation::{Finding, FindingKind, Severity, Validator};
