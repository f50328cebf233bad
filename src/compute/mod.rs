//! On-demand resolution of quantities with per-body memoization.
pub mod engine;
pub mod ledger;

pub use engine::{QuantityMap, ResolutionEngine};
pub use ledger::{CacheEntry, Computed, Provenance, QuantityCache, Resolution, ResolutionError, UnresolvedReason};
