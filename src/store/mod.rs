//! Body model and system hierarchy.
pub mod body;
pub mod error;
pub mod hierarchy;
pub mod types;

pub use body::{Body, Seeds};
pub use error::HierarchyError;
pub use hierarchy::SystemHierarchy;
pub use types::{BodyId, BodyKind, Composition, OrbitType, PairId, Placement};
