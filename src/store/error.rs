//! Rejected hierarchy mutations. A failed edit leaves the hierarchy unchanged.
use super::types::{BodyId, BodyKind};
use crate::formulas::QuantityId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HierarchyError {
    #[error("Body {0} does not exist")]
    UnknownBody(BodyId),

    /// The child kind may not be attached under the parent kind (or at the root).
    #[error("A {child} cannot be placed {}", describe_parent(.parent))]
    IncompatibleKind { child: BodyKind, parent: Option<BodyKind> },

    /// A barycenter already holds its two stellar members.
    #[error("Barycenter {0} already holds a complete pair")]
    PairFull(BodyId),

    /// The move would make a body its own ancestor.
    #[error("Moving {body} under {new_parent} would create a cycle")]
    Cycle { body: BodyId, new_parent: BodyId },

    #[error("Attribute '{quantity}' must be a finite number, got {value}")]
    NonFiniteAttribute { quantity: QuantityId, value: f64 },
}

fn describe_parent(parent: &Option<BodyKind>) -> String {
    match parent {
        Some(kind) => format!("under a {}", kind),
        None => "at the root of the system".to_string(),
    }
}
