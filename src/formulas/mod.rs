//! The formula registry: quantity identifiers, formula descriptors and the
//! built-in catalog of stellar and planetary relations.

pub mod catalog;
pub mod classification;
pub mod descriptor;
pub mod habitability;
pub mod physics;
pub mod quantity;
pub mod registry;

pub use classification::StellarClass;
pub use descriptor::{Dependency, Fallback, Formula, FormulaContext, Inputs, Rule, Target};
pub use quantity::QuantityId;
pub use registry::{FormulaRegistry, RegistryBuilder};
