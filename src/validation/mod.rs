//! Advisory checks over resolved quantities.
pub mod finding;
pub mod rules;
pub mod validator;

pub use finding::{Finding, FindingKind, Severity};
pub use rules::geology::TectonicActivity;
pub use validator::Validator;
