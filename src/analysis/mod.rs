//! Registry audit, physical constants and engine telemetry.
pub mod telemetry;
pub mod topology;
pub mod units;

pub use telemetry::{Telemetry, TelemetryReport};
pub use topology::{audit, AuditError, DependencyGraph};
pub use units::Unit;
