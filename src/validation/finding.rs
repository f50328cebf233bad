//! Advisory findings produced by the validator.
use crate::formulas::QuantityId;
use crate::store::BodyId;
use serde::{Serialize, Deserialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// The check that produced a finding. Allows programmatic filtering without
/// matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    UnboundOrbit,
    RocheLimit,
    InnerOrbitLimit,
    PtypeCriticalOrbit,
    StypeCriticalOrbit,
    OuterOrbitLimit,
    TidalLocking,
    RockLine,
    FrostLine,
    HabitableZone,
    HabitableMass,
    HabitableRadius,
    ShortLifetime,
    ContactBinary,
    UnreachableHabitableZone,
    Tectonics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub body: BodyId,
    pub body_name: String,
    pub severity: Severity,
    pub kind: FindingKind,
    /// The quantity the finding is about.
    pub quantity: QuantityId,
    pub message: String,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}.{}: {}", self.severity, self.body_name, self.quantity, self.message)
    }
}
