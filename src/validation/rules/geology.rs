//! Tectonic activity estimated from internal heat flow.

use crate::compute::ResolutionError;
use crate::formulas::QuantityId as Q;
use crate::validation::finding::{FindingKind, Severity};
use crate::validation::validator::Scope;
use serde::{Serialize, Deserialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TectonicActivity {
    Stagnant,
    Low,
    MediumLow,
    Medium,
    MediumHigh,
    High,
    Extreme,
}

impl TectonicActivity {
    /// Classifies a surface heat flux in W/m^2.
    pub fn from_heat_flux(flux: f64) -> Self {
        match flux {
            f if f < 0.01 => TectonicActivity::Stagnant,
            f if f < 0.04 => TectonicActivity::Low,
            f if f < 0.07 => TectonicActivity::MediumLow,
            f if f < 0.15 => TectonicActivity::Medium,
            f if f < 0.2 => TectonicActivity::MediumHigh,
            f if f < 0.35 => TectonicActivity::High,
            _ => TectonicActivity::Extreme,
        }
    }

    /// Plate tectonics that recycle the surface without resurfacing it.
    pub fn is_moderate(&self) -> bool {
        matches!(self, TectonicActivity::MediumLow | TectonicActivity::Medium | TectonicActivity::MediumHigh)
    }
}

impl fmt::Display for TectonicActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TectonicActivity::Stagnant => "stagnant",
            TectonicActivity::Low => "low",
            TectonicActivity::MediumLow => "medium low",
            TectonicActivity::Medium => "medium",
            TectonicActivity::MediumHigh => "medium high",
            TectonicActivity::High => "high",
            TectonicActivity::Extreme => "extreme",
        };
        f.write_str(s)
    }
}

pub(crate) fn check(scope: &mut Scope<'_, '_>) -> Result<(), ResolutionError> {
    if !scope.is_world() || scope.composition.map_or(true, |c| c.is_giant()) {
        return Ok(());
    }
    let Some(flux) = scope.own(Q::InternalHeating)? else { return Ok(()) };
    let activity = TectonicActivity::from_heat_flux(flux);
    let outlook = if activity.is_moderate() { ", favourable for plate tectonics" } else { "" };
    scope.report(
        Severity::Info,
        FindingKind::Tectonics,
        Q::InternalHeating,
        format!("internal heat flow of {:.4} W/m^2 suggests {} tectonic activity{}", flux, activity, outlook),
    );
    Ok(())
}
