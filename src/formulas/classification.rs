//! Harvard spectral classes assigned from main-sequence mass.

use crate::analysis::units::to_solar_masses;
use serde::{Serialize, Deserialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StellarClass {
    O,
    B,
    A,
    F,
    G,
    K,
    M,
}

/// Lower mass bound of each class in solar masses, heaviest first.
const MASS_CLASSES: [(f64, StellarClass); 7] = [
    (16.0, StellarClass::O),
    (2.1, StellarClass::B),
    (1.4, StellarClass::A),
    (1.04, StellarClass::F),
    (0.8, StellarClass::G),
    (0.45, StellarClass::K),
    (0.08, StellarClass::M),
];

impl StellarClass {
    /// Class of a main-sequence star of `mass` kg. `None` below the hydrogen
    /// burning limit and above 150 solar masses.
    pub fn from_mass(mass: f64) -> Option<Self> {
        let m = to_solar_masses(mass);
        if m >= 150.0 {
            return None;
        }
        MASS_CLASSES.iter().find(|(lower, _)| m >= *lower).map(|&(_, class)| class)
    }

    /// Fraction of main-sequence stars in the solar neighbourhood with this class.
    pub fn appearance_frequency(&self) -> f64 {
        match self {
            StellarClass::O => 3e-7,
            StellarClass::B => 0.0013,
            StellarClass::A => 0.006,
            StellarClass::F => 0.03,
            StellarClass::G => 0.076,
            StellarClass::K => 0.121,
            StellarClass::M => 0.7645,
        }
    }
}

impl fmt::Display for StellarClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
