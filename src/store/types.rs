use serde::{Serialize, Deserialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl BodyId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies a binary pair. The id is the index of the pair's barycenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Star,
    Planet,
    Satellite,
    /// Placeholder for the common center of mass of a binary pair.
    Barycenter,
}

impl BodyKind {
    /// Stars and barycenters: bodies that can host orbits and form pairs.
    #[inline(always)]
    pub fn is_stellar(&self) -> bool {
        matches!(self, BodyKind::Star | BodyKind::Barycenter)
    }

    /// Whether a body of this kind may be attached under `parent`.
    /// `None` stands for the forest root.
    pub fn may_orbit(&self, parent: Option<BodyKind>) -> bool {
        match (self, parent) {
            (BodyKind::Star | BodyKind::Barycenter, None) => true,
            (BodyKind::Star | BodyKind::Barycenter, Some(BodyKind::Barycenter)) => true,
            (BodyKind::Planet, Some(BodyKind::Star | BodyKind::Barycenter)) => true,
            (BodyKind::Satellite, Some(BodyKind::Planet)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BodyKind::Star => "star",
            BodyKind::Planet => "planet",
            BodyKind::Satellite => "satellite",
            BodyKind::Barycenter => "barycenter",
        };
        f.write_str(s)
    }
}

/// Where a body sits relative to its parent. Formula rules select on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    /// Top of a tree.
    Root,
    /// One of the two stellar members under a barycenter.
    PairMember,
    /// Orbits a single star that is not part of a pair, or a planet.
    Orbiting,
    /// Orbits one member of a binary pair.
    SType,
    /// Orbits the barycenter of a binary pair.
    PType,
}

/// Orbit classification of a child of a binary pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitType {
    PType,
    SType,
}

/// Bulk composition models for planets and satellites (Seager et al. 2007).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Composition {
    Rockworld70,
    Rockworld100,
    Ironworld67,
    Ironworld100,
    Waterworld25,
    Waterworld45,
    Waterworld75,
    Waterworld100,
    Icegiant,
    Gasgiant,
}

impl Composition {
    pub const ALL: [Composition; 10] = [
        Composition::Rockworld70,
        Composition::Rockworld100,
        Composition::Ironworld67,
        Composition::Ironworld100,
        Composition::Waterworld25,
        Composition::Waterworld45,
        Composition::Waterworld75,
        Composition::Waterworld100,
        Composition::Icegiant,
        Composition::Gasgiant,
    ];

    /// Scaling constants `(m1, r1, k3)` of the mass/radius relation,
    /// with `m1` in Earth masses and `r1` in Earth radii.
    pub fn radius_model(&self) -> (f64, f64, f64) {
        match self {
            Composition::Rockworld70 => (6.41, 3.19, 0.394),
            Composition::Rockworld100 => (10.55, 3.90, 0.394),
            Composition::Ironworld67 => (6.41, 2.84, 0.394),
            Composition::Ironworld100 => (5.8, 2.52, 0.394),
            Composition::Waterworld25 => (6.41, 3.63, 0.394),
            Composition::Waterworld45 => (6.88, 4.02, 0.394),
            Composition::Waterworld75 => (7.63, 4.42, 0.394),
            Composition::Waterworld100 => (5.52, 4.43, 0.394),
            Composition::Icegiant => (2.12331414, 4.75266068, 0.34468561),
            Composition::Gasgiant => (3.18600277, 8.83406481, 0.30311577),
        }
    }

    /// Mass fraction of the silicate mantle, used for radiogenic heating.
    pub fn mantle_fraction(&self) -> f64 {
        match self {
            Composition::Rockworld70 => 0.7,
            Composition::Rockworld100 => 1.0,
            Composition::Ironworld67 => 0.325,
            Composition::Ironworld100 => 0.0,
            Composition::Waterworld25 => 0.525,
            Composition::Waterworld45 => 0.485,
            Composition::Waterworld75 => 0.22,
            Composition::Waterworld100 => 0.0,
            Composition::Icegiant | Composition::Gasgiant => 0.0,
        }
    }

    /// Representative mass in Earth masses for a body of this composition.
    pub fn reference_mass(&self) -> f64 {
        match self {
            Composition::Icegiant => 17.1,
            Composition::Gasgiant => 317.8,
            _ => 1.0,
        }
    }

    #[inline(always)]
    pub fn is_giant(&self) -> bool {
        matches!(self, Composition::Icegiant | Composition::Gasgiant)
    }

    #[inline(always)]
    pub fn is_iron(&self) -> bool {
        matches!(self, Composition::Ironworld67 | Composition::Ironworld100)
    }

    /// Rock and iron worlds: bodies that cannot form beyond the rock line.
    #[inline(always)]
    pub fn is_rocky(&self) -> bool {
        matches!(self, Composition::Rockworld70 | Composition::Rockworld100) || self.is_iron()
    }

    #[inline(always)]
    pub fn is_water(&self) -> bool {
        matches!(
            self,
            Composition::Waterworld25
                | Composition::Waterworld45
                | Composition::Waterworld75
                | Composition::Waterworld100
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(BodyKind::Star, None, true)]
    #[case(BodyKind::Barycenter, None, true)]
    #[case(BodyKind::Star, Some(BodyKind::Barycenter), true)]
    #[case(BodyKind::Barycenter, Some(BodyKind::Barycenter), true)]
    #[case(BodyKind::Planet, Some(BodyKind::Star), true)]
    #[case(BodyKind::Planet, Some(BodyKind::Barycenter), true)]
    #[case(BodyKind::Satellite, Some(BodyKind::Planet), true)]
    #[case(BodyKind::Star, Some(BodyKind::Planet), false)]
    #[case(BodyKind::Star, Some(BodyKind::Star), false)]
    #[case(BodyKind::Planet, None, false)]
    #[case(BodyKind::Planet, Some(BodyKind::Planet), false)]
    #[case(BodyKind::Satellite, Some(BodyKind::Star), false)]
    #[case(BodyKind::Barycenter, Some(BodyKind::Star), false)]
    fn test_kind_compatibility(
        #[case] child: BodyKind,
        #[case] parent: Option<BodyKind>,
        #[case] allowed: bool,
    ) {
        assert_eq!(child.may_orbit(parent), allowed);
    }

    #[test]
    fn test_composition_classes_are_disjoint() {
        for c in Composition::ALL {
            let classes = [c.is_rocky(), c.is_water(), c.is_giant()];
            assert_eq!(classes.iter().filter(|&&b| b).count(), 1, "{:?}", c);
        }
    }
}
