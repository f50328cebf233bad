//! Insolation thresholds and the distances at which a star or binary meets them.
//!
//! A threshold is expressed as an effective flux `Seff` in units of the solar
//! constant. Dividing a luminosity (in solar units) by `Seff` gives the
//! spectrally weighted luminosity, an area whose square root is the threshold
//! distance around a single star. The binary limits combine two such areas.

use super::physics::{forced_eccentricity_close, forced_eccentricity_wide};
use crate::analysis::units::{to_solar_luminosities, ASTRONOMICAL_UNIT};
use crate::config::InsolationModel;

/// Which side of the zone a limit bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Inner,
    Outer,
}

/// An insolation threshold a derived distance is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneLimit {
    ConservativeInner,
    ConservativeOuter,
    OptimisticInner,
    OptimisticOuter,
    WaterFrost,
    Rock,
}

impl ZoneLimit {
    pub fn edge(&self) -> Edge {
        match self {
            ZoneLimit::ConservativeInner | ZoneLimit::OptimisticInner | ZoneLimit::Rock => Edge::Inner,
            ZoneLimit::ConservativeOuter | ZoneLimit::OptimisticOuter | ZoneLimit::WaterFrost => Edge::Outer,
        }
    }
}

/// Kopparapu et al. (2013) polynomial coefficients `(Seff0, a, b, c, d)`.
fn kopparapu_coefficients(limit: ZoneLimit) -> Option<[f64; 5]> {
    match limit {
        // Runaway greenhouse
        ZoneLimit::ConservativeInner => Some([1.107, 1.332e-4, 1.58e-8, -8.308e-12, -1.931e-15]),
        // Maximum greenhouse
        ZoneLimit::ConservativeOuter => Some([0.356, 6.171e-5, 1.698e-9, -3.198e-12, -5.575e-16]),
        // Recent Venus
        ZoneLimit::OptimisticInner => Some([1.776, 2.136e-4, 2.533e-8, -1.332e-11, -3.097e-15]),
        // Early Mars
        ZoneLimit::OptimisticOuter => Some([0.32, 5.547e-5, 1.526e-9, -2.874e-12, -5.011e-16]),
        ZoneLimit::WaterFrost | ZoneLimit::Rock => None,
    }
}

const SELSIS_INNER: (f64, f64) = (2.7619e-5, 3.8095e-9);
const SELSIS_OUTER: (f64, f64) = (1.3786e-4, 1.4286e-9);

/// Selsis et al. (2007) solar-type distance in AU and temperature coefficients.
fn selsis_coefficients(limit: ZoneLimit) -> (f64, (f64, f64)) {
    match limit {
        // Clear skies
        ZoneLimit::ConservativeInner => (0.84, SELSIS_INNER),
        ZoneLimit::ConservativeOuter => (1.67, SELSIS_OUTER),
        // Full cloud cover
        ZoneLimit::OptimisticInner => (0.46, SELSIS_INNER),
        ZoneLimit::OptimisticOuter => (2.40, SELSIS_OUTER),
        ZoneLimit::WaterFrost => (3.1, SELSIS_INNER),
        ZoneLimit::Rock => (0.281, SELSIS_OUTER),
    }
}

/// Effective flux, in solar constants, at which a star of `temperature` meets `limit`.
/// Frost and rock lines always use the Selsis form.
pub fn effective_flux(model: InsolationModel, limit: ZoneLimit, temperature: f64) -> f64 {
    match (model, kopparapu_coefficients(limit)) {
        (InsolationModel::Kopparapu, Some([s0, a, b, c, d])) => {
            let t = temperature - 5780.0;
            s0 + a * t + b * t.powi(2) + c * t.powi(3) + d * t.powi(4)
        }
        _ => {
            let (sl, (a, b)) = selsis_coefficients(limit);
            let t = temperature - 5700.0;
            (sl - a * t - b * t * t).powi(-2)
        }
    }
}

/// Luminosity weighted by the threshold flux, in square meters.
pub fn weighted_luminosity(model: InsolationModel, limit: ZoneLimit, luminosity: f64, temperature: f64) -> f64 {
    to_solar_luminosities(luminosity) / effective_flux(model, limit, temperature) * ASTRONOMICAL_UNIT * ASTRONOMICAL_UNIT
}

/// Threshold distance around a single star.
#[inline(always)]
pub fn single_star_limit(swl: f64) -> f64 {
    swl.sqrt()
}

/// Largest spherical shell around one member that fits inside the isophote,
/// counting the companion's light.
pub fn stype_radiative_limit(swl: f64, companion_swl: f64, separation: f64, edge: Edge) -> f64 {
    let r = swl.sqrt();
    let gap = match edge {
        Edge::Inner => separation - r,
        Edge::Outer => separation + r,
    };
    r * (1.0 + companion_swl / (gap * gap))
}

/// Radiative limit around the barycenter of a close binary. Undefined when the
/// separation is comparable to the limit itself.
pub fn ptype_radiative_limit(primary_swl: f64, secondary_swl: f64, separation: f64, edge: Edge) -> f64 {
    let b = separation / 2.0;
    let total = (primary_swl + secondary_swl).sqrt();
    let plus = total + b;
    let minus = total - b;
    let (toward, away) = match edge {
        Edge::Inner => (plus / minus, minus / plus),
        Edge::Outer => (minus / plus, plus / minus),
    };
    (primary_swl * toward + secondary_swl * away - b * b).sqrt()
}

/// Orbit-averaged limit around one member of a wide binary, for a planet on the
/// forced eccentricity at the single-star distance. Only limits inside the
/// binary's periapsis are meaningful.
pub fn stype_average_limit(swl: f64, companion_swl: f64, separation: f64, binary_eccentricity: f64) -> f64 {
    let eb2 = binary_eccentricity * binary_eccentricity;
    let binary_mean = separation * (1.0 - eb2).powf(0.25);
    let planet_a = swl.sqrt();
    let ep = forced_eccentricity_wide(planet_a, separation, binary_eccentricity);
    if ep >= 1.0 {
        return f64::NAN;
    }
    let ep2 = ep * ep;
    let planet_mean = planet_a * (1.0 - ep2).powf(0.25);
    let limit = swl / (planet_mean * (1.0 - ep2).powf(0.25))
        + swl.sqrt() * companion_swl / (binary_mean * binary_mean - planet_mean * planet_mean);
    let periapsis = separation * (1.0 - binary_eccentricity);
    if limit > 0.0 && limit < periapsis { limit } else { f64::NAN }
}

/// Orbit-averaged limit around a close binary. Only limits outside the binary's
/// apoapsis are meaningful.
pub fn ptype_average_limit(
    primary_swl: f64,
    secondary_swl: f64,
    separation: f64,
    binary_eccentricity: f64,
    secondary_mass_ratio: f64,
) -> f64 {
    let total = primary_swl + secondary_swl;
    let (bright, faint, mu) = if primary_swl < secondary_swl {
        (secondary_swl, primary_swl, 1.0 - secondary_mass_ratio)
    } else {
        (primary_swl, secondary_swl, secondary_mass_ratio)
    };
    let binary_mean = separation * (1.0 - binary_eccentricity * binary_eccentricity).powf(0.25);
    let bright_offset = mu * binary_mean;
    let faint_offset = (1.0 - mu) * binary_mean;

    let planet_a = total.sqrt();
    let ep = forced_eccentricity_close(planet_a, separation, binary_eccentricity, mu);
    if ep >= 1.0 {
        return f64::NAN;
    }
    let planet_mean = planet_a * (1.0 - ep * ep).powf(0.25);
    let pm2 = planet_mean * planet_mean;
    let limit = (bright / (pm2 - bright_offset.powi(2)) + faint / (pm2 - faint_offset.powi(2))) * total.sqrt();
    let apoapsis = separation * (1.0 + binary_eccentricity);
    if limit > apoapsis { limit } else { f64::NAN }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::units::{au, to_au, SOLAR_LUMINOSITY};
    use approx::assert_relative_eq;
    use rstest::rstest;

    const SUN_T: f64 = 5780.0;

    #[rstest]
    #[case(ZoneLimit::ConservativeInner, 1.107)]
    #[case(ZoneLimit::ConservativeOuter, 0.356)]
    #[case(ZoneLimit::OptimisticInner, 1.776)]
    #[case(ZoneLimit::OptimisticOuter, 0.32)]
    fn test_kopparapu_at_solar_temperature(#[case] limit: ZoneLimit, #[case] seff: f64) {
        assert_relative_eq!(effective_flux(InsolationModel::Kopparapu, limit, SUN_T), seff);
        let d = to_au(single_star_limit(weighted_luminosity(
            InsolationModel::Kopparapu,
            limit,
            SOLAR_LUMINOSITY,
            SUN_T,
        )));
        assert_relative_eq!(d, (1.0 / seff).sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn test_earth_sits_inside_the_solar_zone() {
        let swl = |limit| weighted_luminosity(InsolationModel::Kopparapu, limit, SOLAR_LUMINOSITY, SUN_T);
        let inner = single_star_limit(swl(ZoneLimit::ConservativeInner));
        let outer = single_star_limit(swl(ZoneLimit::ConservativeOuter));
        assert!(inner < au(1.0) && au(1.0) < outer);
    }

    #[test]
    fn test_selsis_lines_at_reference_temperature() {
        let d = |limit| {
            to_au(single_star_limit(weighted_luminosity(InsolationModel::Selsis, limit, SOLAR_LUMINOSITY, 5700.0)))
        };
        assert_relative_eq!(d(ZoneLimit::WaterFrost), 3.1, max_relative = 1e-12);
        assert_relative_eq!(d(ZoneLimit::Rock), 0.281, max_relative = 1e-12);
        assert_relative_eq!(d(ZoneLimit::ConservativeInner), 0.84, max_relative = 1e-12);
        // Frost and rock lines ignore the configured model.
        let kopparapu = effective_flux(InsolationModel::Kopparapu, ZoneLimit::WaterFrost, 5700.0);
        assert_relative_eq!(kopparapu, 3.1f64.powi(-2));
    }

    #[test]
    fn test_faint_companion_barely_moves_stype_limits() {
        let swl = au(1.0).powi(2);
        let inner = stype_radiative_limit(swl, 1e-6 * swl, au(50.0), Edge::Inner);
        assert_relative_eq!(inner, au(1.0), max_relative = 1e-6);
        let bright = stype_radiative_limit(swl, swl, au(5.0), Edge::Inner);
        assert!(bright > inner);
    }

    #[test]
    fn test_ptype_radiative_limit_converges_to_single_star() {
        let swl = au(1.0).powi(2);
        let inner = ptype_radiative_limit(swl / 2.0, swl / 2.0, au(1e-4), Edge::Inner);
        assert_relative_eq!(inner, au(1.0), max_relative = 1e-4);
        // Separation comparable to the limit has no solution.
        assert!(ptype_radiative_limit(swl / 2.0, swl / 2.0, au(4.0), Edge::Outer).is_nan());
    }

    #[test]
    fn test_average_limits_respect_binary_extent() {
        let swl = au(1.0).powi(2);
        let wide = stype_average_limit(swl, 0.5 * swl, au(20.0), 0.3);
        assert!(wide > au(1.0) && wide < au(14.0), "wide = {}", to_au(wide));
        // A companion inside the line leaves no valid S-type limit.
        assert!(stype_average_limit(swl, 0.5 * swl, au(1.2), 0.3).is_nan());

        let close = ptype_average_limit(swl, 0.25 * swl, au(0.1), 0.1, 0.3);
        assert!(close > au(1.0), "close = {}", to_au(close));
        assert!(ptype_average_limit(swl, 0.25 * swl, au(5.0), 0.1, 0.3).is_nan());
    }
}
