//! Closed-form physical relations used by the standard catalog.
//!
//! Inputs and outputs are in canonical SI units unless a parameter name says
//! otherwise. None of these functions check their domain: an out-of-range input
//! yields NaN or infinity, which the engine records as `Undefined`.

use crate::analysis::units::*;
use crate::store::Composition;
use std::f64::consts::PI;

// --- Stars ---

/// Main-sequence mass/luminosity relation, piecewise in solar masses.
pub fn main_sequence_luminosity(mass: f64) -> f64 {
    let m = to_solar_masses(mass);
    let l = if m > 55.0 && m <= 150.0 {
        32_000.0 * m
    } else if m > 2.0 {
        1.4 * m.powf(3.5)
    } else if m > 0.43 {
        m.powi(4)
    } else if m > 0.08 {
        0.23 * m.powf(2.3)
    } else {
        0.0
    };
    solar_luminosities(l)
}

/// Main-sequence radius. Below 1.45 solar masses a quadratic fit in mass is used;
/// above it the radius follows from the luminosity and a fitted surface temperature.
pub fn main_sequence_radius(mass: f64, luminosity: f64) -> f64 {
    let m = to_solar_masses(mass);
    if m < 1.45 {
        return (0.438_098 * m * m + 0.479_180 * m + 0.075_479) * SOLAR_RADIUS;
    }
    let lm = m.log10();
    let log_t = -0.170_026 * lm * lm + 0.888_037 * lm + 3.671_010;
    let t = 10f64.powf(log_t);
    (luminosity / (4.0 * PI * STEFAN_BOLTZMANN * t.powi(4))).sqrt()
}

/// Effective temperature from luminosity and radius, scaled from the Sun.
pub fn stellar_temperature(luminosity: f64, radius: f64) -> f64 {
    let l = to_solar_luminosities(luminosity);
    let r = radius / SOLAR_RADIUS;
    SOLAR_TEMPERATURE * (l / (r * r)).powf(0.25)
}

/// Main-sequence lifetime: ten billion years for the Sun, scaled by M/L.
pub fn stellar_lifetime(mass: f64, luminosity: f64) -> f64 {
    gigayears(10.0 * to_solar_masses(mass) / to_solar_luminosities(luminosity))
}

#[inline(always)]
pub fn peak_wavelength(temperature: f64) -> f64 {
    WIEN_DISPLACEMENT / temperature
}

// --- Planets ---

/// Mass/radius relation for a solid or gaseous planet of the given composition.
pub fn planetary_radius(mass: f64, composition: Composition) -> f64 {
    let (m1, r1, k3) = composition.radius_model();
    let ratio = to_earth_masses(mass) / m1;
    let log_r = -0.209_45 + ratio.log10() / 3.0 - 0.0804 * ratio.powf(k3);
    10f64.powf(log_r) * r1 * EARTH_RADIUS
}

struct HotGiantClass {
    upper_mass_limit: f64,
    a: f64,
    log10_threshold: f64,
}

const HOT_GIANT_CLASSES: [HotGiantClass; 4] = [
    HotGiantClass { upper_mass_limit: 0.37, a: -0.33, log10_threshold: 6.1 },
    HotGiantClass { upper_mass_limit: 0.98, a: 0.7, log10_threshold: 5.52 },
    HotGiantClass { upper_mass_limit: 2.5, a: 0.52, log10_threshold: 5.82 },
    HotGiantClass { upper_mass_limit: 15.0, a: 0.22, log10_threshold: 5.2 },
];

/// Radius multiplier of a strongly irradiated gas giant. Returns 1 for cold
/// giants and for masses outside the fitted classes.
pub fn hot_giant_inflation(mass: f64, insolation: f64) -> f64 {
    let mj = mass / JUPITER_MASS;
    let Some(class) = HOT_GIANT_CLASSES.iter().find(|c| mj < c.upper_mass_limit) else {
        return 1.0;
    };
    let log_flux = insolation.log10();
    if log_flux < class.log10_threshold {
        1.0
    } else {
        1.0 + class.a * (log_flux - class.log10_threshold)
    }
}

/// Equilibrium surface temperature from temperature-averaged insolation.
pub fn planetary_temperature(
    thermal_insolation: f64,
    albedo: f64,
    heat_distribution: f64,
    emissivity: f64,
    greenhouse: f64,
) -> f64 {
    let s = to_solar_flux(thermal_insolation);
    278.5 * ((1.0 - albedo) * s / (heat_distribution * emissivity * (1.0 - greenhouse))).powf(0.25)
}

/// Thermal emission plus reflected light.
pub fn planetary_luminosity(temperature: f64, surface_area: f64, albedo: f64, thermal_insolation: f64) -> f64 {
    STEFAN_BOLTZMANN * surface_area * temperature.powi(4) + albedo * thermal_insolation * surface_area / 4.0
}

/// Spin period from the solar-system mass/rotation trend.
pub fn planetary_rotation_period(mass: f64, radius: f64) -> f64 {
    let speed_kms = ((mass / JUPITER_MASS).ln() * 0.5 + 1.098_486_67).exp() * 4.25;
    2.0 * PI * radius / (speed_kms * 1e3)
}

/// Surface pressure of a rocky world scaled from Earth.
pub fn surface_pressure(mass: f64, radius: f64) -> f64 {
    let m = to_earth_masses(mass);
    let r = to_earth_radii(radius);
    m * m / r.powi(4) * STANDARD_ATMOSPHERE
}

/// Density estimate for a composition, taken from its radius model at the
/// composition's reference mass.
pub fn composition_density(composition: Composition) -> f64 {
    let mass = earth_masses(composition.reference_mass());
    let radius = planetary_radius(mass, composition);
    mass / sphere_volume(radius)
}

// --- Geometry ---

#[inline(always)]
pub fn sphere_volume(radius: f64) -> f64 {
    4.0 / 3.0 * PI * radius.powi(3)
}

#[inline(always)]
pub fn sphere_area(radius: f64) -> f64 {
    4.0 * PI * radius * radius
}

pub fn surface_gravity(mass: f64, radius: f64) -> f64 {
    GRAVITATIONAL_CONSTANT * mass / (radius * radius)
}

pub fn escape_velocity(mass: f64, radius: f64) -> f64 {
    (2.0 * GRAVITATIONAL_CONSTANT * mass / radius).sqrt()
}

/// Apparent angular diameter of a sphere of `radius` seen from `distance`.
pub fn angular_diameter(radius: f64, distance: f64) -> f64 {
    2.0 * (radius / distance).asin()
}

// --- Orbits ---

/// Kepler's third law for two bodies.
pub fn orbital_period(semi_major_axis: f64, parent_mass: f64, own_mass: f64) -> f64 {
    2.0 * PI * (semi_major_axis.powi(3) / (GRAVITATIONAL_CONSTANT * (parent_mass + own_mass))).sqrt()
}

pub fn synodic_period(spin_period: f64, orbital_period: f64) -> f64 {
    (1.0 / (1.0 / spin_period - 1.0 / orbital_period)).abs()
}

/// Distance of one binary member from the barycenter.
pub fn barycentric_distance(separation: f64, own_mass: f64, partner_mass: f64) -> f64 {
    separation * partner_mass / (own_mass + partner_mass)
}

/// Distance correction for orbit-averaged flux.
#[inline(always)]
pub fn flux_distance_factor(eccentricity: f64) -> f64 {
    (1.0 - eccentricity * eccentricity).powf(0.25)
}

/// Distance correction for orbit-averaged equilibrium temperature.
#[inline(always)]
pub fn thermal_distance_factor(eccentricity: f64) -> f64 {
    let e2 = eccentricity * eccentricity;
    1.0 + 0.125 * e2 + 21.0 / 512.0 * e2 * e2
}

#[inline(always)]
pub fn flux_at(luminosity: f64, distance: f64) -> f64 {
    luminosity / (4.0 * PI * distance * distance)
}

/// Orbit-averaged incident flux.
pub fn incident_flux(luminosity: f64, semi_major_axis: f64, eccentricity: f64) -> f64 {
    flux_at(luminosity, semi_major_axis * flux_distance_factor(eccentricity))
}

/// Temperature-averaged incident flux.
pub fn thermal_incident_flux(luminosity: f64, semi_major_axis: f64, eccentricity: f64) -> f64 {
    flux_at(luminosity, semi_major_axis * thermal_distance_factor(eccentricity))
}

/// Flux received from the far member of a wide binary by a planet orbiting the near one.
pub fn companion_incident_flux(
    companion_luminosity: f64,
    semi_major_axis: f64,
    eccentricity: f64,
    separation: f64,
    binary_eccentricity: f64,
) -> f64 {
    let orbit = semi_major_axis * flux_distance_factor(eccentricity);
    let binary = separation * flux_distance_factor(binary_eccentricity);
    flux_at(companion_luminosity, (binary * binary - orbit * orbit).sqrt())
}

pub fn rough_inner_orbit_limit(mass: f64) -> f64 {
    au(0.1 * to_solar_masses(mass))
}

pub fn rough_outer_orbit_limit(mass: f64) -> f64 {
    au(40.0 * to_solar_masses(mass))
}

/// Roche limit of a fluid satellite against a parent of known radius.
pub fn roche_limit(parent_radius: f64, parent_density: f64, own_density: f64) -> f64 {
    2.44 * parent_radius * (parent_density / own_density).cbrt()
}

/// Roche limit against a parent with no surface, such as a barycenter.
pub fn roche_limit_by_mass(parent_mass: f64, own_mass: f64, own_radius: f64) -> f64 {
    2.44 * own_radius * (parent_mass / own_mass).cbrt()
}

/// Innermost orbit for bodies ten times less dense than the parent.
pub fn dense_roche_limit(radius: f64) -> f64 {
    2.44 * radius * 10f64.cbrt()
}

pub fn hill_sphere(semi_major_axis: f64, eccentricity: f64, own_mass: f64, parent_mass: f64) -> f64 {
    semi_major_axis * (1.0 - eccentricity) * (own_mass / (3.0 * parent_mass)).cbrt()
}

/// Eggleton approximation of the Roche lobe radius.
pub fn roche_lobe(own_mass: f64, companion_mass: f64, separation: f64) -> f64 {
    let q23 = (own_mass / companion_mass).powf(2.0 / 3.0);
    let q13 = (own_mass / companion_mass).cbrt();
    0.49 * q23 / (0.6 * q23 + (1.0 + q13).ln()) * separation
}

/// Distance within which a child is tidally locked to a parent of this mass and age.
pub fn tidal_locking_radius(mass: f64, age: f64, initial_spin_period: f64) -> f64 {
    let grams = mass * 1e3;
    let cm = 0.027 * (initial_spin_period * age / 100.0).powf(1.0 / 6.0) * grams.cbrt();
    cm / 100.0
}

/// Holman and Wiegert S-type stability limit around a binary member.
pub fn stype_critical_orbit(star_mass: f64, companion_mass: f64, separation: f64, eccentricity: f64) -> f64 {
    let mu = 1.0 - star_mass / (star_mass + companion_mass);
    let e = eccentricity;
    separation
        * (0.464 - 0.38 * mu - 0.631 * e + 0.586 * mu * e + 0.15 * e * e - 0.198 * mu * e * e)
}

/// Holman and Wiegert P-type stability limit around a binary.
pub fn ptype_critical_orbit(secondary_mass_ratio: f64, separation: f64, eccentricity: f64) -> f64 {
    let mu = fold_mass_ratio(secondary_mass_ratio);
    let e = eccentricity;
    separation
        * (1.6 + 5.1 * e - 2.22 * e * e + 4.12 * mu - 5.09 * mu * mu + 4.61 * e * e * mu * mu
            - 4.27 * e * mu)
}

/// Forced eccentricity of an S-type planet perturbed by the far companion.
pub fn forced_eccentricity_wide(semi_major_axis: f64, separation: f64, binary_eccentricity: f64) -> f64 {
    let eb2 = binary_eccentricity * binary_eccentricity;
    1.25 * semi_major_axis / separation * eb2 / (1.0 - eb2)
}

/// Forced eccentricity of a P-type planet perturbed by the inner binary.
pub fn forced_eccentricity_close(
    semi_major_axis: f64,
    separation: f64,
    binary_eccentricity: f64,
    secondary_mass_ratio: f64,
) -> f64 {
    let mu = fold_mass_ratio(secondary_mass_ratio);
    let e = binary_eccentricity;
    1.25 * separation / semi_major_axis * (1.0 - 2.0 * mu) * (4.0 * e + 3.0 * e.powi(3))
        / (4.0 + 6.0 * e * e)
}

/// Prograde satellite orbit limit as a fraction of the Hill sphere.
pub fn prograde_orbit_factor(parent_eccentricity: f64, eccentricity: f64) -> f64 {
    0.4895 * (1.0 - 1.0305 * parent_eccentricity - 0.2738 * eccentricity)
}

#[inline(always)]
fn fold_mass_ratio(mu: f64) -> f64 {
    if mu > 0.5 { 1.0 - mu } else { mu }
}

// --- Internal heating ---

/// Tidal dissipation per unit surface area (Jackson et al. 2008). The
/// expression is already a flux.
pub fn tidal_heating(
    parent_mass: f64,
    semi_major_axis: f64,
    eccentricity: f64,
    radius: f64,
    quality_factor: f64,
) -> f64 {
    63.0 / (16.0 * PI)
        * GRAVITATIONAL_CONSTANT.powf(1.5)
        * parent_mass.powf(2.5)
        * radius.powi(3)
        * eccentricity * eccentricity
        / quality_factor
        / semi_major_axis.powf(7.5)
}

/// Height of the equilibrium tide raised on a fluid layer of the target by a
/// companion at `distance`.
pub fn tide_height(companion_mass: f64, target_mass: f64, target_radius: f64, distance: f64) -> f64 {
    3.0 * target_radius.powi(4) / distance.powi(3) * companion_mass / target_mass
}

/// Residual heat of formation of a rocky planet per unit surface area.
pub fn primordial_heating(age: f64, mass: f64, surface_area: f64) -> f64 {
    (-0.3391 * to_gigayears(age)).exp() * 1.2e-11 * mass / surface_area
}

struct Isotope {
    /// Heat production, W/kg.
    production: f64,
    /// Present-day mass fraction in the bulk silicate Earth.
    abundance: f64,
    half_life_gyr: f64,
}

const ISOTOPES: [Isotope; 4] = [
    Isotope { production: 2.92e-5, abundance: 4.64e-7, half_life_gyr: 1.25 },
    Isotope { production: 2.64e-5, abundance: 1.55e-7, half_life_gyr: 14.0 },
    Isotope { production: 5.69e-4, abundance: 1.64e-8, half_life_gyr: 0.704 },
    Isotope { production: 9.46e-5, abundance: 6.24e-8, half_life_gyr: 4.47 },
];

/// Decay heat of K40, Th232, U235 and U238 in the mantle, per unit surface area.
pub fn radiogenic_heating(age: f64, mass: f64, surface_area: f64, mantle_fraction: f64) -> f64 {
    let t = to_gigayears(age);
    let specific: f64 = ISOTOPES
        .iter()
        .map(|i| i.production * i.abundance * (-t / (i.half_life_gyr / std::f64::consts::LN_2)).exp())
        .sum();
    specific * mass * mantle_fraction / surface_area
}
