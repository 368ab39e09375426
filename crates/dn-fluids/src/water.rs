//! Liquid water correlations, temperatures in kelvin.

use crate::constants::PhysicalConstants;
use crate::error::{FluidError, FluidResult};

/// Range over which the correlations stay physical.
pub const MIN_TEMPERATURE_K: f64 = 273.15;
pub const MAX_TEMPERATURE_K: f64 = 423.15;

/// Kinematic viscosity [m²/s].
pub fn kinematic_viscosity(t_k: f64) -> f64 {
    2.652_623e-8 * (557.544_7 / (t_k - 140.0)).exp()
}

/// Thermal conductivity [W/(m·K)].
pub fn thermal_conductivity(t_k: f64) -> f64 {
    let r = t_k / 298.15;
    0.6065 * (-1.484_45 + 4.122_92 * r - 1.638_66 * r * r)
}

/// Prandtl number `ν·ρ·cp/λ`.
pub fn prandtl(t_k: f64, consts: &PhysicalConstants) -> f64 {
    kinematic_viscosity(t_k) * consts.rho_kg_m3 * consts.cp_j_kgk / thermal_conductivity(t_k)
}

/// Reject temperatures outside the liquid range.
pub fn check_temperature(t_k: f64) -> FluidResult<f64> {
    if !t_k.is_finite() || !(MIN_TEMPERATURE_K..=MAX_TEMPERATURE_K).contains(&t_k) {
        return Err(FluidError::OutOfRange {
            what: "water temperature",
            value: t_k,
        });
    }
    Ok(t_k)
}
