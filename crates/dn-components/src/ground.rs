//! Undisturbed ground temperature at pipe depth.

use std::f64::consts::PI;

use crate::error::{ComponentError, ComponentResult};

/// Thermal diffusivity of moist soil [m²/day].
pub const SOIL_DIFFUSIVITY_M2_PER_DAY: f64 = 0.0372;

const DAYS_PER_YEAR: f64 = 365.0;

/// Hourly ground temperature [K] from hourly ambient air temperature [K] (Kusuda model).
///
/// The annual mean, amplitude and phase come from the daily means of the
/// ambient series; depth damps the amplitude and delays the phase.
pub fn kusuda_ground_temperature(ambient_k: &[f64], depth_m: f64) -> ComponentResult<Vec<f64>> {
    if ambient_k.is_empty() {
        return Err(ComponentError::InvalidArg {
            what: "empty ambient temperature series",
        });
    }
    if !(depth_m >= 0.0) {
        return Err(ComponentError::InvalidArg { what: "burial depth" });
    }

    let daily: Vec<f64> = ambient_k
        .chunks(24)
        .map(|day| day.iter().sum::<f64>() / day.len() as f64)
        .collect();
    let t_mean = ambient_k.iter().sum::<f64>() / ambient_k.len() as f64;
    let (coldest_day, t_min) = daily
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::INFINITY), |acc, (i, t)| if t < acc.1 { (i, t) } else { acc });
    let t_max = daily.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let amplitude = (t_max - t_min) / 2.0;

    let damping = depth_m * (PI / (DAYS_PER_YEAR * SOIL_DIFFUSIVITY_M2_PER_DAY)).sqrt();
    let lag_days = damping * DAYS_PER_YEAR / (2.0 * PI);

    Ok((0..ambient_k.len())
        .map(|hour| {
            let day = hour as f64 / 24.0;
            let phase = 2.0 * PI / DAYS_PER_YEAR * (day - coldest_day as f64 - lag_days);
            t_mean - amplitude * (-damping).exp() * phase.cos()
        })
        .collect())
}
