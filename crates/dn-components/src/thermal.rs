//! Heat conduction from a buried pre-insulated pipe to the ground.
//!
//! The aggregated coefficient `K` [W/K] combines four series resistances per
//! metre of pipe: steel wall, insulation, soil and the internal water film.

use std::f64::consts::PI;

use dn_fluids::{PhysicalConstants, water};
use tracing::debug;

use crate::catalog::PipeRecord;
use crate::common::{EPSILON_MDOT, NetworkKind};
use crate::error::{ComponentError, ComponentResult};
use crate::hydraulics::{darcy_friction, reynolds};

/// Nusselt number for internal pipe flow.
///
/// Laminar flow uses the constant-wall-temperature value, the transition
/// band Gnielinski, and fully turbulent flow Dittus-Boelter with the
/// exponent of the heated (0.3) or cooled (0.4) fluid.
pub fn nusselt(re: f64, pr: f64, darcy: f64, kind: NetworkKind) -> f64 {
    if re <= 1.0 {
        0.0
    } else if re <= 2300.0 {
        3.66
    } else if re <= 10_000.0 {
        let f8 = darcy / 8.0;
        f8 * (re - 1000.0) * pr / (1.0 + 12.7 * f8.sqrt() * (pr.powf(0.67) - 1.0))
    } else {
        let n = match kind {
            NetworkKind::Heating => 0.3,
            NetworkKind::Cooling => 0.4,
        };
        0.023 * re.powf(0.8) * pr.powf(n)
    }
}

/// Wall, insulation and soil resistances per metre [m·K/W]. Flow independent.
pub fn static_resistance(record: &PipeRecord, consts: &PhysicalConstants) -> ComponentResult<f64> {
    let r_pipe = (record.d_ext_m / record.d_int_m).ln() / (2.0 * PI * consts.conductivity_pipe_w_mk);
    let r_ins =
        (record.d_ins_m / record.d_ext_m).ln() / (2.0 * PI * consts.conductivity_insulation_w_mk);

    let a = 2.0 * consts.network_depth_m / record.d_ins_m;
    if a <= 1.0 {
        return Err(ComponentError::NonPhysical {
            what: "pipe casing reaches the ground surface",
        });
    }
    let r_ground = (a + (a * a - 1.0).sqrt()).ln() / (2.0 * PI * consts.conductivity_ground_w_mk);

    Ok(r_pipe + r_ins + r_ground)
}

/// Internal film resistance per metre [m·K/W].
pub fn convective_resistance(
    mass_flow: f64,
    record: &PipeRecord,
    t_k: Option<f64>,
    kind: NetworkKind,
    consts: &PhysicalConstants,
) -> f64 {
    let re = reynolds(mass_flow, record.d_int_m, t_k, consts);
    let alpha = match t_k {
        Some(t) if re > 1.0 => {
            let pr = water::prandtl(t, consts);
            let f = darcy_friction(record.d_int_m, re, consts.roughness_m);
            water::thermal_conductivity(t) * nusselt(re, pr, f, kind) / record.d_int_m
        }
        _ => 0.0,
    };
    if alpha > 0.0 && alpha.is_finite() {
        1.0 / (alpha * PI * record.d_int_m)
    } else {
        consts.zero_flow_convective_resistance
    }
}

/// Aggregated conduction coefficient `K = L·(1 + markup)/ΣR` [W/K].
pub fn heat_transfer_coefficient(
    length_m: f64,
    mass_flow: f64,
    record: &PipeRecord,
    t_k: Option<f64>,
    kind: NetworkKind,
    consts: &PhysicalConstants,
) -> ComponentResult<f64> {
    let r_total =
        static_resistance(record, consts)? + convective_resistance(mass_flow, record, t_k, kind, consts);
    Ok(length_m * (1.0 + consts.fitting_markup) / r_total)
}

/// Steady-state outlet temperature of a pipe losing heat to the ground.
///
/// Solves the energy balance with the mean of inlet and outlet as the pipe
/// temperature. Returns `None` without flow. When the closed form would
/// overshoot (`K/2 > m·cp`), the drop is limited to `max_drop_k` towards the
/// ground.
pub fn pipe_outlet_temperature(
    t_in: f64,
    mass_flow: f64,
    k_w_per_k: f64,
    t_ground: f64,
    cp: f64,
    max_drop_k: f64,
) -> Option<f64> {
    if mass_flow.abs() <= EPSILON_MDOT {
        return None;
    }
    let mcp = mass_flow.abs() * cp;
    let t_out = (t_in * (k_w_per_k / 2.0 - mcp) - k_w_per_k * t_ground) / (-mcp - k_w_per_k / 2.0);

    if (t_in - t_out).abs() > max_drop_k && k_w_per_k / 2.0 - mcp > 0.0 {
        let towards_ground = (t_in - t_ground).signum();
        let drop = max_drop_k.min((t_in - t_ground).abs());
        debug!(t_in, t_out, drop, "pipe outlet temperature limited");
        return Some(t_in - towards_ground * drop);
    }
    Some(t_out)
}

/// Heat lost along a pipe [W], zero when the outlet is undefined.
pub fn heat_loss(mass_flow: f64, t_in: Option<f64>, t_out: Option<f64>, cp: f64) -> f64 {
    match (t_in, t_out) {
        (Some(a), Some(b)) => mass_flow.abs() * cp * (a - b),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PipeCatalog;

    fn dn80() -> PipeRecord {
        PipeCatalog::standard().by_dn("DN80").unwrap().clone()
    }

    #[test]
    fn nusselt_regimes() {
        assert_eq!(nusselt(0.5, 3.0, 0.0, NetworkKind::Heating), 0.0);
        assert_eq!(nusselt(1500.0, 3.0, 0.04, NetworkKind::Heating), 3.66);
        let gn = nusselt(8000.0, 3.0, 0.033, NetworkKind::Heating);
        assert!(gn > 30.0 && gn < 80.0, "Nu = {gn}");
        let heat = nusselt(1e5, 3.0, 0.018, NetworkKind::Heating);
        let cool = nusselt(1e5, 3.0, 0.018, NetworkKind::Cooling);
        assert!(cool > heat);
    }

    #[test]
    fn zero_flow_uses_fallback_film() {
        let c = PhysicalConstants::default();
        let r = convective_resistance(0.0, &dn80(), Some(333.0), NetworkKind::Heating, &c);
        assert_eq!(r, c.zero_flow_convective_resistance);
    }

    #[test]
    fn coefficient_scales_with_length() {
        let c = PhysicalConstants::default();
        let k1 = heat_transfer_coefficient(50.0, 3.0, &dn80(), Some(350.0), NetworkKind::Heating, &c)
            .unwrap();
        let k2 =
            heat_transfer_coefficient(100.0, 3.0, &dn80(), Some(350.0), NetworkKind::Heating, &c)
                .unwrap();
        assert!((k2 / k1 - 2.0).abs() < 1e-12);
        // well insulated: well below 1 W/(m K)
        assert!(k2 / 100.0 < 1.0);
    }

    #[test]
    fn shallow_casing_rejected() {
        let c = PhysicalConstants {
            network_depth_m: 0.1,
            ..Default::default()
        };
        assert!(static_resistance(&dn80(), &c).is_err());
    }

    #[test]
    fn outlet_sits_between_inlet_and_ground() {
        let t = pipe_outlet_temperature(353.0, 2.0, 40.0, 283.0, 4185.0, 30.0).unwrap();
        assert!(t < 353.0 && t > 283.0);
        // no conduction, no change
        assert_eq!(pipe_outlet_temperature(353.0, 2.0, 0.0, 283.0, 4185.0, 30.0), Some(353.0));
        assert_eq!(pipe_outlet_temperature(353.0, 0.0, 40.0, 283.0, 4185.0, 30.0), None);
    }

    #[test]
    fn overshoot_is_limited() {
        // K/2 far above m·cp
        let t = pipe_outlet_temperature(353.0, 0.001, 500.0, 283.0, 4185.0, 30.0).unwrap();
        assert_eq!(t, 323.0);
        // cooling pipe warms towards the ground
        let t = pipe_outlet_temperature(280.0, 0.001, 500.0, 330.0, 4185.0, 30.0).unwrap();
        assert_eq!(t, 310.0);
    }

    #[test]
    fn loss_sign_follows_drop() {
        assert!(heat_loss(2.0, Some(353.0), Some(352.0), 4185.0) > 0.0);
        assert_eq!(heat_loss(2.0, Some(353.0), None, 4185.0), 0.0);
    }
}
