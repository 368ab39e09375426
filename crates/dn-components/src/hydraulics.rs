//! Darcy-Weisbach pipe hydraulics. Mass flow in kg/s, lengths in m, pressures in Pa.

use std::f64::consts::PI;

use dn_fluids::{PhysicalConstants, water};

/// Reynolds number `4|m|/ρ / (π·ν·D)`. An undefined temperature means no flow regime.
pub fn reynolds(mass_flow: f64, d_int: f64, t_k: Option<f64>, consts: &PhysicalConstants) -> f64 {
    let Some(t) = t_k else {
        return 0.0;
    };
    let nu = water::kinematic_viscosity(t);
    let re = 4.0 * (mass_flow.abs() / consts.rho_kg_m3) / (PI * nu * d_int);
    if re.is_finite() { re } else { 0.0 }
}

/// Darcy friction factor, piecewise over the flow regimes.
///
/// - laminar (Re ≤ 2300): 64/Re
/// - transition (Re ≤ 5000): Blasius
/// - turbulent: Swamee-Jain
pub fn darcy_friction(d_int: f64, re: f64, roughness: f64) -> f64 {
    if re <= 1.0 {
        0.0
    } else if re <= 2300.0 {
        64.0 / re
    } else if re <= 5000.0 {
        0.316 * re.powf(-0.25)
    } else {
        let ln = (roughness / (3.7 * d_int) + 5.74 / re.powf(0.9)).ln();
        1.325 / (ln * ln)
    }
}

/// Magnitude of the pressure loss `f·8·m²·L/(π²·D⁵·ρ)`.
pub fn pressure_loss(mass_flow: f64, d_int: f64, length: f64, darcy: f64, rho: f64) -> f64 {
    darcy * 8.0 * mass_flow * mass_flow * length / (PI * PI * d_int.powi(5) * rho)
}

/// Pressure loss carrying the sign of the flow.
pub fn signed_pressure_loss(mass_flow: f64, d_int: f64, length: f64, darcy: f64, rho: f64) -> f64 {
    pressure_loss(mass_flow, d_int, length, darcy, rho) * mass_flow.signum()
}

/// Magnitude of `d(Δp)/dm = f·16·m·L/(π²·D⁵·ρ)`.
pub fn pressure_loss_derivative(
    mass_flow: f64,
    d_int: f64,
    length: f64,
    darcy: f64,
    rho: f64,
) -> f64 {
    (darcy * 16.0 * mass_flow * length / (PI * PI * d_int.powi(5) * rho)).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn friction_regimes() {
        assert_eq!(darcy_friction(0.1, 0.5, 2e-5), 0.0);
        assert!((darcy_friction(0.1, 1000.0, 2e-5) - 0.064).abs() < 1e-12);
        assert!((darcy_friction(0.1, 4000.0, 2e-5) - 0.316 / 4000f64.powf(0.25)).abs() < 1e-12);
        let f = darcy_friction(0.1, 1e5, 2e-5);
        assert!(f > 0.015 && f < 0.025, "f = {f}");
    }

    #[test]
    fn undefined_temperature_has_no_regime() {
        let c = PhysicalConstants::default();
        assert_eq!(reynolds(5.0, 0.1, None, &c), 0.0);
        assert!(reynolds(5.0, 0.1, Some(333.15), &c) > 1e5);
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let (d, l, f, rho) = (0.08, 120.0, 0.02, 983.21);
        let m = 4.0;
        let h = 1e-6;
        let fd = (pressure_loss(m + h, d, l, f, rho) - pressure_loss(m - h, d, l, f, rho)) / (2.0 * h);
        let analytic = pressure_loss_derivative(m, d, l, f, rho);
        assert!((fd - analytic).abs() / analytic < 1e-6);
    }

    proptest! {
        #[test]
        fn loss_is_odd_in_flow(m in -50.0f64..50.0) {
            let a = signed_pressure_loss(m, 0.1, 100.0, 0.02, 983.21);
            let b = signed_pressure_loss(-m, 0.1, 100.0, 0.02, 983.21);
            prop_assert!((a + b).abs() < 1e-9 * a.abs().max(1.0));
        }

        #[test]
        fn turbulent_friction_falls_with_reynolds(re in 6000.0f64..1e7) {
            prop_assert!(darcy_friction(0.1, re * 1.5, 2e-5) < darcy_friction(0.1, re, 2e-5));
        }
    }
}
