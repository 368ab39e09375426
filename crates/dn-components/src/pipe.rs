//! Pipe segment: a length with an assigned catalog record.

use dn_core::units::{Length, MassRate, Pressure, Temperature, pa};
use dn_fluids::PhysicalConstants;
use uom::si::mass_rate::kilogram_per_second;
use uom::si::thermodynamic_temperature::kelvin;

use crate::catalog::PipeRecord;
use crate::common::NetworkKind;
use crate::error::ComponentResult;
use crate::hydraulics;
use crate::thermal;

/// Buried pipe with the hydraulic and thermal behaviour of its catalog record.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub length_m: f64,
    pub record: PipeRecord,
}

impl Pipe {
    pub fn new(length_m: f64, record: PipeRecord) -> Self {
        Self { length_m, record }
    }

    pub fn length(&self) -> Length {
        dn_core::units::m(self.length_m)
    }

    pub fn d_int(&self) -> f64 {
        self.record.d_int_m
    }

    pub fn friction_factor(&self, mass_flow: f64, t_k: Option<f64>, consts: &PhysicalConstants) -> f64 {
        let re = hydraulics::reynolds(mass_flow, self.d_int(), t_k, consts);
        hydraulics::darcy_friction(self.d_int(), re, consts.roughness_m)
    }

    /// Unsigned Darcy-Weisbach loss [Pa].
    pub fn pressure_loss(&self, mass_flow: f64, t_k: Option<f64>, consts: &PhysicalConstants) -> f64 {
        let f = self.friction_factor(mass_flow, t_k, consts);
        hydraulics::pressure_loss(mass_flow, self.d_int(), self.length_m, f, consts.rho_kg_m3)
    }

    /// Signed loss for a flow in either direction.
    pub fn pressure_drop(
        &self,
        mdot: MassRate,
        temperature: Option<Temperature>,
        consts: &PhysicalConstants,
    ) -> Pressure {
        let m = mdot.get::<kilogram_per_second>();
        let t = temperature.map(|t| t.get::<kelvin>());
        pa(self.pressure_loss(m, t, consts) * m.signum())
    }

    /// Signed loss and its flow derivative, as used by loop correction.
    pub fn loss_and_slope(
        &self,
        mass_flow: f64,
        t_k: Option<f64>,
        consts: &PhysicalConstants,
    ) -> (f64, f64) {
        let f = self.friction_factor(mass_flow, t_k, consts);
        let rho = consts.rho_kg_m3;
        (
            hydraulics::signed_pressure_loss(mass_flow, self.d_int(), self.length_m, f, rho),
            hydraulics::pressure_loss_derivative(mass_flow, self.d_int(), self.length_m, f, rho),
        )
    }

    /// Aggregated heat-transfer coefficient to the ground [W/K].
    pub fn conduction_coefficient(
        &self,
        mass_flow: f64,
        t_k: Option<f64>,
        kind: NetworkKind,
        consts: &PhysicalConstants,
    ) -> ComponentResult<f64> {
        thermal::heat_transfer_coefficient(self.length_m, mass_flow, &self.record, t_k, kind, consts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PipeCatalog;
    use dn_core::units::{k, kgps};
    use uom::si::length::meter;
    use uom::si::pressure::pascal;

    fn dn100(length_m: f64) -> Pipe {
        Pipe::new(length_m, PipeCatalog::standard().by_dn("DN100").cloned().unwrap())
    }

    #[test]
    fn quantities_at_the_boundary() {
        let pipe = dn100(250.0);
        assert_eq!(pipe.length().get::<meter>(), 250.0);
        assert!((pipe.record.inner_diameter().get::<meter>() - 0.1071).abs() < 1e-12);

        let consts = PhysicalConstants::default();
        let forward = pipe.pressure_drop(kgps(4.0), Some(k(340.0)), &consts);
        let plain = pipe.pressure_loss(4.0, Some(340.0), &consts);
        assert!((forward.get::<pascal>() - plain).abs() < 1e-9);

        let backward = pipe.pressure_drop(kgps(-4.0), Some(k(340.0)), &consts);
        assert!((backward + forward).get::<pascal>().abs() < 1e-9);
    }

    #[test]
    fn undefined_temperature_has_no_loss() {
        let pipe = dn100(100.0);
        let dp = pipe.pressure_drop(kgps(3.0), None, &PhysicalConstants::default());
        assert_eq!(dp.get::<pascal>(), 0.0);
    }
}
