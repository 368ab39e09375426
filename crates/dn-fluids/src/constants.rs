//! Immutable physical constants shared by every solver call.

use dn_core::units::{Density, Length, SpecificHeat, jpkgk, kgpm3, m};
use serde::{Deserialize, Serialize};

use crate::error::{FluidError, FluidResult};

/// Fluid, pipe material and burial properties. Fields are plain SI values;
/// the accessor methods return `uom` quantities for API boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Water density at 60 °C.
    pub rho_kg_m3: f64,
    pub cp_j_kgk: f64,
    /// Absolute pipe wall roughness.
    pub roughness_m: f64,
    /// Burial depth of the pipe axis.
    pub network_depth_m: f64,
    pub conductivity_pipe_w_mk: f64,
    pub conductivity_insulation_w_mk: f64,
    pub conductivity_ground_w_mk: f64,
    /// Fractional markup on conduction for valves and fittings.
    pub fitting_markup: f64,
    /// Convective resistance used when the film coefficient vanishes [m·K/W].
    pub zero_flow_convective_resistance: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            rho_kg_m3: 983.21,
            cp_j_kgk: 4185.0,
            roughness_m: 0.02e-3,
            network_depth_m: 1.0,
            conductivity_pipe_w_mk: 76.0,
            conductivity_insulation_w_mk: 0.023,
            conductivity_ground_w_mk: 1.6,
            fitting_markup: 0.2,
            zero_flow_convective_resistance: 0.2,
        }
    }
}

impl PhysicalConstants {
    pub fn density(&self) -> Density {
        kgpm3(self.rho_kg_m3)
    }

    pub fn specific_heat(&self) -> SpecificHeat {
        jpkgk(self.cp_j_kgk)
    }

    pub fn depth(&self) -> Length {
        m(self.network_depth_m)
    }

    /// Every property must be finite and positive; roughness and markup may be zero.
    pub fn validate(&self) -> FluidResult<()> {
        let positive = [
            ("density", self.rho_kg_m3),
            ("specific heat", self.cp_j_kgk),
            ("network depth", self.network_depth_m),
            ("pipe conductivity", self.conductivity_pipe_w_mk),
            ("insulation conductivity", self.conductivity_insulation_w_mk),
            ("ground conductivity", self.conductivity_ground_w_mk),
            (
                "zero-flow convective resistance",
                self.zero_flow_convective_resistance,
            ),
        ];
        for (what, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(FluidError::NonPhysical { what, value });
            }
        }
        for (what, value) in [
            ("roughness", self.roughness_m),
            ("fitting markup", self.fitting_markup),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FluidError::NonPhysical { what, value });
            }
        }
        Ok(())
    }
}
