//! Core traits for building-side models.

use crate::error::ComponentResult;
use crate::substation::{BuildingLoad, HexSpec};

/// Network-side state of a substation for one supply temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubstationOutput {
    /// Temperature returned to the network; `None` when the substation draws nothing.
    pub return_temperature_k: Option<f64>,
    pub mass_flow_kgps: f64,
}

impl SubstationOutput {
    pub const IDLE: Self = Self {
        return_temperature_k: None,
        mass_flow_kgps: 0.0,
    };
}

/// Heat exchanger between the network and one building.
///
/// Implementations are deterministic and shared read-only across timestep tasks.
pub trait SubstationModel: Send + Sync {
    /// Model name for logs.
    fn name(&self) -> &str;

    /// Required mass flow and return temperature at the given network supply temperature.
    fn solve(
        &self,
        supply_temperature_k: f64,
        load: &BuildingLoad,
        hex: &HexSpec,
    ) -> ComponentResult<SubstationOutput>;
}
