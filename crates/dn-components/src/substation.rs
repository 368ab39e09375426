//! Reference substation with a fixed secondary temperature spread.

use serde::{Deserialize, Serialize};

use crate::common::{NetworkKind, check_finite};
use crate::error::ComponentResult;
use crate::traits::{SubstationModel, SubstationOutput};

/// Building demand for one hour.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildingLoad {
    /// Heat (heating) or cold (cooling) delivered to the building [W], non-negative.
    pub load_w: f64,
    /// Supply temperature the building needs; `None` when the building is off.
    pub target_supply_k: Option<f64>,
}

impl BuildingLoad {
    pub fn is_active(&self) -> bool {
        self.load_w > 0.0 && self.target_supply_k.is_some()
    }
}

/// Heat exchanger design parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexSpec {
    /// Secondary-side spread between supply and return at design.
    pub design_delta_t_k: f64,
    /// Primary return sits this far from the secondary return.
    pub approach_k: f64,
    /// Floor on the primary spread.
    pub min_delta_t_k: f64,
}

impl Default for HexSpec {
    fn default() -> Self {
        Self {
            design_delta_t_k: 20.0,
            approach_k: 3.0,
            min_delta_t_k: 1.0,
        }
    }
}

/// Return temperature pinned to the secondary design return plus the approach;
/// mass flow follows from the energy balance.
#[derive(Debug, Clone)]
pub struct DeltaTSubstation {
    kind: NetworkKind,
    cp_j_kgk: f64,
}

impl DeltaTSubstation {
    pub fn new(kind: NetworkKind, cp_j_kgk: f64) -> Self {
        Self { kind, cp_j_kgk }
    }
}

impl SubstationModel for DeltaTSubstation {
    fn name(&self) -> &str {
        "delta-t"
    }

    fn solve(
        &self,
        supply_temperature_k: f64,
        load: &BuildingLoad,
        hex: &HexSpec,
    ) -> ComponentResult<SubstationOutput> {
        let Some(target) = load.target_supply_k else {
            return Ok(SubstationOutput::IDLE);
        };
        if load.load_w <= 0.0 {
            return Ok(SubstationOutput::IDLE);
        }
        check_finite(supply_temperature_k, "substation supply temperature")?;

        let (t_return, spread) = match self.kind {
            NetworkKind::Heating => {
                let t_ret = target - hex.design_delta_t_k + hex.approach_k;
                (t_ret, supply_temperature_k - t_ret)
            }
            NetworkKind::Cooling => {
                let t_ret = target + hex.design_delta_t_k - hex.approach_k;
                (t_ret, t_ret - supply_temperature_k)
            }
        };
        let spread = spread.max(hex.min_delta_t_k);
        let mass_flow = load.load_w / (self.cp_j_kgk * spread);
        check_finite(mass_flow, "substation mass flow")?;

        // a floored spread moves the return, not the flow
        let t_return = match self.kind {
            NetworkKind::Heating => t_return.min(supply_temperature_k - spread),
            NetworkKind::Cooling => t_return.max(supply_temperature_k + spread),
        };

        Ok(SubstationOutput {
            return_temperature_k: Some(t_return),
            mass_flow_kgps: mass_flow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CP: f64 = 4185.0;

    fn heating() -> DeltaTSubstation {
        DeltaTSubstation::new(NetworkKind::Heating, CP)
    }

    #[test]
    fn heating_energy_balance() {
        let load = BuildingLoad {
            load_w: 100_000.0,
            target_supply_k: Some(343.15),
        };
        let out = heating().solve(353.15, &load, &HexSpec::default()).unwrap();
        let t_ret = out.return_temperature_k.unwrap();
        assert!((t_ret - 326.15).abs() < 1e-9);
        let q = out.mass_flow_kgps * CP * (353.15 - t_ret);
        assert!((q - 100_000.0).abs() < 1e-6);
    }

    #[test]
    fn hotter_supply_needs_less_flow() {
        let load = BuildingLoad {
            load_w: 50_000.0,
            target_supply_k: Some(343.15),
        };
        let hex = HexSpec::default();
        let cold = heating().solve(345.0, &load, &hex).unwrap();
        let hot = heating().solve(360.0, &load, &hex).unwrap();
        assert!(hot.mass_flow_kgps < cold.mass_flow_kgps);
    }

    #[test]
    fn cooling_mirrors_heating() {
        let sub = DeltaTSubstation::new(NetworkKind::Cooling, CP);
        let load = BuildingLoad {
            load_w: 30_000.0,
            target_supply_k: Some(281.15),
        };
        let hex = HexSpec {
            design_delta_t_k: 10.0,
            approach_k: 2.0,
            min_delta_t_k: 1.0,
        };
        let out = sub.solve(279.15, &load, &hex).unwrap();
        let t_ret = out.return_temperature_k.unwrap();
        assert!((t_ret - 289.15).abs() < 1e-9);
        let q = out.mass_flow_kgps * CP * (t_ret - 279.15);
        assert!((q - 30_000.0).abs() < 1e-6);
    }

    #[test]
    fn idle_building_draws_nothing() {
        let out = heating()
            .solve(353.0, &BuildingLoad::default(), &HexSpec::default())
            .unwrap();
        assert_eq!(out, SubstationOutput::IDLE);
    }

    #[test]
    fn spread_is_floored() {
        let load = BuildingLoad {
            load_w: 4185.0,
            target_supply_k: Some(343.15),
        };
        // supply barely above the design return
        let out = heating().solve(326.5, &load, &HexSpec::default()).unwrap();
        assert!((out.mass_flow_kgps - 1.0).abs() < 1e-9);
        assert!((out.return_temperature_k.unwrap() - 325.5).abs() < 1e-9);
    }
}
