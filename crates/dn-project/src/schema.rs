//! Project schema definitions.

use dn_components::{HexSpec, NetworkKind, PipeRecord};
use dn_core::constants::HOURS_PER_YEAR;
use dn_fluids::PhysicalConstants;
use dn_graph::NodeRole;
use dn_sim::DesignConfig;
use dn_solver::SolverConfig;
use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    pub network: NetworkDef,
    #[serde(default)]
    pub constants: PhysicalConstants,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub design: DesignConfig,
    /// Custom pipe catalog; the built-in DN20..DN600 series when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Vec<PipeRecord>>,
    #[serde(default)]
    pub sizing: SizingDef,
    pub ground: GroundDef,
    #[serde(default)]
    pub buildings: Vec<BuildingDef>,
    /// Simulated hours; a full year when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<usize>,
}

impl Project {
    pub fn horizon(&self) -> usize {
        self.hours.unwrap_or(HOURS_PER_YEAR)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    #[serde(default)]
    pub kind: NetworkKind,
    pub nodes: Vec<NodeDef>,
    pub pipes: Vec<PipeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub id: String,
    pub role: NodeRole,
    /// Building served by a consumer node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipeDef {
    pub id: String,
    pub start: String,
    pub end: String,
    pub length_m: f64,
    /// Catalog size, required when sizing is `use_specified`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dn: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SizingDef {
    #[default]
    SizeFromFlow,
    UseSpecified,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroundDef {
    Constant { temperature_k: f64 },
    /// Hourly ground temperature.
    Series { temperature_k: Vec<f64> },
    /// Hourly ambient air temperature, converted at the burial depth.
    Ambient { ambient_k: Vec<f64> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildingDef {
    pub name: String,
    #[serde(default)]
    pub hex: HexSpec,
    pub demand: DemandDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DemandDef {
    Constant {
        load_w: f64,
        target_supply_k: f64,
    },
    Series {
        load_w: Vec<f64>,
        target_supply_k: Vec<f64>,
    },
}

impl DemandDef {
    /// Number of hours covered; `None` for constant demand.
    pub fn hours(&self) -> Option<usize> {
        match self {
            DemandDef::Constant { .. } => None,
            DemandDef::Series {
                load_w,
                target_supply_k,
            } => Some(load_w.len().min(target_supply_k.len())),
        }
    }

    /// `(load, target)` at `hour`.
    pub fn at(&self, hour: usize) -> Option<(f64, f64)> {
        match self {
            DemandDef::Constant {
                load_w,
                target_supply_k,
            } => Some((*load_w, *target_supply_k)),
            DemandDef::Series {
                load_w,
                target_supply_k,
            } => Some((*load_w.get(hour)?, *target_supply_k.get(hour)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_sections() {
        let yaml = r#"
version: 1
name: Minimal
network:
  nodes:
    - { id: P, role: plant }
    - { id: C, role: consumer, building: B1 }
  pipes:
    - { id: e0, start: P, end: C, length_m: 100.0 }
ground: { type: constant, temperature_k: 283.15 }
buildings:
  - name: B1
    demand: { type: constant, load_w: 50000.0, target_supply_k: 343.15 }
"#;
        let p: Project = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(p.network.kind, NetworkKind::Heating);
        assert_eq!(p.sizing, SizingDef::SizeFromFlow);
        assert_eq!(p.solver, SolverConfig::default());
        assert_eq!(p.constants, PhysicalConstants::default());
        assert_eq!(p.horizon(), HOURS_PER_YEAR);
        assert_eq!(p.buildings[0].hex, HexSpec::default());
        assert_eq!(p.buildings[0].demand.at(1234), Some((50000.0, 343.15)));
    }

    #[test]
    fn series_demand_is_bounded() {
        let d = DemandDef::Series {
            load_w: vec![1.0, 2.0, 3.0],
            target_supply_k: vec![340.0, 341.0],
        };
        assert_eq!(d.hours(), Some(2));
        assert_eq!(d.at(1), Some((2.0, 341.0)));
        assert_eq!(d.at(2), None);
    }
}
