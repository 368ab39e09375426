//! Fully resolved simulation input.

use dn_components::{BuildingLoad, HexSpec, NetworkKind, PipeCatalog};
use dn_core::NodeId;
use dn_fluids::PhysicalConstants;
use dn_graph::{Network, NodeRole};
use dn_solver::SolverConfig;

use crate::design::DesignConfig;
use crate::error::{SimError, SimResult};

/// How pipes are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum SizingMode {
    /// Size every pipe from design flows.
    SizeFromFlow,
    /// One catalog DN per edge, in edge order.
    UseSpecified(Vec<String>),
}

/// Hourly demand of one building and the consumer node it is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingSeries {
    pub name: String,
    pub node: NodeId,
    pub hex: HexSpec,
    pub loads: Vec<BuildingLoad>,
}

#[derive(Debug, Clone)]
pub struct SimulationInput {
    pub network: Network,
    pub kind: NetworkKind,
    pub consts: PhysicalConstants,
    pub solver: SolverConfig,
    pub design: DesignConfig,
    pub catalog: PipeCatalog,
    pub sizing: SizingMode,
    /// Ground temperature per hour [K].
    pub ground_k: Vec<f64>,
    pub buildings: Vec<BuildingSeries>,
    pub hours: usize,
}

impl SimulationInput {
    pub fn validate(&self) -> SimResult<()> {
        if self.hours == 0 {
            return Err(SimError::InvalidInput {
                what: "simulation horizon is empty".into(),
            });
        }
        if self.ground_k.len() < self.hours {
            return Err(SimError::InputLength {
                what: "ground temperature".into(),
                expected: self.hours,
                actual: self.ground_k.len(),
            });
        }
        for b in &self.buildings {
            if b.loads.len() < self.hours {
                return Err(SimError::InputLength {
                    what: format!("building '{}'", b.name),
                    expected: self.hours,
                    actual: b.loads.len(),
                });
            }
            let role = self.network.node(b.node).map(|n| n.role);
            if role != Some(NodeRole::Consumer) {
                return Err(SimError::InvalidInput {
                    what: format!("building '{}' is not attached to a consumer", b.name),
                });
            }
        }
        if let SizingMode::UseSpecified(dns) = &self.sizing {
            if dns.len() != self.network.edge_count() {
                return Err(SimError::InputLength {
                    what: "specified pipe sizes".into(),
                    expected: self.network.edge_count(),
                    actual: dns.len(),
                });
            }
        }
        Ok(())
    }

    /// Loads indexed by node for one hour; nodes without a building stay idle.
    pub fn hour_loads(&self, hour: usize) -> Vec<BuildingLoad> {
        let mut loads = vec![BuildingLoad::default(); self.network.node_count()];
        for b in &self.buildings {
            if let Some(load) = b.loads.get(hour) {
                loads[b.node.slot()] = *load;
            }
        }
        loads
    }

    pub fn hex_per_node(&self) -> Vec<HexSpec> {
        let mut hex = vec![HexSpec::default(); self.network.node_count()];
        for b in &self.buildings {
            hex[b.node.slot()] = b.hex;
        }
        hex
    }

    /// Summed building load of one hour [W].
    pub fn total_demand(&self, hour: usize) -> f64 {
        self.buildings
            .iter()
            .filter_map(|b| b.loads.get(hour))
            .map(|l| l.load_w)
            .sum()
    }
}
