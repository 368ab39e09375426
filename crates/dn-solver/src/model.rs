//! Static per-network data shared read-only by every timestep.

use dn_components::{NetworkKind, Pipe, PipeRecord};
use dn_core::nanmean;
use dn_fluids::PhysicalConstants;
use dn_graph::{Network, Orientation};

use crate::config::SolverConfig;
use crate::error::{SolverError, SolverResult};

/// Network topology with sized pipes, fluid constants and solver settings.
#[derive(Debug, Clone)]
pub struct NetworkModel {
    pub network: Network,
    pub pipes: Vec<Pipe>,
    pub kind: NetworkKind,
    pub consts: PhysicalConstants,
    pub config: SolverConfig,
}

impl NetworkModel {
    pub fn new(
        network: Network,
        pipes: Vec<Pipe>,
        kind: NetworkKind,
        consts: PhysicalConstants,
        config: SolverConfig,
    ) -> SolverResult<Self> {
        if pipes.len() != network.edge_count() {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "{} pipes for {} network edges",
                    pipes.len(),
                    network.edge_count()
                ),
            });
        }
        consts.validate()?;
        config.validate()?;
        Ok(Self {
            network,
            pipes,
            kind,
            consts,
            config,
        })
    }

    /// Build pipes from the network's edge lengths and one record per edge.
    pub fn from_records(
        network: Network,
        records: Vec<PipeRecord>,
        kind: NetworkKind,
        consts: PhysicalConstants,
        config: SolverConfig,
    ) -> SolverResult<Self> {
        let pipes = network
            .lengths()
            .into_iter()
            .zip(records)
            .map(|(length, record)| Pipe::new(length, record))
            .collect();
        Self::new(network, pipes, kind, consts, config)
    }

    /// Same network with a different pipe set.
    pub fn with_records(&self, records: Vec<PipeRecord>) -> SolverResult<Self> {
        Self::from_records(
            self.network.clone(),
            records,
            self.kind,
            self.consts,
            self.config.clone(),
        )
    }

    pub fn node_count(&self) -> usize {
        self.network.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.network.edge_count()
    }

    pub fn cp(&self) -> f64 {
        self.consts.cp_j_kgk
    }

    /// Mean of end-node temperatures per edge.
    ///
    /// Undefined nodes take the mean of the defined ones; an edge stays
    /// undefined only when no node temperature is known at all.
    pub fn edge_temperatures(
        &self,
        orientation: &Orientation,
        node_k: &[Option<f64>],
    ) -> Vec<Option<f64>> {
        let fill = nanmean(node_k.iter().copied());
        let inc = self.network.incidence();
        (0..self.edge_count())
            .map(|e| {
                let (from, to) = inc.endpoints(e, orientation);
                let a = node_k.get(from).copied().flatten().or(fill)?;
                let b = node_k.get(to).copied().flatten().or(fill)?;
                Some(0.5 * (a + b))
            })
            .collect()
    }

    /// Conduction coefficient per edge at the given flows and temperatures [W/K].
    pub fn conduction(&self, flows: &[f64], edge_t_k: &[Option<f64>]) -> SolverResult<Vec<f64>> {
        self.pipes
            .iter()
            .enumerate()
            .map(|(e, pipe)| {
                let m = flows.get(e).copied().unwrap_or(0.0);
                let t = edge_t_k.get(e).copied().flatten();
                Ok(pipe.conduction_coefficient(m, t, self.kind, &self.consts)?)
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use dn_components::PipeCatalog;
    use dn_graph::{NetworkBuilder, NodeRole};

    /// Model with every pipe set to `dn`.
    pub fn uniform(network: Network, dn: &str, kind: NetworkKind) -> NetworkModel {
        let record = PipeCatalog::standard().by_dn(dn).cloned().unwrap();
        let records = vec![record; network.edge_count()];
        NetworkModel::from_records(
            network,
            records,
            kind,
            PhysicalConstants::default(),
            SolverConfig::default(),
        )
        .unwrap()
    }

    /// Plant P feeding consumer C over one pipe.
    pub fn two_node(length_m: f64) -> Network {
        let mut b = NetworkBuilder::new();
        let p = b.add_node("P", NodeRole::Plant);
        let c = b.add_consumer("C", "B1");
        b.add_pipe("p1", p, c, length_m);
        b.build().unwrap()
    }

    /// Plant P, junctions J1..J3 in a ring, consumers on J2 and J3.
    pub fn ring() -> Network {
        let mut b = NetworkBuilder::new();
        let p = b.add_node("P", NodeRole::Plant);
        let j1 = b.add_node("J1", NodeRole::Junction);
        let j2 = b.add_node("J2", NodeRole::Junction);
        let j3 = b.add_node("J3", NodeRole::Junction);
        let c1 = b.add_consumer("C1", "B1");
        let c2 = b.add_consumer("C2", "B2");
        b.add_pipe("p0", p, j1, 50.0);
        b.add_pipe("p1", j1, j2, 120.0);
        b.add_pipe("p2", j2, j3, 80.0);
        b.add_pipe("p3", j3, j1, 150.0);
        b.add_pipe("s1", j2, c1, 20.0);
        b.add_pipe("s2", j3, c2, 20.0);
        b.build().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn pipe_count_must_match_edges() {
        let net = two_node(100.0);
        let err = NetworkModel::new(
            net,
            Vec::new(),
            NetworkKind::Heating,
            PhysicalConstants::default(),
            SolverConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::ProblemSetup { .. }));
    }

    #[test]
    fn edge_temperature_fills_undefined_nodes() {
        let model = uniform(two_node(100.0), "DN50", NetworkKind::Heating);
        let o = model.network.base_orientation().clone();
        let t = model.edge_temperatures(&o, &[Some(350.0), None]);
        assert_eq!(t, vec![Some(350.0)]);
        let t = model.edge_temperatures(&o, &[Some(350.0), Some(340.0)]);
        assert_eq!(t, vec![Some(345.0)]);
        assert_eq!(model.edge_temperatures(&o, &[None, None]), vec![None]);
    }
}
