//! Per-timestep edge orientation overlay.

use tracing::{debug, warn};

use crate::incidence::IncidenceMatrix;
use crate::network::NodeRole;

/// Sign overlay on the static incidence matrix. A flipped edge swaps its
/// logical start and end for the owner of this overlay only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orientation {
    flipped: Vec<bool>,
}

impl Orientation {
    /// Every edge as declared.
    pub fn identity(n_edges: usize) -> Self {
        Self {
            flipped: vec![false; n_edges],
        }
    }

    pub fn len(&self) -> usize {
        self.flipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flipped.is_empty()
    }

    pub fn flip(&mut self, edge: usize) {
        self.flipped[edge] = !self.flipped[edge];
    }

    pub fn is_flipped(&self, edge: usize) -> bool {
        self.flipped[edge]
    }

    /// +1.0 as declared, -1.0 flipped.
    pub fn sign(&self, edge: usize) -> f64 {
        if self.flipped[edge] { -1.0 } else { 1.0 }
    }

    pub fn flipped_count(&self) -> usize {
        self.flipped.iter().filter(|&&f| f).count()
    }
}

/// Orient edges so that plants only deliver flow and every other node receives some.
///
/// Plants carry a virtual demand of `-n_consumers / n_plants` and consumers `1`;
/// sweeps flip the first offending edge at each node until nothing changes.
pub fn orient_from_virtual_demand(incidence: &IncidenceMatrix, roles: &[NodeRole]) -> Orientation {
    let n_nodes = incidence.n_nodes();
    let mut orientation = Orientation::identity(incidence.n_edges());

    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); n_nodes];
    for edge in 0..incidence.n_edges() {
        let (from, to) = incidence.endpoints(edge, &orientation);
        incident[from].push(edge);
        incident[to].push(edge);
    }

    let max_sweeps = 10 * n_nodes.max(1);
    for sweep in 0..max_sweeps {
        let mut changed = false;
        for node in 0..n_nodes {
            let inflow = incident[node]
                .iter()
                .copied()
                .find(|&e| incidence.endpoints(e, &orientation).1 == node);
            match (roles[node], inflow) {
                (NodeRole::Plant, Some(edge)) => {
                    orientation.flip(edge);
                    changed = true;
                }
                (NodeRole::Consumer | NodeRole::Junction, None) => {
                    if let Some(&edge) = incident[node].first() {
                        orientation.flip(edge);
                        changed = true;
                    }
                }
                _ => {}
            }
        }
        if !changed {
            debug!(sweeps = sweep + 1, flipped = orientation.flipped_count(), "orientation settled");
            return orientation;
        }
    }

    warn!(max_sweeps, "virtual-demand orientation did not settle");
    orientation
}

/// Nodes without any inflow edge under `orientation`.
pub(crate) fn source_nodes(incidence: &IncidenceMatrix, orientation: &Orientation) -> Vec<usize> {
    let adj = incidence.adjacency(orientation);
    (0..incidence.n_nodes())
        .filter(|&n| adj.incoming[n].is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_is_an_involution() {
        let mut o = Orientation::identity(3);
        o.flip(1);
        assert!(o.is_flipped(1));
        assert_eq!(o.sign(1), -1.0);
        o.flip(1);
        assert_eq!(o, Orientation::identity(3));
    }

    #[test]
    fn chain_declared_backwards_is_corrected() {
        // plant 0, junction 1, consumer 2; both edges declared pointing to the plant
        let inc = IncidenceMatrix::from_edges(3, &[(1, 0), (2, 1)]).unwrap();
        let roles = [NodeRole::Plant, NodeRole::Junction, NodeRole::Consumer];
        let o = orient_from_virtual_demand(&inc, &roles);
        assert_eq!(inc.endpoints(0, &o), (0, 1));
        assert_eq!(inc.endpoints(1, &o), (1, 2));
        assert_eq!(source_nodes(&inc, &o), vec![0]);
    }

    #[test]
    fn ring_has_single_source() {
        let inc = IncidenceMatrix::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
        let roles = [
            NodeRole::Plant,
            NodeRole::Junction,
            NodeRole::Junction,
            NodeRole::Consumer,
        ];
        let o = orient_from_virtual_demand(&inc, &roles);
        assert_eq!(source_nodes(&inc, &o), vec![0]);
    }
}
