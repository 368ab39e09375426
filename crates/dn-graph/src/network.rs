//! Core network data structures.

use std::collections::HashMap;

use dn_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::incidence::IncidenceMatrix;
use crate::loops::LoopBasis;
use crate::orientation::Orientation;

/// Role of a node in the flow problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Injects the supply flow.
    Plant,
    /// Draws flow through a building substation.
    Consumer,
    /// Pure branch point, zero net demand.
    Junction,
}

/// A network node. Per-hour temperatures and pressures are kept in solver vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub role: NodeRole,
    pub building: Option<String>,
}

/// A pipe between two nodes. `start -> end` is the declared positive-flow direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub name: String,
    pub start: NodeId,
    pub end: NodeId,
    pub length_m: f64,
}

/// Validated, immutable topology shared by every timestep of a run.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,

    /// Node i's incident edges are node_edges[node_edge_offsets[i]..node_edge_offsets[i+1]].
    pub(crate) node_edge_offsets: Vec<usize>,
    pub(crate) node_edges: Vec<EdgeId>,

    pub(crate) incidence: IncidenceMatrix,
    pub(crate) base_orientation: Orientation,
    pub(crate) loops: LoopBasis,

    pub(crate) plants: Vec<NodeId>,
    pub(crate) consumers: Vec<NodeId>,
    pub(crate) node_by_name: HashMap<String, NodeId>,
    pub(crate) edge_by_name: HashMap<String, EdgeId>,
}

impl Network {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.slot())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges touching `node`, in column order.
    pub fn node_edges(&self, node: NodeId) -> &[EdgeId] {
        let idx = node.slot();
        if idx >= self.nodes.len() {
            return &[];
        }
        &self.node_edges[self.node_edge_offsets[idx]..self.node_edge_offsets[idx + 1]]
    }

    pub fn plants(&self) -> &[NodeId] {
        &self.plants
    }

    pub fn consumers(&self) -> &[NodeId] {
        &self.consumers
    }

    pub fn incidence(&self) -> &IncidenceMatrix {
        &self.incidence
    }

    /// Orientation after virtual-demand correction; the starting overlay for every timestep.
    pub fn base_orientation(&self) -> &Orientation {
        &self.base_orientation
    }

    pub fn loops(&self) -> &LoopBasis {
        &self.loops
    }

    pub fn is_looped(&self) -> bool {
        !self.loops.is_empty()
    }

    pub fn lengths(&self) -> Vec<f64> {
        self.edges.iter().map(|e| e.length_m).collect()
    }

    pub fn node_id(&self, name: &str) -> GraphResult<NodeId> {
        self.node_by_name
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::NotFound {
                what: format!("node '{name}'"),
            })
    }

    pub fn edge_id(&self, name: &str) -> GraphResult<EdgeId> {
        self.edge_by_name
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::NotFound {
                what: format!("edge '{name}'"),
            })
    }

    /// Consumer node serving `building`, if any.
    pub fn consumer_for(&self, building: &str) -> Option<NodeId> {
        self.consumers.iter().copied().find(|&id| {
            self.nodes[id.slot()].building.as_deref() == Some(building)
        })
    }
}
