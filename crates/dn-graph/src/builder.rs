//! Incremental network builder.

use std::collections::HashMap;

use dn_core::{EdgeId, NodeId};

use crate::error::{GraphError, GraphResult};
use crate::incidence::IncidenceMatrix;
use crate::loops::LoopBasis;
use crate::network::{Edge, Network, Node, NodeRole};
use crate::orientation::orient_from_virtual_demand;
use crate::validate;

/// Builder for constructing a network incrementally.
///
/// Use `add_node` and `add_pipe` to describe the topology, then call
/// `build()` to validate it and derive the incidence matrix, base
/// orientation and loop basis.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its ID.
    pub fn add_node(&mut self, name: impl Into<String>, role: NodeRole) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            name: name.into(),
            role,
            building: None,
        });
        id
    }

    /// Add a consumer node served by `building`.
    pub fn add_consumer(&mut self, name: impl Into<String>, building: impl Into<String>) -> NodeId {
        let id = self.add_node(name, NodeRole::Consumer);
        self.set_building(id, building);
        id
    }

    pub fn set_building(&mut self, node: NodeId, building: impl Into<String>) {
        if let Some(n) = self.nodes.get_mut(node.slot()) {
            n.building = Some(building.into());
        }
    }

    /// Add a pipe from `start` to `end` and return its ID.
    pub fn add_pipe(
        &mut self,
        name: impl Into<String>,
        start: NodeId,
        end: NodeId,
        length_m: f64,
    ) -> EdgeId {
        let id = EdgeId::from_index(self.edges.len() as u32);
        self.edges.push(Edge {
            id,
            name: name.into(),
            start,
            end,
            length_m,
        });
        id
    }

    /// Validate and freeze the topology.
    pub fn build(self) -> GraphResult<Network> {
        if self.nodes.is_empty() {
            return Err(GraphError::Empty);
        }
        validate::validate_names(&self.nodes, &self.edges)?;
        validate::validate_edges(&self.nodes, &self.edges)?;

        let pairs: Vec<(usize, usize)> = self
            .edges
            .iter()
            .map(|e| (e.start.slot(), e.end.slot()))
            .collect();
        let incidence = IncidenceMatrix::from_edges(self.nodes.len(), &pairs)?;

        let (node_edge_offsets, node_edges) = Self::build_adjacency(&self.nodes, &self.edges);
        validate::validate_connectivity(&self.nodes, &node_edge_offsets, &pairs)?;

        let plants: Vec<NodeId> = self.ids_with_role(NodeRole::Plant);
        let consumers: Vec<NodeId> = self.ids_with_role(NodeRole::Consumer);
        let Some(&root) = plants.first() else {
            return Err(GraphError::NoPlant);
        };

        let roles: Vec<NodeRole> = self.nodes.iter().map(|n| n.role).collect();
        let base_orientation = orient_from_virtual_demand(&incidence, &roles);
        validate::validate_sources(&incidence, &base_orientation, plants.len())?;

        let loops = LoopBasis::compute(&incidence, root.slot());

        let node_by_name: HashMap<String, NodeId> =
            self.nodes.iter().map(|n| (n.name.clone(), n.id)).collect();
        let edge_by_name: HashMap<String, EdgeId> =
            self.edges.iter().map(|e| (e.name.clone(), e.id)).collect();

        Ok(Network {
            nodes: self.nodes,
            edges: self.edges,
            node_edge_offsets,
            node_edges,
            incidence,
            base_orientation,
            loops,
            plants,
            consumers,
            node_by_name,
            edge_by_name,
        })
    }

    fn ids_with_role(&self, role: NodeRole) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.role == role)
            .map(|n| n.id)
            .collect()
    }

    /// Compact adjacency: for each node, its incident edges in column order.
    fn build_adjacency(nodes: &[Node], edges: &[Edge]) -> (Vec<usize>, Vec<EdgeId>) {
        let mut per_node: Vec<Vec<EdgeId>> = vec![Vec::new(); nodes.len()];
        for edge in edges {
            per_node[edge.start.slot()].push(edge.id);
            per_node[edge.end.slot()].push(edge.id);
        }

        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        let mut flat = Vec::with_capacity(edges.len() * 2);
        offsets.push(0);
        for list in per_node {
            flat.extend(list);
            offsets.push(flat.len());
        }
        (offsets, flat)
    }
}
