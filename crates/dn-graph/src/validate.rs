//! Topology validation logic.

use std::collections::HashSet;

use petgraph::algo::connected_components;
use petgraph::graph::UnGraph;

use crate::error::{GraphError, GraphResult};
use crate::incidence::IncidenceMatrix;
use crate::network::{Edge, Node};
use crate::orientation::{Orientation, source_nodes};

/// Node and edge names must be unique.
pub(crate) fn validate_names(nodes: &[Node], edges: &[Edge]) -> GraphResult<()> {
    let mut seen = HashSet::new();
    for node in nodes {
        if !seen.insert(node.name.as_str()) {
            return Err(GraphError::DuplicateNode {
                name: node.name.clone(),
            });
        }
    }

    let mut seen = HashSet::new();
    for edge in edges {
        if !seen.insert(edge.name.as_str()) {
            return Err(GraphError::DuplicateEdge {
                name: edge.name.clone(),
            });
        }
    }
    Ok(())
}

/// Endpoints exist and differ, lengths are positive.
pub(crate) fn validate_edges(nodes: &[Node], edges: &[Edge]) -> GraphResult<()> {
    for edge in edges {
        for node in [edge.start, edge.end] {
            if node.slot() >= nodes.len() {
                return Err(GraphError::InvalidNodeRef {
                    edge: edge.name.clone(),
                    node,
                });
            }
        }
        if edge.start == edge.end {
            return Err(GraphError::SelfLoop {
                edge: edge.name.clone(),
            });
        }
        if !edge.length_m.is_finite() || edge.length_m <= 0.0 {
            return Err(GraphError::InvalidLength {
                edge: edge.name.clone(),
                length_m: edge.length_m,
            });
        }
    }
    Ok(())
}

/// Every node is attached and the network forms a single component.
pub(crate) fn validate_connectivity(
    nodes: &[Node],
    node_edge_offsets: &[usize],
    pairs: &[(usize, usize)],
) -> GraphResult<()> {
    for (i, node) in nodes.iter().enumerate() {
        if node_edge_offsets[i] == node_edge_offsets[i + 1] && nodes.len() > 1 {
            return Err(GraphError::IsolatedNode {
                name: node.name.clone(),
            });
        }
    }

    let mut graph: UnGraph<(), ()> = UnGraph::with_capacity(nodes.len(), pairs.len());
    let idx: Vec<_> = nodes.iter().map(|_| graph.add_node(())).collect();
    for &(a, b) in pairs {
        graph.add_edge(idx[a], idx[b], ());
    }
    let components = connected_components(&graph);
    if components > 1 {
        return Err(GraphError::Disconnected { components });
    }
    Ok(())
}

/// After orientation, the nodes without inflow must be exactly the plants.
pub(crate) fn validate_sources(
    incidence: &IncidenceMatrix,
    orientation: &Orientation,
    plants: usize,
) -> GraphResult<()> {
    let sources = source_nodes(incidence, orientation).len();
    if sources != plants {
        return Err(GraphError::PlantCountMismatch { plants, sources });
    }
    Ok(())
}
