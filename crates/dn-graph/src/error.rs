//! Topology error types.

use dn_core::NodeId;
use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Network construction and validation errors. All of them are fatal for a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Network has no nodes")]
    Empty,

    #[error("Duplicate node name '{name}'")]
    DuplicateNode { name: String },

    #[error("Duplicate edge name '{name}'")]
    DuplicateEdge { name: String },

    #[error("Edge '{edge}' refers to non-existent node {node}")]
    InvalidNodeRef { edge: String, node: NodeId },

    #[error("Edge '{edge}' starts and ends at the same node")]
    SelfLoop { edge: String },

    #[error("Edge '{edge}' has invalid length {length_m} m")]
    InvalidLength { edge: String, length_m: f64 },

    #[error("Node '{name}' has no connected edges")]
    IsolatedNode { name: String },

    #[error("Network is split into {components} disconnected parts")]
    Disconnected { components: usize },

    #[error("Network has no plant node")]
    NoPlant,

    #[error("Incidence column {edge} is malformed ({plus} entries of +1, {minus} entries of -1)")]
    MalformedColumn {
        edge: usize,
        plus: usize,
        minus: usize,
    },

    #[error(
        "Network has {sources} source node(s) without inflow but {plants} plant(s); \
         remove dead ends that are neither consumers nor plants"
    )]
    PlantCountMismatch { plants: usize, sources: usize },

    #[error("{what} not found")]
    NotFound { what: String },
}
