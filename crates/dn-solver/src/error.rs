//! Error types for solver operations.

use dn_components::ComponentError;
use dn_core::error::DnError;
use dn_fluids::FluidError;
use thiserror::Error;

/// Fatal errors. Numerical non-convergence is not one of them.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Singular system: {what}")]
    Singular { what: String },

    #[error("Invalid state: {what}")]
    InvalidState { what: String },

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Graph error: {0}")]
    Graph(#[from] dn_graph::GraphError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for DnError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::ProblemSetup { .. } => DnError::InvalidArg {
                what: "problem setup",
            },
            SolverError::Singular { .. } => DnError::Invariant {
                what: "singular system",
            },
            SolverError::InvalidState { .. } => DnError::InvalidArg { what: "state" },
            SolverError::Component(_) => DnError::InvalidArg { what: "component" },
            SolverError::Fluid(_) => DnError::InvalidArg { what: "fluid" },
            SolverError::Graph(_) => DnError::InvalidArg { what: "graph" },
            SolverError::Numeric { .. } => DnError::InvalidArg { what: "numeric" },
        }
    }
}
