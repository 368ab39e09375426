//! Error types for the dn-app service layer.

use std::path::PathBuf;

/// Unified error for the frontends, wrapping every backend crate's error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write project file: {path}")]
    ProjectFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Component error: {0}")]
    Component(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<dn_project::ProjectError> for AppError {
    fn from(err: dn_project::ProjectError) -> Self {
        match err {
            dn_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<dn_project::ValidationError> for AppError {
    fn from(err: dn_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<dn_graph::GraphError> for AppError {
    fn from(err: dn_graph::GraphError) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<dn_components::ComponentError> for AppError {
    fn from(err: dn_components::ComponentError) -> Self {
        AppError::Component(err.to_string())
    }
}

impl From<dn_solver::SolverError> for AppError {
    fn from(err: dn_solver::SolverError) -> Self {
        AppError::Solver(err.to_string())
    }
}

impl From<dn_sim::SimError> for AppError {
    fn from(err: dn_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<dn_results::ResultsError> for AppError {
    fn from(err: dn_results::ResultsError) -> Self {
        match err {
            dn_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
