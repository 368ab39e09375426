use dn_components::ComponentError;
use dn_solver::SolverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    #[error("{what} has {actual} values, horizon needs {expected}")]
    InputLength {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

pub type SimResult<T> = Result<T, SimError>;
