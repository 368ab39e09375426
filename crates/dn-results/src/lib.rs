//! dn-results: run cache, hourly result storage and CSV export.

pub mod export;
pub mod hash;
pub mod store;
pub mod types;

pub use export::{export_csv, export_csv_path};
pub use hash::compute_run_id;
pub use store::RunStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Unknown quantity: {0}")]
    UnknownQuantity(String),

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },
}
