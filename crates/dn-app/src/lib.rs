//! Application service layer shared by the command-line frontend.
//!
//! Turns a YAML project into a simulation input, runs it with caching in
//! the project's run store, and answers queries on stored runs.

pub mod compile;
pub mod error;
pub mod project_service;
pub mod run_service;

pub use compile::{compile_network, compile_project, ground_series};
pub use error::{AppError, AppResult};
pub use project_service::{
    ProjectSummary, load_project, save_project, summarize_project, validate_project,
};
pub use run_service::{
    PipeAssignment, RunOptions, RunRequest, RunResponse, RunTimingSummary, SizingReport,
    ensure_run, export_run, list_runs, load_run, size_project,
};
