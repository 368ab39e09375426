//! dn-sim: design sizing and the hourly simulation driver.
//!
//! [`size_network`] picks catalog pipes from design flows, then [`run_year`]
//! solves every hour of the horizon in parallel.

pub mod annual;
pub mod design;
pub mod error;
pub mod input;

pub use annual::{AnnualRun, RunOptions, run_year};
pub use design::{DesignConfig, DesignOutcome, size_network};
pub use error::{SimError, SimResult};
pub use input::{BuildingSeries, SimulationInput, SizingMode};
