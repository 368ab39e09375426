//! Steady-state hydraulic-thermal solver for district heating and cooling networks.
//!
//! One call to [`solve_timestep`] couples:
//! - the mass-flow solve (direct for trees, Hardy-Cross for meshed networks),
//! - supply-line temperature propagation with the plant temperature search,
//! - the substation model in an outer fixed-point loop,
//! - return-line propagation, plant heat and nodal pressures.
//!
//! Every iteration is capped. Non-convergence is logged and reported in the
//! [`ConvergenceReport`], never returned as an error.

pub mod config;
pub mod error;
pub mod hydraulic;
pub mod model;
pub mod pressure;
pub mod temperature;
pub mod timestep;

pub use config::{SolverConfig, ToleranceStep};
pub use error::{SolverError, SolverResult};
pub use hydraulic::{
    HydraulicReport, demand_vector, loop_pressure_residual, mass_residual, solve_mass_flow,
    solve_normalized,
};
pub use model::NetworkModel;
pub use pressure::{PressureSolution, solve_pressures};
pub use temperature::{
    ReturnSolution, SupplyPass, SupplySolution, ThermalNetwork, edge_heat_loss, plant_heat,
    return_pass, search_plant_temperature, supply_pass,
};
pub use timestep::{ConvergenceReport, TimestepInput, TimestepResult, solve_timestep};
