//! Hourly simulation over the horizon.

use dn_components::SubstationModel;
use dn_solver::{NetworkModel, TimestepInput, TimestepResult, solve_timestep};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::design::{DesignOutcome, size_network};
use crate::error::{SimError, SimResult};
use crate::input::SimulationInput;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Worker threads; 0 uses the global rayon pool.
    pub threads: usize,
}

/// Sized network and every solved hour, in hour order.
#[derive(Debug, Clone)]
pub struct AnnualRun {
    pub design: DesignOutcome,
    pub hours: Vec<TimestepResult>,
}

impl AnnualRun {
    /// Hours where some inner loop hit its cap.
    pub fn unconverged_hours(&self) -> Vec<usize> {
        self.hours
            .iter()
            .filter(|h| !h.report.fully_converged())
            .map(|h| h.hour)
            .collect()
    }
}

/// Size the network, then solve every hour independently.
///
/// A fatal error in any hour aborts the run.
pub fn run_year(
    input: &SimulationInput,
    substation: &dyn SubstationModel,
    options: RunOptions,
) -> SimResult<AnnualRun> {
    input.validate()?;
    let run = || -> SimResult<AnnualRun> {
        let design = size_network(input, substation)?;
        let model = NetworkModel::from_records(
            input.network.clone(),
            design.records.clone(),
            input.kind,
            input.consts,
            input.solver.clone(),
        )?;
        let hex = input.hex_per_node();
        let hours = (0..input.hours)
            .into_par_iter()
            .map(|hour| {
                let loads = input.hour_loads(hour);
                let step = TimestepInput {
                    hour,
                    ground_k: input.ground_k[hour],
                    loads: &loads,
                    hex: &hex,
                };
                solve_timestep(&model, substation, &step).map_err(SimError::from)
            })
            .collect::<SimResult<Vec<_>>>()?;
        Ok(AnnualRun { design, hours })
    };

    let result = if options.threads == 0 {
        run()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?;
        pool.install(run)?
    };

    let unconverged = result.unconverged_hours();
    if !unconverged.is_empty() {
        warn!(
            hours = unconverged.len(),
            first = unconverged[0],
            "some hours did not fully converge"
        );
    }
    info!(
        hours = result.hours.len(),
        degenerate = result.hours.iter().filter(|h| h.report.degenerate).count(),
        "simulation finished"
    );
    Ok(result)
}
