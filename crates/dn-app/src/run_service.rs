//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use dn_components::DeltaTSubstation;
use dn_project::Project;
use dn_results::{
    AnnualResults, ConvergenceSummary, HourRecord, Quantity, RunManifest, RunStore,
};
use dn_sim::{AnnualRun, SimulationInput};
use dn_solver::TimestepResult;
use tracing::info;

use crate::compile::{compile_project, plant_names};
use crate::error::{AppError, AppResult};
use crate::project_service;

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
    /// Worker threads; 0 uses every core.
    pub threads: usize,
    /// Overrides the project horizon.
    pub hours: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: "0.1.0".to_string(),
            threads: 0,
            hours: None,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub options: RunOptions,
}

#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub compile_time_s: f64,
    pub solve_time_s: f64,
    pub save_time_s: f64,
    pub load_cache_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
}

/// Pipe choice of one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeAssignment {
    pub edge: String,
    pub dn: String,
    pub peak_flow_kgps: f64,
    pub undersized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizingReport {
    pub pipes: Vec<PipeAssignment>,
    pub passes: usize,
    pub converged: bool,
}

fn apply_options(mut project: Project, options: &RunOptions) -> Project {
    if let Some(hours) = options.hours {
        project.hours = Some(hours);
    }
    project
}

/// Execute the project's run, or load it from the run store when an identical
/// one exists.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    let project = apply_options(
        project_service::load_project(request.project_path)?,
        &request.options,
    );
    let run_id = dn_results::compute_run_id(&project, &request.options.solver_version);
    let store = RunStore::for_project(request.project_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        let load_started = Instant::now();
        let manifest = store.load_manifest(&run_id)?;
        timing.load_cache_time_s = load_started.elapsed().as_secs_f64();
        timing.total_time_s = started.elapsed().as_secs_f64();
        info!(run_id = %run_id, "loaded cached run");
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
        });
    }

    let compile_started = Instant::now();
    let input = compile_project(&project)?;
    timing.compile_time_s = compile_started.elapsed().as_secs_f64();

    let solve_started = Instant::now();
    let substation = DeltaTSubstation::new(input.kind, input.consts.cp_j_kgk);
    let run = dn_sim::run_year(
        &input,
        &substation,
        dn_sim::RunOptions {
            threads: request.options.threads,
        },
    )?;
    timing.solve_time_s = solve_started.elapsed().as_secs_f64();

    let save_started = Instant::now();
    let manifest = build_manifest(&project, &input, &run, &run_id, &request.options.solver_version);
    let records: Vec<HourRecord> = run.hours.iter().map(hour_record).collect();
    store.save_run(&manifest, &records)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        run_id = %run_id,
        hours = records.len(),
        total_s = timing.total_time_s,
        "run completed"
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
    })
}

fn build_manifest(
    project: &Project,
    input: &SimulationInput,
    run: &AnnualRun,
    run_id: &str,
    solver_version: &str,
) -> RunManifest {
    let network = &input.network;
    let edge_names: Vec<String> = network.edges().iter().map(|e| e.name.clone()).collect();
    RunManifest {
        run_id: run_id.to_string(),
        project_name: project.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        solver_version: solver_version.to_string(),
        kind: input.kind,
        hours: run.hours.len(),
        node_names: network.nodes().iter().map(|n| n.name.clone()).collect(),
        plant_names: plant_names(network),
        pipe_sizes: run.design.records.iter().map(|r| r.dn.clone()).collect(),
        undersized_edges: run
            .design
            .sizing
            .undersized
            .iter()
            .filter_map(|&e| edge_names.get(e).cloned())
            .collect(),
        unconverged_hours: run.unconverged_hours(),
        edge_names,
    }
}

fn hour_record(result: &TimestepResult) -> HourRecord {
    let r = &result.report;
    HourRecord {
        hour: result.hour,
        mass_flow_kgps: result.edge_mass_flow_kgps.clone(),
        reversed: result.reversed.clone(),
        supply_k: result.node_supply_k.clone(),
        return_k: result.node_return_k.clone(),
        heat_loss_w: result.edge_heat_loss_w.clone(),
        plant_heat_w: result.plant_heat_w.clone(),
        plant_supply_k: result.plant_supply_k,
        supply_pa: result.node_supply_pa.clone(),
        return_pa: result.node_return_pa.clone(),
        pressure_loss_pa: result.pressure_loss_pa,
        convergence: ConvergenceSummary {
            degenerate: r.degenerate,
            outer_iterations: r.outer_iterations,
            outer_converged: r.outer_converged,
            hydraulic_iterations: r.hydraulic_iterations,
            hydraulic_converged: r.hydraulic_converged,
            reversed_edges: r.reversed_edges,
            mass_residual_kgps: r.mass_residual_kgps,
            loop_residual_pa: r.loop_residual_pa,
            plant_iterations: r.plant_iterations,
            plant_converged: r.plant_converged,
            forced_consumers: r.forced_consumers,
            min_flow_iterations: r.min_flow_iterations,
            min_flow_converged: r.min_flow_converged,
        },
    }
}

/// Pipe assignment of a project without running the year.
pub fn size_project(project: &Project) -> AppResult<SizingReport> {
    let input = compile_project(project)?;
    let substation = DeltaTSubstation::new(input.kind, input.consts.cp_j_kgk);
    let design = dn_sim::size_network(&input, &substation)?;
    let pipes = input
        .network
        .edges()
        .iter()
        .enumerate()
        .map(|(i, edge)| PipeAssignment {
            edge: edge.name.clone(),
            dn: design
                .records
                .get(i)
                .map(|r| r.dn.clone())
                .unwrap_or_default(),
            peak_flow_kgps: design.max_flows_kgps.get(i).copied().unwrap_or(0.0),
            undersized: design.sizing.undersized.contains(&i),
        })
        .collect();
    Ok(SizingReport {
        pipes,
        passes: design.passes,
        converged: design.converged,
    })
}

/// Stored runs of the project, most recent first.
pub fn list_runs(project_path: &Path) -> AppResult<Vec<RunManifest>> {
    let project = project_service::load_project(project_path)?;
    let store = RunStore::for_project(project_path)?;
    let mut runs = store.list_runs(&project.name)?;
    runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(runs)
}

pub fn load_run(project_path: &Path, run_id: &str) -> AppResult<AnnualResults> {
    let store = RunStore::for_project(project_path)?;
    Ok(store.load_run(run_id)?)
}

/// Write one result matrix of a stored run as CSV; returns the number of rows.
pub fn export_run(project_path: &Path, run_id: &str, quantity: &str, out: &Path) -> AppResult<usize> {
    let quantity: Quantity = quantity
        .parse()
        .map_err(|e: dn_results::ResultsError| AppError::InvalidInput(e.to_string()))?;
    let results = load_run(project_path, run_id)?;
    dn_results::export_csv_path(&results, quantity, out)?;
    Ok(results.records.len())
}
