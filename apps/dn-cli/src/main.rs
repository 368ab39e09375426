use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing::Level;

use dn_app::{AppResult, RunOptions, RunRequest, project_service, run_service};
use dn_core::units::{m, pa};
use uom::si::length::kilometer;
use uom::si::pressure::kilopascal;

#[derive(Parser)]
#[command(name = "dn")]
#[command(about = "District heating and cooling network solver", long_about = None)]
struct Cli {
    /// Log solver progress (debug level); RUST_LOG takes precedence
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and topology
    Validate {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Print the independent loops of the network
    Loops {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Print the pipe assignment
    Size {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Simulate every hour of the horizon
    Run {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Simulate only the first N hours
        #[arg(long)]
        hours: Option<usize>,
        /// Worker threads (0 uses every core)
        #[arg(long, default_value_t = 0)]
        threads: usize,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// Export one result matrix of a cached run as CSV
    Export {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Run ID
        run_id: String,
        /// mass_flow, supply_temperature, return_temperature, heat_loss,
        /// plant_heat, supply_pressure, return_pressure or pressure_loss
        quantity: String,
        /// Output CSV file path
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Loops { project_path } => cmd_loops(&project_path),
        Commands::Size { project_path } => cmd_size(&project_path),
        Commands::Run {
            project_path,
            hours,
            threads,
            no_cache,
        } => cmd_run(&project_path, hours, threads, !no_cache),
        Commands::Export {
            project_path,
            run_id,
            quantity,
            output,
        } => cmd_export(&project_path, &run_id, &quantity, &output),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    let summary = project_service::summarize_project(&project)?;
    println!("✓ Project is valid");
    println!(
        "  {} ({:?}): {} plants, {} consumers, {} junctions",
        summary.name, summary.kind, summary.plants, summary.consumers, summary.junctions
    );
    println!(
        "  {} pipes, {:.2} km total, {} loops, {} hours",
        summary.pipes,
        m(summary.total_length_m).get::<kilometer>(),
        summary.loops,
        summary.hours
    );
    Ok(())
}

fn cmd_loops(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let network = dn_app::compile_network(&project.network)?;
    let loops = network.loops();
    if loops.is_empty() {
        println!("Network is a tree");
        return Ok(());
    }
    println!("{} independent loops:", loops.len());
    for (i, lp) in loops.iter().enumerate() {
        let names: Vec<&str> = lp
            .edges
            .iter()
            .filter_map(|e| network.edge(*e).map(|edge| edge.name.as_str()))
            .collect();
        println!("  L{}: {}", i, names.join(" -> "));
    }
    Ok(())
}

fn cmd_size(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let report = run_service::size_project(&project)?;
    println!(
        "Pipe assignment ({} design passes{})",
        report.passes,
        if report.converged { "" } else { ", not converged" }
    );
    for pipe in &report.pipes {
        println!(
            "  {:<12} {:<6} peak {:.3} kg/s{}",
            pipe.edge,
            pipe.dn,
            pipe.peak_flow_kgps,
            if pipe.undersized { "  UNDERSIZED" } else { "" }
        );
    }
    Ok(())
}

fn cmd_run(
    project_path: &Path,
    hours: Option<usize>,
    threads: usize,
    use_cache: bool,
) -> AppResult<()> {
    println!("Running project: {}", project_path.display());

    let request = RunRequest {
        project_path,
        options: RunOptions {
            use_cache,
            threads,
            hours,
            ..Default::default()
        },
    };
    let response = run_service::ensure_run(&request)?;

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }
    let timing = &response.timing;
    println!(
        "  compile {:.3}s, solve {:.3}s, save {:.3}s, total {:.3}s",
        timing.compile_time_s, timing.solve_time_s, timing.save_time_s, timing.total_time_s
    );

    let results = run_service::load_run(project_path, &response.run_id)?;
    let manifest = &results.manifest;
    println!("  Hours: {}", manifest.hours);
    for (name, wh) in manifest.plant_names.iter().zip(results.plant_energy_wh()) {
        println!("  Plant {}: {:.1} MWh", name, wh / 1e6);
    }
    println!("  Supply heat loss: {:.1} MWh", results.heat_loss_wh() / 1e6);
    println!(
        "  Peak pressure loss: {:.1} kPa",
        pa(results.peak_pressure_loss_pa()).get::<kilopascal>()
    );
    if !manifest.undersized_edges.is_empty() {
        println!("  Undersized pipes: {}", manifest.undersized_edges.join(", "));
    }
    if !manifest.unconverged_hours.is_empty() {
        println!(
            "  {} hours hit an iteration cap",
            manifest.unconverged_hours.len()
        );
    }
    Ok(())
}

fn cmd_export(project_path: &Path, run_id: &str, quantity: &str, output: &Path) -> AppResult<()> {
    let rows = run_service::export_run(project_path, run_id, quantity, output)?;
    println!("✓ Exported {} rows of {} to {}", rows, quantity, output.display());
    Ok(())
}
