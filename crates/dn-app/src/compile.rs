//! Project to simulation input.

use dn_components::ground::kusuda_ground_temperature;
use dn_components::{BuildingLoad, PipeCatalog};
use dn_graph::{Network, NetworkBuilder, NodeRole};
use dn_project::{GroundDef, NetworkDef, Project, SizingDef};
use dn_sim::{BuildingSeries, SimulationInput, SizingMode};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Build and validate the topology of a project.
pub fn compile_network(def: &NetworkDef) -> AppResult<Network> {
    let mut builder = NetworkBuilder::new();
    let mut ids = HashMap::with_capacity(def.nodes.len());
    for node in &def.nodes {
        let id = builder.add_node(node.id.clone(), node.role);
        if let Some(building) = &node.building {
            builder.set_building(id, building.clone());
        }
        ids.insert(node.id.as_str(), id);
    }
    for pipe in &def.pipes {
        let lookup = |name: &str| {
            ids.get(name).copied().ok_or_else(|| {
                AppError::Validation(format!("pipe '{}' references unknown node '{}'", pipe.id, name))
            })
        };
        let start = lookup(&pipe.start)?;
        let end = lookup(&pipe.end)?;
        builder.add_pipe(pipe.id.clone(), start, end, pipe.length_m);
    }
    Ok(builder.build()?)
}

/// Hourly ground temperature over the horizon.
///
/// Ambient series are converted at the burial depth and repeat yearly when
/// shorter than the horizon.
pub fn ground_series(project: &Project) -> AppResult<Vec<f64>> {
    let horizon = project.horizon();
    let base = match &project.ground {
        GroundDef::Constant { temperature_k } => return Ok(vec![*temperature_k; horizon]),
        GroundDef::Series { temperature_k } => temperature_k.clone(),
        GroundDef::Ambient { ambient_k } => {
            kusuda_ground_temperature(ambient_k, project.constants.network_depth_m)?
        }
    };
    if base.is_empty() {
        return Err(AppError::InvalidInput("empty ground temperature series".into()));
    }
    Ok(base.iter().copied().cycle().take(horizon).collect())
}

/// Resolve a validated project into a simulation input.
pub fn compile_project(project: &Project) -> AppResult<SimulationInput> {
    dn_project::validate_project(project)?;
    let network = compile_network(&project.network)?;
    let horizon = project.horizon();

    let buildings = project
        .buildings
        .iter()
        .map(|b| {
            let node = network.consumer_for(&b.name).ok_or_else(|| {
                AppError::Validation(format!("building '{}' has no consumer node", b.name))
            })?;
            let loads = (0..horizon)
                .map(|hour| {
                    let (load_w, target) = b.demand.at(hour).unwrap_or((0.0, 0.0));
                    BuildingLoad {
                        load_w,
                        target_supply_k: (target > 0.0).then_some(target),
                    }
                })
                .collect();
            Ok(BuildingSeries {
                name: b.name.clone(),
                node,
                hex: b.hex,
                loads,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let catalog = match &project.catalog {
        Some(records) => PipeCatalog::new(records.clone())?,
        None => PipeCatalog::standard(),
    };

    let sizing = match project.sizing {
        SizingDef::SizeFromFlow => SizingMode::SizeFromFlow,
        SizingDef::UseSpecified => SizingMode::UseSpecified(
            project
                .network
                .pipes
                .iter()
                .map(|p| {
                    p.dn.clone().ok_or_else(|| {
                        AppError::Validation(format!("pipe '{}' has no DN", p.id))
                    })
                })
                .collect::<AppResult<Vec<_>>>()?,
        ),
    };

    let ground_k = ground_series(project)?;
    debug!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        loops = network.loops().len(),
        consumers = network.consumers().len(),
        hours = horizon,
        "compiled project"
    );

    Ok(SimulationInput {
        network,
        kind: project.network.kind,
        consts: project.constants,
        solver: project.solver.clone(),
        design: project.design.clone(),
        catalog,
        sizing,
        ground_k,
        buildings,
        hours: horizon,
    })
}

/// Names of the plant nodes, in node order.
pub(crate) fn plant_names(network: &Network) -> Vec<String> {
    network
        .nodes()
        .iter()
        .filter(|n| n.role == NodeRole::Plant)
        .map(|n| n.name.clone())
        .collect()
}
