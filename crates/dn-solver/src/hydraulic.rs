//! Mass-flow distribution.
//!
//! Trees are solved directly: dropping one plant row leaves a square,
//! nonsingular reduced incidence system. Meshed networks start from the
//! minimum-norm least-squares solution, which already balances every node, and
//! are then corrected loop by loop with Hardy-Cross until the head loss around
//! each loop vanishes.

use dn_core::round_to;
use dn_graph::{NodeRole, Orientation};
use nalgebra::DVector;
use tracing::{debug, warn};

use crate::error::{SolverError, SolverResult};
use crate::model::NetworkModel;

/// Diagnostics of one mass-flow solve.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HydraulicReport {
    /// Hardy-Cross sweeps; zero for trees.
    pub loop_iterations: usize,
    pub converged: bool,
    /// Solves needed until every flow was non-negative.
    pub orientation_passes: usize,
    /// Largest nodal imbalance after rounding [kg/s].
    pub mass_residual_kgps: f64,
    /// Largest head-loss sum around a loop [Pa].
    pub loop_residual_pa: f64,
}

/// Nodal demand vector: consumers draw their flow, plants share the total equally.
pub fn demand_vector(model: &NetworkModel, consumer_flows: &[f64]) -> Vec<f64> {
    let network = &model.network;
    let total: f64 = network
        .consumers()
        .iter()
        .map(|c| consumer_flows.get(c.slot()).copied().unwrap_or(0.0))
        .sum();
    let plant_share = -total / network.plants().len().max(1) as f64;
    network
        .nodes()
        .iter()
        .map(|node| match node.role {
            NodeRole::Consumer => consumer_flows.get(node.id.slot()).copied().unwrap_or(0.0),
            NodeRole::Plant => plant_share,
            NodeRole::Junction => 0.0,
        })
        .collect()
}

/// Edge mass flows satisfying `A·m = b` under `orientation`.
///
/// Flows are rounded and may be negative; see [`solve_normalized`].
pub fn solve_mass_flow(
    model: &NetworkModel,
    orientation: &Orientation,
    demand: &[f64],
    edge_t_k: &[Option<f64>],
) -> SolverResult<(Vec<f64>, HydraulicReport)> {
    let network = &model.network;
    if demand.len() != network.node_count() {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "demand vector has {} entries for {} nodes",
                demand.len(),
                network.node_count()
            ),
        });
    }
    let root = network
        .plants()
        .first()
        .map(|p| p.slot())
        .ok_or_else(|| SolverError::ProblemSetup {
            what: "network has no plant".into(),
        })?;

    let a = network.incidence().reduced(orientation, root);
    let b = DVector::from_iterator(
        demand.len() - 1,
        demand
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != root)
            .map(|(_, &v)| v),
    );

    let mut report = HydraulicReport::default();
    let mut flows: Vec<f64> = if network.is_looped() {
        let initial = a
            .svd(true, true)
            .solve(&b, 1e-12)
            .map_err(|e| SolverError::Numeric { what: e.to_string() })?;
        let mut flows: Vec<f64> = initial.iter().copied().collect();
        let (iterations, converged) = hardy_cross(model, orientation, &mut flows, edge_t_k);
        report.loop_iterations = iterations;
        report.converged = converged;
        flows
    } else {
        let solved = a.lu().solve(&b).ok_or_else(|| SolverError::Singular {
            what: "reduced incidence matrix of tree network".into(),
        })?;
        report.converged = true;
        solved.iter().copied().collect()
    };

    let decimals = model.config.flow_decimals;
    for m in &mut flows {
        *m = round_to(*m, decimals);
    }

    report.mass_residual_kgps = mass_residual(model, orientation, &flows, demand);
    report.loop_residual_pa = loop_pressure_residual(model, orientation, &flows, edge_t_k);
    if report.mass_residual_kgps > model.config.mass_balance_tolerance_kgps {
        warn!(
            residual_kgps = report.mass_residual_kgps,
            "mass balance not satisfied"
        );
    }
    if report.loop_residual_pa > model.config.loop_pressure_tolerance_pa {
        warn!(
            residual_pa = report.loop_residual_pa,
            "loop pressure sum exceeds tolerance"
        );
    }
    Ok((flows, report))
}

/// Solve, then flip every edge that carries negative flow and solve again.
///
/// On return all flows are non-negative and `orientation` holds the flow
/// direction. If the pass cap is reached, remaining negative edges are flipped
/// and their flows negated, which leaves `A·m` unchanged.
pub fn solve_normalized(
    model: &NetworkModel,
    orientation: &mut Orientation,
    demand: &[f64],
    edge_t_k: &[Option<f64>],
) -> SolverResult<(Vec<f64>, HydraulicReport)> {
    let max_passes = model.config.max_orientation_passes;
    let mut passes = 0;
    loop {
        let (mut flows, mut report) = solve_mass_flow(model, orientation, demand, edge_t_k)?;
        passes += 1;
        report.orientation_passes = passes;

        let negative: Vec<usize> = (0..flows.len()).filter(|&e| flows[e] < 0.0).collect();
        if negative.is_empty() {
            return Ok((flows, report));
        }
        debug!(pass = passes, edges = negative.len(), "reversing edges with negative flow");
        for &e in &negative {
            orientation.flip(e);
        }
        if passes >= max_passes {
            warn!(passes, "flow directions did not settle");
            for &e in &negative {
                flows[e] = -flows[e];
            }
            return Ok((flows, report));
        }
    }
}

/// Largest `|A·m - b|` over all nodes.
pub fn mass_residual(
    model: &NetworkModel,
    orientation: &Orientation,
    flows: &[f64],
    demand: &[f64],
) -> f64 {
    let inflow = model.network.incidence().net_inflow(orientation, flows);
    inflow
        .iter()
        .zip(demand)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

/// Largest absolute head-loss sum around any loop [Pa].
pub fn loop_pressure_residual(
    model: &NetworkModel,
    orientation: &Orientation,
    flows: &[f64],
    edge_t_k: &[Option<f64>],
) -> f64 {
    let network = &model.network;
    let inc = network.incidence();
    network
        .loops()
        .iter()
        .map(|lp| {
            lp.signed_edges(inc, orientation)
                .map(|(e, sign)| {
                    let (dp, _) = model.pipes[e].loss_and_slope(flows[e], edge_temp(edge_t_k, e), &model.consts);
                    sign * dp
                })
                .sum::<f64>()
                .abs()
        })
        .fold(0.0, f64::max)
}

fn edge_temp(edge_t_k: &[Option<f64>], e: usize) -> Option<f64> {
    edge_t_k.get(e).copied().flatten()
}

/// Hardy-Cross loop corrections applied in place. Returns `(sweeps, converged)`.
fn hardy_cross(
    model: &NetworkModel,
    orientation: &Orientation,
    flows: &mut [f64],
    edge_t_k: &[Option<f64>],
) -> (usize, bool) {
    let network = &model.network;
    let inc = network.incidence();
    let loops: Vec<Vec<(usize, f64)>> = network
        .loops()
        .iter()
        .map(|lp| lp.signed_edges(inc, orientation).collect())
        .collect();

    let max_iterations = model.config.max_loop_iterations;
    for iteration in 1..=max_iterations {
        let previous = flows.to_vec();
        let (losses, slopes): (Vec<f64>, Vec<f64>) = previous
            .iter()
            .enumerate()
            .map(|(e, &m)| model.pipes[e].loss_and_slope(m, edge_temp(edge_t_k, e), &model.consts))
            .unzip();

        for lp in &loops {
            let imbalance: f64 = lp.iter().map(|&(e, sign)| sign * losses[e]).sum();
            let slope: f64 = lp.iter().map(|&(e, _)| slopes[e]).sum();
            if slope <= 0.0 {
                continue;
            }
            let delta = -imbalance / slope;
            for &(e, sign) in lp {
                flows[e] += sign * delta;
            }
        }

        let change = flows
            .iter()
            .zip(&previous)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        if change <= model.config.loop_tolerance(iteration) {
            debug!(iterations = iteration, change, "loop corrections converged");
            return (iteration, true);
        }
    }

    warn!(max_iterations, "loop corrections did not converge");
    (max_iterations, false)
}
