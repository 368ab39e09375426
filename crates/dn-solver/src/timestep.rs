//! One steady-state hour: substations, hydraulics and temperatures in a fixed-point loop.

use dn_components::common::EPSILON_MDOT;
use dn_components::{BuildingLoad, HexSpec, NetworkKind, SubstationModel, SubstationOutput};
use dn_core::max_abs_diff;
use dn_graph::incidence::DirectedAdjacency;
use dn_graph::{NodeRole, Orientation};
use tracing::{debug, warn};

use crate::error::{SolverError, SolverResult};
use crate::hydraulic::{HydraulicReport, demand_vector, solve_normalized};
use crate::model::NetworkModel;
use crate::pressure::solve_pressures;
use crate::temperature::{
    SupplySolution, ThermalNetwork, edge_heat_loss, plant_heat, return_pass,
    search_plant_temperature,
};

/// Per-node building data for one hour. Entries of non-consumer nodes are ignored.
#[derive(Debug, Clone, Copy)]
pub struct TimestepInput<'a> {
    pub hour: usize,
    pub ground_k: f64,
    pub loads: &'a [BuildingLoad],
    pub hex: &'a [HexSpec],
}

/// Iteration counts and residuals of one hour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConvergenceReport {
    /// No consumer had demand; the hour was not solved.
    pub degenerate: bool,
    pub outer_iterations: usize,
    pub outer_converged: bool,
    /// Worst over all mass-flow solves of the hour.
    pub hydraulic_iterations: usize,
    pub hydraulic_converged: bool,
    pub orientation_passes: usize,
    pub reversed_edges: usize,
    pub mass_residual_kgps: f64,
    pub loop_residual_pa: f64,
    pub plant_iterations: usize,
    pub plant_converged: bool,
    pub forced_consumers: usize,
    pub relaxation_passes: usize,
    pub min_flow_iterations: usize,
    pub min_flow_converged: bool,
}

impl ConvergenceReport {
    fn absorb_hydraulic(&mut self, h: &HydraulicReport) {
        self.hydraulic_iterations = self.hydraulic_iterations.max(h.loop_iterations);
        self.hydraulic_converged &= h.converged;
        self.orientation_passes = self.orientation_passes.max(h.orientation_passes);
        self.mass_residual_kgps = h.mass_residual_kgps;
        self.loop_residual_pa = h.loop_residual_pa;
    }

    fn absorb_supply(&mut self, s: &SupplySolution) {
        self.plant_iterations = self.plant_iterations.max(s.iterations);
        self.plant_converged = s.converged;
        self.forced_consumers = s.forced.len();
        self.relaxation_passes = self.relaxation_passes.max(s.pass.passes);
    }

    /// True when every loop of the hour met its tolerance.
    pub fn fully_converged(&self) -> bool {
        self.degenerate
            || (self.outer_converged
                && self.hydraulic_converged
                && self.plant_converged
                && self.min_flow_converged)
    }
}

/// Full state of the network for one hour.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimestepResult {
    pub hour: usize,
    /// Flow per edge [kg/s], non-negative; `reversed` gives its direction.
    pub edge_mass_flow_kgps: Vec<f64>,
    /// Edges carrying flow against their declared direction.
    pub reversed: Vec<bool>,
    pub node_supply_k: Vec<Option<f64>>,
    pub node_return_k: Vec<Option<f64>>,
    pub edge_heat_loss_w: Vec<f64>,
    /// Heat per plant [W]; negative for cooling.
    pub plant_heat_w: Vec<f64>,
    pub plant_supply_k: Option<f64>,
    pub node_supply_pa: Vec<f64>,
    pub node_return_pa: Vec<f64>,
    /// `[supply, return, total]` pipe losses [Pa].
    pub pressure_loss_pa: [f64; 3],
    pub consumer_flow_kgps: Vec<f64>,
    pub report: ConvergenceReport,
}

impl TimestepResult {
    fn degenerate(model: &NetworkModel, hour: usize) -> Self {
        let n = model.node_count();
        let e = model.edge_count();
        Self {
            hour,
            edge_mass_flow_kgps: vec![0.0; e],
            reversed: vec![false; e],
            node_supply_k: vec![None; n],
            node_return_k: vec![None; n],
            edge_heat_loss_w: vec![0.0; e],
            plant_heat_w: vec![0.0; model.network.plants().len()],
            plant_supply_k: None,
            node_supply_pa: vec![0.0; n],
            node_return_pa: vec![0.0; n],
            pressure_loss_pa: [0.0; 3],
            consumer_flow_kgps: vec![0.0; n],
            report: ConvergenceReport {
                degenerate: true,
                outer_converged: true,
                hydraulic_converged: true,
                plant_converged: true,
                min_flow_converged: true,
                ..Default::default()
            },
        }
    }

    /// Total flow leaving the plants [kg/s].
    pub fn total_flow_kgps(&self) -> f64 {
        self.consumer_flow_kgps.iter().sum()
    }
}

/// Hydraulic state after minimum-flow enforcement.
struct FlowState {
    substations: Vec<SubstationOutput>,
    flows: Vec<f64>,
}

fn call_substations(
    model: &NetworkModel,
    substation: &dyn SubstationModel,
    input: &TimestepInput<'_>,
    supply_k: impl Fn(usize) -> f64,
) -> SolverResult<Vec<SubstationOutput>> {
    let mut out = vec![SubstationOutput::IDLE; model.node_count()];
    for c in model.network.consumers() {
        let slot = c.slot();
        let load = input.loads.get(slot).copied().unwrap_or_default();
        if !load.is_active() {
            continue;
        }
        let hex = input.hex.get(slot).copied().unwrap_or_default();
        out[slot] = substation.solve(supply_k(slot), &load, &hex)?;
    }
    Ok(out)
}

/// First consumer reached by following outflow edges that carry flow from `node`.
fn downstream_consumer(
    model: &NetworkModel,
    orientation: &Orientation,
    adjacency: &DirectedAdjacency,
    flows: &[f64],
    node: usize,
) -> Option<usize> {
    let inc = model.network.incidence();
    let nodes = model.network.nodes();
    let mut current = node;
    for _ in 0..=model.node_count() {
        if nodes[current].role == NodeRole::Consumer {
            return Some(current);
        }
        let &edge = adjacency.outgoing[current]
            .iter()
            .find(|&&e| flows[e] > EPSILON_MDOT)?;
        current = inc.endpoints(edge, orientation).1;
    }
    None
}

/// Supply temperature seen by each node: solved, else its target, else the plant guess.
fn known_supply(supply_k: &[Option<f64>], targets: &[Option<f64>], plant_k: f64) -> Vec<f64> {
    supply_k
        .iter()
        .zip(targets)
        .map(|(t, target)| t.or(*target).unwrap_or(plant_k))
        .collect()
}

/// Raise a substation's flow by `delta` at constant heat duty.
fn add_flow(sub: &mut SubstationOutput, delta: f64, supply_k: f64) {
    let m = sub.mass_flow_kgps;
    let t_ret = sub.return_temperature_k.unwrap_or(supply_k);
    let total = m + delta;
    sub.return_temperature_k = Some(supply_k - m / total * (supply_k - t_ret));
    sub.mass_flow_kgps = total;
}

/// Edges carrying flow, but less than the minimum less its slack.
fn starved_edges(flows: &[f64], threshold: f64) -> Vec<usize> {
    (0..flows.len())
        .filter(|&e| flows[e].abs() > EPSILON_MDOT && flows[e].abs() < threshold)
        .collect()
}

/// Solve flows, nudging consumers downstream of starved edges until every
/// flowing edge carries the minimum flow or the cap is reached.
///
/// Idle edges are left alone. Only consumers that already draw flow are nudged.
fn enforce_min_flow(
    model: &NetworkModel,
    orientation: &mut Orientation,
    mut substations: Vec<SubstationOutput>,
    supply_k: &[f64],
    edge_t_k: &[Option<f64>],
    report: &mut ConvergenceReport,
) -> SolverResult<FlowState> {
    let config = &model.config;
    let inc = model.network.incidence();
    let threshold = config.min_edge_flow_kgps - config.min_edge_flow_slack_kgps;
    let mut iterations = 0;
    loop {
        let consumer_flows: Vec<f64> = substations.iter().map(|s| s.mass_flow_kgps).collect();
        let demand = demand_vector(model, &consumer_flows);
        let (flows, hydraulic) = solve_normalized(model, orientation, &demand, edge_t_k)?;
        report.absorb_hydraulic(&hydraulic);

        let low = starved_edges(&flows, threshold);
        report.min_flow_iterations = report.min_flow_iterations.max(iterations);
        if low.is_empty() {
            return Ok(FlowState { substations, flows });
        }
        if iterations >= config.max_min_flow_iterations {
            warn!(edges = low.len(), iterations, "minimum edge flow not reached");
            report.min_flow_converged = false;
            return Ok(FlowState { substations, flows });
        }

        let delta = low
            .iter()
            .map(|&e| (flows[e].abs() - config.min_edge_flow_kgps).abs())
            .fold(0.0, f64::max);
        let active: Vec<usize> = model
            .network
            .consumers()
            .iter()
            .map(|c| c.slot())
            .filter(|&c| substations[c].mass_flow_kgps > EPSILON_MDOT)
            .collect();
        let mut targets: Vec<usize> = if iterations < config.targeted_min_flow_iterations {
            let adjacency = inc.adjacency(orientation);
            low.iter()
                .filter_map(|&e| {
                    let (_, to) = inc.endpoints(e, orientation);
                    downstream_consumer(model, orientation, &adjacency, &flows, to)
                })
                .filter(|c| active.contains(c))
                .collect()
        } else {
            active.clone()
        };
        targets.sort_unstable();
        targets.dedup();

        if targets.len() * 2 >= model.network.consumers().len() {
            targets = active;
        }
        if targets.is_empty() {
            warn!(edges = low.len(), "starved edges reach no consumer");
            report.min_flow_converged = false;
            return Ok(FlowState { substations, flows });
        }
        for &c in &targets {
            add_flow(&mut substations[c], delta, supply_k[c]);
        }
        iterations += 1;
        debug!(iteration = iterations, delta, nudged = targets.len(), "raised consumer flows");
    }
}

/// Solve one hour.
///
/// `substation` supplies each active consumer's flow and return temperature.
/// Non-convergence of any inner loop is logged and reported, not returned as an error.
pub fn solve_timestep(
    model: &NetworkModel,
    substation: &dyn SubstationModel,
    input: &TimestepInput<'_>,
) -> SolverResult<TimestepResult> {
    let n = model.node_count();
    if input.loads.len() != n || input.hex.len() != n {
        return Err(SolverError::ProblemSetup {
            what: format!(
                "hour {}: {} loads and {} heat exchangers for {} nodes",
                input.hour,
                input.loads.len(),
                input.hex.len(),
                n
            ),
        });
    }

    let mut targets: Vec<Option<f64>> = vec![None; n];
    for c in model.network.consumers() {
        let load = input.loads[c.slot()];
        if load.is_active() {
            targets[c.slot()] = load.target_supply_k;
        }
    }
    let active = targets.iter().flatten().copied();
    let plant_guess = match model.kind {
        NetworkKind::Heating => active.fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.max(t)))),
        NetworkKind::Cooling => active.fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.min(t)))),
    };
    let Some(plant_guess) = plant_guess else {
        debug!(hour = input.hour, "no demand; skipping hour");
        return Ok(TimestepResult::degenerate(model, input.hour));
    };

    let config = &model.config;
    let inc = model.network.incidence();
    let mut report = ConvergenceReport {
        hydraulic_converged: true,
        min_flow_converged: true,
        ..Default::default()
    };
    let mut orientation = model.network.base_orientation().clone();

    // Initialisation at the consumer targets.
    let mut supply_k = targets.clone();
    let initial = call_substations(model, substation, input, |_| plant_guess)?;
    let mut edge_t_k = model.edge_temperatures(&orientation, &supply_k);
    let consumer_flows: Vec<f64> = initial.iter().map(|s| s.mass_flow_kgps).collect();
    let (flows, hydraulic) = solve_normalized(
        model,
        &mut orientation,
        &demand_vector(model, &consumer_flows),
        &edge_t_k,
    )?;
    report.absorb_hydraulic(&hydraulic);
    let conduction = model.conduction(&flows, &edge_t_k)?;
    let adjacency = inc.adjacency(&orientation);
    let mut supply = search_plant_temperature(
        &ThermalNetwork {
            model,
            adjacency: &adjacency,
            flows: &flows,
            conduction: &conduction,
            ground_k: input.ground_k,
        },
        &targets,
        plant_guess,
    );
    report.absorb_supply(&supply);
    supply_k.clone_from(&supply.pass.node_k);

    for iteration in 1..=config.max_outer_iterations {
        report.outer_iterations = iteration;
        let known = known_supply(&supply_k, &targets, plant_guess);
        let subs = call_substations(model, substation, input, |i| known[i])?;
        edge_t_k = model.edge_temperatures(&orientation, &supply_k);
        let state = enforce_min_flow(model, &mut orientation, subs, &known, &edge_t_k, &mut report)?;
        let conduction = model.conduction(&state.flows, &edge_t_k)?;
        let adjacency = inc.adjacency(&orientation);
        supply = search_plant_temperature(
            &ThermalNetwork {
                model,
                adjacency: &adjacency,
                flows: &state.flows,
                conduction: &conduction,
                ground_k: input.ground_k,
            },
            &targets,
            plant_guess,
        );
        report.absorb_supply(&supply);

        let consumers: Vec<usize> = model.network.consumers().iter().map(|c| c.slot()).collect();
        let before: Vec<Option<f64>> = consumers.iter().map(|&c| supply_k[c]).collect();
        let after: Vec<Option<f64>> = consumers.iter().map(|&c| supply.pass.node_k[c]).collect();
        let change = max_abs_diff(&after, &before);
        supply_k.clone_from(&supply.pass.node_k);

        if change < config.outer_tolerance(iteration) {
            report.outer_converged = true;
            debug!(hour = input.hour, iteration, change, "outer loop converged");
            break;
        }
    }
    if !report.outer_converged {
        warn!(
            hour = input.hour,
            iterations = report.outer_iterations,
            "outer loop did not converge"
        );
    }

    // Final pass at the converged supply temperatures.
    let known = known_supply(&supply_k, &targets, plant_guess);
    let subs = call_substations(model, substation, input, |i| known[i])?;
    edge_t_k = model.edge_temperatures(&orientation, &supply_k);
    let state = enforce_min_flow(model, &mut orientation, subs, &known, &edge_t_k, &mut report)?;
    let conduction = model.conduction(&state.flows, &edge_t_k)?;
    let adjacency = inc.adjacency(&orientation);
    let net = ThermalNetwork {
        model,
        adjacency: &adjacency,
        flows: &state.flows,
        conduction: &conduction,
        ground_k: input.ground_k,
    };
    // temperatures and losses follow the flows that are reported
    let supply = search_plant_temperature(&net, &targets, plant_guess);
    report.absorb_supply(&supply);
    let returned = return_pass(&net, &state.substations);

    let total_flow: f64 = state.substations.iter().map(|s| s.mass_flow_kgps).sum();
    let plant_flow = total_flow / model.network.plants().len().max(1) as f64;
    let plant_heat_w = plant_heat(model, &supply.pass.node_k, &returned.node_k, plant_flow);
    let pressures = solve_pressures(
        model,
        &orientation,
        &state.flows,
        &supply.pass.node_k,
        &returned.node_k,
    )?;
    let edge_heat_loss_w = edge_heat_loss(model, &supply.pass, &state.flows);

    report.relaxation_passes = report.relaxation_passes.max(returned.passes);
    report.reversed_edges = orientation.flipped_count();
    let pressure_loss_pa = pressures.aggregate();
    let consumer_flow_kgps = state
        .substations
        .iter()
        .map(|s| if s.mass_flow_kgps > EPSILON_MDOT { s.mass_flow_kgps } else { 0.0 })
        .collect();

    Ok(TimestepResult {
        hour: input.hour,
        reversed: (0..model.edge_count()).map(|e| orientation.is_flipped(e)).collect(),
        edge_mass_flow_kgps: state.flows,
        node_supply_k: supply.pass.node_k,
        node_return_k: returned.node_k,
        edge_heat_loss_w,
        plant_heat_w,
        plant_supply_k: Some(supply.plant_k),
        node_supply_pa: pressures.supply_pa,
        node_return_pa: pressures.return_pa,
        pressure_loss_pa,
        consumer_flow_kgps,
        report,
    })
}
