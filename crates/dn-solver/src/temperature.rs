//! Temperature propagation along the supply and return lines.
//!
//! Both lines use the same traversal: a node is mixed once every edge feeding
//! it has a known outlet temperature, then its temperature is pushed through
//! the pipes leaving it. Meshed networks can stall on circular dependencies;
//! the traversal then seeds one pending pipe outlet and repeats whole passes
//! until the outlets stop moving.

use dn_components::common::EPSILON_MDOT;
use dn_components::thermal::{heat_loss, pipe_outlet_temperature};
use dn_components::{NetworkKind, SubstationOutput};
use dn_core::{max_abs_diff, nanmean};
use dn_graph::incidence::DirectedAdjacency;
use tracing::{debug, warn};

use crate::model::NetworkModel;

/// Per-timestep inputs shared by the supply and return passes.
#[derive(Debug, Clone, Copy)]
pub struct ThermalNetwork<'a> {
    pub model: &'a NetworkModel,
    /// Adjacency in supply flow direction.
    pub adjacency: &'a DirectedAdjacency,
    pub flows: &'a [f64],
    /// Conduction coefficient per edge [W/K].
    pub conduction: &'a [f64],
    pub ground_k: f64,
}

/// Supply-line temperatures for one plant temperature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SupplyPass {
    pub node_k: Vec<Option<f64>>,
    pub edge_in_k: Vec<Option<f64>>,
    pub edge_out_k: Vec<Option<f64>>,
    pub passes: usize,
    pub converged: bool,
}

/// Outcome of the plant temperature search.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SupplySolution {
    pub plant_k: f64,
    pub pass: SupplyPass,
    pub iterations: usize,
    pub converged: bool,
    /// Consumers whose temperature was set to their target after the drift bound was hit.
    pub forced: Vec<usize>,
}

/// Return-line node temperatures.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReturnSolution {
    pub node_k: Vec<Option<f64>>,
    pub passes: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
enum Outlet {
    Pending,
    Seeded(f64),
    Done(Option<f64>),
}

impl Outlet {
    fn value(self) -> Option<f64> {
        match self {
            Outlet::Pending => None,
            Outlet::Seeded(t) => Some(t),
            Outlet::Done(t) => t,
        }
    }
}

struct Sweep {
    node_k: Vec<Option<f64>>,
    outlet_k: Vec<Option<f64>>,
    seeded: usize,
}

/// One propagation direction.
struct Propagation<'a> {
    incoming: &'a [Vec<usize>],
    outgoing: &'a [Vec<usize>],
    flows: &'a [f64],
    conduction: &'a [f64],
    ground_k: f64,
    cp: f64,
    max_drop_k: f64,
}

impl Propagation<'_> {
    fn mix(&self, node: usize, outlets: &[Outlet], injection: &[(f64, Option<f64>)]) -> Option<f64> {
        let mut m_sum = 0.0;
        let mut mt_sum = 0.0;
        if let Some(&(m, Some(t))) = injection.get(node) {
            if m > EPSILON_MDOT {
                m_sum += m;
                mt_sum += m * t;
            }
        }
        for &e in &self.incoming[node] {
            let m = self.flows[e].abs();
            if let Some(t) = outlets[e].value() {
                if m > EPSILON_MDOT {
                    m_sum += m;
                    mt_sum += m * t;
                }
            }
        }
        (m_sum > EPSILON_MDOT).then(|| mt_sum / m_sum)
    }

    fn emit(&self, node: usize, t: Option<f64>, outlets: &mut [Outlet]) {
        for &e in &self.outgoing[node] {
            outlets[e] = Outlet::Done(t.and_then(|t| {
                pipe_outlet_temperature(
                    t,
                    self.flows[e],
                    self.conduction[e],
                    self.ground_k,
                    self.cp,
                    self.max_drop_k,
                )
            }));
        }
    }

    fn sweep(
        &self,
        fixed: &[(usize, f64)],
        injection: &[(f64, Option<f64>)],
        previous: Option<&[Option<f64>]>,
        fallback: Option<f64>,
    ) -> Sweep {
        let n_nodes = self.incoming.len();
        let n_edges = self.flows.len();
        let mut nodes: Vec<Option<Option<f64>>> = vec![None; n_nodes];
        let mut outlets = vec![Outlet::Pending; n_edges];
        for &(node, t) in fixed {
            nodes[node] = Some(Some(t));
            self.emit(node, Some(t), &mut outlets);
        }

        let mut seeded = 0;
        loop {
            let mut progress = false;
            for node in 0..n_nodes {
                if nodes[node].is_some() {
                    continue;
                }
                let ready = self.incoming[node]
                    .iter()
                    .all(|&e| !matches!(outlets[e], Outlet::Pending));
                if !ready {
                    continue;
                }
                let t = self.mix(node, &outlets, injection);
                nodes[node] = Some(t);
                self.emit(node, t, &mut outlets);
                progress = true;
            }
            if nodes.iter().all(Option::is_some) {
                break;
            }
            if progress {
                continue;
            }

            let Some(edge) = (0..n_edges).find(|&e| matches!(outlets[e], Outlet::Pending)) else {
                break;
            };
            let guess = previous
                .and_then(|p| p.get(edge).copied().flatten())
                .or_else(|| nanmean(nodes.iter().map(|t| t.flatten())))
                .or(fallback);
            outlets[edge] = guess.map_or(Outlet::Done(None), Outlet::Seeded);
            seeded += 1;
        }

        Sweep {
            node_k: nodes.into_iter().map(Option::flatten).collect(),
            outlet_k: outlets.iter().map(|o| o.value()).collect(),
            seeded,
        }
    }

    /// Repeat sweeps until seeded outlets settle. Returns `(sweep, passes, converged)`.
    fn relax(
        &self,
        fixed: &[(usize, f64)],
        injection: &[(f64, Option<f64>)],
        fallback: Option<f64>,
        model: &NetworkModel,
    ) -> (Sweep, usize, bool) {
        let tolerance = model.config.relaxation_tolerance_k;
        let max_passes = model.config.max_relaxation_passes;
        let mut state = self.sweep(fixed, injection, None, fallback);
        let mut passes = 1;
        while state.seeded > 0 {
            if passes >= max_passes {
                warn!(passes, "temperature relaxation did not converge");
                return (state, passes, false);
            }
            let next = self.sweep(fixed, injection, Some(&state.outlet_k), fallback);
            passes += 1;
            let change = max_abs_diff(&next.outlet_k, &state.outlet_k);
            state = next;
            if change < tolerance {
                debug!(passes, change, "temperature relaxation converged");
                return (state, passes, true);
            }
        }
        (state, passes, true)
    }
}

impl ThermalNetwork<'_> {
    fn propagation<'b>(&'b self, adjacency: &'b DirectedAdjacency) -> Propagation<'b> {
        Propagation {
            incoming: &adjacency.incoming,
            outgoing: &adjacency.outgoing,
            flows: self.flows,
            conduction: self.conduction,
            ground_k: self.ground_k,
            cp: self.model.cp(),
            max_drop_k: self.model.config.max_pipe_temperature_drop_k,
        }
    }
}

/// Supply temperatures with every plant held at `plant_k`.
pub fn supply_pass(net: &ThermalNetwork<'_>, plant_k: f64) -> SupplyPass {
    let fixed: Vec<(usize, f64)> = net
        .model
        .network
        .plants()
        .iter()
        .map(|p| (p.slot(), plant_k))
        .collect();
    let (sweep, passes, converged) =
        net.propagation(net.adjacency)
            .relax(&fixed, &[], Some(plant_k), net.model);

    let mut edge_in_k = vec![None; net.flows.len()];
    for (node, edges) in net.adjacency.outgoing.iter().enumerate() {
        for &e in edges {
            edge_in_k[e] = sweep.node_k[node];
        }
    }
    SupplyPass {
        node_k: sweep.node_k,
        edge_in_k,
        edge_out_k: sweep.outlet_k,
        passes,
        converged,
    }
}

/// Largest miss of a consumer target in the direction that matters for `kind`.
fn worst_shortfall(kind: NetworkKind, node_k: &[Option<f64>], targets: &[Option<f64>]) -> f64 {
    let sign = match kind {
        NetworkKind::Heating => 1.0,
        NetworkKind::Cooling => -1.0,
    };
    node_k
        .iter()
        .zip(targets)
        .filter_map(|(t, target)| Some(sign * (target.as_ref()? - t.as_ref()?)))
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Move the plant temperature until every reached consumer meets its target.
///
/// Heating raises the plant temperature by the largest deficit, cooling lowers
/// it by the largest excess. Once the drift from `initial_plant_k` reaches its
/// bound, consumers still missing their target are set to it and reported in
/// [`SupplySolution::forced`].
pub fn search_plant_temperature(
    net: &ThermalNetwork<'_>,
    targets: &[Option<f64>],
    initial_plant_k: f64,
) -> SupplySolution {
    let config = &net.model.config;
    let kind = net.model.kind;
    let (direction, max_drift) = match kind {
        NetworkKind::Heating => (1.0, config.max_plant_drift_heating_k),
        NetworkKind::Cooling => (-1.0, config.max_plant_drift_cooling_k),
    };
    let tolerance = config.consumer_tolerance_k;

    let mut plant_k = initial_plant_k;
    let mut iteration = 0;
    loop {
        iteration += 1;
        let pass = supply_pass(net, plant_k);
        let shortfall = worst_shortfall(kind, &pass.node_k, targets);
        if shortfall <= tolerance {
            return SupplySolution {
                plant_k,
                pass,
                iterations: iteration,
                converged: true,
                forced: Vec::new(),
            };
        }

        let drift = (plant_k - initial_plant_k).abs();
        if drift >= max_drift || iteration >= config.max_plant_iterations {
            warn!(
                plant_k,
                drift,
                shortfall,
                "plant temperature bound reached; forcing consumer temperatures"
            );
            return force_targets(net, plant_k, pass, targets, iteration);
        }
        plant_k += direction * shortfall;
    }
}

fn force_targets(
    net: &ThermalNetwork<'_>,
    plant_k: f64,
    mut pass: SupplyPass,
    targets: &[Option<f64>],
    iterations: usize,
) -> SupplySolution {
    let model = net.model;
    let sign = match model.kind {
        NetworkKind::Heating => 1.0,
        NetworkKind::Cooling => -1.0,
    };
    let tolerance = model.config.consumer_tolerance_k;
    let mut forced = Vec::new();
    for node in 0..pass.node_k.len() {
        let (Some(t), Some(target)) = (pass.node_k[node], targets.get(node).copied().flatten()) else {
            continue;
        };
        if sign * (target - t) <= tolerance {
            continue;
        }
        pass.node_k[node] = Some(target);
        for &e in &net.adjacency.outgoing[node] {
            pass.edge_in_k[e] = Some(target);
            pass.edge_out_k[e] = pipe_outlet_temperature(
                target,
                net.flows[e],
                net.conduction[e],
                net.ground_k,
                model.cp(),
                model.config.max_pipe_temperature_drop_k,
            );
        }
        forced.push(node);
    }
    SupplySolution {
        plant_k,
        pass,
        iterations,
        converged: false,
        forced,
    }
}

/// Return temperatures from substation outlets mixed back towards the plants.
pub fn return_pass(net: &ThermalNetwork<'_>, substations: &[SubstationOutput]) -> ReturnSolution {
    let injection: Vec<(f64, Option<f64>)> = substations
        .iter()
        .map(|s| (s.mass_flow_kgps, s.return_temperature_k))
        .collect();
    let fallback = nanmean(
        substations
            .iter()
            .filter(|s| s.mass_flow_kgps > EPSILON_MDOT)
            .map(|s| s.return_temperature_k),
    );
    let reversed = net.adjacency.reversed();
    let (sweep, passes, converged) =
        net.propagation(&reversed)
            .relax(&[], &injection, fallback, net.model);
    ReturnSolution {
        node_k: sweep.node_k,
        passes,
        converged,
    }
}

/// Heat delivered by each plant [W]; negative for cooling networks.
///
/// `plant_flow_kgps` is the flow through one plant.
pub fn plant_heat(
    model: &NetworkModel,
    supply_k: &[Option<f64>],
    return_k: &[Option<f64>],
    plant_flow_kgps: f64,
) -> Vec<f64> {
    model
        .network
        .plants()
        .iter()
        .map(|p| {
            let s = supply_k.get(p.slot()).copied().flatten();
            let r = return_k.get(p.slot()).copied().flatten();
            match (s, r) {
                (Some(s), Some(r)) => model.cp() * (s - r) * plant_flow_kgps.abs(),
                _ => 0.0,
            }
        })
        .collect()
}

/// Supply-line heat loss per edge [W].
pub fn edge_heat_loss(model: &NetworkModel, pass: &SupplyPass, flows: &[f64]) -> Vec<f64> {
    flows
        .iter()
        .enumerate()
        .map(|(e, &m)| heat_loss(m, pass.edge_in_k[e], pass.edge_out_k[e], model.cp()))
        .collect()
}
