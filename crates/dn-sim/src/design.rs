//! Pipe sizing over the design horizon.
//!
//! Tree flows do not depend on pipe diameters, so one pass over the horizon
//! fixes them. Meshed networks redistribute flow with the diameters; they are
//! sized iteratively, first over the peak-demand hours and then over the whole
//! horizon, until no diameter moves by more than the tolerance.

use dn_components::{NetworkKind, PipeRecord, SizingOutcome, SubstationModel};
use dn_solver::{NetworkModel, demand_vector, solve_normalized};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SimError, SimResult};
use crate::input::{SimulationInput, SizingMode};

/// Settings of the iterative sizing of meshed networks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    /// Hours with the highest total demand used for the first sizing phase.
    pub top_hours: usize,
    /// Diameter every pipe starts from [m].
    pub initial_diameter_m: f64,
    pub diameter_tolerance_m: f64,
    pub max_design_passes: usize,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            top_hours: 50,
            initial_diameter_m: 0.2,
            diameter_tolerance_m: 0.005,
            max_design_passes: 10,
        }
    }
}

/// Pipe assignment and the flows it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignOutcome {
    pub records: Vec<PipeRecord>,
    pub sizing: SizingOutcome,
    /// Peak absolute flow per edge [kg/s]; empty when sizes were specified.
    pub max_flows_kgps: Vec<f64>,
    pub passes: usize,
    pub converged: bool,
}

/// Choose a catalog record for every edge.
pub fn size_network(
    input: &SimulationInput,
    substation: &dyn SubstationModel,
) -> SimResult<DesignOutcome> {
    match &input.sizing {
        SizingMode::UseSpecified(dns) => {
            let pairs: Vec<(&str, &str)> = input
                .network
                .edges()
                .iter()
                .zip(dns)
                .map(|(edge, dn)| (edge.name.as_str(), dn.as_str()))
                .collect();
            let sizing = input.catalog.assign_specified(&pairs)?;
            Ok(DesignOutcome {
                records: input.catalog.resolve(&sizing),
                sizing,
                max_flows_kgps: Vec::new(),
                passes: 0,
                converged: true,
            })
        }
        SizingMode::SizeFromFlow if input.network.is_looped() => size_looped(input, substation),
        SizingMode::SizeFromFlow => size_tree(input, substation),
    }
}

fn size_tree(input: &SimulationInput, substation: &dyn SubstationModel) -> SimResult<DesignOutcome> {
    let records = vec![initial_record(input)?; input.network.edge_count()];
    let model = model_with(input, records)?;
    let hours: Vec<usize> = (0..input.hours).collect();
    let max_flows = design_flows(&model, input, substation, &hours)?;
    let sizing = input.catalog.size_pipes(&max_flows, input.consts.rho_kg_m3);
    info!(
        edges = max_flows.len(),
        undersized = sizing.undersized.len(),
        "tree network sized"
    );
    Ok(DesignOutcome {
        records: input.catalog.resolve(&sizing),
        sizing,
        max_flows_kgps: max_flows,
        passes: 1,
        converged: true,
    })
}

fn size_looped(
    input: &SimulationInput,
    substation: &dyn SubstationModel,
) -> SimResult<DesignOutcome> {
    let records = vec![initial_record(input)?; input.network.edge_count()];
    let peak = peak_hours(input, input.design.top_hours);
    let first = iterate_sizing(input, substation, records, &peak)?;
    debug!(passes = first.passes, converged = first.converged, "peak-hour sizing done");

    let all: Vec<usize> = (0..input.hours).collect();
    let second = iterate_sizing(input, substation, first.records, &all)?;
    if !second.converged {
        warn!(
            passes = second.passes,
            "pipe diameters still changing after the last design pass"
        );
    }
    info!(
        passes = first.passes + second.passes,
        undersized = second.sizing.undersized.len(),
        "meshed network sized"
    );
    Ok(DesignOutcome {
        passes: first.passes + second.passes,
        ..second
    })
}

/// Resize until diameters settle over `hours`.
fn iterate_sizing(
    input: &SimulationInput,
    substation: &dyn SubstationModel,
    mut records: Vec<PipeRecord>,
    hours: &[usize],
) -> SimResult<DesignOutcome> {
    let rho = input.consts.rho_kg_m3;
    let mut last = None;
    for pass in 1..=input.design.max_design_passes {
        let model = model_with(input, records.clone())?;
        let max_flows = design_flows(&model, input, substation, hours)?;
        let sizing = input.catalog.size_pipes(&max_flows, rho);
        let resized = input.catalog.resolve(&sizing);
        let change = resized
            .iter()
            .zip(&records)
            .map(|(a, b)| (a.d_int_m - b.d_int_m).abs())
            .fold(0.0, f64::max);
        records = resized;
        let converged = change <= input.design.diameter_tolerance_m;
        debug!(pass, change, "design pass");
        let outcome = DesignOutcome {
            records: records.clone(),
            sizing,
            max_flows_kgps: max_flows,
            passes: pass,
            converged,
        };
        if converged {
            return Ok(outcome);
        }
        last = Some(outcome);
    }
    last.ok_or_else(|| SimError::InvalidInput {
        what: "max_design_passes must be at least 1".into(),
    })
}

fn model_with(input: &SimulationInput, records: Vec<PipeRecord>) -> SimResult<NetworkModel> {
    Ok(NetworkModel::from_records(
        input.network.clone(),
        records,
        input.kind,
        input.consts,
        input.solver.clone(),
    )?)
}

/// Catalog record closest to the initial diameter, with that exact bore.
fn initial_record(input: &SimulationInput) -> SimResult<PipeRecord> {
    let d = input.design.initial_diameter_m;
    let closest = input
        .catalog
        .records()
        .iter()
        .min_by(|a, b| (a.d_int_m - d).abs().total_cmp(&(b.d_int_m - d).abs()))
        .ok_or_else(|| SimError::InvalidInput {
            what: "pipe catalog is empty".into(),
        })?;
    Ok(PipeRecord {
        d_int_m: d,
        ..closest.clone()
    })
}

/// Indices of the `n` hours with the highest total demand, in ascending order.
pub fn peak_hours(input: &SimulationInput, n: usize) -> Vec<usize> {
    let mut hours: Vec<(usize, f64)> = (0..input.hours)
        .map(|h| (h, input.total_demand(h)))
        .collect();
    hours.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let mut top: Vec<usize> = hours.into_iter().take(n.max(1)).map(|(h, _)| h).collect();
    top.sort_unstable();
    top
}

/// Peak absolute flow per edge over `hours`.
fn design_flows(
    model: &NetworkModel,
    input: &SimulationInput,
    substation: &dyn SubstationModel,
    hours: &[usize],
) -> SimResult<Vec<f64>> {
    let hex = input.hex_per_node();
    let per_hour = hours
        .par_iter()
        .map(|&hour| hour_flows(model, input, substation, &hex, hour))
        .collect::<SimResult<Vec<_>>>()?;

    let mut max_flows = vec![0.0; model.edge_count()];
    for flows in per_hour.into_iter().flatten() {
        for (peak, m) in max_flows.iter_mut().zip(flows) {
            *peak = f64::max(*peak, m.abs());
        }
    }
    Ok(max_flows)
}

/// Flows of one hour with every consumer supplied at the hour's extreme target.
fn hour_flows(
    model: &NetworkModel,
    input: &SimulationInput,
    substation: &dyn SubstationModel,
    hex: &[dn_components::HexSpec],
    hour: usize,
) -> SimResult<Option<Vec<f64>>> {
    let loads = input.hour_loads(hour);
    let targets = loads
        .iter()
        .filter(|l| l.is_active())
        .filter_map(|l| l.target_supply_k);
    let extreme = match input.kind {
        NetworkKind::Heating => targets.reduce(f64::max),
        NetworkKind::Cooling => targets.reduce(f64::min),
    };
    let Some(supply_k) = extreme else {
        return Ok(None);
    };

    let mut consumer_flows = vec![0.0; model.node_count()];
    for (slot, load) in loads.iter().enumerate() {
        if load.is_active() {
            consumer_flows[slot] = substation.solve(supply_k, load, &hex[slot])?.mass_flow_kgps;
        }
    }
    let demand = demand_vector(model, &consumer_flows);
    let mut orientation = model.network.base_orientation().clone();
    let edge_t_k = vec![Some(supply_k); model.edge_count()];
    let (flows, _) = solve_normalized(model, &mut orientation, &demand, &edge_t_k)?;
    Ok(Some(flows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::BuildingSeries;
    use dn_components::{BuildingLoad, DeltaTSubstation, HexSpec, PipeCatalog};
    use dn_fluids::PhysicalConstants;
    use dn_graph::{NetworkBuilder, NodeRole};
    use dn_solver::SolverConfig;

    fn input(loads: Vec<f64>) -> SimulationInput {
        let mut b = NetworkBuilder::new();
        let p = b.add_node("P", NodeRole::Plant);
        let c = b.add_consumer("C", "B1");
        b.add_pipe("e0", p, c, 100.0);
        let network = b.build().unwrap();
        let hours = loads.len();
        SimulationInput {
            network,
            kind: NetworkKind::Heating,
            consts: PhysicalConstants::default(),
            solver: SolverConfig::default(),
            design: DesignConfig::default(),
            catalog: PipeCatalog::standard(),
            sizing: SizingMode::SizeFromFlow,
            ground_k: vec![283.15; hours],
            buildings: vec![BuildingSeries {
                name: "B1".into(),
                node: c,
                hex: HexSpec::default(),
                loads: loads
                    .into_iter()
                    .map(|load_w| BuildingLoad {
                        load_w,
                        target_supply_k: Some(353.15),
                    })
                    .collect(),
            }],
            hours,
        }
    }

    #[test]
    fn peak_hours_orders_by_demand() {
        let inp = input(vec![1.0, 5.0, 3.0, 5.0, 0.0]);
        assert_eq!(peak_hours(&inp, 2), vec![1, 3]);
        assert_eq!(peak_hours(&inp, 10), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn tree_is_sized_from_peak_flow() {
        let inp = input(vec![100e3, 400e3, 0.0]);
        let sub = DeltaTSubstation::new(NetworkKind::Heating, inp.consts.cp_j_kgk);
        let out = size_network(&inp, &sub).unwrap();
        let peak = 400e3 / (inp.consts.cp_j_kgk * 17.0);
        assert!((out.max_flows_kgps[0] - peak).abs() < 1e-3);
        let (idx, fits) = inp.catalog.select(peak, inp.consts.rho_kg_m3);
        assert!(fits);
        assert_eq!(out.sizing.records, vec![idx]);
        assert_eq!(out.passes, 1);
    }

    #[test]
    fn specified_sizes_must_exist() {
        let mut inp = input(vec![1.0]);
        inp.sizing = SizingMode::UseSpecified(vec!["DN9999".into()]);
        let sub = DeltaTSubstation::new(NetworkKind::Heating, inp.consts.cp_j_kgk);
        let err = size_network(&inp, &sub).unwrap_err();
        assert!(matches!(err, SimError::Component(_)));

        inp.sizing = SizingMode::UseSpecified(vec!["DN65".into()]);
        let out = size_network(&inp, &sub).unwrap();
        assert_eq!(out.records[0].dn, "DN65");
    }

    #[test]
    fn initial_record_takes_configured_bore() {
        let inp = input(vec![1.0]);
        let r = initial_record(&inp).unwrap();
        assert_eq!(r.d_int_m, 0.2);
        assert!(r.d_ext_m > r.d_int_m);
    }
}
