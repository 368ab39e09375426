//! Multi-hour runs through the public driver.

use dn_components::{BuildingLoad, DeltaTSubstation, HexSpec, NetworkKind, PipeCatalog};
use dn_fluids::PhysicalConstants;
use dn_graph::{NetworkBuilder, NodeRole};
use dn_sim::{BuildingSeries, DesignConfig, RunOptions, SimError, SimulationInput, SizingMode, run_year};
use dn_solver::SolverConfig;

fn daily_profile(peak_w: f64, hours: usize) -> Vec<BuildingLoad> {
    (0..hours)
        .map(|h| BuildingLoad {
            load_w: if h % 6 == 5 { 0.0 } else { peak_w * (0.5 + 0.5 * (h as f64 / hours as f64)) },
            target_supply_k: Some(348.15),
        })
        .collect()
}

fn ring_input(hours: usize) -> SimulationInput {
    let mut b = NetworkBuilder::new();
    let p = b.add_node("P", NodeRole::Plant);
    let j1 = b.add_node("J1", NodeRole::Junction);
    let c1 = b.add_consumer("C1", "B1");
    let c2 = b.add_consumer("C2", "B2");
    b.add_pipe("e0", p, j1, 80.0);
    b.add_pipe("e1", j1, c1, 200.0);
    b.add_pipe("e2", c1, c2, 120.0);
    b.add_pipe("e3", c2, j1, 220.0);
    let network = b.build().unwrap();

    SimulationInput {
        network,
        kind: NetworkKind::Heating,
        consts: PhysicalConstants::default(),
        solver: SolverConfig::default(),
        design: DesignConfig {
            top_hours: 4,
            ..Default::default()
        },
        catalog: PipeCatalog::standard(),
        sizing: SizingMode::SizeFromFlow,
        ground_k: vec![281.15; hours],
        buildings: vec![
            BuildingSeries {
                name: "B1".into(),
                node: c1,
                hex: HexSpec::default(),
                loads: daily_profile(250e3, hours),
            },
            BuildingSeries {
                name: "B2".into(),
                node: c2,
                hex: HexSpec::default(),
                loads: daily_profile(150e3, hours),
            },
        ],
        hours,
    }
}

#[test]
fn meshed_year_slice_runs_in_hour_order() {
    let input = ring_input(12);
    let sub = DeltaTSubstation::new(NetworkKind::Heating, input.consts.cp_j_kgk);
    let run = run_year(&input, &sub, RunOptions { threads: 2 }).unwrap();

    assert_eq!(run.hours.len(), 12);
    assert!(run.hours.iter().enumerate().all(|(i, h)| h.hour == i));
    assert!(run.hours[5].report.degenerate);
    assert!(run.hours[11].report.degenerate);
    assert_eq!(run.design.records.len(), 4);
    assert!(run.design.sizing.undersized.is_empty());

    for h in run.hours.iter().filter(|h| !h.report.degenerate) {
        assert!(h.edge_mass_flow_kgps.iter().all(|&m| m >= 0.0));
        assert!(h.plant_heat_w[0] > 0.0);
        assert!(h.report.loop_residual_pa < 5000.0);
    }
}

#[test]
fn thread_count_does_not_change_results() {
    let input = ring_input(6);
    let sub = DeltaTSubstation::new(NetworkKind::Heating, input.consts.cp_j_kgk);
    let a = run_year(&input, &sub, RunOptions { threads: 1 }).unwrap();
    let b = run_year(&input, &sub, RunOptions::default()).unwrap();
    assert_eq!(a.hours, b.hours);
}

#[test]
fn short_series_is_rejected() {
    let mut input = ring_input(6);
    input.ground_k.truncate(3);
    let sub = DeltaTSubstation::new(NetworkKind::Heating, input.consts.cp_j_kgk);
    let err = run_year(&input, &sub, RunOptions::default()).unwrap_err();
    assert!(matches!(err, SimError::InputLength { expected: 6, actual: 3, .. }));
}
