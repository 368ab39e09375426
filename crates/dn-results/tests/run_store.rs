use dn_components::NetworkKind;
use dn_results::*;

fn run(run_id: &str) -> (RunManifest, Vec<HourRecord>) {
    let manifest = RunManifest {
        run_id: run_id.to_string(),
        project_name: "ring".to_string(),
        timestamp: "2026-03-01T12:00:00+00:00".to_string(),
        solver_version: "0.1.0".to_string(),
        kind: NetworkKind::Cooling,
        hours: 3,
        node_names: vec!["P".into(), "J".into(), "C".into()],
        edge_names: vec!["p0".into(), "p1".into()],
        plant_names: vec!["P".into()],
        pipe_sizes: vec!["DN80".into(), "DN50".into()],
        undersized_edges: vec![],
        unconverged_hours: vec![2],
    };
    let records = (0..3)
        .map(|h| HourRecord {
            hour: h,
            mass_flow_kgps: vec![2.0, 2.0],
            reversed: vec![false, true],
            supply_k: vec![Some(279.0), Some(279.1), Some(279.2)],
            return_k: vec![Some(289.0), Some(289.0), Some(289.0)],
            heat_loss_w: vec![-40.0, -25.0],
            plant_heat_w: vec![-83_700.0],
            plant_supply_k: Some(279.0),
            supply_pa: vec![0.0, -800.0, -1500.0],
            return_pa: vec![0.0, 800.0, 1500.0],
            pressure_loss_pa: [1500.0, 1500.0, 3000.0],
            convergence: ConvergenceSummary::default(),
        })
        .collect();
    (manifest, records)
}

#[test]
fn stored_run_exports_to_csv_file() {
    let dir = std::env::temp_dir().join(format!("dn_results_it_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let store = RunStore::new(dir.join("runs")).unwrap();

    let (manifest, records) = run("abc");
    store.save_run(&manifest, &records).unwrap();
    let loaded = store.load_run("abc").unwrap();
    assert_eq!(loaded.manifest.kind, NetworkKind::Cooling);
    assert_eq!(loaded.records.len(), 3);
    assert!(loaded.plant_energy_wh()[0] < 0.0);

    let out = dir.join("plant_heat.csv");
    export_csv_path(&loaded, "plant_heat".parse().unwrap(), &out).unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert_eq!(text.lines().next(), Some("hour,P"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn run_id_is_content_hash() {
    let yaml = r#"
version: 1
name: ring
network:
  nodes:
    - { id: P, role: plant }
    - { id: C, role: consumer, building: B }
  pipes:
    - { id: p0, start: P, end: C, length_m: 80.0 }
ground: { type: constant, temperature_k: 283.15 }
buildings:
  - name: B
    demand: { type: constant, load_w: 20000.0, target_supply_k: 343.15 }
hours: 4
"#;
    let project: dn_project::Project = serde_yaml::from_str(yaml).unwrap();
    let a = compute_run_id(&project, "0.1.0");
    let mut edited = project.clone();
    edited.network.pipes[0].length_m = 81.0;
    assert_ne!(a, compute_run_id(&edited, "0.1.0"));
    assert_eq!(a, compute_run_id(&project, "0.1.0"));
}
