//! Load and save project files.

use dn_project::{GroundDef, ProjectError, ValidationError, load_yaml, save_yaml};
use std::path::PathBuf;

const RING: &str = r#"
version: 1
name: Ring district
network:
  kind: heating
  nodes:
    - { id: plant, role: plant }
    - { id: j1, role: junction }
    - { id: c1, role: consumer, building: school }
    - { id: c2, role: consumer, building: hall }
  pipes:
    - { id: main, start: plant, end: j1, length_m: 120.0 }
    - { id: east, start: j1, end: c1, length_m: 200.0, dn: DN80 }
    - { id: link, start: c1, end: c2, length_m: 90.0 }
    - { id: west, start: c2, end: j1, length_m: 210.0 }
solver:
  max_outer_iterations: 12
ground: { type: constant, temperature_k: 282.0 }
buildings:
  - name: school
    demand: { type: constant, load_w: 120000.0, target_supply_k: 348.15 }
  - name: hall
    hex: { design_delta_t_k: 25.0 }
    demand: { type: series, load_w: [1.0, 2.0, 3.0], target_supply_k: [343.0, 343.0, 343.0] }
hours: 3
"#;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dn-project-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join("project.yaml")
}

#[test]
fn load_then_save_round_trips() {
    let path = scratch("roundtrip");
    std::fs::write(&path, RING).unwrap();
    let project = load_yaml(&path).unwrap();

    assert_eq!(project.network.nodes.len(), 4);
    assert_eq!(project.solver.max_outer_iterations, 12);
    assert_eq!(project.solver.max_loop_iterations, 100);
    assert_eq!(project.buildings[1].hex.design_delta_t_k, 25.0);
    assert_eq!(project.buildings[1].hex.approach_k, 3.0);
    assert!(matches!(project.ground, GroundDef::Constant { .. }));

    let copy = path.with_file_name("copy.yaml");
    save_yaml(&copy, &project).unwrap();
    assert_eq!(load_yaml(&copy).unwrap(), project);
}

#[test]
fn invalid_file_is_rejected_on_load() {
    let path = scratch("invalid");
    std::fs::write(&path, RING.replace("hours: 3", "hours: 4")).unwrap();
    let err = load_yaml(&path).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::SeriesLength { .. })
    ));
}

#[test]
fn malformed_yaml_is_a_yaml_error() {
    let path = scratch("malformed");
    std::fs::write(&path, "version: [").unwrap();
    assert!(matches!(load_yaml(&path), Err(ProjectError::Yaml(_))));
}

#[test]
fn demo_project_loads() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/village.yaml");
    let project = load_yaml(&path).unwrap();
    assert_eq!(project.horizon(), 6);
    assert_eq!(project.buildings.len(), 5);
    assert!(matches!(project.ground, GroundDef::Constant { .. }));
}
