//! Content-based hashing for run IDs.

use dn_project::Project;
use sha2::{Digest, Sha256};

/// SHA-256 of the serialized project and the solver version.
pub fn compute_run_id(project: &Project, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let project_json = serde_json::to_string(project).unwrap_or_default();
    hasher.update(project_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dn_project::*;

    fn project(name: &str) -> Project {
        Project {
            version: 1,
            name: name.to_string(),
            network: NetworkDef {
                kind: Default::default(),
                nodes: vec![],
                pipes: vec![],
            },
            constants: Default::default(),
            solver: Default::default(),
            design: Default::default(),
            catalog: None,
            sizing: SizingDef::SizeFromFlow,
            ground: GroundDef::Constant {
                temperature_k: 283.15,
            },
            buildings: vec![],
            hours: Some(24),
        }
    }

    #[test]
    fn hash_stability() {
        let p = project("a");
        assert_eq!(compute_run_id(&p, "v1"), compute_run_id(&p, "v1"));
        assert_eq!(compute_run_id(&p, "v1").len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let a = project("a");
        let mut b = project("a");
        b.hours = Some(48);
        assert_ne!(compute_run_id(&a, "v1"), compute_run_id(&b, "v1"));
        assert_ne!(compute_run_id(&a, "v1"), compute_run_id(&a, "v2"));
    }
}
