//! Project loading, saving, validation, and introspection.

use std::path::Path;

use dn_components::NetworkKind;
use dn_graph::NodeRole;
use dn_project::Project;

use crate::compile::compile_network;
use crate::error::{AppError, AppResult};

/// Headline figures of a project for listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub name: String,
    pub kind: NetworkKind,
    pub plants: usize,
    pub consumers: usize,
    pub junctions: usize,
    pub pipes: usize,
    pub loops: usize,
    pub total_length_m: f64,
    pub hours: usize,
}

/// Load a project from a YAML file. The content is not validated.
pub fn load_project(path: &Path) -> AppResult<Project> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ProjectFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_yaml::from_str(&content)
        .map_err(|e| AppError::Project(format!("Failed to parse project YAML: {}", e)))
}

pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    let content = serde_yaml::to_string(project)
        .map_err(|e| AppError::Project(format!("Failed to serialize project: {}", e)))?;

    std::fs::write(path, content).map_err(|e| AppError::ProjectFileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Schema checks followed by a full topology build.
pub fn validate_project(project: &Project) -> AppResult<()> {
    dn_project::validate_project(project)?;
    compile_network(&project.network)?;
    Ok(())
}

pub fn summarize_project(project: &Project) -> AppResult<ProjectSummary> {
    let network = compile_network(&project.network)?;
    let count = |role: NodeRole| network.nodes().iter().filter(|n| n.role == role).count();
    Ok(ProjectSummary {
        name: project.name.clone(),
        kind: project.network.kind,
        plants: count(NodeRole::Plant),
        consumers: count(NodeRole::Consumer),
        junctions: count(NodeRole::Junction),
        pipes: network.edge_count(),
        loops: network.loops().len(),
        total_length_m: network.lengths().iter().sum(),
        hours: project.horizon(),
    })
}
