//! Project validation logic.
//!
//! Checks what the file format can get wrong on its own: identifiers,
//! references, physical ranges and series lengths. Topology rules
//! (connectivity, plants, self loops) are enforced when the network is built.

use crate::schema::{DemandDef, GroundDef, Project, SizingDef};
use dn_graph::NodeRole;
use std::collections::{HashMap, HashSet};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{what} covers {actual} hours, horizon is {expected}")]
    SeriesLength {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version == 0 || project.version > crate::schema::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }
    if project.horizon() == 0 {
        return Err(invalid("hours", 0, "horizon must cover at least one hour"));
    }
    project
        .constants
        .validate()
        .map_err(|e| invalid("constants", &e, "non-physical constant"))?;
    project
        .solver
        .validate()
        .map_err(|e| invalid("solver", &e, "invalid solver settings"))?;

    validate_network(project)?;
    validate_buildings(project)?;
    validate_ground(project)?;
    Ok(())
}

fn validate_network(project: &Project) -> Result<(), ValidationError> {
    let network = &project.network;
    let mut node_ids = HashSet::new();
    for node in &network.nodes {
        if !node_ids.insert(node.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: node.id.clone(),
                context: "nodes".to_string(),
            });
        }
        if node.building.is_some() && node.role != NodeRole::Consumer {
            return Err(invalid(
                format!("nodes.{}.building", node.id),
                node.building.as_deref().unwrap_or_default(),
                "only consumer nodes serve buildings",
            ));
        }
    }

    let mut pipe_ids = HashSet::new();
    for pipe in &network.pipes {
        if !pipe_ids.insert(pipe.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: pipe.id.clone(),
                context: "pipes".to_string(),
            });
        }
        for end in [&pipe.start, &pipe.end] {
            if !node_ids.contains(end.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: end.clone(),
                    context: format!("pipe {}", pipe.id),
                });
            }
        }
        if !(pipe.length_m.is_finite() && pipe.length_m > 0.0) {
            return Err(invalid(
                format!("pipes.{}.length_m", pipe.id),
                pipe.length_m,
                "must be positive",
            ));
        }
        if project.sizing == SizingDef::UseSpecified && pipe.dn.is_none() {
            return Err(invalid(
                format!("pipes.{}.dn", pipe.id),
                "none",
                "use_specified sizing needs a DN on every pipe",
            ));
        }
    }
    Ok(())
}

fn validate_buildings(project: &Project) -> Result<(), ValidationError> {
    let horizon = project.horizon();
    let mut buildings: HashMap<&str, usize> = HashMap::new();
    for (i, b) in project.buildings.iter().enumerate() {
        if buildings.insert(b.name.as_str(), i).is_some() {
            return Err(ValidationError::DuplicateId {
                id: b.name.clone(),
                context: "buildings".to_string(),
            });
        }
        let hex = &b.hex;
        if !(hex.design_delta_t_k > 0.0 && hex.min_delta_t_k > 0.0 && hex.approach_k >= 0.0) {
            return Err(invalid(
                format!("buildings.{}.hex", b.name),
                format!("{hex:?}"),
                "temperature differences must be positive",
            ));
        }
        if let Some(len) = b.demand.hours() {
            if len < horizon {
                return Err(ValidationError::SeriesLength {
                    what: format!("building {} demand", b.name),
                    expected: horizon,
                    actual: len,
                });
            }
        }
        let loads: Vec<f64> = match &b.demand {
            DemandDef::Constant { load_w, .. } => vec![*load_w],
            DemandDef::Series { load_w, .. } => load_w.clone(),
        };
        if let Some(bad) = loads.iter().find(|l| !(l.is_finite() && **l >= 0.0)) {
            return Err(invalid(
                format!("buildings.{}.demand.load_w", b.name),
                bad,
                "loads must be finite and non-negative",
            ));
        }
    }

    let mut served = HashSet::new();
    for node in &project.network.nodes {
        let Some(building) = &node.building else {
            continue;
        };
        if !buildings.contains_key(building.as_str()) {
            return Err(ValidationError::MissingReference {
                id: building.clone(),
                context: format!("node {}", node.id),
            });
        }
        if !served.insert(building.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: building.clone(),
                context: "consumer buildings".to_string(),
            });
        }
    }
    if let Some(orphan) = project
        .buildings
        .iter()
        .find(|b| !served.contains(b.name.as_str()))
    {
        return Err(ValidationError::MissingReference {
            id: orphan.name.clone(),
            context: "no consumer node serves this building".to_string(),
        });
    }
    Ok(())
}

fn validate_ground(project: &Project) -> Result<(), ValidationError> {
    let horizon = project.horizon();
    let (what, values) = match &project.ground {
        GroundDef::Constant { temperature_k } => ("ground temperature", std::slice::from_ref(temperature_k)),
        GroundDef::Series { temperature_k } => {
            if temperature_k.len() < horizon {
                return Err(ValidationError::SeriesLength {
                    what: "ground temperature".to_string(),
                    expected: horizon,
                    actual: temperature_k.len(),
                });
            }
            ("ground temperature", temperature_k.as_slice())
        }
        GroundDef::Ambient { ambient_k } => {
            if ambient_k.len() < 24 {
                return Err(ValidationError::SeriesLength {
                    what: "ambient temperature".to_string(),
                    expected: 24,
                    actual: ambient_k.len(),
                });
            }
            ("ambient temperature", ambient_k.as_slice())
        }
    };
    if let Some(bad) = values.iter().find(|t| !(t.is_finite() && **t > 0.0)) {
        return Err(invalid(what, bad, "must be a positive temperature in kelvin"));
    }
    Ok(())
}
