//! Pipe catalog and flow-based sizing.

use std::f64::consts::PI;

use dn_core::units::{Length, VolumeRate, m, m3ps};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ComponentError, ComponentResult};

/// One pre-insulated pipe size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeRecord {
    /// Nominal size label, e.g. `DN50`.
    pub dn: String,
    pub d_int_m: f64,
    pub d_ext_m: f64,
    /// Outer diameter of the insulation casing.
    pub d_ins_m: f64,
    pub vdot_min_m3s: f64,
    pub vdot_max_m3s: f64,
}

impl PipeRecord {
    pub fn inner_diameter(&self) -> Length {
        m(self.d_int_m)
    }

    pub fn capacity(&self) -> VolumeRate {
        m3ps(self.vdot_max_m3s)
    }

    /// Largest rated mass flow [kg/s].
    pub fn mdot_max(&self, rho: f64) -> f64 {
        self.vdot_max_m3s * rho
    }

    pub fn mdot_min(&self, rho: f64) -> f64 {
        self.vdot_min_m3s * rho
    }

    fn check(&self) -> ComponentResult<()> {
        let ordered = 0.0 < self.d_int_m && self.d_int_m < self.d_ext_m && self.d_ext_m < self.d_ins_m;
        if !ordered {
            return Err(ComponentError::NonPhysical {
                what: "pipe diameters must satisfy 0 < d_int < d_ext < d_ins",
            });
        }
        if !(self.vdot_max_m3s > 0.0 && self.vdot_min_m3s >= 0.0) {
            return Err(ComponentError::NonPhysical {
                what: "pipe flow limits",
            });
        }
        Ok(())
    }
}

/// Pipe assignment per edge, as indices into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizingOutcome {
    pub records: Vec<usize>,
    /// Edges whose peak flow exceeds even the largest record.
    pub undersized: Vec<usize>,
}

/// Read-only list of pipe sizes ordered by capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeCatalog {
    records: Vec<PipeRecord>,
}

// (DN, d_ext, d_int, d_ins, v_max) for steel pipes with PUR casing
const STANDARD_SERIES: [(&str, f64, f64, f64, f64); 18] = [
    ("DN20", 0.0269, 0.0217, 0.090, 0.8),
    ("DN25", 0.0337, 0.0285, 0.090, 0.9),
    ("DN32", 0.0424, 0.0372, 0.110, 1.0),
    ("DN40", 0.0483, 0.0431, 0.110, 1.1),
    ("DN50", 0.0603, 0.0545, 0.125, 1.2),
    ("DN65", 0.0761, 0.0703, 0.140, 1.4),
    ("DN80", 0.0889, 0.0825, 0.160, 1.5),
    ("DN100", 0.1143, 0.1071, 0.200, 1.7),
    ("DN125", 0.1397, 0.1325, 0.225, 1.9),
    ("DN150", 0.1683, 0.1603, 0.250, 2.1),
    ("DN200", 0.2191, 0.2101, 0.315, 2.3),
    ("DN250", 0.2730, 0.2630, 0.400, 2.5),
    ("DN300", 0.3239, 0.3127, 0.450, 2.7),
    ("DN350", 0.3556, 0.3444, 0.500, 2.8),
    ("DN400", 0.4064, 0.3938, 0.560, 2.9),
    ("DN450", 0.4570, 0.4444, 0.630, 3.0),
    ("DN500", 0.5080, 0.4954, 0.710, 3.0),
    ("DN600", 0.6100, 0.5958, 0.800, 3.0),
];

const STANDARD_MIN_VELOCITY: f64 = 0.3;

impl PipeCatalog {
    /// Validate and sort records by maximum volumetric flow.
    pub fn new(mut records: Vec<PipeRecord>) -> ComponentResult<Self> {
        if records.is_empty() {
            return Err(ComponentError::EmptyCatalog);
        }
        for r in &records {
            r.check()?;
        }
        records.sort_by(|a, b| a.vdot_max_m3s.total_cmp(&b.vdot_max_m3s));
        Ok(Self { records })
    }

    /// Built-in DN20..DN600 series.
    pub fn standard() -> Self {
        let records = STANDARD_SERIES
            .iter()
            .map(|&(dn, d_ext, d_int, d_ins, v_max)| {
                let area = PI * d_int * d_int / 4.0;
                PipeRecord {
                    dn: dn.to_string(),
                    d_int_m: d_int,
                    d_ext_m: d_ext,
                    d_ins_m: d_ins,
                    vdot_min_m3s: STANDARD_MIN_VELOCITY * area,
                    vdot_max_m3s: v_max * area,
                }
            })
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[PipeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PipeRecord> {
        self.records.get(index)
    }

    pub fn position(&self, dn: &str) -> Option<usize> {
        self.records.iter().position(|r| r.dn == dn)
    }

    pub fn by_dn(&self, dn: &str) -> Option<&PipeRecord> {
        self.position(dn).map(|i| &self.records[i])
    }

    /// Smallest record rated for `max_flow`; the largest one and `false` if none is.
    pub fn select(&self, max_flow: f64, rho: f64) -> (usize, bool) {
        let flow = max_flow.abs();
        match self.records.iter().position(|r| r.mdot_max(rho) >= flow) {
            Some(i) => (i, true),
            None => (self.records.len().saturating_sub(1), false),
        }
    }

    /// Size every edge from its peak absolute flow over the design horizon.
    pub fn size_pipes(&self, max_flows: &[f64], rho: f64) -> SizingOutcome {
        let mut records = Vec::with_capacity(max_flows.len());
        let mut undersized = Vec::new();
        for (edge, &flow) in max_flows.iter().enumerate() {
            let (idx, fits) = self.select(flow, rho);
            if !fits {
                warn!(
                    edge,
                    flow_kgps = flow,
                    largest = %self.records[idx].dn,
                    "peak flow exceeds the largest catalog pipe"
                );
                undersized.push(edge);
            }
            records.push(idx);
        }
        SizingOutcome {
            records,
            undersized,
        }
    }

    /// Resolve externally specified sizes; every `(edge name, DN)` must match a record.
    pub fn assign_specified(&self, specified: &[(&str, &str)]) -> ComponentResult<SizingOutcome> {
        let records = specified
            .iter()
            .map(|&(edge, dn)| {
                self.position(dn)
                    .ok_or_else(|| ComponentError::CatalogMismatch {
                        edge: edge.to_string(),
                        dn: dn.to_string(),
                    })
            })
            .collect::<ComponentResult<Vec<_>>>()?;
        Ok(SizingOutcome {
            records,
            undersized: Vec::new(),
        })
    }

    /// Records for an assignment, one per edge.
    pub fn resolve(&self, outcome: &SizingOutcome) -> Vec<PipeRecord> {
        outcome
            .records
            .iter()
            .filter_map(|&i| self.records.get(i).cloned())
            .collect()
    }
}
