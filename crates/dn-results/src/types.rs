//! Stored run data.

use std::fmt;
use std::str::FromStr;

use dn_components::NetworkKind;
use serde::{Deserialize, Serialize};

use crate::ResultsError;

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub project_name: String,
    /// RFC 3339 creation time.
    pub timestamp: String,
    pub solver_version: String,
    pub kind: NetworkKind,
    pub hours: usize,
    pub node_names: Vec<String>,
    pub edge_names: Vec<String>,
    pub plant_names: Vec<String>,
    /// Catalog size per edge, in edge order.
    pub pipe_sizes: Vec<String>,
    #[serde(default)]
    pub undersized_edges: Vec<String>,
    #[serde(default)]
    pub unconverged_hours: Vec<usize>,
}

/// Per-hour solver diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConvergenceSummary {
    pub degenerate: bool,
    pub outer_iterations: usize,
    pub outer_converged: bool,
    pub hydraulic_iterations: usize,
    pub hydraulic_converged: bool,
    pub reversed_edges: usize,
    pub mass_residual_kgps: f64,
    pub loop_residual_pa: f64,
    pub plant_iterations: usize,
    pub plant_converged: bool,
    pub forced_consumers: usize,
    pub min_flow_iterations: usize,
    pub min_flow_converged: bool,
}

impl ConvergenceSummary {
    pub fn converged(&self) -> bool {
        self.degenerate
            || (self.outer_converged
                && self.hydraulic_converged
                && self.plant_converged
                && self.min_flow_converged)
    }
}

/// One line of `hours.jsonl`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HourRecord {
    pub hour: usize,
    /// Non-negative; `reversed` marks edges flowing end to start.
    pub mass_flow_kgps: Vec<f64>,
    #[serde(default)]
    pub reversed: Vec<bool>,
    pub supply_k: Vec<Option<f64>>,
    pub return_k: Vec<Option<f64>>,
    pub heat_loss_w: Vec<f64>,
    pub plant_heat_w: Vec<f64>,
    pub plant_supply_k: Option<f64>,
    pub supply_pa: Vec<f64>,
    pub return_pa: Vec<f64>,
    /// Supply line, return line, total.
    pub pressure_loss_pa: [f64; 3],
    pub convergence: ConvergenceSummary,
}

/// Exportable result matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    MassFlow,
    SupplyTemperature,
    ReturnTemperature,
    HeatLoss,
    PlantHeat,
    SupplyPressure,
    ReturnPressure,
    PressureLoss,
}

impl Quantity {
    pub const ALL: [Quantity; 8] = [
        Quantity::MassFlow,
        Quantity::SupplyTemperature,
        Quantity::ReturnTemperature,
        Quantity::HeatLoss,
        Quantity::PlantHeat,
        Quantity::SupplyPressure,
        Quantity::ReturnPressure,
        Quantity::PressureLoss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Quantity::MassFlow => "mass_flow",
            Quantity::SupplyTemperature => "supply_temperature",
            Quantity::ReturnTemperature => "return_temperature",
            Quantity::HeatLoss => "heat_loss",
            Quantity::PlantHeat => "plant_heat",
            Quantity::SupplyPressure => "supply_pressure",
            Quantity::ReturnPressure => "return_pressure",
            Quantity::PressureLoss => "pressure_loss",
        }
    }

    /// Column headers, without the hour column.
    pub fn columns(self, manifest: &RunManifest) -> Vec<String> {
        match self {
            Quantity::MassFlow | Quantity::HeatLoss => manifest.edge_names.clone(),
            Quantity::SupplyTemperature
            | Quantity::ReturnTemperature
            | Quantity::SupplyPressure
            | Quantity::ReturnPressure => manifest.node_names.clone(),
            Quantity::PlantHeat => manifest.plant_names.clone(),
            Quantity::PressureLoss => vec!["supply".into(), "return".into(), "total".into()],
        }
    }

    /// Values of one hour; undefined temperatures are `None`.
    pub fn row(self, record: &HourRecord) -> Vec<Option<f64>> {
        fn defined(v: &[f64]) -> Vec<Option<f64>> {
            v.iter().copied().map(Some).collect()
        }
        match self {
            Quantity::MassFlow => defined(&record.mass_flow_kgps),
            Quantity::SupplyTemperature => record.supply_k.clone(),
            Quantity::ReturnTemperature => record.return_k.clone(),
            Quantity::HeatLoss => defined(&record.heat_loss_w),
            Quantity::PlantHeat => defined(&record.plant_heat_w),
            Quantity::SupplyPressure => defined(&record.supply_pa),
            Quantity::ReturnPressure => defined(&record.return_pa),
            Quantity::PressureLoss => defined(&record.pressure_loss_pa),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Quantity {
    type Err = ResultsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quantity::ALL
            .into_iter()
            .find(|q| q.name() == s)
            .ok_or_else(|| ResultsError::UnknownQuantity(s.to_string()))
    }
}

/// A loaded run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualResults {
    pub manifest: RunManifest,
    pub records: Vec<HourRecord>,
}

impl AnnualResults {
    /// Hours × entities matrix of one quantity.
    pub fn matrix(&self, quantity: Quantity) -> Vec<Vec<Option<f64>>> {
        self.records.iter().map(|r| quantity.row(r)).collect()
    }

    /// Annual plant energy [Wh], one entry per plant.
    pub fn plant_energy_wh(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.manifest.plant_names.len()];
        for r in &self.records {
            for (acc, q) in total.iter_mut().zip(&r.plant_heat_w) {
                *acc += q;
            }
        }
        total
    }

    /// Annual heat lost by the supply line [Wh].
    pub fn heat_loss_wh(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.heat_loss_w.iter().sum::<f64>())
            .sum()
    }

    /// Largest absolute flow per edge over the run.
    pub fn peak_flows_kgps(&self) -> Vec<f64> {
        let mut peak = vec![0.0_f64; self.manifest.edge_names.len()];
        for r in &self.records {
            for (p, m) in peak.iter_mut().zip(&r.mass_flow_kgps) {
                *p = p.max(m.abs());
            }
        }
        peak
    }

    /// Largest total pressure loss over the run [Pa].
    pub fn peak_pressure_loss_pa(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.pressure_loss_pa[2])
            .fold(0.0, f64::max)
    }
}
