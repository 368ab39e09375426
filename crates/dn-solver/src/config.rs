//! Iteration caps and tolerances.

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

/// Loop flow tolerance in force while the iteration count is below `below_iteration`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceStep {
    pub below_iteration: usize,
    pub tolerance_kgps: f64,
}

/// Solver configuration shared by every timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Hardy-Cross tolerance, loosening with the iteration count.
    pub loop_tolerance_schedule: Vec<ToleranceStep>,
    pub max_loop_iterations: usize,
    /// Verification thresholds; exceeding them only warns.
    pub mass_balance_tolerance_kgps: f64,
    pub loop_pressure_tolerance_pa: f64,
    /// Solved flows are rounded to this many decimals.
    pub flow_decimals: i32,
    pub max_orientation_passes: usize,

    /// Relaxation of the temperature traversal in meshed networks.
    pub relaxation_tolerance_k: f64,
    pub max_relaxation_passes: usize,

    /// Allowed miss of a consumer target before the plant temperature moves.
    pub consumer_tolerance_k: f64,
    pub max_plant_drift_heating_k: f64,
    pub max_plant_drift_cooling_k: f64,
    pub max_plant_iterations: usize,
    pub max_pipe_temperature_drop_k: f64,

    /// Outer substation/network loop.
    pub outer_tolerance_k: f64,
    pub relaxed_outer_tolerance_k: f64,
    pub relax_outer_after: usize,
    pub max_outer_iterations: usize,

    /// Minimum edge flow enforcement.
    pub min_edge_flow_kgps: f64,
    pub min_edge_flow_slack_kgps: f64,
    /// Past this many nudges every active consumer is raised, not just the downstream ones.
    pub targeted_min_flow_iterations: usize,
    pub max_min_flow_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            loop_tolerance_schedule: vec![
                ToleranceStep {
                    below_iteration: 20,
                    tolerance_kgps: 0.01,
                },
                ToleranceStep {
                    below_iteration: 50,
                    tolerance_kgps: 0.02,
                },
                ToleranceStep {
                    below_iteration: 100,
                    tolerance_kgps: 0.03,
                },
            ],
            max_loop_iterations: 100,
            mass_balance_tolerance_kgps: 0.01,
            loop_pressure_tolerance_pa: 5000.0,
            flow_decimals: 5,
            max_orientation_passes: 10,
            relaxation_tolerance_k: 1.0,
            max_relaxation_passes: 50,
            consumer_tolerance_k: 0.1,
            max_plant_drift_heating_k: 60.0,
            max_plant_drift_cooling_k: 10.0,
            max_plant_iterations: 100,
            max_pipe_temperature_drop_k: 30.0,
            outer_tolerance_k: 1.0,
            relaxed_outer_tolerance_k: 10.0,
            relax_outer_after: 10,
            max_outer_iterations: 20,
            min_edge_flow_kgps: 0.1,
            min_edge_flow_slack_kgps: 0.01,
            targeted_min_flow_iterations: 5,
            max_min_flow_iterations: 30,
        }
    }
}

impl SolverConfig {
    /// Loop tolerance after `iteration` Hardy-Cross sweeps.
    pub fn loop_tolerance(&self, iteration: usize) -> f64 {
        self.loop_tolerance_schedule
            .iter()
            .find(|s| iteration < s.below_iteration)
            .or(self.loop_tolerance_schedule.last())
            .map_or(0.0, |s| s.tolerance_kgps)
    }

    /// Outer-loop tolerance at `iteration` (1-based).
    pub fn outer_tolerance(&self, iteration: usize) -> f64 {
        if iteration < self.relax_outer_after {
            self.outer_tolerance_k
        } else {
            self.relaxed_outer_tolerance_k
        }
    }

    pub fn validate(&self) -> SolverResult<()> {
        if self.loop_tolerance_schedule.is_empty() {
            return Err(SolverError::ProblemSetup {
                what: "loop tolerance schedule is empty".into(),
            });
        }
        if self
            .loop_tolerance_schedule
            .iter()
            .any(|s| !(s.tolerance_kgps > 0.0))
        {
            return Err(SolverError::ProblemSetup {
                what: "loop tolerances must be positive".into(),
            });
        }
        let caps = [
            ("max_loop_iterations", self.max_loop_iterations),
            ("max_orientation_passes", self.max_orientation_passes),
            ("max_relaxation_passes", self.max_relaxation_passes),
            ("max_plant_iterations", self.max_plant_iterations),
            ("max_outer_iterations", self.max_outer_iterations),
        ];
        if let Some((name, _)) = caps.iter().find(|(_, v)| *v == 0) {
            return Err(SolverError::ProblemSetup {
                what: format!("{name} must be at least 1"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_loosens_with_iterations() {
        let c = SolverConfig::default();
        assert_eq!(c.loop_tolerance(0), 0.01);
        assert_eq!(c.loop_tolerance(19), 0.01);
        assert_eq!(c.loop_tolerance(20), 0.02);
        assert_eq!(c.loop_tolerance(49), 0.02);
        assert_eq!(c.loop_tolerance(99), 0.03);
        assert_eq!(c.loop_tolerance(500), 0.03);
    }

    #[test]
    fn outer_tolerance_relaxes() {
        let c = SolverConfig::default();
        assert_eq!(c.outer_tolerance(1), 1.0);
        assert_eq!(c.outer_tolerance(10), 10.0);
    }

    #[test]
    fn zero_caps_rejected() {
        let c = SolverConfig {
            max_outer_iterations: 0,
            ..Default::default()
        };
        let msg = c.validate().unwrap_err().to_string();
        assert!(msg.contains("max_outer_iterations"));
        assert!(SolverConfig::default().validate().is_ok());
    }
}
