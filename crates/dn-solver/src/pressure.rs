//! Nodal pressures from pipe losses.
//!
//! Pressures are relative: the systems `Aᵀ·p = -Δp` are solved in the
//! least-squares sense, which also absorbs loop residuals left by Hardy-Cross.

use dn_graph::Orientation;
use nalgebra::{DMatrix, DVector};

use crate::error::{SolverError, SolverResult};
use crate::model::NetworkModel;

/// Supply and return pressures for one timestep.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PressureSolution {
    pub supply_pa: Vec<f64>,
    pub return_pa: Vec<f64>,
    pub supply_loss_pa: Vec<f64>,
    pub return_loss_pa: Vec<f64>,
}

impl PressureSolution {
    /// Summed pipe losses `[supply, return, total]`.
    pub fn aggregate(&self) -> [f64; 3] {
        let supply: f64 = self.supply_loss_pa.iter().sum();
        let ret: f64 = self.return_loss_pa.iter().sum();
        [supply, ret, supply + ret]
    }
}

fn least_squares(a: DMatrix<f64>, b: DVector<f64>) -> SolverResult<Vec<f64>> {
    a.svd(true, true)
        .solve(&b, 1e-12)
        .map(|x| x.iter().copied().collect())
        .map_err(|e| SolverError::Numeric { what: e.to_string() })
}

/// Solve supply and return pressures.
///
/// `supply_k` and `return_k` are node temperatures; pipe losses use the mean
/// temperature of each edge's end nodes.
pub fn solve_pressures(
    model: &NetworkModel,
    orientation: &Orientation,
    flows: &[f64],
    supply_k: &[Option<f64>],
    return_k: &[Option<f64>],
) -> SolverResult<PressureSolution> {
    let supply_t = model.edge_temperatures(orientation, supply_k);
    let return_t = model.edge_temperatures(orientation, return_k);
    let losses = |temps: &[Option<f64>]| -> Vec<f64> {
        model
            .pipes
            .iter()
            .enumerate()
            .map(|(e, pipe)| pipe.pressure_loss(flows[e], temps[e], &model.consts))
            .collect()
    };
    let supply_loss_pa = losses(&supply_t);
    let return_loss_pa = losses(&return_t);

    let at = model.network.incidence().dense(orientation).transpose();
    let rhs = |dp: &[f64]| DVector::from_iterator(dp.len(), dp.iter().map(|v| -v));
    let supply_pa = least_squares(at.clone(), rhs(&supply_loss_pa))?;
    let return_pa = least_squares(-at, rhs(&return_loss_pa))?;

    Ok(PressureSolution {
        supply_pa,
        return_pa,
        supply_loss_pa,
        return_loss_pa,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::*;
    use dn_components::NetworkKind;

    #[test]
    fn pressure_drops_along_supply_and_rises_along_return() {
        let model = uniform(two_node(200.0), "DN50", NetworkKind::Heating);
        let o = model.network.base_orientation().clone();
        let sol = solve_pressures(
            &model,
            &o,
            &[2.0],
            &[Some(350.0), Some(349.0)],
            &[Some(320.0), Some(320.0)],
        )
        .unwrap();

        let dp = sol.supply_loss_pa[0];
        assert!(dp > 0.0);
        assert!(((sol.supply_pa[0] - sol.supply_pa[1]) - dp).abs() < 1e-6 * dp.max(1.0));
        let dr = sol.return_loss_pa[0];
        assert!(((sol.return_pa[1] - sol.return_pa[0]) - dr).abs() < 1e-6 * dr.max(1.0));
        let [s, r, total] = sol.aggregate();
        assert_eq!(total, s + r);
    }

    #[test]
    fn no_flow_means_flat_pressure() {
        let model = uniform(two_node(200.0), "DN50", NetworkKind::Heating);
        let o = model.network.base_orientation().clone();
        let sol = solve_pressures(&model, &o, &[0.0], &[Some(350.0); 2], &[Some(320.0); 2]).unwrap();
        assert!(sol.supply_pa.iter().all(|p| p.abs() < 1e-9));
        assert_eq!(sol.aggregate(), [0.0, 0.0, 0.0]);
    }
}
