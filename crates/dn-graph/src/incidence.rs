//! Signed edge-node incidence matrix.
//!
//! Entry (n, e) is +1 when edge e delivers flow into node n (its end node),
//! -1 when flow leaves n through e (its start node), 0 otherwise. The matrix is
//! stored as one (start, end) pair per column; the per-timestep [`Orientation`]
//! overlay scales columns by ±1 without touching the shared topology.

use nalgebra::{DMatrix, DVector};

use crate::error::{GraphError, GraphResult};
use crate::orientation::Orientation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceMatrix {
    n_nodes: usize,
    starts: Vec<usize>,
    ends: Vec<usize>,
}

/// Per-node incoming/outgoing edge lists for one orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectedAdjacency {
    pub incoming: Vec<Vec<usize>>,
    pub outgoing: Vec<Vec<usize>>,
}

impl DirectedAdjacency {
    /// Adjacency of the negated matrix, used for return-line propagation.
    pub fn reversed(&self) -> Self {
        Self {
            incoming: self.outgoing.clone(),
            outgoing: self.incoming.clone(),
        }
    }
}

impl IncidenceMatrix {
    /// Build from `(start, end)` node indices, one pair per edge.
    pub fn from_edges(n_nodes: usize, pairs: &[(usize, usize)]) -> GraphResult<Self> {
        let mut starts = Vec::with_capacity(pairs.len());
        let mut ends = Vec::with_capacity(pairs.len());
        for (edge, &(s, e)) in pairs.iter().enumerate() {
            if s >= n_nodes || e >= n_nodes || s == e {
                let plus = usize::from(e < n_nodes && s != e);
                let minus = usize::from(s < n_nodes && s != e);
                return Err(GraphError::MalformedColumn { edge, plus, minus });
            }
            starts.push(s);
            ends.push(e);
        }
        Ok(Self {
            n_nodes,
            starts,
            ends,
        })
    }

    /// Parse a dense matrix; every column must hold exactly one +1 and one -1.
    pub fn from_dense(matrix: &DMatrix<f64>) -> GraphResult<Self> {
        let mut pairs = Vec::with_capacity(matrix.ncols());
        for (edge, column) in matrix.column_iter().enumerate() {
            let mut plus = Vec::new();
            let mut minus = Vec::new();
            let mut stray = false;
            for (node, &v) in column.iter().enumerate() {
                if v == 1.0 {
                    plus.push(node);
                } else if v == -1.0 {
                    minus.push(node);
                } else if v != 0.0 {
                    stray = true;
                }
            }
            if stray || plus.len() != 1 || minus.len() != 1 {
                return Err(GraphError::MalformedColumn {
                    edge,
                    plus: plus.len(),
                    minus: minus.len(),
                });
            }
            pairs.push((minus[0], plus[0]));
        }
        Self::from_edges(matrix.nrows(), &pairs)
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    pub fn n_edges(&self) -> usize {
        self.starts.len()
    }

    /// Effective `(from, to)` of an edge under `orientation`.
    pub fn endpoints(&self, edge: usize, orientation: &Orientation) -> (usize, usize) {
        if orientation.is_flipped(edge) {
            (self.ends[edge], self.starts[edge])
        } else {
            (self.starts[edge], self.ends[edge])
        }
    }

    pub fn entry(&self, node: usize, edge: usize, orientation: &Orientation) -> f64 {
        let (from, to) = self.endpoints(edge, orientation);
        if node == to {
            1.0
        } else if node == from {
            -1.0
        } else {
            0.0
        }
    }

    /// Dense |nodes| x |edges| matrix for the given orientation.
    pub fn dense(&self, orientation: &Orientation) -> DMatrix<f64> {
        let mut a = DMatrix::zeros(self.n_nodes, self.n_edges());
        for edge in 0..self.n_edges() {
            let (from, to) = self.endpoints(edge, orientation);
            a[(from, edge)] = -1.0;
            a[(to, edge)] = 1.0;
        }
        a
    }

    /// Dense matrix with the row of `drop_node` removed.
    pub fn reduced(&self, orientation: &Orientation, drop_node: usize) -> DMatrix<f64> {
        self.dense(orientation).remove_row(drop_node)
    }

    /// Net inflow per node, `A · m`.
    pub fn net_inflow(&self, orientation: &Orientation, flows: &[f64]) -> DVector<f64> {
        let mut out = DVector::zeros(self.n_nodes);
        for (edge, &m) in flows.iter().enumerate().take(self.n_edges()) {
            let (from, to) = self.endpoints(edge, orientation);
            out[from] -= m;
            out[to] += m;
        }
        out
    }

    pub fn adjacency(&self, orientation: &Orientation) -> DirectedAdjacency {
        let mut incoming = vec![Vec::new(); self.n_nodes];
        let mut outgoing = vec![Vec::new(); self.n_nodes];
        for edge in 0..self.n_edges() {
            let (from, to) = self.endpoints(edge, orientation);
            outgoing[from].push(edge);
            incoming[to].push(edge);
        }
        DirectedAdjacency { incoming, outgoing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> IncidenceMatrix {
        // 0 -> 1 -> 2
        IncidenceMatrix::from_edges(3, &[(0, 1), (1, 2)]).unwrap()
    }

    #[test]
    fn dense_columns_sum_to_zero() {
        let inc = chain();
        let a = inc.dense(&Orientation::identity(2));
        assert_eq!(a[(0, 0)], -1.0);
        assert_eq!(a[(1, 0)], 1.0);
        assert_eq!(a[(1, 1)], -1.0);
        assert_eq!(a[(2, 1)], 1.0);
        for col in a.column_iter() {
            assert_eq!(col.sum(), 0.0);
        }
    }

    #[test]
    fn flip_negates_column() {
        let inc = chain();
        let mut orient = Orientation::identity(2);
        orient.flip(1);
        let a = inc.dense(&orient);
        assert_eq!(a[(1, 1)], 1.0);
        assert_eq!(a[(2, 1)], -1.0);
        assert_eq!(inc.endpoints(1, &orient), (2, 1));
        assert_eq!(inc.entry(2, 1, &orient), -1.0);
    }

    #[test]
    fn malformed_dense_is_rejected() {
        let mut a = DMatrix::zeros(3, 1);
        a[(0, 0)] = 1.0;
        a[(1, 0)] = 1.0;
        let err = IncidenceMatrix::from_dense(&a).unwrap_err();
        assert_eq!(
            err,
            GraphError::MalformedColumn {
                edge: 0,
                plus: 2,
                minus: 0
            }
        );
    }

    #[test]
    fn dense_round_trip_keeps_endpoints() {
        let inc = chain();
        let parsed = IncidenceMatrix::from_dense(&inc.dense(&Orientation::identity(2))).unwrap();
        assert_eq!(parsed, inc);
    }

    #[test]
    fn self_loop_is_malformed() {
        assert!(matches!(
            IncidenceMatrix::from_edges(2, &[(1, 1)]),
            Err(GraphError::MalformedColumn { edge: 0, .. })
        ));
    }

    #[test]
    fn net_inflow_and_adjacency() {
        let inc = chain();
        let orient = Orientation::identity(2);
        let b = inc.net_inflow(&orient, &[3.0, 1.0]);
        assert_eq!(b.as_slice(), &[-3.0, 2.0, 1.0]);

        let adj = inc.adjacency(&orient);
        assert_eq!(adj.incoming[1], vec![0]);
        assert_eq!(adj.outgoing[1], vec![1]);
        let rev = adj.reversed();
        assert_eq!(rev.incoming[1], vec![1]);
    }
}
