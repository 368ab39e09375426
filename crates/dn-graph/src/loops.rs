//! Fundamental cycle basis of the undirected network.

use dn_core::{EdgeId, NodeId};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{Bfs, EdgeRef};

use crate::incidence::IncidenceMatrix;
use crate::orientation::Orientation;

/// One independent cycle: `edges[i]` joins `nodes[i]` to `nodes[(i + 1) % len]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loop {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
}

impl Loop {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// `(edge column, traversal sign)` pairs. The sign is +1 when the traversal
    /// runs from the edge's effective start to its effective end.
    pub fn signed_edges<'a>(
        &'a self,
        incidence: &'a IncidenceMatrix,
        orientation: &'a Orientation,
    ) -> impl Iterator<Item = (usize, f64)> + 'a {
        let len = self.nodes.len();
        self.edges.iter().enumerate().map(move |(i, edge)| {
            let a = self.nodes[i].slot();
            let b = self.nodes[(i + 1) % len].slot();
            let e = edge.slot();
            let (from, to) = incidence.endpoints(e, orientation);
            let sign = if from == a && to == b { 1.0 } else { -1.0 };
            (e, sign)
        })
    }
}

/// Loop set of size `|edges| - |nodes| + 1` for a connected network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopBasis {
    loops: Vec<Loop>,
}

impl LoopBasis {
    /// Compute the basis from a breadth-first spanning tree rooted at `root`.
    ///
    /// Each node hangs off the lowest-numbered edge reaching the previous level.
    ///
    /// Every edge left out of the tree closes exactly one loop, so parallel
    /// pipes each contribute their own loop.
    pub fn compute(incidence: &IncidenceMatrix, root: usize) -> Self {
        let n = incidence.n_nodes();
        if n == 0 || root >= n {
            return Self::default();
        }

        let identity = Orientation::identity(incidence.n_edges());
        let mut graph: UnGraph<usize, usize> = UnGraph::with_capacity(n, incidence.n_edges());
        let idx: Vec<NodeIndex> = (0..n).map(|i| graph.add_node(i)).collect();
        for edge in 0..incidence.n_edges() {
            let (a, b) = incidence.endpoints(edge, &identity);
            graph.add_edge(idx[a], idx[b], edge);
        }

        // BFS depths; the visit order is non-decreasing in depth
        let mut depth = vec![usize::MAX; n];
        depth[root] = 0;
        let mut bfs = Bfs::new(&graph, idx[root]);
        while let Some(u) = bfs.next(&graph) {
            let du = depth[graph[u]];
            for v in graph.neighbors(u) {
                let v = graph[v];
                if depth[v] == usize::MAX {
                    depth[v] = du + 1;
                }
            }
        }

        // parent[node] = (parent node, edge column): lowest edge to the previous level
        let mut parent: Vec<Option<(usize, usize)>> = vec![None; n];
        let mut in_tree = vec![false; incidence.n_edges()];
        for v in (0..n).filter(|&v| v != root && depth[v] != usize::MAX) {
            let best = graph
                .edges(idx[v])
                .map(|e| {
                    let other = if e.source() == idx[v] {
                        e.target()
                    } else {
                        e.source()
                    };
                    (*e.weight(), graph[other])
                })
                .filter(|&(_, u)| depth[u].wrapping_add(1) == depth[v])
                .min();
            if let Some((edge, u)) = best {
                parent[v] = Some((u, edge));
                in_tree[edge] = true;
            }
        }

        let mut loops = Vec::new();
        for edge in 0..incidence.n_edges() {
            if in_tree[edge] {
                continue;
            }
            let (u, v) = incidence.endpoints(edge, &identity);
            if depth[u] == usize::MAX || depth[v] == usize::MAX {
                continue;
            }
            loops.push(close_loop(u, v, edge, &parent, &depth));
        }

        Self { loops }
    }

    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Loop> {
        self.loops.iter()
    }
}

/// Tree path u -> lca -> v, closed by the chord v -> u.
fn close_loop(
    u: usize,
    v: usize,
    chord: usize,
    parent: &[Option<(usize, usize)>],
    depth: &[usize],
) -> Loop {
    let mut up_nodes = vec![u];
    let mut up_edges = Vec::new();
    let mut down_nodes = vec![v];
    let mut down_edges = Vec::new();

    let (mut a, mut b) = (u, v);
    while a != b {
        if depth[a] >= depth[b] {
            if let Some((p, e)) = parent[a] {
                up_edges.push(e);
                up_nodes.push(p);
                a = p;
            } else {
                break;
            }
        } else if let Some((p, e)) = parent[b] {
            down_edges.push(e);
            down_nodes.push(p);
            b = p;
        } else {
            break;
        }
    }

    // up_nodes ends at the lca; down_nodes too, so drop its copy
    down_nodes.pop();
    let mut nodes = up_nodes;
    nodes.extend(down_nodes.into_iter().rev());
    let mut edges = up_edges;
    edges.extend(down_edges.into_iter().rev());
    edges.push(chord);

    Loop {
        nodes: nodes.into_iter().map(|n| NodeId::from_index(n as u32)).collect(),
        edges: edges.into_iter().map(|e| EdgeId::from_index(e as u32)).collect(),
    }
}
