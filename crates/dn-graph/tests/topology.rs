//! Integration tests for dn-graph.

use dn_graph::{GraphError, NetworkBuilder, NodeRole, Orientation};

#[test]
fn ring_network_has_exactly_one_loop() {
    // P -> J1 -> J2 -> J3 -> P
    let mut b = NetworkBuilder::new();
    let p = b.add_node("P", NodeRole::Plant);
    let j1 = b.add_node("J1", NodeRole::Junction);
    let j2 = b.add_consumer("J2", "B2");
    let j3 = b.add_node("J3", NodeRole::Junction);
    b.add_pipe("E0", p, j1, 100.0);
    b.add_pipe("E1", j1, j2, 100.0);
    b.add_pipe("E2", j2, j3, 100.0);
    b.add_pipe("E3", j3, p, 100.0);
    let net = b.build().unwrap();

    assert!(net.is_looped());
    assert_eq!(net.loops().len(), net.edge_count() - net.node_count() + 1);

    let lp = &net.loops().loops()[0];
    let signs: Vec<_> = lp
        .signed_edges(net.incidence(), net.base_orientation())
        .collect();
    assert_eq!(signs.len(), 4);
    assert!(signs.iter().all(|(_, s)| s.abs() == 1.0));
}

#[test]
fn meshed_grid_loop_count() {
    // 2x3 grid: 6 nodes, 7 edges -> 2 loops
    let mut b = NetworkBuilder::new();
    let n: Vec<_> = (0..6)
        .map(|i| {
            if i == 0 {
                b.add_node("N0", NodeRole::Plant)
            } else {
                b.add_consumer(format!("N{i}"), format!("B{i}"))
            }
        })
        .collect();
    for (k, (s, e)) in [(0, 1), (1, 2), (3, 4), (4, 5), (0, 3), (1, 4), (2, 5)]
        .into_iter()
        .enumerate()
    {
        b.add_pipe(format!("E{k}"), n[s], n[e], 50.0);
    }
    let net = b.build().unwrap();
    assert_eq!(net.loops().len(), 2);
    for lp in net.loops().iter() {
        assert_eq!(lp.nodes.len(), lp.edges.len());
        assert!(lp.len() >= 4);
    }
}

#[test]
fn star_tree_orientation_leaves_plant() {
    let mut b = NetworkBuilder::new();
    let p = b.add_node("P", NodeRole::Plant);
    let j = b.add_node("J", NodeRole::Junction);
    let c1 = b.add_consumer("C1", "B1");
    let c2 = b.add_consumer("C2", "B2");
    b.add_pipe("E0", j, p, 10.0);
    b.add_pipe("E1", c1, j, 10.0);
    b.add_pipe("E2", j, c2, 10.0);
    let net = b.build().unwrap();

    assert!(!net.is_looped());
    let adj = net.incidence().adjacency(net.base_orientation());
    assert!(adj.incoming[p.slot()].is_empty());
    assert_eq!(adj.outgoing[j.slot()].len(), 2);
    assert_eq!(adj.incoming[c1.slot()].len(), 1);
    assert_eq!(adj.incoming[c2.slot()].len(), 1);
    assert!(net.base_orientation().flipped_count() >= 2);
    assert_ne!(net.base_orientation(), &Orientation::identity(3));
}

#[test]
fn duplicate_edge_names_are_fatal() {
    let mut b = NetworkBuilder::new();
    let p = b.add_node("P", NodeRole::Plant);
    let c = b.add_consumer("C", "B");
    b.add_pipe("E", p, c, 1.0);
    b.add_pipe("E", c, p, 1.0);
    assert_eq!(
        b.build().unwrap_err(),
        GraphError::DuplicateEdge { name: "E".into() }
    );
}

#[test]
fn missing_plant_is_fatal() {
    let mut b = NetworkBuilder::new();
    let a = b.add_consumer("A", "B1");
    let c = b.add_consumer("C", "B2");
    b.add_pipe("E", a, c, 1.0);
    assert_eq!(b.build().unwrap_err(), GraphError::NoPlant);
}

#[test]
fn isolated_node_is_fatal() {
    let mut b = NetworkBuilder::new();
    let p = b.add_node("P", NodeRole::Plant);
    let c = b.add_consumer("C", "B");
    b.add_node("LONELY", NodeRole::Junction);
    b.add_pipe("E", p, c, 1.0);
    assert!(matches!(
        b.build().unwrap_err(),
        GraphError::IsolatedNode { .. }
    ));
}

#[test]
fn self_loop_is_fatal() {
    let mut b = NetworkBuilder::new();
    let p = b.add_node("P", NodeRole::Plant);
    b.add_pipe("E", p, p, 1.0);
    assert!(matches!(b.build().unwrap_err(), GraphError::SelfLoop { .. }));
}

mod properties {
    use dn_graph::{NetworkBuilder, NodeRole};
    use proptest::prelude::*;

    /// Random spanning tree grown from the plant, plus chords pointing away from it.
    fn meshed() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, usize)>)> {
        (2usize..12).prop_flat_map(|n| {
            let parents = (1..n).map(|i| 0..i).collect::<Vec<_>>();
            let chords = proptest::collection::vec((0..n, 1..n), 0..4)
                .prop_map(|v| v.into_iter().filter(|(a, b)| a < b).collect::<Vec<_>>());
            (parents, chords)
        })
    }

    proptest! {
        #[test]
        fn loop_count_is_cyclomatic_number((parents, chords) in meshed()) {
            let mut b = NetworkBuilder::new();
            let mut ids = vec![b.add_node("N0", NodeRole::Plant)];
            for i in 1..=parents.len() {
                ids.push(b.add_consumer(format!("N{i}"), format!("B{i}")));
            }
            for (child, &parent) in parents.iter().enumerate() {
                b.add_pipe(format!("T{child}"), ids[parent], ids[child + 1], 50.0);
            }
            for (k, &(from, to)) in chords.iter().enumerate() {
                b.add_pipe(format!("C{k}"), ids[from], ids[to], 50.0);
            }
            let net = b.build().unwrap();

            prop_assert_eq!(net.loops().len(), net.edge_count() + 1 - net.node_count());
            for lp in net.loops().iter() {
                prop_assert_eq!(lp.nodes.len(), lp.edges.len());
                for (i, edge) in lp.edges.iter().enumerate() {
                    let e = net.edge(*edge).unwrap();
                    let a = lp.nodes[i];
                    let z = lp.nodes[(i + 1) % lp.nodes.len()];
                    prop_assert!((e.start == a && e.end == z) || (e.start == z && e.end == a));
                }
            }
        }
    }
}
