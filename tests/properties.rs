use canonlab::{
    automorphism::Permutation, canonize_colored, canonize_simple, canonize_with_partition,
    graph::Graph, options::Options, partition::Partition,
};
use proptest::prelude::*;
use std::collections::HashSet;

/// A random graph on 1..8 vertices, directed with self-loops or undirected,
/// together with a random renumbering of its vertices.
fn graph_and_renumbering(max: usize) -> impl Strategy<Value = (Graph, Vec<usize>)> {
    (1..max).prop_flat_map(|n| {
        (
            proptest::collection::vec(any::<bool>(), n * n),
            any::<bool>(),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
        )
            .prop_map(move |(bits, directed, renumbering)| {
                let pairs = (0..n).flat_map(|i| (0..n).map(move |j| (i, j)));
                let graph = if directed {
                    Graph::new(n, pairs.filter(|&(i, j)| bits[i * n + j]))
                } else {
                    Graph::from_undirected(n, pairs.filter(|&(i, j)| i < j && bits[i * n + j]))
                };
                (graph.unwrap(), renumbering)
            })
    })
}

fn generated_order(n: usize, generators: &[Permutation]) -> usize {
    let mut seen = HashSet::from([Permutation::identity(n)]);
    let mut queue = vec![Permutation::identity(n)];

    while let Some(perm) = queue.pop() {
        for generator in generators {
            let next = perm.then(generator);
            if seen.insert(next.clone()) {
                queue.push(next);
            }
        }
    }

    seen.len()
}

proptest! {
    #[test]
    fn canonical_graph_is_isomorphism_invariant((graph, renumbering) in graph_and_renumbering(9)) {
        let renumbered = graph.permuted(&renumbering).unwrap();

        let form = canonize_simple(&graph).unwrap();
        let other = canonize_simple(&renumbered).unwrap();

        prop_assert_eq!(
            form.canonical_graph(&graph).unwrap(),
            other.canonical_graph(&renumbered).unwrap()
        );
        prop_assert_eq!(form.group_order(), other.group_order());
        prop_assert_eq!(form.orbit_count(), other.orbit_count());
    }

    #[test]
    fn canonization_is_deterministic((graph, _) in graph_and_renumbering(9)) {
        let first = canonize_simple(&graph).unwrap();
        let second = canonize_simple(&graph).unwrap();

        prop_assert_eq!(first.labeling(), second.labeling());
        prop_assert_eq!(
            first.generators().iter().collect::<HashSet<_>>(),
            second.generators().iter().collect::<HashSet<_>>()
        );
    }

    #[test]
    fn generators_are_automorphisms((graph, _) in graph_and_renumbering(8)) {
        let form = canonize_simple(&graph).unwrap();

        for perm in form.generators() {
            prop_assert!(!perm.is_identity());
            prop_assert!(perm.is_automorphism_of(&graph));
        }

        let order = generated_order(graph.vertex_count(), form.generators());
        prop_assert_eq!(order as f64, form.group_order());
    }

    #[test]
    fn pruning_agrees_with_full_search((graph, _) in graph_and_renumbering(7)) {
        let n = graph.vertex_count();
        let pruned = canonize_with_partition(&graph, Partition::unit(n), &Options::default()).unwrap();
        let full = canonize_with_partition(
            &graph,
            Partition::unit(n),
            &Options { prune: false, ..Options::default() },
        )
        .unwrap();

        prop_assert_eq!(
            pruned.canonical_graph(&graph).unwrap(),
            full.canonical_graph(&graph).unwrap()
        );
        prop_assert_eq!(pruned.group_order(), full.group_order());
    }

    #[test]
    fn colored_canonical_graph_is_invariant(
        (graph, renumbering) in graph_and_renumbering(9),
        palette in proptest::collection::vec(0u8..3, 8),
    ) {
        let n = graph.vertex_count();
        let colors = &palette[..n];
        let mut renumbered_colors = vec![0; n];
        for (v, &color) in colors.iter().enumerate() {
            renumbered_colors[renumbering[v]] = color;
        }
        let renumbered = graph.permuted(&renumbering).unwrap();

        let form = canonize_colored(&graph, colors).unwrap();
        let other = canonize_colored(&renumbered, &renumbered_colors).unwrap();

        prop_assert_eq!(
            form.canonical_graph(&graph).unwrap(),
            other.canonical_graph(&renumbered).unwrap()
        );
        for perm in form.generators() {
            prop_assert!(perm.is_automorphism_of(&graph));
            prop_assert!((0..n).all(|v| colors[perm.apply(v)] == colors[v]));
        }
    }
}
