//! Property tests for cluster re-parenting.
//!
//! Whatever sequence of moves is attempted, the cluster structure stays a
//! tree: every cluster is listed by exactly one parent, and walking parents
//! always reaches the root.

use proptest::prelude::*;

use trellis_core::graph::{Child, ClusterHandle, Graph, GraphError, Parent};

const CLUSTERS: usize = 8;

fn build() -> (Graph, Vec<ClusterHandle>) {
    let mut graph = Graph::new();
    let clusters = (0..CLUSTERS)
        .map(|i| {
            graph
                .new_cluster(format!("cluster-{i}"), Parent::Root)
                .expect("root parent is always valid")
        })
        .collect();
    (graph, clusters)
}

fn listings(graph: &Graph, cluster: ClusterHandle) -> usize {
    let in_root = graph
        .root_children()
        .iter()
        .filter(|child| **child == Child::Cluster(cluster))
        .count();
    let in_clusters: usize = graph
        .clusters()
        .map(|(_, parent)| {
            parent
                .children()
                .iter()
                .filter(|child| **child == Child::Cluster(cluster))
                .count()
        })
        .sum();
    in_root + in_clusters
}

proptest! {
    #[test]
    fn reparenting_never_creates_a_cycle(
        moves in prop::collection::vec((0..CLUSTERS, 0..=CLUSTERS), 0..40)
    ) {
        let (mut graph, clusters) = build();

        for (cluster, parent) in moves {
            let parent = if parent == CLUSTERS {
                Parent::Root
            } else {
                Parent::Cluster(clusters[parent])
            };
            match graph.set_cluster_parent(clusters[cluster], parent) {
                Ok(()) => {}
                Err(GraphError::InvalidGraph(_)) => {}
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
        }

        for &cluster in &clusters {
            prop_assert_eq!(listings(&graph, cluster), 1);
            let depth = graph.depth(cluster).expect("cluster belongs to graph");
            prop_assert!(depth < CLUSTERS);
            prop_assert!(!graph.is_ancestor(cluster, cluster));
        }
    }
}
