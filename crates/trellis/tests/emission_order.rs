//! Property tests for DOT emission.
//!
//! For any set of nodes and any edge list, the emitted graph holds exactly one
//! node statement per node and one edge statement per declared edge, in
//! declaration order, with parallel edges kept apart.

use dot_structures::{EdgeTy, Graph as DotGraph, Id, NodeId, Stmt, Vertex};
use proptest::prelude::*;

use trellis::{
    config::DiagramConfig,
    export::dot::DotEmitter,
    graph::{Graph, Link, NodeKind, Parent},
};

fn plain_id(node_id: &NodeId) -> String {
    match &node_id.0 {
        Id::Plain(id) => id.clone(),
        other => panic!("unexpected node id {other:?}"),
    }
}

proptest! {
    #[test]
    fn edges_are_emitted_in_declaration_order(
        node_count in 1usize..12,
        pairs in prop::collection::vec((0usize..12, 0usize..12), 0..30),
    ) {
        let mut graph = Graph::new();
        let nodes: Vec<_> = (0..node_count)
            .map(|i| graph.new_node(NodeKind::Plain, format!("node {i}"), Parent::Root).unwrap())
            .collect();

        let mut declared = Vec::new();
        for (source, target) in pairs {
            let (source, target) = (source % node_count, target % node_count);
            graph.connect(nodes[source], nodes[target], Link::directed()).unwrap();
            declared.push((format!("n{source}"), format!("n{target}")));
        }

        let config = DiagramConfig::default();
        let dot = DotEmitter::new("Order", &graph, &config).emit().unwrap();
        let DotGraph::DiGraph { stmts, .. } = dot else {
            panic!("expected digraph");
        };

        let node_stmts = stmts.iter().filter(|stmt| matches!(stmt, Stmt::Node(_))).count();
        prop_assert_eq!(node_stmts, node_count);

        let emitted: Vec<(String, String)> = stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Edge(edge) => match &edge.ty {
                    EdgeTy::Pair(Vertex::N(tail), Vertex::N(head)) => {
                        Some((plain_id(tail), plain_id(head)))
                    }
                    _ => None,
                },
                _ => None,
            })
            .collect();
        prop_assert_eq!(emitted, declared);
    }
}
