//! Conversion of a [`Graph`] into a Graphviz DOT AST.
//!
//! Every element gets a synthetic, engine-safe identifier: nodes are `n<i>`
//! and clusters `cluster_<i>`, where `i` is the element's declaration index.
//! Human-facing text (titles, labels, cluster names) only ever appears in
//! quoted attribute values, so it can contain anything.
//!
//! Attribute precedence, lowest first:
//!
//! 1. House-style defaults (fonts, colors, spacing).
//! 2. Diagram-derived values (title label, direction, curve style).
//! 3. Caller attributes from [`DiagramConfig`].
//!
//! Per-element attributes set through the graph always win over all three.

use std::path::PathBuf;

use dot_structures::{
    Attribute, Edge as DotEdge, EdgeTy, Graph as DotGraph, GraphAttributes, Id, Node as DotNode,
    NodeId, Stmt, Subgraph, Vertex,
};
use graphviz_rust::printer::{DotPrinter, PrinterContext};
use log::{debug, warn};

use trellis_core::{
    attributes::AttrMap,
    graph::{Child, ClusterHandle, Edge, Endpoint, Graph, NodeHandle, NodeKind},
};

use crate::{TrellisError, config::DiagramConfig};

const GRAPH_DEFAULTS: &[(&str, &str)] = &[
    ("pad", "2.0"),
    ("splines", "ortho"),
    ("nodesep", "0.60"),
    ("ranksep", "0.75"),
    ("fontname", "Sans-Serif"),
    ("fontsize", "15"),
    ("fontcolor", "#2D3436"),
];

const NODE_DEFAULTS: &[(&str, &str)] = &[
    ("shape", "box"),
    ("style", "rounded"),
    ("fixedsize", "true"),
    ("width", "1.4"),
    ("height", "1.4"),
    ("labelloc", "b"),
    ("imagescale", "true"),
    ("fontname", "Sans-Serif"),
    ("fontsize", "13"),
    ("fontcolor", "#2D3436"),
];

const EDGE_DEFAULTS: &[(&str, &str)] = &[
    ("color", "#7B8894"),
    ("fontcolor", "#2D3436"),
    ("fontname", "Sans-Serif"),
    ("fontsize", "13"),
];

const CLUSTER_DEFAULTS: &[(&str, &str)] = &[
    ("shape", "box"),
    ("style", "rounded"),
    ("labeljust", "l"),
    ("pencolor", "#AEB6BE"),
    ("fontname", "Sans-Serif"),
    ("fontsize", "12"),
];

/// Cluster fill colors, cycled by nesting depth.
const CLUSTER_BACKGROUNDS: &[&str] = &["#E5F5FD", "#EBF3E7", "#ECE8F6", "#FDF7E3"];

/// Icon nodes are taller than plain ones to leave room for the label under
/// the image; each extra label line adds a little more.
const ICON_NODE_HEIGHT: f64 = 1.9;
const ICON_LINE_HEIGHT: f64 = 0.4;

/// Builds the DOT AST for one diagram.
pub struct DotEmitter<'a> {
    title: &'a str,
    graph: &'a Graph,
    config: &'a DiagramConfig,
}

impl<'a> DotEmitter<'a> {
    pub fn new(title: &'a str, graph: &'a Graph, config: &'a DiagramConfig) -> Self {
        Self {
            title,
            graph,
            config,
        }
    }

    /// Emits the whole diagram as a `digraph`.
    ///
    /// Clusters and nodes are emitted in declaration order within their
    /// parent, followed by all edges in declaration order. The graph is never
    /// `strict`: parallel edges between the same pair of nodes all survive.
    ///
    /// # Errors
    ///
    /// [`TrellisError::InvalidGraph`] if an edge ends at a cluster that holds
    /// no node at any depth.
    pub fn emit(&self) -> Result<DotGraph, TrellisError> {
        let compound = self.graph.edges().any(|(_, edge)| {
            matches!(edge.source(), Endpoint::Cluster(_))
                || matches!(edge.target(), Endpoint::Cluster(_))
        });
        self.warn_unresolved_icons();

        let mut stmts = vec![
            Stmt::GAttribute(GraphAttributes::Graph(to_attributes(&self.graph_attrs(compound)))),
            Stmt::GAttribute(GraphAttributes::Node(to_attributes(&self.node_defaults()))),
            Stmt::GAttribute(GraphAttributes::Edge(to_attributes(&self.edge_defaults()))),
        ];

        for child in self.graph.root_children() {
            stmts.push(self.child_stmt(*child)?);
        }
        for (_, edge) in self.graph.edges() {
            stmts.push(self.edge_stmt(edge)?);
        }

        debug!(
            title = self.title,
            nodes = self.graph.nodes_count(),
            clusters = self.graph.clusters_count(),
            edges = self.graph.edges_count(),
            compound;
            "DOT graph emitted"
        );

        Ok(DotGraph::DiGraph {
            id: quoted(self.title),
            strict: false,
            stmts,
        })
    }

    fn warn_unresolved_icons(&self) {
        if self.config.icon_dir().is_some() {
            return;
        }
        let icons = self
            .graph
            .nodes()
            .filter(|(_, node)| matches!(node.kind(), NodeKind::Icon(_)))
            .count();
        if icons > 0 {
            warn!(
                title = self.title,
                icons;
                "No icon directory configured, built-in icons are drawn as plain nodes"
            );
        }
    }

    fn graph_attrs(&self, compound: bool) -> AttrMap {
        let mut attrs = defaults(GRAPH_DEFAULTS);
        attrs
            .set("label", self.title)
            .set("rankdir", self.config.direction().as_str())
            .set("splines", self.config.curve_style().as_str());
        if compound {
            attrs.set("compound", "true");
        }
        if let Some(color) = self.config.background_color() {
            attrs.set("bgcolor", color.to_hex());
        }
        attrs.merge(&self.config.graph_attrs().to_attr_map());
        attrs
    }

    fn node_defaults(&self) -> AttrMap {
        let mut attrs = defaults(NODE_DEFAULTS);
        attrs.merge(&self.config.node_attrs().to_attr_map());
        attrs
    }

    fn edge_defaults(&self) -> AttrMap {
        let mut attrs = defaults(EDGE_DEFAULTS);
        attrs.merge(&self.config.edge_attrs().to_attr_map());
        attrs
    }

    fn child_stmt(&self, child: Child) -> Result<Stmt, TrellisError> {
        match child {
            Child::Node(node) => Ok(Stmt::Node(self.node_stmt(node)?)),
            Child::Cluster(cluster) => Ok(Stmt::Subgraph(self.cluster_stmt(cluster)?)),
        }
    }

    fn cluster_stmt(&self, handle: ClusterHandle) -> Result<Subgraph, TrellisError> {
        let cluster = self.graph.cluster(handle)?;
        let depth = self.graph.depth(handle)?;

        let mut attrs = defaults(CLUSTER_DEFAULTS);
        attrs
            .set("label", cluster.name())
            .set("rankdir", cluster.direction().as_str())
            .set("bgcolor", CLUSTER_BACKGROUNDS[depth % CLUSTER_BACKGROUNDS.len()]);
        attrs.merge(cluster.attrs());

        let mut stmts: Vec<Stmt> = to_attributes(&attrs).into_iter().map(Stmt::Attribute).collect();
        for child in cluster.children() {
            stmts.push(self.child_stmt(*child)?);
        }

        Ok(Subgraph {
            id: Id::Plain(cluster_id(handle)),
            stmts,
        })
    }

    fn node_stmt(&self, handle: NodeHandle) -> Result<DotNode, TrellisError> {
        let node = self.graph.node(handle)?;

        let image = self.node_image(handle, node.kind());
        // A bare icon that lost its image still needs something to show.
        let label = match node.kind() {
            NodeKind::Icon(icon) if image.is_none() && node.label().is_empty() => icon.name(),
            _ => node.label(),
        };

        let mut attrs = AttrMap::new();
        attrs.set("label", label);
        if let Some(image) = image {
            let lines = node.label().matches('\n').count() as f64;
            attrs
                .set("shape", "none")
                .set("height", format!("{:.1}", ICON_NODE_HEIGHT + ICON_LINE_HEIGHT * lines))
                .set("image", image.display().to_string());
        }
        attrs.merge(node.attrs());

        Ok(DotNode {
            id: NodeId(Id::Plain(node_id(handle)), None),
            attributes: to_attributes(&attrs),
        })
    }

    /// Image file for an icon node, or `None` to draw it plain.
    fn node_image(&self, handle: NodeHandle, kind: &NodeKind) -> Option<PathBuf> {
        match kind {
            NodeKind::Plain => None,
            NodeKind::Custom(path) => Some(path.clone()),
            NodeKind::Icon(icon) => {
                let icon_dir = self.config.icon_dir()?;
                let path = icon_dir.join(icon.relative_path());
                if path.is_file() {
                    Some(path)
                } else {
                    warn!(
                        node:% = handle,
                        icon:% = icon,
                        path = path.display().to_string();
                        "Built-in icon image not found, drawing plain node"
                    );
                    None
                }
            }
        }
    }

    fn edge_stmt(&self, edge: &Edge) -> Result<Stmt, TrellisError> {
        let link = edge.link();
        let (tail, ltail) = self.vertex(edge.source())?;
        let (head, lhead) = self.vertex(edge.target())?;

        let mut attrs = AttrMap::new();
        if let Some(label) = link.label().filter(|label| !label.is_empty()) {
            attrs.set("label", label);
        }
        attrs.merge(link.attrs());
        attrs.set("dir", link.direction().as_dot());
        if let Some(cluster) = ltail {
            attrs.set("ltail", cluster);
        }
        if let Some(cluster) = lhead {
            attrs.set("lhead", cluster);
        }

        Ok(Stmt::Edge(DotEdge {
            ty: EdgeTy::Pair(Vertex::N(tail), Vertex::N(head)),
            attributes: to_attributes(&attrs),
        }))
    }

    /// Resolves an endpoint to a concrete node. A cluster endpoint anchors on
    /// its first node and reports the cluster id for `ltail`/`lhead` clipping.
    fn vertex(&self, endpoint: Endpoint) -> Result<(NodeId, Option<String>), TrellisError> {
        match endpoint {
            Endpoint::Node(node) => Ok((NodeId(Id::Plain(node_id(node)), None), None)),
            Endpoint::Cluster(cluster) => {
                let anchor = self.graph.first_node(cluster)?.ok_or_else(|| {
                    let name = self
                        .graph
                        .cluster(cluster)
                        .map(|c| c.name().to_string())
                        .unwrap_or_default();
                    TrellisError::InvalidGraph(format!(
                        "cluster `{name}` has no nodes for an edge to attach to"
                    ))
                })?;
                Ok((
                    NodeId(Id::Plain(node_id(anchor)), None),
                    Some(cluster_id(cluster)),
                ))
            }
        }
    }
}

/// Prints a DOT AST as text.
pub fn to_dot_string(graph: &DotGraph) -> String {
    graph.print(&mut PrinterContext::default())
}

fn node_id(node: NodeHandle) -> String {
    format!("n{}", node.index())
}

/// Graphviz only draws a subgraph as a box when its id starts with `cluster`.
fn cluster_id(cluster: ClusterHandle) -> String {
    format!("cluster_{}", cluster.index())
}

fn defaults(pairs: &[(&str, &str)]) -> AttrMap {
    pairs.iter().copied().collect()
}

fn to_attributes(attrs: &AttrMap) -> Vec<Attribute> {
    attrs
        .iter()
        .map(|(key, value)| Attribute(Id::Plain(key.to_string()), quoted(value)))
        .collect()
}

/// Label escapes Graphviz expands inside quoted strings: line breaks and
/// the object-name placeholders.
const LABEL_ESCAPES: &[char] = &['n', 'l', 'r', 'N', 'G', 'E', 'T', 'H', 'L'];

/// Quotes `value` as a DOT string. Embedded quotes are escaped and newlines
/// become `\n` line breaks. A backslash is kept as-is only when it starts one
/// of the [`LABEL_ESCAPES`]; any other backslash, including a trailing one, is
/// doubled so it cannot swallow the closing quote.
fn quoted(value: &str) -> Id {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            '\\' if chars.peek().is_some_and(|next| LABEL_ESCAPES.contains(next)) => {
                escaped.push('\\');
            }
            '\\' => escaped.push_str("\\\\"),
            c => escaped.push(c),
        }
    }
    escaped.push('"');
    Id::Escaped(escaped)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;
    use trellis_core::{
        attributes::RenderAttributes,
        catalog::onprem::vcs::GITHUB,
        color::Color,
        graph::{Link, Parent, RankDir},
    };

    use super::*;

    fn attr<'s>(attrs: &'s [Attribute], key: &str) -> Option<&'s str> {
        attrs.iter().find_map(|Attribute(k, v)| match (k, v) {
            (Id::Plain(k), Id::Escaped(v)) if k == key => Some(v.as_str()),
            _ => None,
        })
    }

    fn graph_attrs(dot: &DotGraph) -> &[Attribute] {
        let DotGraph::DiGraph { stmts, .. } = dot else {
            panic!("expected digraph");
        };
        stmts
            .iter()
            .find_map(|stmt| match stmt {
                Stmt::GAttribute(GraphAttributes::Graph(attrs)) => Some(attrs.as_slice()),
                _ => None,
            })
            .expect("graph attributes")
    }

    fn stmts(dot: &DotGraph) -> &[Stmt] {
        match dot {
            DotGraph::DiGraph { stmts, .. } | DotGraph::Graph { stmts, .. } => stmts,
        }
    }

    fn edges(dot: &DotGraph) -> Vec<&DotEdge> {
        stmts(dot)
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Edge(edge) => Some(edge),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_title_and_defaults() {
        let graph = Graph::new();
        let config = DiagramConfig::default();

        let dot = DotEmitter::new("Architecture", &graph, &config).emit().unwrap();

        let DotGraph::DiGraph { id, strict, .. } = &dot else {
            panic!("expected digraph");
        };
        assert_eq!(*id, Id::Escaped("\"Architecture\"".to_string()));
        assert!(!strict);

        let attrs = graph_attrs(&dot);
        assert_eq!(attr(attrs, "label"), Some("\"Architecture\""));
        assert_eq!(attr(attrs, "pad"), Some("\"2.0\""));
        assert_eq!(attr(attrs, "rankdir"), Some("\"LR\""));
        assert_eq!(attr(attrs, "splines"), Some("\"ortho\""));
        assert_eq!(attr(attrs, "compound"), None);
    }

    #[test]
    fn test_caller_attributes_override_defaults() {
        let graph = Graph::new();
        let config = DiagramConfig::default()
            .with_direction(RankDir::TopToBottom)
            .with_background_color(Color::new("white").unwrap())
            .with_graph_attrs(RenderAttributes::new().with_pad("0.5").with_fontname("Open Sans"));

        let dot = DotEmitter::new("Styled", &graph, &config).emit().unwrap();
        let attrs = graph_attrs(&dot);

        assert_eq!(attr(attrs, "pad"), Some("\"0.5\""));
        assert_eq!(attr(attrs, "fontname"), Some("\"Open Sans\""));
        assert_eq!(attr(attrs, "rankdir"), Some("\"TB\""));
        assert_eq!(attr(attrs, "bgcolor"), Some("\"#ffffff\""));
    }

    #[test]
    fn test_nested_clusters_become_nested_subgraphs() {
        let mut graph = Graph::new();
        let outer = graph.new_cluster("K8s cluster", Parent::Root).unwrap();
        let inner = graph.new_cluster("CI/CD Operator", outer).unwrap();
        graph.new_node(NodeKind::Plain, "Webhook server", inner).unwrap();
        let config = DiagramConfig::default();

        let dot = DotEmitter::new("Nested", &graph, &config).emit().unwrap();

        let is_subgraph = |s: &&Stmt| matches!(s, Stmt::Subgraph(_));
        let Some(Stmt::Subgraph(outer_sg)) = stmts(&dot).iter().find(is_subgraph) else {
            panic!("expected top-level subgraph");
        };
        assert_eq!(outer_sg.id, Id::Plain("cluster_0".to_string()));
        let Some(Stmt::Subgraph(inner_sg)) = outer_sg.stmts.iter().find(is_subgraph) else {
            panic!("expected nested subgraph");
        };
        assert_eq!(inner_sg.id, Id::Plain("cluster_1".to_string()));

        let inner_attrs: Vec<Attribute> = inner_sg
            .stmts
            .iter()
            .filter_map(|s| match s {
                Stmt::Attribute(a) => Some(a.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(attr(&inner_attrs, "label"), Some("\"CI/CD Operator\""));
        assert_eq!(attr(&inner_attrs, "bgcolor"), Some("\"#EBF3E7\""));
        assert!(inner_sg.stmts.iter().any(|s| matches!(s, Stmt::Node(_))));
    }

    #[test]
    fn test_edges_keep_declaration_order_and_direction() {
        let mut graph = Graph::new();
        let a = graph.new_node(NodeKind::Plain, "a", Parent::Root).unwrap();
        let b = graph.new_node(NodeKind::Plain, "b", Parent::Root).unwrap();
        graph.connect(b, a, Link::undirected().with_label("second?")).unwrap();
        graph.connect(a, b, Link::directed()).unwrap();
        graph.connect(a, b, Link::reversed()).unwrap();
        let config = DiagramConfig::default();

        let dot = DotEmitter::new("Edges", &graph, &config).emit().unwrap();
        let edges = edges(&dot);

        assert_eq!(edges.len(), 3);
        assert_eq!(attr(&edges[0].attributes, "dir"), Some("\"none\""));
        assert_eq!(attr(&edges[0].attributes, "label"), Some("\"second?\""));
        assert_eq!(attr(&edges[1].attributes, "dir"), Some("\"forward\""));
        assert_eq!(attr(&edges[1].attributes, "label"), None);
        assert_eq!(attr(&edges[2].attributes, "dir"), Some("\"back\""));
        let EdgeTy::Pair(Vertex::N(tail), _) = &edges[0].ty else {
            panic!("expected pair edge");
        };
        assert_eq!(tail.0, Id::Plain("n1".to_string()));
    }

    #[test]
    fn test_cluster_endpoint_uses_compound_edge() {
        let mut graph = Graph::new();
        let cluster = graph.new_cluster("Remote Git", Parent::Root).unwrap();
        graph.new_node(NodeKind::Plain, "github", cluster).unwrap();
        let target = graph.new_node(NodeKind::Plain, "ingress", Parent::Root).unwrap();
        graph.connect(cluster, target, Link::directed()).unwrap();
        let config = DiagramConfig::default();

        let dot = DotEmitter::new("Compound", &graph, &config).emit().unwrap();

        assert_eq!(attr(graph_attrs(&dot), "compound"), Some("\"true\""));
        let edges = edges(&dot);
        assert_eq!(attr(&edges[0].attributes, "ltail"), Some("\"cluster_0\""));
        assert_eq!(attr(&edges[0].attributes, "lhead"), None);
    }

    #[test]
    fn test_edge_to_empty_cluster_is_invalid() {
        let mut graph = Graph::new();
        let empty = graph.new_cluster("Empty", Parent::Root).unwrap();
        let node = graph.new_node(NodeKind::Plain, "n", Parent::Root).unwrap();
        graph.connect(node, empty, Link::directed()).unwrap();
        let config = DiagramConfig::default();

        let result = DotEmitter::new("Empty", &graph, &config).emit();

        assert!(matches!(result, Err(TrellisError::InvalidGraph(_))));
    }

    #[test]
    fn test_icon_nodes() {
        let dir = tempdir().unwrap();
        let custom = dir.path().join("tekton.png");
        fs::write(&custom, b"png").unwrap();

        let mut graph = Graph::new();
        let github = graph.new_node(GITHUB, "github", Parent::Root).unwrap();
        let tekton = graph
            .new_node(NodeKind::custom(&custom), "Pipeline\nRun", Parent::Root)
            .unwrap();
        let config = DiagramConfig::default().with_icon_dir(dir.path());

        let dot = DotEmitter::new("Icons", &graph, &config).emit().unwrap();
        let nodes: Vec<&DotNode> = stmts(&dot)
            .iter()
            .filter_map(|s| match s {
                Stmt::Node(node) => Some(node),
                _ => None,
            })
            .collect();

        // github.png was never written, so the built-in icon degrades to a plain node
        assert_eq!(nodes[github.index()].id.0, Id::Plain("n0".to_string()));
        assert_eq!(attr(&nodes[github.index()].attributes, "image"), None);

        let attrs = &nodes[tekton.index()].attributes;
        assert_eq!(attr(attrs, "shape"), Some("\"none\""));
        assert_eq!(attr(attrs, "height"), Some("\"2.3\""));
        assert_eq!(attr(attrs, "label"), Some("\"Pipeline\\nRun\""));
        let expected_image = format!("\"{}\"", custom.display());
        assert_eq!(attr(attrs, "image"), Some(expected_image.as_str()));
    }

    #[test]
    fn test_quoted_escapes() {
        assert_eq!(quoted("plain"), Id::Escaped("\"plain\"".to_string()));
        assert_eq!(
            quoted("say \"hi\""),
            Id::Escaped("\"say \\\"hi\\\"\"".to_string())
        );
    }

    #[test]
    fn test_quoted_backslashes() {
        // A trailing backslash must not escape the closing quote
        assert_eq!(quoted("C:\\"), Id::Escaped(r#""C:\\""#.to_string()));
        assert_eq!(
            quoted(r"C:\icons\tekton.png"),
            Id::Escaped(r#""C:\\icons\\tekton.png""#.to_string())
        );
        // Graphviz label escapes are left for the engine to expand
        assert_eq!(quoted(r"left\l"), Id::Escaped(r#""left\l""#.to_string()));
        assert_eq!(quoted(r"\N"), Id::Escaped(r#""\N""#.to_string()));
        assert_eq!(quoted(r#"a\"b"#), Id::Escaped(r#""a\\\"b""#.to_string()));
    }

    #[test]
    fn test_trailing_backslash_label_prints_closed_string() {
        let mut graph = Graph::new();
        graph.new_node(NodeKind::Plain, "C:\\", Parent::Root).unwrap();
        let config = DiagramConfig::default();

        let dot = DotEmitter::new("Paths", &graph, &config).emit().unwrap();
        let text = to_dot_string(&dot);

        assert!(text.contains(r#"label="C:\\""#));
    }

    #[test]
    fn test_printed_output_is_a_digraph() {
        let mut graph = Graph::new();
        let a = graph.new_node(NodeKind::Plain, "a", Parent::Root).unwrap();
        let b = graph.new_node(NodeKind::Plain, "b", Parent::Root).unwrap();
        graph.connect(a, b, Link::directed()).unwrap();
        let config = DiagramConfig::default();

        let dot = DotEmitter::new("Printed", &graph, &config).emit().unwrap();
        let text = to_dot_string(&dot);

        assert!(text.starts_with("digraph"));
        assert!(text.contains("\"Printed\""));
    }

    #[test]
    fn test_parallel_edges_are_all_emitted() {
        let mut graph = Graph::new();
        let a = graph.new_node(NodeKind::Plain, "a", Parent::Root).unwrap();
        let b = graph.new_node(NodeKind::Plain, "b", Parent::Root).unwrap();
        graph.connect(a, b, Link::directed().with_label("Push")).unwrap();
        graph.connect(a, b, Link::directed().with_label("Poll")).unwrap();
        let config = DiagramConfig::default();

        let dot = DotEmitter::new("Multi", &graph, &config).emit().unwrap();

        let DotGraph::DiGraph { strict, .. } = &dot else {
            panic!("expected digraph");
        };
        assert!(!strict);
        let labels: Vec<_> = edges(&dot)
            .iter()
            .map(|edge| attr(&edge.attributes, "label"))
            .collect();
        assert_eq!(labels, vec![Some("\"Push\""), Some("\"Poll\"")]);
        assert!(!to_dot_string(&dot).starts_with("strict"));
    }

    #[test]
    fn test_caller_edge_font_reaches_labels() {
        let mut graph = Graph::new();
        let a = graph.new_node(NodeKind::Plain, "a", Parent::Root).unwrap();
        let b = graph.new_node(NodeKind::Plain, "b", Parent::Root).unwrap();
        graph.connect(a, b, Link::directed().with_label("Queued")).unwrap();
        let config = DiagramConfig::default()
            .with_edge_attrs(RenderAttributes::new().with_fontname("Open Sans"));

        let dot = DotEmitter::new("Fonts", &graph, &config).emit().unwrap();

        let edge_defaults = stmts(&dot)
            .iter()
            .find_map(|stmt| match stmt {
                Stmt::GAttribute(GraphAttributes::Edge(attrs)) => Some(attrs.as_slice()),
                _ => None,
            })
            .expect("edge defaults");
        assert_eq!(attr(edge_defaults, "fontname"), Some("\"Open Sans\""));
        assert_eq!(attr(edge_defaults, "fontsize"), Some("\"13\""));
        let edges = edges(&dot);
        assert_eq!(attr(&edges[0].attributes, "fontname"), None);
        assert_eq!(attr(&edges[0].attributes, "label"), Some("\"Queued\""));
    }

    #[test]
    fn test_icon_without_directory_keeps_a_label() {
        let mut graph = Graph::new();
        let bare = graph.new_node(GITHUB, "", Parent::Root).unwrap();
        let named = graph.new_node(GITHUB, "mirror", Parent::Root).unwrap();
        let config = DiagramConfig::default();

        let dot = DotEmitter::new("Bare", &graph, &config).emit().unwrap();
        let nodes: Vec<&DotNode> = stmts(&dot)
            .iter()
            .filter_map(|s| match s {
                Stmt::Node(node) => Some(node),
                _ => None,
            })
            .collect();

        assert_eq!(attr(&nodes[bare.index()].attributes, "label"), Some("\"github\""));
        assert_eq!(attr(&nodes[bare.index()].attributes, "image"), None);
        assert_eq!(attr(&nodes[named.index()].attributes, "label"), Some("\"mirror\""));
    }
}
