//! In-memory diagram graph.
//!
//! The [`Graph`] is the single source of truth for one diagram: a flat
//! registry of nodes, a tree of clusters, and an ordered edge list. Every
//! declaration goes through an explicit `&mut Graph`; there is no ambient
//! "current diagram" or "current cluster".
//!
//! # Handles
//!
//! Declarations return small `Copy` handles ([`NodeHandle`], [`ClusterHandle`],
//! [`EdgeHandle`]). A handle remembers which graph minted it, so a handle from
//! one graph is rejected by another with [`GraphError::InvalidGraph`] instead
//! of silently addressing an unrelated element.
//!
//! # Ordering
//!
//! Nodes and clusters keep the order in which they were added to their parent,
//! and edges keep declaration order. Parallel edges are distinct entries; the
//! graph is a multigraph and never deduplicates.
//!
//! # Example
//!
//! ```
//! use trellis_core::{
//!     catalog::onprem::vcs::GITHUB,
//!     graph::{Graph, Link, NodeKind, Parent},
//! };
//!
//! let mut graph = Graph::new();
//! let remote = graph.new_cluster("Remote Git", Parent::Root)?;
//! let github = graph.new_node(GITHUB, "github", remote)?;
//! let ingress = graph.new_node(NodeKind::Plain, "ingress", Parent::Root)?;
//!
//! graph.connect(github, ingress, Link::directed().with_label("Push"))?;
//! assert_eq!(graph.edges_count(), 1);
//! # Ok::<(), trellis_core::graph::GraphError>(())
//! ```

use std::{
    fmt,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
};

use log::{debug, trace};
use serde::Deserialize;
use thiserror::Error;

use crate::{attributes::AttrMap, catalog::Icon};

/// Source of graph identities; only used to tag handles.
static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// Errors raised while declaring or querying a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    #[error("custom icon `{}` does not exist", .0.display())]
    AssetMissing(PathBuf),
}

pub type Result<T> = std::result::Result<T, GraphError>;

// =============================================================================
// Handles
// =============================================================================

/// Identity of a [`Graph`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphId(u64);

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graph#{}", self.0)
    }
}

/// Handle to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    graph: GraphId,
    index: usize,
}

impl NodeHandle {
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    /// Position in the owning graph's node registry.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {} of {}", self.index, self.graph)
    }
}

/// Handle to a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterHandle {
    graph: GraphId,
    index: usize,
}

impl ClusterHandle {
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for ClusterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster {} of {}", self.index, self.graph)
    }
}

/// Handle to an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeHandle {
    graph: GraphId,
    index: usize,
}

impl EdgeHandle {
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Where a node or cluster lives: directly under the diagram, or inside a
/// cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Parent {
    #[default]
    Root,
    Cluster(ClusterHandle),
}

impl From<ClusterHandle> for Parent {
    fn from(cluster: ClusterHandle) -> Self {
        Parent::Cluster(cluster)
    }
}

/// One end of an edge. An edge that ends at a cluster addresses the cluster
/// as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Node(NodeHandle),
    Cluster(ClusterHandle),
}

impl From<NodeHandle> for Endpoint {
    fn from(node: NodeHandle) -> Self {
        Endpoint::Node(node)
    }
}

impl From<ClusterHandle> for Endpoint {
    fn from(cluster: ClusterHandle) -> Self {
        Endpoint::Cluster(cluster)
    }
}

/// Entry in a parent's ordered child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Child {
    Node(NodeHandle),
    Cluster(ClusterHandle),
}

// =============================================================================
// Element data
// =============================================================================

/// How a node is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NodeKind {
    /// A labeled box without an icon.
    #[default]
    Plain,
    /// A built-in catalog icon.
    Icon(Icon),
    /// An arbitrary local image file.
    Custom(PathBuf),
}

impl NodeKind {
    pub fn custom(path: impl Into<PathBuf>) -> Self {
        NodeKind::Custom(path.into())
    }
}

impl From<Icon> for NodeKind {
    fn from(icon: Icon) -> Self {
        NodeKind::Icon(icon)
    }
}

/// Rank direction of a diagram or cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum RankDir {
    #[serde(rename = "TB")]
    TopToBottom,
    #[serde(rename = "BT")]
    BottomToTop,
    #[default]
    #[serde(rename = "LR")]
    LeftToRight,
    #[serde(rename = "RL")]
    RightToLeft,
}

impl RankDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankDir::TopToBottom => "TB",
            RankDir::BottomToTop => "BT",
            RankDir::LeftToRight => "LR",
            RankDir::RightToLeft => "RL",
        }
    }
}

impl std::str::FromStr for RankDir {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TB" => Ok(RankDir::TopToBottom),
            "BT" => Ok(RankDir::BottomToTop),
            "LR" => Ok(RankDir::LeftToRight),
            "RL" => Ok(RankDir::RightToLeft),
            _ => Err(format!("invalid direction `{s}`, expected one of TB, BT, LR, RL")),
        }
    }
}

/// Which way an edge's arrowheads point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArrowDirection {
    /// `a >> b`
    #[default]
    Forward,
    /// `a << b`
    Back,
    Both,
    /// Undirected association, `a - b`.
    None,
}

impl ArrowDirection {
    /// Value of the engine's `dir` attribute.
    pub fn as_dot(&self) -> &'static str {
        match self {
            ArrowDirection::Forward => "forward",
            ArrowDirection::Back => "back",
            ArrowDirection::Both => "both",
            ArrowDirection::None => "none",
        }
    }
}

/// Everything about an edge except its endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    direction: ArrowDirection,
    label: Option<String>,
    attrs: AttrMap,
}

impl Link {
    pub fn new(direction: ArrowDirection) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// A "flows to" edge.
    pub fn directed() -> Self {
        Self::new(ArrowDirection::Forward)
    }

    /// An "associated with" edge.
    pub fn undirected() -> Self {
        Self::new(ArrowDirection::None)
    }

    pub fn reversed() -> Self {
        Self::new(ArrowDirection::Back)
    }

    pub fn bidirectional() -> Self {
        Self::new(ArrowDirection::Both)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(self, color: impl Into<String>) -> Self {
        self.with_attr("color", color)
    }

    pub fn with_style(self, style: impl Into<String>) -> Self {
        self.with_attr("style", style)
    }

    /// Sets an arbitrary engine attribute on the edge.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }

    pub fn direction(&self) -> ArrowDirection {
        self.direction
    }

    pub fn is_directed(&self) -> bool {
        self.direction != ArrowDirection::None
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    label: String,
    kind: NodeKind,
    parent: Parent,
    attrs: AttrMap,
}

impl Node {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Parent {
        self.parent
    }

    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    name: String,
    parent: Parent,
    children: Vec<Child>,
    direction: RankDir,
    attrs: AttrMap,
}

impl Cluster {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Parent {
        self.parent
    }

    /// Child nodes and clusters in insertion order.
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn direction(&self) -> RankDir {
        self.direction
    }

    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    source: Endpoint,
    target: Endpoint,
    link: Link,
}

impl Edge {
    pub fn source(&self) -> Endpoint {
        self.source
    }

    pub fn target(&self) -> Endpoint {
        self.target
    }

    pub fn link(&self) -> &Link {
        &self.link
    }
}

// =============================================================================
// Graph
// =============================================================================

/// Nodes, the cluster tree, and edges of one diagram.
#[derive(Debug)]
pub struct Graph {
    id: GraphId,
    nodes: Vec<Node>,
    clusters: Vec<Cluster>,
    edges: Vec<Edge>,
    root: Vec<Child>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates an empty graph with a fresh identity.
    pub fn new() -> Self {
        Graph {
            id: GraphId(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed)),
            nodes: Vec::new(),
            clusters: Vec::new(),
            edges: Vec::new(),
            root: Vec::new(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    /// Declares a cluster under `parent`.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidGraph`] if `parent` is not a cluster of this graph.
    pub fn new_cluster(
        &mut self,
        name: impl Into<String>,
        parent: impl Into<Parent>,
    ) -> Result<ClusterHandle> {
        let parent = parent.into();
        self.check_parent(parent)?;

        let handle = ClusterHandle {
            graph: self.id,
            index: self.clusters.len(),
        };
        let name = name.into();
        debug!(graph:% = self.id, cluster = handle.index, name = name.as_str(); "Cluster declared");

        self.clusters.push(Cluster {
            name,
            parent,
            children: Vec::new(),
            direction: RankDir::default(),
            attrs: AttrMap::new(),
        });
        self.children_of_mut(parent).push(Child::Cluster(handle));
        Ok(handle)
    }

    /// Declares a node under `parent`.
    ///
    /// A [`NodeKind::Custom`] path is not checked here; it must exist by the
    /// time the node is connected or rendered.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidGraph`] if `parent` is not a cluster of this graph.
    pub fn new_node(
        &mut self,
        kind: impl Into<NodeKind>,
        label: impl Into<String>,
        parent: impl Into<Parent>,
    ) -> Result<NodeHandle> {
        let parent = parent.into();
        self.check_parent(parent)?;

        let handle = NodeHandle {
            graph: self.id,
            index: self.nodes.len(),
        };
        let label = label.into();
        debug!(graph:% = self.id, node = handle.index, label = label.as_str(); "Node declared");

        self.nodes.push(Node {
            label,
            kind: kind.into(),
            parent,
            attrs: AttrMap::new(),
        });
        self.children_of_mut(parent).push(Child::Node(handle));
        Ok(handle)
    }

    /// Connects `source` to `target`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::InvalidGraph`] if either endpoint does not belong to
    ///   this graph.
    /// - [`GraphError::AssetMissing`] if either endpoint is a custom-icon node
    ///   whose image file does not exist.
    pub fn connect(
        &mut self,
        source: impl Into<Endpoint>,
        target: impl Into<Endpoint>,
        link: Link,
    ) -> Result<EdgeHandle> {
        let source = source.into();
        let target = target.into();
        self.check_endpoint(source)?;
        self.check_endpoint(target)?;

        let handle = EdgeHandle {
            graph: self.id,
            index: self.edges.len(),
        };
        trace!(graph:% = self.id, edge = handle.index, source:?, target:?, link:?; "Edge declared");

        self.edges.push(Edge {
            source,
            target,
            link,
        });
        Ok(handle)
    }

    /// Starts a left-to-right chain of edges at `source`.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidGraph`] if `source` does not belong to this graph.
    pub fn chain(&mut self, source: impl Into<Endpoint>) -> Result<EdgeChain<'_>> {
        let source = source.into();
        self.check_endpoint(source)?;
        Ok(EdgeChain {
            graph: self,
            source,
            edges: Vec::new(),
        })
    }

    /// Moves `cluster` (with its subtree) under `parent`, appending it to the
    /// new parent's children.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidGraph`] if either handle is foreign, or if
    /// `parent` is `cluster` itself or one of its descendants.
    pub fn set_cluster_parent(
        &mut self,
        cluster: ClusterHandle,
        parent: impl Into<Parent>,
    ) -> Result<()> {
        let parent = parent.into();
        self.check_cluster(cluster)?;
        self.check_parent(parent)?;

        if let Parent::Cluster(candidate) = parent {
            if candidate == cluster || self.is_ancestor(cluster, candidate) {
                return Err(GraphError::InvalidGraph(format!(
                    "cannot move cluster `{}` inside itself",
                    self.clusters[cluster.index].name
                )));
            }
        }

        let previous = self.clusters[cluster.index].parent;
        if previous == parent {
            return Ok(());
        }

        self.children_of_mut(previous)
            .retain(|child| *child != Child::Cluster(cluster));
        self.children_of_mut(parent).push(Child::Cluster(cluster));
        self.clusters[cluster.index].parent = parent;
        Ok(())
    }

    /// Sets an engine attribute on one node.
    pub fn set_node_attr(
        &mut self,
        node: NodeHandle,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        self.check_node(node)?;
        self.nodes[node.index].attrs.set(key, value);
        Ok(())
    }

    /// Sets an engine attribute on one cluster.
    pub fn set_cluster_attr(
        &mut self,
        cluster: ClusterHandle,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        self.check_cluster(cluster)?;
        self.clusters[cluster.index].attrs.set(key, value);
        Ok(())
    }

    pub fn set_cluster_direction(
        &mut self,
        cluster: ClusterHandle,
        direction: RankDir,
    ) -> Result<()> {
        self.check_cluster(cluster)?;
        self.clusters[cluster.index].direction = direction;
        Ok(())
    }

    pub fn node(&self, node: NodeHandle) -> Result<&Node> {
        self.check_node(node)?;
        Ok(&self.nodes[node.index])
    }

    pub fn cluster(&self, cluster: ClusterHandle) -> Result<&Cluster> {
        self.check_cluster(cluster)?;
        Ok(&self.clusters[cluster.index])
    }

    pub fn edge(&self, edge: EdgeHandle) -> Result<&Edge> {
        if edge.graph != self.id || edge.index >= self.edges.len() {
            return Err(GraphError::InvalidGraph(format!(
                "edge {} does not belong to {}",
                edge.index, self.id
            )));
        }
        Ok(&self.edges[edge.index])
    }

    /// Iterates nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        let graph = self.id;
        self.nodes
            .iter()
            .enumerate()
            .map(move |(index, node)| (NodeHandle { graph, index }, node))
    }

    /// Iterates clusters in declaration order.
    pub fn clusters(&self) -> impl Iterator<Item = (ClusterHandle, &Cluster)> {
        let graph = self.id;
        self.clusters
            .iter()
            .enumerate()
            .map(move |(index, cluster)| (ClusterHandle { graph, index }, cluster))
    }

    /// Iterates edges in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeHandle, &Edge)> {
        let graph = self.id;
        self.edges
            .iter()
            .enumerate()
            .map(move |(index, edge)| (EdgeHandle { graph, index }, edge))
    }

    /// Top-level nodes and clusters in insertion order.
    pub fn root_children(&self) -> &[Child] {
        &self.root
    }

    /// Children of `parent` in insertion order.
    pub fn children(&self, parent: Parent) -> Result<&[Child]> {
        match parent {
            Parent::Root => Ok(&self.root),
            Parent::Cluster(cluster) => Ok(self.cluster(cluster)?.children()),
        }
    }

    /// Nesting depth of `cluster`; top-level clusters have depth 0.
    pub fn depth(&self, cluster: ClusterHandle) -> Result<usize> {
        self.check_cluster(cluster)?;
        let mut depth = 0;
        let mut current = self.clusters[cluster.index].parent;
        while let Parent::Cluster(parent) = current {
            depth += 1;
            current = self.clusters[parent.index].parent;
        }
        Ok(depth)
    }

    /// Returns `true` if `ancestor` strictly contains `cluster`.
    pub fn is_ancestor(&self, ancestor: ClusterHandle, cluster: ClusterHandle) -> bool {
        if self.check_cluster(ancestor).is_err() || self.check_cluster(cluster).is_err() {
            return false;
        }
        let mut current = self.clusters[cluster.index].parent;
        while let Parent::Cluster(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.clusters[parent.index].parent;
        }
        false
    }

    /// First node found walking `cluster` depth-first in insertion order.
    pub fn first_node(&self, cluster: ClusterHandle) -> Result<Option<NodeHandle>> {
        for child in self.cluster(cluster)?.children() {
            match *child {
                Child::Node(node) => return Ok(Some(node)),
                Child::Cluster(nested) => {
                    if let Some(node) = self.first_node(nested)? {
                        return Ok(Some(node));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Checks that every custom-icon image exists on disk.
    ///
    /// # Errors
    ///
    /// [`GraphError::AssetMissing`] naming the first missing file.
    pub fn validate_assets(&self) -> Result<()> {
        for node in &self.nodes {
            check_asset(node)?;
        }
        Ok(())
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn clusters_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn edges_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.clusters.is_empty()
    }

    fn check_node(&self, node: NodeHandle) -> Result<()> {
        if node.graph != self.id || node.index >= self.nodes.len() {
            return Err(GraphError::InvalidGraph(format!(
                "{node} does not belong to {}",
                self.id
            )));
        }
        Ok(())
    }

    fn check_cluster(&self, cluster: ClusterHandle) -> Result<()> {
        if cluster.graph != self.id || cluster.index >= self.clusters.len() {
            return Err(GraphError::InvalidGraph(format!(
                "{cluster} does not belong to {}",
                self.id
            )));
        }
        Ok(())
    }

    fn check_parent(&self, parent: Parent) -> Result<()> {
        match parent {
            Parent::Root => Ok(()),
            Parent::Cluster(cluster) => self.check_cluster(cluster),
        }
    }

    fn check_endpoint(&self, endpoint: Endpoint) -> Result<()> {
        match endpoint {
            Endpoint::Node(node) => {
                self.check_node(node)?;
                check_asset(&self.nodes[node.index])
            }
            Endpoint::Cluster(cluster) => self.check_cluster(cluster),
        }
    }

    fn children_of_mut(&mut self, parent: Parent) -> &mut Vec<Child> {
        match parent {
            Parent::Root => &mut self.root,
            Parent::Cluster(cluster) => &mut self.clusters[cluster.index].children,
        }
    }
}

fn check_asset(node: &Node) -> Result<()> {
    match &node.kind {
        NodeKind::Custom(path) if !path.is_file() => Err(GraphError::AssetMissing(path.clone())),
        _ => Ok(()),
    }
}

// =============================================================================
// Edge chains
// =============================================================================

/// Builder for a path of edges, `a >> b >> c`.
///
/// Each [`then`](EdgeChain::then) connects the current source to a target and
/// makes that target the next source.
///
/// ```
/// use trellis_core::graph::{Graph, Link, NodeKind, Parent};
///
/// let mut graph = Graph::new();
/// let a = graph.new_node(NodeKind::Plain, "a", Parent::Root)?;
/// let b = graph.new_node(NodeKind::Plain, "b", Parent::Root)?;
/// let c = graph.new_node(NodeKind::Plain, "c", Parent::Root)?;
///
/// let edges = graph
///     .chain(a)?
///     .then(b, Link::directed().with_label("first"))?
///     .then(c, Link::directed())?
///     .finish();
/// assert_eq!(edges.len(), 2);
/// # Ok::<(), trellis_core::graph::GraphError>(())
/// ```
#[derive(Debug)]
pub struct EdgeChain<'g> {
    graph: &'g mut Graph,
    source: Endpoint,
    edges: Vec<EdgeHandle>,
}

impl EdgeChain<'_> {
    /// Connects the current source to `target`, which becomes the new source.
    pub fn then(mut self, target: impl Into<Endpoint>, link: Link) -> Result<Self> {
        let target = target.into();
        let edge = self.graph.connect(self.source, target, link)?;
        self.edges.push(edge);
        self.source = target;
        Ok(self)
    }

    /// Connects the current source to every target in order and ends the
    /// chain.
    pub fn fan_out<I, T>(mut self, targets: I, link: Link) -> Result<Vec<EdgeHandle>>
    where
        I: IntoIterator<Item = T>,
        T: Into<Endpoint>,
    {
        for target in targets {
            let edge = self.graph.connect(self.source, target, link.clone())?;
            self.edges.push(edge);
        }
        Ok(self.edges)
    }

    /// Ends the chain, returning the edges it created in order.
    pub fn finish(self) -> Vec<EdgeHandle> {
        self.edges
    }
}
