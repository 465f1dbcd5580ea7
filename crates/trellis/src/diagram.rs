//! The diagram context: one graph, its configuration and its lifecycle.
//!
//! A [`Diagram`] moves through four phases:
//!
//! ```text
//! Open -> Accumulating -> Rendering -> Closed
//! ```
//!
//! The first declaration moves it from `Open` to `Accumulating`. Closing it
//! renders the graph exactly once and consumes the value, so nothing can be
//! declared after `Closed`. [`Diagram::scope`] wraps the whole lifecycle
//! around a closure: an `Ok` closure renders, an `Err` closure discards the
//! graph and hands the error back without writing anything.

use std::{fmt, path::PathBuf};

use log::{debug, info, warn};

use trellis_core::graph::{
    ClusterHandle, EdgeChain, EdgeHandle, Endpoint, Graph, Link, NodeHandle, NodeKind, Parent,
    RankDir,
};

use crate::{
    TrellisError,
    config::DiagramConfig,
    export::{
        Renderer,
        dot::{self, DotEmitter},
        engine::{Graphviz, LayoutEngine},
    },
};

/// Lifecycle phase of a [`Diagram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Accumulating,
    Rendering,
    Closed,
}

/// A diagram being authored.
///
/// # Example
///
/// ```rust,no_run
/// use trellis::{
///     Diagram,
///     catalog::onprem::vcs::GITHUB,
///     config::DiagramConfig,
///     graph::{Link, NodeKind, Parent},
/// };
///
/// let output = Diagram::scope("Architecture", DiagramConfig::default(), |d| {
///     let remote = d.cluster("Remote Git", Parent::Root)?;
///     let github = d.node(GITHUB, "github", remote)?;
///     let ingress = d.node(NodeKind::Plain, "ingress", Parent::Root)?;
///     d.connect(github, ingress, Link::directed().with_label("Push"))?;
///     Ok(())
/// })?;
/// assert!(output.ends_with("architecture.png"));
/// # Ok::<(), trellis::TrellisError>(())
/// ```
pub struct Diagram {
    title: String,
    file_stem: String,
    config: DiagramConfig,
    graph: Graph,
    engine: Box<dyn LayoutEngine>,
    phase: Phase,
}

impl Diagram {
    /// Opens a diagram rendered with the Graphviz engine named in `config`.
    pub fn open(title: impl Into<String>, config: DiagramConfig) -> Self {
        let title = title.into();
        let engine = Graphviz::new(config.engine());
        debug!(title = title.as_str(), format:% = config.format(); "Diagram opened");
        Self {
            file_stem: file_stem(&title),
            title,
            config,
            graph: Graph::new(),
            engine: Box::new(engine),
            phase: Phase::Open,
        }
    }

    /// Opens a diagram, runs `build` against it, then closes it.
    ///
    /// # Errors
    ///
    /// The error returned by `build`, in which case nothing is rendered, or
    /// any error from [`close`](Self::close).
    pub fn scope<F>(
        title: impl Into<String>,
        config: DiagramConfig,
        build: F,
    ) -> Result<PathBuf, TrellisError>
    where
        F: FnOnce(&mut Diagram) -> Result<(), TrellisError>,
    {
        Self::open(title, config).run(build)
    }

    /// Runs `build` against this diagram, then closes it. Same contract as
    /// [`scope`](Self::scope), for diagrams configured with the builder
    /// methods first.
    pub fn run<F>(mut self, build: F) -> Result<PathBuf, TrellisError>
    where
        F: FnOnce(&mut Diagram) -> Result<(), TrellisError>,
    {
        match build(&mut self) {
            Ok(()) => self.close(),
            Err(err) => {
                self.discard(&err);
                Err(err)
            }
        }
    }

    /// Replaces the layout engine.
    pub fn with_engine(mut self, engine: impl LayoutEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Overrides the output file name (without extension).
    pub fn with_filename(mut self, file_stem: impl Into<String>) -> Self {
        self.file_stem = file_stem.into();
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn filename(&self) -> &str {
        &self.file_stem
    }

    /// Where [`close`](Self::close) will write the artifact.
    pub fn output_path(&self) -> PathBuf {
        self.config
            .output_dir()
            .join(format!("{}.{}", self.file_stem, self.config.format().extension()))
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    pub fn cluster(
        &mut self,
        name: impl Into<String>,
        parent: impl Into<Parent>,
    ) -> Result<ClusterHandle, TrellisError> {
        self.accumulate();
        Ok(self.graph.new_cluster(name, parent)?)
    }

    pub fn node(
        &mut self,
        kind: impl Into<NodeKind>,
        label: impl Into<String>,
        parent: impl Into<Parent>,
    ) -> Result<NodeHandle, TrellisError> {
        self.accumulate();
        Ok(self.graph.new_node(kind, label, parent)?)
    }

    pub fn connect(
        &mut self,
        source: impl Into<Endpoint>,
        target: impl Into<Endpoint>,
        link: Link,
    ) -> Result<EdgeHandle, TrellisError> {
        self.accumulate();
        Ok(self.graph.connect(source, target, link)?)
    }

    /// Starts an edge chain at `source`; see [`EdgeChain`].
    pub fn chain(&mut self, source: impl Into<Endpoint>) -> Result<EdgeChain<'_>, TrellisError> {
        self.accumulate();
        Ok(self.graph.chain(source)?)
    }

    pub fn set_cluster_parent(
        &mut self,
        cluster: ClusterHandle,
        parent: impl Into<Parent>,
    ) -> Result<(), TrellisError> {
        self.accumulate();
        Ok(self.graph.set_cluster_parent(cluster, parent)?)
    }

    pub fn node_attr(
        &mut self,
        node: NodeHandle,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), TrellisError> {
        self.accumulate();
        Ok(self.graph.set_node_attr(node, key, value)?)
    }

    pub fn cluster_attr(
        &mut self,
        cluster: ClusterHandle,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), TrellisError> {
        self.accumulate();
        Ok(self.graph.set_cluster_attr(cluster, key, value)?)
    }

    pub fn cluster_direction(
        &mut self,
        cluster: ClusterHandle,
        direction: RankDir,
    ) -> Result<(), TrellisError> {
        self.accumulate();
        Ok(self.graph.set_cluster_direction(cluster, direction)?)
    }

    /// DOT text for the current graph, without rendering anything.
    ///
    /// # Errors
    ///
    /// [`TrellisError::InvalidGraph`] if an edge ends at an empty cluster.
    pub fn to_dot(&self) -> Result<String, TrellisError> {
        let graph = DotEmitter::new(&self.title, &self.graph, &self.config).emit()?;
        Ok(dot::to_dot_string(&graph))
    }

    /// Renders the diagram and returns the written path.
    ///
    /// # Errors
    ///
    /// See [`Renderer::render`]. The diagram is closed either way.
    pub fn close(mut self) -> Result<PathBuf, TrellisError> {
        self.phase = Phase::Rendering;
        info!(title = self.title.as_str(), engine = self.engine.name(); "Closing diagram");

        let result = Renderer::new(&self.config, self.engine.as_ref()).render(
            &self.title,
            &self.file_stem,
            &self.graph,
        );

        self.phase = Phase::Closed;
        if let Err(err) = &result {
            debug!(title = self.title.as_str(), error:% = err; "Diagram closed without output");
        }
        result
    }

    fn discard(mut self, err: &TrellisError) {
        self.phase = Phase::Rendering;
        warn!(
            title = self.title.as_str(),
            error:% = err;
            "Diagram authoring failed, nothing rendered"
        );
        self.phase = Phase::Closed;
    }

    fn accumulate(&mut self) {
        if self.phase == Phase::Open {
            self.phase = Phase::Accumulating;
        }
    }
}

impl Drop for Diagram {
    fn drop(&mut self) {
        if matches!(self.phase, Phase::Open | Phase::Accumulating) {
            warn!(
                title = self.title.as_str(),
                output = self.output_path().display().to_string();
                "Diagram dropped without being closed, no output rendered"
            );
        }
    }
}

impl fmt::Debug for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagram")
            .field("title", &self.title)
            .field("file_stem", &self.file_stem)
            .field("phase", &self.phase)
            .field("engine", &self.engine.name())
            .field("nodes", &self.graph.nodes_count())
            .field("clusters", &self.graph.clusters_count())
            .field("edges", &self.graph.edges_count())
            .finish()
    }
}

/// Output file stem for a title: whitespace runs become `_`, lowercased.
fn file_stem(title: &str) -> String {
    let stem = title.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase();
    if stem.is_empty() {
        "diagram".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Architecture"), "architecture");
        assert_eq!(file_stem("CI CD  Operator\tFlow"), "ci_cd_operator_flow");
        assert_eq!(file_stem("   "), "diagram");
    }

    #[test]
    fn test_phase_advances_on_first_declaration() {
        let mut diagram = Diagram::open("Phases", DiagramConfig::default());
        assert_eq!(diagram.phase(), Phase::Open);

        diagram.node(NodeKind::Plain, "a", Parent::Root).unwrap();
        assert_eq!(diagram.phase(), Phase::Accumulating);

        diagram.discard(&TrellisError::Config("test".to_string()));
    }

    #[test]
    fn test_output_path() {
        let config = DiagramConfig::default().with_output_dir("out");
        let diagram = Diagram::open("My Diagram", config).with_filename("custom");

        assert_eq!(diagram.output_path(), PathBuf::from("out/custom.png"));
        assert_eq!(diagram.title(), "My Diagram");
        diagram.discard(&TrellisError::Config("test".to_string()));
    }

    #[test]
    fn test_scope_propagates_authoring_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = DiagramConfig::default().with_output_dir(dir.path());

        let result = Diagram::scope("Broken", config, |d| {
            let other = Graph::new().new_node(NodeKind::Plain, "foreign", Parent::Root)?;
            let local = d.node(NodeKind::Plain, "local", Parent::Root)?;
            d.connect(local, other, Link::directed())?;
            Ok(())
        });

        assert!(matches!(result, Err(TrellisError::InvalidGraph(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
