//! Export functionality for Trellis diagrams.
//!
//! This module turns a finished [`Graph`] into an output file. It is the final
//! stage of a diagram's lifecycle and runs exactly once, when the diagram is
//! closed.
//!
//! # Pipeline Position
//!
//! ```text
//! Declarations
//!     ↓ accumulate
//! Graph (nodes, cluster tree, edges)
//!     ↓ emit (dot module)
//! DOT text
//!     ↓ layout (engine module)
//! Output File
//! ```
//!
//! # Staged Output
//!
//! The engine writes into a temporary file next to the final destination. The
//! file is moved into place only once the engine has succeeded and produced a
//! non-empty artifact, so a failed render never leaves a partial file under
//! the final name.

/// DOT emission.
pub mod dot;
/// Layout engine invocation.
pub mod engine;

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info, trace};

use trellis_core::graph::Graph;

use crate::{
    TrellisError,
    config::{DiagramConfig, OutputFormat},
};

use dot::DotEmitter;
use engine::LayoutEngine;

/// Renders graphs to files using a [`LayoutEngine`].
pub struct Renderer<'a> {
    config: &'a DiagramConfig,
    engine: &'a dyn LayoutEngine,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a DiagramConfig, engine: &'a dyn LayoutEngine) -> Self {
        Self { config, engine }
    }

    /// Renders `graph` to `<output_dir>/<file_stem>.<ext>` and returns the
    /// written path.
    ///
    /// # Errors
    ///
    /// - [`TrellisError::AssetMissing`] if a custom icon file is gone.
    /// - [`TrellisError::InvalidGraph`] if an edge targets an empty cluster.
    /// - Any engine error, see [`LayoutEngine::layout`].
    /// - [`TrellisError::Io`] if the output cannot be staged or moved into
    ///   place.
    pub fn render(
        &self,
        title: &str,
        file_stem: &str,
        graph: &Graph,
    ) -> Result<PathBuf, TrellisError> {
        let format = self.config.format();
        info!(
            title,
            format:% = format,
            engine = self.engine.name(),
            nodes = graph.nodes_count(),
            edges = graph.edges_count();
            "Rendering diagram"
        );

        graph.validate_assets()?;

        let dot_graph = DotEmitter::new(title, graph, self.config).emit()?;
        let dot = dot::to_dot_string(&dot_graph);
        trace!(dot = dot.as_str(); "Emitted DOT");

        let output_dir = self.config.output_dir();
        if !output_dir.as_os_str().is_empty() {
            fs::create_dir_all(output_dir)?;
        }
        let output = output_dir.join(format!("{file_stem}.{}", format.extension()));

        self.write_staged(&dot, format, output_dir, &output)?;

        info!(output = output.display().to_string(); "Diagram rendered");
        Ok(output)
    }

    fn write_staged(
        &self,
        dot: &str,
        format: OutputFormat,
        output_dir: &Path,
        output: &Path,
    ) -> Result<(), TrellisError> {
        let suffix = format!(".{}", format.extension());
        let mut staged = tempfile::Builder::new()
            .prefix(".trellis-")
            .suffix(&suffix)
            .tempfile_in(output_dir)?;
        debug!(staged = staged.path().display().to_string(); "Staging output");

        match format {
            OutputFormat::Dot => {
                staged.write_all(dot.as_bytes())?;
                staged.flush()?;
            }
            _ => {
                self.engine.layout(dot, format, staged.path())?;
                if fs::metadata(staged.path())?.len() == 0 {
                    return Err(TrellisError::LayoutEngine(format!(
                        "`{}` produced no output",
                        self.engine.name()
                    )));
                }
            }
        }

        staged
            .persist(output)
            .map_err(|err| TrellisError::Io(err.error))?;
        Ok(())
    }
}
