//! Trellis - declarative architecture diagrams rendered through Graphviz.
//!
//! A diagram is described in code: nodes (plain boxes or icons), clusters that
//! group and nest them, and labeled edges between nodes or clusters. Closing
//! the diagram serializes the graph to DOT and runs the layout engine to
//! produce one image file.
//!
//! # Overview
//!
//! - [`Diagram`] owns one graph and its lifecycle. Declarations return handles
//!   that are passed explicitly; there is no implicit "current" diagram or
//!   cluster.
//! - [`config`] holds the explicit [`DiagramConfig`](config::DiagramConfig)
//!   and the file-backed [`AppConfig`](config::AppConfig).
//! - [`asset::AssetRetriever`] downloads remote icons for custom nodes.
//! - [`export`] emits DOT and drives the [`LayoutEngine`](export::engine::LayoutEngine).
//!
//! # Example
//!
//! ```rust,no_run
//! use trellis::{
//!     Diagram,
//!     catalog::{k8s, onprem},
//!     config::{DiagramConfig, OutputFormat},
//!     graph::{Link, Parent},
//! };
//!
//! let config = DiagramConfig::default().with_format(OutputFormat::Svg);
//! let output = Diagram::scope("Web Service", config, |d| {
//!     let git = d.node(onprem::vcs::GITHUB, "github", Parent::Root)?;
//!     let cluster = d.cluster("K8s cluster", Parent::Root)?;
//!     let ingress = d.node(k8s::network::INGRESS, "ingress", cluster)?;
//!     let pod = d.node(k8s::compute::POD, "app", cluster)?;
//!
//!     d.chain(git)?
//!         .then(ingress, Link::directed().with_label("Push"))?
//!         .then(pod, Link::directed())?;
//!     Ok(())
//! })?;
//! println!("wrote {}", output.display());
//! # Ok::<(), trellis::TrellisError>(())
//! ```

pub mod asset;
pub mod config;
pub mod export;

mod diagram;
mod error;

pub use trellis_core::{attributes, catalog, color, graph};

pub use diagram::{Diagram, Phase};
pub use error::TrellisError;
