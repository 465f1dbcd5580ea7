//! Error types for Trellis operations.
//!
//! This module provides the main error type [`TrellisError`]. Every variant is
//! fatal for the render in progress: nothing is retried and no partial output
//! is kept.

use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

use trellis_core::graph::GraphError;

/// The main error type for Trellis operations.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An element was addressed through the wrong diagram, or a cluster move
    /// would have created a cycle.
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    /// A custom icon image is not on disk.
    #[error("Custom icon is missing: {}", .0.display())]
    AssetMissing(PathBuf),

    /// An icon download failed.
    #[error("Failed to fetch `{url}`: {reason}")]
    Network { url: String, reason: String },

    /// A blocking call ran past its configured deadline.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    /// The layout engine could not be started.
    #[error("Layout engine `{binary}` is unavailable: {source}")]
    LayoutEngineUnavailable {
        binary: String,
        #[source]
        source: io::Error,
    },

    /// The layout engine ran but failed or produced nothing.
    #[error("Layout engine error: {0}")]
    LayoutEngine(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<GraphError> for TrellisError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::InvalidGraph(message) => Self::InvalidGraph(message),
            GraphError::AssetMissing(path) => Self::AssetMissing(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_error_conversion() {
        let err: TrellisError = GraphError::InvalidGraph("cycle".to_string()).into();
        assert!(matches!(err, TrellisError::InvalidGraph(ref message) if message == "cycle"));

        let err: TrellisError = GraphError::AssetMissing(PathBuf::from("tekton.png")).into();
        assert_eq!(err.to_string(), "Custom icon is missing: tekton.png");
    }

    #[test]
    fn test_timeout_message() {
        let err = TrellisError::Timeout {
            operation: "layout engine `dot`".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "layout engine `dot` timed out after 5s");
    }
}
