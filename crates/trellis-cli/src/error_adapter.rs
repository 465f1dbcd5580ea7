//! Error adapter for converting TrellisError to miette diagnostics.
//!
//! This module provides the bridge between the library's error type and
//! miette's report formatting used in the CLI. Every variant gets a stable
//! diagnostic code and, where there is an obvious next step, a help line.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;

use trellis::TrellisError;

/// Adapter presenting a [`TrellisError`] as a miette diagnostic.
pub struct ErrorAdapter<'a>(pub &'a TrellisError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            TrellisError::Io(_) => "trellis::io",
            TrellisError::InvalidGraph(_) => "trellis::invalid_graph",
            TrellisError::AssetMissing(_) => "trellis::asset_missing",
            TrellisError::Network { .. } => "trellis::network",
            TrellisError::Timeout { .. } => "trellis::timeout",
            TrellisError::LayoutEngineUnavailable { .. } => "trellis::engine_unavailable",
            TrellisError::LayoutEngine(_) => "trellis::engine",
            TrellisError::Config(_) => "trellis::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            TrellisError::AssetMissing(_) => {
                "check the icon path, or drop --icon-file to download the icon"
            }
            TrellisError::Network { .. } => {
                "check connectivity, or pass --icon-file with a local copy of the icon"
            }
            TrellisError::Timeout { .. } => {
                "raise `assets.timeout_secs` or `layout.timeout_secs` in the configuration file"
            }
            TrellisError::LayoutEngineUnavailable { .. } => {
                "install Graphviz, or point `layout.engine` at the `dot` binary"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}
