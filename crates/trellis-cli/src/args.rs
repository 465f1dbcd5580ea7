//! Command-line argument definitions for the Trellis CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments override the output location and format from the
//! configuration file, choose where the Tekton icon comes from, and set the
//! logging verbosity.

use clap::Parser;

use crate::figures::TEKTON_ICON_URL;

/// Command-line arguments for the Trellis architecture renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory the figure is written to (overrides `output.directory`)
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Output format: png, jpg, svg, pdf or dot (overrides `output.format`)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// URL the Tekton icon is downloaded from
    #[arg(long, default_value = TEKTON_ICON_URL)]
    pub icon_url: String,

    /// Use a local Tekton icon instead of downloading one
    #[arg(long)]
    pub icon_file: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
