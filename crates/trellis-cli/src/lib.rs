//! CLI logic for the Trellis architecture renderer.
//!
//! The CLI renders the bundled CI/CD Operator architecture figure. It loads
//! the configuration, obtains the Tekton icon (downloaded, or a local file),
//! and runs the diagram through its full lifecycle.

pub mod error_adapter;
pub mod figures;

mod args;
mod config;

pub use args::Args;

use std::path::PathBuf;

use log::info;

use trellis::{Diagram, TrellisError, asset::AssetRetriever, config::OutputFormat};

/// Run the Trellis CLI application
///
/// Renders the architecture figure and returns the path of the written file.
///
/// # Errors
///
/// Returns `TrellisError` for:
/// - Configuration loading errors or an unknown `--format`
/// - Icon download failures
/// - Layout engine failures
/// - File I/O errors
pub fn run(args: &Args) -> Result<PathBuf, TrellisError> {
    let app_config = config::load_config(args.config.as_ref())?;

    let mut diagram_config = app_config.diagram_config()?;
    if let Some(output_dir) = &args.output_dir {
        diagram_config = diagram_config.with_output_dir(output_dir);
    }
    if diagram_config.icon_dir().is_none() {
        if let Some(icon_dir) = config::default_icon_dir() {
            diagram_config = diagram_config.with_icon_dir(icon_dir);
        }
    }
    if let Some(format) = &args.format {
        let format: OutputFormat = format.parse().map_err(TrellisError::Config)?;
        diagram_config = diagram_config.with_format(format);
    }
    let diagram_config = figures::house_style(diagram_config);

    info!(
        title = figures::ARCHITECTURE_TITLE,
        format:% = diagram_config.format(),
        output_dir = diagram_config.output_dir().display().to_string();
        "Rendering architecture figure"
    );

    let retriever = AssetRetriever::from_config(app_config.assets());
    let output = Diagram::scope(figures::ARCHITECTURE_TITLE, diagram_config, |d| {
        let icon = match &args.icon_file {
            Some(path) => PathBuf::from(path),
            None => retriever.fetch(&args.icon_url, figures::TEKTON_ICON_FILE)?,
        };
        figures::architecture(d, &icon)
    })?;

    info!(output = output.display().to_string(); "Figure exported successfully");

    Ok(output)
}
