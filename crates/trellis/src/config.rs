//! Configuration types for Trellis diagram rendering.
//!
//! Two layers live here:
//!
//! - [`AppConfig`] mirrors the on-disk configuration file. All sections
//!   implement [`serde::Deserialize`] and fall back to defaults when absent.
//! - [`DiagramConfig`] is the explicit, validated configuration handed to
//!   [`Diagram::open`](crate::Diagram::open). It replaces any notion of
//!   module-level attribute globals.
//!
//! # Example
//!
//! ```
//! # use trellis::config::{AppConfig, DiagramConfig, OutputFormat};
//! # use trellis::attributes::RenderAttributes;
//! let config = DiagramConfig::default()
//!     .with_format(OutputFormat::Svg)
//!     .with_graph_attrs(RenderAttributes::new().with_pad("0.5"));
//! assert_eq!(config.format().extension(), "svg");
//!
//! // Defaults straight from an empty configuration file
//! let from_file = AppConfig::default().diagram_config().unwrap();
//! assert_eq!(from_file.format(), OutputFormat::Png);
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::Deserialize;

use trellis_core::{attributes::RenderAttributes, color::Color, graph::RankDir};

use crate::TrellisError;

/// Output artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
    Svg,
    Pdf,
    /// The DOT source itself; the layout engine is not invoked.
    Dot,
}

impl OutputFormat {
    /// File extension, which is also the engine's `-T` value.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Dot => "dot",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "svg" => Ok(OutputFormat::Svg),
            "pdf" => Ok(OutputFormat::Pdf),
            "dot" => Ok(OutputFormat::Dot),
            _ => Err(format!(
                "unsupported output format `{s}`, expected one of png, jpg, svg, pdf, dot"
            )),
        }
    }
}

/// Edge routing style, the engine's `splines` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveStyle {
    #[default]
    Ortho,
    Curved,
    Spline,
    Polyline,
    Line,
}

impl CurveStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveStyle::Ortho => "ortho",
            CurveStyle::Curved => "curved",
            CurveStyle::Spline => "spline",
            CurveStyle::Polyline => "polyline",
            CurveStyle::Line => "line",
        }
    }
}

/// How to reach the external layout engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    binary: String,
    timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "dot".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl EngineConfig {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Executable name or path.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

// =============================================================================
// Validated per-diagram configuration
// =============================================================================

/// Explicit configuration for one diagram.
#[derive(Debug, Clone)]
pub struct DiagramConfig {
    format: OutputFormat,
    output_dir: PathBuf,
    direction: RankDir,
    curve_style: CurveStyle,
    icon_dir: Option<PathBuf>,
    graph_attrs: RenderAttributes,
    node_attrs: RenderAttributes,
    edge_attrs: RenderAttributes,
    background_color: Option<Color>,
    engine: EngineConfig,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            output_dir: PathBuf::from("."),
            direction: RankDir::default(),
            curve_style: CurveStyle::default(),
            icon_dir: None,
            graph_attrs: RenderAttributes::default(),
            node_attrs: RenderAttributes::default(),
            edge_attrs: RenderAttributes::default(),
            background_color: None,
            engine: EngineConfig::default(),
        }
    }
}

impl DiagramConfig {
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Directory the output file is written to.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_direction(mut self, direction: RankDir) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_curve_style(mut self, curve_style: CurveStyle) -> Self {
        self.curve_style = curve_style;
        self
    }

    /// Root directory of the built-in icon images.
    pub fn with_icon_dir(mut self, icon_dir: impl Into<PathBuf>) -> Self {
        self.icon_dir = Some(icon_dir.into());
        self
    }

    pub fn with_graph_attrs(mut self, attrs: RenderAttributes) -> Self {
        self.graph_attrs = attrs;
        self
    }

    pub fn with_node_attrs(mut self, attrs: RenderAttributes) -> Self {
        self.node_attrs = attrs;
        self
    }

    pub fn with_edge_attrs(mut self, attrs: RenderAttributes) -> Self {
        self.edge_attrs = attrs;
        self
    }

    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn direction(&self) -> RankDir {
        self.direction
    }

    pub fn curve_style(&self) -> CurveStyle {
        self.curve_style
    }

    pub fn icon_dir(&self) -> Option<&Path> {
        self.icon_dir.as_deref()
    }

    pub fn graph_attrs(&self) -> &RenderAttributes {
        &self.graph_attrs
    }

    pub fn node_attrs(&self) -> &RenderAttributes {
        &self.node_attrs
    }

    pub fn edge_attrs(&self) -> &RenderAttributes {
        &self.edge_attrs
    }

    pub fn background_color(&self) -> Option<Color> {
        self.background_color
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }
}

// =============================================================================
// Configuration file sections
// =============================================================================

/// Top-level application configuration, as loaded from a file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Output artifact section.
    #[serde(default)]
    output: OutputConfig,

    /// Layout engine section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Icon download section.
    #[serde(default)]
    assets: AssetConfig,

    /// Style section.
    #[serde(default)]
    style: StyleConfig,

    /// Graph-level engine attributes.
    #[serde(default)]
    graph: RenderAttributes,

    /// Default node attributes.
    #[serde(default)]
    node: RenderAttributes,

    /// Default edge attributes.
    #[serde(default)]
    edge: RenderAttributes,
}

impl AppConfig {
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn assets(&self) -> &AssetConfig {
        &self.assets
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Resolves the icon and asset directories against `base`, normally the
    /// directory holding the configuration file. Absolute paths are kept; the
    /// output directory stays relative to the working directory.
    pub fn relative_to(mut self, base: &Path) -> Self {
        self.layout.icon_dir = self.layout.icon_dir.map(|dir| base.join(dir));
        self.assets.directory = base.join(&self.assets.directory);
        self
    }

    /// Validates the file sections and builds a [`DiagramConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Config`] if the background color cannot be
    /// parsed.
    pub fn diagram_config(&self) -> Result<DiagramConfig, TrellisError> {
        let mut config = DiagramConfig::default()
            .with_format(self.output.format)
            .with_output_dir(&self.output.directory)
            .with_direction(self.layout.direction)
            .with_curve_style(self.layout.curve_style)
            .with_engine(EngineConfig::new(
                &self.layout.engine,
                Duration::from_secs(self.layout.timeout_secs),
            ))
            .with_graph_attrs(self.graph.clone())
            .with_node_attrs(self.node.clone())
            .with_edge_attrs(self.edge.clone());

        if let Some(icon_dir) = &self.layout.icon_dir {
            config = config.with_icon_dir(icon_dir);
        }
        if let Some(color) = self.style.background_color().map_err(TrellisError::Config)? {
            config = config.with_background_color(color);
        }
        Ok(config)
    }
}

/// Where and in which format the artifact is written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    format: OutputFormat,
    directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            directory: PathBuf::from("."),
        }
    }
}

impl OutputConfig {
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Layout engine settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Executable of the layout engine.
    engine: String,
    /// Seconds before a running engine is killed.
    timeout_secs: u64,
    direction: RankDir,
    curve_style: CurveStyle,
    /// Root of the built-in icon images.
    icon_dir: Option<PathBuf>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            engine: engine.binary().to_string(),
            timeout_secs: engine.timeout().as_secs(),
            direction: RankDir::default(),
            curve_style: CurveStyle::default(),
            icon_dir: None,
        }
    }
}

impl LayoutConfig {
    pub fn engine(&self) -> &str {
        &self.engine
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn direction(&self) -> RankDir {
        self.direction
    }

    pub fn curve_style(&self) -> CurveStyle {
        self.curve_style
    }

    pub fn icon_dir(&self) -> Option<&Path> {
        self.icon_dir.as_deref()
    }
}

/// Icon download settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory relative download destinations resolve against.
    directory: PathBuf,
    timeout_secs: u64,
    max_size_bytes: u64,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            timeout_secs: 30,
            max_size_bytes: 10 * 1024 * 1024,
        }
    }
}

impl AssetConfig {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }
}

/// Visual styling configuration for rendered diagrams.
///
/// Fields that are not set fall back to the engine defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Background [`Color`] of the whole drawing, as a color string.
    #[serde(default)]
    background_color: Option<String>,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }
}
