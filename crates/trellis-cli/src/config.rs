//! Configuration file and icon root discovery for the CLI.
//!
//! A configuration file is looked up in a fixed order and parsed into an
//! [`AppConfig`]. Icon and asset directories named in the file resolve
//! against the file's own directory, so a config can ship next to its icons.
//! When the file names no icon root, the platform data directory's `icons`
//! folder is used if it exists.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use trellis::{TrellisError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for TrellisError {
    fn from(err: ConfigError) -> Self {
        TrellisError::Config(err.to_string())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "trellis", "trellis")
}

/// Finds and loads the configuration.
///
/// Search order: the explicit path, then `trellis/config.toml`, then the
/// platform config directory, then built-in defaults.
///
/// # Errors
///
/// [`TrellisError::Config`] if an explicit path does not exist or a found
/// file cannot be parsed.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, TrellisError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("trellis/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = project_dirs() {
        let system_config = proj_dirs.config_dir().join("config.toml");
        if system_config.exists() {
            info!(
                path = system_config.display().to_string();
                "Loading configuration from system path"
            );
            return load_config_file(&system_config);
        }
        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Parses one TOML file and anchors its directories at the file's location.
fn load_config_file(path: &Path) -> Result<AppConfig, TrellisError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    let base = path.parent().unwrap_or(Path::new(""));
    Ok(config.relative_to(base))
}

/// `icons` under the platform data directory, when it exists.
pub fn default_icon_dir() -> Option<PathBuf> {
    let icons = project_dirs()?.data_dir().join("icons");
    if icons.is_dir() {
        debug!(path = icons.display().to_string(); "Using installed icon directory");
        Some(icons)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use trellis::config::OutputFormat;

    use super::*;

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r##"
[output]
format = "svg"
directory = "figures"

[layout]
direction = "TB"
timeout_secs = 5

[style]
background_color = "#fafafa"

[graph]
pad = "0.25"
nodesep = "1.0"
"##,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.output().format(), OutputFormat::Svg);
        assert_eq!(config.output().directory(), Path::new("figures"));
        assert_eq!(config.layout().timeout().as_secs(), 5);
        let diagram = config.diagram_config().unwrap();
        assert_eq!(diagram.graph_attrs().pad(), Some("0.25"));
        assert!(diagram.background_color().is_some());
    }

    #[test]
    fn test_directories_resolve_against_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[layout]\nicon_dir = \"icons\"\n\n[assets]\ndirectory = \"downloads\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.layout().icon_dir(), Some(dir.path().join("icons").as_path()));
        assert_eq!(config.assets().directory(), dir.path().join("downloads"));
        let diagram = config.diagram_config().unwrap();
        assert_eq!(diagram.icon_dir(), Some(dir.path().join("icons").as_path()));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();

        let result = load_config(Some(dir.path().join("absent.toml")));

        assert!(matches!(
            result,
            Err(TrellisError::Config(message)) if message.contains("Missing")
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[output]\nformat = \"gif\"\n").unwrap();

        let result = load_config(Some(&path));

        assert!(matches!(result, Err(TrellisError::Config(message)) if message.contains("parse")));
    }
}
