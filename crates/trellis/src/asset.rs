//! Remote icon retrieval.
//!
//! [`AssetRetriever`] downloads an image over HTTP(S) so it can back a
//! custom-icon node. A download is a single blocking GET bounded by a global
//! timeout and a body size cap. There is no retry, no checksum and no cache
//! invalidation: fetching to the same destination again simply overwrites the
//! file. A failed fetch surfaces as [`TrellisError::Network`] or
//! [`TrellisError::Timeout`] and is left to the caller to treat as fatal.
//!
//! # Destinations
//!
//! - [`AssetRetriever::fetch`] writes to a caller-chosen file name, so two
//!   different icons fetched to the same name overwrite each other.
//! - [`AssetRetriever::fetch_keyed`] derives the file name from a SHA-256 of
//!   the URL, so distinct URLs never collide.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{debug, info};
use sha2::{Digest, Sha256};
use ureq::{
    Agent,
    tls::{RootCerts, TlsConfig, TlsProvider},
};
use url::Url;

use crate::{TrellisError, config::AssetConfig};

const USER_AGENT: &str = concat!("trellis/", env!("CARGO_PKG_VERSION"));

/// Blocking icon downloader.
#[derive(Debug, Clone)]
pub struct AssetRetriever {
    directory: PathBuf,
    timeout: Duration,
    max_size: u64,
}

impl Default for AssetRetriever {
    fn default() -> Self {
        Self::from_config(&AssetConfig::default())
    }
}

impl AssetRetriever {
    /// Creates a retriever resolving relative destinations against
    /// `directory`, with default timeout and size limit.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    pub fn from_config(config: &AssetConfig) -> Self {
        Self {
            directory: config.directory().to_path_buf(),
            timeout: config.timeout(),
            max_size: config.max_size_bytes(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Caps the accepted response body, in bytes.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Downloads `url` to `destination`, overwriting any existing file.
    ///
    /// Relative destinations resolve against the retriever's directory.
    ///
    /// # Errors
    ///
    /// - [`TrellisError::Network`] on a malformed or non-HTTP URL, an
    ///   unreachable host, a non-success status code or an oversized body.
    /// - [`TrellisError::Timeout`] when the request exceeds the timeout.
    /// - [`TrellisError::Io`] when the file cannot be written.
    pub fn fetch(&self, url: &str, destination: impl AsRef<Path>) -> Result<PathBuf, TrellisError> {
        let destination = self.resolve(destination.as_ref());
        info!(url, destination = destination.display().to_string(); "Fetching asset");

        let url = parse_url(url)?;
        let bytes = self.download(&url)?;

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&destination, &bytes)?;

        debug!(
            bytes = bytes.len(),
            destination = destination.display().to_string();
            "Asset written"
        );
        Ok(destination)
    }

    /// Downloads `url` to a file named after the URL's hash.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub fn fetch_keyed(&self, url: &str) -> Result<PathBuf, TrellisError> {
        let file_name = keyed_file_name(url)?;
        self.fetch(url, file_name)
    }

    fn resolve(&self, destination: &Path) -> PathBuf {
        if destination.is_absolute() {
            destination.to_path_buf()
        } else {
            self.directory.join(destination)
        }
    }

    fn agent(&self) -> Agent {
        let tls_config = TlsConfig::builder()
            .provider(TlsProvider::NativeTls)
            .root_certs(RootCerts::PlatformVerifier)
            .build();

        Agent::config_builder()
            .tls_config(tls_config)
            .timeout_global(Some(self.timeout))
            .build()
            .into()
    }

    fn download(&self, url: &Url) -> Result<Vec<u8>, TrellisError> {
        self.agent()
            .get(url.as_str())
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|err| self.fetch_error(url, err))?
            .into_body()
            .with_config()
            .limit(self.max_size)
            .read_to_vec()
            .map_err(|err| self.fetch_error(url, err))
    }

    fn fetch_error(&self, url: &Url, err: ureq::Error) -> TrellisError {
        match err {
            ureq::Error::Timeout(_) => TrellisError::Timeout {
                operation: format!("Fetching `{url}`"),
                timeout: self.timeout,
            },
            err => TrellisError::Network {
                url: url.to_string(),
                reason: err.to_string(),
            },
        }
    }
}

/// File name used by [`AssetRetriever::fetch_keyed`]: the first 16 hex digits
/// of the URL's SHA-256, plus the URL's file extension when it has one.
///
/// # Errors
///
/// [`TrellisError::Network`] if `url` is not a valid HTTP(S) URL.
pub fn keyed_file_name(url: &str) -> Result<String, TrellisError> {
    let parsed = parse_url(url)?;
    let hash = format!("{:x}", Sha256::digest(parsed.as_str().as_bytes()));
    Ok(match url_extension(&parsed) {
        Some(extension) => format!("{}.{extension}", &hash[..16]),
        None => hash[..16].to_string(),
    })
}

/// Parses `url`, accepting only `http` and `https`.
fn parse_url(url: &str) -> Result<Url, TrellisError> {
    let parsed = Url::parse(url).map_err(|err| TrellisError::Network {
        url: url.to_string(),
        reason: format!("invalid URL: {err}"),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(TrellisError::Network {
            url: url.to_string(),
            reason: format!("unsupported scheme `{scheme}`"),
        }),
    }
}

fn url_extension(url: &Url) -> Option<&str> {
    let file = url.path_segments().and_then(|segments| segments.last())?;
    let (_, extension) = file.rsplit_once('.')?;

    let plausible = !extension.is_empty()
        && extension.len() <= 5
        && extension.chars().all(|c| c.is_ascii_alphanumeric());
    plausible.then_some(extension)
}
