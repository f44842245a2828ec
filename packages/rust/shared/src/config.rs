//! Application configuration for scrapeapi.
//!
//! The config file (`scrapeapi.toml` by default) holds server settings,
//! fetch settings, extraction limits and the endpoint definitions.
//! CLI flags override config file values, which override defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeApiError};
use crate::types::{Endpoint, ExtractionType, Field};

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "scrapeapi.toml";

// ---------------------------------------------------------------------------
// Config structs (matching scrapeapi.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound document fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Extraction engine limits.
    #[serde(default)]
    pub extraction: ExtractionLimits,

    /// Served endpoints.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout for a source document.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum redirects followed per fetch.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Largest accepted response body.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: u64,

    /// User-Agent override. Defaults to `scrapeapi/<version>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
            max_response_bytes: default_max_response_bytes(),
            user_agent: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_redirects() -> usize {
    5
}
fn default_max_response_bytes() -> u64 {
    10 * 1024 * 1024
}

/// `[extraction]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionLimits {
    /// Deepest allowed field nesting. Top-level fields sit at depth 1.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    16
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Look up an endpoint by its route path.
    pub fn endpoint(&self, path: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.path == path)
    }
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ScrapeApiError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ScrapeApiError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    tracing::debug!(
        path = %path.display(),
        endpoints = config.endpoints.len(),
        "loaded config"
    );
    Ok(config)
}

/// A config with one example endpoint, used by `config init`.
pub fn sample_config() -> AppConfig {
    AppConfig {
        endpoints: vec![Endpoint {
            path: "/wiki".into(),
            source: "https://en.wikipedia.org/wiki/%page%".into(),
            variables: vec!["page".into()],
            fields: vec![
                Field::new("title", "h1", ExtractionType::Text),
                Field::new("sections", "h2", ExtractionType::List),
                Field::new("paragraphs", "#mw-content-text p", ExtractionType::Count),
                Field::composite(
                    "references",
                    "ol.references > li",
                    vec![
                        Field::new("text", "", ExtractionType::Text),
                        Field::new("links", "a", ExtractionType::Count),
                    ],
                ),
            ],
        }],
        ..AppConfig::default()
    }
}

/// Write [`sample_config`] to `path`. Refuses to overwrite unless `force` is set.
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ScrapeApiError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ScrapeApiError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&sample_config())
        .map_err(|e| ScrapeApiError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ScrapeApiError::io(path, e))?;
    tracing::info!(path = %path.display(), "created sample config file");

    Ok(())
}
