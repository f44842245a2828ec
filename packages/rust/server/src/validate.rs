//! Whole-config checks run before the router is built.

use std::collections::HashSet;
use std::fmt;

use tracing::warn;

use scrapeapi_extract::validate_schema;
use scrapeapi_fetch::placeholders;
use scrapeapi_shared::{AppConfig, Result, ScrapeApiError};

/// Route reserved for the health check.
pub const HEALTH_PATH: &str = "/health";

/// A non-fatal issue in one endpoint definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Path of the endpoint the warning belongs to.
    pub endpoint: String,
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.endpoint, self.message)
    }
}

/// Validate every endpoint and its schema.
///
/// Errors make the config unusable (the router would panic or every request
/// would fail). Warnings are logged and returned for `scrapeapi check`.
pub fn validate_config(config: &AppConfig) -> Result<Vec<ConfigWarning>> {
    if config.endpoints.is_empty() {
        return Err(ScrapeApiError::config("no endpoints defined"));
    }
    if config.extraction.max_depth == 0 {
        return Err(ScrapeApiError::config("extraction.max_depth must be at least 1"));
    }

    let mut seen = HashSet::new();
    let mut warnings = Vec::new();

    for endpoint in &config.endpoints {
        let path = endpoint.path.as_str();

        if !path.starts_with('/') {
            return Err(ScrapeApiError::validation(format!(
                "endpoint path `{path}` must start with `/`"
            )));
        }
        if path == HEALTH_PATH {
            return Err(ScrapeApiError::validation(format!(
                "endpoint path `{HEALTH_PATH}` is reserved"
            )));
        }
        if !seen.insert(path) {
            return Err(ScrapeApiError::validation(format!(
                "endpoint path `{path}` is defined more than once"
            )));
        }
        if endpoint.source.trim().is_empty() {
            return Err(ScrapeApiError::validation(format!(
                "endpoint `{path}` has an empty source"
            )));
        }

        let found = placeholders(&endpoint.source);
        for name in &found {
            if !endpoint.variables.contains(name) {
                warnings.push(ConfigWarning {
                    endpoint: path.to_string(),
                    message: format!("placeholder `%{name}%` has no matching variable"),
                });
            }
        }
        for name in &endpoint.variables {
            if !found.contains(name) {
                warnings.push(ConfigWarning {
                    endpoint: path.to_string(),
                    message: format!("variable `{name}` does not appear in the source"),
                });
            }
        }

        if endpoint.fields.is_empty() {
            warnings.push(ConfigWarning {
                endpoint: path.to_string(),
                message: "no fields defined, responses will only carry `source`".into(),
            });
        }

        let schema_warnings = validate_schema(&endpoint.fields, config.extraction).map_err(
            |e| match e {
                ScrapeApiError::Validation { message } => {
                    ScrapeApiError::validation(format!("endpoint `{path}`: {message}"))
                }
                other => other,
            },
        )?;
        warnings.extend(schema_warnings.into_iter().map(|w| ConfigWarning {
            endpoint: path.to_string(),
            message: w.to_string(),
        }));
    }

    for warning in &warnings {
        warn!(endpoint = %warning.endpoint, "{}", warning.message);
    }
    Ok(warnings)
}
