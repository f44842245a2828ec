//! Error types for scrapeapi.
//!
//! Library crates use [`ScrapeApiError`] via `thiserror`.
//! The CLI wraps this with `color-eyre`; the server maps it onto HTTP statuses.

use std::path::PathBuf;

/// Top-level error type for all scrapeapi operations.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeApiError {
    /// Configuration loading or parsing error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Schema or endpoint definition is invalid.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A field selector is not valid CSS.
    #[error("invalid selector `{selector}`: {message}")]
    SelectorSyntax { selector: String, message: String },

    /// Composite fields nest deeper than the configured limit.
    #[error("field `{field}` exceeds the maximum nesting depth of {max_depth}")]
    SchemaTooDeep { field: String, max_depth: usize },

    /// The resolved source URL could not be parsed.
    #[error("invalid source URL `{url}`: {message}")]
    InvalidUrl { url: String, message: String },

    /// The request's query string could not be decoded.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// Fetching the source document failed.
    #[error("network error: {0}")]
    Network(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScrapeApiError>;

impl ScrapeApiError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ScrapeApiError::config("missing endpoints");
        assert_eq!(err.to_string(), "config error: missing endpoints");

        let err = ScrapeApiError::SelectorSyntax {
            selector: "li[".into(),
            message: "unexpected end of input".into(),
        };
        assert!(err.to_string().contains("`li[`"));

        let err = ScrapeApiError::SchemaTooDeep {
            field: "rows".into(),
            max_depth: 4,
        };
        assert_eq!(
            err.to_string(),
            "field `rows` exceeds the maximum nesting depth of 4"
        );
    }
}
