//! Shared types, error model, and configuration for scrapeapi.
//!
//! This crate is the foundation depended on by all other scrapeapi crates.
//! It provides:
//! - [`ScrapeApiError`] — the unified error type
//! - Schema types ([`Field`], [`ExtractionType`], [`Endpoint`]) and output types ([`Value`], [`Record`])
//! - Configuration ([`AppConfig`], [`FetchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_CONFIG_FILE, ExtractionLimits, FetchConfig, ServerConfig, init_config,
    load_config_from, sample_config,
};
pub use error::{Result, ScrapeApiError};
pub use types::{Endpoint, ExtractionType, Field, Record, SOURCE_KEY, Value};
