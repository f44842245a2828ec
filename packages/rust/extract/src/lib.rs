//! CSS-selector extraction engine.
//!
//! This crate provides:
//! - [`selector`] — selector parsing, scoped matching and text content
//! - [`engine`] — recursive evaluation of a field schema into a [`Record`](scrapeapi_shared::Record)
//! - [`validate`] — load-time schema checks

pub mod engine;
pub mod selector;
pub mod validate;

pub use engine::{evaluate_document, evaluate_field, evaluate_schema};
pub use selector::{compile, find, find_in_document, text_content};
pub use validate::{SchemaWarning, validate_schema};
