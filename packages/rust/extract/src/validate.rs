//! Load-time checks for field schemas.

use std::fmt;

use tracing::warn;

use scrapeapi_shared::{ExtractionLimits, ExtractionType, Field, Result, ScrapeApiError};

use crate::selector::compile;

/// A non-fatal schema issue reported at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaWarning {
    /// Dotted path of the field, e.g. `products.reviews.author`.
    pub field: String,
    pub message: String,
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a schema before serving it.
///
/// Fails on empty names, malformed selectors, and nesting beyond
/// `limits.max_depth`. Leaf fields with an unrecognized type load (they
/// extract as lists) but are reported as warnings.
pub fn validate_schema(fields: &[Field], limits: ExtractionLimits) -> Result<Vec<SchemaWarning>> {
    let mut warnings = Vec::new();
    walk(fields, "", 1, limits, &mut warnings)?;

    for warning in &warnings {
        warn!(field = %warning.field, "{}", warning.message);
    }
    Ok(warnings)
}

fn walk(
    fields: &[Field],
    parent: &str,
    depth: usize,
    limits: ExtractionLimits,
    warnings: &mut Vec<SchemaWarning>,
) -> Result<()> {
    for field in fields {
        let path = if parent.is_empty() {
            field.name.clone()
        } else {
            format!("{parent}.{}", field.name)
        };

        if field.name.is_empty() {
            let location = if parent.is_empty() { "top level" } else { parent };
            return Err(ScrapeApiError::validation(format!(
                "field with selector `{}` under {location} has an empty name",
                field.selector
            )));
        }

        if depth > limits.max_depth {
            return Err(ScrapeApiError::SchemaTooDeep {
                field: path,
                max_depth: limits.max_depth,
            });
        }

        compile(&field.selector)?;

        if field.is_composite() {
            walk(&field.sub_fields, &path, depth + 1, limits, warnings)?;
        } else if let ExtractionType::Unrecognized(raw) = &field.extraction_type {
            warnings.push(SchemaWarning {
                field: path,
                message: format!("unrecognized type `{raw}`, extracting as list"),
            });
        }
    }
    Ok(())
}
