//! Recursive evaluation of field schemas against a parsed document.
//!
//! Evaluation is synchronous and side-effect free: the same schema applied to
//! the same document always yields the same [`Record`]. Absent matches are
//! values (`""`, `0`, `[]`), never errors.

use scraper::{ElementRef, Html};
use tracing::{debug, trace};

use scrapeapi_shared::{
    ExtractionLimits, ExtractionType, Field, Record, Result, SOURCE_KEY, ScrapeApiError, Value,
};

use crate::selector::{find, find_in_document, text_content};

/// Parse `html` and evaluate `fields` against the document.
///
/// The parsed document lives only for the duration of this call, so async
/// callers can fetch first and extract afterwards without holding a
/// non-`Send` DOM across an await point.
pub fn evaluate_document(
    html: &str,
    source_url: &str,
    fields: &[Field],
    limits: ExtractionLimits,
) -> Result<Record> {
    let document = Html::parse_document(html);
    evaluate_schema(&document, source_url, fields, limits)
}

/// Evaluate top-level `fields` against `document`.
///
/// Top-level selectors search the whole document, root element included.
/// The result starts with a `source` entry holding `source_url`, followed by
/// one entry per field in declaration order. A later field with a duplicate
/// name overwrites the earlier value in place.
pub fn evaluate_schema(
    document: &Html,
    source_url: &str,
    fields: &[Field],
    limits: ExtractionLimits,
) -> Result<Record> {
    let mut record = Record::with_capacity(fields.len() + 1);
    record.insert(SOURCE_KEY.to_string(), Value::Text(source_url.to_string()));

    for field in fields {
        let matches = find_in_document(document, &field.selector)?;
        let value = evaluate_matches(matches, field, 1, limits)?;
        record.insert(field.name.clone(), value);
    }

    debug!(source_url, fields = fields.len(), "schema evaluated");
    Ok(record)
}

/// Evaluate a single field with `scope` as the selector root.
pub fn evaluate_field(
    scope: ElementRef<'_>,
    field: &Field,
    limits: ExtractionLimits,
) -> Result<Value> {
    evaluate_at(scope, field, 1, limits)
}

fn evaluate_at(
    scope: ElementRef<'_>,
    field: &Field,
    depth: usize,
    limits: ExtractionLimits,
) -> Result<Value> {
    let matches = find(scope, &field.selector)?;
    evaluate_matches(matches, field, depth, limits)
}

fn evaluate_matches(
    matches: Vec<ElementRef<'_>>,
    field: &Field,
    depth: usize,
    limits: ExtractionLimits,
) -> Result<Value> {
    if depth > limits.max_depth {
        return Err(ScrapeApiError::SchemaTooDeep {
            field: field.name.clone(),
            max_depth: limits.max_depth,
        });
    }

    trace!(field = %field.name, depth, matches = matches.len(), "field matched");

    if field.is_composite() {
        let mut records = Vec::with_capacity(matches.len());
        for node in matches {
            let mut record = Record::with_capacity(field.sub_fields.len());
            for sub in &field.sub_fields {
                record.insert(sub.name.clone(), evaluate_at(node, sub, depth + 1, limits)?);
            }
            records.push(record);
        }
        return Ok(Value::Records(records));
    }

    let value = match &field.extraction_type {
        ExtractionType::Text => Value::Text(
            matches
                .first()
                .map(|node| text_content(*node))
                .unwrap_or_default(),
        ),
        ExtractionType::Count => Value::Count(matches.len()),
        ExtractionType::List | ExtractionType::Unrecognized(_) => {
            Value::List(matches.into_iter().map(text_content).collect())
        }
    };
    Ok(value)
}
