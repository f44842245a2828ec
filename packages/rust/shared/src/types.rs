//! Schema and output types for scrapeapi endpoints.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key of the fixed entry carrying the resolved source URL in every response.
pub const SOURCE_KEY: &str = "source";

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A node in an extraction schema.
///
/// A field with no `sub_fields` is a *leaf*: its [`ExtractionType`] decides
/// whether it yields text, a count or a list of strings. A field with
/// `sub_fields` is *composite*: it always yields one record per selector match
/// and its type is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Output key.
    pub name: String,
    /// CSS selector evaluated relative to the current scope. Empty matches the scope itself.
    #[serde(default)]
    pub selector: String,
    /// Leaf extraction behaviour.
    #[serde(default, rename = "type", alias = "extractionType")]
    pub extraction_type: ExtractionType,
    /// Nested fields evaluated once per match.
    #[serde(default, alias = "subFields", skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<Field>,
}

impl Field {
    /// Create a leaf field.
    pub fn new(
        name: impl Into<String>,
        selector: impl Into<String>,
        extraction_type: ExtractionType,
    ) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            extraction_type,
            sub_fields: Vec::new(),
        }
    }

    /// Create a composite field.
    pub fn composite(
        name: impl Into<String>,
        selector: impl Into<String>,
        sub_fields: Vec<Field>,
    ) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            extraction_type: ExtractionType::default(),
            sub_fields,
        }
    }

    /// Whether this field produces a list of records rather than a leaf value.
    pub fn is_composite(&self) -> bool {
        !self.sub_fields.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ExtractionType
// ---------------------------------------------------------------------------

/// How a leaf field turns its matches into a value.
///
/// Any configured string other than `text` or `count` extracts as a list.
/// The raw string is kept in [`ExtractionType::Unrecognized`] so it can be
/// reported at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExtractionType {
    /// Trimmed text of the first match, `""` when nothing matches.
    Text,
    /// Number of matches.
    Count,
    /// Trimmed text of every match.
    #[default]
    List,
    /// Unknown type string; behaves as [`ExtractionType::List`].
    Unrecognized(String),
}

impl From<String> for ExtractionType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "text" => Self::Text,
            "count" => Self::Count,
            "list" | "" => Self::List,
            _ => Self::Unrecognized(raw),
        }
    }
}

impl From<ExtractionType> for String {
    fn from(ty: ExtractionType) -> Self {
        match ty {
            ExtractionType::Text => "text".into(),
            ExtractionType::Count => "count".into(),
            ExtractionType::List => "list".into(),
            ExtractionType::Unrecognized(raw) => raw,
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// An HTTP endpoint backed by one extraction schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Route path, e.g. `/wiki`.
    pub path: String,
    /// Source URL template with `%variable%` placeholders.
    pub source: String,
    /// Query parameters substituted into `source`.
    #[serde(default)]
    pub variables: Vec<String>,
    /// Top-level fields, evaluated against the document root in order.
    #[serde(default)]
    pub fields: Vec<Field>,
}

// ---------------------------------------------------------------------------
// Value / Record
// ---------------------------------------------------------------------------

/// One extracted record: field name to value, in insertion order.
pub type Record = IndexMap<String, Value>;

/// An extracted value. Serializes as a bare JSON string, number or array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Count(usize),
    List(Vec<String>),
    Records(Vec<Record>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
