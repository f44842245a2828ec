//! `%variable%` substitution in endpoint source URLs.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%([A-Za-z0-9_\-]+)%").expect("placeholder regex is valid"))
}

/// Substitute every declared variable into `template`.
///
/// Each `%name%` for a name in `variables` is replaced by the matching query
/// value, or by the empty string when the parameter is absent. Placeholders
/// that are not declared stay as they are. Substitution is a single pass over
/// the template: placeholders inside substituted values are never expanded.
pub fn resolve_source(
    template: &str,
    variables: &[String],
    query: &HashMap<String, String>,
) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            if variables.iter().any(|v| v == name) {
                query.get(name).cloned().unwrap_or_default()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Distinct placeholder names in `template`, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for cap in placeholder_re().captures_iter(template) {
        let name = &cap[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
