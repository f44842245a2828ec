//! Thin layer over `scraper` selector matching.

use scraper::{ElementRef, Html, Selector};

use scrapeapi_shared::{Result, ScrapeApiError};

/// Parse a CSS selector. An empty (or all-whitespace) selector yields `None`,
/// meaning "the scope node itself".
pub fn compile(selector: &str) -> Result<Option<Selector>> {
    if selector.trim().is_empty() {
        return Ok(None);
    }

    Selector::parse(selector)
        .map(Some)
        .map_err(|e| ScrapeApiError::SelectorSyntax {
            selector: selector.to_string(),
            message: e.to_string(),
        })
}

/// All descendants of `scope` matching `selector`, in document order.
pub fn find<'a>(scope: ElementRef<'a>, selector: &str) -> Result<Vec<ElementRef<'a>>> {
    match compile(selector)? {
        Some(sel) => Ok(scope.select(&sel).collect()),
        None => Ok(vec![scope]),
    }
}

/// All elements of `document` matching `selector`, in document order.
///
/// Unlike [`find`], the root element itself is a candidate, so `html` and
/// `:root` match. An empty selector yields the root element.
pub fn find_in_document<'a>(
    document: &'a Html,
    selector: &str,
) -> Result<Vec<ElementRef<'a>>> {
    match compile(selector)? {
        Some(sel) => Ok(document.select(&sel).collect()),
        None => Ok(vec![document.root_element()]),
    }
}

/// Text of `node` and all its descendants, with surrounding whitespace trimmed.
pub fn text_content(node: ElementRef<'_>) -> String {
    node.text().collect::<String>().trim().to_string()
}
