// src/utils/html.rs

//! Helpers for walking loosely nested portal tables.
//!
//! The portal nests whole tables inside cells, so row and cell lookups here
//! only follow direct children and never descend into inner tables.

use scraper::{ElementRef, Selector};

use crate::error::{AppError, Result};

use super::text::normalize_whitespace;

/// Parse a CSS selector, mapping failures to `AppError::Selector`.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Direct child elements with the given tag name.
pub fn child_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == tag)
}

/// Rows belonging to a table itself, in document order.
///
/// Rows sit either directly under the table or under its row groups;
/// rows of nested tables are excluded.
pub fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(child_elements(child, "tr")),
            _ => {}
        }
    }
    rows
}

/// Direct data cells of a row.
pub fn row_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    child_elements(row, "td").collect()
}

/// Element text with whitespace collapsed.
pub fn element_text(el: ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Element text with every text node trimmed and glued together.
pub fn compact_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

/// Non-empty trimmed text lines, splitting on both line breaks and element boundaries.
pub fn text_lines(el: ElementRef<'_>) -> Vec<String> {
    el.text()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
