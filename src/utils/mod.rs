//! Utility functions and helpers.

pub mod html;
pub mod text;

pub use html::{element_text, parse_selector, row_cells, table_rows};
pub use text::{normalize_whitespace, parse_count, parse_score};
