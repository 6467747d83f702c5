// src/utils/text.rs

//! Text normalization for portal cell contents.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;

/// Trailing numeric instructor id, e.g. "Marcio Veleda (1234)".
static INSTRUCTOR_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d+\)\s*$").expect("instructor id pattern is valid"));

/// Collapse runs of whitespace (including non-breaking spaces) into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase and strip the accents used in Portuguese, for marker comparison.
pub fn fold_accents(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ã' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'õ' | 'ô' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Parse a score cell.
///
/// Accepts "," as the decimal separator. Blank cells and dash placeholders
/// are absent, never zero; anything unparseable is absent as well.
pub fn parse_score(s: &str) -> Option<f64> {
    let trimmed = normalize_whitespace(s);
    if matches!(trimmed.as_str(), "" | "-" | "--" | "—") {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse an absence count cell; non-numeric text counts as 0.
pub fn parse_count(s: &str) -> u32 {
    s.trim().parse().unwrap_or(0)
}

/// Whether the text is a numeric subject code.
pub fn is_subject_code(s: &str) -> bool {
    let trimmed = s.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}

/// Remove a trailing "(1234)" id from an instructor name.
pub fn strip_instructor_id(s: &str) -> String {
    INSTRUCTOR_ID.replace(s, "").trim().to_string()
}

/// Strips " - <course name>" suffixes from subject names.
///
/// Only the configured course names are recognized, so subjects whose own
/// name contains a dash are left untouched.
#[derive(Debug, Clone)]
pub struct CourseSuffixStripper {
    pattern: Option<Regex>,
}

impl CourseSuffixStripper {
    pub fn new(courses: &[String]) -> Result<Self> {
        let alternatives: Vec<String> = courses
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&format!(r"\s*-\s*(?:{}).*$", alternatives.join("|")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn strip(&self, subject: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern.replace(subject, "").trim().to_string(),
            None => subject.trim().to_string(),
        }
    }
}
