// src/services/grades.rs

//! Results table parser.
//!
//! Partial scores and their weights are read by column position. The two
//! averages are read through their cell class instead, because an
//! "unavailable" marker spanning the N2/N3 columns shifts every position
//! after it while the average cells keep their class.

use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::{GradeLayout, SubjectGrade, TableOutcome};
use crate::utils::html::{compact_text, element_text, parse_selector, row_cells, table_rows};
use crate::utils::text::{fold_accents, is_subject_code, parse_count, parse_score};

/// Parser turning a results page into per-subject grade records.
#[derive(Debug, Clone)]
pub struct GradeParser {
    layout: GradeLayout,
    table_sel: Selector,
    semester_sel: Selector,
    final_sel: Selector,
    unavailable: String,
}

impl GradeParser {
    /// Build a parser for the given layout.
    pub fn new(layout: &GradeLayout) -> Result<Self> {
        Ok(Self {
            table_sel: parse_selector(&layout.table_selector)?,
            semester_sel: parse_selector(&layout.semester_average_selector)?,
            final_sel: parse_selector(&layout.final_average_selector)?,
            unavailable: fold_accents(layout.unavailable_marker.trim()),
            layout: layout.clone(),
        })
    }

    /// Parse a raw HTML document.
    pub fn parse(&self, html: &str) -> TableOutcome<Vec<SubjectGrade>> {
        self.parse_document(&Html::parse_document(html))
    }

    /// Parse an already-built document tree.
    ///
    /// Returns `Missing` when the results table is absent, and an empty list
    /// when it is present without subject rows.
    pub fn parse_document(&self, document: &Html) -> TableOutcome<Vec<SubjectGrade>> {
        let Some(table) = document.select(&self.table_sel).next() else {
            log::warn!(
                "Results table '{}' not found in document",
                self.layout.table_selector
            );
            return TableOutcome::Missing;
        };

        let grades: Vec<SubjectGrade> = table_rows(table)
            .into_iter()
            .filter_map(|row| self.parse_row(row))
            .collect();

        if grades.is_empty() {
            log::debug!("Results table has no subject rows");
        }
        TableOutcome::Parsed(grades)
    }

    /// Parse one row; rows not starting with a numeric code are headers or totals.
    fn parse_row(&self, row: ElementRef<'_>) -> Option<SubjectGrade> {
        let cells = row_cells(row);
        let code = compact_text(*cells.first()?);
        if !is_subject_code(&code) {
            return None;
        }

        let columns = self.layout.columns;
        let subject = cells
            .get(columns.subject)
            .map(|cell| element_text(*cell))
            .unwrap_or_default();
        if subject.is_empty() {
            log::debug!("Skipping results row {code} without a subject name");
            return None;
        }

        let score_at = |index: usize| {
            cells
                .get(index)
                .and_then(|cell| parse_score(&element_text(*cell)))
        };

        let mut grade = SubjectGrade {
            code,
            subject,
            n1: score_at(columns.n1),
            weight1: score_at(columns.weight1),
            semester_average: self.marked_score(row, &self.semester_sel),
            final_average: self.marked_score(row, &self.final_sel),
            ..SubjectGrade::default()
        };

        if self.has_unavailable_marker(&cells) {
            log::debug!("N2/N3 unavailable for '{}'", grade.subject);
        } else {
            if cells.len() < self.layout.full_row_cells {
                log::debug!(
                    "Results row for '{}' has {} cells, expected {}",
                    grade.subject,
                    cells.len(),
                    self.layout.full_row_cells
                );
            }
            grade.n2 = score_at(columns.n2);
            grade.weight2 = score_at(columns.weight2);
            grade.n3 = score_at(columns.n3);
            grade.weight3 = score_at(columns.weight3);
        }

        // Absence count and ceiling are always the last two cells.
        if cells.len() > columns.subject + 2 {
            let n = cells.len();
            grade.absences = parse_count(&element_text(cells[n - 2]));
            grade.absence_ceiling = parse_count(&element_text(cells[n - 1]));
        }

        Some(grade)
    }

    /// Whether the "not available" marker replaces the N2/N3 columns.
    ///
    /// Only the N2/N3 score and weight positions are inspected, so the same
    /// wording in a status cell does not hide posted scores.
    fn has_unavailable_marker(&self, cells: &[ElementRef<'_>]) -> bool {
        let columns = self.layout.columns;
        let positions = [columns.n2, columns.weight2, columns.n3, columns.weight3];
        let (Some(first), Some(last)) = (positions.iter().min(), positions.iter().max()) else {
            return false;
        };
        let last = (*last).min(cells.len().saturating_sub(1));

        cells
            .get(*first..=last)
            .unwrap_or_default()
            .iter()
            .any(|cell| fold_accents(&element_text(*cell)).contains(&self.unavailable))
    }

    fn marked_score(&self, row: ElementRef<'_>, selector: &Selector) -> Option<f64> {
        row.select(selector)
            .next()
            .and_then(|cell| parse_score(&element_text(cell)))
    }
}

impl Default for GradeParser {
    fn default() -> Self {
        Self::new(&GradeLayout::default()).expect("default results layout is valid")
    }
}
