//! Application configuration structures.
//!
//! The portal layout is a closed set of markers, slot labels and course
//! names tied to one institution. All of it lives here as data so a layout
//! change is a TOML edit rather than a code change.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Weekly schedule table layout
    #[serde(default)]
    pub schedule: ScheduleLayout,

    /// Results table layout
    #[serde(default)]
    pub grades: GradeLayout,

    /// Institutional passing rules
    #[serde(default)]
    pub policy: PassingPolicy,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AppError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.schedule.validate()?;
        self.grades.validate()?;
        self.policy.validate()
    }
}

/// Layout of the weekly schedule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleLayout {
    /// Selector identifying the schedule table
    #[serde(default = "defaults::schedule_table_selector")]
    pub table_selector: String,

    /// Selector for the nested data cells inside a weekday cell
    #[serde(default = "defaults::schedule_entry_selector")]
    pub entry_selector: String,

    /// Known time slots, in teaching order
    #[serde(default = "defaults::slots")]
    pub slots: Vec<TimeSlot>,

    /// Course names appended to subject names as " - <course>"
    #[serde(default = "defaults::course_suffixes")]
    pub course_suffixes: Vec<String>,
}

impl Default for ScheduleLayout {
    fn default() -> Self {
        Self {
            table_selector: defaults::schedule_table_selector(),
            entry_selector: defaults::schedule_entry_selector(),
            slots: defaults::slots(),
            course_suffixes: defaults::course_suffixes(),
        }
    }
}

impl ScheduleLayout {
    /// Look up a slot by label, returning its position in teaching order.
    pub fn slot(&self, label: &str) -> Option<(usize, &TimeSlot)> {
        self.slots
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.label == label)
    }

    fn validate(&self) -> Result<()> {
        if self.table_selector.trim().is_empty() {
            return Err(AppError::validation("schedule.table_selector is empty"));
        }
        if self.entry_selector.trim().is_empty() {
            return Err(AppError::validation("schedule.entry_selector is empty"));
        }
        if self.slots.is_empty() {
            return Err(AppError::validation("No schedule slots defined"));
        }

        let mut seen = HashSet::new();
        for slot in &self.slots {
            if slot.label.trim().is_empty() {
                return Err(AppError::validation("schedule slot with empty label"));
            }
            if !seen.insert(slot.label.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate schedule slot label '{}'",
                    slot.label
                )));
            }
            slot.validate()?;
        }
        Ok(())
    }
}

/// One teaching period of the day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    /// Label printed in the first column of the table (e.g. "01")
    pub label: String,

    /// Start time as "HH:MM" (None for a variable slot)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// End time as "HH:MM" (None for a variable slot)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl TimeSlot {
    /// A slot with fixed start and end times.
    pub fn timed(label: &str, start: &str, end: &str) -> Self {
        Self {
            label: label.to_string(),
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        }
    }

    /// A slot with no fixed time (weekend or complementary activities).
    pub fn variable(label: &str) -> Self {
        Self {
            label: label.to_string(),
            start: None,
            end: None,
        }
    }

    /// Whether this slot has no fixed time.
    pub fn is_variable(&self) -> bool {
        self.start.is_none()
    }

    fn validate(&self) -> Result<()> {
        match (&self.start, &self.end) {
            (None, None) => Ok(()),
            (Some(start), Some(end)) => {
                let start_time = parse_clock(&self.label, start)?;
                let end_time = parse_clock(&self.label, end)?;
                if end_time < start_time {
                    return Err(AppError::validation(format!(
                        "Slot '{}' ends ({end}) before it starts ({start})",
                        self.label
                    )));
                }
                Ok(())
            }
            _ => Err(AppError::validation(format!(
                "Slot '{}' must define both start and end, or neither",
                self.label
            ))),
        }
    }
}

fn parse_clock(label: &str, value: &str) -> Result<NaiveTime> {
    // Zero-padded so lexicographic order matches chronological order.
    if value.len() != 5 {
        return Err(AppError::validation(format!(
            "Slot '{label}' time '{value}' is not HH:MM"
        )));
    }
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| {
        AppError::validation(format!("Slot '{label}' time '{value}' is not HH:MM: {e}"))
    })
}

/// Layout of the results (grades) table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeLayout {
    /// Selector identifying the results table
    #[serde(default = "defaults::grades_table_selector")]
    pub table_selector: String,

    /// Selector for the semester average cell within a row
    #[serde(default = "defaults::semester_average_selector")]
    pub semester_average_selector: String,

    /// Selector for the final average cell within a row
    #[serde(default = "defaults::final_average_selector")]
    pub final_average_selector: String,

    /// Text shown across the N2/N3 columns when those scores are unavailable
    #[serde(default = "defaults::unavailable_marker")]
    pub unavailable_marker: String,

    /// Cell count of a row exposing all three partial scores
    #[serde(default = "defaults::full_row_cells")]
    pub full_row_cells: usize,

    /// Positional column indices
    #[serde(default)]
    pub columns: GradeColumns,
}

impl Default for GradeLayout {
    fn default() -> Self {
        Self {
            table_selector: defaults::grades_table_selector(),
            semester_average_selector: defaults::semester_average_selector(),
            final_average_selector: defaults::final_average_selector(),
            unavailable_marker: defaults::unavailable_marker(),
            full_row_cells: defaults::full_row_cells(),
            columns: GradeColumns::default(),
        }
    }
}

impl GradeLayout {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("grades.table_selector", &self.table_selector),
            (
                "grades.semester_average_selector",
                &self.semester_average_selector,
            ),
            ("grades.final_average_selector", &self.final_average_selector),
            ("grades.unavailable_marker", &self.unavailable_marker),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is empty")));
            }
        }

        // The last two cells hold absences and the absence ceiling.
        let positional_limit = self.full_row_cells.saturating_sub(2);
        for (name, index) in self.columns.named() {
            if index >= positional_limit {
                return Err(AppError::validation(format!(
                    "grades.columns.{name} ({index}) overlaps the absence columns of a {}-cell row",
                    self.full_row_cells
                )));
            }
        }
        Ok(())
    }
}

/// Fixed positions of the positional cells in a full results row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradeColumns {
    #[serde(default = "defaults::col_subject")]
    pub subject: usize,
    #[serde(default = "defaults::col_n1")]
    pub n1: usize,
    #[serde(default = "defaults::col_weight1")]
    pub weight1: usize,
    #[serde(default = "defaults::col_n2")]
    pub n2: usize,
    #[serde(default = "defaults::col_weight2")]
    pub weight2: usize,
    #[serde(default = "defaults::col_n3")]
    pub n3: usize,
    #[serde(default = "defaults::col_weight3")]
    pub weight3: usize,
}

impl Default for GradeColumns {
    fn default() -> Self {
        Self {
            subject: defaults::col_subject(),
            n1: defaults::col_n1(),
            weight1: defaults::col_weight1(),
            n2: defaults::col_n2(),
            weight2: defaults::col_weight2(),
            n3: defaults::col_n3(),
            weight3: defaults::col_weight3(),
        }
    }
}

impl GradeColumns {
    fn named(&self) -> [(&'static str, usize); 7] {
        [
            ("subject", self.subject),
            ("n1", self.n1),
            ("weight1", self.weight1),
            ("n2", self.n2),
            ("weight2", self.weight2),
            ("n3", self.n3),
            ("weight3", self.weight3),
        ]
    }
}

/// Institutional passing rules used by the simulator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PassingPolicy {
    /// Minimum semester average (MS) to pass outright
    #[serde(default = "defaults::semester_pass")]
    pub semester_pass: f64,

    /// Minimum final average (MF) to pass after the remedial exam
    #[serde(default = "defaults::final_pass")]
    pub final_pass: f64,

    /// Highest score any exam can award
    #[serde(default = "defaults::max_score")]
    pub max_score: f64,

    /// MS + AR needed to reach the final pass mark (MF = (MS + AR) / 2)
    #[serde(default = "defaults::remedial_total")]
    pub remedial_total: f64,

    /// Absence ratio at which the subject is failed regardless of scores
    #[serde(default = "defaults::absence_fail_ratio")]
    pub absence_fail_ratio: f64,

    /// Absence ratio at which a warning is raised
    #[serde(default = "defaults::absence_warning_ratio")]
    pub absence_warning_ratio: f64,
}

impl Default for PassingPolicy {
    fn default() -> Self {
        Self {
            semester_pass: defaults::semester_pass(),
            final_pass: defaults::final_pass(),
            max_score: defaults::max_score(),
            remedial_total: defaults::remedial_total(),
            absence_fail_ratio: defaults::absence_fail_ratio(),
            absence_warning_ratio: defaults::absence_warning_ratio(),
        }
    }
}

impl PassingPolicy {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("policy.semester_pass", self.semester_pass),
            ("policy.final_pass", self.final_pass),
            ("policy.max_score", self.max_score),
            ("policy.remedial_total", self.remedial_total),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(AppError::validation(format!("{name} must be > 0")));
            }
        }
        if self.semester_pass > self.max_score {
            return Err(AppError::validation(
                "policy.semester_pass exceeds policy.max_score",
            ));
        }
        for (name, ratio) in [
            ("policy.absence_fail_ratio", self.absence_fail_ratio),
            ("policy.absence_warning_ratio", self.absence_warning_ratio),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(AppError::validation(format!("{name} must be in (0, 1]")));
            }
        }
        if self.absence_warning_ratio > self.absence_fail_ratio {
            return Err(AppError::validation(
                "policy.absence_warning_ratio exceeds policy.absence_fail_ratio",
            ));
        }
        Ok(())
    }
}

mod defaults {
    use super::TimeSlot;

    // Schedule defaults
    pub fn schedule_table_selector() -> String {
        "table.Grade".into()
    }
    pub fn schedule_entry_selector() -> String {
        "td.LinhaPar, td.LinhaImpar".into()
    }
    pub fn slots() -> Vec<TimeSlot> {
        vec![
            TimeSlot::variable("P1"),
            TimeSlot::timed("01", "19:00", "19:50"),
            TimeSlot::timed("02", "19:50", "20:40"),
            TimeSlot::timed("03", "20:50", "21:40"),
            TimeSlot::timed("04", "21:40", "22:30"),
        ]
    }
    pub fn course_suffixes() -> Vec<String> {
        vec![
            "Ciência da Computação".into(),
            "Engenharia".into(),
            "Administração".into(),
            "Direito".into(),
            "Pedagogia".into(),
        ]
    }

    // Results table defaults
    pub fn grades_table_selector() -> String {
        "table.Boletim".into()
    }
    pub fn semester_average_selector() -> String {
        "td.MediaSemestral".into()
    }
    pub fn final_average_selector() -> String {
        "td.MediaFinal".into()
    }
    pub fn unavailable_marker() -> String {
        "Não disponível".into()
    }
    pub fn full_row_cells() -> usize {
        17
    }
    pub fn col_subject() -> usize {
        1
    }
    pub fn col_n1() -> usize {
        3
    }
    pub fn col_weight1() -> usize {
        4
    }
    pub fn col_n2() -> usize {
        5
    }
    pub fn col_weight2() -> usize {
        6
    }
    pub fn col_n3() -> usize {
        7
    }
    pub fn col_weight3() -> usize {
        8
    }

    // Policy defaults
    pub fn semester_pass() -> f64 {
        6.0
    }
    pub fn final_pass() -> f64 {
        5.0
    }
    pub fn max_score() -> f64 {
        10.0
    }
    pub fn remedial_total() -> f64 {
        10.0
    }
    pub fn absence_fail_ratio() -> f64 {
        0.75
    }
    pub fn absence_warning_ratio() -> f64 {
        0.5
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn default_slots_are_in_teaching_order() {
        let layout = ScheduleLayout::default();
        let labels: Vec<_> = layout.slots.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["P1", "01", "02", "03", "04"]);
        assert_eq!(layout.slot("03").map(|(i, _)| i), Some(3));
        assert!(layout.slot("05").is_none());
    }

    #[test]
    fn validate_rejects_duplicate_slot_labels() {
        let mut config = Config::default();
        config.schedule.slots.push(TimeSlot::timed("01", "07:00", "07:50"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_malformed_slot_times() {
        let mut config = Config::default();
        config.schedule.slots = vec![TimeSlot::timed("01", "7:00", "07:50")];
        assert!(config.validate().is_err());

        config.schedule.slots = vec![TimeSlot::timed("01", "19:50", "19:00")];
        assert!(config.validate().is_err());

        config.schedule.slots = vec![TimeSlot {
            label: "01".into(),
            start: Some("19:00".into()),
            end: None,
        }];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_columns_overlapping_absences() {
        let mut config = Config::default();
        config.grades.columns.n3 = 15;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_policy() {
        let mut config = Config::default();
        config.policy.absence_fail_ratio = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.policy.semester_pass = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.policy.absence_warning_ratio = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_partial_toml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[schedule]
course_suffixes = ["Sistemas de Informação"]

[policy]
semester_pass = 7.0
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.schedule.course_suffixes, vec!["Sistemas de Informação"]);
        assert_eq!(config.schedule.slots.len(), 5);
        assert_eq!(config.policy.semester_pass, 7.0);
        assert_eq!(config.policy.final_pass, 5.0);
        assert_eq!(config.grades.full_row_cells, 17);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(config.grades.table_selector, "table.Boletim");
    }

    #[test]
    fn load_reports_missing_file_as_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error: Config file not found"));
    }
}
