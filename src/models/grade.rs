//! Per-subject grade and absence records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{GradeField, PassingPolicy};

/// Label of a partial score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScoreLabel {
    N1,
    N2,
    N3,
}

impl ScoreLabel {
    pub const ALL: [ScoreLabel; 3] = [ScoreLabel::N1, ScoreLabel::N2, ScoreLabel::N3];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLabel::N1 => "N1",
            ScoreLabel::N2 => "N2",
            ScoreLabel::N3 => "N3",
        }
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the results table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SubjectGrade {
    /// Numeric subject code from the first cell
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,

    /// Subject name
    pub subject: String,

    #[serde(default)]
    pub n1: Option<f64>,
    #[serde(default)]
    pub n2: Option<f64>,
    #[serde(default)]
    pub n3: Option<f64>,

    /// Weight of each partial score as published by the portal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight3: Option<f64>,

    /// Semester average (MS)
    #[serde(default)]
    pub semester_average: Option<f64>,

    /// Final average (MF), only set after the remedial exam
    #[serde(default)]
    pub final_average: Option<f64>,

    #[serde(default)]
    pub absences: u32,

    /// Maximum absences allowed (0 when the subject has no attendance control)
    #[serde(default)]
    pub absence_ceiling: u32,
}

/// Attendance risk level of a subject.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceStatus {
    Safe,
    Warning,
    Critical,
}

impl SubjectGrade {
    /// Create a record with only a subject name.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Partial score by label.
    pub fn score(&self, label: ScoreLabel) -> Option<f64> {
        match label {
            ScoreLabel::N1 => self.n1,
            ScoreLabel::N2 => self.n2,
            ScoreLabel::N3 => self.n3,
        }
    }

    /// Effective weight of a partial score.
    ///
    /// Missing, zero, negative or non-finite weights count as 1.0. The raw
    /// portal value stays in `weight1..weight3`; a negative weight would
    /// invert its score's contribution, so it is not used as published.
    pub fn weight(&self, label: ScoreLabel) -> f64 {
        let raw = match label {
            ScoreLabel::N1 => self.weight1,
            ScoreLabel::N2 => self.weight2,
            ScoreLabel::N3 => self.weight3,
        };
        raw.filter(|w| w.is_finite() && *w > 0.0).unwrap_or(1.0)
    }

    /// Value of a tracked field, absences included.
    pub fn value(&self, field: GradeField) -> Option<f64> {
        match field {
            GradeField::N1 => self.n1,
            GradeField::N2 => self.n2,
            GradeField::N3 => self.n3,
            GradeField::SemesterAverage => self.semester_average,
            GradeField::FinalAverage => self.final_average,
            GradeField::Absences => Some(self.absences as f64),
        }
    }

    /// Whether no partial score has been posted.
    pub fn has_no_scores(&self) -> bool {
        ScoreLabel::ALL.iter().all(|l| self.score(*l).is_none())
    }

    /// Semester average with the "not yet computed" sentinel removed.
    ///
    /// The portal prints MS as 0.0 before any partial score is posted.
    pub fn effective_semester_average(&self) -> Option<f64> {
        match self.semester_average {
            Some(ms) if ms == 0.0 && self.has_no_scores() => None,
            other => other,
        }
    }

    /// Copy of this record with the sentinel semester average cleared.
    pub fn normalized(&self) -> Self {
        Self {
            semester_average: self.effective_semester_average(),
            ..self.clone()
        }
    }

    /// Absences as a fraction of the ceiling, or None without attendance control.
    pub fn absence_ratio(&self) -> Option<f64> {
        (self.absence_ceiling > 0).then(|| self.absences as f64 / self.absence_ceiling as f64)
    }

    /// Whether the absence count alone fails the subject.
    pub fn failed_by_absence(&self, policy: &PassingPolicy) -> bool {
        self.absence_ceiling > 0
            && self.absences as f64 >= self.absence_ceiling as f64 * policy.absence_fail_ratio
    }

    /// Attendance risk level under the given policy.
    pub fn absence_status(&self, policy: &PassingPolicy) -> AbsenceStatus {
        if self.failed_by_absence(policy) {
            return AbsenceStatus::Critical;
        }
        match self.absence_ratio() {
            Some(ratio) if ratio >= policy.absence_warning_ratio => AbsenceStatus::Warning,
            _ => AbsenceStatus::Safe,
        }
    }
}

/// Result of looking up a table in a document.
///
/// `Missing` means the identifying marker was not found (portal outage,
/// failed login or layout change). `Parsed` with an empty value means the
/// table exists but holds no data rows yet.
#[derive(Debug, Clone, PartialEq)]
pub enum TableOutcome<T> {
    Missing,
    Parsed(T),
}

impl<T> TableOutcome<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, TableOutcome::Missing)
    }

    /// The parsed value, or None if the table was missing.
    pub fn parsed(self) -> Option<T> {
        match self {
            TableOutcome::Missing => None,
            TableOutcome::Parsed(value) => Some(value),
        }
    }
}
