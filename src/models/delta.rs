//! Field-level grade changes between two snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A tracked field of `SubjectGrade`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GradeField {
    N1,
    N2,
    N3,
    SemesterAverage,
    FinalAverage,
    Absences,
}

impl GradeField {
    /// Fields compared by the diff, in report order.
    pub const TRACKED: [GradeField; 6] = [
        GradeField::N1,
        GradeField::N2,
        GradeField::N3,
        GradeField::SemesterAverage,
        GradeField::FinalAverage,
        GradeField::Absences,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GradeField::N1 => "N1",
            GradeField::N2 => "N2",
            GradeField::N3 => "N3",
            GradeField::SemesterAverage => "Semester Average",
            GradeField::FinalAverage => "Final Average",
            GradeField::Absences => "Absences",
        }
    }

    pub fn is_score(&self) -> bool {
        !matches!(self, GradeField::Absences)
    }
}

/// One changed field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldChange {
    pub field: GradeField,
    pub old: Option<f64>,
    /// None only when retraction reporting is enabled
    pub new: Option<f64>,
}

impl FieldChange {
    fn render(&self, value: Option<f64>) -> String {
        match value {
            None => "—".to_string(),
            Some(v) if self.field.is_score() => format!("{v:.1}"),
            Some(v) => format!("{v:.0}"),
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} → {}",
            self.field.label(),
            self.render(self.old),
            self.render(self.new)
        )
    }
}

/// Ordered changes for one subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeDelta {
    pub subject: String,
    pub changes: Vec<FieldChange>,
}

impl GradeDelta {
    /// Changes to partial scores and averages.
    pub fn score_changes(&self) -> impl Iterator<Item = &FieldChange> {
        self.changes.iter().filter(|c| c.field.is_score())
    }

    /// Change to the absence count, if any.
    pub fn absence_change(&self) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.field == GradeField::Absences)
    }
}
