//! Outcome of simulating a subject's passing situation.

use serde::{Deserialize, Serialize};

use crate::models::ScoreLabel;

/// Which average decided an approval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AverageKind {
    /// Semester average (MS)
    Semester,
    /// Final average (MF)
    Final,
}

/// Exactly one passing situation per subject.
///
/// Every variant carries the numbers that justify it and a rendered
/// `explanation` for direct display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SimulationVerdict {
    /// Passed on the given average.
    Approved {
        by: AverageKind,
        average: f64,
        /// True when MS was computed locally from the partial scores
        estimated: bool,
        explanation: String,
    },

    /// Absences reached the failing share of the ceiling.
    FailedByAbsence {
        absences: u32,
        ceiling: u32,
        percent: f64,
        explanation: String,
    },

    /// Final average below the final pass mark.
    FailedFinal {
        final_average: f64,
        explanation: String,
    },

    /// Remedial exam (AR) needed, with the minimum AR score.
    NeedsRemedial {
        threshold: f64,
        /// MS the threshold was derived from (best case when projected)
        semester_average: f64,
        estimated: bool,
        explanation: String,
    },

    /// No achievable score can pass the subject.
    Impossible {
        semester_average: f64,
        explanation: String,
    },

    /// Missing partial scores must average at least `threshold`.
    NeedsMinimumScore {
        threshold: f64,
        missing: Vec<ScoreLabel>,
        /// AR needed if every missing score turns out 0
        #[serde(default, skip_serializing_if = "Option::is_none")]
        worst_case_remedial: Option<f64>,
        /// Threshold is above the maximum score; aim for the remedial exam
        difficult: bool,
        explanation: String,
    },

    /// MS reaches the pass mark whatever the missing scores are.
    AlreadySecured {
        missing: Vec<ScoreLabel>,
        explanation: String,
    },
}

impl SimulationVerdict {
    /// Rendered explanation for display.
    pub fn explanation(&self) -> &str {
        match self {
            SimulationVerdict::Approved { explanation, .. }
            | SimulationVerdict::FailedByAbsence { explanation, .. }
            | SimulationVerdict::FailedFinal { explanation, .. }
            | SimulationVerdict::NeedsRemedial { explanation, .. }
            | SimulationVerdict::Impossible { explanation, .. }
            | SimulationVerdict::NeedsMinimumScore { explanation, .. }
            | SimulationVerdict::AlreadySecured { explanation, .. } => explanation,
        }
    }

    /// Stable status tag, matching the serialized `status` field.
    pub fn status(&self) -> &'static str {
        match self {
            SimulationVerdict::Approved { .. } => "approved",
            SimulationVerdict::FailedByAbsence { .. } => "failed_by_absence",
            SimulationVerdict::FailedFinal { .. } => "failed_final",
            SimulationVerdict::NeedsRemedial { .. } => "needs_remedial",
            SimulationVerdict::Impossible { .. } => "impossible",
            SimulationVerdict::NeedsMinimumScore { .. } => "needs_minimum_score",
            SimulationVerdict::AlreadySecured { .. } => "already_secured",
        }
    }

    /// Whether the subject is passed or guaranteed to pass.
    pub fn is_passing(&self) -> bool {
        matches!(
            self,
            SimulationVerdict::Approved { .. } | SimulationVerdict::AlreadySecured { .. }
        )
    }

    /// Whether the subject can no longer be passed.
    pub fn is_failed(&self) -> bool {
        matches!(
            self,
            SimulationVerdict::FailedByAbsence { .. }
                | SimulationVerdict::FailedFinal { .. }
                | SimulationVerdict::Impossible { .. }
        )
    }
}
