//! Diff calculation between two grade snapshots.
//!
//! Compares records by subject name and reports the fields that changed,
//! so a caller can notify about newly posted scores or absences.
//!
//! A subject seen for the first time produces nothing: there is no baseline
//! to compare against. A value that disappears (present, then absent) is
//! usually a transient portal glitch and is ignored unless retraction
//! reporting is enabled.

use std::collections::HashMap;

use crate::models::{FieldChange, GradeDelta, GradeField, SubjectGrade};

/// Calculator for computing diffs between snapshots.
#[derive(Debug, Clone, Default)]
pub struct DiffCalculator {
    /// Whether to report values going from present to absent
    report_retractions: bool,
}

impl DiffCalculator {
    /// Create a diff calculator that ignores retracted values.
    pub fn new() -> Self {
        Self {
            report_retractions: false,
        }
    }

    /// Create a diff calculator that also reports retracted values.
    pub fn with_retractions() -> Self {
        Self {
            report_retractions: true,
        }
    }

    /// Calculate the deltas between previous and current snapshots.
    ///
    /// Deltas follow the order of `current`. Subjects only in `previous`
    /// or only in `current` produce nothing.
    pub fn calculate(&self, previous: &[SubjectGrade], current: &[SubjectGrade]) -> Vec<GradeDelta> {
        let prev_map: HashMap<&str, &SubjectGrade> =
            previous.iter().map(|g| (g.subject.as_str(), g)).collect();

        current
            .iter()
            .filter_map(|curr| {
                let prev = prev_map.get(curr.subject.as_str())?;
                let changes = self.compare(prev, curr);
                if changes.is_empty() {
                    return None;
                }
                log::debug!("{} field(s) changed for '{}'", changes.len(), curr.subject);
                Some(GradeDelta {
                    subject: curr.subject.clone(),
                    changes,
                })
            })
            .collect()
    }

    fn compare(&self, prev: &SubjectGrade, curr: &SubjectGrade) -> Vec<FieldChange> {
        GradeField::TRACKED
            .iter()
            .filter_map(|field| self.change(*field, prev.value(*field), curr.value(*field)))
            .collect()
    }

    fn change(&self, field: GradeField, old: Option<f64>, new: Option<f64>) -> Option<FieldChange> {
        match (old, new) {
            (_, Some(value)) if old != Some(value) => Some(FieldChange {
                field,
                old,
                new: Some(value),
            }),
            (Some(_), None) if self.report_retractions => Some(FieldChange {
                field,
                old,
                new: None,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculate_diff(previous: &[SubjectGrade], current: &[SubjectGrade]) -> Vec<GradeDelta> {
        DiffCalculator::new().calculate(previous, current)
    }

    fn make_grade(subject: &str, n1: Option<f64>, n2: Option<f64>, absences: u32) -> SubjectGrade {
        SubjectGrade {
            n1,
            n2,
            absences,
            absence_ceiling: 20,
            ..SubjectGrade::new(subject)
        }
    }

    #[test]
    fn test_no_changes() {
        let prev = vec![
            make_grade("Redes de Computadores", Some(7.0), None, 2),
            make_grade("Engenharia de Software", Some(8.0), Some(6.5), 0),
        ];
        let curr = prev.clone();

        assert!(calculate_diff(&prev, &curr).is_empty());
    }

    #[test]
    fn test_posted_score() {
        let prev = vec![make_grade("Redes de Computadores", Some(7.0), None, 2)];
        let curr = vec![make_grade("Redes de Computadores", Some(7.0), Some(5.0), 2)];

        let deltas = calculate_diff(&prev, &curr);
        assert_eq!(
            deltas,
            vec![GradeDelta {
                subject: "Redes de Computadores".into(),
                changes: vec![FieldChange {
                    field: GradeField::N2,
                    old: None,
                    new: Some(5.0),
                }],
            }]
        );
    }

    #[test]
    fn test_first_sight_is_silent() {
        let prev: Vec<SubjectGrade> = vec![];
        let curr = vec![make_grade("Ética", Some(9.0), None, 0)];

        assert!(calculate_diff(&prev, &curr).is_empty());
    }

    #[test]
    fn test_dropped_subject_is_silent() {
        let prev = vec![make_grade("Ética", Some(9.0), None, 0)];
        let curr: Vec<SubjectGrade> = vec![];

        assert!(calculate_diff(&prev, &curr).is_empty());
    }

    #[test]
    fn test_retraction_is_noise_by_default() {
        let prev = vec![make_grade("Cálculo I", Some(6.0), Some(4.0), 1)];
        let curr = vec![make_grade("Cálculo I", Some(6.0), None, 1)];

        assert!(calculate_diff(&prev, &curr).is_empty());

        let deltas = DiffCalculator::with_retractions().calculate(&prev, &curr);
        assert_eq!(deltas.len(), 1);
        assert_eq!(
            deltas[0].changes,
            vec![FieldChange {
                field: GradeField::N2,
                old: Some(4.0),
                new: None,
            }]
        );
    }

    #[test]
    fn test_changed_score_and_absences() {
        let prev = vec![make_grade("Física Geral e Experimental", Some(3.0), None, 4)];
        let curr = vec![make_grade("Física Geral e Experimental", Some(3.5), None, 6)];

        let deltas = calculate_diff(&prev, &curr);
        assert_eq!(deltas.len(), 1);
        let fields: Vec<_> = deltas[0].changes.iter().map(|c| c.field).collect();
        assert_eq!(fields, vec![GradeField::N1, GradeField::Absences]);
        assert_eq!(
            deltas[0].absence_change().map(|c| (c.old, c.new)),
            Some((Some(4.0), Some(6.0)))
        );
    }

    #[test]
    fn test_deltas_follow_current_order() {
        let prev = vec![
            make_grade("A", Some(1.0), None, 0),
            make_grade("B", Some(1.0), None, 0),
        ];
        let curr = vec![
            make_grade("B", Some(2.0), None, 0),
            make_grade("A", Some(2.0), None, 0),
        ];

        let subjects: Vec<_> = calculate_diff(&prev, &curr)
            .into_iter()
            .map(|d| d.subject)
            .collect();
        assert_eq!(subjects, vec!["B", "A"]);
    }
}
