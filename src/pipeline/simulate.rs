//! Passing-score simulation.
//!
//! Applies the institution's passing policy to a grade record. Rules are
//! checked in a fixed order and the first match decides:
//!
//! 1. Absences at or above the failing share of the ceiling.
//! 2. A posted final average (MF).
//! 3. A posted semester average (MS).
//! 4. A projection from the partial scores posted so far.
//!
//! A decided outcome (absences, MF) always wins over inference from partial data.

use crate::models::{AverageKind, PassingPolicy, ScoreLabel, SimulationVerdict, SubjectGrade};

/// Simulator bound to one passing policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simulator {
    policy: PassingPolicy,
}

impl Simulator {
    pub fn new(policy: PassingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PassingPolicy {
        &self.policy
    }

    /// Decide the passing situation of one subject.
    pub fn simulate(&self, grade: &SubjectGrade) -> SimulationVerdict {
        let grade = grade.normalized();

        if grade.failed_by_absence(&self.policy) {
            return self.failed_by_absence(&grade);
        }
        if let Some(mf) = grade.final_average {
            return self.judge_final(mf);
        }
        if let Some(ms) = grade.semester_average {
            return self.judge_semester(ms, false);
        }
        self.project(&grade)
    }

    /// Simulate every record, keeping input order.
    pub fn simulate_all<'a>(
        &self,
        grades: &'a [SubjectGrade],
    ) -> Vec<(&'a SubjectGrade, SimulationVerdict)> {
        grades.iter().map(|g| (g, self.simulate(g))).collect()
    }

    fn failed_by_absence(&self, grade: &SubjectGrade) -> SimulationVerdict {
        let percent = grade.absence_ratio().unwrap_or_default() * 100.0;
        SimulationVerdict::FailedByAbsence {
            absences: grade.absences,
            ceiling: grade.absence_ceiling,
            percent,
            explanation: format!(
                "Absences: {}/{} ({percent:.0}%) - failed by absence",
                grade.absences, grade.absence_ceiling
            ),
        }
    }

    fn judge_final(&self, mf: f64) -> SimulationVerdict {
        if mf >= self.policy.final_pass {
            SimulationVerdict::Approved {
                by: AverageKind::Final,
                average: mf,
                estimated: false,
                explanation: format!("Approved (MF: {mf:.1})"),
            }
        } else {
            SimulationVerdict::FailedFinal {
                final_average: mf,
                explanation: format!("Failed (MF: {mf:.1})"),
            }
        }
    }

    fn judge_semester(&self, ms: f64, estimated: bool) -> SimulationVerdict {
        let label = if estimated { "estimated MS" } else { "MS" };

        if ms >= self.policy.semester_pass {
            return SimulationVerdict::Approved {
                by: AverageKind::Semester,
                average: ms,
                estimated,
                explanation: format!("Approved outright ({label}: {ms:.1})"),
            };
        }

        let remedial = self.remedial_needed(ms);
        if remedial > self.policy.max_score {
            return SimulationVerdict::Impossible {
                semester_average: ms,
                explanation: format!("{label}: {ms:.1} - cannot pass even with AR"),
            };
        }
        SimulationVerdict::NeedsRemedial {
            threshold: remedial,
            semester_average: ms,
            estimated,
            explanation: format!(
                "{label}: {ms:.1} - needs AR >= {remedial:.1} for MF >= {:.1}",
                self.policy.final_pass
            ),
        }
    }

    /// Project the outcome from the partial scores posted so far.
    fn project(&self, grade: &SubjectGrade) -> SimulationVerdict {
        let mut present: Vec<(ScoreLabel, f64, f64)> = Vec::new();
        let mut missing: Vec<(ScoreLabel, f64)> = Vec::new();
        for label in ScoreLabel::ALL {
            let weight = grade.weight(label);
            match grade.score(label) {
                Some(value) => present.push((label, value, weight)),
                None => missing.push((label, weight)),
            }
        }

        let present_weight: f64 = present.iter().map(|(_, _, w)| w).sum();
        let contribution: f64 = present.iter().map(|(_, v, w)| v * w).sum();

        if missing.is_empty() {
            // Every score is in but the portal has not computed MS yet
            let ms = if present_weight > 0.0 {
                contribution / present_weight
            } else {
                0.0
            };
            return self.judge_semester(ms, true);
        }

        let missing_weight: f64 = missing.iter().map(|(_, w)| w).sum();
        let total_weight = present_weight + missing_weight;
        let threshold =
            (self.policy.semester_pass * total_weight - contribution) / missing_weight;

        let labels: Vec<ScoreLabel> = missing.iter().map(|(l, _)| *l).collect();
        let posted = describe_scores(&present);
        let wanted = join_labels(&labels);

        if threshold <= 0.0 {
            return SimulationVerdict::AlreadySecured {
                explanation: format!(
                    "{posted} - MS >= {:.1} secured regardless of {wanted}",
                    self.policy.semester_pass
                ),
                missing: labels,
            };
        }

        if threshold <= self.policy.max_score {
            let worst_ms = contribution / total_weight;
            let worst_remedial = self.remedial_needed(worst_ms);
            let worst_case_remedial =
                (worst_remedial <= self.policy.max_score).then_some(worst_remedial);

            let mut explanation = format!("{posted} - needs at least {threshold:.1} on {wanted}");
            if let Some(ar) = worst_case_remedial {
                explanation.push_str(&format!(
                    "\nOtherwise, AR >= {ar:.1} for MF >= {:.1}",
                    self.policy.final_pass
                ));
            }
            return SimulationVerdict::NeedsMinimumScore {
                threshold,
                missing: labels,
                worst_case_remedial,
                difficult: false,
                explanation,
            };
        }

        let best_ms = (contribution + self.policy.max_score * missing_weight) / total_weight;
        if best_ms >= self.policy.semester_pass {
            return SimulationVerdict::NeedsMinimumScore {
                threshold,
                missing: labels,
                worst_case_remedial: None,
                difficult: true,
                explanation: format!(
                    "{posted} - needs {threshold:.1} on {wanted} (difficult, aim for AR)"
                ),
            };
        }

        let remedial = self.remedial_needed(best_ms);
        if remedial > self.policy.max_score {
            return SimulationVerdict::Impossible {
                semester_average: best_ms,
                explanation: format!("{posted} - cannot pass"),
            };
        }
        SimulationVerdict::NeedsRemedial {
            threshold: remedial,
            semester_average: best_ms,
            estimated: true,
            explanation: format!(
                "{posted} - will need AR >= {remedial:.1} (best possible MS: {best_ms:.1})"
            ),
        }
    }

    /// AR score needed for MF to reach the final pass mark.
    fn remedial_needed(&self, ms: f64) -> f64 {
        self.policy.remedial_total - ms
    }
}

fn describe_scores(present: &[(ScoreLabel, f64, f64)]) -> String {
    if present.is_empty() {
        return "No scores posted".to_string();
    }
    present
        .iter()
        .map(|(label, value, _)| format!("{label}: {value:.1}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_labels(labels: &[ScoreLabel]) -> String {
    match labels {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => {
            let head: Vec<_> = init.iter().map(ScoreLabel::as_str).collect();
            format!("{} and {last}", head.join(", "))
        }
    }
}
