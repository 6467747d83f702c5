// src/lib.rs

//! Academic portal extraction core.
//!
//! Parses the weekly schedule and results pages of the student portal into
//! typed records, simulates the passing situation of each subject, and
//! reports grade changes between two snapshots.
//!
//! The free functions below use the default configuration. Build the parsers
//! and engines directly to use a custom `Config`.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;

use models::{GradeDelta, SimulationVerdict, SubjectGrade, TableOutcome, WeeklySchedule};
use pipeline::{DiffCalculator, Simulator};
use services::{GradeParser, ScheduleParser};

/// Parse a schedule page with the default layout.
pub fn parse_schedule(html: &str) -> WeeklySchedule {
    ScheduleParser::default().parse(html)
}

/// Parse a results page with the default layout.
pub fn parse_grades(html: &str) -> TableOutcome<Vec<SubjectGrade>> {
    GradeParser::default().parse(html)
}

/// Simulate one subject under the default passing policy.
pub fn simulate(grade: &SubjectGrade) -> SimulationVerdict {
    Simulator::default().simulate(grade)
}

/// Deltas between two snapshots, ignoring retracted values.
pub fn diff(old: &[SubjectGrade], new: &[SubjectGrade]) -> Vec<GradeDelta> {
    DiffCalculator::new().calculate(old, new)
}
