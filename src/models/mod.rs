// src/models/mod.rs

//! Domain models for the portal extraction core.
//!
//! Plain, serializable records produced by the parsers and consumed by the
//! simulation and diff engines.

mod config;
mod delta;
mod grade;
mod schedule;
mod verdict;

// Re-export all public types
pub use config::{Config, GradeColumns, GradeLayout, PassingPolicy, ScheduleLayout, TimeSlot};
pub use delta::{FieldChange, GradeDelta, GradeField};
pub use grade::{AbsenceStatus, ScoreLabel, SubjectGrade, TableOutcome};
pub use schedule::{ClassBlock, TEACHING_DAYS, WeeklySchedule};
pub use verdict::{AverageKind, SimulationVerdict};
