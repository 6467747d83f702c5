//! Document parsers.
//!
//! This module turns raw portal pages into typed records:
//! - Weekly schedule grid (`ScheduleParser`)
//! - Results table (`GradeParser`)

mod grades;
mod schedule;

pub use grades::GradeParser;
pub use schedule::ScheduleParser;
