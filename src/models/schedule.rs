//! Weekly class schedule records.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Number of teaching days in the week (Monday through Saturday).
pub const TEACHING_DAYS: u8 = 6;

/// One contiguous teaching block on one weekday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassBlock {
    /// Subject name, without the course suffix
    pub subject: String,

    /// Instructor name, without the trailing numeric id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,

    /// Start time as "HH:MM" (None when the block has no fixed time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// End time as "HH:MM" (None when the block has no fixed time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl ClassBlock {
    /// Whether the block has no fixed time.
    pub fn is_variable(&self) -> bool {
        self.start.is_none()
    }
}

/// Class blocks per weekday, 0 = Monday through 5 = Saturday.
///
/// Every teaching day is always present, possibly with an empty list.
/// Sunday is never populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    try_from = "BTreeMap<u8, Vec<ClassBlock>>",
    into = "BTreeMap<u8, Vec<ClassBlock>>"
)]
pub struct WeeklySchedule {
    days: BTreeMap<u8, Vec<ClassBlock>>,
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::empty()
    }
}

impl WeeklySchedule {
    /// A schedule with every teaching day mapped to no classes.
    pub fn empty() -> Self {
        Self {
            days: (0..TEACHING_DAYS).map(|day| (day, Vec::new())).collect(),
        }
    }

    /// Replace the blocks of a teaching day.
    ///
    /// # Panics
    ///
    /// Panics if `day` is not a teaching day index (0..=5).
    pub fn set_day(&mut self, day: u8, blocks: Vec<ClassBlock>) {
        assert!(day < TEACHING_DAYS, "weekday index {day} out of range");
        self.days.insert(day, blocks);
    }

    /// Blocks for a weekday index; Sunday (6) is always empty.
    ///
    /// # Panics
    ///
    /// Panics if `day` is greater than 6.
    pub fn day(&self, day: u8) -> &[ClassBlock] {
        assert!(day <= 6, "weekday index {day} out of range");
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Blocks for a calendar weekday.
    pub fn for_weekday(&self, weekday: Weekday) -> &[ClassBlock] {
        self.day(weekday.num_days_from_monday() as u8)
    }

    /// Iterate over teaching days in order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[ClassBlock])> {
        self.days.iter().map(|(day, blocks)| (*day, blocks.as_slice()))
    }

    /// Total number of blocks across the week.
    pub fn total_blocks(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    /// Whether no day has any class.
    pub fn is_empty(&self) -> bool {
        self.total_blocks() == 0
    }
}

impl TryFrom<BTreeMap<u8, Vec<ClassBlock>>> for WeeklySchedule {
    type Error = AppError;

    /// Rebuild a schedule from its day map, filling absent teaching days.
    fn try_from(days: BTreeMap<u8, Vec<ClassBlock>>) -> Result<Self, Self::Error> {
        let mut schedule = Self::empty();
        for (day, blocks) in days {
            if day >= TEACHING_DAYS {
                return Err(AppError::validation(format!(
                    "weekday index {day} is not a teaching day"
                )));
            }
            schedule.set_day(day, blocks);
        }
        Ok(schedule)
    }
}

impl From<WeeklySchedule> for BTreeMap<u8, Vec<ClassBlock>> {
    fn from(schedule: WeeklySchedule) -> Self {
        schedule.days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(subject: &str, start: &str, end: &str) -> ClassBlock {
        ClassBlock {
            subject: subject.to_string(),
            instructor: None,
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        }
    }

    #[test]
    fn test_empty_has_all_teaching_days() {
        let schedule = WeeklySchedule::empty();
        assert_eq!(schedule.iter().count(), 6);
        assert!(schedule.is_empty());
        assert!(schedule.day(6).is_empty());
    }

    #[test]
    fn test_for_weekday() {
        let mut schedule = WeeklySchedule::empty();
        schedule.set_day(4, vec![block("Redes de Computadores", "19:00", "22:30")]);

        assert_eq!(schedule.for_weekday(Weekday::Fri).len(), 1);
        assert!(schedule.for_weekday(Weekday::Mon).is_empty());
        assert!(schedule.for_weekday(Weekday::Sun).is_empty());
        assert_eq!(schedule.total_blocks(), 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_day_rejects_sunday() {
        WeeklySchedule::empty().set_day(6, Vec::new());
    }

    #[test]
    fn test_serializes_as_day_map() {
        let mut schedule = WeeklySchedule::empty();
        schedule.set_day(0, vec![block("Prog. Orientada a Objetos", "19:00", "22:30")]);

        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["0"][0]["subject"], "Prog. Orientada a Objetos");
        assert_eq!(json["5"], serde_json::json!([]));
        assert!(json.get("6").is_none());

        let back: WeeklySchedule = serde_json::from_value(json).unwrap();
        assert_eq!(back, schedule);
    }

    #[test]
    fn test_deserialize_fills_missing_days() {
        let schedule: WeeklySchedule =
            serde_json::from_str(r#"{"2": [{"subject": "Redes de Computadores"}]}"#).unwrap();

        let days: Vec<_> = schedule.iter().map(|(day, blocks)| (day, blocks.len())).collect();
        assert_eq!(days, vec![(0, 0), (1, 0), (2, 1), (3, 0), (4, 0), (5, 0)]);
    }

    #[test]
    fn test_deserialize_rejects_sunday() {
        let result = serde_json::from_str::<WeeklySchedule>(
            r#"{"0": [], "6": [{"subject": "Estágio Supervisionado"}]}"#,
        );
        assert!(result.is_err());
    }
}
