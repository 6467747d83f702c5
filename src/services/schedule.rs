// src/services/schedule.rs

//! Weekly schedule table parser.
//!
//! The schedule page is a grid: one row per time slot, one column per
//! weekday. Each weekday cell nests a small table whose data cells hold the
//! subject, the instructor and some class metadata on separate lines.

use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::{ClassBlock, ScheduleLayout, TEACHING_DAYS, WeeklySchedule};
use crate::utils::html::{compact_text, parse_selector, row_cells, table_rows, text_lines};
use crate::utils::text::{CourseSuffixStripper, strip_instructor_id};

/// A subject found in one slot of one weekday, before grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SlotEntry {
    slot: usize,
    subject: String,
    instructor: String,
}

/// Parser turning a schedule page into a `WeeklySchedule`.
#[derive(Debug, Clone)]
pub struct ScheduleParser {
    layout: ScheduleLayout,
    table_sel: Selector,
    entry_sel: Selector,
    suffixes: CourseSuffixStripper,
}

impl ScheduleParser {
    /// Build a parser for the given layout.
    pub fn new(layout: &ScheduleLayout) -> Result<Self> {
        Ok(Self {
            table_sel: parse_selector(&layout.table_selector)?,
            entry_sel: parse_selector(&layout.entry_selector)?,
            suffixes: CourseSuffixStripper::new(&layout.course_suffixes)?,
            layout: layout.clone(),
        })
    }

    /// Parse a raw HTML document.
    pub fn parse(&self, html: &str) -> WeeklySchedule {
        self.parse_document(&Html::parse_document(html))
    }

    /// Parse an already-built document tree.
    ///
    /// A missing table, or one without data rows, yields an empty schedule.
    pub fn parse_document(&self, document: &Html) -> WeeklySchedule {
        let Some(table) = document.select(&self.table_sel).next() else {
            log::warn!(
                "Schedule table '{}' not found in document",
                self.layout.table_selector
            );
            return WeeklySchedule::empty();
        };

        let rows = table_rows(table);
        if rows.len() < 2 {
            log::warn!("Schedule table has no data rows");
            return WeeklySchedule::empty();
        }

        let mut raw: Vec<Vec<SlotEntry>> = vec![Vec::new(); TEACHING_DAYS as usize];

        // First row is the weekday header
        for row in &rows[1..] {
            let cells = row_cells(*row);
            let Some(label_cell) = cells.first() else {
                continue;
            };

            let label = compact_text(*label_cell);
            let Some((slot, _)) = self.layout.slot(&label) else {
                log::debug!("Skipping schedule row with unknown slot label '{label}'");
                continue;
            };

            for (day, cell) in cells.iter().skip(1).take(TEACHING_DAYS as usize).enumerate() {
                for entry in cell.select(&self.entry_sel) {
                    if let Some((subject, instructor)) = self.extract_entry(entry) {
                        raw[day].push(SlotEntry {
                            slot,
                            subject,
                            instructor,
                        });
                    }
                }
            }
        }

        let mut schedule = WeeklySchedule::empty();
        for (day, entries) in raw.into_iter().enumerate() {
            schedule.set_day(day as u8, self.group_entries(entries));
        }
        schedule
    }

    /// Extract (subject, instructor) from one nested data cell.
    ///
    /// The first line is the subject and the second the instructor; further
    /// lines (class code, course) are ignored.
    fn extract_entry(&self, entry: ElementRef<'_>) -> Option<(String, String)> {
        let lines = text_lines(entry);
        let subject = self.suffixes.strip(lines.first()?);
        if subject.is_empty() {
            return None;
        }
        let instructor = lines
            .get(1)
            .map(|line| strip_instructor_id(line))
            .unwrap_or_default();
        Some((subject, instructor))
    }

    /// Merge the slot entries of one weekday into class blocks.
    ///
    /// Entries sharing a subject become one block spanning from the earliest
    /// to the latest of their slots. Different subjects in the same slot stay
    /// separate blocks.
    fn group_entries(&self, entries: Vec<SlotEntry>) -> Vec<ClassBlock> {
        // (subject, instructor, slots) in first-seen order
        let mut groups: Vec<(String, String, Vec<usize>)> = Vec::new();
        for entry in entries {
            match groups.iter_mut().find(|(subject, _, _)| *subject == entry.subject) {
                Some((_, instructor, slots)) => {
                    if instructor.is_empty() {
                        *instructor = entry.instructor;
                    }
                    if !slots.contains(&entry.slot) {
                        slots.push(entry.slot);
                    }
                }
                None => groups.push((entry.subject, entry.instructor, vec![entry.slot])),
            }
        }

        let mut blocks: Vec<ClassBlock> = groups
            .into_iter()
            .map(|(subject, instructor, mut slots)| {
                slots.sort_unstable();
                let (start, end) = self.span(&slots);
                ClassBlock {
                    subject,
                    instructor: (!instructor.is_empty()).then_some(instructor),
                    start,
                    end,
                }
            })
            .collect();

        // Variable-time blocks go last
        blocks.sort_by(|a, b| match (&a.start, &b.start) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        blocks
    }

    /// Start of the earliest and end of the latest slot.
    ///
    /// Variable slots carry no time, so a block starting in one has no start.
    fn span(&self, sorted_slots: &[usize]) -> (Option<String>, Option<String>) {
        let first = sorted_slots.first().and_then(|i| self.layout.slots.get(*i));
        let last = sorted_slots.last().and_then(|i| self.layout.slots.get(*i));
        (
            first.and_then(|slot| slot.start.clone()),
            last.and_then(|slot| slot.end.clone()),
        )
    }
}

impl Default for ScheduleParser {
    fn default() -> Self {
        Self::new(&ScheduleLayout::default()).expect("default schedule layout is valid")
    }
}
