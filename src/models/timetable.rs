//! Timetable (solution) model.
//!
//! A timetable maps every class to a weekly grid of optional lessons.
//! Demand the engine could not place is reported separately as
//! [`Unplaced`] entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{Period, Weekday};

/// A placed lesson: what is taught and by whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Subject name.
    pub subject: String,
    /// Teacher name.
    pub teacher: String,
}

impl Lesson {
    /// Creates a lesson.
    pub fn new(subject: impl Into<String>, teacher: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            teacher: teacher.into(),
        }
    }
}

/// One class's day: period → lesson (or `None` for a free slot).
pub type DayPlan = BTreeMap<Period, Option<Lesson>>;

/// The weekly timetable of every class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timetable {
    /// class → day → period → optional lesson.
    pub classes: BTreeMap<String, BTreeMap<Weekday, DayPlan>>,
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty grid cell (no-op if the cell exists).
    pub fn add_slot(&mut self, class: &str, day: Weekday, period: Period) {
        self.classes
            .entry(class.to_string())
            .or_default()
            .entry(day)
            .or_default()
            .entry(period)
            .or_insert(None);
    }

    /// Places a lesson, replacing whatever occupied the cell.
    pub fn set_lesson(&mut self, class: &str, day: Weekday, period: Period, lesson: Lesson) {
        self.classes
            .entry(class.to_string())
            .or_default()
            .entry(day)
            .or_default()
            .insert(period, Some(lesson));
    }

    /// Lesson at a cell, if any.
    pub fn lesson(&self, class: &str, day: Weekday, period: Period) -> Option<&Lesson> {
        self.classes
            .get(class)
            .and_then(|week| week.get(&day))
            .and_then(|plan| plan.get(&period))
            .and_then(Option::as_ref)
    }

    /// A class's day plan.
    pub fn day_plan(&self, class: &str, day: Weekday) -> Option<&DayPlan> {
        self.classes.get(class).and_then(|week| week.get(&day))
    }

    /// Iterates over every placed lesson as `(class, day, period, lesson)`.
    pub fn lessons(&self) -> impl Iterator<Item = (&str, Weekday, Period, &Lesson)> {
        self.classes.iter().flat_map(|(class, week)| {
            week.iter().flat_map(move |(&day, plan)| {
                plan.iter().filter_map(move |(&period, cell)| {
                    cell.as_ref()
                        .map(|lesson| (class.as_str(), day, period, lesson))
                })
            })
        })
    }

    /// Number of periods of `subject` placed for `class`.
    pub fn scheduled_count(&self, class: &str, subject: &str) -> usize {
        self.lessons()
            .filter(|(c, _, _, l)| *c == class && l.subject == subject)
            .count()
    }

    /// Number of occupied cells.
    pub fn filled_slots(&self) -> usize {
        self.lessons().count()
    }
}

/// Why residual demand was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnplacedReason {
    /// No allowed day had a valid slot for a single period.
    NoSlot,
    /// No day had a window valid for every class of a synchronized group.
    SyncBlockUnavailable,
    /// The synchronized group's teacher could not be determined.
    SyncTeacherMissing,
}

impl fmt::Display for UnplacedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnplacedReason::NoSlot => "no valid slot on any allowed day",
            UnplacedReason::SyncBlockUnavailable => "no common slot for the synchronized group",
            UnplacedReason::SyncTeacherMissing => "no teacher assigned for the synchronized group",
        };
        f.write_str(text)
    }
}

/// Residual demand the engine gave up on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unplaced {
    /// Class name, or the joined label of a synchronized group.
    pub label: String,
    /// Subject name.
    pub subject: String,
    /// Periods still missing when placement stopped.
    pub periods_remaining: u32,
    /// Why placement stopped.
    pub reason: UnplacedReason,
}

impl fmt::Display for Unplaced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {}: {} period(s) unplaced ({})",
            self.label, self.subject, self.periods_remaining, self.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_timetable() -> Timetable {
        let mut t = Timetable::new();
        for p in 1..=3 {
            t.add_slot("4A", Weekday::Monday, Period(p));
        }
        t.set_lesson("4A", Weekday::Monday, Period(1), Lesson::new("Math", "Ito"));
        t.set_lesson("4A", Weekday::Monday, Period(2), Lesson::new("Math", "Ito"));
        t.set_lesson("4B", Weekday::Tuesday, Period(1), Lesson::new("Art", "Vale"));
        t
    }

    #[test]
    fn test_lesson_lookup() {
        let t = sample_timetable();
        assert_eq!(
            t.lesson("4A", Weekday::Monday, Period(1)),
            Some(&Lesson::new("Math", "Ito"))
        );
        assert_eq!(t.lesson("4A", Weekday::Monday, Period(3)), None);
        assert_eq!(t.lesson("9Z", Weekday::Monday, Period(1)), None);
    }

    #[test]
    fn test_empty_cells_are_kept() {
        let t = sample_timetable();
        let plan = t.day_plan("4A", Weekday::Monday).unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[&Period(3)], None);
    }

    #[test]
    fn test_add_slot_keeps_existing_lesson() {
        let mut t = sample_timetable();
        t.add_slot("4A", Weekday::Monday, Period(1));
        assert!(t.lesson("4A", Weekday::Monday, Period(1)).is_some());
    }

    #[test]
    fn test_counts() {
        let t = sample_timetable();
        assert_eq!(t.scheduled_count("4A", "Math"), 2);
        assert_eq!(t.scheduled_count("4B", "Math"), 0);
        assert_eq!(t.filled_slots(), 3);
    }

    #[test]
    fn test_unplaced_display() {
        let u = Unplaced {
            label: "5A+5B".into(),
            subject: "PE".into(),
            periods_remaining: 2,
            reason: UnplacedReason::SyncBlockUnavailable,
        };
        assert_eq!(
            u.to_string(),
            "5A+5B / PE: 2 period(s) unplaced (no common slot for the synchronized group)"
        );
    }

    #[test]
    fn test_timetable_serializes() {
        let t = sample_timetable();
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["classes"]["4A"]["Monday"]["1"]["subject"], "Math");
        assert!(json["classes"]["4A"]["Monday"]["3"].is_null());
    }
}
