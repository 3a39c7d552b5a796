//! Weekly calendar model.
//!
//! Defines the weekly grid lessons are placed into: school days,
//! numbered periods, per-division lesson periods, and special events
//! that take periods away from lessons.
//!
//! # Precedence
//! Special events override lesson periods. A period is usable for a
//! class on a given day iff:
//! - It is one of the lesson periods of the class's division, AND
//! - No special event on that day, applicable to that division, blocks it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::Division;

/// A school day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All seven days, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Monday through Friday.
    pub const WORKWEEK: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Zero-based index (Monday = 0). Used for per-day array lookups.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Three-letter abbreviation.
    pub fn short_name(self) -> &'static str {
        match self {
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
            Weekday::Sunday => "Sun",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A period identifier within a school day.
///
/// Identifiers are ordered; two periods are adjacent iff their
/// identifiers differ by exactly 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Period(pub u32);

impl Period {
    /// The period immediately after this one.
    #[inline]
    pub fn next(self) -> Period {
        Period(self.0 + 1)
    }

    /// Whether `other` directly follows this period.
    #[inline]
    pub fn is_followed_by(self, other: Period) -> bool {
        other.0 == self.0 + 1
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// The weekly template shared by every class of one division.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DivisionCalendar {
    /// Periods usable for lessons, in day order.
    pub lesson_periods: Vec<Period>,
    /// Morning break.
    pub break_period: Option<Period>,
    /// Lunch break.
    pub lunch_period: Option<Period>,
}

impl DivisionCalendar {
    /// Creates a template from lesson period numbers.
    pub fn new(lesson_periods: impl IntoIterator<Item = u32>) -> Self {
        Self {
            lesson_periods: lesson_periods.into_iter().map(Period).collect(),
            break_period: None,
            lunch_period: None,
        }
    }

    /// Sets the break period.
    pub fn with_break(mut self, period: u32) -> Self {
        self.break_period = Some(Period(period));
        self
    }

    /// Sets the lunch period.
    pub fn with_lunch(mut self, period: u32) -> Self {
        self.lunch_period = Some(Period(period));
        self
    }

    /// Whether `period` is this division's break or lunch.
    pub fn is_pause(&self, period: Period) -> bool {
        self.break_period == Some(period) || self.lunch_period == Some(period)
    }
}

/// Which divisions a special event applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventScope {
    /// Every division.
    All,
    /// Only the listed divisions.
    Divisions(Vec<Division>),
}

/// An event (assembly, club hour, exam) that blocks periods on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialEvent {
    /// Event name.
    pub name: String,
    /// Day the event takes place.
    pub day: Weekday,
    /// Divisions affected.
    pub scope: EventScope,
    /// Periods taken by the event.
    pub blocked_periods: Vec<Period>,
}

impl SpecialEvent {
    /// Creates an event affecting every division.
    pub fn new(name: impl Into<String>, day: Weekday) -> Self {
        Self {
            name: name.into(),
            day,
            scope: EventScope::All,
            blocked_periods: Vec::new(),
        }
    }

    /// Restricts the event to the given divisions.
    pub fn for_divisions(mut self, divisions: Vec<Division>) -> Self {
        self.scope = EventScope::Divisions(divisions);
        self
    }

    /// Adds a blocked period.
    pub fn blocking(mut self, period: u32) -> Self {
        self.blocked_periods.push(Period(period));
        self
    }

    /// Whether the event applies to a division.
    pub fn applies_to(&self, division: Division) -> bool {
        match &self.scope {
            EventScope::All => true,
            EventScope::Divisions(list) => list.contains(&division),
        }
    }

    /// Whether the event blocks `period` on `day` for `division`.
    pub fn blocks(&self, day: Weekday, division: Division, period: Period) -> bool {
        self.day == day && self.applies_to(division) && self.blocked_periods.contains(&period)
    }
}

/// The weekly calendar.
///
/// Combines the school days, each division's lesson template and the
/// special events of the week. Static for a scheduling run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Calendar {
    /// School days in week order.
    pub days: Vec<Weekday>,
    /// Lesson template per division.
    pub divisions: BTreeMap<Division, DivisionCalendar>,
    /// Special events.
    pub events: Vec<SpecialEvent>,
}

impl Calendar {
    /// Creates a calendar over the given days with no templates.
    pub fn new(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            days: days.into_iter().collect(),
            divisions: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Creates a Monday–Friday calendar.
    pub fn workweek() -> Self {
        Self::new(Weekday::WORKWEEK)
    }

    /// Sets the lesson template for a division.
    pub fn with_division(mut self, division: Division, template: DivisionCalendar) -> Self {
        self.divisions.insert(division, template);
        self
    }

    /// Adds a special event.
    pub fn with_event(mut self, event: SpecialEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Lesson template of a division, if defined.
    pub fn division(&self, division: Division) -> Option<&DivisionCalendar> {
        self.divisions.get(&division)
    }

    /// Whether a special event blocks `period` on `day` for `division`.
    pub fn is_blocked(&self, day: Weekday, division: Division, period: Period) -> bool {
        self.events.iter().any(|e| e.blocks(day, division, period))
    }

    /// Periods usable for lessons by `division` on `day`.
    ///
    /// The division's lesson periods in order, minus any period blocked
    /// by an applicable special event. Empty if the division has no
    /// template. Recomputed on every call.
    pub fn available_periods(&self, division: Division, day: Weekday) -> Vec<Period> {
        let Some(template) = self.divisions.get(&division) else {
            return Vec::new();
        };
        template
            .lesson_periods
            .iter()
            .copied()
            .filter(|&p| !self.is_blocked(day, division, p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary_template() -> DivisionCalendar {
        DivisionCalendar::new([1, 2, 4, 5, 7, 8])
            .with_break(3)
            .with_lunch(6)
    }

    #[test]
    fn test_weekday_order_and_index() {
        assert!(Weekday::Monday < Weekday::Friday);
        assert_eq!(Weekday::Monday.index(), 0);
        assert_eq!(Weekday::Sunday.index(), 6);
        assert_eq!(Weekday::Wednesday.to_string(), "Wed");
    }

    #[test]
    fn test_period_adjacency() {
        assert!(Period(2).is_followed_by(Period(3)));
        assert!(!Period(2).is_followed_by(Period(4)));
        assert!(!Period(3).is_followed_by(Period(2)));
        assert_eq!(Period(4).next(), Period(5));
    }

    #[test]
    fn test_division_pause() {
        let t = primary_template();
        assert!(t.is_pause(Period(3)));
        assert!(t.is_pause(Period(6)));
        assert!(!t.is_pause(Period(4)));
    }

    #[test]
    fn test_available_periods_no_events() {
        let cal = Calendar::workweek().with_division(Division::LowerPrimary, primary_template());
        let periods = cal.available_periods(Division::LowerPrimary, Weekday::Monday);
        assert_eq!(
            periods,
            vec![Period(1), Period(2), Period(4), Period(5), Period(7), Period(8)]
        );
    }

    #[test]
    fn test_event_blocks_only_its_day() {
        let cal = Calendar::workweek()
            .with_division(Division::LowerPrimary, primary_template())
            .with_event(SpecialEvent::new("Assembly", Weekday::Monday).blocking(1));

        let mon = cal.available_periods(Division::LowerPrimary, Weekday::Monday);
        assert!(!mon.contains(&Period(1)));
        assert_eq!(mon.len(), 5);

        let tue = cal.available_periods(Division::LowerPrimary, Weekday::Tuesday);
        assert!(tue.contains(&Period(1)));
    }

    #[test]
    fn test_event_scoped_to_divisions() {
        let cal = Calendar::workweek()
            .with_division(Division::LowerPrimary, primary_template())
            .with_division(Division::UpperPrimary, primary_template())
            .with_event(
                SpecialEvent::new("Clubs", Weekday::Friday)
                    .for_divisions(vec![Division::UpperPrimary])
                    .blocking(7)
                    .blocking(8),
            );

        assert!(cal.is_blocked(Weekday::Friday, Division::UpperPrimary, Period(8)));
        assert!(!cal.is_blocked(Weekday::Friday, Division::LowerPrimary, Period(8)));
        assert_eq!(
            cal.available_periods(Division::UpperPrimary, Weekday::Friday).len(),
            4
        );
        assert_eq!(
            cal.available_periods(Division::LowerPrimary, Weekday::Friday).len(),
            6
        );
    }

    #[test]
    fn test_missing_template_yields_no_periods() {
        let cal = Calendar::workweek();
        assert!(cal
            .available_periods(Division::LowerSecondary, Weekday::Monday)
            .is_empty());
    }

    #[test]
    fn test_event_scope_serde() {
        let scope = EventScope::Divisions(vec![Division::LowerPrimary]);
        let json = serde_json::to_string(&scope).unwrap();
        let back: EventScope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scope);
    }
}
