//! Timetabling domain models.
//!
//! Provides the immutable inputs of a scheduling run (roster, calendar,
//! constraints) and its output (the class timetable and the log of
//! unplaced demand).
//!
//! # Vocabulary
//!
//! | Type | Meaning |
//! |------|---------|
//! | Division | Class-years sharing a calendar template |
//! | Period | One numbered lesson slot within a day |
//! | Slot | A (day, period) coordinate |
//! | SyncGroup | Classes taught one subject jointly |

mod calendar;
mod constraint;
mod roster;
mod timetable;

pub use calendar::{Calendar, DivisionCalendar, EventScope, Period, SpecialEvent, Weekday};
pub use constraint::{Availability, ConstraintConfig, DoublePeriodRule, SyncGroup, WorkloadLimits};
pub use roster::{Division, Roster, SchoolClass};
pub use timetable::{DayPlan, Lesson, Timetable, Unplaced, UnplacedReason};
