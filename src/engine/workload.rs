//! Teacher workload summary.
//!
//! Snapshot of the load tracker at the end of a run, for workload
//! reports.
//!
//! | Field | Definition |
//! |-------|-----------|
//! | required_periods | Weekly periods the roster asks of the teacher |
//! | scheduled_by_day | Periods placed on each calendar day |
//! | scheduled_total | Sum of `scheduled_by_day` |
//! | daily_limit | Applicable daily workload limit |
//!
//! Entries are sorted by descending required periods, then by name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ledger::LoadTracker;
use super::problem::Problem;
use crate::models::Weekday;

/// One teacher's line in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherWorkload {
    /// Teacher name.
    pub teacher: String,
    /// Weekly periods required by the roster.
    pub required_periods: u32,
    /// Periods scheduled per calendar day.
    pub scheduled_by_day: BTreeMap<Weekday, u32>,
    /// Periods scheduled over the week.
    pub scheduled_total: u32,
    /// Applicable daily limit.
    pub daily_limit: u32,
}

impl TeacherWorkload {
    /// Required periods not scheduled (0 if fully covered).
    pub fn shortfall(&self) -> u32 {
        self.required_periods.saturating_sub(self.scheduled_total)
    }
}

/// Workload of every teacher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSummary {
    /// Sorted entries.
    pub entries: Vec<TeacherWorkload>,
}

impl WorkloadSummary {
    /// Builds the summary from the final load tracker.
    pub fn calculate(problem: &Problem, loads: &LoadTracker) -> Self {
        let mut entries: Vec<TeacherWorkload> = loads
            .iter()
            .map(|(teacher, load)| {
                let scheduled_by_day: BTreeMap<Weekday, u32> = problem
                    .days()
                    .iter()
                    .map(|&day| (day, load.on(day)))
                    .collect();
                TeacherWorkload {
                    teacher: problem.teacher_name(teacher).to_string(),
                    required_periods: load.required,
                    scheduled_total: load.total(),
                    scheduled_by_day,
                    daily_limit: problem
                        .teacher(teacher)
                        .map_or(0, |info| info.daily_limit),
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.required_periods
                .cmp(&a.required_periods)
                .then_with(|| a.teacher.cmp(&b.teacher))
        });

        Self { entries }
    }

    /// Entry for a teacher.
    pub fn get(&self, teacher: &str) -> Option<&TeacherWorkload> {
        self.entries.iter().find(|e| e.teacher == teacher)
    }

    /// Highest single-day load of any teacher.
    pub fn busiest_day_load(&self) -> u32 {
        self.entries
            .iter()
            .flat_map(|e| e.scheduled_by_day.values().copied())
            .max()
            .unwrap_or(0)
    }

    /// Whether every teacher stayed within their daily limit.
    pub fn within_limits(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.scheduled_by_day.values().all(|&n| n <= e.daily_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ledger::EngineState;
    use crate::engine::problem::{ClassId, SubjectId};
    use crate::engine::validator::{commit, Booking};
    use crate::engine::TimetableRequest;
    use crate::models::{
        Calendar, ConstraintConfig, Division, DivisionCalendar, Period, Roster, SchoolClass,
        WorkloadLimits,
    };

    fn problem() -> Problem {
        let roster = Roster::new()
            .with_class(
                SchoolClass::new("2A")
                    .with_teacher("Reading", "Abe")
                    .with_teacher("Art", "Zed"),
            )
            .with_class(
                SchoolClass::new("2B")
                    .with_teacher("Reading", "Zed")
                    .with_teacher("Art", "Cole"),
            )
            .with_requirement(Division::LowerPrimary, "Reading", 4)
            .with_requirement(Division::LowerPrimary, "Art", 2);
        let calendar = Calendar::workweek()
            .with_division(Division::LowerPrimary, DivisionCalendar::new(1..=5));
        let constraints = ConstraintConfig::new()
            .with_workload(WorkloadLimits::new(4).with_elevated("Zed", 5));
        Problem::new(&TimetableRequest::new(roster, calendar, constraints))
    }

    #[test]
    fn test_sorted_by_required_then_name() {
        let p = problem();
        let state = EngineState::new(&p);
        let summary = WorkloadSummary::calculate(&p, &state.loads);

        let names: Vec<&str> = summary.entries.iter().map(|e| e.teacher.as_str()).collect();
        // Zed: 2 + 4 = 6, Abe: 4, Cole: 2
        assert_eq!(names, vec!["Zed", "Abe", "Cole"]);
        assert_eq!(summary.get("Zed").unwrap().daily_limit, 5);
        assert_eq!(summary.get("Abe").unwrap().daily_limit, 4);
    }

    #[test]
    fn test_per_day_counts() {
        let p = problem();
        let mut state = EngineState::new(&p);
        let class = ClassId(0);
        let reading: SubjectId = p.subject_id("Reading").unwrap();
        let abe = p.teacher_id("Abe").unwrap();
        for period in [1, 2] {
            commit(
                &p,
                &mut state,
                Booking {
                    class,
                    subject: reading,
                    teacher: abe,
                    day: Weekday::Tuesday,
                    period: Period(period),
                },
            );
        }

        let summary = WorkloadSummary::calculate(&p, &state.loads);
        let abe = summary.get("Abe").unwrap();
        assert_eq!(abe.scheduled_by_day[&Weekday::Tuesday], 2);
        assert_eq!(abe.scheduled_by_day[&Weekday::Monday], 0);
        assert_eq!(abe.scheduled_by_day.len(), 5);
        assert_eq!(abe.scheduled_total, 2);
        assert_eq!(abe.shortfall(), 2);
        assert_eq!(summary.busiest_day_load(), 2);
        assert!(summary.within_limits());
    }

    #[test]
    fn test_empty_summary() {
        let summary = WorkloadSummary::default();
        assert_eq!(summary.busiest_day_load(), 0);
        assert!(summary.within_limits());
        assert!(summary.get("Anyone").is_none());
    }
}
