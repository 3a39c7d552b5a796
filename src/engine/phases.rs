//! Phase orchestration.
//!
//! # Algorithm
//!
//! Runs five greedy phases in a fixed order. No phase backtracks and
//! no commitment is ever undone:
//!
//! 1. Day-restricted subjects, on their allowed days only.
//! 2. Synchronized groups, one double (or final single) block at a time.
//! 3. Subjects needing an exclusive shared resource.
//! 4. Subjects under a strict double-period rule.
//! 5. Every other subject, in shuffled subject order.
//!
//! Each phase asks for the *remaining* demand of a class and subject,
//! so pairs already satisfied by an earlier phase are skipped. A pair
//! whose remainder was logged as unplaced is abandoned for the rest of
//! the run.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", Sec. 2

use std::collections::HashSet;
use std::fmt;
use std::time::Instant;

use tracing::{debug, info};

use super::ledger::EngineState;
use super::order::{FixedOrder, SearchOrder, SeededOrder};
use super::placement::{place_demand, Demand};
use super::problem::{ClassId, Problem, SubjectId};
use super::sync::{place_synchronized, SyncOutcome};
use super::workload::WorkloadSummary;
use crate::config::{SchedulerConfig, SearchOrderKind};
use crate::models::{
    Calendar, ConstraintConfig, Lesson, Roster, Timetable, Unplaced, UnplacedReason, Weekday,
};

/// Input container for scheduling.
#[derive(Debug, Clone)]
pub struct TimetableRequest {
    /// Classes, teacher assignments and period requirements.
    pub roster: Roster,
    /// Days, lesson periods and special events.
    pub calendar: Calendar,
    /// Constraint configuration.
    pub constraints: ConstraintConfig,
}

impl TimetableRequest {
    /// Creates a request.
    pub fn new(roster: Roster, calendar: Calendar, constraints: ConstraintConfig) -> Self {
        Self {
            roster,
            calendar,
            constraints,
        }
    }
}

/// Result of a scheduling run.
#[derive(Debug, Clone)]
pub struct TimetableSolution {
    /// Weekly grid of every class.
    pub timetable: Timetable,
    /// Demand that could not be placed.
    pub unplaced: Vec<Unplaced>,
    /// Teacher workload snapshot.
    pub workload: WorkloadSummary,
}

impl TimetableSolution {
    /// Whether every requirement was placed.
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    /// Total periods left unplaced.
    pub fn unplaced_periods(&self) -> u32 {
        self.unplaced.iter().map(|u| u.periods_remaining).sum()
    }
}

/// Scheduling phases in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RestrictedSubjects,
    SynchronizedGroups,
    ResourceSubjects,
    StrictDoubles,
    RemainingSubjects,
}

impl Phase {
    /// All phases, in the order they run.
    pub const ORDER: [Phase; 5] = [
        Phase::RestrictedSubjects,
        Phase::SynchronizedGroups,
        Phase::ResourceSubjects,
        Phase::StrictDoubles,
        Phase::RemainingSubjects,
    ];

    /// Phase name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Phase::RestrictedSubjects => "Restricted Subjects",
            Phase::SynchronizedGroups => "Synchronized Groups",
            Phase::ResourceSubjects => "Resource Subjects",
            Phase::StrictDoubles => "Strict Doubles",
            Phase::RemainingSubjects => "Remaining Subjects",
        }
    }
}

/// Multi-phase greedy timetable scheduler.
///
/// # Example
///
/// ```
/// use timetable_engine::engine::{TimetableRequest, TimetableScheduler};
/// use timetable_engine::models::{
///     Calendar, ConstraintConfig, Division, DivisionCalendar, Roster, SchoolClass,
/// };
///
/// let roster = Roster::new()
///     .with_class(SchoolClass::new("1A").with_teacher("Reading", "Abe"))
///     .with_requirement(Division::LowerPrimary, "Reading", 3);
/// let calendar = Calendar::workweek()
///     .with_division(Division::LowerPrimary, DivisionCalendar::new(1..=5));
/// let request = TimetableRequest::new(roster, calendar, ConstraintConfig::new());
///
/// let mut scheduler = TimetableScheduler::new().with_seed(42);
/// let solution = scheduler.schedule(&request);
/// assert!(solution.is_complete());
/// assert_eq!(solution.timetable.scheduled_count("1A", "Reading"), 3);
/// ```
pub struct TimetableScheduler {
    order: Box<dyn SearchOrder>,
}

impl TimetableScheduler {
    /// Creates a scheduler whose search order varies between runs.
    pub fn new() -> Self {
        Self {
            order: Box::new(SeededOrder::from_entropy()),
        }
    }

    /// Uses a reproducible pseudorandom order.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_search_order(SeededOrder::new(seed))
    }

    /// Injects a search order.
    pub fn with_search_order(mut self, order: impl SearchOrder + 'static) -> Self {
        self.order = Box::new(order);
        self
    }

    /// Builds a scheduler from configuration.
    pub fn from_config(config: &SchedulerConfig) -> Self {
        match (config.search_order, config.random_seed) {
            (SearchOrderKind::Fixed, _) => Self::new().with_search_order(FixedOrder),
            (SearchOrderKind::Shuffled, Some(seed)) => Self::new().with_seed(seed),
            (SearchOrderKind::Shuffled, None) => Self::new(),
        }
    }

    /// Schedules a request.
    pub fn schedule(&mut self, request: &TimetableRequest) -> TimetableSolution {
        let problem = Problem::new(request);
        self.schedule_problem(&problem)
    }

    /// Schedules an already resolved problem.
    pub fn schedule_problem(&mut self, problem: &Problem) -> TimetableSolution {
        let start = Instant::now();
        info!(
            event = "solve_start",
            classes = problem.class_count(),
            subjects = problem.subject_count(),
            teachers = problem.teacher_count(),
            days = problem.days().len(),
        );

        let mut runner = PhaseRunner::new(problem, &mut *self.order);
        runner.run_all();
        let state = runner.into_state();

        let solution = TimetableSolution {
            timetable: build_timetable(problem, &state),
            workload: WorkloadSummary::calculate(problem, &state.loads),
            unplaced: state.unplaced,
        };

        info!(
            event = "solve_end",
            duration_ms = start.elapsed().as_millis() as u64,
            filled_slots = solution.timetable.filled_slots(),
            unplaced_entries = solution.unplaced.len(),
            unplaced_periods = solution.unplaced_periods(),
        );
        solution
    }
}

impl Default for TimetableScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimetableScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimetableScheduler").finish_non_exhaustive()
    }
}

/// Drives the phases over one run's state.
struct PhaseRunner<'a> {
    problem: &'a Problem,
    state: EngineState,
    order: &'a mut dyn SearchOrder,
    abandoned: HashSet<(ClassId, SubjectId)>,
}

impl<'a> PhaseRunner<'a> {
    fn new(problem: &'a Problem, order: &'a mut dyn SearchOrder) -> Self {
        Self {
            problem,
            state: EngineState::new(problem),
            order,
            abandoned: HashSet::new(),
        }
    }

    fn into_state(self) -> EngineState {
        self.state
    }

    fn run_all(&mut self) {
        for (index, phase) in Phase::ORDER.into_iter().enumerate() {
            self.run_phase(index, phase);
        }
    }

    fn run_phase(&mut self, index: usize, phase: Phase) {
        let start = Instant::now();
        let unplaced_before = self.state.unplaced.len();
        info!(event = "phase_start", phase = phase.name(), phase_index = index);

        let placed = match phase {
            Phase::RestrictedSubjects => self.restricted_subjects(),
            Phase::SynchronizedGroups => self.synchronized_groups(),
            Phase::ResourceSubjects => self.resource_subjects(),
            Phase::StrictDoubles => self.strict_doubles(),
            Phase::RemainingSubjects => self.remaining_subjects(),
        };

        info!(
            event = "phase_end",
            phase = phase.name(),
            phase_index = index,
            duration_ms = start.elapsed().as_millis() as u64,
            placed = placed,
            unplaced = self.state.unplaced.len() - unplaced_before,
        );
    }

    /// Places whatever `class` still needs of `subject` on `days`.
    ///
    /// Returns the number of periods placed; zero when the pair is
    /// already satisfied or abandoned, has no teacher or requirement, or
    /// belongs to a synchronized group.
    fn schedule_remaining(&mut self, class: ClassId, subject: SubjectId, days: &[Weekday]) -> u32 {
        let problem = self.problem;
        if problem.is_synchronized(class, subject) || self.abandoned.contains(&(class, subject)) {
            return 0;
        }
        let Some(required) = problem.required_periods(class, subject) else {
            return 0;
        };
        let Some(teacher) = problem.class(class).teacher_for(subject) else {
            debug!(
                class = %problem.class(class).name,
                subject = problem.subject_name(subject),
                "no teacher assigned, skipping"
            );
            return 0;
        };
        let scheduled = self.state.grid.scheduled(class, subject);
        if scheduled >= required {
            return 0;
        }

        let demand = Demand {
            class,
            subject,
            teacher,
            periods_needed: required - scheduled,
        };
        let placed = place_demand(problem, &mut self.state, &mut *self.order, demand, days);
        if placed < demand.periods_needed {
            self.abandoned.insert((class, subject));
        }
        placed
    }

    fn restricted_subjects(&mut self) -> u32 {
        let problem = self.problem;
        let mut placed = 0;
        for subject in problem.subject_ids() {
            let Some(days) = problem.subject_days(subject) else {
                continue;
            };
            for class in problem.class_ids() {
                placed += self.schedule_remaining(class, subject, days);
            }
        }
        placed
    }

    fn synchronized_groups(&mut self) -> u32 {
        let problem = self.problem;
        let mut placed = 0;
        for group in problem.groups() {
            let Some(required) = group
                .classes
                .first()
                .and_then(|&first| problem.required_periods(first, group.subject))
            else {
                debug!(group = %group.label, "no requirement for synchronized subject, skipping");
                continue;
            };

            loop {
                let scheduled = group
                    .classes
                    .iter()
                    .map(|&c| self.state.grid.scheduled(c, group.subject))
                    .max()
                    .unwrap_or(0);
                if scheduled >= required {
                    break;
                }
                let remaining = required - scheduled;
                let length = if remaining >= 2 { 2 } else { 1 };

                let reason = match place_synchronized(
                    problem,
                    &mut self.state,
                    &mut *self.order,
                    group,
                    length,
                ) {
                    SyncOutcome::Placed => {
                        placed += length as u32;
                        continue;
                    }
                    SyncOutcome::NoCommonSlot => UnplacedReason::SyncBlockUnavailable,
                    SyncOutcome::NoTeacher => UnplacedReason::SyncTeacherMissing,
                };
                self.state.log_unplaced(Unplaced {
                    label: group.label.clone(),
                    subject: problem.subject_name(group.subject).to_string(),
                    periods_remaining: remaining,
                    reason,
                });
                break;
            }
        }
        placed
    }

    fn resource_subjects(&mut self) -> u32 {
        let problem = self.problem;
        let mut placed = 0;
        for subject in problem.subject_ids() {
            if !problem.is_resource_exclusive(subject) {
                continue;
            }
            for class in problem.class_ids() {
                placed += self.schedule_remaining(class, subject, problem.days());
            }
        }
        placed
    }

    fn strict_doubles(&mut self) -> u32 {
        let problem = self.problem;
        let mut placed = 0;
        for class in problem.class_ids() {
            for subject in problem.subject_ids() {
                if problem
                    .double_rule(class, subject)
                    .is_some_and(|rule| rule.strict)
                {
                    placed += self.schedule_remaining(class, subject, problem.days());
                }
            }
        }
        placed
    }

    fn remaining_subjects(&mut self) -> u32 {
        let problem = self.problem;
        let mut subjects: Vec<SubjectId> = problem
            .subject_ids()
            .filter(|&s| problem.class_ids().any(|c| problem.required_periods(c, s).is_some()))
            .collect();
        subjects.sort_by(|&a, &b| problem.subject_name(a).cmp(problem.subject_name(b)));
        self.order.shuffle_subjects(&mut subjects);

        let mut placed = 0;
        for subject in subjects {
            for class in problem.class_ids() {
                placed += self.schedule_remaining(class, subject, problem.days());
            }
        }
        placed
    }
}

/// Converts the run's class grid into the name-keyed output timetable.
fn build_timetable(problem: &Problem, state: &EngineState) -> Timetable {
    let mut timetable = Timetable::new();
    for class in problem.class_ids() {
        let info = problem.class(class);
        if let Some(template) = problem.calendar().division(info.division) {
            for &day in problem.days() {
                for &period in &template.lesson_periods {
                    timetable.add_slot(&info.name, day, period);
                }
            }
        }
        for ((day, period), subject, teacher) in state.grid.entries(class) {
            timetable.set_lesson(
                &info.name,
                day,
                period,
                Lesson::new(problem.subject_name(subject), problem.teacher_name(teacher)),
            );
        }
    }
    timetable
}
