//! Mutable run state.
//!
//! Three structures record what has been booked so far:
//!
//! - [`ClassGrid`]: per class, the (subject, teacher) placed at each slot.
//! - [`ConflictLedger`]: per slot, the busy teachers and the holder of
//!   each exclusive resource.
//! - [`LoadTracker`]: per teacher, periods scheduled on each day.
//!
//! All three are owned by [`EngineState`] and change only through
//! [`commit`](super::validator::commit).

use std::collections::{HashMap, HashSet};

use super::problem::{ClassId, Problem, SubjectId, TeacherId};
use crate::models::{Period, Unplaced, Weekday};

/// A (day, period) coordinate.
pub type Slot = (Weekday, Period);

/// Per-class placements.
#[derive(Debug, Clone, Default)]
pub struct ClassGrid {
    cells: Vec<HashMap<Slot, (SubjectId, TeacherId)>>,
    counts: HashMap<(ClassId, SubjectId), u32>,
}

impl ClassGrid {
    /// Creates an empty grid for `class_count` classes.
    pub fn new(class_count: usize) -> Self {
        Self {
            cells: vec![HashMap::new(); class_count],
            counts: HashMap::new(),
        }
    }

    /// What occupies a class's slot.
    pub fn get(
        &self,
        class: ClassId,
        day: Weekday,
        period: Period,
    ) -> Option<(SubjectId, TeacherId)> {
        self.cells
            .get(class.index())
            .and_then(|cells| cells.get(&(day, period)))
            .copied()
    }

    /// Whether a class's slot is occupied.
    pub fn is_booked(&self, class: ClassId, day: Weekday, period: Period) -> bool {
        self.get(class, day, period).is_some()
    }

    /// Periods of `subject` placed for `class`.
    pub fn scheduled(&self, class: ClassId, subject: SubjectId) -> u32 {
        self.counts.get(&(class, subject)).copied().unwrap_or(0)
    }

    /// All placements of a class.
    pub fn entries(
        &self,
        class: ClassId,
    ) -> impl Iterator<Item = (Slot, SubjectId, TeacherId)> + '_ {
        self.cells
            .get(class.index())
            .into_iter()
            .flat_map(|cells| cells.iter().map(|(&slot, &(s, t))| (slot, s, t)))
    }

    fn insert(&mut self, class: ClassId, slot: Slot, subject: SubjectId, teacher: TeacherId) {
        if let Some(cells) = self.cells.get_mut(class.index()) {
            if let Some((previous, _)) = cells.insert(slot, (subject, teacher)) {
                if let Some(count) = self.counts.get_mut(&(class, previous)) {
                    *count = count.saturating_sub(1);
                }
            }
            *self.counts.entry((class, subject)).or_insert(0) += 1;
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SlotBookings {
    busy_teachers: HashSet<TeacherId>,
    resource_holders: HashMap<SubjectId, ClassId>,
}

/// Who is busy where, and which class holds each shared resource.
#[derive(Debug, Clone, Default)]
pub struct ConflictLedger {
    slots: HashMap<Slot, SlotBookings>,
}

impl ConflictLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `teacher` teaches anyone at (`day`, `period`).
    pub fn is_teacher_busy(&self, teacher: TeacherId, day: Weekday, period: Period) -> bool {
        self.slots
            .get(&(day, period))
            .is_some_and(|s| s.busy_teachers.contains(&teacher))
    }

    /// Class holding `subject`'s resource at (`day`, `period`).
    pub fn resource_holder(
        &self,
        subject: SubjectId,
        day: Weekday,
        period: Period,
    ) -> Option<ClassId> {
        self.slots
            .get(&(day, period))
            .and_then(|s| s.resource_holders.get(&subject))
            .copied()
    }

    /// Marks a teacher busy. Returns `false` if already busy.
    fn book_teacher(&mut self, teacher: TeacherId, day: Weekday, period: Period) -> bool {
        self.slots
            .entry((day, period))
            .or_default()
            .busy_teachers
            .insert(teacher)
    }

    fn claim_resource(&mut self, subject: SubjectId, class: ClassId, day: Weekday, period: Period) {
        self.slots
            .entry((day, period))
            .or_default()
            .resource_holders
            .insert(subject, class);
    }
}

/// Running load of one teacher.
#[derive(Debug, Clone, Default)]
pub struct TeacherLoad {
    /// Weekly periods the roster asks of the teacher.
    pub required: u32,
    /// Periods scheduled, indexed by [`Weekday::index`].
    pub per_day: [u32; 7],
}

impl TeacherLoad {
    /// Periods scheduled on `day`.
    #[inline]
    pub fn on(&self, day: Weekday) -> u32 {
        self.per_day[day.index()]
    }

    /// Periods scheduled over the week.
    pub fn total(&self) -> u32 {
        self.per_day.iter().sum()
    }
}

/// Per-teacher scheduled counts.
#[derive(Debug, Clone, Default)]
pub struct LoadTracker {
    loads: Vec<TeacherLoad>,
}

impl LoadTracker {
    /// Seeds the tracker with each teacher's required total.
    pub fn new(problem: &Problem) -> Self {
        let loads = (0..problem.teacher_count() as u32)
            .map(|t| TeacherLoad {
                required: problem
                    .teacher(TeacherId(t))
                    .map_or(0, |info| info.required_periods),
                per_day: [0; 7],
            })
            .collect();
        Self { loads }
    }

    /// Load of a teacher, `None` if unknown.
    pub fn get(&self, teacher: TeacherId) -> Option<&TeacherLoad> {
        self.loads.get(teacher.index())
    }

    /// Whether the teacher is tracked.
    pub fn contains(&self, teacher: TeacherId) -> bool {
        teacher.index() < self.loads.len()
    }

    /// Periods scheduled for `teacher` on `day` (0 if unknown).
    pub fn scheduled_on(&self, teacher: TeacherId, day: Weekday) -> u32 {
        self.get(teacher).map_or(0, |l| l.on(day))
    }

    /// Iterates `(teacher, load)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (TeacherId, &TeacherLoad)> {
        self.loads
            .iter()
            .enumerate()
            .map(|(i, l)| (TeacherId(i as u32), l))
    }

    fn increment(&mut self, teacher: TeacherId, day: Weekday) {
        if let Some(load) = self.loads.get_mut(teacher.index()) {
            load.per_day[day.index()] += 1;
        }
    }
}

/// Everything a run mutates.
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Class placements.
    pub grid: ClassGrid,
    /// Slot conflicts.
    pub conflicts: ConflictLedger,
    /// Teacher loads.
    pub loads: LoadTracker,
    /// Abandoned demand, append-only.
    pub unplaced: Vec<Unplaced>,
}

impl EngineState {
    /// Fresh state for a run over `problem`.
    pub fn new(problem: &Problem) -> Self {
        Self {
            grid: ClassGrid::new(problem.class_count()),
            conflicts: ConflictLedger::new(),
            loads: LoadTracker::new(problem),
            unplaced: Vec::new(),
        }
    }

    /// Records one booking in all three structures.
    ///
    /// A teacher already busy in the slot (a joint session) is not
    /// counted twice towards the daily load.
    pub(crate) fn record(
        &mut self,
        class: ClassId,
        subject: SubjectId,
        teacher: TeacherId,
        day: Weekday,
        period: Period,
        resource_exclusive: bool,
    ) {
        self.grid.insert(class, (day, period), subject, teacher);
        if self.conflicts.book_teacher(teacher, day, period) {
            self.loads.increment(teacher, day);
        }
        if resource_exclusive {
            self.conflicts.claim_resource(subject, class, day, period);
        }
    }

    /// Appends to the unplaced log.
    pub(crate) fn log_unplaced(&mut self, entry: Unplaced) {
        self.unplaced.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MON: Weekday = Weekday::Monday;

    #[test]
    fn test_grid_counts_and_lookup() {
        let mut grid = ClassGrid::new(2);
        grid.insert(ClassId(0), (MON, Period(1)), SubjectId(3), TeacherId(1));
        grid.insert(ClassId(0), (MON, Period(2)), SubjectId(3), TeacherId(1));

        assert!(grid.is_booked(ClassId(0), MON, Period(1)));
        assert!(!grid.is_booked(ClassId(1), MON, Period(1)));
        assert_eq!(grid.get(ClassId(0), MON, Period(2)), Some((SubjectId(3), TeacherId(1))));
        assert_eq!(grid.scheduled(ClassId(0), SubjectId(3)), 2);
        assert_eq!(grid.scheduled(ClassId(1), SubjectId(3)), 0);
        assert_eq!(grid.entries(ClassId(0)).count(), 2);
    }

    #[test]
    fn test_grid_rebooking_a_cell_counts_once() {
        let mut grid = ClassGrid::new(1);
        grid.insert(ClassId(0), (MON, Period(1)), SubjectId(3), TeacherId(1));
        grid.insert(ClassId(0), (MON, Period(1)), SubjectId(3), TeacherId(1));
        assert_eq!(grid.scheduled(ClassId(0), SubjectId(3)), 1);

        grid.insert(ClassId(0), (MON, Period(1)), SubjectId(4), TeacherId(2));
        assert_eq!(grid.scheduled(ClassId(0), SubjectId(3)), 0);
        assert_eq!(grid.scheduled(ClassId(0), SubjectId(4)), 1);
    }

    #[test]
    fn test_grid_ignores_unknown_class() {
        let mut grid = ClassGrid::new(1);
        grid.insert(ClassId(5), (MON, Period(1)), SubjectId(0), TeacherId(0));
        assert_eq!(grid.scheduled(ClassId(5), SubjectId(0)), 0);
        assert!(!grid.is_booked(ClassId(5), MON, Period(1)));
    }

    #[test]
    fn test_ledger_teacher_booking() {
        let mut ledger = ConflictLedger::new();
        assert!(!ledger.is_teacher_busy(TeacherId(0), MON, Period(1)));
        assert!(ledger.book_teacher(TeacherId(0), MON, Period(1)));
        assert!(!ledger.book_teacher(TeacherId(0), MON, Period(1)));
        assert!(ledger.is_teacher_busy(TeacherId(0), MON, Period(1)));
        assert!(!ledger.is_teacher_busy(TeacherId(0), MON, Period(2)));
    }

    #[test]
    fn test_ledger_resource_holder() {
        let mut ledger = ConflictLedger::new();
        ledger.claim_resource(SubjectId(2), ClassId(4), MON, Period(3));
        assert_eq!(ledger.resource_holder(SubjectId(2), MON, Period(3)), Some(ClassId(4)));
        assert_eq!(ledger.resource_holder(SubjectId(1), MON, Period(3)), None);
        assert_eq!(ledger.resource_holder(SubjectId(2), MON, Period(4)), None);
    }

    #[test]
    fn test_teacher_load_counts() {
        let mut tracker = LoadTracker {
            loads: vec![TeacherLoad::default(); 2],
        };
        tracker.increment(TeacherId(1), Weekday::Tuesday);
        tracker.increment(TeacherId(1), Weekday::Tuesday);
        tracker.increment(TeacherId(7), Weekday::Tuesday);

        assert_eq!(tracker.scheduled_on(TeacherId(1), Weekday::Tuesday), 2);
        assert_eq!(tracker.scheduled_on(TeacherId(1), MON), 0);
        assert_eq!(tracker.get(TeacherId(1)).unwrap().total(), 2);
        assert!(tracker.contains(TeacherId(1)));
        assert!(!tracker.contains(TeacherId(7)));
    }
}
