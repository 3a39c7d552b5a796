//! Resolved scheduling problem.
//!
//! Class, subject and teacher names are interned once per run into
//! dense `u32` identifiers so every lookup in the hot placement loop is
//! an index into a vector rather than a string-keyed map.
//!
//! Resolution never fails. Dangling references (a sync group naming an
//! unknown class, a class without a teacher for a subject) are kept out
//! of the resolved problem, and the affected demand is skipped later.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::TimetableRequest;
use crate::models::{
    Availability, Calendar, Division, DoublePeriodRule, Period, SyncGroup, Weekday,
};

/// Index of a class in the resolved problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

/// Index of a subject in the resolved problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectId(pub u32);

/// Index of a teacher in the resolved problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeacherId(pub u32);

impl ClassId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl SubjectId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl TeacherId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Name ↔ dense index table.
#[derive(Debug, Clone, Default)]
struct Interner {
    names: Vec<String>,
    index: HashMap<String, u32>,
}

impl Interner {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    fn get(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    fn name(&self, id: u32) -> &str {
        &self.names[id as usize]
    }

    fn len(&self) -> usize {
        self.names.len()
    }
}

/// A class after resolution.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    /// Class name.
    pub name: String,
    /// Division of the class.
    pub division: Division,
    teachers: HashMap<SubjectId, TeacherId>,
}

impl ClassInfo {
    /// Teacher assigned to a subject for this class.
    pub fn teacher_for(&self, subject: SubjectId) -> Option<TeacherId> {
        self.teachers.get(&subject).copied()
    }
}

/// A synchronized group after resolution.
#[derive(Debug, Clone)]
pub struct ResolvedGroup {
    /// Report label (member names joined with `+`).
    pub label: String,
    /// Jointly taught subject.
    pub subject: SubjectId,
    /// Members, first member first.
    pub classes: Vec<ClassId>,
}

/// Per-teacher facts fixed for the run.
#[derive(Debug, Clone)]
pub struct TeacherInfo {
    /// Applicable daily limit.
    pub daily_limit: u32,
    /// Total weekly periods the roster asks of this teacher.
    pub required_periods: u32,
    /// Availability rule, if any.
    pub availability: Option<Availability>,
}

/// Everything the engine reads during a run, resolved to identifiers.
#[derive(Debug, Clone)]
pub struct Problem {
    calendar: Calendar,
    classes: Vec<ClassInfo>,
    subjects: Interner,
    teachers: Interner,
    teacher_info: Vec<TeacherInfo>,
    subject_days: Vec<Option<Vec<Weekday>>>,
    resource_exclusive: Vec<bool>,
    requirements: HashMap<(Division, SubjectId), u32>,
    double_rules: HashMap<(Division, SubjectId), DoublePeriodRule>,
    groups: Vec<ResolvedGroup>,
}

impl Problem {
    /// Resolves a request into an indexed problem.
    pub fn new(request: &TimetableRequest) -> Self {
        let roster = &request.roster;
        let constraints = &request.constraints;

        let mut subjects = Interner::default();
        let mut teachers = Interner::default();

        // Subjects in a stable order: requirements first, then anything
        // only mentioned by assignments or constraints.
        for table in roster.requirements.values() {
            for subject in table.keys() {
                subjects.intern(subject);
            }
        }

        let mut classes = Vec::with_capacity(roster.classes.len());
        let mut class_index: HashMap<&str, ClassId> = HashMap::new();
        for class in &roster.classes {
            if class_index.contains_key(class.name.as_str()) {
                warn!(class = %class.name, "duplicate class name, keeping the first");
                continue;
            }
            let mut assigned = HashMap::new();
            for (subject, teacher) in &class.teachers {
                let s = SubjectId(subjects.intern(subject));
                let t = TeacherId(teachers.intern(teacher));
                assigned.insert(s, t);
            }
            class_index.insert(class.name.as_str(), ClassId(classes.len() as u32));
            classes.push(ClassInfo {
                name: class.name.clone(),
                division: class.division,
                teachers: assigned,
            });
        }

        for subject in constraints.subject_days.keys() {
            subjects.intern(subject);
        }
        for subject in &constraints.resource_subjects {
            subjects.intern(subject);
        }
        for group in &constraints.sync_groups {
            subjects.intern(&group.subject);
        }
        for table in constraints.double_periods.values() {
            for subject in table.keys() {
                subjects.intern(subject);
            }
        }

        let mut requirements = HashMap::new();
        for (&division, table) in &roster.requirements {
            for (subject, &periods) in table {
                if let Some(s) = subjects.get(subject) {
                    requirements.insert((division, SubjectId(s)), periods);
                }
            }
        }

        let mut double_rules = HashMap::new();
        for (&division, table) in &constraints.double_periods {
            for (subject, rule) in table {
                if let Some(s) = subjects.get(subject) {
                    double_rules.insert((division, SubjectId(s)), rule.clone());
                }
            }
        }

        let mut claimed = HashSet::new();
        let groups: Vec<ResolvedGroup> = constraints
            .sync_groups
            .iter()
            .filter_map(|group| resolve_group(group, &class_index, &subjects, &mut claimed))
            .collect();

        // Each group's requirement counts once for its shared teacher.
        let mut required_by_teacher = vec![0u32; teachers.len()];
        for (c, class) in classes.iter().enumerate() {
            for (&subject, &teacher) in &class.teachers {
                if claimed.contains(&(ClassId(c as u32), subject)) {
                    continue;
                }
                if let Some(&periods) = requirements.get(&(class.division, subject)) {
                    required_by_teacher[teacher.index()] += periods;
                }
            }
        }
        for group in &groups {
            let Some(&first) = group.classes.first() else {
                continue;
            };
            let info = &classes[first.index()];
            if let (Some(teacher), Some(&periods)) = (
                info.teacher_for(group.subject),
                requirements.get(&(info.division, group.subject)),
            ) {
                required_by_teacher[teacher.index()] += periods;
            }
        }

        let teacher_info = (0..teachers.len())
            .map(|i| {
                let name = teachers.name(i as u32);
                TeacherInfo {
                    daily_limit: constraints.workload.limit_for(name),
                    required_periods: required_by_teacher[i],
                    availability: constraints.teacher_availability.get(name).cloned(),
                }
            })
            .collect();

        let mut subject_days = vec![None; subjects.len()];
        for (subject, days) in &constraints.subject_days {
            if let Some(s) = subjects.get(subject) {
                let in_week = request
                    .calendar
                    .days
                    .iter()
                    .copied()
                    .filter(|d| days.contains(d))
                    .collect();
                subject_days[s as usize] = Some(in_week);
            }
        }

        let mut resource_exclusive = vec![false; subjects.len()];
        for subject in &constraints.resource_subjects {
            if let Some(s) = subjects.get(subject) {
                resource_exclusive[s as usize] = true;
            }
        }

        Self {
            calendar: request.calendar.clone(),
            classes,
            subjects,
            teachers,
            teacher_info,
            subject_days,
            resource_exclusive,
            requirements,
            double_rules,
            groups,
        }
    }

    /// The weekly calendar.
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// School days in week order.
    pub fn days(&self) -> &[Weekday] {
        &self.calendar.days
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// All class ids in roster order.
    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.classes.len() as u32).map(ClassId)
    }

    /// Resolved class.
    pub fn class(&self, class: ClassId) -> &ClassInfo {
        &self.classes[class.index()]
    }

    /// Looks up a class by name.
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.classes
            .iter()
            .position(|c| c.name == name)
            .map(|i| ClassId(i as u32))
    }

    /// Number of subjects.
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// All subject ids in resolution order.
    pub fn subject_ids(&self) -> impl Iterator<Item = SubjectId> {
        (0..self.subjects.len() as u32).map(SubjectId)
    }

    /// Looks up a subject by name.
    pub fn subject_id(&self, name: &str) -> Option<SubjectId> {
        self.subjects.get(name).map(SubjectId)
    }

    /// Subject name.
    pub fn subject_name(&self, subject: SubjectId) -> &str {
        self.subjects.name(subject.0)
    }

    /// Number of teachers known to the roster.
    pub fn teacher_count(&self) -> usize {
        self.teachers.len()
    }

    /// Looks up a teacher by name.
    pub fn teacher_id(&self, name: &str) -> Option<TeacherId> {
        self.teachers.get(name).map(TeacherId)
    }

    /// Teacher name.
    pub fn teacher_name(&self, teacher: TeacherId) -> &str {
        self.teachers.name(teacher.0)
    }

    /// Per-teacher facts, `None` for an id outside the roster.
    pub fn teacher(&self, teacher: TeacherId) -> Option<&TeacherInfo> {
        self.teacher_info.get(teacher.index())
    }

    /// Whether the teacher's availability rule permits `day`.
    pub fn teacher_available(&self, teacher: TeacherId, day: Weekday) -> bool {
        self.teacher(teacher)
            .and_then(|t| t.availability.as_ref())
            .map_or(true, |rule| rule.permits(day))
    }

    /// Allowed days of a day-restricted subject.
    pub fn subject_days(&self, subject: SubjectId) -> Option<&[Weekday]> {
        self.subject_days
            .get(subject.index())
            .and_then(|d| d.as_deref())
    }

    /// Whether the subject needs an exclusive shared resource.
    pub fn is_resource_exclusive(&self, subject: SubjectId) -> bool {
        self.resource_exclusive
            .get(subject.index())
            .copied()
            .unwrap_or(false)
    }

    /// Weekly periods a class needs for a subject.
    pub fn required_periods(&self, class: ClassId, subject: SubjectId) -> Option<u32> {
        let division = self.class(class).division;
        self.requirements.get(&(division, subject)).copied()
    }

    /// Double-period rule for a class's division and subject.
    pub fn double_rule(&self, class: ClassId, subject: SubjectId) -> Option<&DoublePeriodRule> {
        let division = self.class(class).division;
        self.double_rules.get(&(division, subject))
    }

    /// Resolved synchronized groups.
    pub fn groups(&self) -> &[ResolvedGroup] {
        &self.groups
    }

    /// Whether a class's subject is taught through a synchronized group.
    pub fn is_synchronized(&self, class: ClassId, subject: SubjectId) -> bool {
        self.groups
            .iter()
            .any(|g| g.subject == subject && g.classes.contains(&class))
    }

    /// Slot Calendar: periods usable by `class` on `day`.
    pub fn available_slots(&self, class: ClassId, day: Weekday) -> Vec<Period> {
        self.calendar
            .available_periods(self.class(class).division, day)
    }

    /// Whether a special event blocks `period` on `day` for `class`.
    pub fn is_blocked(&self, class: ClassId, day: Weekday, period: Period) -> bool {
        self.calendar
            .is_blocked(day, self.class(class).division, period)
    }

    /// Whether `period` is the break or lunch of `class`'s division.
    pub fn is_pause(&self, class: ClassId, period: Period) -> bool {
        self.calendar
            .division(self.class(class).division)
            .is_some_and(|d| d.is_pause(period))
    }
}

/// Resolves a group's members, dropping unknown names and repeats.
///
/// A group that shares a (class, subject) pair with an earlier group is
/// dropped whole; its classes are then scheduled one by one.
fn resolve_group(
    group: &SyncGroup,
    class_index: &HashMap<&str, ClassId>,
    subjects: &Interner,
    claimed: &mut HashSet<(ClassId, SubjectId)>,
) -> Option<ResolvedGroup> {
    let subject = SubjectId(subjects.get(&group.subject)?);
    let mut classes: Vec<ClassId> = Vec::with_capacity(group.classes.len());
    for name in &group.classes {
        match class_index.get(name.as_str()).copied() {
            None => {
                warn!(class = %name, subject = %group.subject, "sync group member not in roster");
            }
            Some(id) if classes.contains(&id) => {
                warn!(class = %name, subject = %group.subject, "sync group member listed twice");
            }
            Some(id) => classes.push(id),
        }
    }
    if classes.is_empty() {
        warn!(group = %group.label(), "sync group has no known classes, skipping");
        return None;
    }
    if classes.iter().any(|&c| claimed.contains(&(c, subject))) {
        warn!(
            group = %group.label(),
            subject = %group.subject,
            "class already synchronized for this subject by another group, skipping"
        );
        return None;
    }
    claimed.extend(classes.iter().map(|&c| (c, subject)));
    Some(ResolvedGroup {
        label: group.label(),
        subject,
        classes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Availability, ConstraintConfig, DivisionCalendar, Roster, SchoolClass, SyncGroup,
        WorkloadLimits,
    };

    fn sample_request() -> TimetableRequest {
        let roster = Roster::new()
            .with_class(
                SchoolClass::new("4A")
                    .with_teacher("Math", "Ito")
                    .with_teacher("PE", "Kade"),
            )
            .with_class(
                SchoolClass::new("4B")
                    .with_teacher("Math", "Ito")
                    .with_teacher("PE", "Kade"),
            )
            .with_requirement(Division::UpperPrimary, "Math", 5)
            .with_requirement(Division::UpperPrimary, "PE", 2);
        let calendar = Calendar::workweek()
            .with_division(Division::UpperPrimary, DivisionCalendar::new(1..=6).with_break(3));
        let constraints = ConstraintConfig::new()
            .with_workload(WorkloadLimits::new(4).with_elevated("Ito", 6))
            .with_availability("Kade", Availability::except([Weekday::Friday]))
            .with_subject_days("Swimming", [Weekday::Monday])
            .with_resource_subject("Science")
            .with_sync_group(SyncGroup::new(
                "PE",
                vec!["4A".into(), "4B".into(), "9Z".into()],
            ));
        TimetableRequest::new(roster, calendar, constraints)
    }

    #[test]
    fn test_ids_resolve_both_ways() {
        let p = Problem::new(&sample_request());
        let math = p.subject_id("Math").unwrap();
        assert_eq!(p.subject_name(math), "Math");
        let ito = p.teacher_id("Ito").unwrap();
        assert_eq!(p.teacher_name(ito), "Ito");
        assert_eq!(p.class_count(), 2);
        assert_eq!(p.class(p.class_id("4B").unwrap()).name, "4B");
        assert!(p.teacher_id("Nobody").is_none());
    }

    #[test]
    fn test_teacher_facts() {
        let p = Problem::new(&sample_request());
        let ito = p.teacher(p.teacher_id("Ito").unwrap()).unwrap();
        assert_eq!(ito.daily_limit, 6);
        assert_eq!(ito.required_periods, 10); // 5 periods × 2 classes

        let kade = p.teacher_id("Kade").unwrap();
        assert_eq!(p.teacher(kade).unwrap().daily_limit, 4);
        // Joint PE for 4A+4B counts once.
        assert_eq!(p.teacher(kade).unwrap().required_periods, 2);
        assert!(p.teacher_available(kade, Weekday::Monday));
        assert!(!p.teacher_available(kade, Weekday::Friday));
        assert!(p.teacher(TeacherId(99)).is_none());
    }

    #[test]
    fn test_constraint_only_subjects_are_interned() {
        let p = Problem::new(&sample_request());
        let swimming = p.subject_id("Swimming").unwrap();
        assert_eq!(p.subject_days(swimming), Some(&[Weekday::Monday][..]));
        let science = p.subject_id("Science").unwrap();
        assert!(p.is_resource_exclusive(science));
        assert!(!p.is_resource_exclusive(p.subject_id("Math").unwrap()));
    }

    #[test]
    fn test_requirements_by_division() {
        let p = Problem::new(&sample_request());
        let class = p.class_id("4A").unwrap();
        assert_eq!(p.required_periods(class, p.subject_id("Math").unwrap()), Some(5));
        assert_eq!(p.required_periods(class, p.subject_id("Swimming").unwrap()), None);
    }

    #[test]
    fn test_group_drops_unknown_members() {
        let p = Problem::new(&sample_request());
        assert_eq!(p.groups().len(), 1);
        let group = &p.groups()[0];
        assert_eq!(group.classes.len(), 2);
        assert_eq!(group.label, "4A+4B+9Z");
        let pe = p.subject_id("PE").unwrap();
        assert!(p.is_synchronized(p.class_id("4A").unwrap(), pe));
        assert!(!p.is_synchronized(
            p.class_id("4A").unwrap(),
            p.subject_id("Math").unwrap()
        ));
    }

    #[test]
    fn test_group_members_listed_twice_are_deduplicated() {
        let mut request = sample_request();
        request.constraints.sync_groups =
            vec![SyncGroup::new("PE", vec!["4A".into(), "4A".into()])];
        let p = Problem::new(&request);
        assert_eq!(p.groups().len(), 1);
        assert_eq!(p.groups()[0].classes, vec![p.class_id("4A").unwrap()]);
    }

    #[test]
    fn test_overlapping_group_is_dropped() {
        let mut request = sample_request();
        request.roster = request
            .roster
            .with_class(SchoolClass::new("4C").with_teacher("PE", "Kade"));
        request.constraints.sync_groups = vec![
            SyncGroup::new("PE", vec!["4A".into(), "4B".into()]),
            SyncGroup::new("PE", vec!["4A".into(), "4C".into()]),
        ];
        let p = Problem::new(&request);
        let pe = p.subject_id("PE").unwrap();

        assert_eq!(p.groups().len(), 1);
        assert_eq!(p.groups()[0].label, "4A+4B");
        assert!(!p.is_synchronized(p.class_id("4C").unwrap(), pe));
        // 4C is taught on its own, so Kade's total is 2 (group) + 2 (4C).
        let kade = p.teacher_id("Kade").unwrap();
        assert_eq!(p.teacher(kade).unwrap().required_periods, 4);
    }

    #[test]
    fn test_slot_helpers() {
        let p = Problem::new(&sample_request());
        let class = p.class_id("4A").unwrap();
        assert_eq!(p.available_slots(class, Weekday::Monday).len(), 6);
        assert!(p.is_pause(class, Period(3)));
        assert!(!p.is_pause(class, Period(4)));
    }
}
