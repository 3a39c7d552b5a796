//! Timetabling constraints.
//!
//! Defines the rules every placed lesson must satisfy: teacher
//! workload limits, teacher availability, subject day restrictions,
//! exclusive shared resources, double-period pairing and
//! synchronized classes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{Division, Weekday};

/// Maximum periods a teacher may teach per day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadLimits {
    /// Standard daily limit.
    pub max_periods_per_day: u32,
    /// Daily limit for teachers in `elevated_teachers`.
    pub elevated_max_periods_per_day: u32,
    /// Teachers allowed the elevated limit.
    #[serde(default)]
    pub elevated_teachers: BTreeSet<String>,
}

impl Default for WorkloadLimits {
    fn default() -> Self {
        Self {
            max_periods_per_day: 6,
            elevated_max_periods_per_day: 7,
            elevated_teachers: BTreeSet::new(),
        }
    }
}

impl WorkloadLimits {
    /// Creates limits with the same value for everyone.
    pub fn new(max_periods_per_day: u32) -> Self {
        Self {
            max_periods_per_day,
            elevated_max_periods_per_day: max_periods_per_day,
            elevated_teachers: BTreeSet::new(),
        }
    }

    /// Grants `teacher` the elevated limit.
    pub fn with_elevated(mut self, teacher: impl Into<String>, limit: u32) -> Self {
        self.elevated_teachers.insert(teacher.into());
        self.elevated_max_periods_per_day = limit;
        self
    }

    /// Daily limit applicable to `teacher`.
    pub fn limit_for(&self, teacher: &str) -> u32 {
        if self.elevated_teachers.contains(teacher) {
            self.elevated_max_periods_per_day
        } else {
            self.max_periods_per_day
        }
    }
}

/// Days a teacher can be scheduled.
///
/// Both lists may be present; they are applied conjunctively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// If set, the teacher works only on these days.
    #[serde(default)]
    pub allowed_days: Option<Vec<Weekday>>,
    /// If set, the teacher never works on these days.
    #[serde(default)]
    pub forbidden_days: Option<Vec<Weekday>>,
}

impl Availability {
    /// Teacher works only on `days`.
    pub fn only(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            allowed_days: Some(days.into_iter().collect()),
            forbidden_days: None,
        }
    }

    /// Teacher never works on `days`.
    pub fn except(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            allowed_days: None,
            forbidden_days: Some(days.into_iter().collect()),
        }
    }

    /// Adds forbidden days to an existing rule.
    pub fn and_except(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.forbidden_days
            .get_or_insert_with(Vec::new)
            .extend(days);
        self
    }

    /// Whether the rule permits `day`.
    pub fn permits(&self, day: Weekday) -> bool {
        if let Some(allowed) = &self.allowed_days {
            if !allowed.contains(&day) {
                return false;
            }
        }
        if let Some(forbidden) = &self.forbidden_days {
            if forbidden.contains(&day) {
                return false;
            }
        }
        true
    }
}

/// Double-period pairing policy for one subject in one division.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoublePeriodRule {
    /// Strict rules get their own scheduling phase before ordinary subjects.
    #[serde(default)]
    pub strict: bool,
    /// Exact number of doubles; `None` pairs as many periods as possible.
    #[serde(default)]
    pub doubles: Option<u32>,
}

impl DoublePeriodRule {
    /// Pair as many periods as possible.
    pub fn paired() -> Self {
        Self::default()
    }

    /// Strict rule with an exact number of doubles.
    pub fn strict(doubles: u32) -> Self {
        Self {
            strict: true,
            doubles: Some(doubles),
        }
    }

    /// Number of double blocks to attempt for `periods_needed`.
    ///
    /// Never more than `periods_needed / 2`.
    pub fn doubles_for(&self, periods_needed: u32) -> u32 {
        let max = periods_needed / 2;
        self.doubles.map_or(max, |d| d.min(max))
    }
}

/// Classes whose lessons of one subject are taught jointly, in the
/// same slot, by one teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncGroup {
    /// Jointly taught subject.
    pub subject: String,
    /// Member class names. The first member supplies the teacher and
    /// the slot template.
    pub classes: Vec<String>,
}

impl SyncGroup {
    /// Creates a group.
    pub fn new(subject: impl Into<String>, classes: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            classes,
        }
    }

    /// Label used in reports, e.g. `"5A+5B"`.
    pub fn label(&self) -> String {
        self.classes.join("+")
    }
}

/// The complete constraint configuration of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstraintConfig {
    /// Teacher workload limits.
    #[serde(default)]
    pub workload: WorkloadLimits,
    /// Availability per teacher.
    #[serde(default)]
    pub teacher_availability: BTreeMap<String, Availability>,
    /// Allowed days per subject.
    #[serde(default)]
    pub subject_days: BTreeMap<String, Vec<Weekday>>,
    /// Subjects needing a facility only one class can use per slot.
    #[serde(default)]
    pub resource_subjects: BTreeSet<String>,
    /// Double-period rules: division → subject → rule.
    #[serde(default)]
    pub double_periods: BTreeMap<Division, BTreeMap<String, DoublePeriodRule>>,
    /// Synchronized class groups.
    #[serde(default)]
    pub sync_groups: Vec<SyncGroup>,
}

impl ConstraintConfig {
    /// Creates an empty configuration with default workload limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the workload limits.
    pub fn with_workload(mut self, workload: WorkloadLimits) -> Self {
        self.workload = workload;
        self
    }

    /// Sets a teacher's availability.
    pub fn with_availability(mut self, teacher: impl Into<String>, rule: Availability) -> Self {
        self.teacher_availability.insert(teacher.into(), rule);
        self
    }

    /// Restricts a subject to certain days.
    pub fn with_subject_days(
        mut self,
        subject: impl Into<String>,
        days: impl IntoIterator<Item = Weekday>,
    ) -> Self {
        self.subject_days
            .insert(subject.into(), days.into_iter().collect());
        self
    }

    /// Marks a subject as needing an exclusive shared resource.
    pub fn with_resource_subject(mut self, subject: impl Into<String>) -> Self {
        self.resource_subjects.insert(subject.into());
        self
    }

    /// Adds a double-period rule.
    pub fn with_double_periods(
        mut self,
        division: Division,
        subject: impl Into<String>,
        rule: DoublePeriodRule,
    ) -> Self {
        self.double_periods
            .entry(division)
            .or_default()
            .insert(subject.into(), rule);
        self
    }

    /// Adds a synchronized group.
    pub fn with_sync_group(mut self, group: SyncGroup) -> Self {
        self.sync_groups.push(group);
        self
    }
}
