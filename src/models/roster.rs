//! School roster model.
//!
//! Classes, the division each class belongs to, which teacher teaches
//! which subject to which class, and how many periods per week every
//! subject needs in each division.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A group of class-years sharing one calendar template and one
/// subject/period-count table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Division {
    /// Years 1–3.
    LowerPrimary,
    /// Years 4–6.
    UpperPrimary,
    /// Everything else.
    LowerSecondary,
}

impl Division {
    /// Derives the division from the leading number of a class name.
    ///
    /// `"2B"` → lower primary, `"5 Blue"` → upper primary, `"7A"` or a
    /// name without a leading number → lower secondary.
    pub fn from_class_name(name: &str) -> Self {
        let digits: String = name
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        match digits.parse::<u32>() {
            Ok(1..=3) => Division::LowerPrimary,
            Ok(4..=6) => Division::UpperPrimary,
            _ => Division::LowerSecondary,
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Division::LowerPrimary => "lower-primary",
            Division::UpperPrimary => "upper-primary",
            Division::LowerSecondary => "lower-secondary",
        };
        f.write_str(name)
    }
}

/// A class (homeroom group) and its teacher assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolClass {
    /// Unique class name (e.g. "4A").
    pub name: String,
    /// Division, derived from the name unless overridden.
    pub division: Division,
    /// Assigned teacher per subject.
    pub teachers: BTreeMap<String, String>,
}

impl SchoolClass {
    /// Creates a class, deriving its division from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let division = Division::from_class_name(&name);
        Self {
            name,
            division,
            teachers: BTreeMap::new(),
        }
    }

    /// Overrides the derived division.
    pub fn with_division(mut self, division: Division) -> Self {
        self.division = division;
        self
    }

    /// Assigns a teacher to a subject.
    pub fn with_teacher(mut self, subject: impl Into<String>, teacher: impl Into<String>) -> Self {
        self.teachers.insert(subject.into(), teacher.into());
        self
    }
}

/// All classes and per-division weekly period requirements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Classes in processing order.
    pub classes: Vec<SchoolClass>,
    /// Periods per week: division → subject → count.
    pub requirements: BTreeMap<Division, BTreeMap<String, u32>>,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class.
    pub fn with_class(mut self, class: SchoolClass) -> Self {
        self.classes.push(class);
        self
    }

    /// Sets the weekly period count of a subject for a division.
    pub fn with_requirement(
        mut self,
        division: Division,
        subject: impl Into<String>,
        periods: u32,
    ) -> Self {
        self.requirements
            .entry(division)
            .or_default()
            .insert(subject.into(), periods);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_from_class_name() {
        assert_eq!(Division::from_class_name("1A"), Division::LowerPrimary);
        assert_eq!(Division::from_class_name("3 Green"), Division::LowerPrimary);
        assert_eq!(Division::from_class_name("4B"), Division::UpperPrimary);
        assert_eq!(Division::from_class_name(" 6C"), Division::UpperPrimary);
        assert_eq!(Division::from_class_name("7A"), Division::LowerSecondary);
        assert_eq!(Division::from_class_name("12"), Division::LowerSecondary);
        assert_eq!(Division::from_class_name("0X"), Division::LowerSecondary);
        assert_eq!(Division::from_class_name("Remedial"), Division::LowerSecondary);
    }

    #[test]
    fn test_class_builder() {
        let c = SchoolClass::new("5A")
            .with_teacher("Math", "Ms. Ito")
            .with_teacher("Art", "Mr. Vale");

        assert_eq!(c.division, Division::UpperPrimary);
        assert_eq!(c.teachers["Math"], "Ms. Ito");
        assert!(!c.teachers.contains_key("Music"));

        let c = c.with_division(Division::LowerSecondary);
        assert_eq!(c.division, Division::LowerSecondary);
    }

    #[test]
    fn test_roster_requirements() {
        let roster = Roster::new()
            .with_class(SchoolClass::new("2A"))
            .with_requirement(Division::LowerPrimary, "Math", 5)
            .with_requirement(Division::LowerPrimary, "Art", 2)
            .with_requirement(Division::UpperPrimary, "Math", 6);

        assert_eq!(roster.requirements[&Division::LowerPrimary]["Math"], 5);
        assert_eq!(roster.requirements[&Division::UpperPrimary]["Math"], 6);
        assert!(!roster.requirements[&Division::UpperPrimary].contains_key("Art"));
        assert_eq!(roster.classes.len(), 1);
    }
}
