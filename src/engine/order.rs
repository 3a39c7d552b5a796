//! Search-order providers.
//!
//! Placement strategies try days, periods and subjects in an order
//! chosen by a [`SearchOrder`]. Production runs shuffle so that no day
//! or subject is systematically favoured; tests inject a seeded or a
//! fixed order to get reproducible timetables.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::problem::SubjectId;
use crate::models::{Period, Weekday};

/// Decides the order in which candidates are tried.
pub trait SearchOrder {
    /// Reorders the days tried for one placement.
    fn shuffle_days(&mut self, days: &mut [Weekday]);

    /// Reorders the periods tried within one day.
    fn shuffle_periods(&mut self, periods: &mut [Period]);

    /// Reorders the subjects of the final scheduling phase.
    fn shuffle_subjects(&mut self, subjects: &mut [SubjectId]);
}

impl<T: SearchOrder + ?Sized> SearchOrder for Box<T> {
    fn shuffle_days(&mut self, days: &mut [Weekday]) {
        (**self).shuffle_days(days);
    }

    fn shuffle_periods(&mut self, periods: &mut [Period]) {
        (**self).shuffle_periods(periods);
    }

    fn shuffle_subjects(&mut self, subjects: &mut [SubjectId]) {
        (**self).shuffle_subjects(subjects);
    }
}

/// Pseudorandom order from a [`StdRng`].
pub struct SeededOrder {
    rng: StdRng,
}

impl SeededOrder {
    /// Reproducible order for a given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Order seeded from OS entropy; varies between runs.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl fmt::Debug for SeededOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededOrder").finish_non_exhaustive()
    }
}

impl SearchOrder for SeededOrder {
    fn shuffle_days(&mut self, days: &mut [Weekday]) {
        days.shuffle(&mut self.rng);
    }

    fn shuffle_periods(&mut self, periods: &mut [Period]) {
        periods.shuffle(&mut self.rng);
    }

    fn shuffle_subjects(&mut self, subjects: &mut [SubjectId]) {
        subjects.shuffle(&mut self.rng);
    }
}

/// Leaves every sequence in its given order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOrder;

impl SearchOrder for FixedOrder {
    fn shuffle_days(&mut self, _days: &mut [Weekday]) {}

    fn shuffle_periods(&mut self, _periods: &mut [Period]) {}

    fn shuffle_subjects(&mut self, _subjects: &mut [SubjectId]) {}
}
