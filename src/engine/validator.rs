//! Placement validation and commit.
//!
//! [`can_place`] is a pure predicate over the problem and the current
//! state; [`commit`] is the only way state changes. Every placement
//! strategy validates first and commits only on success.
//!
//! # Check order
//! The first failing check determines the [`Rejection`]:
//!
//! 1. teacher known to the load tracker
//! 2. teacher's daily workload limit
//! 3. special events blocking the slot
//! 4. teacher availability
//! 5. subject day restriction
//! 6. teacher already booked in the slot
//! 7. class already booked in the slot
//! 8. exclusive resource already held

use std::collections::HashMap;

use thiserror::Error;

use super::ledger::EngineState;
use super::problem::{ClassId, Problem, SubjectId, TeacherId};
use crate::models::{Period, Weekday};

/// One lesson at one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub class: ClassId,
    pub subject: SubjectId,
    pub teacher: TeacherId,
    pub day: Weekday,
    pub period: Period,
}

impl Booking {
    /// The same lesson at another period of the same day.
    pub fn at(self, period: Period) -> Self {
        Self { period, ..self }
    }
}

/// Why a booking is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("invalid teacher")]
    UnknownTeacher,
    #[error("teacher workload exceeded")]
    WorkloadExceeded,
    #[error("class slot booked by event")]
    BlockedByEvent,
    #[error("teacher unavailable")]
    TeacherUnavailable,
    #[error("subject restricted on this day")]
    SubjectRestricted,
    #[error("teacher booked")]
    TeacherBooked,
    #[error("class booked")]
    ClassBooked,
    #[error("resource booked")]
    ResourceBooked,
}

/// Checks whether `booking` can be committed.
pub fn can_place(
    problem: &Problem,
    state: &EngineState,
    booking: Booking,
) -> Result<(), Rejection> {
    let Booking {
        class,
        subject,
        teacher,
        day,
        period,
    } = booking;

    let Some(info) = problem.teacher(teacher) else {
        return Err(Rejection::UnknownTeacher);
    };
    if !state.loads.contains(teacher) {
        return Err(Rejection::UnknownTeacher);
    }

    if state.loads.scheduled_on(teacher, day) >= info.daily_limit {
        return Err(Rejection::WorkloadExceeded);
    }

    if problem.is_blocked(class, day, period) {
        return Err(Rejection::BlockedByEvent);
    }

    if !problem.teacher_available(teacher, day) {
        return Err(Rejection::TeacherUnavailable);
    }

    if let Some(days) = problem.subject_days(subject) {
        if !days.contains(&day) {
            return Err(Rejection::SubjectRestricted);
        }
    }

    if state.conflicts.is_teacher_busy(teacher, day, period) {
        return Err(Rejection::TeacherBooked);
    }

    if state.grid.is_booked(class, day, period) {
        return Err(Rejection::ClassBooked);
    }

    if problem.is_resource_exclusive(subject)
        && state
            .conflicts
            .resource_holder(subject, day, period)
            .is_some()
    {
        return Err(Rejection::ResourceBooked);
    }

    Ok(())
}

/// Books a validated lesson.
///
/// Callers must have checked the booking with [`can_place`] (or
/// [`check_block`]); nothing is re-validated here.
pub fn commit(problem: &Problem, state: &mut EngineState, booking: Booking) {
    state.record(
        booking.class,
        booking.subject,
        booking.teacher,
        booking.day,
        booking.period,
        problem.is_resource_exclusive(booking.subject),
    );
}

/// Checks a multi-period or multi-class block as a whole.
///
/// Every booking must pass [`can_place`] on the current state, and each
/// teacher's daily load plus the distinct periods the block adds on
/// that day must stay within the limit. Bookings of one teacher at the
/// same slot (a joint session) count once.
pub fn check_block(
    problem: &Problem,
    state: &EngineState,
    bookings: &[Booking],
) -> Result<(), Rejection> {
    for &booking in bookings {
        can_place(problem, state, booking)?;
    }

    let mut added: HashMap<(TeacherId, Weekday), Vec<Period>> = HashMap::new();
    for b in bookings {
        let periods = added.entry((b.teacher, b.day)).or_default();
        if !periods.contains(&b.period) {
            periods.push(b.period);
        }
    }
    for (&(teacher, day), periods) in &added {
        let limit = problem
            .teacher(teacher)
            .map_or(0, |info| info.daily_limit);
        if state.loads.scheduled_on(teacher, day) + periods.len() as u32 > limit {
            return Err(Rejection::WorkloadExceeded);
        }
    }
    Ok(())
}

/// Commits every booking of a block validated by [`check_block`].
pub fn commit_block(problem: &Problem, state: &mut EngineState, bookings: &[Booking]) {
    for &booking in bookings {
        commit(problem, state, booking);
    }
}
