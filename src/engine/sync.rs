//! Synchronized group placement.
//!
//! Places the same subject for several classes in the same slots,
//! taught jointly by the teacher assigned to the group's first class.
//! The first class also supplies the slot template; members are
//! expected to share a division.
//!
//! A block is a contiguous run of 1 or 2 periods. It commits only if
//! every member passes validation at every period of the window, so a
//! group is never left half-booked.

use tracing::{debug, warn};

use super::ledger::EngineState;
use super::order::SearchOrder;
use super::problem::{Problem, ResolvedGroup, TeacherId};
use super::validator::{check_block, commit_block, Booking};
use crate::models::{Period, Weekday};

/// Outcome of one synchronized placement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The block was committed for every member.
    Placed,
    /// No allowed day had a window valid for every member.
    NoCommonSlot,
    /// The first member has no teacher for the subject.
    NoTeacher,
}

/// Teacher shared by a group: the first member's assignment.
pub fn group_teacher(problem: &Problem, group: &ResolvedGroup) -> Option<TeacherId> {
    let first = *group.classes.first()?;
    problem.class(first).teacher_for(group.subject)
}

/// Places one block of `length` consecutive periods for every member.
pub fn place_synchronized(
    problem: &Problem,
    state: &mut EngineState,
    order: &mut dyn SearchOrder,
    group: &ResolvedGroup,
    length: usize,
) -> SyncOutcome {
    let Some(teacher) = group_teacher(problem, group) else {
        warn!(
            group = %group.label,
            subject = problem.subject_name(group.subject),
            "sync group has no teacher"
        );
        return SyncOutcome::NoTeacher;
    };
    let Some(&first) = group.classes.first() else {
        return SyncOutcome::NoTeacher;
    };

    let mut days: Vec<Weekday> = problem
        .days()
        .iter()
        .copied()
        .filter(|&d| problem.teacher_available(teacher, d))
        .collect();
    order.shuffle_days(&mut days);

    for day in days {
        let slots = problem.available_slots(first, day);
        for window in contiguous_windows(&slots, length) {
            let bookings: Vec<Booking> = group
                .classes
                .iter()
                .flat_map(|&class| {
                    window.iter().map(move |&period| Booking {
                        class,
                        subject: group.subject,
                        teacher,
                        day,
                        period,
                    })
                })
                .collect();
            if check_block(problem, state, &bookings).is_ok() {
                commit_block(problem, state, &bookings);
                debug!(
                    group = %group.label,
                    subject = problem.subject_name(group.subject),
                    day = %day,
                    start = %window[0],
                    length,
                    "synchronized block placed"
                );
                return SyncOutcome::Placed;
            }
        }
    }
    SyncOutcome::NoCommonSlot
}

/// Runs of `length` consecutive period identifiers within `slots`.
fn contiguous_windows(slots: &[Period], length: usize) -> Vec<&[Period]> {
    if length == 0 {
        return Vec::new();
    }
    slots
        .windows(length)
        .filter(|w| w.windows(2).all(|pair| pair[0].is_followed_by(pair[1])))
        .collect()
}
