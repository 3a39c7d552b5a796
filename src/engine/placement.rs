//! Single and double period placement.
//!
//! # Algorithm
//!
//! 1. If the class's division has a double-period rule for the subject,
//!    attempt `rule.doubles_for(needed)` double blocks first. The first
//!    failed double ends double attempts.
//! 2. Place the remaining periods one at a time. The first period that
//!    cannot be placed is logged as unplaced together with everything
//!    still missing, and the demand is abandoned.
//!
//! A double occupies two adjacent periods, or two periods either side
//! of the division's break or lunch.
//!
//! # Complexity
//! O(d · p) validations per placed period, d = allowed days,
//! p = periods per day.

use tracing::debug;

use super::ledger::EngineState;
use super::order::SearchOrder;
use super::problem::{ClassId, Problem, SubjectId, TeacherId};
use super::validator::{can_place, check_block, commit, commit_block, Booking};
use crate::models::{Period, Unplaced, UnplacedReason, Weekday};

/// Periods still owed to one class for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Demand {
    pub class: ClassId,
    pub subject: SubjectId,
    pub teacher: TeacherId,
    pub periods_needed: u32,
}

impl Demand {
    fn booking(&self, day: Weekday, period: Period) -> Booking {
        Booking {
            class: self.class,
            subject: self.subject,
            teacher: self.teacher,
            day,
            period,
        }
    }
}

/// Places as much of `demand` as possible on `days`.
///
/// Returns the number of periods placed. Anything left over is
/// appended to the unplaced log.
pub fn place_demand(
    problem: &Problem,
    state: &mut EngineState,
    order: &mut dyn SearchOrder,
    demand: Demand,
    days: &[Weekday],
) -> u32 {
    let mut remaining = demand.periods_needed;

    if let Some(rule) = problem.double_rule(demand.class, demand.subject) {
        let doubles = rule.doubles_for(remaining);
        for attempt in 0..doubles {
            if place_double(problem, state, order, &demand, days) {
                remaining -= 2;
            } else {
                debug!(
                    class = %problem.class(demand.class).name,
                    subject = problem.subject_name(demand.subject),
                    placed_doubles = attempt,
                    "double placement failed, falling back to singles"
                );
                break;
            }
        }
    }

    while remaining > 0 {
        if place_single(problem, state, order, &demand, days) {
            remaining -= 1;
        } else {
            state.log_unplaced(Unplaced {
                label: problem.class(demand.class).name.clone(),
                subject: problem.subject_name(demand.subject).to_string(),
                periods_remaining: remaining,
                reason: UnplacedReason::NoSlot,
            });
            break;
        }
    }

    demand.periods_needed - remaining
}

/// Places one period on the first valid slot of a shuffled day order.
pub fn place_single(
    problem: &Problem,
    state: &mut EngineState,
    order: &mut dyn SearchOrder,
    demand: &Demand,
    days: &[Weekday],
) -> bool {
    let mut days = days.to_vec();
    order.shuffle_days(&mut days);

    for day in days {
        let mut slots = problem.available_slots(demand.class, day);
        order.shuffle_periods(&mut slots);
        for period in slots {
            let booking = demand.booking(day, period);
            if can_place(problem, state, booking).is_ok() {
                commit(problem, state, booking);
                return true;
            }
        }
    }
    false
}

/// Places one double block.
///
/// Per shuffled day, adjacent pairs are tried before pairs spanning
/// the break or lunch. Days already holding this subject for the class
/// are skipped.
pub fn place_double(
    problem: &Problem,
    state: &mut EngineState,
    order: &mut dyn SearchOrder,
    demand: &Demand,
    days: &[Weekday],
) -> bool {
    let mut days = days.to_vec();
    order.shuffle_days(&mut days);

    for day in days {
        if has_subject_on(state, demand, day) {
            continue;
        }
        let slots = problem.available_slots(demand.class, day);
        let pair = find_adjacent_pair(problem, state, demand, day, &slots)
            .or_else(|| find_break_pair(problem, state, demand, day, &slots));
        if let Some(pair) = pair {
            commit_block(problem, state, &pair);
            debug!(
                class = %problem.class(demand.class).name,
                subject = problem.subject_name(demand.subject),
                day = %day,
                first = %pair[0].period,
                second = %pair[1].period,
                "double placed"
            );
            return true;
        }
    }
    false
}

fn has_subject_on(state: &EngineState, demand: &Demand, day: Weekday) -> bool {
    state
        .grid
        .entries(demand.class)
        .any(|((d, _), subject, _)| d == day && subject == demand.subject)
}

fn find_adjacent_pair(
    problem: &Problem,
    state: &EngineState,
    demand: &Demand,
    day: Weekday,
    slots: &[Period],
) -> Option<[Booking; 2]> {
    slots
        .iter()
        .filter(|p| slots.contains(&p.next()))
        .map(|&p| [demand.booking(day, p), demand.booking(day, p.next())])
        .find(|pair| check_block(problem, state, pair).is_ok())
}

fn find_break_pair(
    problem: &Problem,
    state: &EngineState,
    demand: &Demand,
    day: Weekday,
    slots: &[Period],
) -> Option<[Booking; 2]> {
    slots
        .iter()
        .filter(|p| problem.is_pause(demand.class, p.next()))
        .filter(|p| slots.contains(&p.next().next()))
        .map(|&p| [demand.booking(day, p), demand.booking(day, p.next().next())])
        .find(|pair| check_block(problem, state, pair).is_ok())
}
