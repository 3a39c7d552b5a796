//! Greedy timetable engine.
//!
//! Resolves a [`TimetableRequest`] into an indexed [`Problem`] and fills
//! a weekly grid phase by phase.
//!
//! # Algorithm
//!
//! `TimetableScheduler` runs five fixed phases (restricted subjects,
//! synchronized groups, resource subjects, strict doubles, the rest).
//! Every placement goes through [`can_place`] and [`commit`]; nothing
//! is ever undone. Demand that cannot be placed ends up in the
//! unplaced log of the [`TimetableSolution`].
//!
//! # Workload
//!
//! [`WorkloadSummary`] reports required versus scheduled periods per
//! teacher and day.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod ledger;
mod order;
mod phases;
mod placement;
mod problem;
mod sync;
mod validator;
mod workload;

pub use ledger::{ClassGrid, ConflictLedger, EngineState, LoadTracker, Slot, TeacherLoad};
pub use order::{FixedOrder, SearchOrder, SeededOrder};
pub use phases::{Phase, TimetableRequest, TimetableScheduler, TimetableSolution};
pub use placement::{place_demand, place_double, place_single, Demand};
pub use problem::{ClassId, ClassInfo, Problem, ResolvedGroup, SubjectId, TeacherId, TeacherInfo};
pub use sync::{group_teacher, place_synchronized, SyncOutcome};
pub use validator::{can_place, check_block, commit, commit_block, Booking, Rejection};
pub use workload::{TeacherWorkload, WorkloadSummary};
