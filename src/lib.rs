//! Greedy weekly school timetabling.
//!
//! Builds a class-by-class weekly timetable from a roster, a period
//! calendar and a set of hard constraints, and reports the demand it
//! could not place.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Roster`, `SchoolClass`, `Calendar`,
//!   `SpecialEvent`, `ConstraintConfig`, `SyncGroup`, `Timetable`, `Unplaced`
//! - **`engine`**: Conflict ledgers, placement validator, placement
//!   strategies and the phase orchestrator (`TimetableScheduler`)
//! - **`config`**: TOML-loadable run settings (seed, search order)
//!
//! # Architecture
//!
//! The engine is a greedy, non-backtracking heuristic: phases run in a
//! fixed order and never revisit earlier commitments. Search order is
//! injected through [`engine::SearchOrder`], so runs are reproducible
//! under a seed.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - de Werra (1985), "An introduction to timetabling"

pub mod config;
pub mod engine;
pub mod models;
