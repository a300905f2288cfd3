//! `schedcheck-sqlite` — embedded SQLite reference backend for the
//! schedcheck [`Scheduler`](schedcheck_core::Scheduler) capability.
//!
//! Serves two purposes: a worked example of a conforming backend, and a
//! hermetic target for running the conformance battery in CI. Schedules
//! are rows in a `schedules` table; the `cron-expression` scheduler
//! property is validated when the schedule is created (bad input fails the
//! `schedule` call itself, never asynchronously), and `list` reports the
//! resolved next fire time back through `ScheduleInfo::schedule_properties`.
//!
//! All four operations apply synchronously — this backend has no
//! convergence lag.

pub mod backend;
pub mod db;

pub use backend::{SqliteScheduler, NEXT_RUN_KEY};
