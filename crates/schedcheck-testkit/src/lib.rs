//! `schedcheck-testkit` — conformance harness for schedcheck
//! [`Scheduler`](schedcheck_core::Scheduler) backends.
//!
//! # Overview
//!
//! Any backend implementing the `schedcheck-core` capability can be driven
//! through the fixed scenario battery in [`conformance`]. Most real
//! backends converge asynchronously — they acknowledge a request before the
//! change is observable in `list` — so every assertion about backend state
//! goes through [`poll::eventually`], which re-fetches state on a fixed
//! interval until a predicate holds or the attempt budget runs out.
//!
//! Schedules a scenario creates are recorded by
//! [`tracking::TrackingScheduler`] and unconditionally drained afterward,
//! so a failing assertion never leaks state into the next run against a
//! live shared backend.
//!
//! [`memory::InMemoryScheduler`] is a reference backend with a configurable
//! visibility lag, useful for exercising the harness itself and for backend
//! authors who want a conforming example to compare against.

pub mod conformance;
pub mod memory;
pub mod poll;
pub mod resolver;
pub mod timeout;
pub mod tracking;

pub use conformance::{ConformanceHarness, ConformanceOptions, Scenario};
pub use memory::InMemoryScheduler;
pub use poll::{eventually, PollOutcome};
pub use resolver::CoordinateResolver;
pub use timeout::Timeout;
pub use tracking::TrackingScheduler;

/// Initialize `tracing` output for a test binary.
///
/// Filtered through `RUST_LOG`; safe to call from every test, repeat calls
/// are ignored.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
