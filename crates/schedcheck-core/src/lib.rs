//! `schedcheck-core` — provider-agnostic contract for cron-style schedule
//! management.
//!
//! # Overview
//!
//! Every concrete scheduler backend (a cron daemon, a cluster-native
//! scheduler, a cloud scheduler service) implements the [`Scheduler`]
//! capability: create a named schedule, remove it, enumerate what the
//! backend currently knows. Backends must agree on request-level semantics
//! — a duplicate name is rejected, removing an unknown name is rejected —
//! but are allowed to apply *successful* operations asynchronously, so a
//! `list` immediately after a `schedule` may not show the new entry yet.
//!
//! This crate holds only the contract: the entities exchanged with a
//! backend, the capability trait, the error taxonomy, and the resource
//! collaborator used to obtain a payload artifact. The conformance harness
//! that verifies a backend against the contract lives in
//! `schedcheck-testkit`.

pub mod error;
pub mod resource;
pub mod scheduler;
pub mod types;

pub use error::{Result, SchedulerError};
pub use resource::{ArtifactCoordinates, ResourceHandle, ResourceResolver};
pub use scheduler::Scheduler;
pub use types::{ScheduleInfo, ScheduleRequest, TaskDefinition, CRON_EXPRESSION_KEY};
