use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ScheduleInfo, ScheduleRequest};

/// Capability implemented by every scheduler backend.
///
/// Implementations must fail fast on request-level errors: a `schedule`
/// under an already-registered name or an `unschedule` of an unknown name
/// is rejected synchronously, never turned into a silent update or no-op.
/// Visibility of *successful* operations may lag — a `list` right after a
/// successful `schedule` is allowed to miss the new entry until the backend
/// converges. Implementations never retry internally; callers that need to
/// observe convergence poll the `list` operations themselves.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Register `request` for recurring execution.
    ///
    /// A request whose `schedule_name` already exists in the backend is an
    /// error ([`SchedulerError::CreateFailed`]), not an update.
    ///
    /// [`SchedulerError::CreateFailed`]: crate::error::SchedulerError::CreateFailed
    async fn schedule(&self, request: &ScheduleRequest) -> Result<()>;

    /// Remove the schedule registered under `schedule_name`.
    ///
    /// Removing a name the backend does not know is an error
    /// ([`SchedulerError::UnscheduleMissing`]), not a no-op.
    ///
    /// [`SchedulerError::UnscheduleMissing`]: crate::error::SchedulerError::UnscheduleMissing
    async fn unschedule(&self, schedule_name: &str) -> Result<()>;

    /// All schedules currently known to the backend, in backend-defined
    /// order.
    async fn list(&self) -> Result<Vec<ScheduleInfo>>;

    /// The subset of [`list`](Scheduler::list) whose task definition name
    /// matches `task_definition_name` exactly.
    async fn list_for_definition(&self, task_definition_name: &str)
        -> Result<Vec<ScheduleInfo>>;
}
