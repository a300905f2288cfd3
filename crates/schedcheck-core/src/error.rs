use thiserror::Error;

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by [`Scheduler`](crate::scheduler::Scheduler) implementations.
///
/// Request-level failures (duplicate name, unknown name, bad input) must be
/// raised synchronously from the offending call and are never retried by the
/// capability itself. Only *visibility* of successful operations is allowed
/// to lag behind; waiting that lag out is the caller's job, not the
/// backend's.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// `schedule` failed, including the duplicate-name case.
    #[error("Failed to create schedule {name}")]
    CreateFailed {
        name: String,
        #[source]
        source: Option<Cause>,
    },

    /// `unschedule` was called for a name the backend does not know.
    #[error("Failed to unschedule, schedule {name} does not exist.")]
    UnscheduleMissing { name: String },

    /// `unschedule` failed for a reason other than a missing schedule.
    #[error("Failed to unschedule schedule {name}")]
    UnscheduleFailed {
        name: String,
        #[source]
        source: Option<Cause>,
    },

    /// Any other backend failure (list generation, internal errors).
    #[error("{message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Cause>,
    },
}

impl SchedulerError {
    pub fn create_failed(name: impl Into<String>) -> Self {
        Self::CreateFailed {
            name: name.into(),
            source: None,
        }
    }

    pub fn create_failed_with(name: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::CreateFailed {
            name: name.into(),
            source: Some(source.into()),
        }
    }

    pub fn unschedule_missing(name: impl Into<String>) -> Self {
        Self::UnscheduleMissing { name: name.into() }
    }

    pub fn unschedule_failed(name: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::UnscheduleFailed {
            name: name.into(),
            source: Some(source.into()),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    pub fn backend_with(message: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::Backend {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
