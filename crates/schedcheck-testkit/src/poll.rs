use std::future::Future;

use schedcheck_core::SchedulerError;
use tokio::time::sleep;
use tracing::debug;

use crate::timeout::Timeout;

/// Outcome of an [`eventually`] wait.
///
/// Tagged rather than panicking so callers can choose to assert, log, or
/// ignore an exhausted wait.
#[derive(Debug)]
pub enum PollOutcome<T> {
    /// The predicate held on attempt `attempts` (1-based).
    Satisfied { attempts: u32, observed: T },
    /// The attempt budget ran out before the predicate held.
    Exhausted {
        attempts: u32,
        /// The final successfully fetched state; `None` when every fetch
        /// errored.
        last_observed: Option<T>,
        /// What was searched for and what was actually found, from the
        /// caller's `describe` function.
        mismatch: String,
    },
}

impl<T> PollOutcome<T> {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, PollOutcome::Satisfied { .. })
    }

    /// The mismatch description, when the wait was exhausted.
    pub fn mismatch(&self) -> Option<&str> {
        match self {
            PollOutcome::Satisfied { .. } => None,
            PollOutcome::Exhausted { mismatch, .. } => Some(mismatch),
        }
    }
}

/// Re-evaluate `predicate` against freshly fetched state until it holds or
/// `timeout` is exhausted.
///
/// Every attempt calls `fetch` again — a stale snapshot would make the wait
/// meaningless against an eventually-consistent backend. Fetch errors are
/// swallowed and count as a failed attempt: the loop waits out visibility
/// lag, and a backend that is still converging may transiently fail a read.
/// `describe` is called once, on final failure, to build the mismatch
/// report from the last observed state.
///
/// The interval is fixed rather than exponential: attempt counts are small,
/// and a bounded, predictable worst case (`max_attempts × pause`) matters
/// more in CI than saved polls.
pub async fn eventually<T, F, Fut, P, D>(
    timeout: Timeout,
    mut fetch: F,
    mut predicate: P,
    describe: D,
) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SchedulerError>>,
    P: FnMut(&T) -> bool,
    D: FnOnce(Option<&T>) -> String,
{
    let max_attempts = timeout.max_attempts.max(1);
    let mut last: Option<T> = None;
    let mut last_error: Option<SchedulerError> = None;

    for attempt in 1..=max_attempts {
        match fetch().await {
            Ok(state) => {
                if predicate(&state) {
                    return PollOutcome::Satisfied {
                        attempts: attempt,
                        observed: state,
                    };
                }
                debug!(attempt, max_attempts, "predicate not yet satisfied");
                last = Some(state);
                last_error = None;
            }
            Err(e) => {
                debug!(attempt, max_attempts, error = %e, "state fetch failed, will retry");
                last_error = Some(e);
            }
        }
        if attempt < max_attempts {
            sleep(timeout.pause).await;
        }
    }

    let mismatch = match (&last, &last_error) {
        (None, Some(e)) => format!("no state could be fetched, last error: {e}"),
        _ => describe(last.as_ref()),
    };
    PollOutcome::Exhausted {
        attempts: max_attempts,
        last_observed: last,
        mismatch,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast(max_attempts: u32) -> Timeout {
        Timeout::from_millis(max_attempts, 5)
    }

    #[tokio::test]
    async fn satisfied_on_first_attempt() {
        let outcome = eventually(
            fast(3),
            || async { Ok::<_, SchedulerError>(7u32) },
            |n| *n == 7,
            |_| unreachable!("describe must not run on success"),
        )
        .await;

        match outcome {
            PollOutcome::Satisfied { attempts, observed } => {
                assert_eq!(attempts, 1);
                assert_eq!(observed, 7);
            }
            other => panic!("expected Satisfied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn satisfied_once_state_converges() {
        let calls = AtomicU32::new(0);
        let outcome = eventually(
            fast(10),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok::<_, SchedulerError>(n) }
            },
            |n| *n >= 3,
            |_| unreachable!("describe must not run on success"),
        )
        .await;

        match outcome {
            PollOutcome::Satisfied { attempts, observed } => {
                assert_eq!(attempts, 3);
                assert_eq!(observed, 3);
            }
            other => panic!("expected Satisfied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn exhausted_reports_last_observed_mismatch() {
        let outcome = eventually(
            fast(4),
            || async { Ok::<_, SchedulerError>(vec!["a", "b"]) },
            |names| names.contains(&"z"),
            |last| format!("expected to find z, observed {last:?}"),
        )
        .await;

        match outcome {
            PollOutcome::Exhausted {
                attempts,
                last_observed,
                mismatch,
            } => {
                assert_eq!(attempts, 4);
                assert_eq!(last_observed, Some(vec!["a", "b"]));
                assert!(mismatch.contains("expected to find z"), "got: {mismatch}");
                assert!(mismatch.contains("a"), "got: {mismatch}");
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_errors_are_swallowed_until_budget_runs_out() {
        let calls = AtomicU32::new(0);
        let outcome = eventually(
            fast(5),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(SchedulerError::backend("list temporarily unavailable"))
                    } else {
                        Ok(n)
                    }
                }
            },
            |n| *n >= 3,
            |_| unreachable!("describe must not run on success"),
        )
        .await;

        match outcome {
            PollOutcome::Satisfied { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected Satisfied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_fetches_failing_reports_the_error() {
        let outcome = eventually(
            fast(3),
            || async { Err::<u32, _>(SchedulerError::backend("store down")) },
            |_| true,
            |_| unreachable!("describe runs only with an observed state"),
        )
        .await;

        match outcome {
            PollOutcome::Exhausted {
                last_observed,
                mismatch,
                ..
            } => {
                assert!(last_observed.is_none());
                assert!(mismatch.contains("store down"), "got: {mismatch}");
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_attempts_still_evaluates_once() {
        let calls = AtomicU32::new(0);
        let outcome = eventually(
            fast(0),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, SchedulerError>(()) }
            },
            |_| true,
            |_| String::new(),
        )
        .await;

        assert!(outcome.is_satisfied());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
