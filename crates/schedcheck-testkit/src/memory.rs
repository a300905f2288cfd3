//! In-memory [`Scheduler`] with configurable visibility lag.
//!
//! Successful operations are accepted synchronously but only become
//! observable through `list` once the lag has elapsed, imitating backends
//! whose reconciliation loop applies accepted changes on a delay. A zero
//! lag makes the backend fully synchronous.
//!
//! Request-level errors (duplicate create, missing unschedule) are always
//! raised synchronously against the full accepted state — visible or not —
//! matching the capability contract: only visibility may lag, never error
//! reporting.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use schedcheck_core::{Result, ScheduleInfo, ScheduleRequest, Scheduler, SchedulerError};
use tracing::info;

struct Entry {
    info: ScheduleInfo,
    /// When the entry starts showing up in `list`.
    visible_at: Instant,
    /// Set when removal has been accepted; the entry keeps showing up in
    /// `list` until this instant passes.
    removed_at: Option<Instant>,
}

pub struct InMemoryScheduler {
    lag: Duration,
    entries: Mutex<Vec<Entry>>,
}

impl InMemoryScheduler {
    /// Fully synchronous backend: every accepted change is observable
    /// immediately.
    pub fn new() -> Self {
        Self::with_lag(Duration::ZERO)
    }

    /// Backend whose accepted changes become observable only after `lag`.
    pub fn with_lag(lag: Duration) -> Self {
        Self {
            lag,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Drop entries whose accepted removal has become observable.
    fn purge(entries: &mut Vec<Entry>, now: Instant) {
        entries.retain(|e| e.removed_at.is_none_or(|t| t > now));
    }
}

impl Default for InMemoryScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scheduler for InMemoryScheduler {
    async fn schedule(&self, request: &ScheduleRequest) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        Self::purge(&mut entries, now);

        // Duplicate detection runs against everything accepted and not yet
        // removed, including entries that are not visible yet.
        let duplicate = entries.iter().any(|e| {
            e.removed_at.is_none() && e.info.schedule_name == request.schedule_name
        });
        if duplicate {
            return Err(SchedulerError::create_failed(&request.schedule_name));
        }

        let mut info = ScheduleInfo::new(&request.schedule_name, &request.definition.name);
        info.schedule_properties = request.scheduler_properties.clone();

        info!(schedule = %request.schedule_name, lag_ms = self.lag.as_millis() as u64, "schedule accepted");
        entries.push(Entry {
            info,
            visible_at: now + self.lag,
            removed_at: None,
        });
        Ok(())
    }

    async fn unschedule(&self, schedule_name: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        Self::purge(&mut entries, now);

        let entry = entries
            .iter_mut()
            .find(|e| e.removed_at.is_none() && e.info.schedule_name == schedule_name);
        match entry {
            Some(entry) => {
                entry.removed_at = Some(now + self.lag);
                info!(schedule = %schedule_name, "unschedule accepted");
                Ok(())
            }
            None => Err(SchedulerError::unschedule_missing(schedule_name)),
        }
    }

    async fn list(&self) -> Result<Vec<ScheduleInfo>> {
        let mut entries = self.entries.lock().unwrap();
        let now = Instant::now();
        Self::purge(&mut entries, now);

        Ok(entries
            .iter()
            .filter(|e| e.visible_at <= now)
            .map(|e| e.info.clone())
            .collect())
    }

    async fn list_for_definition(
        &self,
        task_definition_name: &str,
    ) -> Result<Vec<ScheduleInfo>> {
        let all = self.list().await?;
        Ok(all
            .into_iter()
            .filter(|s| s.task_definition_name == task_definition_name)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use schedcheck_core::{ResourceHandle, TaskDefinition};
    use tokio::time::sleep;

    use super::*;

    const LAG: Duration = Duration::from_millis(50);
    /// Comfortably past LAG so visibility flips between assertions.
    const SETTLE: Duration = Duration::from_millis(80);

    fn request(name: &str, definition: &str) -> ScheduleRequest {
        ScheduleRequest::new(
            name,
            TaskDefinition::new(definition),
            ResourceHandle::new("artifact://memory"),
        )
    }

    #[tokio::test]
    async fn zero_lag_is_synchronous() {
        let scheduler = InMemoryScheduler::new();
        scheduler.schedule(&request("a", "task")).await.unwrap();

        assert_eq!(scheduler.list().await.unwrap().len(), 1);

        scheduler.unschedule("a").await.unwrap();
        assert!(scheduler.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn created_schedule_becomes_visible_after_lag() {
        let scheduler = InMemoryScheduler::with_lag(LAG);
        scheduler.schedule(&request("a", "task")).await.unwrap();

        // Accepted but not yet observable.
        assert!(scheduler.list().await.unwrap().is_empty());

        sleep(SETTLE).await;
        let listed = scheduler.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].schedule_name, "a");
    }

    #[tokio::test]
    async fn removed_schedule_stays_visible_until_lag_passes() {
        let scheduler = InMemoryScheduler::with_lag(LAG);
        scheduler.schedule(&request("a", "task")).await.unwrap();
        sleep(SETTLE).await;

        scheduler.unschedule("a").await.unwrap();
        // Removal accepted, old state still observable.
        assert_eq!(scheduler.list().await.unwrap().len(), 1);

        sleep(SETTLE).await;
        assert!(scheduler.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_is_rejected_even_while_invisible() {
        let scheduler = InMemoryScheduler::with_lag(LAG);
        scheduler.schedule(&request("a", "task")).await.unwrap();

        // The first request has not reached visibility, but the name is taken.
        let err = scheduler.schedule(&request("a", "task")).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to create schedule a");
    }

    #[tokio::test]
    async fn unschedule_of_unknown_name_is_rejected() {
        let scheduler = InMemoryScheduler::new();
        let err = scheduler.unschedule("ghost").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to unschedule, schedule ghost does not exist."
        );
    }

    #[tokio::test]
    async fn filtered_list_matches_definition_exactly() {
        let scheduler = InMemoryScheduler::new();
        scheduler.schedule(&request("a", "alpha")).await.unwrap();
        scheduler.schedule(&request("b", "beta")).await.unwrap();
        scheduler.schedule(&request("c", "alpha")).await.unwrap();

        let alpha = scheduler.list_for_definition("alpha").await.unwrap();
        assert_eq!(alpha.len(), 2);
        assert!(alpha.iter().all(|s| s.task_definition_name == "alpha"));

        assert!(scheduler.list_for_definition("alph").await.unwrap().is_empty());
    }
}
