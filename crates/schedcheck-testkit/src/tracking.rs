use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use schedcheck_core::{Result, ScheduleInfo, ScheduleRequest, Scheduler};

/// Decorator over any [`Scheduler`] that records which schedules the
/// current session created, so teardown can remove exactly those.
///
/// Bookkeeping only: the tracked set is cleanup intent, never a substitute
/// for the backend's own listing. Entries are inserted only after the
/// wrapped `schedule` succeeds and removed only after the wrapped
/// `unschedule` succeeds, so a rejected request never enters the set and a
/// failed removal keeps its entry for another attempt. The `list`
/// operations pass straight through.
pub struct TrackingScheduler {
    inner: Arc<dyn Scheduler>,
    tracked: DashMap<String, ScheduleRequest>,
}

impl TrackingScheduler {
    pub fn new(inner: Arc<dyn Scheduler>) -> Self {
        Self {
            inner,
            tracked: DashMap::new(),
        }
    }

    /// Snapshot of the requests scheduled through this wrapper and not yet
    /// successfully unscheduled.
    pub fn tracked_requests(&self) -> Vec<ScheduleRequest> {
        self.tracked.iter().map(|entry| entry.value().clone()).collect()
    }
}

#[async_trait]
impl Scheduler for TrackingScheduler {
    async fn schedule(&self, request: &ScheduleRequest) -> Result<()> {
        self.inner.schedule(request).await?;
        self.tracked
            .insert(request.schedule_name.clone(), request.clone());
        Ok(())
    }

    async fn unschedule(&self, schedule_name: &str) -> Result<()> {
        self.inner.unschedule(schedule_name).await?;
        self.tracked.remove(schedule_name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ScheduleInfo>> {
        self.inner.list().await
    }

    async fn list_for_definition(
        &self,
        task_definition_name: &str,
    ) -> Result<Vec<ScheduleInfo>> {
        self.inner.list_for_definition(task_definition_name).await
    }
}
