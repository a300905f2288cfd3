// Conformance battery run against the in-memory reference backend, with a
// visibility lag large enough that every assertion has to poll through
// several unconverged reads — the harness path a real asynchronous backend
// exercises.

use std::sync::Arc;
use std::time::Duration;

use schedcheck_core::{ResourceHandle, ScheduleRequest, Scheduler, TaskDefinition};
use schedcheck_testkit::{
    ConformanceHarness, ConformanceOptions, InMemoryScheduler, Scenario, Timeout,
};

const LAG: Duration = Duration::from_millis(60);

fn lagged_options() -> ConformanceOptions {
    ConformanceOptions {
        // 20 × 25 ms of polling comfortably covers the 60 ms lag.
        schedule_timeout: Timeout::from_millis(20, 25),
        unschedule_timeout: Timeout::from_millis(20, 25),
        ..ConformanceOptions::default()
    }
}

fn lagged_harness() -> ConformanceHarness {
    schedcheck_testkit::init_test_logging();
    ConformanceHarness::new(
        Arc::new(InMemoryScheduler::with_lag(LAG)),
        lagged_options(),
    )
}

#[tokio::test]
async fn simple_schedule() {
    lagged_harness().run(Scenario::SimpleSchedule).await.unwrap();
}

#[tokio::test]
async fn unschedule() {
    lagged_harness().run(Scenario::Unschedule).await.unwrap();
}

#[tokio::test]
async fn duplicate_schedule() {
    lagged_harness()
        .run(Scenario::DuplicateSchedule)
        .await
        .unwrap();
}

#[tokio::test]
async fn unschedule_missing() {
    lagged_harness()
        .run(Scenario::UnscheduleMissing)
        .await
        .unwrap();
}

#[tokio::test]
async fn multiple_schedule() {
    lagged_harness()
        .run(Scenario::MultipleSchedule)
        .await
        .unwrap();
}

#[tokio::test]
async fn list_filter() {
    lagged_harness().run(Scenario::ListFilter).await.unwrap();
}

#[tokio::test]
async fn full_battery_against_synchronous_backend() {
    schedcheck_testkit::init_test_logging();
    let options = ConformanceOptions {
        schedule_timeout: Timeout::from_millis(5, 10),
        unschedule_timeout: Timeout::from_millis(5, 10),
        ..ConformanceOptions::default()
    };
    let harness = ConformanceHarness::new(Arc::new(InMemoryScheduler::new()), options);
    harness.run_all().await.unwrap();
}

// Schedules created outside any scenario body (through the harness's
// wrapper) are still drained by teardown, and the backend really converges
// to empty — cleanup is observable state, not bookkeeping.
#[tokio::test]
async fn teardown_drains_everything_the_wrapper_tracked() {
    schedcheck_testkit::init_test_logging();
    let backend = Arc::new(InMemoryScheduler::with_lag(LAG));
    let harness = ConformanceHarness::new(backend.clone(), lagged_options());

    for i in 0..3 {
        let request = ScheduleRequest::new(
            format!("teardown-{i}"),
            TaskDefinition::new("teardown-task"),
            ResourceHandle::new("artifact://teardown"),
        );
        harness.scheduler().schedule(&request).await.unwrap();
    }
    assert_eq!(harness.scheduler().tracked_requests().len(), 3);

    harness.teardown().await.unwrap();

    assert!(harness.scheduler().tracked_requests().is_empty());
    // teardown already waited for eventual absence; the backend view must
    // agree.
    assert!(backend.list().await.unwrap().is_empty());
}
