//! Backend-independent conformance battery.
//!
//! The scenarios here pin down the behaviors every [`Scheduler`] backend
//! must exhibit: create/duplicate/remove semantics, eventual visibility of
//! accepted operations, and filtered listing. Each scenario builds
//! schedules under per-run unique names (safe against a live shared
//! backend), drives them through a [`TrackingScheduler`], asserts eventual
//! state with [`eventually`], and drains everything it created afterward —
//! even when an assertion failed partway through.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use schedcheck_core::{
    ResourceHandle, ScheduleInfo, ScheduleRequest, Scheduler, SchedulerError, TaskDefinition,
    CRON_EXPRESSION_KEY,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::poll::{eventually, PollOutcome};
use crate::timeout::Timeout;
use crate::tracking::TrackingScheduler;

/// Fixture configuration for a conformance run.
///
/// All values are passed explicitly by the embedding test; nothing is read
/// from the environment. The defaults fit a backend that understands the
/// [`CRON_EXPRESSION_KEY`] property and needs no deployment tuning.
#[derive(Debug, Clone)]
pub struct ConformanceOptions {
    /// Poll policy for waiting on a schedule to become visible.
    pub schedule_timeout: Timeout,
    /// Poll policy for waiting on a schedule to disappear.
    pub unschedule_timeout: Timeout,
    /// Scheduler properties attached to every request.
    pub scheduler_properties: HashMap<String, String>,
    /// Deployment properties attached to every request.
    pub deployment_properties: HashMap<String, String>,
    /// Command line arguments forwarded to the payload.
    pub arguments: Vec<String>,
    /// Artifact handle attached to every request.
    pub resource: ResourceHandle,
}

impl Default for ConformanceOptions {
    fn default() -> Self {
        Self {
            schedule_timeout: Timeout::default(),
            unschedule_timeout: Timeout::default(),
            scheduler_properties: HashMap::from([(
                CRON_EXPRESSION_KEY.to_string(),
                // Top of every minute.
                "0 * * * * *".to_string(),
            )]),
            deployment_properties: HashMap::new(),
            arguments: Vec::new(),
            resource: ResourceHandle::new("artifact://schedcheck-test-payload"),
        }
    }
}

/// One behavior from the battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Create one schedule, wait for it to show up in `list`.
    SimpleSchedule,
    /// Create, verify, remove, wait for it to disappear.
    Unschedule,
    /// A second `schedule` under the same name must be rejected with the
    /// exact creation-failure message.
    DuplicateSchedule,
    /// `unschedule` of a never-created name must be rejected with the
    /// exact not-found message.
    UnscheduleMissing,
    /// Four schedules under four distinct definitions all become visible.
    MultipleSchedule,
    /// Four schedules alternating two definitions; each filtered list
    /// converges to exactly the two matching entries.
    ListFilter,
}

impl Scenario {
    /// Every scenario, in the order a full run executes them.
    pub const ALL: [Scenario; 6] = [
        Scenario::SimpleSchedule,
        Scenario::Unschedule,
        Scenario::DuplicateSchedule,
        Scenario::UnscheduleMissing,
        Scenario::MultipleSchedule,
        Scenario::ListFilter,
    ];
}

/// Drives one backend through the scenario battery.
pub struct ConformanceHarness {
    scheduler: TrackingScheduler,
    options: ConformanceOptions,
}

impl ConformanceHarness {
    pub fn new(backend: Arc<dyn Scheduler>, options: ConformanceOptions) -> Self {
        Self {
            scheduler: TrackingScheduler::new(backend),
            options,
        }
    }

    /// The tracking wrapper the scenarios go through. Embedders can use it
    /// for additional backend-specific tests; anything scheduled through it
    /// is drained by [`teardown`](Self::teardown).
    pub fn scheduler(&self) -> &TrackingScheduler {
        &self.scheduler
    }

    /// Run `scenario`, then unconditionally drain every schedule it
    /// created.
    ///
    /// The scenario result wins over teardown errors, so a failing
    /// assertion is reported even when cleanup also misbehaves.
    pub async fn run(&self, scenario: Scenario) -> Result<()> {
        info!(?scenario, "running conformance scenario");
        let result = match scenario {
            Scenario::SimpleSchedule => self.simple_schedule().await,
            Scenario::Unschedule => self.unschedule().await,
            Scenario::DuplicateSchedule => self.duplicate_schedule().await,
            Scenario::UnscheduleMissing => self.unschedule_missing().await,
            Scenario::MultipleSchedule => self.multiple_schedule().await,
            Scenario::ListFilter => self.list_filter().await,
        };
        let teardown = self.teardown().await;
        result.and(teardown)
    }

    /// Run the whole battery, stopping at the first failure.
    pub async fn run_all(&self) -> Result<()> {
        for scenario in Scenario::ALL {
            self.run(scenario)
                .await
                .with_context(|| format!("conformance scenario {scenario:?} failed"))?;
        }
        Ok(())
    }

    /// Remove every schedule the wrapper still tracks, waiting for each
    /// removal to become observable, so no test-created state outlives the
    /// scenario.
    pub async fn teardown(&self) -> Result<()> {
        let mut failures = Vec::new();
        for request in self.scheduler.tracked_requests() {
            if let Err(err) = self.unschedule_and_verify(&request.schedule_name).await {
                failures.push(format!("{}: {err:#}", request.schedule_name));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            bail!("teardown left schedules behind: {}", failures.join("; "));
        }
    }

    // --- scenario bodies ---------------------------------------------------

    async fn simple_schedule(&self) -> Result<()> {
        self.create_and_verify().await?;
        Ok(())
    }

    async fn unschedule(&self) -> Result<()> {
        let name = self.create_and_verify().await?;
        self.unschedule_and_verify(&name).await
    }

    async fn duplicate_schedule(&self) -> Result<()> {
        let request = self.unique_request();
        self.schedule(&request).await?;
        self.verify_present(&request.schedule_name).await?;

        // Asserted after the call returns: first the kind, then the exact
        // user-facing message.
        match self.scheduler.schedule(&request).await {
            Ok(()) => bail!(
                "second schedule call for {} was accepted; duplicate names must be rejected",
                request.schedule_name
            ),
            Err(err) => {
                if !matches!(err, SchedulerError::CreateFailed { .. }) {
                    bail!("duplicate rejection raised the wrong error kind: {err:?}");
                }
                let expected = format!("Failed to create schedule {}", request.schedule_name);
                if err.to_string() != expected {
                    bail!(
                        "duplicate rejection message mismatch: got {:?}, want {:?}",
                        err.to_string(),
                        expected
                    );
                }
            }
        }
        Ok(())
    }

    async fn unschedule_missing(&self) -> Result<()> {
        let name = format!("ScheduleName_{}", unique_name());
        match self.scheduler.unschedule(&name).await {
            Ok(()) => bail!("unschedule of never-created {name} succeeded; it must be rejected"),
            Err(err) => {
                let expected = format!("Failed to unschedule, schedule {name} does not exist.");
                if err.to_string() != expected {
                    bail!(
                        "missing-unschedule message mismatch: got {:?}, want {:?}",
                        err.to_string(),
                        expected
                    );
                }
            }
        }
        Ok(())
    }

    async fn multiple_schedule(&self) -> Result<()> {
        let base = unique_name();
        let mut names = Vec::new();
        for i in 0..4 {
            let request = self.request(
                &format!("Schedule_Name{i}_{base}"),
                &format!("{base}_def{i}"),
            );
            self.schedule(&request).await?;
            names.push(request.schedule_name);
        }
        for name in &names {
            self.verify_present(name).await?;
        }
        Ok(())
    }

    async fn list_filter(&self) -> Result<()> {
        let base = unique_name();
        let definitions = [format!("{base}_even"), format!("{base}_odd")];
        for i in 0..4 {
            let request =
                self.request(&format!("Schedule_Name{i}_{base}"), &definitions[i % 2]);
            self.schedule(&request).await?;
        }

        for definition in &definitions {
            let outcome = eventually(
                self.options.schedule_timeout,
                || self.scheduler.list_for_definition(definition),
                |schedules: &Vec<ScheduleInfo>| {
                    schedules.len() == 2
                        && schedules
                            .iter()
                            .all(|s| s.task_definition_name == *definition)
                },
                |last| {
                    format!(
                        "expected exactly 2 schedules for definition {definition}, observed {}",
                        describe_schedules(last)
                    )
                },
            )
            .await;
            if let PollOutcome::Exhausted { mismatch, .. } = outcome {
                bail!("filtered list never converged: {mismatch}");
            }
        }
        Ok(())
    }

    // --- shared steps ------------------------------------------------------

    async fn create_and_verify(&self) -> Result<String> {
        let request = self.unique_request();
        self.schedule(&request).await?;
        self.verify_present(&request.schedule_name).await?;
        Ok(request.schedule_name)
    }

    async fn schedule(&self, request: &ScheduleRequest) -> Result<()> {
        info!(schedule = %request.schedule_name, definition = %request.definition.name, "scheduling");
        self.scheduler
            .schedule(request)
            .await
            .with_context(|| format!("schedule call for {} failed", request.schedule_name))
    }

    async fn unschedule_and_verify(&self, schedule_name: &str) -> Result<()> {
        info!(schedule = %schedule_name, "unscheduling");
        self.scheduler
            .unschedule(schedule_name)
            .await
            .with_context(|| format!("unschedule call for {schedule_name} failed"))?;
        self.verify_absent(schedule_name).await
    }

    async fn verify_present(&self, schedule_name: &str) -> Result<()> {
        let outcome = eventually(
            self.options.schedule_timeout,
            || self.scheduler.list(),
            |schedules: &Vec<ScheduleInfo>| has_schedule(schedules, schedule_name),
            |last| {
                format!(
                    "schedule {schedule_name} never became visible, observed {}",
                    describe_schedules(last)
                )
            },
        )
        .await;
        match outcome {
            PollOutcome::Satisfied { attempts, .. } => {
                debug!(schedule = %schedule_name, attempts, "schedule visible");
                Ok(())
            }
            PollOutcome::Exhausted { mismatch, .. } => bail!(mismatch),
        }
    }

    async fn verify_absent(&self, schedule_name: &str) -> Result<()> {
        let outcome = eventually(
            self.options.unschedule_timeout,
            || self.scheduler.list(),
            |schedules: &Vec<ScheduleInfo>| !has_schedule(schedules, schedule_name),
            |last| {
                format!(
                    "schedule {schedule_name} is still listed, observed {}",
                    describe_schedules(last)
                )
            },
        )
        .await;
        match outcome {
            PollOutcome::Satisfied { attempts, .. } => {
                debug!(schedule = %schedule_name, attempts, "schedule gone");
                Ok(())
            }
            PollOutcome::Exhausted { mismatch, .. } => bail!(mismatch),
        }
    }

    // --- request fixtures --------------------------------------------------

    fn unique_request(&self) -> ScheduleRequest {
        let definition_name = unique_name();
        self.request(&format!("ScheduleName_{definition_name}"), &definition_name)
    }

    fn request(&self, schedule_name: &str, definition_name: &str) -> ScheduleRequest {
        ScheduleRequest::new(
            schedule_name,
            TaskDefinition::new(definition_name),
            self.options.resource.clone(),
        )
        .with_scheduler_properties(self.options.scheduler_properties.clone())
        .with_deployment_properties(self.options.deployment_properties.clone())
        .with_arguments(self.options.arguments.clone())
    }
}

/// True when `schedules` contains an entry named `schedule_name`.
pub fn has_schedule(schedules: &[ScheduleInfo], schedule_name: &str) -> bool {
    schedules.iter().any(|s| s.schedule_name == schedule_name)
}

/// Failure-report rendering of an observed schedule set: every name with
/// its definition, so a backend bug is diagnosable from the message alone.
pub fn describe_schedules(schedules: Option<&Vec<ScheduleInfo>>) -> String {
    match schedules {
        None => "no successful list call".to_string(),
        Some(list) if list.is_empty() => "an empty schedule list".to_string(),
        Some(list) => {
            let entries: Vec<String> = list
                .iter()
                .map(|s| format!("{} (definition {})", s.schedule_name, s.task_definition_name))
                .collect();
            format!("[{}]", entries.join(", "))
        }
    }
}

fn unique_name() -> String {
    Uuid::new_v4().to_string()
}
