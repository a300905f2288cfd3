use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::resource::ResourceHandle;

/// Scheduler property key under which backends expect a cron expression.
///
/// Backends that cannot parse the value must reject the request at
/// `schedule` time, not asynchronously.
pub const CRON_EXPRESSION_KEY: &str = "cron-expression";

/// Names and configures the payload a schedule runs.
///
/// Properties are passed into the payload itself (as env vars or whatever
/// suits the target platform); the harness only ever compares definitions
/// by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub name: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl TaskDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.properties = properties;
        self
    }
}

/// A request to register a recurring execution with a backend.
///
/// `scheduler_properties` carry backend-interpreted settings such as
/// [`CRON_EXPRESSION_KEY`]. `deployment_properties` tune the runtime the
/// payload executes in and are never forwarded to the payload itself.
/// `arguments` are forwarded to the payload process verbatim.
///
/// The property maps are plain (non-optional) fields, so "absent"
/// normalizes to an empty map by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Unique key within the backend's namespace; caller-supplied.
    pub schedule_name: String,
    pub definition: TaskDefinition,
    #[serde(default)]
    pub scheduler_properties: HashMap<String, String>,
    #[serde(default)]
    pub deployment_properties: HashMap<String, String>,
    #[serde(default)]
    pub arguments: Vec<String>,
    pub resource: ResourceHandle,
}

impl ScheduleRequest {
    pub fn new(
        schedule_name: impl Into<String>,
        definition: TaskDefinition,
        resource: ResourceHandle,
    ) -> Self {
        Self {
            schedule_name: schedule_name.into(),
            definition,
            scheduler_properties: HashMap::new(),
            deployment_properties: HashMap::new(),
            arguments: Vec::new(),
            resource,
        }
    }

    pub fn with_scheduler_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.scheduler_properties = properties;
        self
    }

    pub fn with_deployment_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.deployment_properties = properties;
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }

    /// The cron expression attached to this request, if any.
    pub fn cron_expression(&self) -> Option<&str> {
        self.scheduler_properties
            .get(CRON_EXPRESSION_KEY)
            .map(String::as_str)
    }
}

/// An observed schedule, as reported by a backend `list` call.
///
/// Equality and hashing consider `schedule_name` only: a partially
/// populated query value compares equal to the fully populated entry a
/// backend reports under the same name, which is what "is it present"
/// checks rely on. Backends produce fresh instances on every `list`; the
/// harness never mutates one after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInfo {
    pub schedule_name: String,
    pub task_definition_name: String,
    /// Backend-reported metadata, e.g. the resolved next fire time.
    #[serde(default)]
    pub schedule_properties: HashMap<String, String>,
}

impl ScheduleInfo {
    pub fn new(
        schedule_name: impl Into<String>,
        task_definition_name: impl Into<String>,
    ) -> Self {
        Self {
            schedule_name: schedule_name.into(),
            task_definition_name: task_definition_name.into(),
            schedule_properties: HashMap::new(),
        }
    }

    /// A query value populated with the name only, for presence checks.
    pub fn named(schedule_name: impl Into<String>) -> Self {
        Self::new(schedule_name, "")
    }
}

impl PartialEq for ScheduleInfo {
    fn eq(&self, other: &Self) -> bool {
        self.schedule_name == other.schedule_name
    }
}

impl Eq for ScheduleInfo {}

impl Hash for ScheduleInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.schedule_name.hash(state);
    }
}
