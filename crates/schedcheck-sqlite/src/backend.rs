use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use cron::Schedule as CronSchedule;
use rusqlite::Connection;
use tracing::info;

use schedcheck_core::{
    Result, ScheduleInfo, ScheduleRequest, Scheduler, SchedulerError, CRON_EXPRESSION_KEY,
};

use crate::db::{init_db, into_backend_error};

/// Schedule property key under which `list` reports the next fire time
/// (RFC 3339, UTC).
pub const NEXT_RUN_KEY: &str = "next-run";

/// SQLite-backed [`Scheduler`].
///
/// The connection sits behind an `Arc<Mutex<…>>` so the backend can be
/// shared across Tokio tasks.
pub struct SqliteScheduler {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteScheduler {
    /// Open a backend over `conn`, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Volatile backend for tests and conformance runs.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(into_backend_error)?;
        Self::new(conn)
    }

    /// Validate the cron expression attached to `request` and return it.
    ///
    /// Missing or malformed expressions are rejected here, at `schedule`
    /// time — the capability contract does not allow deferring bad input to
    /// an asynchronous failure.
    fn validated_cron(request: &ScheduleRequest) -> std::result::Result<&str, String> {
        let Some(expression) = request.cron_expression() else {
            return Err(format!(
                "missing required scheduler property {CRON_EXPRESSION_KEY}"
            ));
        };
        CronSchedule::from_str(expression)
            .map_err(|e| format!("invalid cron expression {expression:?}: {e}"))?;
        Ok(expression)
    }

    fn query(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<ScheduleInfo>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql).map_err(into_backend_error)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok((
                    row.get::<_, String>(0)?, // schedule_name
                    row.get::<_, String>(1)?, // task_definition
                    row.get::<_, String>(2)?, // cron_expression
                ))
            })
            .map_err(into_backend_error)?
            .filter_map(|r| r.ok())
            .map(|(schedule_name, task_definition, expression)| {
                let mut schedule_properties = HashMap::new();
                if let Some(next) = next_fire_time(&expression) {
                    schedule_properties.insert(NEXT_RUN_KEY.to_string(), next);
                }
                schedule_properties.insert(CRON_EXPRESSION_KEY.to_string(), expression);
                ScheduleInfo {
                    schedule_name,
                    task_definition_name: task_definition,
                    schedule_properties,
                }
            })
            .collect();
        Ok(rows)
    }
}

#[async_trait]
impl Scheduler for SqliteScheduler {
    async fn schedule(&self, request: &ScheduleRequest) -> Result<()> {
        let name = &request.schedule_name;
        let expression = Self::validated_cron(request)
            .map_err(|reason| SchedulerError::create_failed_with(name, reason))?;

        let task_properties = serde_json::to_string(&request.definition.properties)
            .map_err(|e| SchedulerError::create_failed_with(name, e))?;
        let deployment = serde_json::to_string(&request.deployment_properties)
            .map_err(|e| SchedulerError::create_failed_with(name, e))?;
        let arguments = serde_json::to_string(&request.arguments)
            .map_err(|e| SchedulerError::create_failed_with(name, e))?;

        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO schedules
                 (schedule_name, task_definition, task_properties, cron_expression,
                  deployment, arguments, resource_uri, created_at)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
                rusqlite::params![
                    name,
                    request.definition.name,
                    task_properties,
                    expression,
                    deployment,
                    arguments,
                    request.resource.uri(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| SchedulerError::create_failed_with(name, e))?;

        // INSERT OR IGNORE leaves an existing row untouched; zero affected
        // rows means the name is already taken.
        if inserted == 0 {
            return Err(SchedulerError::create_failed(name));
        }

        info!(schedule = %name, definition = %request.definition.name, "schedule created");
        Ok(())
    }

    async fn unschedule(&self, schedule_name: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute(
                "DELETE FROM schedules WHERE schedule_name = ?1",
                [schedule_name],
            )
            .map_err(|e| SchedulerError::unschedule_failed(schedule_name, e))?;
        if deleted == 0 {
            return Err(SchedulerError::unschedule_missing(schedule_name));
        }
        info!(schedule = %schedule_name, "schedule removed");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ScheduleInfo>> {
        self.query(
            "SELECT schedule_name, task_definition, cron_expression
             FROM schedules ORDER BY created_at",
            rusqlite::params![],
        )
    }

    async fn list_for_definition(
        &self,
        task_definition_name: &str,
    ) -> Result<Vec<ScheduleInfo>> {
        self.query(
            "SELECT schedule_name, task_definition, cron_expression
             FROM schedules WHERE task_definition = ?1 ORDER BY created_at",
            rusqlite::params![task_definition_name],
        )
    }
}

/// Next fire time for a stored cron expression, RFC 3339.
///
/// Stored expressions were validated at `schedule` time, so a parse failure
/// here means the store was modified externally; the property is simply
/// omitted in that case.
fn next_fire_time(expression: &str) -> Option<String> {
    let schedule = CronSchedule::from_str(expression).ok()?;
    schedule.upcoming(Utc).next().map(|dt| dt.to_rfc3339())
}
