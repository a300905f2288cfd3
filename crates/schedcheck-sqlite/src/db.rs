use rusqlite::Connection;
use schedcheck_core::{Result, SchedulerError};

/// Initialise the schedule store schema in `conn`.
///
/// Creates the `schedules` table (idempotent) and an index on the task
/// definition name so filtered list queries stay efficient with many rows.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schedules (
            schedule_name    TEXT NOT NULL PRIMARY KEY,
            task_definition  TEXT NOT NULL,
            task_properties  TEXT NOT NULL,   -- JSON map
            cron_expression  TEXT NOT NULL,
            deployment       TEXT NOT NULL,   -- JSON map
            arguments        TEXT NOT NULL,   -- JSON array
            resource_uri     TEXT NOT NULL,
            created_at       TEXT NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_schedules_task_definition
            ON schedules (task_definition);
        ",
    )
    .map_err(into_backend_error)?;
    Ok(())
}

pub(crate) fn into_backend_error(e: rusqlite::Error) -> SchedulerError {
    SchedulerError::backend_with("schedule store query failed", e)
}
