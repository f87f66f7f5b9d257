//! Progress records and the per-user atomic read-modify-write.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::{json_column, parsed_column, user_queries};
use crate::{
    error::{CoachError, DatabaseResultExt, Result},
    models::{User, UserTask},
};

const TASK_COLUMNS: &str =
    "user_id, current_step, deadlines, current_deadline, completed_at, reminded_on, swept_on";
const SELECT_TASK_SQL: &str = "SELECT user_id, current_step, deadlines, current_deadline, \
                               completed_at, reminded_on, swept_on FROM user_tasks WHERE user_id = ?1";
const UPSERT_TASK_SQL: &str = "INSERT INTO user_tasks (user_id, current_step, deadlines, \
     current_deadline, completed_at, reminded_on, swept_on, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
     ON CONFLICT(user_id) DO UPDATE SET current_step = excluded.current_step, \
     deadlines = excluded.deadlines, current_deadline = excluded.current_deadline, \
     completed_at = excluded.completed_at, reminded_on = excluded.reminded_on, \
     swept_on = excluded.swept_on, updated_at = excluded.updated_at";

/// Maps task columns starting at `offset`.
fn task_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<UserTask> {
    let step: i64 = row.get(offset + 1)?;
    Ok(UserTask {
        user_id: row.get::<_, i64>(offset)? as u64,
        current_step: usize::try_from(step).map_err(|e| super::conversion_error(offset + 1, e))?,
        deadlines: json_column(row, offset + 2)?,
        current_deadline: parsed_column(row, offset + 3)?,
        completed_at: parsed_column(row, offset + 4)?,
        reminded_on: parsed_column(row, offset + 5)?,
        swept_on: parsed_column(row, offset + 6)?,
    })
}

fn select_task(connection: &Connection, user_id: u64) -> Result<Option<UserTask>> {
    connection
        .query_row(SELECT_TASK_SQL, params![user_id as i64], |row| task_from_row(row, 0))
        .optional()
        .db_context("Failed to query progress record")
}

/// Inserts or replaces a progress record through any connection or
/// transaction.
pub(super) fn write_task(connection: &Connection, task: &UserTask, now: Timestamp) -> Result<()> {
    let deadlines = serde_json::to_string(&task.deadlines)?;
    connection
        .execute(
            UPSERT_TASK_SQL,
            params![
                task.user_id as i64,
                task.current_step as i64,
                deadlines,
                task.current_deadline.map(|t| t.to_string()),
                task.completed_at.map(|t| t.to_string()),
                task.reminded_on.map(|d| d.to_string()),
                task.swept_on.map(|d| d.to_string()),
                now.to_string(),
            ],
        )
        .db_context("Failed to write progress record")?;
    Ok(())
}

impl super::Database {
    /// Retrieves the progress record of a user.
    pub fn get_task(&self, user_id: u64) -> Result<Option<UserTask>> {
        select_task(&self.connection, user_id)
    }

    /// Atomically reads a user and their progress record, applies `f` and
    /// writes back the record `f` returns, if any.
    ///
    /// Runs inside an IMMEDIATE transaction so concurrent updates of the same
    /// user serialize. When `f` fails nothing is written.
    pub fn update_task_with<T, F>(&mut self, user_id: u64, now: Timestamp, f: F) -> Result<T>
    where
        F: FnOnce(&User, &UserTask) -> Result<(Option<UserTask>, T)>,
    {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let user = user_queries::select_user(&tx, user_id)?
            .ok_or(CoachError::UserNotFound { id: user_id })?;
        let task = select_task(&tx, user_id)?.unwrap_or_else(|| UserTask::empty(user_id));

        let (updated, output) = f(&user, &task)?;
        if let Some(updated) = updated {
            write_task(&tx, &updated, now)?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(output)
    }

    /// Users who may receive notifications, with their progress records.
    pub fn list_active_progress(&self) -> Result<Vec<(User, UserTask)>> {
        let sql = format!(
            "SELECT u.{}, t.{} FROM users u JOIN user_tasks t ON t.user_id = u.id \
             WHERE u.access = 1 OR u.is_admin = 1 ORDER BY u.id",
            user_queries::USER_COLUMNS.replace(", ", ", u."),
            TASK_COLUMNS.replace(", ", ", t."),
        );
        let mut stmt = self
            .connection
            .prepare(&sql)
            .db_context("Failed to prepare query")?;
        let rows = stmt
            .query_map([], |row| {
                let user = user_queries::user_from_row(row)?;
                let task = task_from_row(row, user_queries::USER_COLUMN_COUNT)?;
                Ok((user, task))
            })
            .db_context("Failed to query progress records")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read progress rows")?;
        Ok(rows)
    }
}
