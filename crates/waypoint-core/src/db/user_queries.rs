//! User rows: registration, access flags, dialog state and plan storage.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::{invalid_data, json_column, optional_json_column, required_column};
use crate::{
    error::{CoachError, DatabaseResultExt, Result},
    models::{ChatTurn, DialogState, Plan, User, UserTask},
};

pub(super) const USER_COLUMNS: &str = "id, goal, plan, messages, question_dialog, dialog_state, access, \
                            is_admin, reminder_hour, created_at, last_active_at";
pub(super) const USER_COLUMN_COUNT: usize = 11;
const INSERT_USER_SQL: &str = "INSERT OR IGNORE INTO users (id, reminder_hour, created_at, \
                               last_active_at) VALUES (?1, ?2, ?3, ?3)";
const INSERT_EMPTY_TASK_SQL: &str =
    "INSERT OR IGNORE INTO user_tasks (user_id, updated_at) VALUES (?1, ?2)";
const TOUCH_USER_SQL: &str = "UPDATE users SET last_active_at = ?1 WHERE id = ?2";
const SET_ACCESS_SQL: &str = "UPDATE users SET access = ?1 WHERE id = ?2";
const SET_ADMIN_SQL: &str = "UPDATE users SET is_admin = ?1 WHERE id = ?2";
const SET_DIALOG_SQL: &str = "UPDATE users SET dialog_state = ?1, messages = ?2 WHERE id = ?3";
const SET_QUESTION_DIALOG_SQL: &str =
    "UPDATE users SET dialog_state = ?1, question_dialog = ?2 WHERE id = ?3";
const SET_REMINDER_HOUR_SQL: &str = "UPDATE users SET reminder_hour = ?1 WHERE id = ?2";
const STORE_PLAN_SQL: &str = "UPDATE users SET goal = ?1, plan = ?2, messages = '[]', \
                              dialog_state = 'idle' WHERE id = ?3";
const RESET_USER_SQL: &str = "UPDATE users SET goal = NULL, plan = NULL, messages = '[]', \
                              question_dialog = '[]', dialog_state = 'idle' WHERE id = ?1";
const DELETE_USER_SQL: &str = "DELETE FROM users WHERE id = ?1";
const PURGE_CANDIDATES_SQL: &str =
    "SELECT id, last_active_at FROM users WHERE access = 0 AND is_admin = 0";

/// Maps a row selected with [`USER_COLUMNS`].
pub(super) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let state_raw: String = row.get(5)?;
    let dialog_state = state_raw.parse::<DialogState>().map_err(|e| invalid_data(5, e))?;
    let reminder_hour: i64 = row.get(8)?;
    let reminder_hour = u8::try_from(reminder_hour)
        .map_err(|_| invalid_data(8, format!("Invalid reminder hour: {reminder_hour}")))?;

    Ok(User {
        id: row.get::<_, i64>(0)? as u64,
        goal: row.get(1)?,
        plan: optional_json_column(row, 2)?,
        messages: json_column(row, 3)?,
        question_dialog: json_column(row, 4)?,
        dialog_state,
        access: row.get(6)?,
        is_admin: row.get(7)?,
        reminder_hour,
        created_at: required_column(row, 9)?,
        last_active_at: required_column(row, 10)?,
    })
}

/// Loads one user through any connection or transaction.
pub(super) fn select_user(connection: &Connection, id: u64) -> Result<Option<User>> {
    connection
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id as i64],
            user_from_row,
        )
        .optional()
        .db_context("Failed to query user")
}

impl super::Database {
    /// Registers a user together with an empty progress record.
    ///
    /// Returns `false` when the user already existed.
    pub fn insert_user(&mut self, id: u64, reminder_hour: u8, now: Timestamp) -> Result<bool> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;
        let now_str = now.to_string();

        let inserted = tx
            .execute(INSERT_USER_SQL, params![id as i64, reminder_hour, &now_str])
            .db_context("Failed to insert user")?;
        tx.execute(INSERT_EMPTY_TASK_SQL, params![id as i64, &now_str])
            .db_context("Failed to insert progress record")?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(inserted > 0)
    }

    /// Retrieves a user by ID.
    pub fn get_user(&self, id: u64) -> Result<Option<User>> {
        select_user(&self.connection, id)
    }

    /// Lists all users, oldest first.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .connection
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"))
            .db_context("Failed to prepare query")?;
        let users = stmt
            .query_map([], user_from_row)
            .db_context("Failed to query users")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read user rows")?;
        Ok(users)
    }

    /// Records activity. Returns `false` when the user does not exist.
    pub fn touch_user(&self, id: u64, now: Timestamp) -> Result<bool> {
        self.update_one(TOUCH_USER_SQL, params![now.to_string(), id as i64], "Failed to touch user")
    }

    pub fn set_access(&self, id: u64, access: bool) -> Result<bool> {
        self.update_one(SET_ACCESS_SQL, params![access, id as i64], "Failed to update access")
    }

    pub fn set_admin(&self, id: u64, is_admin: bool) -> Result<bool> {
        self.update_one(SET_ADMIN_SQL, params![is_admin, id as i64], "Failed to update admin flag")
    }

    /// Stores the interview state and transcript.
    pub fn set_dialog(&self, id: u64, state: DialogState, messages: &[ChatTurn]) -> Result<bool> {
        let messages = serde_json::to_string(messages)?;
        self.update_one(
            SET_DIALOG_SQL,
            params![state.as_str(), messages, id as i64],
            "Failed to update dialog",
        )
    }

    /// Stores the question-mode state and transcript.
    pub fn set_question_dialog(
        &self,
        id: u64,
        state: DialogState,
        dialog: &[ChatTurn],
    ) -> Result<bool> {
        let dialog = serde_json::to_string(dialog)?;
        self.update_one(
            SET_QUESTION_DIALOG_SQL,
            params![state.as_str(), dialog, id as i64],
            "Failed to update question dialog",
        )
    }

    pub fn set_reminder_hour(&self, id: u64, hour: u8) -> Result<bool> {
        self.update_one(
            SET_REMINDER_HOUR_SQL,
            params![hour, id as i64],
            "Failed to update reminder hour",
        )
    }

    /// Stores a plan and its fresh progress record in one transaction and
    /// ends the interview.
    ///
    /// Refuses to replace an existing plan. With `expected` set, the user
    /// must still be in that dialog state when the transaction starts.
    pub fn store_plan(
        &mut self,
        id: u64,
        plan: &Plan,
        task: &UserTask,
        now: Timestamp,
        expected: Option<DialogState>,
    ) -> Result<bool> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let Some(user) = select_user(&tx, id)? else {
            return Ok(false);
        };
        if user.has_plan() {
            return Err(CoachError::precondition("a plan already exists"));
        }
        if expected.is_some_and(|state| state != user.dialog_state) {
            return Err(CoachError::precondition("the interview is no longer in progress"));
        }

        let plan_json = serde_json::to_string(plan)?;
        let updated = tx
            .execute(STORE_PLAN_SQL, params![&plan.goal, plan_json, id as i64])
            .db_context("Failed to store plan")?;
        if updated == 0 {
            return Ok(false);
        }
        super::task_queries::write_task(&tx, task, now)?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(true)
    }

    /// Clears goal, plan and transcripts and returns the user to `NoPlan`.
    pub fn reset_user(&mut self, id: u64, now: Timestamp) -> Result<bool> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let updated = tx
            .execute(RESET_USER_SQL, params![id as i64])
            .db_context("Failed to reset user")?;
        if updated == 0 {
            return Ok(false);
        }
        super::task_queries::write_task(&tx, &UserTask::empty(id), now)?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(true)
    }

    /// Deletes a user and, through the foreign key, their progress record.
    pub fn delete_user(&self, id: u64) -> Result<bool> {
        self.update_one(DELETE_USER_SQL, params![id as i64], "Failed to delete user")
    }

    /// Deletes users without access or admin rights who were last active
    /// before `cutoff`. Returns the removed IDs.
    pub fn purge_inactive(&mut self, cutoff: Timestamp) -> Result<Vec<u64>> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let stale = {
            let mut stmt = tx
                .prepare(PURGE_CANDIDATES_SQL)
                .db_context("Failed to prepare query")?;
            let candidates = stmt
                .query_map([], |row| {
                    let id = row.get::<_, i64>(0)? as u64;
                    let last_active: Timestamp = required_column(row, 1)?;
                    Ok((id, last_active))
                })
                .db_context("Failed to query purge candidates")?
                .collect::<rusqlite::Result<Vec<_>>>()
                .db_context("Failed to read purge candidates")?;
            candidates
                .into_iter()
                .filter(|(_, last_active)| *last_active < cutoff)
                .map(|(id, _)| id)
                .collect::<Vec<_>>()
        };

        for id in &stale {
            tx.execute(DELETE_USER_SQL, params![*id as i64])
                .db_context("Failed to delete user")?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(stale)
    }

    fn update_one(&self, sql: &str, params: impl rusqlite::Params, context: &str) -> Result<bool> {
        let changed = self.connection.execute(sql, params).db_context(context)?;
        Ok(changed > 0)
    }
}
