//! User operations for the Coach.

use jiff::SignedDuration;

use super::Coach;
use crate::{
    error::{CoachError, Result},
    models::{ChatTurn, DialogState, User, DEFAULT_REMINDER_HOUR},
    params::{PurgeInactive, SetAccess, SetAdmin, SetReminderHour, UserId},
};

impl Coach {
    /// Registers a user on first contact and records activity.
    ///
    /// Returns the stored user and whether it was created by this call.
    pub async fn register_user(&self, id: u64) -> Result<(User, bool)> {
        let now = self.now();
        self.with_db(move |db| {
            let created = db.insert_user(id, DEFAULT_REMINDER_HOUR, now)?;
            db.touch_user(id, now)?;
            let user = db.get_user(id)?.ok_or(CoachError::UserNotFound { id })?;
            if created {
                log::info!("registered user {id}");
            }
            Ok((user, created))
        })
        .await
    }

    /// Records activity of an existing user.
    pub async fn touch_user(&self, params: &UserId) -> Result<()> {
        let id = params.id;
        let now = self.now();
        self.with_db(move |db| {
            if db.touch_user(id, now)? {
                Ok(())
            } else {
                Err(CoachError::UserNotFound { id })
            }
        })
        .await
    }

    /// Retrieves a user by ID.
    pub async fn get_user(&self, params: &UserId) -> Result<Option<User>> {
        let id = params.id;
        self.with_db(move |db| db.get_user(id)).await
    }

    /// Retrieves a user by ID, failing when it does not exist.
    pub async fn require_user(&self, id: u64) -> Result<User> {
        self.get_user(&UserId { id })
            .await?
            .ok_or(CoachError::UserNotFound { id })
    }

    /// Lists every known user.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.with_db(|db| db.list_users()).await
    }

    /// Grants or revokes access. Unknown users are registered first so
    /// access can be granted before they ever write to the bot.
    pub async fn set_access(&self, params: &SetAccess) -> Result<User> {
        let SetAccess { id, access } = *params;
        let now = self.now();
        self.with_db(move |db| {
            if access {
                db.insert_user(id, DEFAULT_REMINDER_HOUR, now)?;
            }
            if !db.set_access(id, access)? {
                return Err(CoachError::UserNotFound { id });
            }
            log::info!("user {id} access set to {access}");
            db.get_user(id)?.ok_or(CoachError::UserNotFound { id })
        })
        .await
    }

    /// Promotes or demotes an admin. Promoting registers unknown users.
    pub async fn set_admin(&self, params: &SetAdmin) -> Result<User> {
        let SetAdmin { id, is_admin } = *params;
        let now = self.now();
        self.with_db(move |db| {
            if is_admin {
                db.insert_user(id, DEFAULT_REMINDER_HOUR, now)?;
            }
            if !db.set_admin(id, is_admin)? {
                return Err(CoachError::UserNotFound { id });
            }
            log::info!("user {id} admin flag set to {is_admin}");
            db.get_user(id)?.ok_or(CoachError::UserNotFound { id })
        })
        .await
    }

    /// Makes sure every configured admin exists and carries the admin flag.
    pub async fn ensure_admins(&self, ids: &[u64]) -> Result<()> {
        for &id in ids {
            self.set_admin(&SetAdmin { id, is_admin: true }).await?;
        }
        Ok(())
    }

    /// Whether the user may talk to the bot.
    pub async fn is_authorized(&self, id: u64) -> Result<bool> {
        Ok(self
            .get_user(&UserId { id })
            .await?
            .is_some_and(|user| user.is_authorized()))
    }

    /// Whether the user may run admin commands.
    pub async fn is_admin(&self, id: u64) -> Result<bool> {
        Ok(self
            .get_user(&UserId { id })
            .await?
            .is_some_and(|user| user.is_admin))
    }

    /// Stores the interview state and transcript.
    pub async fn set_dialog(&self, id: u64, state: DialogState, messages: Vec<ChatTurn>) -> Result<()> {
        self.with_db(move |db| {
            if db.set_dialog(id, state, &messages)? {
                Ok(())
            } else {
                Err(CoachError::UserNotFound { id })
            }
        })
        .await
    }

    /// Stores the question-mode state and transcript.
    pub async fn set_question_dialog(
        &self,
        id: u64,
        state: DialogState,
        dialog: Vec<ChatTurn>,
    ) -> Result<()> {
        self.with_db(move |db| {
            if db.set_question_dialog(id, state, &dialog)? {
                Ok(())
            } else {
                Err(CoachError::UserNotFound { id })
            }
        })
        .await
    }

    /// Changes the local hour at which reminders are sent.
    pub async fn set_reminder_hour(&self, params: &SetReminderHour) -> Result<User> {
        let SetReminderHour { id, hour } = *params;
        if hour > 23 {
            return Err(CoachError::validation("reminder_hour")
                .with_reason(format!("{hour} is not an hour between 0 and 23")));
        }
        self.with_db(move |db| {
            if !db.set_reminder_hour(id, hour)? {
                return Err(CoachError::UserNotFound { id });
            }
            db.get_user(id)?.ok_or(CoachError::UserNotFound { id })
        })
        .await
    }

    /// Clears goal, plan, transcripts and progress, returning to `NoPlan`.
    pub async fn reset_user(&self, params: &UserId) -> Result<()> {
        let id = params.id;
        let now = self.now();
        self.with_db(move |db| {
            if db.reset_user(id, now)? {
                log::info!("reset data of user {id}");
                Ok(())
            } else {
                Err(CoachError::UserNotFound { id })
            }
        })
        .await
    }

    /// Deletes a user and their progress record.
    pub async fn delete_user(&self, params: &UserId) -> Result<bool> {
        let id = params.id;
        self.with_db(move |db| db.delete_user(id)).await
    }

    /// Removes accounts without access that have been idle for too long.
    /// Admins and users with access are never removed.
    pub async fn purge_inactive(&self, params: &PurgeInactive) -> Result<Vec<u64>> {
        let idle = SignedDuration::from_hours(i64::from(params.days) * 24);
        let cutoff = self.now().checked_sub(idle).map_err(|e| {
            CoachError::validation("days").with_reason(format!("cutoff out of range: {e}"))
        })?;
        let removed = self.with_db(move |db| db.purge_inactive(cutoff)).await?;
        if !removed.is_empty() {
            log::info!("purged {} inactive users", removed.len());
        }
        Ok(removed)
    }
}
