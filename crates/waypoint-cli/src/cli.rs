//! Admin subcommands and their handlers.
//!
//! Argument structs carry the clap derives and convert into the
//! interface-agnostic parameter types of `waypoint_core::params`:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Coach
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use log::warn;
use teloxide::Bot;
use waypoint_core::{
    display::Users,
    notify::LogSink,
    params::{PurgeInactive, SetAccess, SetAdmin, SetReminderHour, UserId},
    Coach, OperationStatus,
};

use crate::{renderer::TerminalRenderer, telegram::TelegramSink};

/// A single Telegram user ID
#[derive(Args)]
pub struct UserIdArgs {
    /// Telegram user ID
    pub id: u64,
}

impl From<UserIdArgs> for UserId {
    fn from(val: UserIdArgs) -> Self {
        UserId { id: val.id }
    }
}

/// Change the daily reminder hour of a user
#[derive(Args)]
pub struct RemindArgs {
    /// Telegram user ID
    pub id: u64,
    /// Local hour (0-23) at which reminders are sent
    #[arg(value_parser = clap::value_parser!(u8).range(0..24))]
    pub hour: u8,
}

impl From<RemindArgs> for SetReminderHour {
    fn from(val: RemindArgs) -> Self {
        SetReminderHour {
            id: val.id,
            hour: val.hour,
        }
    }
}

/// Remove users without access who have been idle for a while
#[derive(Args)]
pub struct PurgeArgs {
    /// Remove users idle for more than this many days
    #[arg(long, default_value_t = PurgeInactive::default().days)]
    pub days: u32,
}

impl From<PurgeArgs> for PurgeInactive {
    fn from(val: PurgeArgs) -> Self {
        PurgeInactive { days: val.days }
    }
}

/// Run both sweeps once
#[derive(Args)]
pub struct SweepArgs {
    /// Bot token used to deliver the resulting messages. Without it events
    /// are only logged
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List all users
    #[command(alias = "ls")]
    List,
    /// Show a user with their plan progress
    #[command(alias = "s")]
    Show(UserIdArgs),
    /// Grant bot access
    Grant(UserIdArgs),
    /// Revoke bot access
    Revoke(UserIdArgs),
    /// Make a user admin
    Promote(UserIdArgs),
    /// Take admin rights away
    Demote(UserIdArgs),
    /// Forget a user's goal, plan and progress
    Reset(UserIdArgs),
    /// Set the hour at which reminders are sent
    Remind(RemindArgs),
    /// Delete a user entirely
    Delete(UserIdArgs),
}

/// Runs admin commands against a coach and prints the results.
pub struct Cli {
    coach: Coach,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(coach: Coach, renderer: TerminalRenderer) -> Self {
        Self { coach, renderer }
    }

    pub async fn handle_user_command(&self, command: UserCommands) -> Result<()> {
        match command {
            UserCommands::List => self.list_users().await,
            UserCommands::Show(args) => self.show_user(&args.into()).await,
            UserCommands::Grant(args) => self.set_access(args.id, true).await,
            UserCommands::Revoke(args) => self.set_access(args.id, false).await,
            UserCommands::Promote(args) => self.set_admin(args.id, true).await,
            UserCommands::Demote(args) => self.set_admin(args.id, false).await,
            UserCommands::Reset(args) => self.reset_user(&args.into()).await,
            UserCommands::Remind(args) => self.set_reminder_hour(&args.into()).await,
            UserCommands::Delete(args) => self.delete_user(&args.into()).await,
        }
    }

    pub async fn list_users(&self) -> Result<()> {
        let users = self
            .coach
            .list_users()
            .await
            .context("Failed to list users")?;
        self.renderer.render(&Users(users).to_string())
    }

    async fn show_user(&self, params: &UserId) -> Result<()> {
        let status = self
            .coach
            .user_status(params)
            .await
            .with_context(|| format!("Failed to load user {}", params.id))?;
        self.renderer.render(&status.to_string())
    }

    async fn set_access(&self, id: u64, access: bool) -> Result<()> {
        self.coach
            .set_access(&SetAccess { id, access })
            .await
            .with_context(|| format!("Failed to change access of user {id}"))?;
        let message = if access {
            format!("Granted access to user {id}")
        } else {
            format!("Revoked access of user {id}")
        };
        self.renderer
            .render(&OperationStatus::success(message).to_string())
    }

    async fn set_admin(&self, id: u64, is_admin: bool) -> Result<()> {
        self.coach
            .set_admin(&SetAdmin { id, is_admin })
            .await
            .with_context(|| format!("Failed to change admin flag of user {id}"))?;
        let message = if is_admin {
            format!("User {id} is now an admin")
        } else {
            format!("User {id} is no longer an admin")
        };
        self.renderer
            .render(&OperationStatus::success(message).to_string())
    }

    async fn reset_user(&self, params: &UserId) -> Result<()> {
        self.coach
            .reset_user(params)
            .await
            .with_context(|| format!("Failed to reset user {}", params.id))?;
        let status =
            OperationStatus::success(format!("Cleared plan and progress of user {}", params.id));
        self.renderer.render(&status.to_string())
    }

    async fn set_reminder_hour(&self, params: &SetReminderHour) -> Result<()> {
        self.coach
            .set_reminder_hour(params)
            .await
            .with_context(|| format!("Failed to set reminder hour of user {}", params.id))?;
        let status = OperationStatus::success(format!(
            "Reminders for user {} now go out at {:02}:00",
            params.id, params.hour
        ));
        self.renderer.render(&status.to_string())
    }

    async fn delete_user(&self, params: &UserId) -> Result<()> {
        let deleted = self
            .coach
            .delete_user(params)
            .await
            .with_context(|| format!("Failed to delete user {}", params.id))?;
        let status = if deleted {
            OperationStatus::success(format!("Deleted user {}", params.id))
        } else {
            OperationStatus::notice(format!("User {} does not exist", params.id))
        };
        self.renderer.render(&status.to_string())
    }

    pub async fn purge(&self, args: PurgeArgs) -> Result<()> {
        let params: PurgeInactive = args.into();
        let removed = self
            .coach
            .purge_inactive(&params)
            .await
            .context("Failed to purge inactive users")?;

        let status = if removed.is_empty() {
            OperationStatus::notice(format!(
                "No users without access were idle for more than {} days",
                params.days
            ))
        } else {
            let ids: Vec<String> = removed.iter().map(u64::to_string).collect();
            OperationStatus::success(format!(
                "Removed {} inactive users: {}",
                removed.len(),
                ids.join(", ")
            ))
        };
        self.renderer.render(&status.to_string())
    }

    pub async fn sweep(&self, args: SweepArgs) -> Result<()> {
        let report = match args.bot_token {
            Some(token) => {
                let timezone = self.coach.tracker().policy().timezone.clone();
                let (sink, delivery) = TelegramSink::spawn(Bot::new(token), timezone);
                let report = self.coach.run_sweeps(&sink).await;
                // Closing the sink lets the delivery task drain and finish.
                drop(sink);
                delivery.await.context("Notification delivery task failed")?;
                report
            }
            None => {
                warn!("no bot token configured, sweep events are only logged");
                self.coach.run_sweeps(&LogSink).await
            }
        }
        .context("Sweep failed")?;

        self.renderer
            .render(&OperationStatus::success(format!("Sweep finished: {report}")).to_string())
    }
}
