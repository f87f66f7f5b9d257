//! Core library of the Waypoint goal coach bot.
//!
//! Users are interviewed by a language model, receive a staged plan with one
//! deadline per task, and are then kept on schedule: completing a task early
//! or late slides the remaining deadlines, reminders go out on the due day,
//! and deadlines nobody reacted to are postponed automatically.
//!
//! # Layers
//!
//! - [`tracker`]: the pure [`StageTracker`] state machine over a user's
//!   progress record
//! - [`db`]: SQLite persistence with per-user atomic updates
//! - [`coach`]: the async [`Coach`] facade used by the CLI and the bot
//! - [`llm`]: plan generation and interview guidance behind the
//!   [`PlanSource`] and [`Assistant`] traits
//! - [`display`]: markdown rendering of plans, progress and users
//!
//! Time comes from an injected [`Clock`] and outbound messages go to a
//! [`NotificationSink`], so the whole flow can be driven deterministically in
//! tests.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jiff::civil::date;
//! use waypoint_core::{
//!     models::{Plan, Stage},
//!     notify::LogSink,
//!     CoachBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coach = CoachBuilder::new()
//!     .with_database_path(Some("test.db"))
//!     .build()
//!     .await?;
//!
//! coach.register_user(42).await?;
//! let plan = Plan {
//!     goal: "Write a novel".to_string(),
//!     stages: vec![Stage {
//!         label: "Outline".to_string(),
//!         description: "Sketch every chapter".to_string(),
//!         due: Some(date(2030, 1, 10)),
//!         substages: vec![],
//!     }],
//! };
//! coach.create_plan(42, plan).await?;
//!
//! let completion = coach.complete_current(42, &LogSink).await?;
//! println!("{:?}", completion.transition);
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod coach;
pub mod db;
pub mod display;
pub mod error;
pub mod interview;
pub mod llm;
pub mod models;
pub mod notify;
pub mod params;
pub mod tracker;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use coach::{Coach, CoachBuilder, Completion, SweepReport, TaskSnapshot, UserStatus};
pub use db::Database;
pub use display::{InZone, OperationStatus, Users};
pub use error::{CoachError, Result};
pub use interview::{InterviewReply, InterviewTopic};
pub use llm::{ApiError, Assistant, OpenAiClient, OpenAiConfig, PlanSource};
pub use models::{DialogState, Plan, Progress, Stage, Substage, User, UserTask};
pub use notify::{Event, LogSink, NotificationSink, RecordingSink};
pub use params::{PurgeInactive, SetAccess, SetAdmin, SetReminderHour, UserId};
pub use tracker::{CurrentTask, StageTracker, TaskView, TrackerPolicy, Transition};
