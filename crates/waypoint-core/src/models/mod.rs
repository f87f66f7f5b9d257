//! Data models for users, plans and progress.
//!
//! Display implementations for these models live in [`crate::display`] so the
//! data structures stay free of presentation logic. Every model formats as
//! markdown suitable both for the terminal renderer and for Telegram.
//!
//! # Plan Shape
//!
//! A [`Plan`] is a goal plus ordered [`Stage`]s. A stage either carries its
//! own due date or is split into [`Substage`]s. Progress tracking works on the
//! flattened list of leaf items returned by [`Plan::tasks`]:
//!
//! ```rust
//! use waypoint_core::models::{Plan, Stage, Substage};
//! use jiff::civil::date;
//!
//! let plan = Plan {
//!     goal: "Run a half marathon".to_string(),
//!     stages: vec![
//!         Stage {
//!             label: "Week 1".to_string(),
//!             description: "Build a base".to_string(),
//!             due: None,
//!             substages: vec![
//!                 Substage {
//!                     label: "Day 1".to_string(),
//!                     description: "Run 3 km".to_string(),
//!                     due: Some(date(2025, 1, 5)),
//!                 },
//!                 Substage {
//!                     label: "Day 3".to_string(),
//!                     description: "Run 4 km".to_string(),
//!                     due: Some(date(2025, 1, 8)),
//!                 },
//!             ],
//!         },
//!         Stage {
//!             label: "Week 2".to_string(),
//!             description: "Run 10 km".to_string(),
//!             due: Some(date(2025, 1, 12)),
//!             substages: vec![],
//!         },
//!     ],
//! };
//!
//! assert_eq!(plan.task_count(), 3);
//! assert_eq!(plan.tasks()[2].label(), "Week 2");
//! ```

pub mod dialog;
pub mod plan;
pub mod task;
pub mod user;


pub use dialog::{ChatRole, ChatTurn, DialogState};
pub use plan::{FlatTask, Plan, Stage, Substage};
pub use task::{Progress, UserTask};
pub use user::{User, DEFAULT_REMINDER_HOUR};
