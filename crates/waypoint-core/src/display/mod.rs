//! Display formatting for plans, progress and users.
//!
//! Domain models implement [`std::fmt::Display`] directly where they carry
//! everything needed to render themselves. Anything containing a deadline
//! needs a timezone as well, so it is rendered through the [`InZone`]
//! wrapper. All output is markdown, rendered by the CLI's terminal renderer.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ InZone / Users  │    │   Formatted     │
//! │ (Plan, UserTask)│───▶│ OperationStatus │───▶│    Output       │
//! │                 │    │                 │    │   (Terminal)    │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: Collection wrapper types (Users)
//! - [`status`]: Status and confirmation messages (OperationStatus)
//! - [`datetime`]: Date/time formatting in an explicit timezone
//! - [`models`]: Display implementations for domain models
//!
//! ## Usage
//!
//! ```rust
//! use jiff::{civil::date, tz::TimeZone};
//! use waypoint_core::{
//!     display::InZone,
//!     models::{Plan, Stage},
//!     tracker::StageTracker,
//! };
//!
//! let plan = Plan {
//!     goal: "Read ten books".to_string(),
//!     stages: vec![Stage {
//!         label: "Month 1".to_string(),
//!         description: "Two novels".to_string(),
//!         due: Some(date(2025, 2, 1)),
//!         substages: vec![],
//!     }],
//! };
//! let task = StageTracker::default().start(7, &plan).unwrap();
//!
//! assert!(plan.to_string().contains("# Read ten books"));
//! let progress = InZone(&task, &TimeZone::UTC).to_string();
//! assert!(progress.contains("2025-02-01"));
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod status;

pub use collections::Users;
pub use datetime::{InZone, LocalDate, LocalDateTime};
pub use status::OperationStatus;
