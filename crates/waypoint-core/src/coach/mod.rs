//! High-level async API of the bot backend.
//!
//! [`Coach`] is the single entry point the CLI and the Telegram bot use. It
//! owns the database location, the injected [`Clock`] and the
//! [`StageTracker`] policy. Every operation opens its own [`Database`]
//! connection on the blocking thread pool, so a `Coach` is cheap to clone and
//! share between handlers.
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for [`Coach`] instances
//! - [`user_ops`]: Registration, access control, dialog state, purge
//! - [`progress_ops`]: Plan creation, completion and postponement
//! - [`interview_ops`]: The LLM interview and question mode
//! - [`sweep_ops`]: Scheduled reminder and overdue sweeps
//!
//! # Usage
//!
//! ```rust,no_run
//! use waypoint_core::{params::UserId, CoachBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coach = CoachBuilder::new()
//!     .with_database_path(Some("/tmp/waypoint.db"))
//!     .build()
//!     .await?;
//!
//! coach.register_user(42).await?;
//! let status = coach.user_status(&UserId { id: 42 }).await?;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```

use std::{path::PathBuf, sync::Arc};

use jiff::{civil::Date, Timestamp};
use tokio::task;

use crate::{
    clock::Clock,
    db::Database,
    error::{join_error, Result},
    tracker::StageTracker,
};

pub mod builder;
pub mod interview_ops;
pub mod progress_ops;
pub mod sweep_ops;
pub mod user_ops;


pub use builder::CoachBuilder;
pub use progress_ops::{Completion, TaskSnapshot, UserStatus};
pub use sweep_ops::SweepReport;

/// Main interface for managing users and their plan progress.
#[derive(Clone)]
pub struct Coach {
    pub(crate) db_path: PathBuf,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) tracker: StageTracker,
}

impl Coach {
    pub(crate) fn new(db_path: PathBuf, clock: Arc<dyn Clock>, tracker: StageTracker) -> Self {
        Self {
            db_path,
            clock,
            tracker,
        }
    }

    /// Path of the SQLite file backing this instance.
    pub fn database_path(&self) -> &std::path::Path {
        &self.db_path
    }

    pub fn tracker(&self) -> &StageTracker {
        &self.tracker
    }

    /// Current instant according to the injected clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Current civil date in the tracker's timezone.
    pub fn today(&self) -> Date {
        self.tracker.local_date(self.now())
    }

    /// Runs `f` against a fresh connection on the blocking pool.
    pub(crate) async fn with_db<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            f(&mut db)
        })
        .await
        .map_err(join_error)?
    }
}

impl std::fmt::Debug for Coach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coach")
            .field("db_path", &self.db_path)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}
