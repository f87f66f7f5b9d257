//! Builder for creating and configuring Coach instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::task;

use super::Coach;
use crate::{
    clock::{Clock, SystemClock},
    db::Database,
    error::{join_error, CoachError, Result},
    tracker::{StageTracker, TrackerPolicy},
};

/// Builder for creating and configuring Coach instances.
#[derive(Clone)]
pub struct CoachBuilder {
    database_path: Option<PathBuf>,
    clock: Option<Arc<dyn Clock>>,
    policy: TrackerPolicy,
}

impl CoachBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            clock: None,
            policy: TrackerPolicy::default(),
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/waypoint/waypoint.db` or
    /// `~/.local/share/waypoint/waypoint.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Replaces the wall clock, e.g. with a `ManualClock` in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the deadline policy (timezone, offsets).
    pub fn with_policy(mut self, policy: TrackerPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the configured coach instance.
    ///
    /// # Errors
    ///
    /// Returns `CoachError::FileSystem` if the database directory cannot be
    /// created, `CoachError::XdgDirectory` if no default location exists and
    /// `CoachError::Database` if schema initialization fails.
    pub async fn build(self) -> Result<Coach> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CoachError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), CoachError>(())
        })
        .await
        .map_err(join_error)??;

        log::debug!("using database at {}", db_path.display());
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        Ok(Coach::new(db_path, clock, StageTracker::new(self.policy)))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("waypoint")
            .place_data_file("waypoint.db")
            .map_err(|e| CoachError::XdgDirectory(e.to_string()))
    }
}

impl Default for CoachBuilder {
    fn default() -> Self {
        Self::new()
    }
}
