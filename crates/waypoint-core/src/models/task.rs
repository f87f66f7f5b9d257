//! Per-user progress record.

use jiff::{civil::Date, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::{CoachError, Result};

/// Progress of one user through the flattened task list of their plan.
///
/// An empty `deadlines` list means the user has no plan yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserTask {
    /// Telegram user id owning the record
    pub user_id: u64,

    /// Index of the next incomplete task
    pub current_step: usize,

    /// One deadline per flattened task, non-decreasing
    pub deadlines: Vec<Timestamp>,

    /// Cached `deadlines[current_step]`
    pub current_deadline: Option<Timestamp>,

    /// Set once the last task has been completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    /// Local date of the last deadline reminder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminded_on: Option<Date>,

    /// Local date of the last automatic postponement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swept_on: Option<Date>,
}

/// Coarse state of a user's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// No plan has been generated
    NoPlan,
    /// Working on task `step` out of `total`
    InProgress { step: usize, total: usize },
    /// Every task is done
    Completed { total: usize },
}

impl UserTask {
    /// A record in the `NoPlan` state.
    pub fn empty(user_id: u64) -> Self {
        Self {
            user_id,
            current_step: 0,
            deadlines: Vec::new(),
            current_deadline: None,
            completed_at: None,
            reminded_on: None,
            swept_on: None,
        }
    }

    /// Number of tracked tasks.
    pub fn total(&self) -> usize {
        self.deadlines.len()
    }

    /// Whether the plan has been finished.
    pub fn is_complete(&self) -> bool {
        !self.deadlines.is_empty()
            && (self.completed_at.is_some() || self.current_step >= self.deadlines.len())
    }

    /// Current coarse progress state.
    pub fn progress(&self) -> Progress {
        if self.deadlines.is_empty() {
            Progress::NoPlan
        } else if self.is_complete() {
            Progress::Completed {
                total: self.total(),
            }
        } else {
            Progress::InProgress {
                step: self.current_step,
                total: self.total(),
            }
        }
    }

    /// Number of tasks completed so far.
    pub fn completed_count(&self) -> usize {
        if self.completed_at.is_some() {
            self.total()
        } else {
            self.current_step.min(self.total())
        }
    }

    /// Recomputes the cached current deadline from the list.
    pub(crate) fn sync_current_deadline(&mut self) {
        self.current_deadline = self.deadlines.get(self.current_step).copied();
    }

    /// Checks the structural invariants of the record.
    pub fn check_invariants(&self) -> Result<()> {
        if self.current_step > self.deadlines.len() {
            return Err(CoachError::validation("current_step").with_reason(format!(
                "step {} exceeds {} tasks",
                self.current_step,
                self.deadlines.len()
            )));
        }
        if let Some(pair) = self.deadlines.windows(2).find(|pair| pair[0] > pair[1]) {
            return Err(CoachError::validation("deadlines")
                .with_reason(format!("deadline {} precedes {}", pair[1], pair[0])));
        }
        if self.current_deadline != self.deadlines.get(self.current_step).copied() {
            return Err(CoachError::validation("current_deadline")
                .with_reason("cached deadline does not match the current step"));
        }
        Ok(())
    }
}
