//! Stage and deadline progression for a single user.
//!
//! [`StageTracker`] is a pure state-transition engine over a [`UserTask`]:
//! every operation takes the current record by reference and returns a new
//! one, so a failed transition leaves the caller's state untouched. Storage,
//! locking and notification happen around it in [`crate::coach`].
//!
//! ```text
//!            start              mark_completed            mark_completed (last)
//!  NoPlan ─────────▶ InProgress(0) ─────────▶ InProgress(k) ─────────▶ Completed
//!                                               │    ▲
//!                                               └────┘ postpone
//! ```
//!
//! Date comparisons (`is_past_due`, `is_overdue`) use the civil date in the
//! policy's timezone; `postpone` compares exact instants.

use jiff::{civil::Date, tz::TimeZone, SignedDuration, Timestamp};

use crate::{
    error::{CoachError, Result},
    models::{FlatTask, Plan, UserTask},
};

#[cfg(test)]
mod tests;

const ONE_DAY: SignedDuration = SignedDuration::from_hours(24);

/// Tunable parameters of deadline arithmetic.
#[derive(Debug, Clone)]
pub struct TrackerPolicy {
    /// Timezone in which deadlines fall at the start of a day
    pub timezone: TimeZone,
    /// Default extension granted by a postponement
    pub postpone_offset: SignedDuration,
    /// Gap between a completion and the re-anchored next deadline
    pub completion_grace: SignedDuration,
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self {
            timezone: TimeZone::UTC,
            postpone_offset: ONE_DAY * 2,
            completion_grace: ONE_DAY,
        }
    }
}

impl TrackerPolicy {
    /// Default policy evaluated in the given timezone.
    pub fn with_timezone(timezone: TimeZone) -> Self {
        Self {
            timezone,
            ..Self::default()
        }
    }
}

/// The task a user is currently working on.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
    /// Index into the flattened task list
    pub step: usize,
    /// Number of flattened tasks
    pub total: usize,
    /// Zero-based index of the owning stage
    pub stage_index: usize,
    pub stage_label: String,
    pub substage_label: Option<String>,
    pub description: String,
    pub deadline: Timestamp,
}

impl TaskView {
    fn from_flat(task: &FlatTask<'_>, total: usize, deadline: Timestamp) -> Self {
        Self {
            step: task.index,
            total,
            stage_index: task.stage_index,
            stage_label: task.stage.label.clone(),
            substage_label: task.substage.map(|s| s.label.clone()),
            description: task.description().to_string(),
            deadline,
        }
    }

    /// Label of the leaf item, the substage when there is one.
    pub fn label(&self) -> &str {
        self.substage_label.as_deref().unwrap_or(&self.stage_label)
    }
}

/// Result of [`StageTracker::current_task`].
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentTask {
    Active(TaskView),
    /// Every task is done
    Completed,
}

/// What a successful `mark_completed` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Moved on to the task at `step`
    Advanced { step: usize },
    /// The last task was completed
    Finished,
}

/// Pure state machine computing progress and deadline shifts.
#[derive(Debug, Clone, Default)]
pub struct StageTracker {
    policy: TrackerPolicy,
}

impl StageTracker {
    pub fn new(policy: TrackerPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TrackerPolicy {
        &self.policy
    }

    /// Local civil date of an instant.
    pub fn local_date(&self, at: Timestamp) -> Date {
        at.to_zoned(self.policy.timezone.clone()).date()
    }

    /// Builds the initial record for a freshly generated plan.
    ///
    /// Each leaf's due date becomes a deadline at the start of that day in the
    /// policy's timezone.
    pub fn start(&self, user_id: u64, plan: &Plan) -> Result<UserTask> {
        let tasks = plan.tasks();
        if tasks.is_empty() {
            return Err(CoachError::validation("plan").with_reason("plan has no tasks"));
        }

        let deadlines = tasks
            .iter()
            .map(|task| {
                let due = task.due().ok_or_else(|| {
                    CoachError::validation("deadlines")
                        .with_reason(format!("task '{}' has no due date", task.label()))
                })?;
                due.to_zoned(self.policy.timezone.clone())
                    .map(|zoned| zoned.timestamp())
                    .map_err(|e| {
                        CoachError::validation("deadlines")
                            .with_reason(format!("cannot place {due} in timezone: {e}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut task = UserTask::empty(user_id);
        task.deadlines = deadlines;
        task.sync_current_deadline();
        task.check_invariants()?;
        Ok(task)
    }

    /// Identifies the task at `current_step`.
    pub fn current_task(&self, task: &UserTask, plan: &Plan) -> Result<CurrentTask> {
        if task.deadlines.is_empty() {
            return Err(CoachError::NoPlan {
                user_id: task.user_id,
            });
        }
        let flat = plan.tasks();
        if flat.len() != task.deadlines.len() {
            return Err(CoachError::validation("deadlines").with_reason(format!(
                "plan has {} tasks but {} deadlines are tracked",
                flat.len(),
                task.deadlines.len()
            )));
        }
        if task.is_complete() {
            return Ok(CurrentTask::Completed);
        }

        let step = task.current_step;
        Ok(CurrentTask::Active(TaskView::from_flat(
            &flat[step],
            flat.len(),
            task.deadlines[step],
        )))
    }

    /// Completes the current task.
    ///
    /// Completing the last task finishes the plan without touching deadlines.
    /// Otherwise every later deadline slides by the same amount so that the
    /// next one lands `completion_grace` after `now`, preserving the spacing
    /// between the remaining tasks.
    pub fn mark_completed(&self, task: &UserTask, now: Timestamp) -> Result<(UserTask, Transition)> {
        self.ensure_active(task)?;
        let step = task.current_step;
        let mut next = task.clone();

        if step + 1 == task.deadlines.len() {
            next.completed_at = Some(now);
            next.sync_current_deadline();
            return Ok((next, Transition::Finished));
        }

        let shift = now
            .duration_since(task.deadlines[step])
            .checked_add(self.policy.completion_grace)
            .ok_or_else(|| CoachError::validation("deadlines").with_reason("shift overflows"))?;

        // Finishing early pulls the completed deadline back to the completion
        // instant, never before the previous one.
        let floor = step
            .checked_sub(1)
            .map_or(Timestamp::MIN, |prev| task.deadlines[prev]);
        next.deadlines[step] = task.deadlines[step].min(now).max(floor);

        for deadline in &mut next.deadlines[step + 1..] {
            *deadline = shift_by(*deadline, shift)?;
        }
        next.current_step = step + 1;
        next.sync_current_deadline();
        next.reminded_on = None;
        next.swept_on = None;
        next.check_invariants()?;
        let step = next.current_step;
        Ok((next, Transition::Advanced { step }))
    }

    /// Extends the current and every later deadline by `offset`.
    ///
    /// Only allowed once the current deadline has passed.
    pub fn postpone(&self, task: &UserTask, now: Timestamp, offset: SignedDuration) -> Result<UserTask> {
        self.ensure_active(task)?;
        if !offset.is_positive() {
            return Err(CoachError::validation("offset").with_reason("must be positive"));
        }
        let step = task.current_step;
        let deadline = task.deadlines[step];
        if now < deadline {
            return Err(CoachError::precondition(format!(
                "current deadline {deadline} has not passed yet"
            )));
        }

        let mut next = task.clone();
        for deadline in &mut next.deadlines[step..] {
            *deadline = shift_by(*deadline, offset)?;
        }
        next.sync_current_deadline();
        next.check_invariants()?;
        Ok(next)
    }

    /// Postpones by the policy's default offset.
    pub fn postpone_default(&self, task: &UserTask, now: Timestamp) -> Result<UserTask> {
        self.postpone(task, now, self.policy.postpone_offset)
    }

    /// Whether the current deadline falls today or earlier.
    pub fn is_past_due(&self, task: &UserTask, now: Timestamp) -> bool {
        self.active_deadline(task)
            .is_some_and(|deadline| self.local_date(deadline) <= self.local_date(now))
    }

    /// Whether the current deadline's day is already over.
    pub fn is_overdue(&self, task: &UserTask, now: Timestamp) -> bool {
        self.active_deadline(task)
            .is_some_and(|deadline| self.local_date(deadline) < self.local_date(now))
    }

    fn active_deadline(&self, task: &UserTask) -> Option<Timestamp> {
        if task.is_complete() {
            return None;
        }
        task.deadlines.get(task.current_step).copied()
    }

    fn ensure_active(&self, task: &UserTask) -> Result<()> {
        if task.deadlines.is_empty() {
            return Err(CoachError::NoPlan {
                user_id: task.user_id,
            });
        }
        if task.is_complete() {
            return Err(CoachError::AlreadyComplete);
        }
        Ok(())
    }
}

fn shift_by(at: Timestamp, by: SignedDuration) -> Result<Timestamp> {
    at.checked_add(by).map_err(|e| {
        CoachError::validation("deadlines").with_reason(format!("cannot shift {at} by {by}: {e}"))
    })
}
