//! Scheduled sweeps over all users who may receive notifications.
//!
//! Both sweeps are idempotent within a local day: the reminder sweep records
//! `reminded_on` and the overdue sweep records `swept_on`, and each condition
//! is re-checked inside the per-user transaction before anything changes.
//! Events are delivered after the transaction commits.

use std::fmt;

use jiff::Timestamp;

use super::Coach;
use crate::{
    error::Result,
    models::{User, UserTask},
    notify::{Event, NotificationSink},
    tracker::{CurrentTask, StageTracker},
};

/// Counts produced by one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Users looked at
    pub examined: usize,
    /// Deadline reminders sent
    pub reminded: usize,
    /// Create-a-plan nudges sent
    pub nudged: usize,
    /// Deadlines moved automatically
    pub postponed: usize,
}

impl SweepReport {
    fn merge(self, other: SweepReport) -> Self {
        Self {
            examined: self.examined.max(other.examined),
            reminded: self.reminded + other.reminded,
            nudged: self.nudged + other.nudged,
            postponed: self.postponed + other.postponed,
        }
    }

    fn count(&mut self, event: &Event) {
        match event {
            Event::ReminderDue { .. } => self.reminded += 1,
            Event::CreatePlanNudge => self.nudged += 1,
            Event::DeadlinePassed { .. } => self.postponed += 1,
            Event::PlanCompleted => {}
        }
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "examined {} users: {} reminded, {} nudged, {} postponed",
            self.examined, self.reminded, self.nudged, self.postponed
        )
    }
}

/// Decides the reminder for one user; returns the updated record and event.
fn plan_reminder(
    tracker: &StageTracker,
    user: &User,
    task: &UserTask,
    now: Timestamp,
) -> Option<(UserTask, Event)> {
    let local = now.to_zoned(tracker.policy().timezone.clone());
    let today = local.date();
    if local.hour() < i8::try_from(user.reminder_hour).unwrap_or(i8::MAX)
        || task.reminded_on == Some(today)
    {
        return None;
    }

    let event = match &user.plan {
        None if !user.dialog_state.is_interviewing() => Event::CreatePlanNudge,
        None => return None,
        Some(plan) => {
            if !tracker.is_past_due(task, now) {
                return None;
            }
            let CurrentTask::Active(view) = tracker.current_task(task, plan).ok()? else {
                return None;
            };
            Event::ReminderDue {
                label: view.label().to_string(),
                description: view.description,
                deadline: view.deadline,
            }
        }
    };

    let mut updated = task.clone();
    updated.reminded_on = Some(today);
    Some((updated, event))
}

/// Decides the automatic postponement for one user.
fn plan_postponement(
    tracker: &StageTracker,
    user: &User,
    task: &UserTask,
    now: Timestamp,
) -> Option<(UserTask, Event)> {
    let today = tracker.local_date(now);
    if task.swept_on == Some(today) || !tracker.is_overdue(task, now) {
        return None;
    }
    let plan = user.plan.as_ref()?;

    let mut updated = match tracker.postpone_default(task, now) {
        Ok(updated) => updated,
        Err(e) => {
            log::warn!("could not postpone overdue task of user {}: {e}", user.id);
            return None;
        }
    };
    updated.swept_on = Some(today);

    let label = match tracker.current_task(&updated, plan) {
        Ok(CurrentTask::Active(view)) => view.label().to_string(),
        _ => String::new(),
    };
    let new_deadline = updated.current_deadline?;
    Some((updated, Event::DeadlinePassed {
        label,
        new_deadline,
    }))
}

type SweepRule = fn(&StageTracker, &User, &UserTask, Timestamp) -> Option<(UserTask, Event)>;

impl Coach {
    /// Sends due reminders and create-a-plan nudges.
    pub async fn reminder_sweep(&self, sink: &dyn NotificationSink) -> Result<SweepReport> {
        self.sweep("reminder", plan_reminder, sink).await
    }

    /// Moves deadlines nobody reacted to and tells the users.
    pub async fn overdue_sweep(&self, sink: &dyn NotificationSink) -> Result<SweepReport> {
        self.sweep("overdue", plan_postponement, sink).await
    }

    /// Runs the overdue sweep followed by the reminder sweep.
    pub async fn run_sweeps(&self, sink: &dyn NotificationSink) -> Result<SweepReport> {
        let overdue = self.overdue_sweep(sink).await?;
        let reminders = self.reminder_sweep(sink).await?;
        Ok(overdue.merge(reminders))
    }

    async fn sweep(
        &self,
        name: &'static str,
        rule: SweepRule,
        sink: &dyn NotificationSink,
    ) -> Result<SweepReport> {
        let tracker = self.tracker.clone();
        let now = self.now();

        let (examined, events) = self
            .with_db(move |db| {
                let candidates = db.list_active_progress()?;
                let mut events = Vec::new();
                for (user, _) in &candidates {
                    // Re-read under the transaction; the listing may be stale.
                    let event = db.update_task_with(user.id, now, |user, task| {
                        Ok(match rule(&tracker, user, task, now) {
                            Some((updated, event)) => (Some(updated), Some(event)),
                            None => (None, None),
                        })
                    })?;
                    if let Some(event) = event {
                        events.push((user.id, event));
                    }
                }
                Ok((candidates.len(), events))
            })
            .await?;

        let mut report = SweepReport {
            examined,
            ..SweepReport::default()
        };
        for (user_id, event) in events {
            report.count(&event);
            sink.notify(user_id, event);
        }
        log::info!("{name} sweep {report}");
        Ok(report)
    }
}
