//! Plan progress operations for the Coach.
//!
//! Every mutation goes through [`Database::update_task_with`], so reading the
//! record, running the tracker and writing the result happen inside one
//! IMMEDIATE transaction per user.
//!
//! [`Database::update_task_with`]: crate::db::Database::update_task_with

use jiff::SignedDuration;

use super::Coach;
use crate::{
    error::{CoachError, Result},
    models::{DialogState, Plan, User, UserTask},
    notify::{Event, NotificationSink},
    params::UserId,
    tracker::{CurrentTask, Transition},
};

/// A user's plan, progress record and the task they are on.
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub plan: Plan,
    pub task: UserTask,
    pub current: CurrentTask,
}

/// Outcome of completing a task.
#[derive(Debug, Clone)]
pub struct Completion {
    pub transition: Transition,
    pub task: UserTask,
    /// The task now active, or `Completed`
    pub next: CurrentTask,
}

/// A user together with their progress record.
#[derive(Debug, Clone)]
pub struct UserStatus {
    pub user: User,
    pub task: UserTask,
    /// The active task when the user has an unfinished plan
    pub current: Option<CurrentTask>,
    pub timezone: jiff::tz::TimeZone,
}

fn plan_of(user: &User) -> Result<&Plan> {
    user.plan
        .as_ref()
        .ok_or(CoachError::NoPlan { user_id: user.id })
}

impl Coach {
    /// Stores a generated plan and starts tracking it.
    ///
    /// The plan is validated first; a malformed plan stores nothing. An
    /// existing plan is never replaced, reset the user first.
    pub async fn create_plan(&self, id: u64, plan: Plan) -> Result<UserTask> {
        self.store_new_plan(id, plan, None).await
    }

    /// Stores a plan unless the user already has one or, with `expected`
    /// set, has left that dialog state in the meantime.
    pub(super) async fn store_new_plan(
        &self,
        id: u64,
        plan: Plan,
        expected: Option<DialogState>,
    ) -> Result<UserTask> {
        let task = self.tracker.start(id, &plan)?;
        let now = self.now();
        let stored = task.clone();
        self.with_db(move |db| {
            if db.store_plan(id, &plan, &stored, now, expected)? {
                log::info!("stored plan with {} tasks for user {id}", stored.total());
                Ok(())
            } else {
                Err(CoachError::UserNotFound { id })
            }
        })
        .await?;
        Ok(task)
    }

    /// The task a user is currently working on.
    pub async fn current_task(&self, id: u64) -> Result<TaskSnapshot> {
        let tracker = self.tracker.clone();
        self.with_db(move |db| {
            let user = db.get_user(id)?.ok_or(CoachError::UserNotFound { id })?;
            let plan = plan_of(&user)?.clone();
            let task = db.get_task(id)?.unwrap_or_else(|| UserTask::empty(id));
            let current = tracker.current_task(&task, &plan)?;
            Ok(TaskSnapshot {
                plan,
                task,
                current,
            })
        })
        .await
    }

    /// Summary of a user's state for status screens.
    pub async fn user_status(&self, params: &UserId) -> Result<UserStatus> {
        let id = params.id;
        let tracker = self.tracker.clone();
        self.with_db(move |db| {
            let user = db.get_user(id)?.ok_or(CoachError::UserNotFound { id })?;
            let task = db.get_task(id)?.unwrap_or_else(|| UserTask::empty(id));
            let current = match &user.plan {
                Some(plan) if !task.deadlines.is_empty() => {
                    Some(tracker.current_task(&task, plan)?)
                }
                _ => None,
            };
            Ok(UserStatus {
                user,
                task,
                current,
                timezone: tracker.policy().timezone.clone(),
            })
        })
        .await
    }

    /// Completes the current task whenever the user says so.
    pub async fn complete_current(&self, id: u64, sink: &dyn NotificationSink) -> Result<Completion> {
        self.complete(id, false, sink).await
    }

    /// Completes the current task from a reminder button.
    ///
    /// Fails with [`CoachError::NothingDue`] when the current task is not due,
    /// which happens when the tracker already advanced or a sweep moved the
    /// deadline since the reminder was sent.
    pub async fn confirm_due_completion(
        &self,
        id: u64,
        sink: &dyn NotificationSink,
    ) -> Result<Completion> {
        self.complete(id, true, sink).await
    }

    async fn complete(&self, id: u64, require_due: bool, sink: &dyn NotificationSink) -> Result<Completion> {
        let tracker = self.tracker.clone();
        let now = self.now();
        let completion = self
            .with_db(move |db| {
                db.update_task_with(id, now, |user, task| {
                    let plan = plan_of(user)?;
                    if require_due && !task.is_complete() && !tracker.is_past_due(task, now) {
                        return Err(CoachError::NothingDue);
                    }
                    let (next_task, transition) = tracker.mark_completed(task, now)?;
                    let next = tracker.current_task(&next_task, plan)?;
                    Ok((
                        Some(next_task.clone()),
                        Completion {
                            transition,
                            task: next_task,
                            next,
                        },
                    ))
                })
            })
            .await?;

        match completion.transition {
            Transition::Advanced { step } => log::info!("user {id} advanced to step {step}"),
            Transition::Finished => {
                log::info!("user {id} completed their plan");
                sink.notify(id, Event::PlanCompleted);
            }
        }
        Ok(completion)
    }

    /// Gives the user more time for the current task.
    ///
    /// `offset` defaults to the policy's postpone offset.
    pub async fn postpone_current(&self, id: u64, offset: Option<SignedDuration>) -> Result<UserTask> {
        let tracker = self.tracker.clone();
        let offset = offset.unwrap_or(tracker.policy().postpone_offset);
        let now = self.now();
        let task = self
            .with_db(move |db| {
                db.update_task_with(id, now, |_, task| {
                    let next = tracker.postpone(task, now, offset)?;
                    Ok((Some(next.clone()), next))
                })
            })
            .await?;
        log::info!("user {id} postponed step {} by {offset}", task.current_step);
        Ok(task)
    }
}
