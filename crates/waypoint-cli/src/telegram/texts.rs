//! Plain-text bodies of bot messages.
//!
//! Messages are sent without a parse mode, so nothing here needs escaping.

use std::fmt::Write;

use jiff::{tz::TimeZone, Timestamp};
use waypoint_core::{
    display::LocalDate, CoachError, CurrentTask, Event, Plan, TaskView, UserStatus, UserTask,
};

pub const HELP: &str = "I help you reach a goal step by step.\n\n\
First I ask a few questions about your goal, then I put together a plan \
with a deadline for every task and remind you when a deadline comes up.\n\n\
/start - start or resume\n\
/task - show the current task\n\
/plan - show the whole plan\n\
/status - show your progress\n\
/done - mark the current task as done\n\
/postpone - get more time after a missed deadline\n\
/remind <hour> - choose the hour reminders arrive\n\
/ask - discuss the current task\n\
/reset - delete the plan and start over";

pub const NO_ACCESS: &str = "You don't have access to the bot yet. \
Please contact support to get it.";

pub const ADMIN_ONLY: &str = "This command is only available to admins.";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Use /help to see what I can do.";

pub const NO_PLAN: &str = "You don't have a plan yet. Send /start to create one.";

pub const IDLE_HINT: &str = "Use /task to see what to do next or /help for \
the list of commands.";

pub const HAS_PLAN: &str = "You already have a plan. Continue with it or \
delete it and start over?";

pub const UNFINISHED_INTERVIEW: &str = "We haven't finished talking about \
your goal yet. Continue where we stopped or start over?";

pub const CONFIRM_RESET: &str = "This deletes your goal, plan and progress. \
Are you sure?";

pub const GENERATING: &str = "Thank you! I'm putting your plan together, \
this can take a minute.";

pub const QUESTIONS_STOPPED: &str = "Glad to help. Back to work!";

pub const PLAN_FINISHED: &str = "You completed every task of your plan. \
Send /reset when you are ready for a new goal.";

/// Reply for a failed request. Internal failures get a generic apology.
pub fn error_text(err: &CoachError) -> String {
    match err {
        CoachError::NothingDue => {
            "This reminder is out of date, your task has already moved on.".to_string()
        }
        CoachError::AlreadyComplete => PLAN_FINISHED.to_string(),
        CoachError::NoPlan { .. } => NO_PLAN.to_string(),
        CoachError::Precondition { reason } => format!("That's not possible right now: {reason}."),
        CoachError::Validation { reason, .. } => format!("Invalid input: {reason}."),
        CoachError::Assistant(_) | CoachError::PlanGeneration(_) => {
            "The assistant is not available right now. \
             Please send your message again in a minute."
                .to_string()
        }
        _ => "Something went wrong on my side. Please try again later.".to_string(),
    }
}

/// The task card shown after /task, a completion or a postponement.
pub fn task_text(view: &TaskView, timezone: &TimeZone) -> String {
    let mut text = format!("Task {} of {}\n", view.step + 1, view.total);
    let _ = writeln!(text, "Stage {}: {}", view.stage_index + 1, view.stage_label);
    if let Some(substage) = &view.substage_label {
        let _ = writeln!(text, "{substage}");
    }
    let _ = write!(
        text,
        "\n{}\n\nDeadline: {}",
        view.description,
        LocalDate(&view.deadline, timezone)
    );
    text
}

pub fn current_text(current: &CurrentTask, timezone: &TimeZone) -> String {
    match current {
        CurrentTask::Active(view) => task_text(view, timezone),
        CurrentTask::Completed => PLAN_FINISHED.to_string(),
    }
}

/// The whole plan with the deadlines being tracked, which move when the
/// user postpones or finishes late.
pub fn plan_text(plan: &Plan, task: &UserTask, timezone: &TimeZone) -> String {
    let mut text = format!("Your goal: {}\n", plan.goal);
    let mut stage_shown = None;
    for flat in plan.tasks() {
        let done = flat.index < task.current_step
            || (flat.index == task.current_step && task.completed_at.is_some());
        let deadline = task.deadlines.get(flat.index);

        if stage_shown != Some(flat.stage_index) {
            stage_shown = Some(flat.stage_index);
            let _ = write!(text, "\n{}. {}", flat.stage_index + 1, flat.stage.label);
            if flat.substage.is_none() {
                write_progress(&mut text, deadline, done, timezone);
            }
            let _ = writeln!(text, "\n{}", flat.stage.description);
        }
        if let Some(substage) = flat.substage {
            let _ = write!(text, "  - {}", substage.label);
            write_progress(&mut text, deadline, done, timezone);
            let _ = writeln!(text, ": {}", substage.description);
        }
    }
    text
}

fn write_progress(text: &mut String, deadline: Option<&Timestamp>, done: bool, tz: &TimeZone) {
    if let Some(deadline) = deadline {
        let _ = write!(text, " (until {})", LocalDate(deadline, tz));
    }
    if done {
        text.push_str(" (done)");
    }
}

pub fn status_text(status: &UserStatus) -> String {
    let task = &status.task;
    let mut text = match &status.user.goal {
        Some(goal) => format!("Goal: {goal}\n"),
        None => "No goal yet.\n".to_string(),
    };
    if task.total() > 0 {
        let _ = writeln!(
            text,
            "Completed: {} of {} tasks",
            task.completed_count(),
            task.total()
        );
    }
    if let Some(CurrentTask::Active(view)) = &status.current {
        let _ = writeln!(
            text,
            "Current task: {} (deadline {})",
            view.label(),
            LocalDate(&view.deadline, &status.timezone)
        );
    }
    let _ = write!(
        text,
        "Reminders arrive at {:02}:00",
        status.user.reminder_hour
    );
    text
}

/// Message body for a notification.
pub fn event_text(event: &Event, timezone: &TimeZone) -> String {
    match event {
        Event::ReminderDue {
            label,
            description,
            deadline,
        } => format!(
            "Today ({}) is the deadline for \"{label}\".\n\n{description}\n\nDid you make it?",
            LocalDate(deadline, timezone)
        ),
        Event::DeadlinePassed {
            label,
            new_deadline,
        } => format!(
            "The deadline for \"{label}\" has passed, so I moved your deadlines. \
             New deadline: {}.",
            LocalDate(new_deadline, timezone)
        ),
        Event::PlanCompleted => format!("Congratulations! {PLAN_FINISHED}"),
        Event::CreatePlanNudge => "You have access to the bot but no plan yet. \
             Let's build one together!"
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use jiff::{civil::date, SignedDuration};
    use waypoint_core::{Stage, StageTracker, Substage, TrackerPolicy};

    use super::*;

    fn moscow() -> TimeZone {
        TimeZone::get("Europe/Moscow").unwrap()
    }

    #[test]
    fn test_task_text_with_substage() {
        let tz = moscow();
        let view = TaskView {
            step: 2,
            total: 5,
            stage_index: 1,
            stage_label: "Week 2".to_string(),
            substage_label: Some("Drafts".to_string()),
            description: "Write two chapters".to_string(),
            deadline: date(2024, 3, 10)
                .at(23, 59, 0, 0)
                .to_zoned(tz.clone())
                .unwrap()
                .timestamp(),
        };
        let text = task_text(&view, &tz);
        assert!(text.starts_with("Task 3 of 5\nStage 2: Week 2\nDrafts\n"));
        assert!(text.ends_with("Deadline: 2024-03-10"));
    }

    fn two_stage_plan() -> Plan {
        let stage = |label: &str, due| Stage {
            label: label.to_string(),
            description: format!("Work on {label}"),
            due: Some(due),
            substages: vec![],
        };
        Plan {
            goal: "Write a thesis".to_string(),
            stages: vec![stage("Research", date(2024, 2, 1)), stage("Draft", date(2024, 2, 4))],
        }
    }

    fn midnight_utc(y: i16, m: i8, d: i8) -> Timestamp {
        date(y, m, d).to_zoned(TimeZone::UTC).unwrap().timestamp()
    }

    #[test]
    fn test_plan_text() {
        let tz = moscow();
        let plan = Plan {
            goal: "Run a marathon".to_string(),
            stages: vec![
                Stage {
                    label: "Base".to_string(),
                    description: "Build mileage".to_string(),
                    due: Some(date(2024, 4, 1)),
                    substages: vec![],
                },
                Stage {
                    label: "Peak".to_string(),
                    description: "Long runs".to_string(),
                    due: None,
                    substages: vec![Substage {
                        label: "30k".to_string(),
                        description: "Run 30k once".to_string(),
                        due: Some(date(2024, 5, 1)),
                    }],
                },
            ],
        };
        let tracker = StageTracker::new(TrackerPolicy::with_timezone(tz.clone()));
        let task = tracker.start(1, &plan).unwrap();

        let text = plan_text(&plan, &task, &tz);
        assert!(text.starts_with("Your goal: Run a marathon\n"));
        assert!(text.contains("1. Base (until 2024-04-01)\nBuild mileage\n"));
        assert!(text.contains("2. Peak\nLong runs\n  - 30k (until 2024-05-01): Run 30k once\n"));
    }

    #[test]
    fn test_plan_text_shows_postponed_deadlines() {
        let plan = two_stage_plan();
        let tracker = StageTracker::default();
        let task = tracker.start(1, &plan).unwrap();
        let task = tracker
            .postpone(&task, midnight_utc(2024, 2, 2), SignedDuration::from_hours(48))
            .unwrap();

        let text = plan_text(&plan, &task, &TimeZone::UTC);
        assert!(text.contains("1. Research (until 2024-02-03)\n"));
        assert!(text.contains("2. Draft (until 2024-02-06)\n"));
        assert!(!text.contains("2024-02-01"));
        assert!(!text.contains("(done)"));
    }

    #[test]
    fn test_plan_text_marks_finished_tasks() {
        let plan = two_stage_plan();
        let tracker = StageTracker::default();
        let task = tracker.start(1, &plan).unwrap();

        // A day late: the next deadline moves by the delay plus one day.
        let (task, _) = tracker.mark_completed(&task, midnight_utc(2024, 2, 2)).unwrap();
        let text = plan_text(&plan, &task, &TimeZone::UTC);
        assert!(text.contains("1. Research (until 2024-02-01) (done)\n"));
        assert!(text.contains("2. Draft (until 2024-02-06)\n"));

        let (task, _) = tracker.mark_completed(&task, midnight_utc(2024, 2, 5)).unwrap();
        let text = plan_text(&plan, &task, &TimeZone::UTC);
        assert!(text.contains("2. Draft (until 2024-02-06) (done)\n"));
    }

    #[test]
    fn test_error_text_hides_internal_details() {
        let err = CoachError::Configuration {
            message: "secret path".to_string(),
        };
        assert!(!error_text(&err).contains("secret"));
        assert_eq!(error_text(&CoachError::NoPlan { user_id: 1 }), NO_PLAN);
    }

    #[test]
    fn test_reminder_text() {
        let tz = moscow();
        let deadline = date(2024, 3, 4)
            .at(23, 59, 0, 0)
            .to_zoned(tz.clone())
            .unwrap()
            .timestamp();
        let event = Event::ReminderDue {
            label: "Outline".to_string(),
            description: "Sketch chapters".to_string(),
            deadline,
        };
        let text = event_text(&event, &tz);
        assert!(text.starts_with("Today (2024-03-04) is the deadline for \"Outline\"."));
        assert!(text.ends_with("Did you make it?"));
    }
}
