//! Display implementations for domain models.
//!
//! Kept apart from the model definitions so the data structures stay free of
//! presentation logic. Types holding deadlines render through [`InZone`].

use std::fmt;

use super::datetime::{InZone, LocalDate, LocalDateTime};
use crate::{
    coach::UserStatus,
    interview::InterviewTopic,
    models::{DialogState, Plan, Progress, Stage, User, UserTask},
    tracker::{CurrentTask, TaskView},
};

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogState::Idle => write!(f, "idle"),
            DialogState::Interview(topic) => write!(f, "interview ({topic})"),
            DialogState::AskingQuestion => write!(f, "asking questions"),
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::NoPlan => write!(f, "no plan"),
            Progress::InProgress { step, total } => write!(f, "task {} of {total}", step + 1),
            Progress::Completed { total } => write!(f, "completed ({total} tasks)"),
        }
    }
}

impl Stage {
    fn fmt_stage(&self, number: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {number}. {}", self.label)?;
        writeln!(f)?;
        writeln!(f, "{}", self.description)?;
        writeln!(f)?;

        if self.substages.is_empty() {
            if let Some(due) = self.due {
                writeln!(f, "- Due: {due}")?;
                writeln!(f)?;
            }
            return Ok(());
        }

        for substage in &self.substages {
            match substage.due {
                Some(due) => writeln!(
                    f,
                    "- **{}** (due {due}): {}",
                    substage.label, substage.description
                )?,
                None => writeln!(f, "- **{}**: {}", substage.label, substage.description)?,
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.goal)?;
        writeln!(f)?;

        if self.stages.is_empty() {
            return writeln!(f, "No stages in this plan.");
        }
        for (i, stage) in self.stages.iter().enumerate() {
            stage.fmt_stage(i + 1, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for InZone<'_, TaskView> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let InZone(view, tz) = self;
        match &view.substage_label {
            Some(sub) => writeln!(
                f,
                "### {} / {sub} ({}/{})",
                view.stage_label,
                view.step + 1,
                view.total
            )?,
            None => writeln!(f, "### {} ({}/{})", view.stage_label, view.step + 1, view.total)?,
        }
        writeln!(f)?;
        writeln!(f, "{}", view.description)?;
        writeln!(f)?;
        writeln!(f, "- Deadline: {}", LocalDate(&view.deadline, tz))
    }
}

impl fmt::Display for InZone<'_, CurrentTask> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            CurrentTask::Active(view) => write!(f, "{}", InZone(view, self.1)),
            CurrentTask::Completed => writeln!(f, "Every task of the plan is done."),
        }
    }
}

impl fmt::Display for InZone<'_, UserTask> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let InZone(task, tz) = self;
        writeln!(f, "- Progress: {}", task.progress())?;
        if task.deadlines.is_empty() {
            return Ok(());
        }

        let dates: Vec<String> = task
            .deadlines
            .iter()
            .enumerate()
            .map(|(i, deadline)| {
                let date = LocalDate(deadline, tz).to_string();
                if i < task.completed_count() {
                    format!("~~{date}~~")
                } else {
                    date
                }
            })
            .collect();
        writeln!(f, "- Deadlines: {}", dates.join(", "))?;
        if let Some(completed_at) = &task.completed_at {
            writeln!(f, "- Completed: {}", LocalDateTime(completed_at, tz))?;
        }
        if let Some(day) = task.reminded_on {
            writeln!(f, "- Last reminder: {day}")?;
        }
        if let Some(day) = task.swept_on {
            writeln!(f, "- Last automatic postponement: {day}")?;
        }
        Ok(())
    }
}

impl User {
    fn role(&self) -> &'static str {
        match (self.is_admin, self.access) {
            (true, _) => "admin",
            (false, true) => "member",
            (false, false) => "no access",
        }
    }

    fn fmt_user(&self, f: &mut fmt::Formatter<'_>, tz: &jiff::tz::TimeZone) -> fmt::Result {
        writeln!(f, "## User {} ({})", self.id, self.role())?;
        writeln!(f)?;
        if let Some(goal) = &self.goal {
            writeln!(f, "- Goal: {goal}")?;
        }
        writeln!(f, "- Dialog: {}", self.dialog_state)?;
        if let DialogState::Interview(topic) = self.dialog_state {
            writeln!(f, "- Interview: {}", interview_position(topic))?;
        }
        writeln!(f, "- Reminder hour: {:02}:00", self.reminder_hour)?;
        writeln!(f, "- Registered: {}", LocalDateTime(&self.created_at, tz))?;
        writeln!(f, "- Last active: {}", LocalDateTime(&self.last_active_at, tz))
    }
}

fn interview_position(topic: InterviewTopic) -> String {
    let position = InterviewTopic::ALL
        .iter()
        .position(|t| *t == topic)
        .unwrap_or_default();
    format!("question {} of {}", position + 1, InterviewTopic::ALL.len())
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_user(f, &jiff::tz::TimeZone::UTC)
    }
}

impl fmt::Display for InZone<'_, User> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_user(f, self.1)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", InZone(&self.user, &self.timezone))?;
        write!(f, "{}", InZone(&self.task, &self.timezone))?;
        if let Some(current) = &self.current {
            writeln!(f)?;
            write!(f, "{}", InZone(current, &self.timezone))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::{civil::date, tz::TimeZone, Timestamp};

    use super::*;
    use crate::{
        models::Substage,
        tracker::{StageTracker, TrackerPolicy},
    };

    fn create_test_plan() -> Plan {
        Plan {
            goal: "Learn to swim".to_string(),
            stages: vec![
                Stage {
                    label: "Week 1".to_string(),
                    description: "Get comfortable in water".to_string(),
                    due: None,
                    substages: vec![
                        Substage {
                            label: "Floating".to_string(),
                            description: "Float for a minute".to_string(),
                            due: Some(date(2024, 6, 3)),
                        },
                        Substage {
                            label: "Breathing".to_string(),
                            description: "Breathe out under water".to_string(),
                            due: Some(date(2024, 6, 6)),
                        },
                    ],
                },
                Stage {
                    label: "Week 2".to_string(),
                    description: "Swim one length".to_string(),
                    due: Some(date(2024, 6, 14)),
                    substages: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_plan_display_lists_stages_and_substages() {
        let output = create_test_plan().to_string();

        assert!(output.starts_with("# Learn to swim\n"));
        assert!(output.contains("## 1. Week 1"));
        assert!(output.contains("- **Floating** (due 2024-06-03): Float for a minute"));
        assert!(output.contains("## 2. Week 2"));
        assert!(output.contains("- Due: 2024-06-14"));
    }

    #[test]
    fn test_current_task_display() {
        let tz = TimeZone::UTC;
        let plan = create_test_plan();
        let tracker = StageTracker::new(TrackerPolicy::with_timezone(tz.clone()));
        let task = tracker.start(1, &plan).unwrap();
        let current = tracker.current_task(&task, &plan).unwrap();

        let output = InZone(&current, &tz).to_string();
        assert!(output.contains("### Week 1 / Floating (1/3)"));
        assert!(output.contains("- Deadline: 2024-06-03"));

        let done = InZone(&CurrentTask::Completed, &tz).to_string();
        assert_eq!(done, "Every task of the plan is done.\n");
    }

    #[test]
    fn test_progress_strikes_completed_deadlines() {
        let tz = TimeZone::UTC;
        let plan = create_test_plan();
        let tracker = StageTracker::new(TrackerPolicy::with_timezone(tz.clone()));
        let task = tracker.start(1, &plan).unwrap();
        let early = date(2024, 6, 1).to_zoned(tz.clone()).unwrap().timestamp();
        let (task, _) = tracker.mark_completed(&task, early).unwrap();

        let output = InZone(&task, &tz).to_string();
        assert!(output.contains("- Progress: task 2 of 3"));
        assert!(output.contains("- Deadlines: ~~2024-06-01~~, 2024-06-05, 2024-06-13"));
    }

    #[test]
    fn test_user_display() {
        let mut user = User::new(42, Timestamp::from_second(1_704_067_200).unwrap());
        user.access = true;
        user.goal = Some("Learn to swim".to_string());
        user.dialog_state = DialogState::Interview(InterviewTopic::Goal);

        let output = user.to_string();
        assert!(output.contains("## User 42 (member)"));
        assert!(output.contains("- Goal: Learn to swim"));
        assert!(output.contains("- Dialog: interview (goal)"));
        assert!(output.contains("- Interview: question 3 of 6"));
        assert!(output.contains("- Reminder hour: 12:00"));
        assert!(output.contains("- Registered: 2024-01-01 00:00 UTC"));
    }

    #[test]
    fn test_progress_display() {
        assert_eq!(Progress::NoPlan.to_string(), "no plan");
        assert_eq!(
            Progress::InProgress { step: 0, total: 4 }.to_string(),
            "task 1 of 4"
        );
        assert_eq!(
            Progress::Completed { total: 4 }.to_string(),
            "completed (4 tasks)"
        );
    }
}
