//! Inline keyboards and the callback data they carry.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use waypoint_core::Event;

pub const TASK_DONE: &str = "task_done";
pub const DUE_DONE: &str = "due_done";
pub const POSTPONE: &str = "postpone";
pub const RESET_CONFIRM: &str = "reset_confirm";
pub const CONTINUE_INTERVIEW: &str = "continue_interview";
pub const SHOW_TASK: &str = "show_task";
pub const ASK_QUESTION: &str = "ask_question";
pub const STOP_QUESTION: &str = "stop_question";

fn column(buttons: &[(&str, &str)]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        buttons
            .iter()
            .map(|(text, data)| vec![InlineKeyboardButton::callback(*text, *data)]),
    )
}

/// Actions on the task the user is working on.
pub fn task_actions() -> InlineKeyboardMarkup {
    column(&[
        ("Ask a question", ASK_QUESTION),
        ("Mark as done", TASK_DONE),
    ])
}

/// Attached to deadline reminders.
pub fn reminder() -> InlineKeyboardMarkup {
    column(&[
        ("Task done!", DUE_DONE),
        ("I need more time", POSTPONE),
    ])
}

/// Offered when the user comes back to an interrupted interview.
pub fn unfinished_interview() -> InlineKeyboardMarkup {
    column(&[
        ("Continue", CONTINUE_INTERVIEW),
        ("Start over", RESET_CONFIRM),
    ])
}

/// Offered when the user already has a plan.
pub fn existing_plan() -> InlineKeyboardMarkup {
    column(&[
        ("Continue with my plan", SHOW_TASK),
        ("Delete it and start over", RESET_CONFIRM),
    ])
}

pub fn reset_confirmation() -> InlineKeyboardMarkup {
    column(&[("Yes, delete my plan", RESET_CONFIRM)])
}

pub fn create_plan() -> InlineKeyboardMarkup {
    column(&[("Create my plan", CONTINUE_INTERVIEW)])
}

pub fn stop_questions() -> InlineKeyboardMarkup {
    column(&[("Stop the discussion", STOP_QUESTION)])
}

/// A link to the support chat, when one is configured and valid.
pub fn support(url: Option<&str>) -> Option<InlineKeyboardMarkup> {
    let url = url?.parse::<reqwest::Url>().ok()?;
    Some(InlineKeyboardMarkup::new([[InlineKeyboardButton::url(
        "Support", url,
    )]]))
}

/// Buttons sent along with a notification.
pub fn for_event(event: &Event) -> Option<InlineKeyboardMarkup> {
    match event {
        Event::ReminderDue { .. } => Some(reminder()),
        Event::DeadlinePassed { .. } => Some(task_actions()),
        Event::CreatePlanNudge => Some(create_plan()),
        Event::PlanCompleted => None,
    }
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    fn callback_data(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_reminder_buttons() {
        assert_eq!(callback_data(&reminder()), vec![DUE_DONE, POSTPONE]);
    }

    #[test]
    fn test_event_keyboards() {
        assert!(for_event(&Event::PlanCompleted).is_none());
        let nudge = for_event(&Event::CreatePlanNudge).unwrap();
        assert_eq!(callback_data(&nudge), vec![CONTINUE_INTERVIEW]);
    }

    #[test]
    fn test_support_requires_valid_url() {
        assert!(support(None).is_none());
        assert!(support(Some("not a url")).is_none());
        assert!(support(Some("https://t.me/waypoint_support")).is_some());
    }
}
