//! Outbound user notifications.
//!
//! Sinks are fire-and-forget: a delivery failure is the sink's problem to log,
//! never a reason to roll back the state change that produced the event.

use std::sync::Mutex;

use jiff::Timestamp;

/// Something the user should hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The current task is due; the user can confirm or ask for more time
    ReminderDue {
        label: String,
        description: String,
        deadline: Timestamp,
    },
    /// The deadline passed without a reaction and was moved automatically
    DeadlinePassed { label: String, new_deadline: Timestamp },
    /// The last task of the plan was completed
    PlanCompleted,
    /// The user has access but never finished the interview
    CreatePlanNudge,
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::ReminderDue { .. } => "reminder_due",
            Event::DeadlinePassed { .. } => "deadline_passed",
            Event::PlanCompleted => "plan_completed",
            Event::CreatePlanNudge => "create_plan_nudge",
        }
    }
}

/// Receives events addressed to a user.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, user_id: u64, event: Event);
}

/// Writes events to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, user_id: u64, event: Event) {
        log::info!("notify user {user_id}: {}", event.kind());
        log::debug!("event payload for {user_id}: {event:?}");
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(u64, Event)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<(u64, Event)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, user_id: u64, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push((user_id, event));
        }
    }
}
