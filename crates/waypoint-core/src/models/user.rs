//! User model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ChatTurn, DialogState, Plan};

/// Hour of day reminders are sent at unless the user picks another one.
pub const DEFAULT_REMINDER_HOUR: u8 = 12;

/// A bot user together with their goal, plan and conversation state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Telegram user id
    pub id: u64,

    /// Goal extracted by the interview
    pub goal: Option<String>,

    /// Generated plan
    pub plan: Option<Plan>,

    /// Interview transcript
    #[serde(default)]
    pub messages: Vec<ChatTurn>,

    /// Transcript of questions asked about the current stage
    #[serde(default)]
    pub question_dialog: Vec<ChatTurn>,

    /// Multi-message flow the user is in
    #[serde(skip)]
    pub dialog_state: DialogState,

    /// Whether the user may talk to the bot
    pub access: bool,

    /// Whether the user may run admin commands
    pub is_admin: bool,

    /// Local hour (0-23) at which deadline reminders are sent
    pub reminder_hour: u8,

    /// Timestamp when the user first contacted the bot (UTC)
    pub created_at: Timestamp,

    /// Timestamp of the user's last interaction (UTC)
    pub last_active_at: Timestamp,
}

impl User {
    /// A freshly registered user without access.
    pub fn new(id: u64, now: Timestamp) -> Self {
        Self {
            id,
            goal: None,
            plan: None,
            messages: Vec::new(),
            question_dialog: Vec::new(),
            dialog_state: DialogState::Idle,
            access: false,
            is_admin: false,
            reminder_hour: DEFAULT_REMINDER_HOUR,
            created_at: now,
            last_active_at: now,
        }
    }

    /// Whether the user may use the bot.
    pub fn is_authorized(&self) -> bool {
        self.access || self.is_admin
    }

    /// Whether the user already has a generated plan.
    pub fn has_plan(&self) -> bool {
        self.plan.is_some()
    }
}
