//! Conversation state persisted per user.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::interview::InterviewTopic;

/// Author of one conversation turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single message of an LLM conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// What the bot is currently waiting for from a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogState {
    /// Not in any multi-message flow
    #[default]
    Idle,
    /// Waiting for the answer to an interview question
    Interview(InterviewTopic),
    /// Free-form questions about the current stage
    AskingQuestion,
}

impl DialogState {
    /// Database string representation.
    pub fn as_str(&self) -> String {
        match self {
            DialogState::Idle => "idle".to_string(),
            DialogState::Interview(topic) => format!("interview:{}", topic.as_str()),
            DialogState::AskingQuestion => "asking".to_string(),
        }
    }

    /// Whether an interview is in progress.
    pub fn is_interviewing(&self) -> bool {
        matches!(self, DialogState::Interview(_))
    }
}

impl FromStr for DialogState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(DialogState::Idle),
            "asking" => Ok(DialogState::AskingQuestion),
            other => other
                .strip_prefix("interview:")
                .ok_or_else(|| format!("Invalid dialog state: {s}"))?
                .parse::<InterviewTopic>()
                .map(DialogState::Interview),
        }
    }
}
