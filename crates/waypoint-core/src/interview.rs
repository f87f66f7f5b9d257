//! The ordered interview that precedes plan generation.
//!
//! Each topic names the answer the bot is currently waiting for. The flow
//! itself (asking, reviewing, generating the plan) lives in
//! [`Coach::begin_interview`](crate::Coach::begin_interview) and
//! [`Coach::submit_answer`](crate::Coach::submit_answer).

use std::{fmt, str::FromStr};

use crate::models::Plan;

/// Topic whose answer the bot is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterviewTopic {
    /// Whether the user wants to start
    Confirmation,
    /// Current skill level
    Level,
    /// What the user wants to achieve
    Goal,
    /// Fears and obstacles
    Obstacles,
    /// Hours per week the user can spend
    WeeklyTime,
    /// How soon the goal should be reached
    Timeframe,
}

impl InterviewTopic {
    pub const ALL: [InterviewTopic; 6] = [
        InterviewTopic::Confirmation,
        InterviewTopic::Level,
        InterviewTopic::Goal,
        InterviewTopic::Obstacles,
        InterviewTopic::WeeklyTime,
        InterviewTopic::Timeframe,
    ];

    /// Topic asked after this one, `None` after the last.
    pub fn next(self) -> Option<Self> {
        let index = Self::ALL.iter().position(|topic| *topic == self)?;
        Self::ALL.get(index + 1).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewTopic::Confirmation => "confirmation",
            InterviewTopic::Level => "level",
            InterviewTopic::Goal => "goal",
            InterviewTopic::Obstacles => "obstacles",
            InterviewTopic::WeeklyTime => "weekly_time",
            InterviewTopic::Timeframe => "timeframe",
        }
    }

    /// What the question for this topic has to find out.
    pub fn question_hint(&self) -> &'static str {
        match self {
            InterviewTopic::Confirmation => "whether the user is ready to begin",
            InterviewTopic::Level => {
                "the user's current level of skill, e.g. beginner, hobbyist or taking courses"
            }
            InterviewTopic::Goal => "what concrete result the user wants to achieve",
            InterviewTopic::Obstacles => "the fears or obstacles the user expects on the way",
            InterviewTopic::WeeklyTime => "how many hours per week or per day the user can spend",
            InterviewTopic::Timeframe => {
                "in how many days, weeks or months the user wants to reach the goal"
            }
        }
    }

    /// What counts as an answer when reviewing.
    pub fn answer_hint(&self) -> &'static str {
        match self {
            InterviewTopic::Confirmation => "agreeing to start; any kind of yes counts",
            InterviewTopic::Level => {
                "the user's skill level; it does not have to be one of beginner, amateur or pro"
            }
            InterviewTopic::Goal => "the user's goal; it does not have to be about money",
            InterviewTopic::Obstacles => "fears or obstacles",
            InterviewTopic::WeeklyTime => "time per week; hours per day are also fine",
            InterviewTopic::Timeframe => "how long the user wants to take",
        }
    }
}

impl fmt::Display for InterviewTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewTopic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|topic| topic.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Invalid interview topic: {s}"))
    }
}

/// What happened to an interview answer.
#[derive(Debug, Clone, PartialEq)]
pub enum InterviewReply {
    /// Answer accepted; the next question was asked
    Question(String),
    /// Answer too vague; ask again with this follow-up
    Clarify(String),
    /// Answer unrelated; the user may stop the interview
    OffTopic(String),
    /// Last answer accepted and the plan is stored
    PlanReady(Plan),
}
