//! Request and response shapes exchanged with the chat-completions API.

use jiff::civil::Date;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::CoachError,
    models::{ChatTurn, Plan, Stage, Substage},
};

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatTurn],
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub json_schema: NamedSchema,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedSchema {
    pub name: &'static str,
    pub schema: serde_json::Value,
}

impl ResponseFormat {
    /// Structured output constrained to the JSON schema of `T`.
    pub fn for_type<T: JsonSchema>(name: &'static str) -> Self {
        Self {
            kind: "json_schema",
            json_schema: NamedSchema {
                name,
                schema: schemars::schema_for!(T).to_value(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
    }
}

/// Opening message of an interview.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct Greeting {
    /// Friendly greeting that asks whether the user is ready to start
    pub message: String,
}

/// A single interview question.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NextQuestion {
    /// The question to send to the user
    pub question: String,
}

/// How the model judged an interview answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// The answer is usable
    Accepted,
    /// The answer is on topic but incomplete
    Clarify,
    /// The answer has nothing to do with the question
    OffTopic,
}

/// Verdict on one interview answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct AnswerVerdict {
    pub status: VerdictStatus,
    /// Message for the user when the answer is not accepted
    #[serde(default)]
    pub reply: String,
}

/// Plan as produced by the model, with ISO 8601 dates.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GeneratedPlan {
    /// One-sentence statement of the user's goal
    pub goal: String,
    pub stages: Vec<GeneratedStage>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GeneratedStage {
    pub label: String,
    pub description: String,
    /// Due date as YYYY-MM-DD; omitted when the stage has substages
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub substages: Vec<GeneratedSubstage>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GeneratedSubstage {
    pub label: String,
    pub description: String,
    /// Due date as YYYY-MM-DD
    pub due: String,
}

fn parse_due(raw: &str) -> Result<Date, CoachError> {
    raw.trim().parse::<Date>().map_err(|e| {
        CoachError::validation("due").with_reason(format!("'{raw}' is not a YYYY-MM-DD date: {e}"))
    })
}

impl TryFrom<GeneratedPlan> for Plan {
    type Error = CoachError;

    fn try_from(generated: GeneratedPlan) -> Result<Self, Self::Error> {
        let stages = generated
            .stages
            .into_iter()
            .map(|stage| {
                let substages = stage
                    .substages
                    .into_iter()
                    .map(|sub| {
                        let due = Some(parse_due(&sub.due)?);
                        Ok(Substage {
                            label: sub.label,
                            description: sub.description,
                            due,
                        })
                    })
                    .collect::<Result<Vec<_>, CoachError>>()?;
                let due = stage.due.as_deref().map(parse_due).transpose()?;
                Ok(Stage {
                    label: stage.label,
                    description: stage.description,
                    due,
                    substages,
                })
            })
            .collect::<Result<Vec<_>, CoachError>>()?;

        Ok(Plan {
            goal: generated.goal,
            stages,
        })
    }
}
