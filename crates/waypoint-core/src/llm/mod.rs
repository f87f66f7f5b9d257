//! Language-model collaborators: plan generation and interview guidance.
//!
//! The rest of the crate only sees the [`PlanSource`] and [`Assistant`]
//! traits. [`OpenAiClient`] implements both against an OpenAI-compatible
//! chat-completions endpoint, asking for structured JSON validated against
//! `schemars` schemas of the types in [`wire`].

pub mod client;
pub mod prompts;
pub mod wire;

use std::{future::Future, time::Duration};

use jiff::civil::Date;
use thiserror::Error;

pub use client::{OpenAiClient, OpenAiConfig};
pub use wire::{AnswerVerdict, GeneratedPlan, VerdictStatus};

use crate::{
    interview::InterviewTopic,
    models::{ChatTurn, Plan},
};

/// Failure talking to the language model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-success HTTP status
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },
    /// The reply was not the JSON shape that was asked for
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// Every retry attempt failed
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<ApiError> },
}

impl ApiError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status { code, .. } => *code == 429 || *code >= 500,
            ApiError::MalformedResponse(_) | ApiError::Exhausted { .. } => false,
        }
    }
}

/// Exponential backoff applied at the client boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles afterwards
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    /// Runs `op` until it succeeds, fails permanently or attempts run out.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= max_attempts => {
                    if max_attempts == 1 {
                        return Err(err);
                    }
                    return Err(ApiError::Exhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    let delay = self.delay_after(attempt);
                    log::warn!("LLM request failed ({err}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Produces a dated plan from an interview transcript.
pub trait PlanSource: Send + Sync {
    /// Generates a plan whose due dates start after `today`.
    fn generate(
        &self,
        transcript: &[ChatTurn],
        today: Date,
    ) -> impl Future<Output = Result<Plan, ApiError>> + Send;
}

/// Conversational helper driving the interview and question mode.
pub trait Assistant: Send + Sync {
    /// Opening message that asks whether the user wants to start.
    fn greet(&self) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Judges whether `answer` addresses the question asked for `topic`.
    fn review_answer(
        &self,
        transcript: &[ChatTurn],
        topic: InterviewTopic,
        answer: &str,
    ) -> impl Future<Output = Result<AnswerVerdict, ApiError>> + Send;

    /// Writes the question that collects `topic`.
    fn next_question(
        &self,
        transcript: &[ChatTurn],
        topic: InterviewTopic,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Replies to the latest user turn of a question-mode dialog.
    fn answer_question(
        &self,
        dialog: &[ChatTurn],
    ) -> impl Future<Output = Result<String, ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ApiError::Transport("reset".into()).is_retryable());
        assert!(ApiError::Status {
            code: 429,
            body: String::new()
        }
        .is_retryable());
        assert!(ApiError::Status {
            code: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!ApiError::Status {
            code: 401,
            body: String::new()
        }
        .is_retryable());
        assert!(!ApiError::MalformedResponse("x".into()).is_retryable());
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_run_retries_transient_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        };

        let result = policy
            .run(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ApiError::Transport("timeout".into()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_gives_up_and_skips_permanent_errors() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
        };
        let exhausted: Result<(), _> = policy
            .run(|| async { Err(ApiError::Transport("down".into())) })
            .await;
        assert!(matches!(exhausted, Err(ApiError::Exhausted { attempts: 2, .. })));

        let calls = AtomicU32::new(0);
        let permanent: Result<(), _> = policy
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Status {
                    code: 400,
                    body: "bad".into(),
                })
            })
            .await;
        assert!(matches!(permanent, Err(ApiError::Status { code: 400, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
