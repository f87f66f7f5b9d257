//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use jiff::civil::Date;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use super::{
    prompts,
    wire::{
        AnswerVerdict, ChatRequest, ChatResponse, GeneratedPlan, Greeting, NextQuestion,
        ResponseFormat,
    },
    ApiError, Assistant, PlanSource, RetryPolicy,
};
use crate::{
    interview::InterviewTopic,
    models::{ChatTurn, Plan},
};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Connection settings for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Chat-completions client implementing [`PlanSource`] and [`Assistant`].
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn send_once(&self, request: &ChatRequest<'_>) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(format!("failed to parse response: {e}")))?;
        response
            .into_content()
            .ok_or_else(|| ApiError::MalformedResponse("empty completion".to_string()))
    }

    /// Sends `messages` and returns the completion text.
    pub async fn chat(
        &self,
        messages: &[ChatTurn],
        response_format: Option<ResponseFormat>,
    ) -> Result<String, ApiError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            response_format,
        };
        log::debug!(
            "chat request to {} with {} messages",
            self.config.model,
            messages.len()
        );
        self.config.retry.run(|| self.send_once(&request)).await
    }

    /// Sends `messages` and parses the completion as `T`.
    pub async fn structured<T>(&self, name: &'static str, messages: &[ChatTurn]) -> Result<T, ApiError>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let content = self
            .chat(messages, Some(ResponseFormat::for_type::<T>(name)))
            .await?;
        serde_json::from_str(&content).map_err(|e| {
            log::debug!("unparseable {name} payload: {content}");
            ApiError::MalformedResponse(format!("{name}: {e}"))
        })
    }
}

/// System instruction followed by the transcript.
fn with_instruction(instruction: String, transcript: &[ChatTurn]) -> Vec<ChatTurn> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(ChatTurn::system(instruction));
    messages.extend_from_slice(transcript);
    messages
}

impl PlanSource for OpenAiClient {
    async fn generate(&self, transcript: &[ChatTurn], today: Date) -> Result<Plan, ApiError> {
        let messages = with_instruction(prompts::plan(today), transcript);
        let generated: GeneratedPlan = self.structured("plan", &messages).await?;
        Plan::try_from(generated).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

impl Assistant for OpenAiClient {
    async fn greet(&self) -> Result<String, ApiError> {
        let messages = [ChatTurn::system(prompts::GREETING)];
        let greeting: Greeting = self.structured("greeting", &messages).await?;
        Ok(greeting.message)
    }

    async fn review_answer(
        &self,
        transcript: &[ChatTurn],
        topic: InterviewTopic,
        answer: &str,
    ) -> Result<AnswerVerdict, ApiError> {
        let mut messages = with_instruction(prompts::review(topic), transcript);
        messages.push(ChatTurn::user(answer));
        self.structured("answer_verdict", &messages).await
    }

    async fn next_question(
        &self,
        transcript: &[ChatTurn],
        topic: InterviewTopic,
    ) -> Result<String, ApiError> {
        let messages = with_instruction(prompts::question(topic), transcript);
        let next: NextQuestion = self.structured("next_question", &messages).await?;
        Ok(next.question)
    }

    async fn answer_question(&self, dialog: &[ChatTurn]) -> Result<String, ApiError> {
        self.chat(dialog, None).await
    }
}
