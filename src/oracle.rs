//! Completion oracle abstraction and the OpenAI chat completions client.
//!
//! Defines the [`Oracle`] trait and the concrete [`OpenAiOracle`]. Calls
//! return a tagged [`OracleError`] so callers can tell rate limits and
//! server errors apart from malformed responses; [`placeholder`] turns any
//! failure into the visible answer text the session shows instead.
//!
//! Generation parameters are fixed: temperature [`TEMPERATURE`] and at most
//! [`MAX_TOKENS`] output tokens. There is no retry, no backoff, and no
//! client-side timeout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{ApiKey, OracleConfig};
use crate::models::{PromptEnvelope, Turn};

pub const TEMPERATURE: f64 = 0.2;
pub const MAX_TOKENS: u32 = 512;

/// Prefix of every error placeholder answer.
pub const ERROR_MARKER: &str = "[Error from OpenAI:";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Malformed(String),
}

impl OracleError {
    /// Whether the same request might succeed if sent again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            OracleError::Transport(_) | OracleError::RateLimited(_) => true,
            OracleError::Status { status, .. } => *status >= 500,
            OracleError::Malformed(_) => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OracleError::Transport(_) => "transport",
            OracleError::RateLimited(_) => "rate_limited",
            OracleError::Status { .. } => "status",
            OracleError::Malformed(_) => "malformed",
        }
    }
}

/// The answer text shown in place of a failed completion.
pub fn placeholder(err: &OracleError) -> String {
    format!("{} {}]", ERROR_MARKER, err)
}

/// A black-box text completion service.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Complete one envelope.
    async fn complete(&self, envelope: &PromptEnvelope) -> Result<String, OracleError>;
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Turn],
    pub temperature: f64,
    pub max_tokens: u32,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(model: &'a str, envelope: &'a PromptEnvelope) -> Self {
        Self {
            model,
            messages: envelope.turns(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Oracle backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiOracle {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: ApiKey,
}

impl OpenAiOracle {
    pub fn new(config: &OracleConfig, api_key: ApiKey) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, envelope: &PromptEnvelope) -> Result<String, OracleError> {
        let started = Instant::now();
        let body = CompletionRequest::new(&self.model, envelope);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                return Err(OracleError::RateLimited(body_text));
            }
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        let answer = parse_completion(&text)?;

        tracing::debug!(
            model = %self.model,
            turns = envelope.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "oracle call completed"
        );
        Ok(answer)
    }
}

/// Extract `choices[0].message.content` from a response body.
fn parse_completion(body: &str) -> Result<String, OracleError> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|e| OracleError::Malformed(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| OracleError::Malformed("missing choices[0].message.content".to_string()))
}
