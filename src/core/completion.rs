use async_trait::async_trait;
use std::error::Error as StdError;
use std::fmt;
use tracing::debug;

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::config::{ConfigError, Settings};
use crate::core::message::History;

#[derive(Debug)]
pub enum CompletionError {
    /// The request never produced an HTTP response.
    Transport(reqwest::Error),
    /// The API answered with a non-success status.
    Api { status: u16, message: String },
    /// The response body was not a chat-completion payload.
    Decode(String),
    /// The response carried no choices.
    EmptyResponse,
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Transport(err) => write!(f, "Request to the chat API failed: {err}"),
            CompletionError::Api { status, message } => {
                write!(f, "API Error ({status}): {message}")
            }
            CompletionError::Decode(detail) => {
                write!(f, "Could not decode the chat API response: {detail}")
            }
            CompletionError::EmptyResponse => write!(f, "The chat API returned no choices"),
        }
    }
}

impl StdError for CompletionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CompletionError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// Sends a conversation to a chat model and returns the reply text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, model: &str, history: &History) -> Result<String, CompletionError>;
}

/// Client for OpenAI-compatible `chat/completions` endpoints.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::new(settings.api_base(), settings.api_key()?))
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, model: &str, history: &History) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: history.turns().iter().map(ChatMessage::from).collect(),
            stream: false,
        };

        debug!(model, turns = history.len(), "sending chat completion request");
        let response = self
            .client
            .post(self.chat_url())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(CompletionError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(CompletionError::Transport)?;
        debug!(status = status.as_u16(), bytes = body.len(), "chat completion response");

        if !status.is_success() {
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: summarize_api_error(&body),
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|err| CompletionError::Decode(err.to_string()))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyResponse)?;
        Ok(choice.message.content.unwrap_or_default())
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// One-line description of an error body, preferring the JSON error message.
pub fn summarize_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();
    if trimmed.is_empty() {
        return "<empty response body>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value).filter(|s| !s.is_empty()) {
            return summary;
        }
    }

    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}
