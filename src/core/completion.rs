//! Single-turn chat completion against the hosted endpoint.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::constants::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_REFERER, DEFAULT_SYSTEM_PROMPT,
    DEFAULT_TEMPERATURE, DEFAULT_TITLE, EMPTY_COMPLETION_PLACEHOLDER, GENERIC_REQUEST_FAILURE,
};
use crate::utils::auth::add_auth_headers;
use crate::utils::url::construct_api_url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Fixed request parameters. Resolved once from configuration at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub referer: String,
    pub title: String,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Errors returned by a completion call.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionError {
    /// No credential was supplied; nothing was sent.
    MissingCredential,
    /// The request never produced an HTTP response (DNS, connect, timeout).
    Network(String),
    /// The endpoint answered with a non-success status.
    Http {
        status: u16,
        /// The body's `error.message` when present, otherwise a generic text.
        message: String,
    },
    /// A success status whose body is not JSON.
    MalformedBody(String),
    /// The task running the request ended without producing a result.
    Aborted(String),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::MissingCredential => write!(f, "API key is required"),
            CompletionError::Network(message) => write!(f, "{message}"),
            CompletionError::Http { message, .. } => write!(f, "{message}"),
            CompletionError::MalformedBody(detail) => {
                write!(f, "Malformed response from API: {detail}")
            }
            CompletionError::Aborted(detail) => write!(f, "Request aborted: {detail}"),
        }
    }
}

impl std::error::Error for CompletionError {}

/// Something that turns one user turn into assistant text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, user_text: &str, credential: &str) -> Result<String, CompletionError>;
}

/// HTTP implementation of [`CompletionBackend`].
#[derive(Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    settings: CompletionSettings,
}

impl CompletionClient {
    pub fn new(settings: CompletionSettings) -> Self {
        Self::with_client(reqwest::Client::new(), settings)
    }

    pub fn with_client(client: reqwest::Client, settings: CompletionSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// The system preamble plus the single user turn. No earlier history is
    /// sent.
    pub fn build_request(&self, user_text: &str) -> ChatRequest {
        ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage::system(self.settings.system_prompt.clone()),
                ChatMessage::user(user_text),
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionBackend for CompletionClient {
    async fn complete(&self, user_text: &str, credential: &str) -> Result<String, CompletionError> {
        if credential.trim().is_empty() {
            return Err(CompletionError::MissingCredential);
        }

        let url = construct_api_url(&self.settings.base_url, "chat/completions");
        let request = self.build_request(user_text);
        debug!(%url, model = %request.model, "dispatching completion request");

        let http_request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(REQUEST_TIMEOUT);
        let http_request = add_auth_headers(
            http_request,
            credential,
            &self.settings.referer,
            &self.settings.title,
        );

        let response = http_request
            .json(&request)
            .send()
            .await
            .map_err(|err| CompletionError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| CompletionError::Network(err.to_string()))?;

        if !status.is_success() {
            let message =
                extract_error_message(&body).unwrap_or_else(|| GENERIC_REQUEST_FAILURE.to_string());
            warn!(status = status.as_u16(), %message, "completion request failed");
            return Err(CompletionError::Http {
                status: status.as_u16(),
                message,
            });
        }

        parse_completion_body(&body)
    }
}

/// Parse a success body. A body that parses but carries no completion text
/// yields the placeholder instead of an error.
pub fn parse_completion_body(body: &str) -> Result<String, CompletionError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|err| CompletionError::MalformedBody(err.to_string()))?;

    match response.first_content() {
        Some(content) => Ok(content.to_string()),
        None => {
            debug!("completion response carried no content");
            Ok(EMPTY_COMPLETION_PLACEHOLDER.to_string())
        }
    }
}

/// Pull a human-readable message out of an error body.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body.trim()).ok()?;
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
        })?;

    let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
