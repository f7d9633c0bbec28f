//! Shared constants used across the application

/// Base URL of the hosted chat-completion API.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Model identifier sent with every completion request.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Sent as `HTTP-Referer` so the provider can attribute traffic.
pub const DEFAULT_REFERER: &str = "http://localhost/oye";

/// Sent as `X-Title`.
pub const DEFAULT_TITLE: &str = "Oye AI Chat";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Oye AI, a helpful, friendly, and concise assistant created by Puneet Sharma. When asked about your creator, mention Puneet Sharma.";

/// Environment variable providing the default credential at startup.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Environment variable holding the `tracing` filter directive.
pub const LOG_FILTER_ENV: &str = "OYE_LOG";

/// Returned in place of an assistant reply when the provider answers
/// successfully but without any completion text.
pub const EMPTY_COMPLETION_PLACEHOLDER: &str = "No response content found";

/// Used when a failed request carries no usable error message.
pub const GENERIC_REQUEST_FAILURE: &str = "API request failed";

/// Used when an error surfaces without any description.
pub const GENERIC_SEND_FAILURE: &str = "Failed to process message";

/// Quick prompts offered while the conversation is empty.
pub const SUGGESTIONS: [&str; 4] = [
    "Tell me a fun fact",
    "How does AI work?",
    "Write a short poem",
    "Explain quantum computing",
];
