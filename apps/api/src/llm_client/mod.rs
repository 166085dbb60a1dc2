//! LLM Client: the single point of entry for all chat-completion calls in Lamarr.
//!
//! ARCHITECTURAL RULE: No other module may call the Groq API directly.
//! All LLM interactions MUST go through the `ChatGateway` trait.
//!
//! Model: llama-3.3-70b-versatile (fixed; only the base URL is configurable)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;
pub mod sanitize;

/// OpenAI-compatible base URL of the hosted Groq API.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// The model used for all LLM calls in Lamarr.
pub const MODEL: &str = "llama-3.3-70b-versatile";
/// Low variance, mostly deterministic completions.
const TEMPERATURE: f64 = 0.3;
const MAX_TOKENS: u32 = 2048;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM prompt must not be empty")]
    EmptyPrompt,

    /// The service could not be reached (DNS, connect, timeout, broken body).
    #[error("LLM transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The service answered with a non-success status. The body is kept for diagnosis.
    #[error("LLM API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("LLM response body is not a chat completion: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("LLM returned no completion")]
    NoCompletion,
}

/// A chat-completion capability: one system prompt, one user prompt, one completion text.
///
/// Carried in `AppState` as `Arc<dyn ChatGateway>` so tests can swap in fakes.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// The chat gateway backed by Groq's OpenAI-compatible completions endpoint.
/// No retries: rate limits and upstream failures are surfaced to the caller as-is.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
        })
    }
}

#[async_trait]
impl ChatGateway for LlmClient {
    async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        if system.trim().is_empty() || user.trim().is_empty() {
            return Err(LlmError::EmptyPrompt);
        }

        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(LlmError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(LlmError::Transport)?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = serde_json::from_str(&body).map_err(LlmError::Decode)?;

        if let Some(usage) = &completion.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        // A null or blank first choice is nothing usable, not an empty success.
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::NoCompletion)
    }
}
