//! Chat assistant HTTP client.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint and keeps a
//! bounded, session-scoped conversation history. A user turn is appended
//! before the request goes out and rolled back on any failure, so the
//! history only ever contains successfully round-tripped turns.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sidenote_core::store::{CHAT_API_KEY, KeyValueStore};
use sidenote_core::{ChatRole, ChatTurn};

use crate::error::{ServiceError, ServiceResult};
use crate::sanitize::clean_response;

/// Default chat-completion API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
/// Default model identifier.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

const WELCOME_MESSAGE: &str =
    "Hi! I can answer questions about the page or the note you are taking. What do you need?";
const SYSTEM_INSTRUCTION: &str = "Answer concisely and focus on the core content. \
     Avoid filler and long explanations; keep replies under 300 characters.";
const THINKING_MESSAGE: &str = "Thinking...";

/// History is trimmed to the most recent [`HISTORY_TRIM_TO`] entries once
/// it exceeds this many.
const HISTORY_SOFT_CAP: usize = 20;
/// Deliberately asymmetric: trimming keeps 10, not 11, preserving recency
/// headroom over symmetry.
const HISTORY_TRIM_TO: usize = 10;

/// Bounded, session-scoped conversation history.
///
/// A fixed welcome entry exists after construction and after any clear.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: Vec<ChatTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        let mut history = Self { turns: Vec::new() };
        history.reset();
        history
    }

    /// Append a turn, trimming to the most recent entries once the cap is
    /// exceeded.
    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
        if self.turns.len() > HISTORY_SOFT_CAP {
            let excess = self.turns.len() - HISTORY_TRIM_TO;
            self.turns.drain(..excess);
        }
    }

    /// Remove a just-appended user turn after a failed request, so no
    /// orphaned user turn survives without a paired reply.
    pub fn rollback_last_user(&mut self) {
        if self
            .turns
            .last()
            .is_some_and(|turn| turn.role == ChatRole::User)
        {
            self.turns.pop();
        }
    }

    /// Clear back to the welcome-only state.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.turns.push(ChatTurn::assistant(WELCOME_MESSAGE));
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Request body for the Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

/// Wire message format.
#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
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

/// Error body the API returns on failed requests.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Operations the panel needs from the chat assistant side.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Send a user message and return the sanitized reply. Fails with
    /// `Configuration` when no key is set and `Validation` when the text
    /// is blank. Any failure after the user turn was appended rolls that
    /// turn back before propagating.
    async fn send_message(&mut self, text: &str) -> ServiceResult<String>;

    /// Probe a candidate key against the models endpoint. Boolean on
    /// response status only; never errors.
    async fn validate_api_key(&self, key: &str) -> bool;

    /// Load the persisted key, if any, into the client.
    async fn load_api_key(&mut self) -> Option<String>;

    /// Persist and activate a key.
    async fn save_api_key(&mut self, key: &str) -> ServiceResult<()>;

    /// Remove the persisted key and clear history back to welcome-only.
    async fn clear_api_key(&mut self) -> ServiceResult<()>;

    fn has_api_key(&self) -> bool;

    /// Transient placeholder text shown while a request is in flight.
    fn thinking_message(&self) -> &'static str;
}

/// HTTP client for the chat-completion API.
pub struct ChatAssistantClient {
    http: reqwest::Client,
    store: Arc<dyn KeyValueStore>,
    base_url: String,
    model: String,
    api_key: Option<String>,
    history: ConversationHistory,
}

impl ChatAssistantClient {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            store,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            history: ConversationHistory::new(),
        }
    }

    /// Point the client at a different endpoint. Used by tests and
    /// self-hosted deployments.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }

    fn chat_completions_url(&self) -> String {
        let base = self.normalized_base_url();
        if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    fn models_url(&self) -> String {
        let base = self.normalized_base_url();
        if base.ends_with("/v1") {
            format!("{}/models", base)
        } else {
            format!("{}/v1/models", base)
        }
    }

    /// Issue the completion request over the capped history and return the
    /// sanitized reply text.
    async fn request_completion(&self, api_key: &str) -> ServiceResult<String> {
        let mut messages = vec![WireMessage {
            role: "system",
            content: SYSTEM_INSTRUCTION,
        }];
        messages.extend(self.history.turns().iter().map(|turn| WireMessage {
            role: turn.role.as_str(),
            content: &turn.content,
        }));

        let request_body = ChatCompletionsRequest {
            model: &self.model,
            messages,
            max_tokens: 400,
            temperature: 0.3,
            top_p: 0.9,
            stream: false,
        };

        debug!("chat completion request: {} turns", self.history.len());
        let response = self
            .http
            .post(self.chat_completions_url())
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .map(|detail| detail.message)
                .unwrap_or_else(|| format!("API request failed: {}", status.as_u16()));
            return Err(ServiceError::Remote {
                status: Some(status.as_u16()),
                message,
            });
        }

        let completion: ChatCompletionsResponse = response.json().await.map_err(|e| {
            ServiceError::Remote {
                status: None,
                message: format!("malformed completion response: {e}"),
            }
        })?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ServiceError::Remote {
                status: None,
                message: "empty response".to_string(),
            })?;

        Ok(clean_response(&text))
    }
}

#[async_trait]
impl ChatService for ChatAssistantClient {
    async fn send_message(&mut self, text: &str) -> ServiceResult<String> {
        let Some(api_key) = self.api_key.clone() else {
            return Err(ServiceError::Configuration("API key is not set".to_string()));
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::Validation("message cannot be empty".to_string()));
        }

        self.history.push(ChatTurn::user(text));

        match self.request_completion(&api_key).await {
            Ok(reply) => {
                self.history.push(ChatTurn::assistant(&reply));
                Ok(reply)
            }
            Err(e) => {
                // Compensating rollback: no orphaned user turn on failure
                self.history.rollback_last_user();
                Err(e)
            }
        }
    }

    async fn validate_api_key(&self, key: &str) -> bool {
        let response = self
            .http
            .get(self.models_url())
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .send()
            .await;

        match response {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("API key validation failed: {}", e);
                false
            }
        }
    }

    async fn load_api_key(&mut self) -> Option<String> {
        match self.store.get(CHAT_API_KEY).await {
            Ok(key) => self.api_key = key,
            Err(e) => warn!("failed to load API key: {}", e),
        }
        self.api_key.clone()
    }

    async fn save_api_key(&mut self, key: &str) -> ServiceResult<()> {
        self.store
            .set(CHAT_API_KEY, key)
            .await
            .map_err(|e| ServiceError::Persistence(e.to_string()))?;
        self.api_key = Some(key.to_string());
        Ok(())
    }

    async fn clear_api_key(&mut self) -> ServiceResult<()> {
        self.store
            .remove(CHAT_API_KEY)
            .await
            .map_err(|e| ServiceError::Persistence(e.to_string()))?;
        self.api_key = None;
        self.history.reset();
        Ok(())
    }

    fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn thinking_message(&self) -> &'static str {
        THINKING_MESSAGE
    }
}

/// Mask a key for display: first 8 and last 4 characters survive. Short
/// keys are fully masked.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
