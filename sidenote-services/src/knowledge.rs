//! Knowledge base HTTP client.
//!
//! Wraps the local personal-knowledge-base service's JSON-RPC-style
//! endpoint: `POST <base>/api` with a bearer token and a
//! `{ method, args }` body. Notes land as appended blocks on the daily
//! journal page.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Local, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use sidenote_core::store::{KNOWLEDGE_CONFIG_KEY, KeyValueStore};
use sidenote_core::{NoteDraft, validate_note};

use crate::error::{ServiceError, ServiceResult};

/// Default endpoint of the local knowledge base HTTP server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:12316";
/// Placeholder token shipped as the default.
pub const DEFAULT_TOKEN: &str = "Abc123!";

const SHOW_MESSAGE_METHOD: &str = "logseq.UI.showMsg";
const APPEND_BLOCK_METHOD: &str = "logseq.Editor.appendBlockInPage";

/// Connection settings for the knowledge base service. Persisted wholesale
/// under a fixed store key; never partially merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub base_url: String,
    pub token: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: DEFAULT_TOKEN.to_string(),
        }
    }
}

/// Result of a save attempt. Failures are captured here, never thrown, so
/// the caller can render them without a surrounding error handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveOutcome {
    fn saved(page: String) -> Self {
        Self {
            success: true,
            message: "note saved to knowledge base".to_string(),
            page: Some(page),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            message: format!("failed to save note: {error}"),
            page: None,
            error: Some(error),
        }
    }
}

/// RPC request body for the knowledge base endpoint.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    args: Vec<Value>,
}

/// Error body shape the service returns on failed calls.
#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    message: Option<String>,
}

/// Operations the panel needs from the knowledge base side.
#[async_trait]
pub trait KnowledgeService: Send + Sync {
    /// Load the persisted connection config. Never fails: storage errors
    /// are logged and defaults returned. The loaded value becomes the
    /// live config.
    async fn load_config(&mut self) -> ConnectionConfig;

    /// Persist a config wholesale and make it live. Resets the connected
    /// flag. The caller must supply non-empty fields.
    async fn save_config(&mut self, config: ConnectionConfig) -> ServiceResult<()>;

    /// Probe a candidate config with a remote show-message call. Returns a
    /// boolean, never errors, and touches neither the live nor the
    /// persisted config.
    async fn test_connection_with(&self, config: &ConnectionConfig) -> bool;

    /// Validate and save a note as an appended block on today's journal
    /// page. All failures are captured in the outcome.
    async fn save_note(&self, draft: &NoteDraft) -> SaveOutcome;

    /// Best-effort remote notification. Errors are swallowed.
    async fn show_message(&self, text: &str) -> bool;
}

/// HTTP client for the knowledge base service.
pub struct KnowledgeBaseClient {
    http: reqwest::Client,
    store: Arc<dyn KeyValueStore>,
    config: ConnectionConfig,
    is_connected: bool,
}

impl KnowledgeBaseClient {
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
            config: ConnectionConfig::default(),
            is_connected: false,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    /// Probe the live config and record the result on the connected flag.
    pub async fn test_connection(&mut self) -> bool {
        let config = self.config.clone();
        let ok = self.test_connection_with(&config).await;
        self.is_connected = ok;
        ok
    }

    fn api_url(config: &ConnectionConfig) -> String {
        format!("{}/api", config.base_url.trim_end_matches('/'))
    }

    async fn rpc(
        &self,
        config: &ConnectionConfig,
        method: &str,
        args: Vec<Value>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        debug!("knowledge rpc: {}", method);
        self.http
            .post(Self::api_url(config))
            .header(AUTHORIZATION, format!("Bearer {}", config.token))
            .json(&RpcRequest { method, args })
            .send()
            .await
    }
}

/// Page title for today's journal page, e.g. `"Sep 2nd, 2025"`.
pub fn journal_page_name(date: &DateTime<Local>) -> String {
    let day = date.day();
    format!(
        "{} {}{}, {}",
        date.format("%b"),
        day,
        ordinal_suffix(day),
        date.year()
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match day {
        d if d % 10 == 1 && d != 11 => "st",
        d if d % 10 == 2 && d != 12 => "nd",
        d if d % 10 == 3 && d != 13 => "rd",
        _ => "th",
    }
}

/// Markdown body for an appended note block: heading plus content, or bare
/// content when the title is empty.
fn note_body(draft: &NoteDraft) -> String {
    if draft.title.trim().is_empty() {
        draft.content.clone()
    } else {
        format!("## {}\n\n{}", draft.title.trim(), draft.content)
    }
}

#[async_trait]
impl KnowledgeService for KnowledgeBaseClient {
    async fn load_config(&mut self) -> ConnectionConfig {
        match self.store.get(KNOWLEDGE_CONFIG_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<ConnectionConfig>(&raw) {
                Ok(config) => self.config = config,
                Err(e) => warn!("stored knowledge config is malformed, using defaults: {}", e),
            },
            Ok(None) => {}
            Err(e) => warn!("failed to load knowledge config, using defaults: {}", e),
        }
        self.config.clone()
    }

    async fn save_config(&mut self, config: ConnectionConfig) -> ServiceResult<()> {
        let raw = serde_json::to_string(&config)
            .map_err(|e| ServiceError::Persistence(e.to_string()))?;
        self.store
            .set(KNOWLEDGE_CONFIG_KEY, &raw)
            .await
            .map_err(|e| ServiceError::Persistence(e.to_string()))?;

        self.config = config;
        self.is_connected = false;
        Ok(())
    }

    async fn test_connection_with(&self, config: &ConnectionConfig) -> bool {
        let args = vec![json!("sidenote connection test")];
        match self.rpc(config, SHOW_MESSAGE_METHOD, args).await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("connection test failed: {}", e);
                false
            }
        }
    }

    async fn save_note(&self, draft: &NoteDraft) -> SaveOutcome {
        let validation = validate_note(&draft.title, &draft.content);
        if !validation.valid {
            return SaveOutcome::failed(validation.message);
        }

        let page = journal_page_name(&Local::now());
        let body = note_body(draft);
        let args = vec![
            json!(page),
            json!(body),
            json!({
                "properties": {
                    "source": draft.metadata.source_url,
                    "page-title": draft.metadata.source_title,
                    "created": Utc::now().to_rfc3339(),
                }
            }),
        ];

        let response = match self.rpc(&self.config, APPEND_BLOCK_METHOD, args).await {
            Ok(response) => response,
            Err(e) => return SaveOutcome::failed(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            let error = response
                .json::<RpcErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("HTTP error: {}", status.as_u16()));
            return SaveOutcome::failed(error);
        }

        SaveOutcome::saved(page)
    }

    async fn show_message(&self, text: &str) -> bool {
        match self.rpc(&self.config, SHOW_MESSAGE_METHOD, vec![json!(text)]).await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("show message failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sidenote_core::{MemoryStore, NoteMetadata};

    fn client() -> KnowledgeBaseClient {
        KnowledgeBaseClient::new(Arc::new(MemoryStore::new()))
    }

    fn draft(title: &str, content: &str) -> NoteDraft {
        NoteDraft::new(title, content, NoteMetadata::default())
    }

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(23), "rd");
        assert_eq!(ordinal_suffix(31), "st");
    }

    #[test]
    fn test_journal_page_name() {
        let date = Local.with_ymd_and_hms(2025, 9, 2, 10, 30, 0).unwrap();
        assert_eq!(journal_page_name(&date), "Sep 2nd, 2025");

        let date = Local.with_ymd_and_hms(2025, 12, 11, 0, 0, 0).unwrap();
        assert_eq!(journal_page_name(&date), "Dec 11th, 2025");
    }

    #[test]
    fn test_note_body_with_and_without_title() {
        assert_eq!(note_body(&draft("Title", "body")), "## Title\n\nbody");
        assert_eq!(note_body(&draft("", "bare")), "bare");
        assert_eq!(note_body(&draft("  ", "bare")), "bare");
    }

    #[test]
    fn test_api_url_trims_trailing_slash() {
        let config = ConnectionConfig {
            base_url: "http://127.0.0.1:12316/".to_string(),
            token: "t".to_string(),
        };
        assert_eq!(KnowledgeBaseClient::api_url(&config), "http://127.0.0.1:12316/api");
    }

    #[test]
    fn test_config_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token, DEFAULT_TOKEN);
    }

    #[tokio::test]
    async fn test_load_config_falls_back_to_defaults() {
        let mut client = client();
        let config = client.load_config().await;
        assert_eq!(config, ConnectionConfig::default());
    }

    #[tokio::test]
    async fn test_save_then_load_config_round_trips() {
        let store = Arc::new(MemoryStore::new());
        let mut client = KnowledgeBaseClient::new(store.clone());

        let config = ConnectionConfig {
            base_url: "http://localhost:9999".to_string(),
            token: "secret".to_string(),
        };
        client.save_config(config.clone()).await.unwrap();
        assert!(!client.is_connected());

        // A fresh client over the same store sees the saved values
        let mut other = KnowledgeBaseClient::new(store);
        assert_eq!(other.load_config().await, config);
    }

    #[tokio::test]
    async fn test_save_note_invalid_draft_fails_before_any_network_call() {
        // Unroutable endpoint: a network attempt would surface a transport
        // error, not the validator message.
        let store = Arc::new(MemoryStore::new());
        let mut client = KnowledgeBaseClient::new(store);
        client
            .save_config(ConnectionConfig {
                base_url: "http://127.0.0.1:1".to_string(),
                token: "t".to_string(),
            })
            .await
            .unwrap();

        let outcome = client.save_note(&draft("", "")).await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("title and content cannot both be empty")
        );
        assert!(outcome.page.is_none());
    }

    #[tokio::test]
    async fn test_save_note_unreachable_service_is_captured_not_thrown() {
        let store = Arc::new(MemoryStore::new());
        let mut client = KnowledgeBaseClient::new(store);
        client
            .save_config(ConnectionConfig {
                base_url: "http://127.0.0.1:1".to_string(),
                token: "t".to_string(),
            })
            .await
            .unwrap();

        let outcome = client.save_note(&draft("t", "c")).await;
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("failed to save note:"));
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn test_test_connection_with_does_not_mutate_saved_config() {
        let store = Arc::new(MemoryStore::new());
        let mut client = KnowledgeBaseClient::new(store.clone());

        let saved = ConnectionConfig {
            base_url: "http://localhost:4444".to_string(),
            token: "saved".to_string(),
        };
        client.save_config(saved.clone()).await.unwrap();

        // Probe different values than the saved config
        let candidate = ConnectionConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            token: "candidate".to_string(),
        };
        let _ = client.test_connection_with(&candidate).await;

        assert_eq!(client.config(), &saved);
        let mut fresh = KnowledgeBaseClient::new(store);
        assert_eq!(fresh.load_config().await, saved);
    }

    #[tokio::test]
    async fn test_test_connection_unreachable_returns_false() {
        let mut client = client();
        client
            .save_config(ConnectionConfig {
                base_url: "http://127.0.0.1:1".to_string(),
                token: "t".to_string(),
            })
            .await
            .unwrap();

        assert!(!client.test_connection().await);
        assert!(!client.is_connected());
    }
}
