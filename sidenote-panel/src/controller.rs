//! Panel controller: owns the UI state machine and sequences calls into
//! the knowledge base and chat assistant services.
//!
//! One logical task runs at a time; suspension only happens at network and
//! storage boundaries. Saves are gated by `is_saving` (re-entrant requests
//! are dropped, not queued) and chat sends by disabling the send control.
//! No retries anywhere: every failure is terminal for that attempt and is
//! surfaced for the user to retry manually.

use chrono::{Local, Utc};
use tracing::debug;

use sidenote_core::{ChatRole, NoteDraft, NoteMetadata, compose_document, generate_filename, validate_note};
use sidenote_services::{ChatService, ConnectionConfig, KnowledgeService};

use crate::state::{DraftBuffer, StatusKind, TabInfo, ViewMode};
use crate::surface::PanelSurface;

pub struct PanelController {
    surface: Box<dyn PanelSurface>,
    knowledge: Box<dyn KnowledgeService>,
    chat: Box<dyn ChatService>,
    tab: TabInfo,
    draft: DraftBuffer,
    view: ViewMode,
    is_saving: bool,
}

impl PanelController {
    pub fn new(
        surface: Box<dyn PanelSurface>,
        knowledge: Box<dyn KnowledgeService>,
        chat: Box<dyn ChatService>,
        tab: TabInfo,
    ) -> Self {
        Self {
            surface,
            knowledge,
            chat,
            tab,
            draft: DraftBuffer::default(),
            view: ViewMode::Edit,
            is_saving: false,
        }
    }

    /// Load persisted state and populate the panel header. Call once after
    /// construction.
    pub async fn init(&mut self) {
        let _ = self.knowledge.load_config().await;
        let _ = self.chat.load_api_key().await;

        self.surface.set_page_url(&self.tab.display_url());
        if !self.tab.title.is_empty() && self.surface.draft_title().is_empty() {
            self.surface.set_draft_title(&self.tab.title);
        }
        self.surface.status(StatusKind::Info, "ready");
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    /// Switch among edit/preview/chat. The in-progress draft is persisted
    /// before leaving the editor and restored on the way back, so
    /// navigating away never loses unsaved keystrokes.
    pub fn switch_view(&mut self, view: ViewMode) {
        if self.view == ViewMode::Edit && view != ViewMode::Edit {
            self.snapshot_draft();
        }
        self.view = view;

        match view {
            ViewMode::Edit => {
                self.surface.set_draft_title(&self.draft.title);
                self.surface.set_draft_content(&self.draft.content);
            }
            ViewMode::Preview => {
                let markdown = self.draft.content.clone();
                self.surface.render_preview(&markdown);
            }
            ViewMode::Chat => {}
        }
    }

    fn snapshot_draft(&mut self) {
        self.draft = DraftBuffer {
            title: self.surface.draft_title(),
            content: self.surface.draft_content(),
        };
    }

    /// Re-read the active page context. An empty title input is filled
    /// from the page title; `force` overwrites it regardless.
    pub fn refresh_page_info(&mut self, tab: TabInfo, force: bool) {
        self.tab = tab;
        self.surface.set_page_url(&self.tab.display_url());

        if !self.tab.title.is_empty() && (force || self.surface.draft_title().is_empty()) {
            self.surface.set_draft_title(&self.tab.title);
        }
        self.surface.status(StatusKind::Success, "page info updated");
    }

    /// Validate the draft and save it to the knowledge base. Requests that
    /// arrive while a save is in flight are dropped at this entry point.
    pub async fn save_note(&mut self) {
        if self.is_saving {
            debug!("save already in progress, dropping request");
            return;
        }

        let title = self.surface.draft_title().trim().to_string();
        let content = self.surface.draft_content().trim().to_string();

        let validation = validate_note(&title, &content);
        if !validation.valid {
            self.surface.status(StatusKind::Error, &validation.message);
            return;
        }

        self.is_saving = true;
        self.surface.set_inputs_enabled(false);

        let draft = NoteDraft::new(
            title,
            content,
            NoteMetadata {
                source_url: self.tab.url.clone(),
                source_title: self.tab.title.clone(),
                timestamp: Utc::now().to_rfc3339(),
            },
        );

        let outcome = self.knowledge.save_note(&draft).await;
        if outcome.success {
            self.surface.alert(&outcome.message);
            // Remote notice to deter duplicate clicks; best effort
            let _ = self.knowledge.show_message("note already saved from sidenote").await;
            self.surface.status(StatusKind::Success, &outcome.message);
        } else {
            self.surface.alert(&outcome.message);
            self.surface.status(StatusKind::Error, &outcome.message);
        }

        self.is_saving = false;
        self.surface.set_inputs_enabled(true);
    }

    /// Send a chat message: show a thinking placeholder, disable the send
    /// control for the duration, and replace the placeholder with the
    /// reply or a formatted error.
    pub async fn send_chat(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        self.surface.transcript_push(ChatRole::User, text);
        self.surface
            .transcript_push(ChatRole::Assistant, self.chat.thinking_message());
        self.surface.set_send_enabled(false);

        match self.chat.send_message(text).await {
            Ok(reply) => self.surface.transcript_replace_last(&reply),
            Err(e) => self.surface.transcript_replace_last(&format!("error: {e}")),
        }

        self.surface.set_send_enabled(true);
    }

    /// Open the settings surface pre-filled with the current connection
    /// config.
    pub async fn open_settings(&mut self) {
        let config = self.knowledge.load_config().await;
        self.surface.fill_settings(&config.base_url, &config.token);
        self.surface.open_settings();
    }

    /// Persist the settings form. Both fields must be non-empty; otherwise
    /// the surface stays open with a validation message.
    pub async fn save_settings(&mut self) {
        let (base_url, token) = self.surface.settings_fields();
        let base_url = base_url.trim().to_string();
        let token = token.trim().to_string();

        if base_url.is_empty() || token.is_empty() {
            self.surface
                .status(StatusKind::Error, "base URL and token cannot be empty");
            return;
        }

        match self.knowledge.save_config(ConnectionConfig { base_url, token }).await {
            Ok(()) => {
                self.surface.status(StatusKind::Success, "settings saved");
                self.surface.close_settings();
            }
            Err(e) => {
                debug!("settings save failed: {}", e);
                self.surface.status(StatusKind::Error, "failed to save settings");
            }
        }
    }

    /// Probe the connection with the form's field values. The candidate
    /// config is request-scoped: neither the live client config nor the
    /// persisted one is touched.
    pub async fn test_settings(&mut self) {
        let (base_url, token) = self.surface.settings_fields();
        let base_url = base_url.trim().to_string();
        let token = token.trim().to_string();

        if base_url.is_empty() || token.is_empty() {
            self.surface
                .status(StatusKind::Error, "fill in base URL and token first");
            return;
        }

        let candidate = ConnectionConfig { base_url, token };
        if self.knowledge.test_connection_with(&candidate).await {
            self.surface.status(StatusKind::Success, "connection succeeded");
        } else {
            self.surface
                .status(StatusKind::Error, "connection failed, check settings");
        }
    }

    /// Copy the draft as a frontmatter-prefixed Markdown document with a
    /// generated filename.
    pub fn export_draft(&mut self) {
        if self.view == ViewMode::Edit {
            self.snapshot_draft();
        }
        if self.draft.is_empty() {
            self.surface.status(StatusKind::Error, "nothing to export");
            return;
        }

        let draft = NoteDraft::new(
            self.draft.title.trim(),
            self.draft.content.clone(),
            NoteMetadata {
                source_url: self.tab.url.clone(),
                source_title: self.tab.title.clone(),
                timestamp: Utc::now().to_rfc3339(),
            },
        );

        let filename = generate_filename(&draft.title, &Local::now());
        let document = compose_document(&draft);
        self.surface.copy_to_clipboard(&filename, &document);
        self.surface
            .status(StatusKind::Success, "draft copied to clipboard");
    }

    /// Handle the chat API key prompt result. `None` means the prompt was
    /// cancelled; an empty string clears the key; anything else is
    /// validated against the remote service before being accepted.
    pub async fn configure_chat_key(&mut self, input: Option<&str>) {
        let Some(input) = input else {
            return;
        };
        let input = input.trim();

        if input.is_empty() {
            match self.chat.clear_api_key().await {
                Ok(()) => self.surface.status(StatusKind::Success, "API key cleared"),
                Err(e) => {
                    debug!("API key clear failed: {}", e);
                    self.surface.status(StatusKind::Error, "failed to clear API key");
                }
            }
            return;
        }

        if !self.chat.validate_api_key(input).await {
            self.surface
                .status(StatusKind::Error, "API key is invalid, check and retry");
            return;
        }

        match self.chat.save_api_key(input).await {
            Ok(()) => self.surface.status(StatusKind::Success, "API key saved"),
            Err(e) => {
                debug!("API key save failed: {}", e);
                self.surface.status(StatusKind::Error, "failed to save API key");
            }
        }
    }
}
