//! View-binding abstraction.
//!
//! The controller never touches a rendering environment directly; it talks
//! to this capability interface of named fields and actions. The real
//! binding lives with the host UI; tests drive the controller against a
//! recording fake.

use sidenote_core::ChatRole;

use crate::state::StatusKind;

pub trait PanelSurface: Send {
    // ── Draft inputs ────────────────────────────────────────────────

    /// Current value of the title input.
    fn draft_title(&self) -> String;
    /// Current value of the content input.
    fn draft_content(&self) -> String;
    fn set_draft_title(&mut self, title: &str);
    fn set_draft_content(&mut self, content: &str);
    fn set_inputs_enabled(&mut self, enabled: bool);

    // ── Status and alerts ───────────────────────────────────────────

    /// Inline status line.
    fn status(&mut self, kind: StatusKind, text: &str);
    /// Modal alert for save outcomes.
    fn alert(&mut self, text: &str);

    // ── Page header ─────────────────────────────────────────────────

    fn set_page_url(&mut self, display: &str);

    // ── Preview ─────────────────────────────────────────────────────

    /// Hand Markdown to the host's renderer. Rendering itself is out of
    /// scope here.
    fn render_preview(&mut self, markdown: &str);

    // ── Chat transcript ─────────────────────────────────────────────

    fn transcript_push(&mut self, role: ChatRole, text: &str);
    /// Replace the most recent transcript entry (the thinking placeholder).
    fn transcript_replace_last(&mut self, text: &str);
    fn set_send_enabled(&mut self, enabled: bool);

    // ── Settings form ───────────────────────────────────────────────

    /// Current `(base_url, token)` form field values.
    fn settings_fields(&self) -> (String, String);
    fn fill_settings(&mut self, base_url: &str, token: &str);
    fn open_settings(&mut self);
    fn close_settings(&mut self);

    // ── Export ──────────────────────────────────────────────────────

    /// Hand an exported document to the host clipboard.
    fn copy_to_clipboard(&mut self, filename: &str, document: &str);
}
