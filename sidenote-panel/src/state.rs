//! Panel view state and capture context.

use url::Url;

const DISPLAY_URL_MAX_CHARS: usize = 50;

/// The panel shows exactly one of these at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Edit,
    Preview,
    Chat,
}

/// Severity of a status line message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Unsaved title/content pair held across view switches so navigating away
/// from the editor never loses keystrokes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftBuffer {
    pub title: String,
    pub content: String,
}

impl DraftBuffer {
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

/// The active page the note is being captured from.
#[derive(Debug, Clone, Default)]
pub struct TabInfo {
    pub url: String,
    pub title: String,
}

impl TabInfo {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }

    /// Shortened URL for the panel header: host plus path when the URL
    /// parses with a host, a label for `about:` pages, otherwise the raw
    /// value truncated to 50 characters.
    pub fn display_url(&self) -> String {
        if let Ok(parsed) = Url::parse(&self.url)
            && let Some(host) = parsed.host_str()
        {
            return format!("{}{}", host, parsed.path());
        }

        if self.url.starts_with("about:") {
            return "about page".to_string();
        }

        if self.url.chars().count() > DISPLAY_URL_MAX_CHARS {
            let truncated: String = self.url.chars().take(DISPLAY_URL_MAX_CHARS).collect();
            return format!("{truncated}...");
        }
        self.url.clone()
    }
}
