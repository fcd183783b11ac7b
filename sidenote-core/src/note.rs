//! Note draft and chat turn types shared across the workspace.

use serde::{Deserialize, Serialize};

/// Capture context for a draft: where the note came from and when.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteMetadata {
    /// URL of the page the note was captured from.
    pub source_url: String,
    /// Title of the page the note was captured from.
    pub source_title: String,
    /// Capture instant as an RFC 3339 string.
    pub timestamp: String,
}

/// A transient note draft. Lives only for the panel session; it is validated
/// and handed to a client, never persisted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub metadata: NoteMetadata,
}

impl NoteDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        metadata: NoteMetadata,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            metadata,
        }
    }
}

/// Role in the assistant conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One conversation turn. Content is trimmed on construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: &str) -> Self {
        Self {
            role: ChatRole::User,
            content: content.trim().to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_turn_trims_content() {
        let turn = ChatTurn::user("  hello \n");
        assert_eq!(turn.role, ChatRole::User);
        assert_eq!(turn.content, "hello");
    }

    #[test]
    fn test_chat_role_as_str() {
        assert_eq!(ChatRole::User.as_str(), "user");
        assert_eq!(ChatRole::Assistant.as_str(), "assistant");
    }
}
