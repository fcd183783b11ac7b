//! Filename and frontmatter formatting for exported drafts.

use chrono::{DateTime, Datelike, Local, Timelike};

use crate::note::{NoteDraft, NoteMetadata};

/// Tags applied to exported documents when none are supplied.
pub const DEFAULT_TAGS: [&str; 2] = ["web-clip", "inbox"];

const FILENAME_TITLE_MAX_CHARS: usize = 50;

/// Format a local instant as `YYYYMMDD-HHMM` with zero-padded components.
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    format!(
        "{:04}{:02}{:02}-{:02}{:02}",
        at.year(),
        at.month(),
        at.day(),
        at.hour(),
        at.minute()
    )
}

/// Characters kept verbatim in filenames: ASCII word characters and CJK
/// ideographs. Everything else becomes a hyphen.
fn is_filename_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Build a timestamped Markdown filename from a title. The title is
/// sanitized to filename characters, hyphen runs are collapsed, edge
/// hyphens stripped, and the result truncated to 50 characters. An empty
/// sanitized title yields `<timestamp>.md`.
pub fn generate_filename(title: &str, at: &DateTime<Local>) -> String {
    let timestamp = format_timestamp(at);

    let mut clean = String::new();
    for c in title.trim().chars() {
        if is_filename_char(c) {
            clean.push(c);
        } else if !clean.ends_with('-') {
            clean.push('-');
        }
    }
    let clean: String = clean
        .trim_matches('-')
        .chars()
        .take(FILENAME_TITLE_MAX_CHARS)
        .collect();

    if clean.is_empty() {
        format!("{timestamp}.md")
    } else {
        format!("{timestamp}-{clean}.md")
    }
}

/// Escape a string for use inside double-quoted YAML scalars.
fn escape_yaml(s: &str) -> String {
    s.replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Emit a YAML frontmatter block for a captured note. `tags` falls back to
/// [`DEFAULT_TAGS`] when `None`.
pub fn generate_frontmatter(metadata: &NoteMetadata, tags: Option<&[String]>) -> String {
    let mut out = String::from("---\n");
    out.push_str(&format!("title: \"{}\"\n", escape_yaml(&metadata.source_title)));
    out.push_str(&format!("source: \"{}\"\n", escape_yaml(&metadata.source_url)));
    out.push_str(&format!("created: \"{}\"\n", escape_yaml(&metadata.timestamp)));

    let defaults: Vec<String> = DEFAULT_TAGS.iter().map(|t| t.to_string()).collect();
    let tags = tags.unwrap_or(&defaults);
    if !tags.is_empty() {
        out.push_str("tags:\n");
        for tag in tags {
            out.push_str(&format!("  - \"{}\"\n", escape_yaml(tag)));
        }
    }

    out.push_str("---\n\n");
    out
}

/// Compose a full exportable Markdown document: frontmatter plus content.
pub fn compose_document(draft: &NoteDraft) -> String {
    let mut out = generate_frontmatter(&draft.metadata, None);
    if !draft.title.trim().is_empty() {
        out.push_str(&format!("# {}\n\n", draft.title.trim()));
    }
    out.push_str(&draft.content);
    out
}
