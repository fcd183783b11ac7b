//! Note draft validation.

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 100;
/// Maximum content length in characters.
pub const CONTENT_MAX_CHARS: usize = 10_000;

/// Outcome of validating a draft. `message` is empty when valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteValidation {
    pub valid: bool,
    pub message: String,
}

impl NoteValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    fn fail(message: &str) -> Self {
        Self {
            valid: false,
            message: message.to_string(),
        }
    }
}

/// Validate a title/content pair. Rules run in order and the first failure
/// wins. Lengths are counted in characters, not bytes.
pub fn validate_note(title: &str, content: &str) -> NoteValidation {
    if title.trim().is_empty() && content.trim().is_empty() {
        return NoteValidation::fail("title and content cannot both be empty");
    }

    if title.chars().count() > TITLE_MAX_CHARS {
        return NoteValidation::fail("title too long");
    }

    if content.chars().count() > CONTENT_MAX_CHARS {
        return NoteValidation::fail("content too long");
    }

    NoteValidation::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_empty_is_invalid() {
        let v = validate_note("", "");
        assert!(!v.valid);
        assert_eq!(v.message, "title and content cannot both be empty");

        // Whitespace-only counts as empty
        assert!(!validate_note("  ", "\n\t").valid);
    }

    #[test]
    fn test_title_over_limit_is_invalid() {
        let v = validate_note(&"x".repeat(101), "");
        assert!(!v.valid);
        assert_eq!(v.message, "title too long");

        assert!(validate_note(&"x".repeat(100), "body").valid);
    }

    #[test]
    fn test_content_over_limit_is_invalid() {
        let v = validate_note("t", &"c".repeat(10_001));
        assert!(!v.valid);
        assert_eq!(v.message, "content too long");
    }

    #[test]
    fn test_valid_pair() {
        let v = validate_note("t", "c");
        assert!(v.valid);
        assert!(v.message.is_empty());
    }

    #[test]
    fn test_limits_count_characters_not_bytes() {
        // 100 CJK characters are 300 bytes but still a legal title
        let title = "笔".repeat(100);
        assert!(validate_note(&title, "").valid);
        assert!(!validate_note(&"笔".repeat(101), "").valid);
    }

    #[test]
    fn test_title_check_precedes_content_check() {
        let v = validate_note(&"x".repeat(101), &"c".repeat(10_001));
        assert_eq!(v.message, "title too long");
    }
}
