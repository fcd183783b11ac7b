//! Assistant response sanitizer.
//!
//! Strips the rich-text markup chat models like to emit so replies render
//! cleanly as plain text. The rules run as an ordered list and the order is
//! load-bearing: fenced code blocks must be removed before inline-code and
//! heading rules run, otherwise those rules would chew on fence markers and
//! code contents. Reorder with care.

use std::sync::LazyLock;

use regex::Regex;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let rule = |pattern: &str, replacement: &'static str| Rule {
        pattern: Regex::new(pattern).expect("sanitizer regex"),
        replacement,
    };

    vec![
        // Fenced code blocks go first: dropped entirely, including contents
        rule(r"(?s)```.*?```", ""),
        // Bold before italic so ** pairs are not eaten as two * pairs
        rule(r"\*\*(.*?)\*\*", "${1}"),
        rule(r"\*(.*?)\*", "${1}"),
        rule(r"_(.*?)_", "${1}"),
        // Inline code becomes quoted text
        rule(r"`(.*?)`", "\"${1}\""),
        // Heading markers
        rule(r"#{1,6}\s?", ""),
        // Links keep only their text
        rule(r"\[(.*?)\]\(.*?\)", "${1}"),
        // At most one blank line in a row
        rule(r"\n{3,}", "\n\n"),
    ]
});

/// Strip supported markup from an assistant reply and trim the result.
/// Idempotent over the supported markup subset.
pub fn clean_response(text: &str) -> String {
    let mut out = text.to_string();
    for rule in RULES.iter() {
        out = rule.pattern.replace_all(&out, rule.replacement).into_owned();
    }
    out.trim().to_string()
}
