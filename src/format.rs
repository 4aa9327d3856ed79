//! Markdown to plain text for emails shown in a terminal or saved as `.txt`.

use std::sync::LazyLock;

use regex::Regex;

/// Rewrites applied in order. Each entry is (pattern, replacement).
static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        // fenced code blocks
        (r"(?s)```.*?```", ""),
        // inline code
        (r"`([^`]*)`", "$1"),
        // images
        (r"!\[.*?\]\(.*?\)", ""),
        // links keep their label
        (r"\[(.*?)\]\((.*?)\)", "$1"),
        // bold and italic
        (r"[*_]{1,3}([^*_]+)[*_]{1,3}", "$1"),
        // headings
        (r"(?m)^\s{0,3}#{1,6}\s*", ""),
        // block quotes
        (r"(?m)^\s{0,3}>\s*", ""),
        // horizontal rules
        (r"(?m)^\s*[-*_]{3,}\s*$", ""),
        // bullets
        (r"(?m)^\s*[-*•+]\s+", ""),
        (r"\n{3,}", "\n\n"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        // Patterns are literals above.
        (Regex::new(pattern).expect("invalid built-in pattern"), replacement)
    })
    .collect()
});

/// Strips Markdown syntax from `text`, keeping link labels and emphasized
/// words, and collapses runs of blank lines.
pub fn to_plain_text(text: &str) -> String {
    let out = RULES.iter().fold(text.to_string(), |acc, (re, replacement)| {
        re.replace_all(&acc, *replacement).into_owned()
    });
    out.trim().to_string()
}
