//! Escaping of literal text so it is not read back as Markdown syntax.

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered (pattern, replacement) pairs. Each pass runs over the output of
/// the previous one, so the backslash pass must come first.
static ESCAPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\\", r"\\"),
        (r"\*", r"\*"),
        (r"(?m)^-", r"\-"),
        (r"(?m)^\+ ", r"\+ "),
        (r"(?m)^(=+)", r"\${1}"),
        (r"(?m)^(#{1,6}) ", r"\${1} "),
        (r"`", r"\`"),
        (r"(?m)^~~~", r"\~~~"),
        (r"\[", r"\["),
        (r"\]", r"\]"),
        (r"(?m)^>", r"\>"),
        (r"_", r"\_"),
        (r"(?m)^(\d+)\. ", r"${1}\. "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Escape Markdown-significant characters in a text node.
///
/// Line-anchored escapes (`#`, `>`, `-`, `+ `, `=`, `~~~`, `1. `) apply at
/// the start of every line, not only at the start of the string.
pub fn escape(text: &str) -> String {
    let mut escaped = text.to_string();
    for (pattern, replacement) in ESCAPES.iter() {
        if pattern.is_match(&escaped) {
            escaped = pattern.replace_all(&escaped, *replacement).into_owned();
        }
    }
    escaped
}
