//! Element classification tables and string helpers shared by the rules.

use once_cell::sync::Lazy;
use regex::Regex;

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "center", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frameset", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "html", "isindex", "legend",
    "li", "main", "menu", "nav", "noframes", "noscript", "ol", "output", "p",
    "pre", "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    "ul",
];

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements that are never collapsed as blank
pub const MEANINGFUL_WHEN_BLANK: &[&str] = &["a", "th", "td"];

pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag)
}

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_meaningful_when_blank(tag: &str) -> bool {
    MEANINGFUL_WHEN_BLANK.contains(&tag)
}

pub fn repeat(s: &str, n: usize) -> String {
    s.repeat(n)
}

static ATTRIBUTE_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\n+\s*)+").unwrap());

/// Collapse newline runs (and whitespace after them) in an attribute value
/// into a single newline
pub fn clean_attribute(value: &str) -> String {
    ATTRIBUTE_NEWLINES.replace_all(value, "\n").into_owned()
}

/// Join two rendered fragments, keeping at most one blank line between them.
///
/// The trailing newlines of `left` and the leading newlines of `right` are
/// replaced by `min(2, max(trailing, leading))` newlines.
pub fn join(left: &str, right: &str) -> String {
    let mut out = String::with_capacity(left.len() + right.len());
    out.push_str(left);
    push_joined(&mut out, right);
    out
}

/// In-place form of [`join`]
pub fn push_joined(left: &mut String, right: &str) {
    let body_len = left.trim_end_matches('\n').len();
    let trailing = left.len() - body_len;
    let right_body = right.trim_start_matches('\n');
    let leading = right.len() - right_body.len();

    left.truncate(body_len);
    for _ in 0..trailing.max(leading).min(2) {
        left.push('\n');
    }
    left.push_str(right_body);
}

/// Strip leading `\t\n\r` and all trailing whitespace from the final output
pub fn trim_output(output: &str) -> &str {
    output
        .trim_start_matches(['\t', '\n', '\r'])
        .trim_end_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c'])
}
