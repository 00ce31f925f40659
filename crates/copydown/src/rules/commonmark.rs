//! CommonMark rules for HTML to Markdown conversion.

use once_cell::sync::Lazy;
use regex::Regex;

use super::table::convert_table;
use super::{Filter, Rule};
use crate::node::NodeRef;
use crate::options::{CodeBlockStyle, HeadingStyle, LinkReferenceStyle, LinkStyle};
use crate::utilities::{clean_attribute, repeat};
use crate::{Error, Result};

static LANGUAGE_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"language-(\S+)").unwrap());

/// Create all CommonMark rules, in evaluation order
pub fn commonmark_rules() -> Vec<(&'static str, Rule)> {
    vec![
        ("blank", blank_rule()),
        ("paragraph", paragraph_rule()),
        ("line_break", line_break_rule()),
        ("heading", heading_rule()),
        ("blockquote", blockquote_rule()),
        ("table", table_rule()),
        ("list", list_rule()),
        ("list_item", list_item_rule()),
        ("indented_code_block", indented_code_block_rule()),
        ("fenced_code_block", fenced_code_block_rule()),
        ("horizontal_rule", horizontal_rule()),
        ("inline_link", inline_link_rule()),
        ("reference_link", reference_link_rule()),
        ("emphasis", emphasis_rule()),
        ("strong", strong_rule()),
        ("code", code_rule()),
        ("image", image_rule()),
        ("default", default_rule()),
    ]
}

fn blank_rule() -> Rule {
    Rule::new(
        Filter::predicate(|_, node, _| node.is_blank()),
        |_, node, _| Ok(String::from(if node.is_block() { "\n\n" } else { "" })),
    )
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |content, _, _| Ok(format!("\n\n{}\n\n", content)))
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, conversion| {
        Ok(format!("{}\n", conversion.options().br))
    })
}

fn heading_rule() -> Rule {
    Rule::for_tags(&["h1", "h2", "h3", "h4", "h5", "h6"], |content, node, conversion| {
        let level: usize = node.tag_name()[1..].parse().unwrap_or(1);

        match conversion.options().heading_style {
            HeadingStyle::Setext if level < 3 => {
                let underline = if level == 1 { "=" } else { "-" };
                Ok(format!(
                    "\n\n{}\n{}\n\n",
                    content,
                    repeat(underline, content.chars().count())
                ))
            }
            _ => Ok(format!("\n\n{} {}\n\n", repeat("#", level), content)),
        }
    })
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |content, _, _| {
        let quoted: Vec<String> = content
            .trim_matches('\n')
            .split('\n')
            .map(|line| format!("> {}", line))
            .collect();
        Ok(format!("\n\n{}\n\n", quoted.join("\n")))
    })
}

fn table_rule() -> Rule {
    Rule::for_tag("table", |_, node, conversion| convert_table(node, conversion)).without_content()
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |content, node, _| {
        // A list closing its item stays glued to the item's text
        if node.parent_tag() == "li" && node.is_last_element_child() {
            Ok(format!("\n{}", content))
        } else {
            Ok(format!("\n\n{}\n\n", content))
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |content, node, conversion| {
        // Trailing blank lines collapse to one newline, indented like the rest
        let content = content.trim_start_matches('\n');
        let body = content.trim_end_matches('\n');
        let mut item = body.to_string();
        if body.len() < content.len() {
            item.push('\n');
        }
        let item = item.replace('\n', "\n    ");

        let prefix = match node.parent() {
            Some(list) if list.tag_name() == "ol" => {
                format!("{}.  ", item_number(list.attr("start"), node.element_index())?)
            }
            _ => format!("{}   ", conversion.options().bullet_list_marker),
        };

        let separator = if node.next_sibling().is_some() && !item.ends_with('\n') {
            "\n"
        } else {
            ""
        };

        Ok(format!("{}{}{}", prefix, item, separator))
    })
}

/// Parse an ordered list's `start` attribute; absent means 1
fn list_start(start: &str) -> Result<i64> {
    let start = start.trim();
    if start.is_empty() {
        return Ok(1);
    }
    start.parse().map_err(|_| Error::InvalidListStart {
        value: start.to_string(),
    })
}

/// `start + index`, where an overflowing number is as unusable as a
/// non-numeric start
fn item_number(start: &str, index: usize) -> Result<i64> {
    let first = list_start(start)?;
    i64::try_from(index)
        .ok()
        .and_then(|index| first.checked_add(index))
        .ok_or_else(|| Error::InvalidListStart {
            value: start.trim().to_string(),
        })
}

/// `<pre>` whose first child node is `<code>`
fn is_code_block(node: &NodeRef) -> bool {
    node.tag_name() == "pre"
        && node
            .node
            .children
            .first()
            .is_some_and(|child| child.is_element() && child.tag_name == "code")
}

/// Literal text of the block's `<code>`
fn code_block_text(node: &NodeRef) -> String {
    node.node
        .children
        .first()
        .map(|code| code.text_content())
        .unwrap_or_default()
}

fn indented_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|_, node, options| {
            options.code_block_style == CodeBlockStyle::Indented && is_code_block(node)
        }),
        |_, node, _| {
            let code = code_block_text(node);
            Ok(format!("\n\n    {}", code.replace('\n', "\n    ")))
        },
    )
}

fn fenced_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|_, node, options| {
            options.code_block_style == CodeBlockStyle::Fenced && is_code_block(node)
        }),
        |content, node, conversion| {
            let options = conversion.options();
            let class = node
                .node
                .children
                .first()
                .and_then(|code| code.attr("class"))
                .unwrap_or("");
            let language = LANGUAGE_CLASS
                .captures(class)
                .and_then(|caps| caps.get(1))
                .map_or("", |m| m.as_str());

            let fence_char = options.fence_char();
            let fence_size = content
                .lines()
                .map(|line| line.chars().take_while(|&c| c == fence_char).count())
                .filter(|&run| run >= 3)
                .map(|run| run + 1)
                .fold(3, usize::max);
            let fence: String = std::iter::repeat(fence_char).take(fence_size).collect();

            let mut code = code_block_text(node);
            if code.ends_with('\n') {
                code.pop();
            }
            Ok(format!("\n\n{}{}\n{}\n{}\n\n", fence, language, code, fence))
        },
    )
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, conversion| {
        Ok(format!("\n\n{}\n\n", conversion.options().hr))
    })
}

/// ` "title"` when the element has a non-empty title
fn title_part(node: &NodeRef) -> String {
    let title = clean_attribute(node.attr("title"));
    if title.is_empty() {
        String::new()
    } else {
        format!(" \"{}\"", title)
    }
}

fn inline_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            tag == "a" && !node.attr("href").is_empty() && options.link_style == LinkStyle::Inlined
        }),
        |content, node, _| {
            Ok(format!("[{}]({}{})", content, node.attr("href"), title_part(node)))
        },
    )
}

fn reference_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            tag == "a"
                && !node.attr("href").is_empty()
                && options.link_style == LinkStyle::Referenced
        }),
        |content, node, conversion| {
            let href = node.attr("href");
            let title = title_part(node);

            let (replacement, reference) = match conversion.options().link_reference_style {
                LinkReferenceStyle::Collapsed => (
                    format!("[{}][]", content),
                    format!("[{}]: {}{}", content, href, title),
                ),
                LinkReferenceStyle::Shortcut => (
                    format!("[{}]", content),
                    format!("[{}]: {}{}", content, href, title),
                ),
                LinkReferenceStyle::Full => {
                    let id = conversion.references().len() + 1;
                    (
                        format!("[{}][{}]", content, id),
                        format!("[{}]: {}{}", id, href, title),
                    )
                }
            };

            conversion.add_reference(reference);
            Ok(replacement)
        },
    )
    .with_append(|conversion| {
        let references = conversion.references();
        if references.is_empty() {
            String::new()
        } else {
            format!("\n\n{}\n\n", references.join("\n"))
        }
    })
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |content, _, conversion| {
        if content.trim().is_empty() {
            return Ok(String::new());
        }
        let delimiter = &conversion.options().em_delimiter;
        Ok(format!("{}{}{}", delimiter, content, delimiter))
    })
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |content, _, conversion| {
        if content.trim().is_empty() {
            return Ok(String::new());
        }
        let delimiter = &conversion.options().strong_delimiter;
        Ok(format!("{}{}{}", delimiter, content, delimiter))
    })
}

fn code_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            // The sole child of a <pre> belongs to the code block rules
            let has_siblings = node.previous_sibling().is_some() || node.next_sibling().is_some();
            let is_code_block = node.parent_tag() == "pre" && !has_siblings;
            tag == "code" && !is_code_block
        }),
        |content, _, _| {
            if content.trim().is_empty() {
                return Ok(String::new());
            }

            let longest_run = content
                .split(|c: char| c != '`')
                .map(str::len)
                .max()
                .unwrap_or(0);
            let delimiter = repeat("`", longest_run + 1);
            let leading = if content.starts_with('`') { " " } else { "" };
            let trailing = if content.ends_with('`') { " " } else { "" };

            Ok(format!("{}{}{}{}{}", delimiter, leading, content, trailing, delimiter))
        },
    )
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |_, node, _| {
        let src = node.attr("src");
        if src.is_empty() {
            return Ok(String::new());
        }
        let alt = clean_attribute(node.attr("alt"));
        Ok(format!("![{}]({}{})", alt, src, title_part(node)))
    })
}

fn default_rule() -> Rule {
    Rule::new(Filter::predicate(|_, _, _| true), |content, node, _| {
        if node.is_block() {
            Ok(format!("\n\n{}\n\n", content))
        } else {
            Ok(content.to_string())
        }
    })
}
