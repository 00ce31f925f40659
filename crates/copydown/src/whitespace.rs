//! Whitespace handling: collapsing insignificant whitespace before
//! rendering, and hoisting flanking whitespace out of inline replacements.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::{Node, NodeRef, NodeType};
use crate::utilities::{is_block, is_void};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \r\n\t]+").unwrap());

/// Whitespace moved outside an inline element's replacement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlankingWhitespace {
    pub leading: &'static str,
    pub trailing: &'static str,
}

impl FlankingWhitespace {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty()
    }
}

/// Compute the whitespace to hoist around `node`, given its rendered content.
///
/// Blocks never hoist. An inline element whose content starts with
/// whitespace hoists a single space to the left when its previous sibling
/// does not already end in a space, or, lacking a sibling, when its parent
/// is inline and can pass the space on; the right side mirrors it.
pub fn flanking_whitespace(node: &NodeRef, content: &str) -> FlankingWhitespace {
    if node.is_block() {
        return FlankingWhitespace::default();
    }

    let has_leading = content.starts_with(char::is_whitespace);
    let has_trailing = content.ends_with(char::is_whitespace);
    let blank_with_spaces = has_leading && has_trailing && node.is_blank();
    let inline_parent = node
        .parent()
        .is_some_and(|parent| parent.is_element() && !parent.is_block());

    let leading = match node.previous_sibling() {
        Some(sibling) if has_leading && !ends_with_space(sibling) => " ",
        None if has_leading && inline_parent => " ",
        _ => "",
    };
    let trailing = match node.next_sibling() {
        _ if !has_trailing || blank_with_spaces => "",
        Some(sibling) if !starts_with_space(sibling) => " ",
        None if inline_parent => " ",
        _ => "",
    };

    FlankingWhitespace { leading, trailing }
}

fn ends_with_space(sibling: &Node) -> bool {
    match sibling.node_type {
        NodeType::Text => sibling.value.as_deref().unwrap_or("").ends_with(' '),
        NodeType::Element if !is_block(&sibling.tag_name) => {
            sibling.text_content().ends_with(' ')
        }
        _ => false,
    }
}

fn starts_with_space(sibling: &Node) -> bool {
    match sibling.node_type {
        NodeType::Text => sibling.value.as_deref().unwrap_or("").starts_with(' '),
        NodeType::Element if !is_block(&sibling.tag_name) => {
            sibling.text_content().starts_with(' ')
        }
        _ => false,
    }
}

/// One visit of the document-order walk. Elements with children are
/// visited on the way in and again on the way out.
enum Step {
    Text(Vec<usize>),
    /// Block element or `<br>`
    Boundary,
    /// Void element or `<pre>`: keeps the whitespace that follows it
    Protect,
    Inline,
    Discard(Vec<usize>),
}

fn element_step(node: &Node) -> Step {
    let tag = node.tag_name.as_str();
    if is_block(tag) || tag == "br" {
        Step::Boundary
    } else if is_void(tag) || tag == "pre" {
        Step::Protect
    } else {
        Step::Inline
    }
}

fn collect_steps(node: &Node, path: &mut Vec<usize>, steps: &mut Vec<Step>) {
    for (index, child) in node.children.iter().enumerate() {
        path.push(index);
        match child.node_type {
            NodeType::Text => steps.push(Step::Text(path.clone())),
            NodeType::Element => {
                steps.push(element_step(child));
                if child.tag_name != "pre" && !child.children.is_empty() {
                    collect_steps(child, path, steps);
                    steps.push(element_step(child));
                }
            }
            NodeType::Comment | NodeType::Document => steps.push(Step::Discard(path.clone())),
        }
        path.pop();
    }
}

fn node_at<'a>(root: &'a Node, path: &[usize]) -> Option<&'a Node> {
    path.iter().try_fold(root, |node, &i| node.children.get(i))
}

fn node_at_mut<'a>(root: &'a mut Node, path: &[usize]) -> Option<&'a mut Node> {
    path.iter().try_fold(root, |node, &i| node.children.get_mut(i))
}

/// Drop one trailing space; returns whether the text is now empty
fn trim_trailing_space(root: &mut Node, path: &[usize]) -> bool {
    match node_at_mut(root, path).and_then(|n| n.value.as_mut()) {
        Some(value) => {
            if value.ends_with(' ') {
                value.pop();
            }
            value.is_empty()
        }
        None => false,
    }
}

/// Collapse whitespace in `root` the way a browser would lay it out.
///
/// Runs of `[ \t\r\n]` become one space, spaces adjacent to block
/// boundaries and repeated spaces across inline elements are dropped,
/// empty text nodes and comments are removed. `<pre>` subtrees are left
/// untouched.
pub fn collapse_whitespace(root: &mut Node) {
    if root.tag_name == "pre" {
        return;
    }

    let mut steps = Vec::new();
    collect_steps(root, &mut Vec::new(), &mut steps);

    let mut prev_text: Option<Vec<usize>> = None;
    let mut keep_leading = false;
    let mut doomed = Vec::new();

    for step in steps {
        match step {
            Step::Text(path) => {
                let after_space = match &prev_text {
                    Some(prev) => node_at(root, prev)
                        .and_then(|n| n.value.as_deref())
                        .map_or(false, |v| v.ends_with(' ')),
                    None => true,
                };
                let Some(node) = node_at_mut(root, &path) else {
                    continue;
                };
                let mut text = WHITESPACE_RUN
                    .replace_all(node.value.as_deref().unwrap_or(""), " ")
                    .into_owned();
                if after_space && !keep_leading && text.starts_with(' ') {
                    text.remove(0);
                }
                if text.is_empty() {
                    doomed.push(path);
                    continue;
                }
                node.value = Some(text);
                prev_text = Some(path);
            }
            Step::Boundary => {
                if let Some(prev) = prev_text.take() {
                    if trim_trailing_space(root, &prev) {
                        doomed.push(prev);
                    }
                }
                keep_leading = false;
            }
            Step::Protect => {
                prev_text = None;
                keep_leading = true;
            }
            Step::Inline => {
                if prev_text.is_some() {
                    keep_leading = false;
                }
            }
            Step::Discard(path) => doomed.push(path),
        }
    }

    if let Some(prev) = prev_text {
        if trim_trailing_space(root, &prev) {
            doomed.push(prev);
        }
    }

    // Remove in reverse document order so earlier indices stay valid
    doomed.sort();
    for path in doomed.iter().rev() {
        if let Some((&index, parent_path)) = path.split_last() {
            if let Some(parent) = node_at_mut(root, parent_path) {
                if index < parent.children.len() {
                    parent.children.remove(index);
                }
            }
        }
    }
}
