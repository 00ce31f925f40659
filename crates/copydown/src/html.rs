//! HTML parsing support.
//!
//! Parses HTML strings with scraper (html5ever) and converts the result to
//! the parser-agnostic [`Node`] tree the converter walks.

use scraper::{Html, Node as ScraperNode};

use crate::node::Node;
use crate::options::Options;
use crate::{Error, Result};

/// Parse an HTML fragment into a document [`Node`], rejecting documents
/// nested deeper than the default `max_depth`.
///
/// The returned root is a document node whose children are the parsed
/// top-level nodes; the `<html>` wrapper html5ever adds to fragments is
/// dropped.
///
/// # Example
///
/// ```rust
/// use copydown::{parse_html, CopyDown};
///
/// let node = parse_html("<h1>Hello <em>World</em></h1>").unwrap();
///
/// let converter = CopyDown::new();
/// let markdown = converter.convert(&node).unwrap();
/// assert_eq!(markdown, "# Hello _World_");
/// ```
pub fn parse_html(html: &str) -> Result<Node> {
    parse_html_with_max_depth(html, Options::default().max_depth)
}

/// Parse an HTML fragment, failing with [`Error::NestingTooDeep`] when the
/// resulting tree would be deeper than `max_depth` (the document counts
/// as depth 1).
///
/// Both the depth check and the tree construction use explicit stacks, so
/// arbitrarily deep input is rejected without recursing.
pub fn parse_html_with_max_depth(html: &str, max_depth: usize) -> Result<Node> {
    let fragment = Html::parse_fragment(html);
    let root = *fragment.root_element();

    let mut depth = 1;
    let mut pending: Vec<_> = root.children().map(|child| (child, 2usize)).collect();
    while let Some((node, level)) = pending.pop() {
        if matches!(
            node.value(),
            ScraperNode::Text(_) | ScraperNode::Comment(_) | ScraperNode::Element(_)
        ) {
            depth = depth.max(level);
        }
        pending.extend(node.children().map(|child| (child, level + 1)));
    }
    if depth > max_depth {
        log::debug!("rejecting html nested {} deep (max {})", depth, max_depth);
        return Err(Error::NestingTooDeep {
            depth,
            max: max_depth,
        });
    }

    let mut stack = vec![(Node::document(), root.children())];
    while let Some((node, children)) = stack.last_mut() {
        let next = children.next();
        match next {
            Some(child) => match child.value() {
                ScraperNode::Text(text) => node.add_child(Node::text(&text.text)),
                ScraperNode::Comment(comment) => node.add_child(Node::comment(&comment.comment)),
                ScraperNode::Element(element) => {
                    let mut element_node = Node::element(element.name());
                    for (name, value) in element.attrs() {
                        element_node.set_attr(name, value);
                    }
                    stack.push((element_node, child.children()));
                }
                _ => {}
            },
            None if stack.len() == 1 => break,
            None => {
                if let Some((finished, _)) = stack.pop() {
                    if let Some((parent, _)) = stack.last_mut() {
                        parent.add_child(finished);
                    }
                }
            }
        }
    }

    let document = stack
        .pop()
        .map(|(document, _)| document)
        .unwrap_or_else(Node::document);
    log::trace!("parsed {} nodes from {} bytes of html", document.count(), html.len());
    Ok(document)
}
