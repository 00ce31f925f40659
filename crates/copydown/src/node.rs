//! DOM node structure consumed by the converter.
//!
//! [`Node`] is an owned, parser-agnostic tree: any HTML parser (html5ever,
//! CDP, a hand-built tree in tests) can produce it. The converter never
//! mutates a tree it is given; it walks it through [`NodeRef`], a borrowed
//! cursor that remembers the chain of parents it was reached through, so
//! parent, sibling and ancestor lookups need no back-pointers in the tree.

use indexmap::IndexMap;

use crate::utilities::{is_block, is_meaningful_when_blank, is_void};

/// Node kinds, numbered like DOM `nodeType`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Element node (nodeType = 1)
    Element = 1,
    /// Text node (nodeType = 3)
    Text = 3,
    /// Comment node (nodeType = 8)
    Comment = 8,
    /// Document or document fragment (nodeType = 9 / 11)
    Document = 9,
}

/// A node of a parsed HTML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node kind
    pub node_type: NodeType,

    /// Lower-cased tag name for elements, empty otherwise
    pub tag_name: String,

    /// Text for text and comment nodes
    pub value: Option<String>,

    /// Attributes in source order, names lower-cased
    pub attributes: IndexMap<String, String>,

    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            tag_name: tag_name.to_lowercase(),
            value: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut node = Self::element(tag_name);
        for (name, value) in attrs {
            node.set_attr(name, value);
        }
        node
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self {
            node_type: NodeType::Text,
            tag_name: String::new(),
            value: Some(content.to_string()),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Create a comment node
    pub fn comment(content: &str) -> Self {
        let mut node = Self::text(content);
        node.node_type = NodeType::Comment;
        node
    }

    /// Create an empty document root
    pub fn document() -> Self {
        Self {
            node_type: NodeType::Document,
            tag_name: String::new(),
            value: None,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes
            .insert(name.to_lowercase(), value.to_string());
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Builder form of [`Node::add_child`]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|n| n.is_element())
    }

    /// Concatenated text of this node and all its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self.node_type {
            NodeType::Text => out.push_str(self.value.as_deref().unwrap_or("")),
            NodeType::Comment => {}
            NodeType::Element | NodeType::Document => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Depth of the deepest descendant, the node itself counting as 1.
    ///
    /// Computed without recursion so pathological trees can be measured
    /// before anything recursive touches them.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        max
    }

    /// Total number of nodes in this subtree
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            total += 1;
            stack.extend(node.children.iter());
        }
        total
    }
}

// Children are dropped from an explicit stack so a deep tree cannot
// exhaust the call stack while it is freed.
impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// A borrowed position in a [`Node`] tree.
///
/// Each `NodeRef` knows the `NodeRef` of its parent and its own index among
/// the parent's children. Parents live further up the call stack of the tree
/// walk, so the chain is valid for as long as the child cursor is.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    /// The node itself
    pub node: &'a Node,
    parent: Option<&'a NodeRef<'a>>,
    index: usize,
}

impl<'a> NodeRef<'a> {
    /// Create a cursor at a tree root
    pub fn root(node: &'a Node) -> Self {
        Self {
            node,
            parent: None,
            index: 0,
        }
    }

    /// Cursors for each child node, in document order
    pub fn children<'b>(&'b self) -> impl Iterator<Item = NodeRef<'b>> + 'b {
        let this: &'b NodeRef<'b> = self;
        this.node
            .children
            .iter()
            .enumerate()
            .map(move |(index, node)| NodeRef {
                node,
                parent: Some(this),
                index,
            })
    }

    /// Cursors for element children only
    pub fn element_children<'b>(&'b self) -> impl Iterator<Item = NodeRef<'b>> + 'b {
        self.children().filter(|c| c.is_element())
    }

    pub fn parent(&self) -> Option<&'a NodeRef<'a>> {
        self.parent
    }

    /// Position among the element children of the parent
    pub fn element_index(&self) -> usize {
        match self.parent {
            Some(parent) => parent.node.children[..self.index]
                .iter()
                .filter(|n| n.is_element())
                .count(),
            None => 0,
        }
    }

    pub fn previous_sibling(&self) -> Option<&'a Node> {
        let parent = self.parent?;
        let index = self.index.checked_sub(1)?;
        parent.node.children.get(index)
    }

    pub fn next_sibling(&self) -> Option<&'a Node> {
        self.parent?.node.children.get(self.index + 1)
    }

    /// Whether this node is the last element child of its parent
    pub fn is_last_element_child(&self) -> bool {
        match self.parent {
            Some(parent) => parent.node.children[self.index + 1..]
                .iter()
                .all(|n| !n.is_element()),
            None => true,
        }
    }

    pub fn is_element(&self) -> bool {
        self.node.is_element()
    }

    pub fn is_text(&self) -> bool {
        self.node.is_text()
    }

    pub fn tag_name(&self) -> &'a str {
        &self.node.tag_name
    }

    /// Attribute value, empty when absent
    pub fn attr(&self, name: &str) -> &'a str {
        self.node.attr(name).unwrap_or("")
    }

    /// Tag name of the parent element, empty at the root
    pub fn parent_tag(&self) -> &'a str {
        self.parent.map(|p| p.tag_name()).unwrap_or("")
    }

    /// Raw text of a text node
    pub fn value(&self) -> &'a str {
        self.node.value.as_deref().unwrap_or("")
    }

    /// Concatenated text of the subtree, whitespace preserved
    pub fn whole_text(&self) -> String {
        self.node.text_content()
    }

    pub fn is_block(&self) -> bool {
        self.is_element() && is_block(self.tag_name())
    }

    pub fn is_void(&self) -> bool {
        self.is_element() && is_void(self.tag_name())
    }

    /// Whether the element would render nothing worth keeping.
    ///
    /// `a`, `th` and `td` are never blank, nor is anything containing one of
    /// them or a void element such as `img`.
    pub fn is_blank(&self) -> bool {
        self.is_element()
            && !is_void(self.tag_name())
            && !is_meaningful_when_blank(self.tag_name())
            && self.whole_text().trim().is_empty()
            && !has_void_or_meaningful(self.node)
    }

    /// Whether text here must be emitted literally: the node or one of its
    /// ancestors is `code`, `kbd` or `pre`.
    pub fn is_code(&self) -> bool {
        let mut current = Some(self);
        while let Some(node) = current {
            if matches!(node.tag_name(), "code" | "kbd" | "pre") {
                return true;
            }
            current = node.parent;
        }
        false
    }
}

fn has_void_or_meaningful(node: &Node) -> bool {
    node.element_children().any(|child| {
        is_void(&child.tag_name)
            || is_meaningful_when_blank(&child.tag_name)
            || has_void_or_meaningful(child)
    })
}
