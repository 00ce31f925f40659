//! Rule system for HTML to Markdown conversion.

mod commonmark;
mod rule;
mod table;

pub use commonmark::commonmark_rules;
pub use rule::{AppendFn, Filter, PredicateFn, ReplacementFn, Rule};

use indexmap::IndexMap;

use crate::node::NodeRef;
use crate::options::Options;

/// Ordered collection of named rules.
///
/// Rules are tried in insertion order and the first whose filter matches
/// wins, so several rules may share a tag and differ only by context.
pub struct Rules {
    rules: IndexMap<&'static str, Rule>,
}

impl Rules {
    /// Create a new Rules instance with CommonMark rules
    pub fn new() -> Self {
        Self {
            rules: commonmark_rules().into_iter().collect(),
        }
    }

    /// Find the rule for an element, with its name
    pub fn for_node(&self, node: &NodeRef, options: &Options) -> Option<(&'static str, &Rule)> {
        let tag = node.tag_name();
        self.rules
            .iter()
            .find(|(_, rule)| rule.filter.matches(tag, node, options))
            .map(|(name, rule)| (*name, rule))
    }

    /// Look a rule up by name
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Rule names in evaluation order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }

    /// Rules with a deferred append, in evaluation order
    pub fn appends(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values().filter(|rule| rule.has_append())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn test_rule_order() {
        let rules = Rules::new();
        let names: Vec<_> = rules.names().collect();
        assert_eq!(names.first(), Some(&"blank"));
        assert_eq!(names.last(), Some(&"default"));
        assert_eq!(rules.appends().count(), 1);
        assert!(rules.get("reference_link").is_some_and(Rule::has_append));
    }

    #[test]
    fn test_first_match_wins() {
        let rules = Rules::new();
        let options = Options::default();

        let empty = Node::element("p");
        let (name, _) = rules.for_node(&NodeRef::root(&empty), &options).unwrap();
        assert_eq!(name, "blank");

        let p = Node::element("p").with_child(Node::text("x"));
        let (name, _) = rules.for_node(&NodeRef::root(&p), &options).unwrap();
        assert_eq!(name, "paragraph");

        let unknown = Node::element("custom-tag").with_child(Node::text("x"));
        let (name, _) = rules.for_node(&NodeRef::root(&unknown), &options).unwrap();
        assert_eq!(name, "default");
    }

    #[test]
    fn test_code_inside_pre_is_not_inline_code() {
        let rules = Rules::new();
        let options = Options::default();
        let pre = Node::element("pre").with_child(Node::element("code").with_child(Node::text("x")));
        let root = NodeRef::root(&pre);
        let code = root.children().next().unwrap();
        let (name, _) = rules.for_node(&code, &options).unwrap();
        assert_eq!(name, "default");

        let (name, _) = rules.for_node(&root, &options).unwrap();
        assert_eq!(name, "fenced_code_block");
    }

    #[test]
    fn test_link_style_selects_one_link_rule() {
        let rules = Rules::new();
        let a = Node::element_with_attrs("a", vec![("href", "http://x")]).with_child(Node::text("t"));
        let root = NodeRef::root(&a);

        let (name, _) = rules.for_node(&root, &Options::default()).unwrap();
        assert_eq!(name, "inline_link");

        let referenced = Options {
            link_style: crate::LinkStyle::Referenced,
            ..Default::default()
        };
        let (name, _) = rules.for_node(&root, &referenced).unwrap();
        assert_eq!(name, "reference_link");
    }
}
