//! Tree reduction: render a Node tree to Markdown through the rule table.
//!
//! A [`Conversion`] lives for exactly one top-level conversion. It holds the
//! state rules may write to while rendering (collected reference links), so
//! concurrent conversions on one [`CopyDown`](crate::CopyDown) never share
//! mutable state.

use crate::escape::escape;
use crate::node::{NodeRef, NodeType};
use crate::options::Options;
use crate::rules::Rules;
use crate::utilities::{push_joined, trim_output};
use crate::whitespace::flanking_whitespace;
use crate::Result;

/// Per-call conversion context passed to every rule replacement
pub struct Conversion<'a> {
    options: &'a Options,
    rules: &'a Rules,
    references: Vec<String>,
}

impl<'a> Conversion<'a> {
    pub(crate) fn new(options: &'a Options, rules: &'a Rules) -> Self {
        Self {
            options,
            rules,
            references: Vec::new(),
        }
    }

    pub fn options(&self) -> &'a Options {
        self.options
    }

    /// Reference link definitions collected so far, in encounter order
    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn add_reference(&mut self, reference: String) {
        self.references.push(reference);
    }

    /// Render the children of `node` and join them
    pub fn process(&mut self, node: &NodeRef) -> Result<String> {
        let mut result = String::new();

        for child in node.children() {
            let replacement = match child.node.node_type {
                NodeType::Text if child.is_code() => child.value().to_string(),
                NodeType::Text => escape(child.value()),
                NodeType::Element => self.replacement_for_node(&child)?,
                NodeType::Comment | NodeType::Document => continue,
            };
            push_joined(&mut result, &replacement);
        }

        Ok(result)
    }

    /// Render a single element through the first rule that matches it
    pub fn replacement_for_node(&mut self, node: &NodeRef) -> Result<String> {
        let rules = self.rules;
        let Some((name, rule)) = rules.for_node(node, self.options) else {
            return self.process(node);
        };
        log::trace!("<{}> -> rule {}", node.tag_name(), name);

        let mut content = if rule.renders_content() {
            self.process(node)?
        } else {
            String::new()
        };

        let flanking = flanking_whitespace(node, &content);
        if !node.is_block() && content.trim().len() != content.len() {
            content = content.trim().to_string();
        }

        let replacement = rule.replace(&content, node, self)?;
        Ok(format!("{}{}{}", flanking.leading, replacement, flanking.trailing))
    }

    /// Append the rules' deferred fragments and trim the result
    pub(crate) fn finish(self, output: String) -> String {
        let mut output = output;
        for rule in self.rules.appends() {
            if let Some(fragment) = rule.append(&self) {
                push_joined(&mut output, &fragment);
            }
        }
        trim_output(&output).to_string()
    }
}
