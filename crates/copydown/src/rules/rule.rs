//! Rule descriptors: a filter deciding which elements a rule owns and the
//! functions producing its Markdown.

use crate::convert::Conversion;
use crate::node::NodeRef;
use crate::options::Options;
use crate::Result;

/// `(content, node, conversion)` to the element's Markdown
pub type ReplacementFn =
    Box<dyn Fn(&str, &NodeRef, &mut Conversion) -> Result<String> + Send + Sync>;

/// Run once per conversion, after the whole tree has been rendered
pub type AppendFn = Box<dyn Fn(&Conversion) -> String + Send + Sync>;

/// `(tag, node, options)` to whether the rule applies
pub type PredicateFn = Box<dyn Fn(&str, &NodeRef, &Options) -> bool + Send + Sync>;

/// Which elements a rule applies to. Tag names are lower-case.
pub enum Filter {
    Tag(&'static str),
    Tags(&'static [&'static str]),
    /// Context-sensitive match, e.g. on attributes, parent or options
    Predicate(PredicateFn),
}

impl Filter {
    pub fn tag(name: &'static str) -> Self {
        Filter::Tag(name)
    }

    pub fn tags(names: &'static [&'static str]) -> Self {
        Filter::Tags(names)
    }

    pub fn predicate<P>(predicate: P) -> Self
    where
        P: Fn(&str, &NodeRef, &Options) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(predicate))
    }

    pub fn matches(&self, tag: &str, node: &NodeRef, options: &Options) -> bool {
        match self {
            Filter::Tag(name) => *name == tag,
            Filter::Tags(names) => names.contains(&tag),
            Filter::Predicate(predicate) => predicate(tag, node, options),
        }
    }
}

/// Whether the reducer renders an element's children before calling the
/// rule's replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Content {
    Rendered,
    /// The replacement walks the element itself; `content` is empty
    Skipped,
}

/// One entry of the rule table.
///
/// The replacement receives the element's rendered children and returns
/// its Markdown. A rule may also carry an append, used for output that can
/// only be produced once the whole tree is known, such as reference link
/// definitions.
pub struct Rule {
    pub filter: Filter,
    replacement: ReplacementFn,
    append: Option<AppendFn>,
    content: Content,
}

impl Rule {
    pub fn new<R>(filter: Filter, replacement: R) -> Self
    where
        R: Fn(&str, &NodeRef, &mut Conversion) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
            append: None,
            content: Content::Rendered,
        }
    }

    /// Shorthand for a rule owning a single tag
    pub fn for_tag<R>(tag: &'static str, replacement: R) -> Self
    where
        R: Fn(&str, &NodeRef, &mut Conversion) -> Result<String> + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Shorthand for a rule owning several tags
    pub fn for_tags<R>(tags: &'static [&'static str], replacement: R) -> Self
    where
        R: Fn(&str, &NodeRef, &mut Conversion) -> Result<String> + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    pub fn with_append<A>(mut self, append: A) -> Self
    where
        A: Fn(&Conversion) -> String + Send + Sync + 'static,
    {
        self.append = Some(Box::new(append));
        self
    }

    /// Skip rendering the children; the replacement gets empty content.
    pub fn without_content(mut self) -> Self {
        self.content = Content::Skipped;
        self
    }

    pub fn renders_content(&self) -> bool {
        self.content == Content::Rendered
    }

    pub fn has_append(&self) -> bool {
        self.append.is_some()
    }

    pub fn replace(
        &self,
        content: &str,
        node: &NodeRef,
        conversion: &mut Conversion,
    ) -> Result<String> {
        (self.replacement)(content, node, conversion)
    }

    /// `None` when the rule has no append
    pub fn append(&self, conversion: &Conversion) -> Option<String> {
        self.append.as_ref().map(|append| append(conversion))
    }
}
