//! CopyDown - the main entry point for HTML to Markdown conversion.

use crate::convert::Conversion;
use crate::node::{Node, NodeRef};
use crate::options::Options;
use crate::rules::Rules;
use crate::whitespace::collapse_whitespace;
use crate::{Error, Result};

/// The conversion engine.
///
/// Options and rules are fixed at construction and only read afterwards;
/// everything a single conversion writes lives in a per-call
/// [`Conversion`], so one engine can serve concurrent callers.
pub struct CopyDown {
    options: Options,
    rules: Rules,
}

impl CopyDown {
    /// Create a converter with default options
    pub fn new() -> Self {
        Self {
            options: Options::default(),
            rules: Rules::new(),
        }
    }

    /// Create a converter with custom options
    pub fn with_options(options: Options) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            rules: Rules::new(),
        })
    }

    /// Get the current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get the rule table
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Convert a node tree to Markdown.
    ///
    /// A document root renders its children; an element root renders
    /// itself. The tree is not modified.
    pub fn convert(&self, root: &Node) -> Result<String> {
        let depth = root.depth();
        if depth > self.options.max_depth {
            return Err(Error::NestingTooDeep {
                depth,
                max: self.options.max_depth,
            });
        }

        let collapsed;
        let root = if self.options.collapse_whitespace {
            let mut copy = root.clone();
            collapse_whitespace(&mut copy);
            collapsed = copy;
            &collapsed
        } else {
            root
        };

        log::debug!("converting {} nodes (depth {})", root.count(), depth);

        let mut conversion = Conversion::new(&self.options, &self.rules);
        let cursor = NodeRef::root(root);
        let output = if root.is_element() {
            conversion.replacement_for_node(&cursor)?
        } else {
            conversion.process(&cursor)?
        };

        let references = conversion.references().len();
        let markdown = conversion.finish(output);
        log::debug!(
            "converted to {} bytes of markdown ({} references)",
            markdown.len(),
            references
        );
        Ok(markdown)
    }

    /// Parse an HTML string and convert it to Markdown.
    ///
    /// Input nested deeper than `max_depth` fails with
    /// [`Error::NestingTooDeep`] before a tree is built.
    #[cfg(feature = "html")]
    pub fn convert_html(&self, html: &str) -> Result<String> {
        let root = crate::html::parse_html_with_max_depth(html, self.options.max_depth)?;
        self.convert(&root)
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        crate::escape::escape(text)
    }
}

impl Default for CopyDown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CodeBlockStyle, HeadingStyle, LinkReferenceStyle, LinkStyle};

    fn make_p(text: &str) -> Node {
        Node::element("p").with_child(Node::text(text))
    }

    fn list(tag: &str, items: &[&str]) -> Node {
        items.iter().fold(Node::element(tag), |list, item| {
            list.with_child(Node::element("li").with_child(Node::text(item)))
        })
    }

    fn link(href: &str, text: &str) -> Node {
        Node::element_with_attrs("a", vec![("href", href)]).with_child(Node::text(text))
    }

    fn convert_with(options: Options, node: &Node) -> String {
        CopyDown::with_options(options).unwrap().convert(node).unwrap()
    }

    #[test]
    fn test_simple_paragraph() {
        let service = CopyDown::new();
        let result = service.convert(&make_p("Hello World")).unwrap();
        assert_eq!(result, "Hello World");
    }

    #[test]
    fn test_heading_and_paragraph() {
        let doc = Node::document()
            .with_child(Node::element("h1").with_child(Node::text("Title")))
            .with_child(
                Node::element("p")
                    .with_child(Node::text("Hello "))
                    .with_child(Node::element("strong").with_child(Node::text("world"))),
            );
        let result = CopyDown::new().convert(&doc).unwrap();
        assert_eq!(result, "# Title\n\nHello **world**");
    }

    #[test]
    fn test_heading_setext() {
        let options = Options {
            heading_style: HeadingStyle::Setext,
            ..Default::default()
        };
        let h1 = Node::element("h1").with_child(Node::text("Title"));
        let h2 = Node::element("h2").with_child(Node::text("Sub"));
        let h3 = Node::element("h3").with_child(Node::text("Deep"));
        assert_eq!(convert_with(options.clone(), &h1), "Title\n=====");
        assert_eq!(convert_with(options.clone(), &h2), "Sub\n---");
        assert_eq!(convert_with(options, &h3), "### Deep");
    }

    #[test]
    fn test_emphasis_and_strong() {
        let service = CopyDown::new();
        let em = Node::element("em").with_child(Node::text("emphasized"));
        assert_eq!(service.convert(&em).unwrap(), "_emphasized_");

        let options = Options {
            em_delimiter: "*".to_string(),
            strong_delimiter: "__".to_string(),
            ..Default::default()
        };
        let p = Node::element("p")
            .with_child(Node::element("i").with_child(Node::text("a")))
            .with_child(Node::text(" "))
            .with_child(Node::element("b").with_child(Node::text("b")));
        assert_eq!(convert_with(options, &p), "*a* __b__");
    }

    #[test]
    fn test_whitespace_only_inline_renders_nothing() {
        let p = Node::element("p")
            .with_child(Node::text("a"))
            .with_child(Node::element("strong").with_child(Node::text(" ")))
            .with_child(Node::text("b"));
        assert_eq!(CopyDown::new().convert(&p).unwrap(), "a b");
    }

    #[test]
    fn test_line_break() {
        let p = Node::element("p")
            .with_child(Node::text("one"))
            .with_child(Node::element("br"))
            .with_child(Node::text("two"));
        assert_eq!(CopyDown::new().convert(&p).unwrap(), "one  \ntwo");
    }

    #[test]
    fn test_inline_link() {
        let service = CopyDown::new();
        let result = service.convert(&link("https://example.com", "Link")).unwrap();
        assert_eq!(result, "[Link](https://example.com)");

        let titled = Node::element_with_attrs("a", vec![("href", "/x"), ("title", "A\n\n  title")])
            .with_child(Node::text("x"));
        assert_eq!(service.convert(&titled).unwrap(), "[x](/x \"A\ntitle\")");
    }

    #[test]
    fn test_anchor_without_href_passes_through() {
        let a = Node::element_with_attrs("a", vec![("name", "top")]).with_child(Node::text("Top"));
        assert_eq!(CopyDown::new().convert(&a).unwrap(), "Top");
    }

    #[test]
    fn test_reference_links() {
        let doc = Node::document()
            .with_child(link("http://x", "t"))
            .with_child(Node::text(" and "))
            .with_child(link("http://y", "u"));

        let full = Options {
            link_style: LinkStyle::Referenced,
            ..Default::default()
        };
        assert_eq!(
            convert_with(full.clone(), &doc),
            "[t][1] and [u][2]\n\n[1]: http://x\n[2]: http://y"
        );

        let collapsed = Options {
            link_reference_style: LinkReferenceStyle::Collapsed,
            ..full.clone()
        };
        assert_eq!(
            convert_with(collapsed, &doc),
            "[t][] and [u][]\n\n[t]: http://x\n[u]: http://y"
        );

        let shortcut = Options {
            link_reference_style: LinkReferenceStyle::Shortcut,
            ..full
        };
        assert_eq!(
            convert_with(shortcut, &doc),
            "[t] and [u]\n\n[t]: http://x\n[u]: http://y"
        );
    }

    #[test]
    fn test_image() {
        let service = CopyDown::new();
        let img = Node::element_with_attrs("img", vec![("src", "test.png"), ("alt", "Alt")]);
        assert_eq!(service.convert(&img).unwrap(), "![Alt](test.png)");

        let titled = Node::element_with_attrs(
            "img",
            vec![("src", "a.png"), ("alt", "A"), ("title", "T")],
        );
        assert_eq!(service.convert(&titled).unwrap(), "![A](a.png \"T\")");

        let no_src = Node::element_with_attrs("img", vec![("alt", "Alt")]);
        assert_eq!(service.convert(&no_src).unwrap(), "");
    }

    #[test]
    fn test_inline_code() {
        let service = CopyDown::new();
        let code = Node::element("code").with_child(Node::text("code"));
        assert_eq!(service.convert(&code).unwrap(), "`code`");

        let ticks = Node::element("code").with_child(Node::text("a `b` c"));
        assert_eq!(service.convert(&ticks).unwrap(), "``a `b` c``");

        let edge = Node::element("code").with_child(Node::text("`x``"));
        assert_eq!(service.convert(&edge).unwrap(), "``` `x`` ```");
    }

    #[test]
    fn test_horizontal_rule() {
        let service = CopyDown::new();
        assert_eq!(service.convert(&Node::element("hr")).unwrap(), "* * *");
    }

    #[test]
    fn test_blockquote() {
        let blockquote = Node::element("blockquote")
            .with_child(make_p("Quote"))
            .with_child(make_p("More"));
        let result = CopyDown::new().convert(&blockquote).unwrap();
        assert_eq!(result, "> Quote\n> \n> More");
    }

    #[test]
    fn test_fenced_code_block() {
        let pre = Node::element("pre").with_child(
            Node::element_with_attrs("code", vec![("class", "language-rust")])
                .with_child(Node::text("let x = 1;\n")),
        );
        let result = CopyDown::new().convert(&pre).unwrap();
        assert_eq!(result, "```rust\nlet x = 1;\n```");
    }

    #[test]
    fn test_fence_grows_past_fences_in_code() {
        let pre = Node::element("pre").with_child(
            Node::element("code").with_child(Node::text("```\ninner\n```")),
        );
        let result = CopyDown::new().convert(&pre).unwrap();
        assert_eq!(result, "````\n```\ninner\n```\n````");

        let options = Options {
            fence: "~~~".to_string(),
            ..Default::default()
        };
        let pre = Node::element("pre").with_child(
            Node::element("code").with_child(Node::text("~~~~~\nx")),
        );
        assert_eq!(convert_with(options, &pre), "~~~~~~\n~~~~~\nx\n~~~~~~");
    }

    #[test]
    fn test_long_configured_fence_only_picks_the_character() {
        let options = Options {
            fence: "````".to_string(),
            ..Default::default()
        };
        let pre = Node::element("pre").with_child(Node::element("code").with_child(Node::text("x")));
        assert_eq!(convert_with(options, &pre), "```\nx\n```");
    }

    #[test]
    fn test_indented_code_block() {
        let options = Options {
            code_block_style: CodeBlockStyle::Indented,
            ..Default::default()
        };
        let pre = Node::element("pre").with_child(
            Node::element("code").with_child(Node::text("fn main() {}\n  body\n")),
        );
        assert_eq!(convert_with(options, &pre), "    fn main() {}\n      body");
    }

    #[test]
    fn test_unordered_list() {
        let result = CopyDown::new().convert(&list("ul", &["One", "Two"])).unwrap();
        assert_eq!(result, "-   One\n-   Two");
    }

    #[test]
    fn test_ordered_list() {
        let result = CopyDown::new().convert(&list("ol", &["One", "Two"])).unwrap();
        assert_eq!(result, "1.  One\n2.  Two");
    }

    #[test]
    fn test_ordered_list_start() {
        let mut ol = list("ol", &["a", "b", "c"]);
        ol.set_attr("start", "5");
        let result = CopyDown::new().convert(&ol).unwrap();
        assert_eq!(result, "5.  a\n6.  b\n7.  c");
    }

    #[test]
    fn test_ordered_list_bad_start_is_an_error() {
        let mut ol = list("ol", &["a"]);
        ol.set_attr("start", "five");
        let err = CopyDown::new().convert(&ol).unwrap_err();
        assert!(matches!(err, Error::InvalidListStart { ref value } if value == "five"));
    }

    #[test]
    fn test_nested_list() {
        let ul = Node::element("ul")
            .with_child(
                Node::element("li")
                    .with_child(Node::text("Parent"))
                    .with_child(list("ul", &["Child", "Sibling"])),
            )
            .with_child(Node::element("li").with_child(Node::text("Next")));
        let result = CopyDown::new().convert(&ul).unwrap();
        assert_eq!(result, "-   Parent\n    -   Child\n    -   Sibling\n-   Next");
    }

    #[test]
    fn test_list_item_with_paragraphs() {
        let ul = Node::element("ul")
            .with_child(Node::element("li").with_child(make_p("First")).with_child(make_p("Second")))
            .with_child(Node::element("li").with_child(Node::text("Next")));
        let result = CopyDown::new().convert(&ul).unwrap();
        assert_eq!(result, "-   First\n    \n    Second\n    \n-   Next");
    }

    #[test]
    fn test_paragraph_items_keep_indented_blank_line() {
        let ul = Node::element("ul")
            .with_child(Node::element("li").with_child(make_p("a")))
            .with_child(Node::element("li").with_child(make_p("b")));
        assert_eq!(CopyDown::new().convert(&ul).unwrap(), "-   a\n    \n-   b");
    }

    #[test]
    fn test_whitespace_only_code_between_words() {
        let p = Node::element("p")
            .with_child(Node::text("a"))
            .with_child(Node::element("code").with_child(Node::text(" ")))
            .with_child(Node::text("b"));
        assert_eq!(CopyDown::new().convert(&p).unwrap(), "a b");

        let options = Options {
            collapse_whitespace: false,
            ..Default::default()
        };
        assert_eq!(convert_with(options, &p), "a b");
    }

    #[test]
    fn test_deep_tree_is_rejected_without_overflow() {
        let mut deep = Node::text("x");
        for _ in 0..200_000 {
            deep = Node::element("span").with_child(deep);
        }
        let err = CopyDown::new().convert(&deep).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep { depth: 200_001, max: 512 }));
    }

    #[test]
    fn test_unknown_elements_fall_through() {
        let doc = Node::document()
            .with_child(Node::element("section").with_child(make_p("inside")))
            .with_child(Node::element("x-widget").with_child(Node::text("inline")));
        assert_eq!(CopyDown::new().convert(&doc).unwrap(), "inside\n\ninline");
    }

    #[test]
    fn test_too_deep_is_rejected() {
        let options = Options {
            max_depth: 3,
            ..Default::default()
        };
        let deep = Node::element("div")
            .with_child(Node::element("div").with_child(Node::element("div").with_child(Node::text("x"))));
        let err = CopyDown::with_options(options).unwrap().convert(&deep).unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep { depth: 4, max: 3 }));
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let options = Options {
            fence: "--".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            CopyDown::with_options(options),
            Err(Error::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_input_tree_is_not_modified() {
        let p = make_p("  spaced   out  ");
        let before = p.clone();
        CopyDown::new().convert(&p).unwrap();
        assert_eq!(p, before);
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CopyDown>();
    }
}
