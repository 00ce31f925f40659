//! Configuration options for the converter

use crate::{Error, Result};

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// Use ATX-style headings (prefixed with #)
    #[default]
    Atx,
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    Setext,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    /// Use indented code blocks (4 spaces)
    Indented,
    /// Use fenced code blocks (```)
    #[default]
    Fenced,
}

/// Link style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStyle {
    /// Use inline links [text](url)
    #[default]
    Inlined,
    /// Use reference links [text][ref], definitions appended to the output
    Referenced,
}

/// Reference style for referenced links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkReferenceStyle {
    /// Numbered full reference: [text][1]
    #[default]
    Full,
    /// Collapsed reference: [text][]
    Collapsed,
    /// Shortcut reference: [text]
    Shortcut,
}

/// Options for HTML to Markdown conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Emitted before the newline of a `<br>`
    pub br: String,

    /// Horizontal rule string
    pub hr: String,

    /// Emphasis delimiter
    pub em_delimiter: String,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Heading style (setext or atx)
    pub heading_style: HeadingStyle,

    /// Bullet list marker
    pub bullet_list_marker: String,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks; its first character is the one
    /// repeated when the fence has to grow
    pub fence: String,

    /// Link style
    pub link_style: LinkStyle,

    /// Reference style for referenced links
    pub link_reference_style: LinkReferenceStyle,

    /// Normalize insignificant whitespace in text before rendering
    pub collapse_whitespace: bool,

    /// Deepest tree accepted by a conversion
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            br: "  ".to_string(),
            hr: "* * *".to_string(),
            em_delimiter: "_".to_string(),
            strong_delimiter: "**".to_string(),
            heading_style: HeadingStyle::Atx,
            bullet_list_marker: "-".to_string(),
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            link_style: LinkStyle::Inlined,
            link_reference_style: LinkReferenceStyle::Full,
            collapse_whitespace: true,
            max_depth: 512,
        }
    }
}

impl Options {
    /// Check the options for values no rule can work with
    pub fn validate(&self) -> Result<()> {
        let mut chars = self.fence.chars();
        let first = chars.next();
        let uniform = first.is_some_and(|c| chars.all(|other| other == c));
        if !matches!(first, Some('`' | '~')) || !uniform || self.fence.chars().count() < 3 {
            return Err(Error::InvalidOptions(format!(
                "fence must be three or more backticks or tildes, got {:?}",
                self.fence
            )));
        }

        if self.max_depth == 0 {
            return Err(Error::InvalidOptions(
                "max_depth must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Character repeated to build a fence
    pub(crate) fn fence_char(&self) -> char {
        self.fence.chars().next().unwrap_or('`')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.br, "  ");
        assert_eq!(options.hr, "* * *");
        assert_eq!(options.heading_style, HeadingStyle::Atx);
        assert_eq!(options.code_block_style, CodeBlockStyle::Fenced);
        assert_eq!(options.bullet_list_marker, "-");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_fence_validation() {
        for fence in ["~~~", "````"] {
            let options = Options {
                fence: fence.to_string(),
                ..Default::default()
            };
            assert!(options.validate().is_ok(), "{fence}");
        }

        for fence in ["", "``", "`~`", "***"] {
            let options = Options {
                fence: fence.to_string(),
                ..Default::default()
            };
            assert!(
                matches!(options.validate(), Err(Error::InvalidOptions(_))),
                "{fence}"
            );
        }
    }

    #[test]
    fn test_depth_validation() {
        let options = Options {
            max_depth: 0,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }
}
