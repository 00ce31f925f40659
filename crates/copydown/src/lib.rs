//! # copydown
//!
//! Convert parsed HTML trees to Markdown.
//!
//! ## Design
//!
//! Conversion is a small interpreter over a DOM tree: an ordered table of
//! rules, each a filter plus a replacement function, is consulted for every
//! element while a reducer renders children first and joins the rendered
//! fragments with blank-line collapsing.
//!
//! The converter accepts a parser-agnostic [`Node`] tree. With the default
//! `html` feature, HTML strings are parsed with scraper/html5ever first.
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use copydown::{CopyDown, Node};
//!
//! let converter = CopyDown::new();
//!
//! let h1 = Node::element("h1").with_child(Node::text("Hello World"));
//!
//! let markdown = converter.convert(&h1).unwrap();
//! assert_eq!(markdown, "# Hello World");
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! # #[cfg(feature = "html")]
//! # {
//! use copydown::CopyDown;
//!
//! let converter = CopyDown::new();
//! let markdown = converter
//!     .convert_html("<p>Hello <strong>World</strong></p>")
//!     .unwrap();
//! assert_eq!(markdown, "Hello **World**");
//! # }
//! ```

mod convert;
mod escape;
#[cfg(feature = "html")]
pub mod html;
pub mod node;
mod options;
mod rules;
mod service;
mod utilities;
mod whitespace;

pub use convert::Conversion;
pub use escape::escape;
#[cfg(feature = "html")]
pub use html::{parse_html, parse_html_with_max_depth};
pub use node::{Node, NodeRef, NodeType};
pub use options::{CodeBlockStyle, HeadingStyle, LinkReferenceStyle, LinkStyle, Options};
pub use rules::{AppendFn, Filter, PredicateFn, ReplacementFn, Rule, Rules};
pub use service::CopyDown;
pub use utilities::{clean_attribute, join};
pub use whitespace::{collapse_whitespace, flanking_whitespace, FlankingWhitespace};

/// Error type for conversion operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unable to parse {value:?} as an integer list start")]
    InvalidListStart { value: String },

    #[error("Nesting depth {depth} exceeds the maximum of {max}")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

pub type Result<T> = std::result::Result<T, Error>;
