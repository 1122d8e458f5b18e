//! Markdown processing for quire documentation pages.
//!
//! This crate parses markdown pages (YAML frontmatter, fenced code blocks,
//! table of contents) and renders them to HTML. Optional syntax is provided
//! by named [`MarkdownExtension`]s resolved through an [`ExtensionRegistry`].

pub mod codeblock;
pub mod extension;
pub mod frontmatter;
pub mod parser;
pub mod render;

pub use codeblock::{CodeBlock, FenceInfo};
pub use extension::{ExtensionError, ExtensionRegistry, MarkdownExtension};
pub use frontmatter::Frontmatter;
pub use parser::{parse_markdown, parse_markdown_with, slugify, ParseError, ParsedDoc, TocEntry};
pub use render::MarkdownRenderer;
