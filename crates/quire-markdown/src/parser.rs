//! Markdown document parser.

use std::collections::HashMap;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::codeblock::{CodeBlock, FenceInfo};
use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};

/// Parser options every page gets regardless of configured extensions.
pub fn base_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// A parsed markdown document.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Markdown content (without frontmatter)
    pub content: String,

    /// Extracted code blocks
    pub code_blocks: Vec<CodeBlock>,

    /// Table of contents entries
    pub toc: Vec<TocEntry>,
}

impl ParsedDoc {
    /// Title from frontmatter, falling back to the first level-1 heading.
    pub fn title(&self) -> Option<&str> {
        self.frontmatter
            .as_ref()
            .and_then(|f| f.title.as_deref())
            .or_else(|| {
                self.toc
                    .iter()
                    .find(|e| e.level == 1)
                    .map(|e| e.title.as_str())
            })
    }
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Errors that can occur when parsing markdown.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Parse a markdown document with the base options.
pub fn parse_markdown(source: &str) -> Result<ParsedDoc, ParseError> {
    parse_markdown_with(source, base_options())
}

/// Parse a markdown document.
///
/// Extracts frontmatter, code blocks, and generates a table of contents.
/// `options` should match the options used for rendering so heading ids agree.
pub fn parse_markdown_with(source: &str, options: Options) -> Result<ParsedDoc, ParseError> {
    // Extract frontmatter first
    let (frontmatter, content) = extract_frontmatter(source)?;

    let mut code_blocks = Vec::new();
    let mut toc = Vec::new();
    let mut slugger = Slugger::default();

    // Count lines in frontmatter to offset line numbers
    let frontmatter_len = source.len() - content.len();
    let frontmatter_line_offset = source[..frontmatter_len].matches('\n').count();

    let mut current_code_block: Option<(FenceInfo, String, usize)> = None;
    let mut current_heading: Option<(u8, Option<String>, String)> = None;

    for (event, range) in Parser::new_ext(content, options).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let info = match &kind {
                    CodeBlockKind::Fenced(info) => FenceInfo::parse(info),
                    CodeBlockKind::Indented => FenceInfo::parse(""),
                };
                let line = content[..range.start].matches('\n').count() + 1;
                current_code_block = Some((info, String::new(), line + frontmatter_line_offset));
            }

            Event::End(TagEnd::CodeBlock) => {
                if let Some((info, source, line)) = current_code_block.take() {
                    code_blocks.push(CodeBlock::new(info, source, line));
                }
            }

            Event::Start(Tag::Heading { level, id, .. }) => {
                current_heading = Some((level as u8, id.map(|i| i.to_string()), String::new()));
            }

            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, explicit_id, title)) = current_heading.take() {
                    let id = match explicit_id {
                        Some(id) => slugger.claim(&id),
                        None => slugger.slug(&title),
                    };
                    toc.push(TocEntry { title, id, level });
                }
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some((_, ref mut source, _)) = current_code_block {
                    source.push_str(&text);
                } else if let Some((_, _, ref mut heading_text)) = current_heading {
                    heading_text.push_str(&text);
                }
            }

            _ => {}
        }
    }

    Ok(ParsedDoc {
        frontmatter,
        content: content.to_string(),
        code_blocks,
        toc,
    })
}

/// Generates unique heading anchors within one document.
///
/// Repeated headings get `-1`, `-2`, ... suffixes in document order.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Slugify `text` and make it unique.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        self.claim(&base)
    }

    /// Reserve an id as-is, suffixing it if already taken.
    pub fn claim(&mut self, id: &str) -> String {
        match self.seen.get_mut(id) {
            Some(count) => {
                *count += 1;
                let unique = format!("{}-{}", id, count);
                self.seen.insert(unique.clone(), 0);
                unique
            }
            None => {
                self.seen.insert(id.to_string(), 0);
                id.to_string()
            }
        }
    }
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
