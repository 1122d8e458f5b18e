//! Markdown to HTML rendering.

use std::sync::Arc;

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::codeblock::{CodeBlock, FenceInfo};
use crate::extension::MarkdownExtension;
use crate::parser::{base_options, parse_markdown_with, ParseError, ParsedDoc, Slugger};

/// Renders page bodies to HTML with a fixed set of extensions.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    line_numbers: bool,
    extensions: Vec<Arc<dyn MarkdownExtension>>,
}

impl MarkdownRenderer {
    /// Create a renderer applying `extensions` in order.
    pub fn new(line_numbers: bool, extensions: Vec<Arc<dyn MarkdownExtension>>) -> Self {
        let options = extensions
            .iter()
            .fold(base_options(), |acc, ext| acc | ext.options());

        Self {
            options,
            line_numbers,
            extensions,
        }
    }

    /// Parser options in effect.
    pub fn options(&self) -> Options {
        self.options
    }

    /// Whether code blocks get a line-number gutter.
    pub fn line_numbers(&self) -> bool {
        self.line_numbers
    }

    /// Names of the applied extensions.
    pub fn extension_names(&self) -> Vec<&'static str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    /// Parse a page with the same options used for rendering.
    pub fn parse(&self, source: &str) -> Result<ParsedDoc, ParseError> {
        parse_markdown_with(source, self.options)
    }

    /// Render a page body (frontmatter already stripped) to HTML.
    pub fn render(&self, content: &str) -> String {
        let mut events: Vec<Event<'_>> = Parser::new_ext(content, self.options).collect();

        assign_heading_ids(&mut events);
        let mut events = self.render_code_blocks(events);

        for extension in &self.extensions {
            events = extension.transform(events);
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Replace code block events with pre-rendered HTML.
    fn render_code_blocks<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut output = Vec::with_capacity(events.len());
        let mut current: Option<(FenceInfo, String)> = None;

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let info = match &kind {
                        CodeBlockKind::Fenced(info) => FenceInfo::parse(info),
                        CodeBlockKind::Indented => FenceInfo::parse(""),
                    };
                    current = Some((info, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((info, source)) = current.take() {
                        let block = CodeBlock::new(info, source, 0);
                        output.push(Event::Html(block.to_html(self.line_numbers).into()));
                    }
                }
                Event::Text(text) if current.is_some() => {
                    if let Some((_, source)) = current.as_mut() {
                        source.push_str(&text);
                    }
                }
                other => output.push(other),
            }
        }

        output
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(false, Vec::new())
    }
}

/// Give every heading an anchor id matching the table of contents.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut slugger = Slugger::default();
    let mut i = 0;

    while i < events.len() {
        if matches!(events[i], Event::Start(Tag::Heading { .. })) {
            let mut text = String::new();
            let mut end = i + 1;
            while end < events.len() && !matches!(events[end], Event::End(TagEnd::Heading(_))) {
                if let Event::Text(t) | Event::Code(t) = &events[end] {
                    text.push_str(t);
                }
                end += 1;
            }

            if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                let assigned = match id.take() {
                    Some(explicit) => slugger.claim(&explicit),
                    None => slugger.slug(&text),
                };
                *id = Some(assigned.into());
            }
            i = end;
        }
        i += 1;
    }
}
