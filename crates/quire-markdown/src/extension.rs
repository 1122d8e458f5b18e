//! Named markdown extensions and the registry that resolves them.
//!
//! Site configuration only names the extensions it wants (`footnote`,
//! `tasklist`, ...). The registry maps each name to a [`MarkdownExtension`],
//! which the renderer applies while setting up its parser.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use pulldown_cmark::{CowStr, Event, Options, Tag, TagEnd};

/// A markdown rendering capability that can be enabled by name.
pub trait MarkdownExtension: Send + Sync + fmt::Debug {
    /// Name used to request this extension from configuration
    fn name(&self) -> &'static str;

    /// Parser options this extension turns on
    fn options(&self) -> Options {
        Options::empty()
    }

    /// Rewrite the parsed event stream before it is rendered.
    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        events
    }
}

/// Footnote references (`[^1]`) with definitions gathered at the end of the page.
#[derive(Debug, Default)]
pub struct FootnoteExtension;

impl MarkdownExtension for FootnoteExtension {
    fn name(&self) -> &'static str {
        "footnote"
    }

    fn options(&self) -> Options {
        Options::ENABLE_FOOTNOTES
    }

    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut body = Vec::with_capacity(events.len());
        let mut definitions = Vec::new();
        let mut in_definition = false;

        for event in events {
            match event {
                Event::Start(Tag::FootnoteDefinition(_)) => {
                    in_definition = true;
                    definitions.push(event);
                }
                Event::End(TagEnd::FootnoteDefinition) => {
                    in_definition = false;
                    definitions.push(event);
                }
                _ if in_definition => definitions.push(event),
                _ => body.push(event),
            }
        }

        if !definitions.is_empty() {
            body.push(Event::Html(CowStr::Borrowed(
                "<hr class=\"footnotes-sep\">\n<section class=\"footnotes\">\n",
            )));
            body.extend(definitions);
            body.push(Event::Html(CowStr::Borrowed("</section>\n")));
        }

        body
    }
}

/// GitHub-style task list items (`- [x] done`).
#[derive(Debug, Default)]
pub struct TaskListExtension;

impl MarkdownExtension for TaskListExtension {
    fn name(&self) -> &'static str {
        "tasklist"
    }

    fn options(&self) -> Options {
        Options::ENABLE_TASKLISTS
    }
}

/// Typographic quotes, dashes, and ellipses.
#[derive(Debug, Default)]
pub struct SmartPunctuationExtension;

impl MarkdownExtension for SmartPunctuationExtension {
    fn name(&self) -> &'static str {
        "smart-punctuation"
    }

    fn options(&self) -> Options {
        Options::ENABLE_SMART_PUNCTUATION
    }
}

/// Custom heading ids and classes (`## Title {#id .class}`).
#[derive(Debug, Default)]
pub struct HeadingAttributesExtension;

impl MarkdownExtension for HeadingAttributesExtension {
    fn name(&self) -> &'static str {
        "heading-attributes"
    }

    fn options(&self) -> Options {
        Options::ENABLE_HEADING_ATTRIBUTES
    }
}

/// A registry of markdown extensions keyed by name.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    extensions: HashMap<String, Arc<dyn MarkdownExtension>>,
}

impl ExtensionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in extension.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FootnoteExtension));
        registry.register(Arc::new(TaskListExtension));
        registry.register(Arc::new(SmartPunctuationExtension));
        registry.register(Arc::new(HeadingAttributesExtension));
        registry
    }

    /// Register an extension, replacing any previous one with the same name.
    pub fn register(
        &mut self,
        extension: Arc<dyn MarkdownExtension>,
    ) -> Option<Arc<dyn MarkdownExtension>> {
        self.extensions
            .insert(extension.name().to_string(), extension)
    }

    /// Look up an extension by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn MarkdownExtension>> {
        self.extensions.get(name).cloned()
    }

    /// Check if an extension exists.
    pub fn contains(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.extensions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve requested names to extensions, in request order.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::Unknown`] for the first name nothing is registered under.
    pub fn resolve<'n>(
        &self,
        names: impl IntoIterator<Item = &'n str>,
    ) -> Result<Vec<Arc<dyn MarkdownExtension>>, ExtensionError> {
        names
            .into_iter()
            .map(|name| {
                self.get(name).ok_or_else(|| ExtensionError::Unknown {
                    name: name.to_string(),
                    available: self.names().join(", "),
                })
            })
            .collect()
    }
}

/// Errors that can occur when resolving extensions.
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    #[error("Unknown markdown extension '{name}' (available: {available})")]
    Unknown { name: String, available: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::Parser;

    #[test]
    fn registers_builtins() {
        let registry = ExtensionRegistry::with_builtins();

        assert_eq!(
            registry.names(),
            vec!["footnote", "heading-attributes", "smart-punctuation", "tasklist"]
        );
    }

    #[test]
    fn resolves_in_request_order() {
        let registry = ExtensionRegistry::with_builtins();

        let resolved = registry.resolve(["tasklist", "footnote"]).unwrap();

        let names: Vec<_> = resolved.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["tasklist", "footnote"]);
    }

    #[test]
    fn rejects_unknown_names() {
        let registry = ExtensionRegistry::with_builtins();

        let err = registry.resolve(["footnote", "emoji"]).unwrap_err();

        assert!(matches!(err, ExtensionError::Unknown { ref name, .. } if name == "emoji"));
        assert!(err.to_string().contains("footnote"));
    }

    #[test]
    fn registers_custom_extensions() {
        #[derive(Debug)]
        struct Shout;

        impl MarkdownExtension for Shout {
            fn name(&self) -> &'static str {
                "shout"
            }

            fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
                events
                    .into_iter()
                    .map(|e| match e {
                        Event::Text(t) => Event::Text(t.to_uppercase().into()),
                        other => other,
                    })
                    .collect()
            }
        }

        let mut registry = ExtensionRegistry::new();
        assert!(registry.register(Arc::new(Shout)).is_none());
        assert!(registry.contains("shout"));

        let events: Vec<_> = Parser::new("quiet").collect();
        let shouted = registry.get("shout").unwrap().transform(events);
        assert!(shouted.contains(&Event::Text("QUIET".into())));
    }

    #[test]
    fn moves_footnote_definitions_to_the_end() {
        let source = "[^note]: The note.\n\nBody text[^note].\n";
        let events: Vec<_> = Parser::new_ext(source, Options::ENABLE_FOOTNOTES).collect();

        let events = FootnoteExtension.transform(events);

        let section = events
            .iter()
            .position(|e| matches!(e, Event::Html(h) if h.contains("footnotes")))
            .unwrap();
        let definition = events
            .iter()
            .position(|e| matches!(e, Event::Start(Tag::FootnoteDefinition(_))))
            .unwrap();
        let body = events
            .iter()
            .position(|e| matches!(e, Event::Text(t) if &**t == "Body text"))
            .unwrap();
        assert!(body < section);
        assert!(section < definition);
        assert!(matches!(events.last(), Some(Event::Html(h)) if &**h == "</section>\n"));
    }
}
