//! Fenced code block parsing and HTML rendering.

use std::fmt::Write;
use std::ops::RangeInclusive;

/// Language used when a fence carries no info string.
const PLAIN_TEXT: &str = "text";

/// Parsed fence info string, e.g. `js{1,4-6}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FenceInfo {
    /// Language identifier (lowercase)
    pub language: String,

    /// 1-indexed line ranges to highlight, in the order written
    pub highlighted: Vec<RangeInclusive<usize>>,
}

impl FenceInfo {
    /// Parse a code fence info string.
    ///
    /// Supports the `lang{1,3-5}` form for highlighted lines. Anything after
    /// the first whitespace is ignored.
    pub fn parse(info: &str) -> Self {
        let word = info.split_whitespace().next().unwrap_or("");

        let (lang, ranges) = match word.find('{') {
            Some(open) if word.ends_with('}') => (&word[..open], &word[open + 1..word.len() - 1]),
            _ => (word, ""),
        };

        let language = if lang.is_empty() {
            PLAIN_TEXT.to_string()
        } else {
            lang.to_lowercase()
        };

        Self {
            language,
            highlighted: parse_line_ranges(ranges),
        }
    }

    /// Whether `line` (1-indexed) falls in a highlighted range.
    pub fn is_highlighted(&self, line: usize) -> bool {
        self.highlighted.iter().any(|range| range.contains(&line))
    }
}

/// Parse `1,3-5` into `[1..=1, 3..=5]`. Malformed parts are skipped.
///
/// Ranges are kept unexpanded so an oversized bound costs nothing.
fn parse_line_ranges(ranges: &str) -> Vec<RangeInclusive<usize>> {
    ranges
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|part| {
            let (start, end) = part.split_once('-').unwrap_or((part, part));
            let start = start.trim().parse::<usize>().ok()?;
            let end = end.trim().parse::<usize>().ok()?;
            (start >= 1 && start <= end).then_some(start..=end)
        })
        .collect()
}

/// A fenced or indented code block found in a page.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    /// Unique identifier for this block (format: block-{line_number})
    pub id: String,

    /// Parsed info string
    pub info: FenceInfo,

    /// Source code content
    pub source: String,

    /// Line number where the block starts (1-indexed)
    pub line_number: usize,
}

impl CodeBlock {
    /// Create a new code block.
    pub fn new(info: FenceInfo, source: String, line_number: usize) -> Self {
        Self {
            id: format!("block-{}", line_number),
            info,
            source,
            line_number,
        }
    }

    /// Number of source lines.
    pub fn line_count(&self) -> usize {
        self.source.lines().count().max(1)
    }

    /// Render the block as HTML.
    ///
    /// With `line_numbers` the wrapper gains `line-numbers-mode` and a gutter;
    /// without it no gutter markup is emitted.
    pub fn to_html(&self, line_numbers: bool) -> String {
        let lang = escape_html(&self.info.language);
        let lines = self.line_count();
        let mut html = String::new();

        let mut classes = format!("language-{lang}");
        if !self.info.highlighted.is_empty() {
            classes.push_str(" has-highlighted-lines");
        }
        if line_numbers {
            classes.push_str(" line-numbers-mode");
        }

        let _ = write!(html, "<div class=\"{classes}\">");

        if !self.info.highlighted.is_empty() {
            html.push_str("<div class=\"highlight-lines\">");
            for line in 1..=lines {
                if self.info.is_highlighted(line) {
                    html.push_str("<div class=\"highlighted\">&nbsp;</div>");
                } else {
                    html.push_str("<br>");
                }
            }
            html.push_str("</div>");
        }

        let _ = write!(
            html,
            "<pre class=\"language-{lang}\"><code>{}</code></pre>",
            escape_html(&self.source)
        );

        if line_numbers {
            html.push_str("<div class=\"line-numbers-wrapper\">");
            for line in 1..=lines {
                let _ = write!(html, "<span class=\"line-number\">{line}</span><br>");
            }
            html.push_str("</div>");
        }

        html.push_str("</div>\n");
        html
    }
}

/// Escape text for inclusion in HTML element content or attributes.
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language() {
        assert_eq!(FenceInfo::parse("java").language, "java");
        assert_eq!(FenceInfo::parse("TS title").language, "ts");
        assert_eq!(FenceInfo::parse("").language, "text");
    }

    #[test]
    fn parses_highlighted_lines() {
        let info = FenceInfo::parse("js{1,4-6}");

        assert_eq!(info.language, "js");
        assert_eq!(info.highlighted, vec![1..=1, 4..=6]);
        assert!(info.is_highlighted(5));
        assert!(!info.is_highlighted(2));
    }

    #[test]
    fn skips_malformed_ranges() {
        assert_eq!(FenceInfo::parse("js{x,3,5-2,0}").highlighted, vec![3..=3]);
        assert_eq!(FenceInfo::parse("js{2").language, "js{2");
    }

    #[test]
    fn renders_without_gutter() {
        let block = CodeBlock::new(FenceInfo::parse("bash"), "echo hi\n".to_string(), 1);

        let html = block.to_html(false);

        assert!(html.starts_with("<div class=\"language-bash\">"));
        assert!(html.contains("<code>echo hi\n</code>"));
        assert!(!html.contains("line-number"));
    }

    #[test]
    fn renders_line_number_gutter() {
        let block = CodeBlock::new(FenceInfo::parse("bash"), "a\nb\nc\n".to_string(), 1);

        let html = block.to_html(true);

        assert!(html.contains("line-numbers-mode"));
        assert_eq!(html.matches("<span class=\"line-number\">").count(), 3);
        assert!(html.contains("<span class=\"line-number\">3</span>"));
    }

    #[test]
    fn renders_highlight_overlay() {
        let block = CodeBlock::new(FenceInfo::parse("java{2}"), "a\nb\n".to_string(), 1);

        let html = block.to_html(false);

        assert!(html.contains("has-highlighted-lines"));
        assert!(html.contains("<div class=\"highlight-lines\"><br><div class=\"highlighted\">&nbsp;</div></div>"));
    }

    #[test]
    fn huge_highlight_ranges_stay_bounded_by_the_block() {
        let info = FenceInfo::parse(&format!("js{{1-{},{}}}", usize::MAX, usize::MAX / 2));
        assert_eq!(info.highlighted, vec![1..=usize::MAX, usize::MAX / 2..=usize::MAX / 2]);

        let block = CodeBlock::new(info, "a\nb\n".to_string(), 1);
        let html = block.to_html(true);

        assert_eq!(html.matches("<div class=\"highlighted\">").count(), 2);
        assert_eq!(html.matches("<span class=\"line-number\">").count(), 2);
    }

    #[test]
    fn escapes_source() {
        let block = CodeBlock::new(FenceInfo::parse("html"), "<b>&</b>".to_string(), 1);

        assert!(block.to_html(false).contains("&lt;b&gt;&amp;&lt;/b&gt;"));
    }
}
