//! Frontmatter extraction and parsing.

use serde::Deserialize;

/// Parsed frontmatter from a markdown page.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Page title (falls back to the first heading)
    #[serde(default)]
    pub title: Option<String>,

    /// Page description for SEO
    #[serde(default)]
    pub description: Option<String>,

    /// Whether to include the page in the search index
    #[serde(default = "default_true")]
    pub search: bool,

    /// Per-page override of the theme sidebar depth
    #[serde(default)]
    pub sidebar_depth: Option<u8>,
}

fn default_true() -> bool {
    true
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            search: true,
            sidebar_depth: None,
        }
    }
}

/// Split a leading YAML block off a markdown page.
///
/// The block opens with a `---` line as the very first line and closes with
/// a `---` or `...` line. Returns the parsed frontmatter and the body that
/// follows it, which is always a suffix of `source`.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let mut lines = source.split_inclusive('\n');

    let yaml_start = match lines.next() {
        Some(first) if is_fence(first, false) => first.len(),
        _ => return Ok((None, source)),
    };

    let mut offset = yaml_start;
    for line in lines {
        if is_fence(line, true) {
            let yaml = source[yaml_start..offset].trim();
            let body = source[offset + line.len()..].trim_start();

            if yaml.is_empty() {
                return Ok((Some(Frontmatter::default()), body));
            }

            let frontmatter: Frontmatter = serde_yaml::from_str(yaml)
                .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;
            return Ok((Some(frontmatter), body));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unclosed)
}

/// `---` on a line of its own; closing fences may also be `...`.
fn is_fence(line: &str, closing: bool) -> bool {
    let line = line.trim_end_matches(['\n', '\r']).trim_end();
    line == "---" || (closing && line == "...")
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}
