//! References from the sidebar to pages in the content tree.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Files that back a directory index page, in lookup order.
const INDEX_FILES: [&str; 2] = ["README.md", "index.md"];

/// A page identifier relative to the site base path.
///
/// Either the root index (`"/"`) or a relative path without a file extension,
/// such as `backend/spotify`. A trailing `/` refers to a directory index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageRef(String);

/// Reasons a page reference can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRefError {
    #[error("page reference is empty")]
    Empty,

    #[error("only the root index may start with '/'")]
    LeadingSlash,

    #[error("page reference contains an empty segment")]
    EmptySegment,

    #[error("page reference contains a '.' or '..' segment")]
    RelativeSegment,

    #[error("page reference must not carry a file extension ({0})")]
    Extension(String),

    #[error("page reference contains {0:?}, which is not allowed in a URL path")]
    InvalidChar(char),
}

/// Characters that would change the meaning of a URL path or need escaping.
fn is_url_unsafe(c: char) -> bool {
    c.is_whitespace() || c.is_control() || matches!(c, '#' | '?' | '%' | '\\' | '"' | '<' | '>')
}

impl PageRef {
    /// The root index page.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse and validate a page reference.
    pub fn parse(value: &str) -> Result<Self, PageRefError> {
        let page = Self(value.to_string());
        page.check()?;
        Ok(page)
    }

    /// Validate the shape of this reference.
    pub fn check(&self) -> Result<(), PageRefError> {
        let value = self.0.as_str();
        if value.is_empty() {
            return Err(PageRefError::Empty);
        }
        if value == "/" {
            return Ok(());
        }
        if value.starts_with('/') {
            return Err(PageRefError::LeadingSlash);
        }
        if let Some(c) = value.chars().find(|c| is_url_unsafe(*c)) {
            return Err(PageRefError::InvalidChar(c));
        }

        let trimmed = value.strip_suffix('/').unwrap_or(value);
        let segments: Vec<&str> = trimmed.split('/').collect();
        for segment in &segments {
            if segment.is_empty() {
                return Err(PageRefError::EmptySegment);
            }
            if *segment == "." || *segment == ".." {
                return Err(PageRefError::RelativeSegment);
            }
        }

        if !value.ends_with('/') {
            if let Some(last) = segments.last() {
                if let Some((_, ext)) = last.rsplit_once('.') {
                    return Err(PageRefError::Extension(ext.to_string()));
                }
            }
        }

        Ok(())
    }

    /// The raw reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the root index page.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Whether this reference points at a directory index (`guide/`).
    pub fn is_directory(&self) -> bool {
        !self.is_root() && self.0.ends_with('/')
    }

    /// Markdown files, relative to the source directory, that may back this page.
    ///
    /// Candidates are listed in lookup order; the first one that exists wins.
    pub fn source_candidates(&self) -> Vec<PathBuf> {
        if self.is_root() {
            return INDEX_FILES.iter().map(PathBuf::from).collect();
        }

        let dir = PathBuf::from(self.0.trim_end_matches('/'));
        let mut candidates = Vec::with_capacity(3);
        if !self.is_directory() {
            candidates.push(PathBuf::from(format!("{}.md", self.0)));
        }
        candidates.extend(INDEX_FILES.iter().map(|f| dir.join(f)));
        candidates
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
