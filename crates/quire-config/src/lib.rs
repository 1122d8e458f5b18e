//! Site configuration descriptor for quire documentation sites.
//!
//! A site is described by a single `quire.toml` file: metadata (title,
//! description, base path), the sidebar navigation tree, markdown options,
//! and build directories. The descriptor is loaded once, validated, and
//! never mutated afterwards.
//!
//! ```toml
//! title = "Social Playlist"
//! description = "Springboot & Angular Hands-on Workshop"
//! base = "/social-playlist/"
//!
//! [[theme.sidebar]]
//! title = "Guide"
//! collapsable = false
//! children = ["/", "backend/spotify"]
//!
//! [markdown]
//! line_numbers = false
//! extensions = ["footnote"]
//! ```

pub mod page_ref;
pub mod theme;

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use page_ref::{PageRef, PageRefError};
pub use theme::{NavLink, SidebarGroup, ThemeConfig, MAX_SIDEBAR_DEPTH};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "quire.toml";

/// The site configuration descriptor.
///
/// Equality compares the descriptor only; the directory it was loaded from
/// is not part of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title, shown in the header and page titles
    pub title: String,

    /// Site description, emitted as the default meta description
    pub description: String,

    /// Root-relative URL prefix every page is served under
    #[serde(default = "default_base", alias = "base_path")]
    pub base: String,

    /// Sidebar and navigation
    #[serde(default)]
    pub theme: ThemeConfig,

    /// Markdown rendering options
    #[serde(default)]
    pub markdown: MarkdownOptions,

    /// Build directories and output settings
    #[serde(default)]
    pub build: BuildSettings,

    /// Directory containing the config file (set after loading).
    #[serde(skip)]
    pub root: PathBuf,
}

impl PartialEq for SiteConfig {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.description == other.description
            && self.base == other.base
            && self.theme == other.theme
            && self.markdown == other.markdown
            && self.build == other.build
    }
}

fn default_base() -> String {
    "/".to_string()
}

/// Markdown rendering options (`[markdown]`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkdownOptions {
    /// Render a line-number gutter beside fenced code blocks
    #[serde(default)]
    pub line_numbers: bool,

    /// Names of markdown extensions to enable
    #[serde(default)]
    pub extensions: BTreeSet<String>,
}

impl MarkdownOptions {
    /// Iterate over the requested extension names.
    pub fn extension_names(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

/// Build settings (`[build]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Markdown source directory, relative to the config file
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Output directory, relative to the config file
    #[serde(default = "default_dest")]
    pub dest: String,

    /// Minify generated CSS
    #[serde(default = "default_minify")]
    pub minify: bool,
}

fn default_source_dir() -> String {
    "docs".to_string()
}
fn default_dest() -> String {
    "dist".to_string()
}
fn default_minify() -> bool {
    true
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            dest: default_dest(),
            minify: default_minify(),
        }
    }
}

/// Errors that can occur when loading or validating a site configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Validation(String),

    #[error("Invalid page reference '{page}' in sidebar group '{group}': {reason}")]
    InvalidPageRef {
        group: String,
        page: String,
        reason: PageRefError,
    },

    #[error("Page '{0}' appears more than once in the sidebar")]
    DuplicatePageRef(String),
}

impl SiteConfig {
    /// Parse and validate a configuration from TOML text.
    ///
    /// Relative build paths resolve against the current directory.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load, validate, and anchor a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Check every invariant of the descriptor.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.title, "title")?;
        require_non_empty(&self.description, "description")?;
        self.validate_base()?;
        self.validate_sidebar()?;
        self.validate_markdown()?;
        Ok(())
    }

    fn validate_base(&self) -> Result<(), ConfigError> {
        let base = self.base.as_str();
        if !base.starts_with('/') || !base.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "base must begin and end with '/', got '{base}'"
            )));
        }
        if base.contains("//") {
            return Err(ConfigError::Validation(format!(
                "base must not contain '//', got '{base}'"
            )));
        }
        if base.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "base must not contain whitespace, got '{base}'"
            )));
        }
        Ok(())
    }

    fn validate_sidebar(&self) -> Result<(), ConfigError> {
        if self.theme.sidebar.is_empty() {
            return Err(ConfigError::Validation(
                "theme.sidebar must contain at least one group".into(),
            ));
        }
        if self.theme.sidebar_depth > MAX_SIDEBAR_DEPTH {
            return Err(ConfigError::Validation(format!(
                "theme.sidebar_depth must be at most {MAX_SIDEBAR_DEPTH}, got {}",
                self.theme.sidebar_depth
            )));
        }

        let mut seen = HashSet::new();
        for group in &self.theme.sidebar {
            require_non_empty(&group.title, "sidebar group title")?;
            for page in &group.children {
                page.check().map_err(|reason| ConfigError::InvalidPageRef {
                    group: group.title.clone(),
                    page: page.to_string(),
                    reason,
                })?;
                if !seen.insert(page.as_str()) {
                    return Err(ConfigError::DuplicatePageRef(page.to_string()));
                }
            }
        }

        for link in &self.theme.nav {
            require_non_empty(&link.text, "nav link text")?;
            require_non_empty(&link.link, "nav link target")?;
        }
        Ok(())
    }

    fn validate_markdown(&self) -> Result<(), ConfigError> {
        for name in self.markdown.extension_names() {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "markdown.extensions contains an empty name".into(),
                ));
            }
        }
        Ok(())
    }

    /// Root-relative URL of a page under the base path.
    ///
    /// The root index resolves to the base itself.
    pub fn resolve_url(&self, page: &PageRef) -> String {
        if page.is_root() {
            self.base.clone()
        } else {
            format!("{}{}", self.base, page.as_str())
        }
    }

    /// URL for a top navigation link.
    pub fn resolve_link(&self, link: &NavLink) -> String {
        if link.is_external() {
            link.link.clone()
        } else if link.link == "/" {
            self.base.clone()
        } else {
            format!("{}{}", self.base, link.link.trim_start_matches('/'))
        }
    }

    /// All sidebar pages in navigation order.
    pub fn sidebar_pages(&self) -> impl Iterator<Item = &PageRef> {
        self.theme.sidebar.iter().flat_map(|g| g.children.iter())
    }

    /// Resolved markdown source directory.
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.build.source_dir)
    }

    /// Resolved output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.build.dest)
    }
}

/// Search `start` and its ancestors for a `quire.toml`.
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOCIAL_PLAYLIST: &str =
        include_str!("../../../demos/social-playlist/quire.toml");

    fn social_playlist() -> SiteConfig {
        SiteConfig::from_toml_str(SOCIAL_PLAYLIST).unwrap()
    }

    fn minimal(extra: &str) -> String {
        format!(
            r#"title = "Docs"
description = "Project docs"
{extra}

[[theme.sidebar]]
title = "Guide"
children = ["/", "intro"]
"#
        )
    }

    #[test]
    fn parses_social_playlist_descriptor() {
        let config = social_playlist();

        assert_eq!(config.title, "Social Playlist");
        assert_eq!(config.description, "Springboot & Angular Hands-on Workshop");
        assert_eq!(config.base, "/social-playlist/");
        assert_eq!(config.theme.sidebar.len(), 1);

        let group = &config.theme.sidebar[0];
        assert_eq!(group.title, "Guide");
        assert!(!group.collapsable);
        assert!(!config.markdown.line_numbers);
        assert!(config.markdown.extensions.contains("footnote"));
    }

    #[test]
    fn preserves_sidebar_order() {
        let config = social_playlist();

        let pages: Vec<&str> = config.sidebar_pages().map(PageRef::as_str).collect();
        assert_eq!(
            pages,
            vec![
                "/",
                "backend/first-spring-boot-application",
                "backend/spotify",
                "frontend/first-angular-application",
                "frontend/consuming-the-rest-api",
                "automatic-login-on-first-page-visit",
            ]
        );
    }

    #[test]
    fn sidebar_refs_are_root_or_relative_without_extension() {
        let config = social_playlist();

        for page in config.sidebar_pages() {
            let value = page.as_str();
            if value == "/" {
                continue;
            }
            assert!(!value.starts_with('/'), "{value} starts with '/'");
            let last = value.rsplit('/').next().unwrap();
            assert!(!last.contains('.'), "{value} has an extension");
        }
    }

    #[test]
    fn resolves_page_urls_under_base() {
        let config = social_playlist();

        let spotify = PageRef::parse("backend/spotify").unwrap();
        assert_eq!(config.resolve_url(&spotify), "/social-playlist/backend/spotify");
        assert_eq!(config.resolve_url(&PageRef::root()), "/social-playlist/");

        for page in config.sidebar_pages() {
            let url = config.resolve_url(page);
            assert!(url.starts_with('/'));
            assert!(!url.contains("//"), "{url} has a doubled slash");
        }
    }

    #[test]
    fn resolves_nav_links() {
        let config = social_playlist();
        let internal = NavLink {
            text: "Spotify".to_string(),
            link: "/backend/spotify".to_string(),
        };
        let external = NavLink {
            text: "GitHub".to_string(),
            link: "https://github.com".to_string(),
        };

        assert_eq!(
            config.resolve_link(&internal),
            "/social-playlist/backend/spotify"
        );
        assert_eq!(config.resolve_link(&external), "https://github.com");
    }

    #[test]
    fn toml_round_trip_is_identical() {
        let config = social_playlist();

        let serialized = config.to_toml_string().unwrap();
        let reparsed = SiteConfig::from_toml_str(&serialized).unwrap();

        assert_eq!(reparsed, config);
    }

    #[test]
    fn loaded_config_round_trips() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, SOCIAL_PLAYLIST).unwrap();
        let loaded = SiteConfig::load(&path).unwrap();

        let reparsed = SiteConfig::from_toml_str(&loaded.to_toml_string().unwrap()).unwrap();

        assert_eq!(reparsed, loaded);
        assert_ne!(reparsed.root, loaded.root);
    }

    #[test]
    fn json_round_trip_is_identical() {
        let config = social_playlist();

        let json = serde_json::to_string(&config).unwrap();
        let reparsed: SiteConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(reparsed, config);
    }

    #[test]
    fn applies_defaults() {
        let config = SiteConfig::from_toml_str(&minimal("")).unwrap();

        assert_eq!(config.base, "/");
        assert_eq!(config.theme.sidebar_depth, 1);
        assert!(config.theme.sidebar[0].collapsable);
        assert!(!config.markdown.line_numbers);
        assert!(config.markdown.extensions.is_empty());
        assert_eq!(config.build, BuildSettings::default());
    }

    #[test]
    fn accepts_base_path_alias() {
        let config = SiteConfig::from_toml_str(&minimal("base_path = \"/docs/\"")).unwrap();

        assert_eq!(config.base, "/docs/");
    }

    #[test]
    fn rejects_base_without_slashes() {
        for base in ["docs/", "/docs", "docs", "/a//b/"] {
            let err =
                SiteConfig::from_toml_str(&minimal(&format!("base = \"{base}\""))).unwrap_err();
            assert!(
                matches!(err, ConfigError::Validation(_)),
                "Expected ConfigError::Validation for {base}, got {err:?}"
            );
        }
    }

    #[test]
    fn rejects_empty_title() {
        let content = minimal("").replace("title = \"Docs\"", "title = \"\"");

        let err = SiteConfig::from_toml_str(&content).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_missing_sidebar() {
        let err = SiteConfig::from_toml_str("title = \"Docs\"\ndescription = \"Docs\"\n")
            .unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_malformed_page_ref() {
        let content = minimal("").replace("\"intro\"", "\"intro.md\"");

        let err = SiteConfig::from_toml_str(&content).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidPageRef {
                reason: PageRefError::Extension(_),
                ..
            }
        ));
    }

    #[test]
    fn rejects_duplicate_pages_across_groups() {
        let content = format!(
            "{}\n[[theme.sidebar]]\ntitle = \"More\"\nchildren = [\"intro\"]\n",
            minimal("")
        );

        let err = SiteConfig::from_toml_str(&content).unwrap_err();

        assert!(matches!(err, ConfigError::DuplicatePageRef(ref page) if page == "intro"));
    }

    #[test]
    fn rejects_deep_sidebar_depth() {
        let content = r#"title = "Docs"
description = "Docs"

[theme]
sidebar_depth = 3

[[theme.sidebar]]
title = "Guide"
children = ["/"]
"#;

        let err = SiteConfig::from_toml_str(content).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn loads_from_file_and_resolves_paths() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, minimal("[build]\nsource_dir = \"content\"")).unwrap();

        let config = SiteConfig::load(&path).unwrap();

        assert_eq!(config.root, temp.path());
        assert_eq!(config.source_dir(), temp.path().join("content"));
        assert_eq!(config.output_dir(), temp.path().join("dist"));
    }

    #[test]
    fn reports_missing_file() {
        let temp = tempfile::tempdir().unwrap();

        let err = SiteConfig::load(&temp.path().join(CONFIG_FILENAME)).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn discovers_config_in_ancestors() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("docs").join("backend");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), minimal("")).unwrap();

        assert_eq!(
            discover_config(&nested),
            Some(temp.path().join(CONFIG_FILENAME))
        );
    }
}
