//! Theme configuration: sidebar groups and top navigation.

use serde::{Deserialize, Serialize};

use crate::page_ref::PageRef;

/// Deepest heading level shown under a sidebar page.
pub const MAX_SIDEBAR_DEPTH: u8 = 2;

/// Theme configuration (`[theme]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Heading levels listed under the active page in the sidebar (0 to disable)
    #[serde(default = "default_sidebar_depth")]
    pub sidebar_depth: u8,

    /// Links shown in the top navigation bar
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nav: Vec<NavLink>,

    /// Sidebar groups in rendered order
    #[serde(default)]
    pub sidebar: Vec<SidebarGroup>,
}

fn default_sidebar_depth() -> u8 {
    1
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            sidebar_depth: default_sidebar_depth(),
            nav: Vec::new(),
            sidebar: Vec::new(),
        }
    }
}

/// A titled section of the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarGroup {
    /// Section heading
    pub title: String,

    /// Whether readers can fold this group away
    #[serde(default = "default_collapsable")]
    pub collapsable: bool,

    /// Pages in navigation order
    #[serde(default)]
    pub children: Vec<PageRef>,
}

fn default_collapsable() -> bool {
    true
}

/// A link in the top navigation bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLink {
    /// Link text
    pub text: String,

    /// Absolute URL (`https://...`) or a page reference inside the site
    pub link: String,
}

impl NavLink {
    /// Whether the link leaves the site.
    pub fn is_external(&self) -> bool {
        self.link.starts_with("http://")
            || self.link.starts_with("https://")
            || self.link.starts_with("mailto:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_default_to_collapsable() {
        let group: SidebarGroup = toml::from_str("title = \"Guide\"").unwrap();

        assert!(group.collapsable);
        assert!(group.children.is_empty());
    }

    #[test]
    fn detects_external_links() {
        let github = NavLink {
            text: "GitHub".to_string(),
            link: "https://github.com".to_string(),
        };
        let guide = NavLink {
            text: "Guide".to_string(),
            link: "backend/spotify".to_string(),
        };

        assert!(github.is_external());
        assert!(!guide.is_external());
    }
}
