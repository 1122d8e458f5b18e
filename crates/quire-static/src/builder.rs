//! Static site builder.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use quire_config::{PageRef, SiteConfig, MAX_SIDEBAR_DEPTH};
use quire_markdown::{ExtensionError, ExtensionRegistry, MarkdownRenderer, ParsedDoc};

use crate::assets::AssetPipeline;
use crate::templates::{Context, NavItem, SidebarSection, TemplateEngine};

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Site descriptor
    pub site: SiteConfig,

    /// Source docs directory
    pub source_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Minify CSS output
    pub minify: bool,
}

impl BuildConfig {
    /// Derive directories and settings from the site descriptor.
    pub fn from_site(site: SiteConfig) -> Self {
        Self {
            source_dir: site.source_dir(),
            output_dir: site.output_dir(),
            minify: site.build.minify,
            site,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Number of code blocks rendered
    pub code_blocks: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Result of checking a site without writing output.
#[derive(Debug)]
pub struct CheckReport {
    /// Markdown pages found in the source directory
    pub pages: usize,

    /// Pages linked from the sidebar
    pub sidebar_pages: usize,

    /// Pages not reachable from the sidebar (relative to the source directory)
    pub orphans: Vec<PathBuf>,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read docs directory: {0}")]
    ReadError(String),

    #[error("Failed to parse markdown: {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Sidebar group '{group}' links to '{page}', but none of {candidates} exist")]
    MissingPage {
        group: String,
        page: String,
        candidates: String,
    },

    #[error(transparent)]
    Extension(#[from] ExtensionError),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// A page to be built.
#[derive(Debug)]
struct PageInfo {
    /// Source file path
    source_path: PathBuf,

    /// Relative path from the source dir
    relative_path: PathBuf,

    /// Output path
    output_path: PathBuf,

    /// Root-relative URL
    url: String,

    /// Parsed document
    doc: ParsedDoc,
}

/// Sidebar group with its pages resolved to discovered page indices.
#[derive(Debug)]
struct ResolvedGroup<'a> {
    title: &'a str,
    collapsable: bool,
    pages: Vec<(&'a PageRef, usize)>,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    renderer: MarkdownRenderer,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a builder using the built-in markdown extensions.
    pub fn new(config: BuildConfig) -> Result<Self, BuildError> {
        Self::with_registry(config, &ExtensionRegistry::with_builtins())
    }

    /// Create a builder resolving extensions against `registry`.
    ///
    /// Fails if the site requests an extension the registry does not know.
    pub fn with_registry(
        config: BuildConfig,
        registry: &ExtensionRegistry,
    ) -> Result<Self, BuildError> {
        let extensions = registry.resolve(config.site.markdown.extension_names())?;
        let renderer = MarkdownRenderer::new(config.site.markdown.line_numbers, extensions);
        tracing::debug!("Markdown extensions: {:?}", renderer.extension_names());

        let templates =
            TemplateEngine::new().map_err(|e| BuildError::TemplateError(e.to_string()))?;

        Ok(Self {
            config,
            renderer,
            templates,
        })
    }

    /// Verify that every sidebar page exists without writing any output.
    pub fn check(&self) -> Result<CheckReport, BuildError> {
        let pages = self.discover_pages()?;
        let sidebar = self.resolve_sidebar(&pages)?;

        let linked: Vec<usize> = sidebar
            .iter()
            .flat_map(|g| g.pages.iter().map(|(_, idx)| *idx))
            .collect();

        let orphans = pages
            .iter()
            .enumerate()
            .filter(|(idx, _)| !linked.contains(idx))
            .map(|(_, page)| page.relative_path.clone())
            .collect();

        Ok(CheckReport {
            pages: pages.len(),
            sidebar_pages: linked.len(),
            orphans,
        })
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        // Ensure output directory exists
        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let pages = self.discover_pages()?;
        let sidebar = self.resolve_sidebar(&pages)?;
        let nav = self.build_nav();
        let order = reading_order(&sidebar);

        // Render pages in parallel
        let results: Vec<Result<usize, BuildError>> = (0..pages.len())
            .into_par_iter()
            .map(|idx| self.build_page(idx, &pages, &sidebar, &order, &nav))
            .collect();

        let mut total_code_blocks = 0;
        for result in results {
            total_code_blocks += result?;
        }

        self.generate_assets()?;
        self.generate_search_index(&pages)?;
        self.generate_not_found(&pages, &sidebar, &nav)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: pages.len(),
            code_blocks: total_code_blocks,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Discover all markdown pages in the source directory.
    fn discover_pages(&self) -> Result<Vec<PageInfo>, BuildError> {
        let mut pages = Vec::new();
        let mut outputs: HashMap<PathBuf, PathBuf> = HashMap::new();

        if !self.config.source_dir.is_dir() {
            return Err(BuildError::ReadError(format!(
                "Docs directory not found: {}",
                self.config.source_dir.display()
            )));
        }

        for entry in WalkDir::new(&self.config.source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }

            let relative_path = path
                .strip_prefix(&self.config.source_dir)
                .unwrap_or(path)
                .to_path_buf();
            let route = route_for(&relative_path);
            let output_path = self.output_path_for(&route);

            if let Some(existing) = outputs.get(&output_path) {
                tracing::warn!(
                    "Skipping {}: {} already renders to {}",
                    relative_path.display(),
                    existing.display(),
                    output_path.display()
                );
                continue;
            }

            let content = fs::read_to_string(path)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

            let doc = self
                .renderer
                .parse(&content)
                .map_err(|e| BuildError::ParseError {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;

            outputs.insert(output_path.clone(), relative_path.clone());
            pages.push(PageInfo {
                source_path: path.to_path_buf(),
                url: format!("{}{}", self.config.site.base, route),
                relative_path,
                output_path,
                doc,
            });
        }

        tracing::debug!(
            "Discovered {} pages in {}",
            pages.len(),
            self.config.source_dir.display()
        );

        Ok(pages)
    }

    /// Calculate the output path for a route.
    fn output_path_for(&self, route: &str) -> PathBuf {
        // "" -> dist/index.html, "backend/spotify" -> dist/backend/spotify/index.html
        let route = route.trim_end_matches('/');
        if route.is_empty() {
            self.config.output_dir.join("index.html")
        } else {
            self.config.output_dir.join(route).join("index.html")
        }
    }

    /// Map every sidebar entry to a discovered page.
    fn resolve_sidebar<'a>(
        &'a self,
        pages: &[PageInfo],
    ) -> Result<Vec<ResolvedGroup<'a>>, BuildError> {
        let by_source: HashMap<&Path, usize> = pages
            .iter()
            .enumerate()
            .map(|(idx, page)| (page.relative_path.as_path(), idx))
            .collect();

        self.config
            .site
            .theme
            .sidebar
            .iter()
            .map(|group| -> Result<ResolvedGroup<'a>, BuildError> {
                let resolved = group
                    .children
                    .iter()
                    .map(|page_ref| {
                        let candidates = page_ref.source_candidates();
                        candidates
                            .iter()
                            .find_map(|c| by_source.get(c.as_path()).copied())
                            .map(|idx| (page_ref, idx))
                            .ok_or_else(|| BuildError::MissingPage {
                                group: group.title.clone(),
                                page: page_ref.to_string(),
                                candidates: candidates
                                    .iter()
                                    .map(|c| c.display().to_string())
                                    .collect::<Vec<_>>()
                                    .join(", "),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(ResolvedGroup {
                    title: &group.title,
                    collapsable: group.collapsable,
                    pages: resolved,
                })
            })
            .collect()
    }

    /// Build the top navigation links.
    fn build_nav(&self) -> Vec<NavItem> {
        self.config
            .site
            .theme
            .nav
            .iter()
            .map(|link| NavItem {
                title: link.text.clone(),
                path: self.config.site.resolve_link(link),
                children: Vec::new(),
                active: false,
            })
            .collect()
    }

    /// Build sidebar sections with `current` marked active.
    fn build_sidebar(
        &self,
        pages: &[PageInfo],
        sidebar: &[ResolvedGroup<'_>],
        current: Option<usize>,
    ) -> Vec<SidebarSection> {
        sidebar
            .iter()
            .map(|group| {
                let items: Vec<NavItem> = group
                    .pages
                    .iter()
                    .map(|(page_ref, idx)| {
                        let active = current == Some(*idx);
                        let path = self.config.site.resolve_url(page_ref);
                        NavItem {
                            title: self.page_title(&pages[*idx]),
                            children: if active {
                                self.sub_headers(&pages[*idx], &path)
                            } else {
                                Vec::new()
                            },
                            path,
                            active,
                        }
                    })
                    .collect();

                SidebarSection {
                    title: group.title.to_string(),
                    collapsable: group.collapsable,
                    open: !group.collapsable || items.iter().any(|i| i.active),
                    items,
                }
            })
            .collect()
    }

    /// Headings listed under the active page, limited by sidebar depth.
    fn sub_headers(&self, page: &PageInfo, path: &str) -> Vec<NavItem> {
        let depth = page
            .doc
            .frontmatter
            .as_ref()
            .and_then(|f| f.sidebar_depth)
            .unwrap_or(self.config.site.theme.sidebar_depth)
            .min(MAX_SIDEBAR_DEPTH);

        page.doc
            .toc
            .iter()
            .filter(|e| e.level >= 2 && e.level <= depth + 1)
            .map(|e| NavItem {
                title: e.title.clone(),
                path: format!("{}#{}", path, e.id),
                children: Vec::new(),
                active: false,
            })
            .collect()
    }

    /// Display title of a page.
    fn page_title(&self, page: &PageInfo) -> String {
        if let Some(title) = page.doc.title() {
            return title.to_string();
        }

        match page.relative_path.file_stem().and_then(|s| s.to_str()) {
            Some("README") | Some("index") | None => {
                match page.relative_path.parent().and_then(|p| p.file_name()) {
                    Some(dir) => capitalize(&dir.to_string_lossy().replace('-', " ")),
                    None => self.config.site.title.clone(),
                }
            }
            Some(stem) => capitalize(&stem.replace('-', " ")),
        }
    }

    /// Build a single page, returning the number of code blocks rendered.
    fn build_page(
        &self,
        idx: usize,
        pages: &[PageInfo],
        sidebar: &[ResolvedGroup<'_>],
        order: &[(&PageRef, usize)],
        nav: &[NavItem],
    ) -> Result<usize, BuildError> {
        let page = &pages[idx];

        let content_html = self.renderer.render(&page.doc.content);

        // Prev/next follow sidebar order
        let position = order.iter().position(|(_, i)| *i == idx);
        let link_to = |(page_ref, i): (&PageRef, usize)| NavItem {
            title: self.page_title(&pages[i]),
            path: self.config.site.resolve_url(page_ref),
            children: Vec::new(),
            active: false,
        };
        let prev = position
            .and_then(|p| p.checked_sub(1))
            .and_then(|p| order.get(p).copied())
            .map(link_to);
        let next = position
            .and_then(|p| order.get(p + 1).copied())
            .map(link_to);

        let description = page
            .doc
            .frontmatter
            .as_ref()
            .and_then(|f| f.description.clone())
            .unwrap_or_else(|| self.config.site.description.clone());

        let context = Context {
            title: self.page_title(page),
            site_title: self.config.site.title.clone(),
            description,
            content: content_html,
            nav: nav.to_vec(),
            sidebar: self.build_sidebar(pages, sidebar, Some(idx)),
            base_url: self.config.site.base.clone(),
            prev,
            next,
        };

        let html = self
            .templates
            .render_page("page.html", &context)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        if let Some(parent) = page.output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::write(&page.output_path, html).map_err(|e| BuildError::WriteError(e.to_string()))?;

        tracing::debug!(
            "Rendered {} -> {}",
            page.source_path.display(),
            page.output_path.display()
        );

        Ok(page.doc.code_blocks.len())
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");
        fs::create_dir_all(&assets_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Skipping CSS minification: {}", e);
                css
            })
        } else {
            css
        };
        fs::write(assets_dir.join("main.css"), css)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let js = AssetPipeline::generate_js();
        fs::write(assets_dir.join("main.js"), js)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Generate search index.
    fn generate_search_index(&self, pages: &[PageInfo]) -> Result<(), BuildError> {
        let index: Vec<serde_json::Value> = pages
            .iter()
            .filter(|page| page.doc.frontmatter.as_ref().map_or(true, |f| f.search))
            .map(|page| {
                let headers: Vec<serde_json::Value> = page
                    .doc
                    .toc
                    .iter()
                    .filter(|e| e.level == 2 || e.level == 3)
                    .map(|e| serde_json::json!({ "title": e.title, "id": e.id }))
                    .collect();

                serde_json::json!({
                    "title": self.page_title(page),
                    "url": page.url,
                    "headers": headers,
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&index)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        fs::write(self.config.output_dir.join("search-index.json"), json)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Generate the 404 page.
    fn generate_not_found(
        &self,
        pages: &[PageInfo],
        sidebar: &[ResolvedGroup<'_>],
        nav: &[NavItem],
    ) -> Result<(), BuildError> {
        let context = Context {
            title: "404".to_string(),
            site_title: self.config.site.title.clone(),
            description: self.config.site.description.clone(),
            content: String::new(),
            nav: nav.to_vec(),
            sidebar: self.build_sidebar(pages, sidebar, None),
            base_url: self.config.site.base.clone(),
            prev: None,
            next: None,
        };

        let html = self
            .templates
            .render_page("404.html", &context)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        fs::write(self.config.output_dir.join("404.html"), html)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }
}

/// Sidebar pages flattened across groups, in navigation order.
fn reading_order<'a>(sidebar: &[ResolvedGroup<'a>]) -> Vec<(&'a PageRef, usize)> {
    sidebar
        .iter()
        .flat_map(|g| g.pages.iter().copied())
        .collect()
}

/// Route of a markdown file relative to the base path.
///
/// `README.md` and `index.md` are directory indexes: `guide/README.md` is
/// `guide/`, the top-level one is the empty route.
fn route_for(relative: &Path) -> String {
    let stem = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let parent = relative
        .parent()
        .map(|p| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default();

    match (stem, parent.is_empty()) {
        ("README" | "index", true) => String::new(),
        ("README" | "index", false) => format!("{parent}/"),
        (stem, true) => stem.to_string(),
        (stem, false) => format!("{parent}/{stem}"),
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.') && n.len() > 1)
}

/// Capitalize first letter of a string.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
