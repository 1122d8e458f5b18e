//! Asset pipeline for CSS and JavaScript processing.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the main JavaScript file.
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* quire default theme */

:root {
  --background: #ffffff;
  --foreground: #2c3e50;
  --muted: #f6f8fa;
  --muted-foreground: #6a737d;
  --border: #eaecef;
  --primary: #3eaf7c;
  --code-background: #282c34;
  --code-foreground: #e6e6e6;
  --highlight: rgba(0, 0, 0, 0.66);
  --navbar-height: 3.6rem;
  --sidebar-width: 20rem;
  --content-max-width: 740px;
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.7;
}

/* Navbar */
.navbar {
  position: fixed;
  top: 0;
  left: 0;
  right: 0;
  z-index: 20;
  height: var(--navbar-height);
  display: flex;
  align-items: center;
  gap: 1.5rem;
  padding: 0.7rem 1.5rem;
  background: var(--background);
  border-bottom: 1px solid var(--border);
}

.site-name {
  font-size: 1.3rem;
  font-weight: 600;
  color: var(--foreground);
  text-decoration: none;
}

.nav-links {
  display: flex;
  gap: 1.5rem;
  margin-left: auto;
}

.nav-links a {
  color: var(--foreground);
  text-decoration: none;
  font-weight: 500;
}

.nav-links a:hover {
  color: var(--primary);
}

.search-box {
  position: relative;
}

.search-box input {
  width: 12rem;
  padding: 0.25rem 0.5rem;
  border: 1px solid var(--border);
  border-radius: 2rem;
  font-size: 0.9rem;
}

.search-results {
  position: absolute;
  top: 2.2rem;
  right: 0;
  width: 20rem;
  margin: 0;
  padding: 0.4rem 0;
  list-style: none;
  background: var(--background);
  border: 1px solid var(--border);
  border-radius: 6px;
}

.search-results:empty {
  display: none;
}

.search-results a {
  display: block;
  padding: 0.2rem 0.8rem;
  color: var(--foreground);
  text-decoration: none;
}

/* Sidebar */
.sidebar {
  position: fixed;
  top: var(--navbar-height);
  bottom: 0;
  left: 0;
  width: var(--sidebar-width);
  overflow-y: auto;
  padding: 1.5rem 0;
  background: var(--background);
  border-right: 1px solid var(--border);
}

.sidebar-group {
  margin-bottom: 1rem;
}

.sidebar-heading {
  display: block;
  padding: 0.35rem 1.5rem;
  font-weight: 700;
  color: var(--foreground);
  cursor: default;
}

details.sidebar-group > summary.sidebar-heading {
  cursor: pointer;
}

.sidebar-links {
  list-style: none;
  margin: 0;
  padding: 0;
}

.sidebar-link {
  display: block;
  padding: 0.35rem 1rem 0.35rem 1.25rem;
  border-left: 0.25rem solid transparent;
  color: var(--foreground);
  text-decoration: none;
}

.sidebar-link:hover {
  color: var(--primary);
}

.sidebar-link.active {
  font-weight: 600;
  color: var(--primary);
  border-left-color: var(--primary);
}

.sidebar-sub-headers {
  list-style: none;
  margin: 0;
  padding-left: 1rem;
  font-size: 0.95em;
}

.sidebar-sub-headers .sidebar-link {
  border-left: none;
  padding-top: 0.25rem;
  padding-bottom: 0.25rem;
}

/* Page */
.page {
  padding-top: var(--navbar-height);
  padding-left: var(--sidebar-width);
}

.content {
  max-width: var(--content-max-width);
  margin: 0 auto;
  padding: 2rem 2.5rem;
}

.content a {
  color: var(--primary);
  text-decoration: none;
}

.content h1,
.content h2,
.content h3 {
  line-height: 1.25;
}

.content h2 {
  padding-bottom: 0.3rem;
  border-bottom: 1px solid var(--border);
}

.content table {
  border-collapse: collapse;
  margin: 1rem 0;
}

.content td,
.content th {
  border: 1px solid #dfe2e5;
  padding: 0.6em 1em;
}

.content code {
  padding: 0.25rem 0.5rem;
  font-size: 0.85em;
  background: rgba(27, 31, 35, 0.05);
  border-radius: 3px;
}

/* Code blocks */
div[class*="language-"] {
  position: relative;
  margin: 0.85rem 0;
  background: var(--code-background);
  border-radius: 6px;
}

div[class*="language-"] pre {
  position: relative;
  z-index: 1;
  margin: 0;
  padding: 1.25rem 1.5rem;
  overflow: auto;
  background: transparent;
  line-height: 1.4;
}

div[class*="language-"] pre code {
  padding: 0;
  color: var(--code-foreground);
  background: transparent;
  border-radius: 0;
}

.highlight-lines {
  position: absolute;
  top: 0;
  left: 0;
  width: 100%;
  padding: 1.25rem 0;
  line-height: 1.4;
  user-select: none;
}

.highlight-lines .highlighted {
  background: var(--highlight);
}

div[class*="language-"].line-numbers-mode pre {
  margin-left: 3.5rem;
  padding-left: 1rem;
}

div[class*="language-"].line-numbers-mode .highlighted {
  position: relative;
}

.line-numbers-wrapper {
  position: absolute;
  top: 0;
  width: 3.5rem;
  padding: 1.25rem 0;
  text-align: center;
  line-height: 1.4;
  color: rgba(255, 255, 255, 0.3);
  border-right: 1px solid rgba(0, 0, 0, 0.66);
}

.line-numbers-wrapper br {
  user-select: none;
}

/* Footnotes */
.footnotes-sep {
  margin-top: 2.5rem;
  border: none;
  border-top: 1px solid var(--border);
}

.footnotes {
  font-size: 0.9em;
  color: var(--muted-foreground);
}

.footnote-definition {
  display: flex;
  gap: 0.5rem;
}

.footnote-definition p {
  margin: 0;
}

/* Prev / next */
.page-nav {
  display: flex;
  justify-content: space-between;
  max-width: var(--content-max-width);
  margin: 0 auto;
  padding: 1rem 2.5rem 2rem;
  border-top: 1px solid var(--border);
}

.page-nav a {
  color: var(--primary);
  text-decoration: none;
}

/* Responsive */
@media (max-width: 719px) {
  .sidebar {
    transform: translateX(-100%);
    transition: transform 0.2s ease;
  }

  .sidebar.open {
    transform: translateX(0);
  }

  .page {
    padding-left: 0;
  }

  .menu-btn {
    display: block;
  }

  .search-box input {
    width: 8rem;
  }
}

.menu-btn {
  display: none;
  padding: 0.25rem 0.5rem;
  background: none;
  border: 1px solid var(--border);
  border-radius: 4px;
  cursor: pointer;
}
"#;

const DEFAULT_JS: &str = r#"// quire runtime
(function() {
  'use strict';

  const base = document.documentElement.dataset.base || '/';

  // Mobile menu toggle
  const menuBtn = document.querySelector('.menu-btn');
  const sidebar = document.querySelector('.sidebar');

  if (menuBtn && sidebar) {
    menuBtn.addEventListener('click', () => {
      sidebar.classList.toggle('open');
    });
  }

  // Header search over search-index.json
  const input = document.querySelector('.search-box input');
  const results = document.querySelector('.search-results');
  let index = null;

  async function loadIndex() {
    if (index) return index;
    const response = await fetch(base + 'search-index.json');
    index = response.ok ? await response.json() : [];
    return index;
  }

  function render(matches) {
    results.innerHTML = '';
    matches.slice(0, 8).forEach(match => {
      const li = document.createElement('li');
      const a = document.createElement('a');
      a.href = match.url;
      a.textContent = match.label;
      li.appendChild(a);
      results.appendChild(li);
    });
  }

  if (input && results) {
    input.addEventListener('input', async () => {
      const query = input.value.trim().toLowerCase();
      if (!query) {
        render([]);
        return;
      }
      const pages = await loadIndex();
      const matches = [];
      pages.forEach(page => {
        if (page.title.toLowerCase().includes(query)) {
          matches.push({ url: page.url, label: page.title });
        }
        page.headers.forEach(header => {
          if (header.title.toLowerCase().includes(query)) {
            matches.push({ url: page.url + '#' + header.id, label: page.title + ' > ' + header.title });
          }
        });
      });
      render(matches);
    });
  }
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_css() {
        let css = AssetPipeline::generate_css();
        assert!(css.contains(":root"));
        assert!(css.contains(".line-numbers-wrapper"));
        assert!(css.contains(".footnotes"));
    }

    #[test]
    fn generates_js() {
        let js = AssetPipeline::generate_js();
        assert!(js.contains("addEventListener"));
        assert!(js.contains("search-index.json"));
    }

    #[test]
    fn minifies_css() {
        let css = r#"
.sidebar-link {
    color: blue;
    padding: 10px;
}
        "#;

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".sidebar-link"));
    }

    #[test]
    fn minifies_default_theme() {
        let css = AssetPipeline::generate_css();

        let minified = AssetPipeline::minify_css(&css).unwrap();

        assert!(minified.len() < css.len());
    }
}
