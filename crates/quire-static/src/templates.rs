//! Template engine for rendering documentation pages.

use minijinja::Environment;

/// A navigation link: a sidebar entry, a sub-header, or a navbar link.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NavItem {
    /// Display title
    pub title: String,
    /// URL path
    pub path: String,
    /// Child items (page headers under a sidebar entry)
    pub children: Vec<NavItem>,
    /// Whether this is the active page
    pub active: bool,
}

/// A rendered sidebar group.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SidebarSection {
    /// Group heading
    pub title: String,
    /// Render as a foldable `<details>` element
    pub collapsable: bool,
    /// Whether a collapsable group starts expanded
    pub open: bool,
    /// Pages in navigation order
    pub items: Vec<NavItem>,
}

/// Context for rendering a page template.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Context {
    /// Page title
    pub title: String,
    /// Site title
    pub site_title: String,
    /// Meta description (page description or site description)
    pub description: String,
    /// Rendered content HTML
    pub content: String,
    /// Top navigation links
    pub nav: Vec<NavItem>,
    /// Sidebar groups
    pub sidebar: Vec<SidebarSection>,
    /// Base URL
    pub base_url: String,
    /// Previous page in sidebar order
    pub prev: Option<NavItem>,
    /// Next page in sidebar order
    pub next: Option<NavItem>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the default theme templates.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();

        env.add_template("base.html", BASE_TEMPLATE)?;
        env.add_template("page.html", PAGE_TEMPLATE)?;
        env.add_template("sidebar.html", SIDEBAR_TEMPLATE)?;
        env.add_template("404.html", NOT_FOUND_TEMPLATE)?;

        Ok(Self { env })
    }

    /// Render a page using the specified template.
    pub fn render_page(
        &self,
        template: &str,
        context: &Context,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;

        tmpl.render(context)
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en" data-base="{{ base_url }}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% if title and title != site_title %}{{ title }} | {% endif %}{{ site_title }}</title>
  <meta name="description" content="{{ description }}">
  <link rel="stylesheet" href="{{ base_url }}assets/main.css">
</head>
<body>
  <header class="navbar">
    <button class="menu-btn" type="button" aria-label="Toggle sidebar">&#9776;</button>
    <a href="{{ base_url }}" class="site-name">{{ site_title }}</a>
    <div class="search-box">
      <input type="search" aria-label="Search" autocomplete="off">
      <ul class="search-results"></ul>
    </div>
    {% if nav %}
    <nav class="nav-links">
      {% for link in nav %}<a href="{{ link.path }}">{{ link.title }}</a>
      {% endfor %}
    </nav>
    {% endif %}
  </header>
  <aside class="sidebar">
    {% include "sidebar.html" %}
  </aside>
  <main class="page">
    {% block content %}{% endblock %}
  </main>
  <script src="{{ base_url }}assets/main.js"></script>
</body>
</html>"##;

const PAGE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="content">
  {{ content | safe }}
</article>
{% if prev or next %}
<nav class="page-nav">
  <span class="prev">{% if prev %}&larr; <a href="{{ prev.path }}">{{ prev.title }}</a>{% endif %}</span>
  <span class="next">{% if next %}<a href="{{ next.path }}">{{ next.title }}</a> &rarr;{% endif %}</span>
</nav>
{% endif %}
{% endblock %}"##;

const SIDEBAR_TEMPLATE: &str = r##"{% for group in sidebar %}
{% if group.collapsable %}<details class="sidebar-group"{% if group.open %} open{% endif %}>
  <summary class="sidebar-heading">{{ group.title }}</summary>
{% else %}<section class="sidebar-group">
  <p class="sidebar-heading">{{ group.title }}</p>
{% endif %}
  <ul class="sidebar-links">
  {% for item in group.items %}
    <li>
      <a href="{{ item.path }}" class="sidebar-link{% if item.active %} active{% endif %}">{{ item.title }}</a>
      {% if item.children %}
      <ul class="sidebar-sub-headers">
        {% for child in item.children %}
        <li><a href="{{ child.path }}" class="sidebar-link">{{ child.title }}</a></li>
        {% endfor %}
      </ul>
      {% endif %}
    </li>
  {% endfor %}
  </ul>
{% if group.collapsable %}</details>{% else %}</section>{% endif %}
{% endfor %}"##;

const NOT_FOUND_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<article class="content">
  <h1>404</h1>
  <p>That page does not exist.</p>
  <p><a href="{{ base_url }}">Take me home</a></p>
</article>
{% endblock %}"##;
