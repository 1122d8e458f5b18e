//! Initialize documentation in a project.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quire_config::CONFIG_FILENAME;

/// Run the init command.
pub async fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing quire...");

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let created = scaffold(&cwd, yes)?;

    if created.is_empty() {
        tracing::warn!("Nothing to do: files already exist. Use --yes to overwrite.");
        return Ok(());
    }

    for path in &created {
        tracing::info!("Created {}", path.display());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'quire build' to generate the site.");

    Ok(())
}

/// Write the starter config and pages under `root`.
///
/// Existing files are left alone unless `overwrite` is set. Returns the
/// paths written, relative to `root`.
pub fn scaffold(root: &Path, overwrite: bool) -> Result<Vec<PathBuf>> {
    let docs_dir = root.join("docs");
    fs::create_dir_all(&docs_dir).context("Failed to create docs directory")?;

    let files = [
        (PathBuf::from(CONFIG_FILENAME), DEFAULT_CONFIG),
        (PathBuf::from("docs/README.md"), DEFAULT_INDEX),
        (PathBuf::from("docs/getting-started.md"), DEFAULT_GETTING_STARTED),
    ];

    let mut created = Vec::new();
    for (relative, content) in files {
        let path = root.join(&relative);
        if path.exists() && !overwrite {
            continue;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        created.push(relative);
    }

    Ok(created)
}

const DEFAULT_CONFIG: &str = r#"# quire configuration

title = "My Documentation"
description = "Documentation for my project"

# URL prefix the site is served under; must begin and end with '/'
base = "/"

[[theme.sidebar]]
title = "Guide"
collapsable = false
children = ["/", "getting-started"]

[markdown]
# Show a line-number gutter beside code blocks
line_numbers = false
# Available: footnote, tasklist, smart-punctuation, heading-attributes
extensions = ["footnote"]

[build]
source_dir = "docs"
dest = "dist"
minify = true
"#;

const DEFAULT_INDEX: &str = r#"# Welcome

This is your documentation site, powered by **quire**.

Read the [Getting Started](getting-started) guide next.
"#;

const DEFAULT_GETTING_STARTED: &str = r#"---
title: Getting Started
---

# Getting Started

## Project structure

```
your-project/
├── docs/
│   ├── README.md           # Home page
│   └── getting-started.md
└── quire.toml              # Configuration
```

## Adding pages

Create a markdown file under `docs/` and list it in the sidebar without its
extension:

```toml{4}
[[theme.sidebar]]
title = "Guide"
collapsable = false
children = ["/", "getting-started", "my-new-page"]
```

## Footnotes

With the `footnote` extension enabled you can add notes[^1].

[^1]: Like this one.

## Building

```bash
quire build
quire serve
```
"#;
