//! Subcommand implementations.

pub mod build;
pub mod check;
pub mod init;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quire_config::{discover_config, SiteConfig, CONFIG_FILENAME};

/// Load the site configuration from `explicit`, or discover it from `cwd` upwards.
pub fn load_site(explicit: Option<PathBuf>, cwd: &Path) -> Result<SiteConfig> {
    let path = match explicit {
        Some(path) => path,
        None => discover_config(cwd).with_context(|| {
            format!(
                "No {} found in {} or its parents. Run 'quire init' first.",
                CONFIG_FILENAME,
                cwd.display()
            )
        })?,
    };

    let site = SiteConfig::load(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(site)
}

/// Load configuration relative to the current directory.
pub fn load_site_from_cwd(explicit: Option<PathBuf>) -> Result<SiteConfig> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    load_site(explicit, &cwd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CONFIG: &str = r#"
title = "Docs"
description = "Project docs"

[[theme.sidebar]]
title = "Guide"
children = ["/"]
"#;

    #[test]
    fn discovers_config_from_nested_directory() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("docs").join("guide");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), CONFIG).unwrap();

        let site = load_site(None, &nested).unwrap();

        assert_eq!(site.title, "Docs");
        assert_eq!(site.source_dir(), temp.path().join("docs"));
    }

    #[test]
    fn prefers_explicit_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("site.toml");
        fs::write(&path, CONFIG).unwrap();

        let site = load_site(Some(path), Path::new("/nonexistent")).unwrap();

        assert_eq!(site.root, temp.path());
    }

    #[test]
    fn reports_missing_config() {
        let temp = tempfile::tempdir().unwrap();

        let err = load_site(None, temp.path()).unwrap_err();

        assert!(err.to_string().contains("quire init"));
    }
}
