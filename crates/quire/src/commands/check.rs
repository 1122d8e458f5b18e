//! Configuration and content check command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use quire_static::{BuildConfig, StaticBuilder};

use super::load_site_from_cwd;

/// Run the check command.
pub async fn run(config_path: Option<PathBuf>, print: bool) -> Result<()> {
    let site = load_site_from_cwd(config_path)?;

    if print {
        let json = serde_json::to_string_pretty(&site).context("Failed to serialize config")?;
        println!("{json}");
    }

    let report = StaticBuilder::new(BuildConfig::from_site(site))?.check()?;

    for orphan in &report.orphans {
        tracing::warn!("{} is not linked from the sidebar", orphan.display());
    }

    tracing::info!(
        "OK: {} pages, {} in the sidebar",
        report.pages,
        report.sidebar_pages
    );

    Ok(())
}
