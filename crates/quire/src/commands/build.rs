//! Static site build command.

use std::path::PathBuf;

use anyhow::Result;
use quire_static::{BuildConfig, StaticBuilder};

use super::load_site_from_cwd;

/// Run the build command.
pub async fn run(
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    minify: Option<bool>,
) -> Result<()> {
    let site = load_site_from_cwd(config_path)?;

    tracing::info!("Building {}...", site.title);

    let mut config = BuildConfig::from_site(site);
    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Some(minify) = minify {
        config.minify = minify;
    }

    let result = StaticBuilder::new(config)?.build().await?;

    tracing::info!(
        "Built {} pages with {} code blocks in {}ms",
        result.pages,
        result.code_blocks,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
