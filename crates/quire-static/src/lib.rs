//! Static site generator for quire documentation.
//!
//! Builds a static documentation site from a markdown content tree, driven by
//! the site configuration descriptor: sidebar order, base path, and markdown
//! options.

pub mod assets;
pub mod builder;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, CheckReport, StaticBuilder};
