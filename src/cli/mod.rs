//! Command-line interface module.

mod args;
pub mod build;
pub mod css;
pub mod render;

pub use args::{BuildArgs, Cli, Commands};

use anyhow::Result;
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::highlight::Highlighter;
use crate::markdown::Markdown;

/// Markdown pipeline for the configured highlight theme.
pub fn markdown(config: &SiteConfig) -> Result<Markdown> {
    let highlighter = Highlighter::from_config(&config.highlight)?;
    Ok(Markdown::new(Arc::new(highlighter)))
}
