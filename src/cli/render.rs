//! `inkpost render <file>`: one post, no cross-post passes.

use anyhow::{Context, Result};
use std::io::{Write, stdout};
use std::path::Path;

use crate::config::SiteConfig;
use crate::markdown::GroupIds;
use crate::post::{NoHistory, PostParser};

/// Render a single post and print its HTML body (or metadata as JSON).
pub fn render_file(config: &SiteConfig, file: &Path, json: bool) -> Result<()> {
    let markdown = super::markdown(config)?;
    let parser = PostParser::new(&markdown, config, &NoHistory);
    let post = parser.parse_file(file, &GroupIds::new())?;

    let output = if json {
        serde_json::to_string_pretty(&post.metadata).context("Failed to serialize metadata")?
    } else {
        post.html
    };

    let mut stdout = stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}
