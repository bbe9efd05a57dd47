//! `inkpost css`: CSS variables for the code palette.

use anyhow::{Context, Result};
use std::fs;
use std::io::{Write, stdout};
use std::path::Path;

use crate::config::SiteConfig;
use crate::highlight::Highlighter;
use crate::log;

/// Print (or write) the `:root` and dark-theme variable blocks.
pub fn export_css(config: &SiteConfig, output: Option<&Path>) -> Result<()> {
    let highlighter = Highlighter::from_config(&config.highlight)?;
    let css = highlighter.css();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, &css).with_context(|| format!("Failed to write {}", path.display()))?;
            log!("css"; "{} variables written to {}", highlighter.palette().len(), path.display());
        }
        None => {
            stdout().lock().write_all(css.as_bytes())?;
        }
    }
    Ok(())
}
