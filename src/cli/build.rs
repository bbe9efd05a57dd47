//! `inkpost build`: discover, parse all, link all, write.

use anyhow::Result;
use std::time::Instant;

use super::BuildArgs;
use crate::build::{JsonCache, NoCache, PostCache, build_posts, discover, write_output};
use crate::config::SiteConfig;
use crate::log;
use crate::post::{GitHistory, ModifiedDate, NoHistory, PostParser};

/// Build the whole blog.
pub fn build_site(config: &SiteConfig, args: &BuildArgs) -> Result<()> {
    let start = Instant::now();
    let markdown = super::markdown(config)?;

    let history: &dyn ModifiedDate = if args.no_history {
        &NoHistory
    } else {
        &GitHistory
    };
    let parser = PostParser::new(&markdown, config, history);

    let content = config.content_dir();
    let sources = discover(&content);
    if sources.is_empty() {
        log!("build"; "no posts found in {}", content.display());
        return Ok(());
    }

    let json_cache = (!args.no_cache).then(|| JsonCache::load(&config.cache_path()));
    let cache: &dyn PostCache = match &json_cache {
        Some(cache) => cache,
        None => &NoCache,
    };

    let report = build_posts(&sources, &parser, cache, config.build.strict, true)?;
    write_output(&report.posts, &config.output_dir())?;

    if let Some(cache) = &json_cache {
        cache.save()?;
    }

    log!(
        "build";
        "{} posts ({} cached, {} skipped) in {:.2?}",
        report.posts.len(),
        report.cached,
        report.failures.len(),
        start.elapsed()
    );
    Ok(())
}
