//! Batch build: parse every post, then link them.
//!
//! ```text
//! discover ──► par_iter: cache hit? ──no──► PostParser::parse ──► cache.put
//!                 │ yes                             │
//!                 └────────────► posts ◄────────────┘
//!                                  │   (all parsed)
//!                 link_posts + attach_series ──► write_output
//! ```
//!
//! Parsing is parallel; linking only starts once every post is parsed.
//! Every post draws code-group ids from its own range
//! ([`GroupIds::for_post`]), so output is identical whatever the schedule.

pub mod cache;
pub mod discover;

pub use cache::{CacheEntry, JsonCache, NoCache, PostCache};
pub use discover::{POST_FILE, PostSource, discover};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde::Serialize;
use std::{fs, path::Path};

use crate::logger::ProgressLine;
use crate::markdown::GroupIds;
use crate::post::{Post, PostError, PostMeta, PostParser, attach_series, link_posts};
use crate::{debug, log};

/// Name of the metadata index written next to the rendered posts.
pub const INDEX_FILE: &str = "posts.json";

/// Outcome of [`build_posts`].
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Parsed, linked posts in source order.
    pub posts: Vec<Post>,
    /// Posts skipped because they failed to parse.
    pub failures: Vec<PostError>,
    /// Posts served from cache.
    pub cached: usize,
}

/// Parse all `sources`, then compute links and series.
///
/// A failing post is skipped, unless `strict` is set, in which case the
/// build is aborted after all posts were attempted.
pub fn build_posts(
    sources: &[PostSource],
    parser: &PostParser<'_>,
    cache: &dyn PostCache,
    strict: bool,
    progress: bool,
) -> Result<BuildReport> {
    let progress = progress.then(|| ProgressLine::new(&[("posts", sources.len())]));
    let fingerprint = parser.config.render_fingerprint();

    let results: Vec<(Result<Post, PostError>, bool)> = sources
        .par_iter()
        .enumerate()
        .map(|(ordinal, source)| {
            let result = load_post(ordinal, source, parser, cache, &fingerprint);
            if let Some(progress) = &progress {
                progress.inc("posts");
            }
            result
        })
        .collect();

    if let Some(progress) = progress {
        progress.finish();
    }

    let mut report = BuildReport::default();
    for (result, cached) in results {
        match result {
            Ok(post) => {
                report.cached += usize::from(cached);
                report.posts.push(post);
            }
            Err(err) => report.failures.push(err),
        }
    }

    if !report.failures.is_empty() {
        for err in &report.failures {
            log!(if strict { "error" } else { "skip" }; "{err}");
        }
        if strict {
            bail!("{} post(s) failed to parse", report.failures.len());
        }
    }

    warn_duplicate_slugs(&report.posts);
    link_posts(&mut report.posts);
    attach_series(&mut report.posts);

    Ok(report)
}

/// Cached rendering if fresh and rendered with the same settings, otherwise
/// parse and cache. Returns whether the post came from cache.
fn load_post(
    ordinal: usize,
    source: &PostSource,
    parser: &PostParser<'_>,
    cache: &dyn PostCache,
    fingerprint: &str,
) -> (Result<Post, PostError>, bool) {
    let id_base = GroupIds::post_base(ordinal);

    let key = cache_key(source);
    let mtime = cache::mtime_millis(&source.file);

    if let Some(entry) = cache.get(&key)
        && entry.is_fresh(mtime)
        && entry.id_base == id_base
        && entry.config == fingerprint
    {
        debug!("cache"; "hit {key}");
        return (Ok(entry.into_post(source.file.clone())), true);
    }

    let result = parser.parse_file(&source.file, &GroupIds::starting_at(id_base));
    if let Ok(post) = &result {
        cache.put(&key, CacheEntry::new(post, mtime, id_base, fingerprint));
    }
    (result, false)
}

/// Cache key of a source: its directory name.
fn cache_key(source: &PostSource) -> String {
    source
        .dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.dir.to_string_lossy().into_owned())
}

fn warn_duplicate_slugs(posts: &[Post]) {
    let mut seen = rustc_hash::FxHashSet::default();
    for post in posts {
        if !seen.insert(post.metadata.slug.as_str()) {
            log!("warning"; "duplicate slug `{}` ({})", post.metadata.slug, post.source.display());
        }
    }
}

/// Entry of the metadata index.
#[derive(Serialize)]
struct IndexEntry<'a> {
    #[serde(flatten)]
    metadata: &'a PostMeta,
    tldr: Option<&'a str>,
}

/// Write `<output>/<slug>/index.html` per post and `<output>/posts.json`.
pub fn write_output(posts: &[Post], output: &Path) -> Result<()> {
    for post in posts {
        let dir = output.join(&post.metadata.slug);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        let file = dir.join("index.html");
        fs::write(&file, &post.html).with_context(|| format!("Failed to write {}", file.display()))?;
    }

    let index: Vec<_> = posts
        .iter()
        .map(|post| IndexEntry {
            metadata: &post.metadata,
            tldr: post.tldr.as_deref(),
        })
        .collect();
    let file = output.join(INDEX_FILE);
    fs::create_dir_all(output).with_context(|| format!("Failed to create {}", output.display()))?;
    fs::write(&file, serde_json::to_string_pretty(&index)?)
        .with_context(|| format!("Failed to write {}", file.display()))?;

    debug!("build"; "wrote {} posts to {}", posts.len(), output.display());
    Ok(())
}
