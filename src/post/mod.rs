//! Posts: parsing, metadata and the cross-post passes.
//!
//! Building a post is two-phase:
//!
//! 1. [`PostParser::parse`] — front-matter split, body + TLDR rendering,
//!    metadata normalization. Independent per post, safe to run in parallel.
//! 2. [`graph::link_posts`] and [`series::attach_series`] — run once every
//!    post of the site has been parsed.

pub mod graph;
pub mod history;
mod normalize;
pub mod series;

pub use graph::{PostLinkGraph, link_posts};
pub use history::{GitHistory, ModifiedDate, NoHistory};
pub use normalize::{canonical_tag, normalize_tags, resolve_translations};
pub use series::attach_series;

use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::markdown::{GroupIds, Markdown, RenderContext, TocEntry, frontmatter};

/// Front-matter keys every post must define.
pub const REQUIRED_KEYS: [&str; 5] = ["title", "slug", "description", "date", "tags"];

#[derive(Debug, Error)]
pub enum PostError {
    #[error("{}: cannot read post", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: missing front-matter block", .0.display())]
    MissingFrontmatter(PathBuf),

    #[error("{}: missing required front-matter key `{key}`", .path.display())]
    MissingKey { path: PathBuf, key: &'static str },
}

/// One rendered article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub html: String,
    pub tldr: Option<String>,
    pub metadata: PostMeta,
    /// Source file, not persisted.
    #[serde(skip)]
    pub source: PathBuf,
}

/// Post metadata as consumed by the page layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub date: String,
    /// Last commit date of the source, `date` when unknown.
    pub modified: String,
    pub tags: Vec<String>,
    pub translations: Vec<Translation>,
    pub toc: Vec<TocEntry>,
    pub canonical: String,
    pub banner: String,
    pub series: Option<Series>,
    pub outgoing_slugs: Vec<String>,
    pub outgoing_links: Vec<PostLink>,
    pub incoming_links: Vec<PostLink>,
}

/// Available translation of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub code: String,
    pub name: String,
}

/// Reference to another post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLink {
    pub slug: String,
    pub title: String,
}

/// Series membership; `entries` is filled by [`attach_series`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub entries: Vec<SeriesEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub slug: String,
    pub title: String,
    /// 1-based position by date.
    pub order: usize,
    /// Whether this entry is the post carrying the series.
    pub current: bool,
}

/// Everything needed to turn one source file into a [`Post`].
#[derive(Clone, Copy)]
pub struct PostParser<'a> {
    pub markdown: &'a Markdown,
    pub config: &'a SiteConfig,
    pub history: &'a dyn ModifiedDate,
}

impl<'a> PostParser<'a> {
    pub fn new(markdown: &'a Markdown, config: &'a SiteConfig, history: &'a dyn ModifiedDate) -> Self {
        Self {
            markdown,
            config,
            history,
        }
    }

    /// Read and parse a post file.
    pub fn parse_file(&self, path: &Path, ids: &GroupIds) -> Result<Post, PostError> {
        let content = fs::read_to_string(path).map_err(|source| PostError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(path, &content, ids)
    }

    /// Parse post source. Links and series are left empty.
    pub fn parse(&self, path: &Path, content: &str, ids: &GroupIds) -> Result<Post, PostError> {
        let (front, body) = frontmatter::split(content)
            .ok_or_else(|| PostError::MissingFrontmatter(path.to_path_buf()))?;

        let ctx = RenderContext {
            config: self.config,
            source_dir: path.parent().unwrap_or(Path::new("")),
        };
        let rendered = self.markdown.render(body, &ctx, ids);

        let tldr = front
            .get("tldr")
            .and_then(normalize::text)
            .filter(|t| !t.trim().is_empty())
            .map(|t| self.markdown.render(&t, &ctx, ids).html);

        let mut metadata = normalize::metadata(&front, path, self.config, self.history)?;
        metadata.toc = rendered.toc;
        metadata.outgoing_slugs = rendered.outgoing_slugs;

        crate::debug!("post"; "parsed {} ({} outgoing)", metadata.slug, metadata.outgoing_slugs.len());

        Ok(Post {
            html: rendered.html,
            tldr,
            metadata,
            source: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HighlightSection;
    use crate::highlight::Highlighter;
    use std::sync::{Arc, LazyLock};

    static MD: LazyLock<Markdown> = LazyLock::new(|| {
        let highlighter = Highlighter::from_config(&HighlightSection::default()).unwrap();
        Markdown::new(Arc::new(highlighter))
    });

    fn parse(content: &str) -> Result<Post, PostError> {
        let config = SiteConfig::default();
        PostParser::new(&MD, &config, &NoHistory).parse(
            Path::new("/site/content/blog/signals/index.md"),
            content,
            &GroupIds::new(),
        )
    }

    const POST: &str = "---
title: Signals
slug: signals
description: All about signals
date: 2024-03-01
tags: angular, typescript, ngrx
translations: [nl, xx]
tldr: Use `signal()` for **state**.
---

## Why signals

Read [the basics](../basics/index.md).
";

    #[test]
    fn test_parse_post() {
        let post = parse(POST).unwrap();
        let meta = &post.metadata;

        assert_eq!(meta.title, "Signals");
        assert_eq!(meta.slug, "signals");
        assert_eq!(meta.modified, "2024-03-01");
        assert_eq!(meta.tags, vec!["Angular", "TypeScript", "NgRx"]);
        assert_eq!(meta.translations[0].name, "Nederlands");
        assert_eq!(meta.translations[1].name, "xx");
        assert_eq!(meta.canonical, "https://example.dev/blog/signals");
        assert_eq!(meta.banner, "/banners/signals.webp");
        assert_eq!(meta.outgoing_slugs, vec!["basics"]);
        assert_eq!(meta.toc.len(), 1);
        assert!(post.html.contains("href=\"/blog/basics\""));

        let tldr = post.tldr.unwrap();
        assert!(tldr.contains("<code>signal()</code>"));
        assert!(tldr.contains("<strong>state</strong>"));
    }

    #[test]
    fn test_missing_frontmatter() {
        let err = parse("# No metadata\n").unwrap_err();
        assert!(matches!(err, PostError::MissingFrontmatter(_)));
        assert!(err.to_string().contains("index.md"));
    }

    #[test]
    fn test_missing_required_key() {
        let err = parse("---\ntitle: A\nslug: a\ndate: 2024-01-01\ntags: x\n---\nbody").unwrap_err();
        assert!(matches!(err, PostError::MissingKey { key: "description", .. }));
    }

    #[test]
    fn test_metadata_json_shape() {
        let post = parse(POST).unwrap();
        let json = serde_json::to_value(&post.metadata).unwrap();
        assert!(json.get("outgoingSlugs").is_some());
        assert!(json.get("incomingLinks").is_some());
        assert_eq!(json["toc"][0]["slug"], "why-signals");
    }
}
