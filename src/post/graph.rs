//! Post link graph for outgoing / incoming link tracking.
//!
//! Built once all posts are parsed, from each post's outgoing slugs:
//! - `links_to`: posts this post links to (outgoing)
//! - `linked_by`: posts that link to this post (incoming)
//!
//! Both lists keep encounter order and hold each slug once. Self-links and
//! slugs with no matching post are dropped without notice.

use rustc_hash::{FxHashMap, FxHashSet};

use super::{Post, PostLink};

/// Bidirectional post link graph, keyed by slug.
#[derive(Debug, Default)]
pub struct PostLinkGraph {
    /// Forward: post → posts it links to
    links_to: FxHashMap<String, Vec<String>>,
    /// Reverse: post → posts linking to it
    linked_by: FxHashMap<String, Vec<String>>,
}

impl PostLinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph over `posts`, ignoring slugs that name no post.
    pub fn build(posts: &[Post]) -> Self {
        let known: FxHashSet<&str> = posts.iter().map(|p| p.metadata.slug.as_str()).collect();
        let mut graph = Self::new();

        for post in posts {
            let targets = post
                .metadata
                .outgoing_slugs
                .iter()
                .filter(|slug| known.contains(slug.as_str()));
            graph.record(&post.metadata.slug, targets);
        }
        graph
    }

    /// Record outgoing links of a post, replacing earlier ones.
    pub fn record<I, S>(&mut self, from: &str, targets: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.remove_post(from);

        let mut seen = FxHashSet::default();
        let targets: Vec<String> = targets
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .filter(|t| t != from && seen.insert(t.clone()))
            .collect();

        if targets.is_empty() {
            return;
        }

        for target in &targets {
            self.linked_by
                .entry(target.clone())
                .or_default()
                .push(from.to_string());
        }
        self.links_to.insert(from.to_string(), targets);
    }

    /// Posts this post links to.
    pub fn links_to(&self, slug: &str) -> &[String] {
        self.links_to.get(slug).map_or(&[], Vec::as_slice)
    }

    /// Posts linking to this post.
    pub fn linked_by(&self, slug: &str) -> &[String] {
        self.linked_by.get(slug).map_or(&[], Vec::as_slice)
    }

    fn remove_post(&mut self, slug: &str) {
        let Some(old_targets) = self.links_to.remove(slug) else {
            return;
        };
        for target in old_targets {
            if let Some(sources) = self.linked_by.get_mut(&target) {
                sources.retain(|s| s != slug);
                if sources.is_empty() {
                    self.linked_by.remove(&target);
                }
            }
        }
    }
}

/// Fill `outgoing_links` and `incoming_links` of every post.
pub fn link_posts(posts: &mut [Post]) {
    let graph = PostLinkGraph::build(posts);
    let titles: FxHashMap<String, String> = posts
        .iter()
        .map(|p| (p.metadata.slug.clone(), p.metadata.title.clone()))
        .collect();

    let to_links = |slugs: &[String]| -> Vec<PostLink> {
        slugs
            .iter()
            .filter_map(|slug| {
                titles.get(slug).map(|title| PostLink {
                    slug: slug.clone(),
                    title: title.clone(),
                })
            })
            .collect()
    };

    for post in posts.iter_mut() {
        let slug = &post.metadata.slug;
        post.metadata.outgoing_links = to_links(graph.links_to(slug));
        post.metadata.incoming_links = to_links(graph.linked_by(slug));
    }
}
