//! Series: posts sharing a `series` name, ordered by date.

use rustc_hash::FxHashMap;

use super::{Post, SeriesEntry};

/// Fill the series entries of every post that names a series.
///
/// Members are ordered by date (ties by slug); every member gets the full
/// list with its own entry flagged `current`.
pub fn attach_series(posts: &mut [Post]) {
    let mut members: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    for (index, post) in posts.iter().enumerate() {
        if let Some(series) = &post.metadata.series {
            members.entry(series.name.clone()).or_default().push(index);
        }
    }

    for indices in members.values_mut() {
        indices.sort_by(|&a, &b| {
            let (a, b) = (&posts[a].metadata, &posts[b].metadata);
            a.date.cmp(&b.date).then_with(|| a.slug.cmp(&b.slug))
        });

        let ordered: Vec<(String, String)> = indices
            .iter()
            .map(|&i| (posts[i].metadata.slug.clone(), posts[i].metadata.title.clone()))
            .collect();

        for &index in indices.iter() {
            let current = posts[index].metadata.slug.clone();
            if let Some(series) = posts[index].metadata.series.as_mut() {
                series.entries = ordered
                    .iter()
                    .enumerate()
                    .map(|(position, (slug, title))| SeriesEntry {
                        slug: slug.clone(),
                        title: title.clone(),
                        order: position + 1,
                        current: *slug == current,
                    })
                    .collect();
            }
        }
    }
}
