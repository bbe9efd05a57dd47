//! Path and URL utilities.
//!
//! Pure functions, no file system access.

use std::path::{Component, Path, PathBuf};

/// Check if a link carries a URL scheme (https:, mailto:, tel:, ...).
pub fn is_external_link(link: &str) -> bool {
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Check if link is HTTP/HTTPS.
#[inline]
pub fn is_http(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

/// Split a URL into (path, fragment) at the first `#`.
pub fn split_path_fragment(url: &str) -> (&str, &str) {
    url.split_once('#').unwrap_or((url, ""))
}

/// Last non-empty segment of a URL path, ignoring query and fragment.
///
/// `/blog/my-post/?x=1#top` → `my-post`
pub fn last_segment(url: &str) -> Option<&str> {
    let (path, _) = split_path_fragment(url);
    let path = path.split_once('?').map_or(path, |(p, _)| p);
    path.rsplit('/').find(|s| !s.is_empty())
}

/// Lexically normalize a path (`.` dropped, `..` pops) without touching disk.
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Last `n` normal components of a path joined with `/`.
pub fn tail_segments(path: &Path, n: usize) -> String {
    let parts: Vec<_> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();
    let start = parts.len().saturating_sub(n);
    parts[start..].join("/")
}
