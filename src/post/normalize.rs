//! Front-matter → [`PostMeta`].
//!
//! Tags are canonicalized (`typescript` → `TypeScript`, anything unknown is
//! title-cased), translation codes resolve to display names, and the derived
//! URLs are joined from the `[site]` paths.

use serde_json::Value;
use std::path::Path;

use super::{ModifiedDate, PostError, PostMeta, REQUIRED_KEYS, Series, Translation};
use crate::config::SiteConfig;
use crate::markdown::frontmatter::Frontmatter;

/// Known spellings, keyed by lowercase tag.
const CANONICAL_TAGS: &[(&str, &str)] = &[
    ("ai", "AI"),
    ("api", "API"),
    ("csharp", "C#"),
    ("css", "CSS"),
    ("devops", "DevOps"),
    ("dotnet", ".NET"),
    ("github", "GitHub"),
    ("graphql", "GraphQL"),
    ("html", "HTML"),
    ("javascript", "JavaScript"),
    ("ngrx", "NgRx"),
    ("nodejs", "Node.js"),
    ("rxjs", "RxJS"),
    ("sql", "SQL"),
    ("typescript", "TypeScript"),
    ("vscode", "VS Code"),
];

/// Display names of translation language codes.
const LANGUAGES: &[(&str, &str)] = &[
    ("de", "Deutsch"),
    ("en", "English"),
    ("es", "Español"),
    ("fr", "Français"),
    ("it", "Italiano"),
    ("ja", "日本語"),
    ("ko", "한국어"),
    ("nl", "Nederlands"),
    ("pl", "Polski"),
    ("pt", "Português"),
    ("ru", "Русский"),
    ("tr", "Türkçe"),
    ("uk", "Українська"),
    ("zh", "中文"),
];

/// Canonical spelling of one tag.
pub fn canonical_tag(tag: &str) -> String {
    let lower = tag.trim().to_lowercase();
    if let Some((_, canonical)) = CANONICAL_TAGS.iter().find(|(key, _)| *key == lower) {
        return canonical.to_string();
    }

    lower
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tags from `a, b` or `[a, b]`, canonicalized, duplicates removed.
pub fn normalize_tags(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        other => text(other)
            .map(|s| s.split(',').map(str::to_string).collect())
            .unwrap_or_default(),
    };

    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw.iter().map(|t| canonical_tag(t)).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            tags.push(tag);
        }
    }
    tags
}

/// Translation records from a list of language codes.
pub fn resolve_translations(value: &Value) -> Vec<Translation> {
    let codes: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        other => text(other)
            .map(|s| s.split(',').map(str::to_string).collect())
            .unwrap_or_default(),
    };

    codes
        .iter()
        .map(|code| code.trim())
        .filter(|code| !code.is_empty())
        .map(|code| Translation {
            code: code.to_string(),
            name: LANGUAGES
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(code))
                .map_or_else(|| code.to_string(), |(_, name)| name.to_string()),
        })
        .collect()
}

/// Scalar value as text.
pub(super) fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Build metadata from front-matter. Content-derived fields (toc, links)
/// are filled in by the caller.
pub(super) fn metadata(
    front: &Frontmatter,
    path: &Path,
    config: &SiteConfig,
    history: &dyn ModifiedDate,
) -> Result<PostMeta, PostError> {
    for key in REQUIRED_KEYS {
        if !front.contains_key(key) {
            return Err(PostError::MissingKey {
                path: path.to_path_buf(),
                key,
            });
        }
    }

    let required = |key: &'static str| {
        front
            .get(key)
            .and_then(text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PostError::MissingKey {
                path: path.to_path_buf(),
                key,
            })
    };

    let title = required("title")?;
    let slug = required("slug")?;
    let description = required("description")?;
    let date = required("date")?;

    let modified = history.last_modified(path).unwrap_or_else(|| date.clone());

    let series = front
        .get("series")
        .and_then(text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(|name| Series {
            name,
            entries: Vec::new(),
        });

    Ok(PostMeta {
        canonical: format!("{}{}", config.origin(), config.post_path(&slug)),
        banner: format!(
            "{}/{slug}.{}",
            config.site.banner_path.trim_end_matches('/'),
            config.build.image_format
        ),
        tags: front.get("tags").map(normalize_tags).unwrap_or_default(),
        translations: front
            .get("translations")
            .map(resolve_translations)
            .unwrap_or_default(),
        title,
        slug,
        description,
        date,
        modified,
        series,
        ..PostMeta::default()
    })
}
