//! Configuration sections of `inkpost.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// [site]
// ============================================================================

/// Public addresses of the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Site origin, e.g. `https://example.dev`.
    pub url: String,
    /// URL path under which posts are served.
    pub posts_path: String,
    /// URL path of generated banner images.
    pub banner_path: String,
    /// URL path of content-addressed static assets (post images).
    pub asset_path: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            url: "https://example.dev".to_string(),
            posts_path: "/blog".to_string(),
            banner_path: "/banners".to_string(),
            asset_path: "/assets".to_string(),
        }
    }
}

// ============================================================================
// [build]
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Directory holding one `<post>/index.md` per post.
    pub content: PathBuf,
    /// Output directory.
    pub output: PathBuf,
    /// Rendered-post cache file.
    pub cache: PathBuf,
    /// Abort the whole build when a single post fails to parse.
    pub strict: bool,
    /// Extension post images are rewritten to.
    pub image_format: String,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            content: "content/blog".into(),
            output: "public".into(),
            cache: ".inkpost/cache.json".into(),
            strict: false,
            image_format: "webp".to_string(),
        }
    }
}

// ============================================================================
// [links]
// ============================================================================

/// External link decoration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksSection {
    /// Hosts whose links receive the tracking parameter.
    pub tracked_domains: Vec<String>,
    /// `key=value` query pair appended to tracked links.
    pub tracking_param: String,
    /// Favicon service URL template, `{host}` is replaced by the link host.
    pub favicon_service: String,
}

impl Default for LinksSection {
    fn default() -> Self {
        Self {
            tracked_domains: [
                "angular.dev",
                "developer.mozilla.org",
                "docs.rs",
                "learn.microsoft.com",
                "ngrx.io",
                "playwright.dev",
                "rxjs.dev",
                "testing-library.com",
                "www.typescriptlang.org",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            tracking_param: "utm_source=inkpost".to_string(),
            favicon_service: "https://icons.duckduckgo.com/ip3/{host}.ico".to_string(),
        }
    }
}

// ============================================================================
// [highlight]
// ============================================================================

/// Code highlighting themes (syntect built-in theme names).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSection {
    /// Theme whose colors are reverse-mapped to CSS variables.
    pub theme: String,
    /// Theme exported as the `[data-theme="dark"]` variable block.
    pub dark_theme: Option<String>,
}

impl Default for HighlightSection {
    fn default() -> Self {
        Self {
            theme: "InspiredGitHub".to_string(),
            dark_theme: Some("base16-ocean.dark".to_string()),
        }
    }
}
