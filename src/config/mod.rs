//! Site configuration management for `inkpost.toml`.
//!
//! # Sections
//!
//! | Section        | Purpose                                            |
//! |----------------|----------------------------------------------------|
//! | `[site]`       | Origin and URL paths (posts, banners, assets)      |
//! | `[build]`      | Content/output directories, cache, strictness      |
//! | `[links]`      | External link tracking and favicon decoration      |
//! | `[highlight]`  | Code highlighting themes                           |
//!
//! Every section is optional, an empty file is a valid configuration.

mod error;
mod section;

pub use error::ConfigError;
pub use section::{BuildSection, HighlightSection, LinksSection, SiteSection};

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name.
pub const CONFIG_FILE: &str = "inkpost.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing inkpost.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub links: LinksSection,

    #[serde(default)]
    pub highlight: HighlightSection,
}

impl SiteConfig {
    /// Parse configuration from TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file. A missing file yields the defaults.
    ///
    /// The project root becomes the config file's parent directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content =
                fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
            Self::from_str(&content)?
        } else {
            Self::default()
        };

        config.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.site.url)
            .map_err(|e| ConfigError::validation("site.url", format!("`{}`: {e}", self.site.url)))?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::validation(
                "site.url",
                format!("`{}` is not an origin", self.site.url),
            ));
        }

        for (field, value) in [
            ("site.posts_path", &self.site.posts_path),
            ("site.banner_path", &self.site.banner_path),
            ("site.asset_path", &self.site.asset_path),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::validation(
                    field,
                    format!("`{value}` must start with `/`"),
                ));
            }
        }

        if !self.links.favicon_service.is_empty() && !self.links.favicon_service.contains("{host}") {
            return Err(ConfigError::validation(
                "links.favicon_service",
                "template must contain `{host}`",
            ));
        }

        Ok(())
    }

    /// Site origin without trailing slash.
    pub fn origin(&self) -> &str {
        self.site.url.trim_end_matches('/')
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Absolute content directory.
    pub fn content_dir(&self) -> PathBuf {
        self.root_join(&self.build.content)
    }

    /// Absolute output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.root_join(&self.build.output)
    }

    /// Absolute cache file path.
    pub fn cache_path(&self) -> PathBuf {
        self.root_join(&self.build.cache)
    }

    /// Site-absolute URL path of a post, e.g. `/blog/my-post`.
    pub fn post_path(&self, slug: &str) -> String {
        format!("{}/{slug}", self.site.posts_path.trim_end_matches('/'))
    }

    /// Hash of every setting that shows up in rendered posts.
    ///
    /// Directories, cache location and strictness are left out: changing
    /// them does not change a single rendered byte.
    pub fn render_fingerprint(&self) -> String {
        let rendered = (
            &self.site,
            &self.links,
            &self.highlight,
            &self.build.image_format,
        );
        let bytes = serde_json::to_vec(&rendered).unwrap_or_default();
        crate::utils::hash::fingerprint(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fingerprint() {
        let base = SiteConfig::default();
        let mut dirs = base.clone();
        dirs.build.output = PathBuf::from("dist");
        dirs.build.strict = true;
        assert_eq!(base.render_fingerprint(), dirs.render_fingerprint());

        let mut theme = base.clone();
        theme.highlight.theme = "base16-ocean.dark".into();
        assert_ne!(base.render_fingerprint(), theme.render_fingerprint());

        let mut origin = base.clone();
        origin.site.url = "https://other.example".into();
        assert_ne!(base.render_fingerprint(), origin.render_fingerprint());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = SiteConfig::from_str("").unwrap();
        assert_eq!(config.site.posts_path, "/blog");
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        assert!(!config.build.strict);
    }

    #[test]
    fn test_sections_parse() {
        let config = SiteConfig::from_str(
            r#"
[site]
url = "https://blog.example.org/"
posts_path = "/posts"

[build]
strict = true
image_format = "avif"

[links]
tracked_domains = ["docs.rs"]
tracking_param = "ref=me"
"#,
        )
        .unwrap();
        assert_eq!(config.origin(), "https://blog.example.org");
        assert_eq!(config.post_path("hello"), "/posts/hello");
        assert!(config.build.strict);
        assert_eq!(config.build.image_format, "avif");
        assert_eq!(config.links.tracked_domains, vec!["docs.rs"]);
        // untouched keys keep defaults
        assert_eq!(config.site.banner_path, "/banners");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = SiteConfig::from_str("[site]\nurl = \"not a url\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field: "site.url", .. }));
    }

    #[test]
    fn test_relative_paths_rejected() {
        let err = SiteConfig::from_str("[site]\nposts_path = \"blog\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field: "site.posts_path", .. }));
    }

    #[test]
    fn test_favicon_template_requires_host() {
        let err = SiteConfig::from_str("[links]\nfavicon_service = \"https://x.dev/icon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { field: "links.favicon_service", .. }));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.root, dir.path());
        assert_eq!(config.content_dir(), dir.path().join("content/blog"));
    }

    #[test]
    fn test_toml_syntax_error() {
        let err = SiteConfig::from_str("[site\nurl = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
