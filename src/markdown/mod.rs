//! Markdown pipeline.
//!
//! ```text
//! body ──► Lexer (extensions first, pulldown-cmark for the rest) ──► Token tree
//!      ──► Renderer (node overrides) ──► Rendered { html, outgoing slugs, toc }
//! ```
//!
//! A [`Markdown`] instance holds the registered extensions and the shared
//! highlighter; it is immutable and can render many posts concurrently.

pub mod admonition;
pub mod code_group;
mod convert;
pub mod frontmatter;
pub mod lexer;
pub mod render;
pub mod token;

pub use admonition::{Admonitions, CustomBlock, Icon};
pub use code_group::{CodeGroup, CodeGroups, GroupIds};
pub use convert::MarkdownOptions;
pub use lexer::{BlockExtension, Lexer};
pub use render::{Renderer, TocEntry};
pub use token::Token;

use std::path::Path;
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::highlight::Highlighter;

/// Per-document inputs the renderer overrides need.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    /// Directory of the source file, base for relative image paths.
    pub source_dir: &'a Path,
}

/// Output of rendering one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub html: String,
    /// Post slugs linked from this document, first occurrence order.
    pub outgoing_slugs: Vec<String>,
    pub toc: Vec<TocEntry>,
}

/// Markdown renderer with its registered block extensions.
pub struct Markdown {
    extensions: Vec<Box<dyn BlockExtension>>,
    highlighter: Arc<Highlighter>,
    options: MarkdownOptions,
}

impl std::fmt::Debug for Markdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.extensions.iter().map(|e| e.name()).collect();
        f.debug_struct("Markdown")
            .field("extensions", &names)
            .field("options", &self.options)
            .finish()
    }
}

impl Markdown {
    /// Pipeline with admonitions and code groups registered.
    pub fn new(highlighter: Arc<Highlighter>) -> Self {
        Self {
            extensions: vec![Box::new(Admonitions), Box::new(CodeGroups)],
            highlighter,
            options: MarkdownOptions::all(),
        }
    }

    /// Register another block extension, consulted after the existing ones.
    pub fn with_extension(mut self, extension: impl BlockExtension + 'static) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Tokenize without rendering.
    pub fn lex(&self, src: &str, ids: &GroupIds) -> Vec<Token> {
        Lexer::new(&self.extensions, &self.highlighter, ids, &self.options)
            .with_references(src)
            .lex(src)
    }

    /// Tokenize and render a document body.
    pub fn render(&self, src: &str, ctx: &RenderContext<'_>, ids: &GroupIds) -> Rendered {
        let tokens = self.lex(src, ids);
        let mut renderer = Renderer::new(ctx, &self.extensions, &self.highlighter);
        let html = renderer.render_tokens(&tokens);
        let (outgoing_slugs, toc) = renderer.finish();

        Rendered {
            html,
            outgoing_slugs,
            toc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HighlightSection;
    use std::sync::LazyLock;

    static MD: LazyLock<Markdown> = LazyLock::new(|| {
        let highlighter = Highlighter::from_config(&HighlightSection::default()).unwrap();
        Markdown::new(Arc::new(highlighter))
    });

    fn config() -> SiteConfig {
        SiteConfig::from_str(
            r#"
            [site]
            url = "https://blog.example.dev"
            posts_path = "/blog"

            [links]
            tracked_domains = ["angular.dev"]
            tracking_param = "ref=inkpost"
            "#,
        )
        .unwrap()
    }

    fn render_with(src: &str, ids: &GroupIds) -> Rendered {
        let config = config();
        let ctx = RenderContext {
            config: &config,
            source_dir: Path::new("/site/content/blog/my-post"),
        };
        MD.render(src, &ctx, ids)
    }

    fn render(src: &str) -> Rendered {
        render_with(src, &GroupIds::new())
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_admonition_round_trip() {
        let html = render(":::warning\nBe careful\n:::").html;
        assert_eq!(
            html,
            "<div class=\"custom-block warning\"><p class=\"custom-block-title\">Warning</p><p>Be careful</p>\n</div>\n"
        );
    }

    #[test]
    fn test_ai_admonition_style() {
        let html = render(":::ai\nGenerated\n:::\n").html;
        assert!(html.contains("custom-block info-ai"));
        assert!(html.contains(">AI Note</p>"));
    }

    #[test]
    fn test_admonition_body_is_markdown() {
        let html = render(":::tip\nUse `inject()`:\n\n```ts\nconst a = inject(A);\n```\n:::\n").html;
        assert!(html.contains("<code>inject()</code>"));
        assert!(html.contains("<div class=\"code-block\">"));
    }

    #[test]
    fn test_unterminated_fence_stays_literal() {
        let html = render(":::danger\nOops").html;
        assert!(!html.contains("custom-block"));
        assert!(html.contains(":::danger"));
    }

    #[test]
    fn test_paragraph_fence_fallback() {
        let html = render(":::details\nfirst line\nsecond line\n:::\n").html;
        assert_eq!(
            html,
            "<div class=\"details\"><p>first line</p><p>second line</p></div>\n"
        );
    }

    #[test]
    fn test_code_group_tabs() {
        let src = ":::code-group\n```ts[title=app.ts]\nconst a = 1;\n```\n\n```js[title=app.js]\nvar a = 1;\n```\n\n```bash\nnpm i\n```\n:::\n";
        let html = render(src).html;

        assert_eq!(count(&html, "<div class=\"code-group\">"), 1);
        assert_eq!(count(&html, "<button type=\"button\" role=\"tab\""), 3);
        assert_eq!(count(&html, "class=\"code-group-panel\""), 3);
        assert_eq!(count(&html, "code-group-tab active"), 1);
        assert_eq!(count(&html, "aria-selected=\"true\""), 1);
        assert_eq!(count(&html, " hidden>"), 2);

        for id in 0..3 {
            assert!(html.contains(&format!("id=\"code-group-tab-{id}\"")));
            assert!(html.contains(&format!("id=\"code-group-panel-{id}\"")));
        }
        // First pair is the active one
        let active = html.find("code-group-tab active").unwrap();
        assert!(html[active..].starts_with("code-group-tab active\" id=\"code-group-tab-0\""));
        assert!(html.contains("id=\"code-group-panel-0\" role=\"tabpanel\" aria-labelledby=\"code-group-tab-0\">"));
        // Untitled tabs fall back to the language
        assert!(html.contains(">bash</button>"));
    }

    #[test]
    fn test_code_group_ids_unique_across_renders() {
        let src = ":::code-group\n```ts[title=a]\n1\n```\n```ts[title=b]\n2\n```\n:::\n";
        let ids = GroupIds::new();
        let first = render_with(src, &ids).html;
        let second = render_with(src, &ids).html;

        assert!(first.contains("code-group-tab-0") && first.contains("code-group-tab-1"));
        assert!(second.contains("code-group-tab-2") && second.contains("code-group-tab-3"));
        assert!(!second.contains("code-group-tab-0\""));
    }

    #[test]
    fn test_code_group_without_blocks_falls_through() {
        let html = render(":::code-group\nno code here\n:::\n").html;
        assert!(!html.contains("<div class=\"code-group\">"));
        assert!(html.contains(":::code-group"));
    }

    #[test]
    fn test_heading_anchor_and_toc() {
        let rendered = render("# Title\n\n## Using `inject()` & friends\n\n### Déjà vu\n");
        assert!(rendered.html.contains("<h1>Title</h1>"));
        assert!(rendered.html.contains(
            "<h2 id=\"using-inject-and-friends\"><a class=\"heading-anchor\" href=\"#using-inject-and-friends\">"
        ));
        assert_eq!(
            rendered.toc,
            vec![
                TocEntry {
                    description: "Using inject() & friends".into(),
                    level: 2,
                    slug: "using-inject-and-friends".into(),
                },
                TocEntry {
                    description: "Déjà vu".into(),
                    level: 3,
                    slug: "deja-vu".into(),
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_headings_share_slug() {
        let rendered = render("## Setup\n\ntext\n\n## Setup\n");
        assert_eq!(count(&rendered.html, "id=\"setup\""), 2);
        assert_eq!(rendered.toc.len(), 2);
        assert_eq!(rendered.toc[0].slug, rendered.toc[1].slug);
    }

    #[test]
    fn test_heading_without_slug_is_plain() {
        let html = render("## ???\n").html;
        assert_eq!(html, "<h2>???</h2>\n");
    }

    #[test]
    fn test_relative_post_link() {
        let rendered = render("See [other](../other-post/index.md#setup) and [again](../other-post/).");
        assert!(rendered.html.contains("<a href=\"/blog/other-post#setup\">other</a>"));
        assert_eq!(rendered.outgoing_slugs, vec!["other-post"]);
    }

    #[test]
    fn test_same_origin_link_records_slug() {
        let rendered = render("[a](/blog/first/) [b](https://blog.example.dev/blog/second)");
        assert_eq!(rendered.outgoing_slugs, vec!["first", "second"]);
        assert!(!rendered.html.contains("external-link"));
    }

    #[test]
    fn test_external_link_tracking_and_favicon() {
        let html = render("[docs](https://angular.dev/guide/signals) [mdn](https://developer.mozilla.org/)").html;
        assert!(html.contains("href=\"https://angular.dev/guide/signals?ref=inkpost\""));
        assert!(html.contains("href=\"https://developer.mozilla.org/\""));
        assert!(html.contains("src=\"https://icons.duckduckgo.com/ip3/developer.mozilla.org.ico\""));
        assert_eq!(count(&html, "class=\"external-link\""), 2);
        assert_eq!(count(&html, "rel=\"noopener noreferrer\""), 2);
    }

    #[test]
    fn test_invalid_external_url_omits_favicon() {
        let html = render("[broken](http://)").html;
        assert!(html.contains("external-link"));
        assert!(!html.contains("link-favicon"));
    }

    #[test]
    fn test_image_rewrite() {
        let html = render("![diagram](./images/flow.png) ![remote](https://cdn.example.com/a.png)").html;
        assert!(html.contains("src=\"/assets/blog/my-post/images/flow.webp\" alt=\"diagram\""));
        assert!(html.contains("src=\"https://cdn.example.com/a.png\""));
    }

    #[test]
    fn test_codespan_plain() {
        let html = render("Call `a < b` now").html;
        assert_eq!(html, "<p>Call <code>a &lt; b</code> now</p>\n");
    }

    #[test]
    fn test_reference_link_and_footnote_across_admonition() {
        let src = "See [B][b] for details[^1].\n\n:::note\nhi\n:::\n\n[b]: ../beta/index.md\n[^1]: The footnote.\n";
        let rendered = render(src);
        assert_eq!(rendered.outgoing_slugs, vec!["beta".to_string()]);
        assert!(rendered.html.contains("<a href=\"/blog/beta\">B</a>"));
        assert!(!rendered.html.contains("[B][b]"));
        assert!(rendered.html.contains("href=\"#fn-1\""));
        assert!(rendered.html.contains("id=\"fn-1\""));
        assert!(rendered.html.contains("custom-block note"));
    }
}
