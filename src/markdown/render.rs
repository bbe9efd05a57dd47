//! Token tree → HTML, with the site-specific node overrides.
//!
//! | Node       | Override                                                       |
//! |------------|----------------------------------------------------------------|
//! | link       | `../post/index.md` → post URL, outgoing slugs, external decor  |
//! | image      | relative path → `{asset_path}/<last 4 segments>.{format}`       |
//! | heading    | slug anchor (levels 2-6), TOC entry                            |
//! | paragraph  | `:::class` fallback for fences no extension claimed            |
//! | codespan   | plain `<code>`                                                 |
//!
//! Nothing here fails: unusable input renders as plain markup.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::admonition::{CLOSE_FENCE, Icon};
use super::code_group::OPEN_FENCE;
use super::lexer::BlockExtension;
use super::token::Token;
use super::RenderContext;
use crate::highlight::Highlighter;
use crate::slug::slugify;
use crate::utils::html::{escape, escape_attr};
use crate::utils::path::{is_external_link, is_http, last_segment, normalize_lexical, split_path_fragment, tail_segments};

/// Relative link to a sibling post: `../slug/`, `../slug/index.md#frag`.
static POST_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\./([^/#?]+)/(?:index\.md)?(#.*)?$").unwrap());

/// Image extensions converted to the configured output format.
const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Path segments kept from a relative image path.
const ASSET_SEGMENTS: usize = 4;

/// Table-of-contents entry collected from a heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub description: String,
    pub level: u8,
    pub slug: String,
}

/// Renders one document; collects outgoing post slugs and the TOC on the way.
pub struct Renderer<'a> {
    ctx: &'a RenderContext<'a>,
    extensions: &'a [Box<dyn BlockExtension>],
    highlighter: &'a Highlighter,
    outgoing: Vec<String>,
    toc: Vec<TocEntry>,
}

impl<'a> Renderer<'a> {
    pub fn new(
        ctx: &'a RenderContext<'a>,
        extensions: &'a [Box<dyn BlockExtension>],
        highlighter: &'a Highlighter,
    ) -> Self {
        Self {
            ctx,
            extensions,
            highlighter,
            outgoing: Vec::new(),
            toc: Vec::new(),
        }
    }

    /// Consume the renderer, returning `(outgoing slugs, toc)`.
    pub fn finish(self) -> (Vec<String>, Vec<TocEntry>) {
        (self.outgoing, self.toc)
    }

    pub fn render_tokens(&mut self, tokens: &[Token]) -> String {
        tokens.iter().map(|token| self.render_token(token)).collect()
    }

    pub fn render_token(&mut self, token: &Token) -> String {
        match token {
            Token::Paragraph { raw, tokens } => self.paragraph(raw, tokens),
            Token::Heading {
                level,
                text,
                tokens,
            } => self.heading(*level, text, tokens),
            Token::Code { lang, text } => self.highlighter.highlight(text, lang),
            Token::CustomBlock(_) | Token::CodeGroup(_) => {
                let extensions = self.extensions;
                extensions
                    .iter()
                    .find_map(|ext| ext.render(token, self))
                    .unwrap_or_default()
            }
            Token::Container { tag, attrs, tokens } => {
                let inner = self.render_tokens(tokens);
                let mut html = format!("<{tag}");
                for (name, value) in attrs {
                    html.push_str(&format!(" {name}=\"{}\"", escape_attr(value)));
                }
                html.push_str(&format!(">{inner}</{tag}>"));
                if is_block(tag) {
                    html.push('\n');
                }
                html
            }
            Token::Link {
                href,
                title,
                tokens,
            } => self.link(href, title, tokens),
            Token::Image { src, title, alt } => self.image(src, title, alt),
            Token::Codespan(code) => format!("<code>{}</code>", escape(code)),
            Token::Text(text) => escape(text).into_owned(),
            Token::Html(html) => html.clone(),
            Token::FootnoteRef(name) => format!(
                "<sup class=\"footnote-ref\"><a href=\"#fn-{0}\" id=\"fnref-{0}\">[{0}]</a></sup>",
                escape_attr(name)
            ),
            Token::TaskMarker(checked) => format!(
                "<input type=\"checkbox\" disabled{}> ",
                if *checked { " checked" } else { "" }
            ),
            Token::SoftBreak => "\n".to_string(),
            Token::HardBreak => "<br>\n".to_string(),
            Token::Rule => "<hr>\n".to_string(),
        }
    }

    // ------------------------------------------------------------------------
    // overrides
    // ------------------------------------------------------------------------

    fn paragraph(&mut self, raw: &str, tokens: &[Token]) -> String {
        let Some(class) = fallback_class(raw) else {
            return format!("<p>{}</p>\n", self.render_tokens(tokens));
        };

        let mut html = format!("<div class=\"{}\">", escape_attr(class));
        for line in split_lines(tokens).into_iter().skip(1) {
            if Token::plain_text(line).trim() == CLOSE_FENCE {
                continue;
            }
            html.push_str(&format!("<p>{}</p>", self.render_tokens(line)));
        }
        html.push_str("</div>\n");
        html
    }

    fn heading(&mut self, level: u8, text: &str, tokens: &[Token]) -> String {
        let inner = self.render_tokens(tokens);
        let slug = slugify(text);

        if level == 1 || slug.is_empty() {
            return format!("<h{level}>{inner}</h{level}>\n");
        }

        self.toc.push(TocEntry {
            description: text.replace('`', ""),
            level,
            slug: slug.clone(),
        });
        format!(
            "<h{level} id=\"{slug}\"><a class=\"heading-anchor\" href=\"#{slug}\">{inner}</a></h{level}>\n"
        )
    }

    fn link(&mut self, href: &str, title: &str, tokens: &[Token]) -> String {
        let inner = self.render_tokens(tokens);
        let title = if title.is_empty() {
            String::new()
        } else {
            format!(" title=\"{}\"", escape_attr(title))
        };

        if let Some(caps) = POST_LINK.captures(href) {
            let slug = &caps[1];
            let fragment = caps.get(2).map_or("", |m| m.as_str());
            let target = format!("{}{fragment}", self.ctx.config.post_path(slug));
            self.record_outgoing(slug);
            return format!("<a href=\"{}\"{title}>{inner}</a>", escape_attr(&target));
        }

        if self.is_same_origin(href) {
            if let Some(slug) = last_segment(href) {
                self.record_outgoing(slug);
            }
            return format!("<a href=\"{}\"{title}>{inner}</a>", escape_attr(href));
        }

        if is_http(href) {
            let (href, favicon) = self.decorate_external(href);
            let icon = favicon.map_or_else(String::new, |src| {
                format!(
                    "<img class=\"link-favicon\" src=\"{}\" alt=\"\" width=\"16\" height=\"16\" loading=\"lazy\">",
                    escape_attr(&src)
                )
            });
            return format!(
                "<a href=\"{}\"{title} target=\"_blank\" rel=\"noopener noreferrer\" class=\"external-link\">{icon}{inner}</a>",
                escape_attr(&href)
            );
        }

        format!("<a href=\"{}\"{title}>{inner}</a>", escape_attr(href))
    }

    fn image(&self, src: &str, title: &str, alt: &str) -> String {
        let src = if is_external_link(src) || src.starts_with('/') {
            src.to_string()
        } else {
            asset_path(
                &self.ctx.config.site.asset_path,
                self.ctx.source_dir,
                src,
                &self.ctx.config.build.image_format,
            )
        };

        let mut html = format!("<img src=\"{}\" alt=\"{}\"", escape_attr(&src), escape_attr(alt));
        if !title.is_empty() {
            html.push_str(&format!(" title=\"{}\"", escape_attr(title)));
        }
        html.push_str(" loading=\"lazy\">");
        html
    }

    // ------------------------------------------------------------------------
    // helpers
    // ------------------------------------------------------------------------

    fn record_outgoing(&mut self, slug: &str) {
        if !self.outgoing.iter().any(|s| s == slug) {
            self.outgoing.push(slug.to_string());
        }
    }

    fn is_same_origin(&self, href: &str) -> bool {
        (href.starts_with('/') && !href.starts_with("//"))
            || href
                .strip_prefix(self.ctx.config.origin())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Tracking parameter for allow-listed hosts, favicon URL for any host.
    /// An unparseable URL is returned untouched, without favicon.
    fn decorate_external(&self, href: &str) -> (String, Option<String>) {
        let links = &self.ctx.config.links;
        let Ok(mut url) = url::Url::parse(href) else {
            return (href.to_string(), None);
        };
        let Some(host) = url.host_str().map(str::to_string) else {
            return (href.to_string(), None);
        };

        let tracked = links
            .tracked_domains
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")));

        let href = if tracked {
            with_query_param(&mut url, &links.tracking_param);
            url.to_string()
        } else {
            href.to_string()
        };

        let favicon = (!links.favicon_service.is_empty())
            .then(|| links.favicon_service.replace("{host}", &host));
        (href, favicon)
    }
}

/// Class named by a paragraph that starts with a fence no extension claimed.
///
/// Admonition keywords and `code-group` are excluded: reaching this point
/// with one of those means the block was unterminated, which stays literal.
fn fallback_class(raw: &str) -> Option<&str> {
    let first_line = raw.lines().next()?;
    if first_line == OPEN_FENCE {
        return None;
    }
    let word = first_line.strip_prefix(CLOSE_FENCE)?.split_whitespace().next()?;
    if Icon::from_keyword(word).is_some() {
        return None;
    }
    Some(word)
}

/// Split inline tokens at line breaks.
fn split_lines(tokens: &[Token]) -> Vec<&[Token]> {
    tokens
        .split(|t| matches!(t, Token::SoftBreak | Token::HardBreak))
        .collect()
}

/// Append a `key=value` tracking parameter to the query of `url`, unless
/// the query already carries that key.
fn with_query_param(url: &mut url::Url, param: &str) {
    let (key, value) = param.split_once('=').unwrap_or((param, ""));
    if key.is_empty() || url.query_pairs().any(|(k, _)| k == key) {
        return;
    }
    url.query_pairs_mut().append_pair(key, value);
}

/// `{asset_path}/<last 4 segments of source_dir/src>` with raster
/// extensions replaced by `format`.
fn asset_path(asset_root: &str, source_dir: &Path, src: &str, format: &str) -> String {
    let (src, _) = split_path_fragment(src);
    let resolved = normalize_lexical(&source_dir.join(src));
    let mut tail = Path::new(&tail_segments(&resolved, ASSET_SEGMENTS)).to_path_buf();

    let is_raster = tail
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| RASTER_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    if is_raster && !format.is_empty() {
        tail.set_extension(format);
    }

    format!(
        "{}/{}",
        asset_root.trim_end_matches('/'),
        tail.to_string_lossy().replace('\\', "/")
    )
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "blockquote" | "ul" | "ol" | "li" | "table" | "thead" | "tbody" | "tr" | "div" | "dl"
    )
}
