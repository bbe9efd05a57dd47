//! Tabbed code groups.
//!
//! ````text
//! :::code-group
//! ```ts[title=app.ts]
//! ...
//! ```
//! ```js[title=app.js]
//! ...
//! ```
//! :::
//! ````
//!
//! The block opens at a line that is exactly `:::code-group` and ends at the
//! first `:::` line outside a fenced code block. Sub-blocks are split with a
//! line scanner, not a regex, so every fence pairs with its own close.

use std::sync::atomic::{AtomicU32, Ordering};

use super::admonition::CLOSE_FENCE;
use super::lexer::{BlockExtension, FenceState, Lexer, lines};
use super::render::Renderer;
use super::token::Token;
use crate::utils::html::escape;

/// Opening line of a code group.
pub const OPEN_FENCE: &str = ":::code-group";

/// Source of DOM ids for code-group tabs.
///
/// One counter shared by every render yields ids unique for the whole run.
/// Builds that parse posts in parallel give each post its own range with
/// [`GroupIds::for_post`], so ids do not depend on scheduling.
#[derive(Debug)]
pub struct GroupIds {
    next: AtomicU32,
}

impl GroupIds {
    /// Ids reserved per post by [`GroupIds::for_post`].
    pub const POST_STRIDE: u32 = 4096;

    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(base: u32) -> Self {
        Self {
            next: AtomicU32::new(base),
        }
    }

    /// Disjoint range for the post at `ordinal` in the sorted post list.
    pub fn for_post(ordinal: usize) -> Self {
        Self::starting_at(Self::post_base(ordinal))
    }

    /// First id of the range [`GroupIds::for_post`] hands out.
    pub fn post_base(ordinal: usize) -> u32 {
        u32::try_from(ordinal)
            .unwrap_or(u32::MAX)
            .saturating_mul(Self::POST_STRIDE)
    }

    /// Take the next id.
    pub fn next(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for GroupIds {
    fn default() -> Self {
        Self::new()
    }
}

/// One tab of a code group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBlock {
    /// Highlighted markup.
    pub formatted: String,
    /// Tab label, empty when the header has no `[title=...]`.
    pub title: String,
    pub id: u32,
    pub lang: String,
}

/// Code-group token payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeGroup {
    pub raw: String,
    pub codeblocks: Vec<GroupBlock>,
}

/// Fenced sub-block before highlighting.
#[derive(Debug, PartialEq)]
struct Fenced<'a> {
    header: &'a str,
    code: String,
}

/// End offset (past the closing line) of the group opening at offset 0.
fn group_end(src: &str) -> Option<usize> {
    let mut lines = lines(src);
    let (_, first) = lines.next()?;
    if first != OPEN_FENCE {
        return None;
    }

    let mut fence = FenceState::default();
    for (offset, line) in lines {
        if !fence.is_open() && line == CLOSE_FENCE {
            return Some(src[offset..].find('\n').map_or(src.len(), |i| offset + i + 1));
        }
        fence.feed(line);
    }
    None
}

/// Split a group body into fenced sub-blocks. Text outside fences is ignored.
fn split_fences(body: &str) -> Vec<Fenced<'_>> {
    let mut blocks = Vec::new();
    let mut fence = FenceState::default();
    let mut current: Option<Fenced<'_>> = None;

    for (_, line) in lines(body) {
        let was_open = fence.is_open();
        let toggled = fence.feed(line);

        match (was_open, toggled) {
            (false, true) => {
                current = Some(Fenced {
                    header: line,
                    code: String::new(),
                })
            }
            (true, true) => blocks.extend(current.take()),
            (true, false) => {
                if let Some(block) = current.as_mut() {
                    block.code.push_str(line);
                    block.code.push('\n');
                }
            }
            (false, false) => {}
        }
    }

    blocks
}

/// `ts[title=app.ts]` (backticks already present or not) → `("ts", "app.ts")`
fn parse_header(header: &str) -> (&str, &str) {
    let header = header.trim().trim_start_matches(['`', '~']);
    let lang = header.split('[').next().unwrap_or_default().trim();
    let title = header
        .find("[title=")
        .map(|i| &header[i + "[title=".len()..])
        .and_then(|rest| rest.find(']').map(|end| &rest[..end]))
        .unwrap_or_default();
    (lang, title)
}

/// The code-group block extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeGroups;

impl BlockExtension for CodeGroups {
    fn name(&self) -> &'static str {
        "code-group"
    }

    fn match_start(&self, src: &str) -> Option<usize> {
        lines(src)
            .find(|(_, line)| *line == OPEN_FENCE)
            .map(|(offset, _)| offset)
    }

    fn try_consume(&self, src: &str, lexer: &Lexer<'_>) -> Option<(Token, usize)> {
        let end = group_end(src)?;
        let raw = &src[..end];

        let body_start = raw.find('\n').map_or(raw.len(), |i| i + 1);
        let body_end = raw
            .trim_end_matches(['\n', '\r'])
            .len()
            .saturating_sub(CLOSE_FENCE.len())
            .max(body_start);

        let codeblocks: Vec<_> = split_fences(&raw[body_start..body_end])
            .into_iter()
            .map(|fenced| {
                let (lang, title) = parse_header(fenced.header);
                GroupBlock {
                    formatted: lexer.highlighter.highlight(&fenced.code, lang),
                    title: title.to_string(),
                    id: lexer.ids.next(),
                    lang: lang.to_string(),
                }
            })
            .collect();

        if codeblocks.is_empty() {
            return None;
        }

        let group = CodeGroup {
            raw: raw.to_string(),
            codeblocks,
        };
        Some((Token::CodeGroup(group), end))
    }

    fn render(&self, token: &Token, _renderer: &mut Renderer<'_>) -> Option<String> {
        let Token::CodeGroup(group) = token else {
            return None;
        };

        let mut html = String::from("<div class=\"code-group\">");

        html.push_str("<div class=\"code-group-tabs\" role=\"tablist\">");
        for (index, block) in group.codeblocks.iter().enumerate() {
            let active = index == 0;
            let label = if block.title.is_empty() {
                &block.lang
            } else {
                &block.title
            };
            html.push_str(&format!(
                "<button type=\"button\" role=\"tab\" class=\"code-group-tab{}\" id=\"code-group-tab-{id}\" aria-controls=\"code-group-panel-{id}\" aria-selected=\"{active}\">{}</button>",
                if active { " active" } else { "" },
                escape(label),
                id = block.id,
            ));
        }
        html.push_str("</div>");

        for (index, block) in group.codeblocks.iter().enumerate() {
            html.push_str(&format!(
                "<div class=\"code-group-panel\" id=\"code-group-panel-{id}\" role=\"tabpanel\" aria-labelledby=\"code-group-tab-{id}\"{}>{}</div>",
                if index == 0 { "" } else { " hidden" },
                block.formatted,
                id = block.id,
            ));
        }

        html.push_str("</div>\n");
        Some(html)
    }
}
