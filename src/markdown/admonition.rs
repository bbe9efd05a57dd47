//! Admonitions: `:::warning` ... `:::` callout boxes.
//!
//! The opening fence is a line that is exactly `:::<keyword>` with a keyword
//! from a closed vocabulary; the block ends at the first following line that
//! is exactly `:::`. Nesting is not supported, the first close always wins.
//! Without a close the text is left to the built-in paragraph handling.

use super::lexer::{BlockExtension, Lexer, lines};
use super::render::Renderer;
use super::token::Token;

/// Closing fence line of every directive block.
pub const CLOSE_FENCE: &str = ":::";

/// Admonition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Danger,
    Warning,
    Info,
    Note,
    Ai,
    Success,
    Tip,
}

impl Icon {
    pub const ALL: [Icon; 7] = [
        Icon::Danger,
        Icon::Warning,
        Icon::Info,
        Icon::Note,
        Icon::Ai,
        Icon::Success,
        Icon::Tip,
    ];

    /// Keyword used after the fence.
    pub fn keyword(self) -> &'static str {
        match self {
            Icon::Danger => "danger",
            Icon::Warning => "warning",
            Icon::Info => "info",
            Icon::Note => "note",
            Icon::Ai => "ai",
            Icon::Success => "success",
            Icon::Tip => "tip",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|icon| icon.keyword() == keyword)
    }

    /// `(css class, display title)`
    pub fn style(self) -> (&'static str, &'static str) {
        match self {
            Icon::Danger => ("danger", "Danger"),
            Icon::Warning => ("warning", "Warning"),
            Icon::Info => ("info", "Info"),
            Icon::Note => ("note", "Note"),
            Icon::Ai => ("info-ai", "AI Note"),
            Icon::Success => ("success", "Success"),
            Icon::Tip => ("tip", "Tip"),
        }
    }
}

/// Admonition token payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomBlock {
    pub icon: Icon,
    /// Source consumed, fences included.
    pub raw: String,
    /// Body between the fences, unparsed.
    pub text: String,
    /// Body lexed as ordinary block content.
    pub tokens: Vec<Token>,
}

/// Icon of an opening fence line.
fn opening(line: &str) -> Option<Icon> {
    line.strip_prefix(CLOSE_FENCE).and_then(Icon::from_keyword)
}

/// Byte ranges `(start, end)` of every complete block in `src`.
///
/// `start` is the offset of the opening line, `end` the offset just past the
/// closing line (including its newline).
fn sections(src: &str) -> Vec<(usize, usize)> {
    let mut sections = Vec::new();
    let mut open: Option<usize> = None;

    for (offset, line) in lines(src) {
        match open {
            None if opening(line).is_some() => open = Some(offset),
            Some(start) if line == CLOSE_FENCE => {
                let end = src[offset..]
                    .find('\n')
                    .map_or(src.len(), |i| offset + i + 1);
                sections.push((start, end));
                open = None;
            }
            _ => {}
        }
    }

    sections
}

/// The admonition block extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct Admonitions;

impl BlockExtension for Admonitions {
    fn name(&self) -> &'static str {
        "admonition"
    }

    fn match_start(&self, src: &str) -> Option<usize> {
        lines(src)
            .find(|(_, line)| opening(line).is_some())
            .map(|(offset, _)| offset)
    }

    fn try_consume(&self, src: &str, lexer: &Lexer<'_>) -> Option<(Token, usize)> {
        let &(start, end) = sections(src).first()?;
        if start != 0 {
            return None;
        }

        let raw = &src[..end];
        let (_, fence) = lines(raw).next()?;
        let icon = opening(fence)?;

        let body_start = raw.find('\n').map_or(raw.len(), |i| i + 1);
        let body_end = raw
            .trim_end_matches(['\n', '\r'])
            .len()
            .saturating_sub(CLOSE_FENCE.len())
            .max(body_start);
        let text = &raw[body_start..body_end];

        let block = CustomBlock {
            icon,
            raw: raw.to_string(),
            text: text.to_string(),
            tokens: lexer.lex(text),
        };
        Some((Token::CustomBlock(block), end))
    }

    fn render(&self, token: &Token, renderer: &mut Renderer<'_>) -> Option<String> {
        let Token::CustomBlock(block) = token else {
            return None;
        };
        let (class, title) = block.icon.style();
        let body = renderer.render_tokens(&block.tokens);
        Some(format!(
            "<div class=\"custom-block {class}\"><p class=\"custom-block-title\">{title}</p>{body}</div>\n"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_table() {
        assert_eq!(Icon::from_keyword("warning"), Some(Icon::Warning));
        assert_eq!(Icon::from_keyword("ai").map(Icon::style), Some(("info-ai", "AI Note")));
        assert_eq!(Icon::from_keyword("code-group"), None);
        assert_eq!(Icon::from_keyword("Warning"), None);
    }

    #[test]
    fn test_opening_line_is_exact() {
        assert_eq!(opening(":::tip"), Some(Icon::Tip));
        assert_eq!(opening(":::tip extra"), None);
        assert_eq!(opening(" :::tip"), None);
        assert_eq!(opening(":::"), None);
    }

    #[test]
    fn test_sections_collects_all_pairs() {
        let src = ":::note\na\n:::\ntext\n:::tip\nb\n:::\n";
        assert_eq!(sections(src), vec![(0, 14), (19, src.len())]);
    }

    #[test]
    fn test_first_close_wins() {
        let src = ":::note\nouter\n:::tip\ninner\n:::\nrest\n:::\n";
        let (start, end) = sections(src)[0];
        assert_eq!(start, 0);
        assert_eq!(&src[start..end], ":::note\nouter\n:::tip\ninner\n:::\n");
    }

    #[test]
    fn test_unterminated_has_no_section() {
        assert!(sections(":::danger\nOops").is_empty());
        assert_eq!(Admonitions.match_start("x\n:::danger\nOops"), Some(2));
    }

    #[test]
    fn test_close_without_trailing_newline() {
        let src = ":::info\nbody\n:::";
        assert_eq!(sections(src), vec![(0, src.len())]);
    }
}
