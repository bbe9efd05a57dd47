//! Block scanner.
//!
//! The lexer walks the source top to bottom without backtracking. At every
//! position it first offers the remaining text to the registered
//! [`BlockExtension`]s; if none consumes it, the text up to the next line where
//! an extension *could* start is handed to pulldown-cmark as one chunk.
//!
//! ```text
//! src ──► extension.try_consume(rest)? ──yes──► push token, advance
//!              │ no
//!              ▼
//!         next_boundary(rest) ──► convert::tokens(chunk) ──► push, advance
//! ```

use super::convert::{self, MarkdownOptions, References};
use super::render::Renderer;
use super::token::Token;
use crate::highlight::Highlighter;
use crate::markdown::code_group::GroupIds;

/// A pluggable block grammar.
///
/// Extensions are consulted in registration order before the built-in block
/// types, so the first one to consume wins.
pub trait BlockExtension: Send + Sync {
    /// Name used in debug output.
    fn name(&self) -> &'static str;

    /// Byte offset of the first line in `src` where this block could start.
    ///
    /// Must be a line start. Only a hint: [`try_consume`] decides.
    ///
    /// [`try_consume`]: BlockExtension::try_consume
    fn match_start(&self, src: &str) -> Option<usize>;

    /// Try to match at offset 0 of `src`; returns the token and the number of
    /// bytes consumed.
    fn try_consume(&self, src: &str, lexer: &Lexer<'_>) -> Option<(Token, usize)>;

    /// Render a token this extension produced, `None` if it is not ours.
    fn render(&self, token: &Token, renderer: &mut Renderer<'_>) -> Option<String>;
}

/// Open/closed state of a fenced code block while scanning line by line.
#[derive(Debug, Default, Clone, Copy)]
pub struct FenceState {
    /// Fence character and run length of the open fence.
    open: Option<(char, usize)>,
}

impl FenceState {
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line. Returns `true` if the line opened or closed a fence.
    pub fn feed(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start_matches(' ');
        // More than three spaces of indentation is an indented code line
        if line.len() - trimmed.len() > 3 {
            return false;
        }
        let Some(marker) = trimmed.chars().next().filter(|c| matches!(c, '`' | '~')) else {
            return false;
        };
        let run = trimmed.chars().take_while(|&c| c == marker).count();
        if run < 3 {
            return false;
        }

        match self.open {
            None => {
                self.open = Some((marker, run));
                true
            }
            Some((open, len)) if open == marker && run >= len => {
                let rest = &trimmed[run * marker.len_utf8()..];
                if rest.trim().is_empty() {
                    self.open = None;
                    true
                } else {
                    false
                }
            }
            Some(_) => false,
        }
    }
}

/// Lines of `src` with their byte offsets, line endings stripped.
pub fn lines(src: &str) -> impl Iterator<Item = (usize, &str)> {
    src.split_inclusive('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line.trim_end_matches(['\n', '\r'])))
    })
}

/// Block scanner for one document (or one nested body).
pub struct Lexer<'a> {
    extensions: &'a [Box<dyn BlockExtension>],
    pub highlighter: &'a Highlighter,
    pub ids: &'a GroupIds,
    options: &'a MarkdownOptions,
    references: References,
}

impl<'a> Lexer<'a> {
    pub fn new(
        extensions: &'a [Box<dyn BlockExtension>],
        highlighter: &'a Highlighter,
        ids: &'a GroupIds,
        options: &'a MarkdownOptions,
    ) -> Self {
        Self {
            extensions,
            highlighter,
            ids,
            options,
            references: References::default(),
        }
    }

    /// Resolve reference links against the definitions of the whole `document`,
    /// wherever extension blocks split it.
    pub fn with_references(mut self, document: &str) -> Self {
        self.references = References::scan(document, self.options);
        self
    }

    /// Tokenize `src`. Nested bodies call this recursively.
    pub fn lex(&self, src: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut rest = src;

        while !rest.is_empty() {
            if let Some((token, consumed)) = self.try_extensions(rest) {
                tokens.push(token);
                rest = &rest[consumed..];
                continue;
            }

            let end = self.next_boundary(rest);
            tokens.extend(convert::tokens(&rest[..end], self.options, &self.references));
            rest = &rest[end..];
        }

        tokens
    }

    fn try_extensions(&self, src: &str) -> Option<(Token, usize)> {
        self.extensions.iter().find_map(|ext| {
            let (token, consumed) = ext.try_consume(src, self)?;
            // A zero-length match would never advance
            (consumed > 0 && consumed <= src.len()).then(|| {
                crate::debug!("lexer"; "{} consumed {} bytes", ext.name(), consumed);
                (token, consumed)
            })
        })
    }

    /// End of the chunk starting at offset 0 that belongs to the built-in
    /// block types: the next line (after the first) where an extension could
    /// start outside a fenced code block, or the end of input.
    fn next_boundary(&self, src: &str) -> usize {
        let first = src.find('\n').map_or(src.len(), |i| i + 1);
        let Some(mut candidate) = self.earliest_start(src, first) else {
            return src.len();
        };

        let mut fence = FenceState::default();
        for (offset, line) in lines(src) {
            if offset == candidate {
                if !fence.is_open() {
                    return offset;
                }
                let next = offset + src[offset..].find('\n').map_or(src.len() - offset, |i| i + 1);
                match self.earliest_start(src, next) {
                    Some(c) => candidate = c,
                    None => return src.len(),
                }
            }
            fence.feed(line);
        }

        src.len()
    }

    fn earliest_start(&self, src: &str, from: usize) -> Option<usize> {
        if from >= src.len() {
            return None;
        }
        self.extensions
            .iter()
            .filter_map(|ext| ext.match_start(&src[from..]))
            .min()
            .map(|i| i + from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HighlightSection;
    use crate::markdown::admonition::Admonitions;
    use crate::markdown::code_group::CodeGroups;
    use std::sync::LazyLock;

    static HL: LazyLock<Highlighter> =
        LazyLock::new(|| Highlighter::from_config(&HighlightSection::default()).unwrap());

    fn lex(src: &str) -> Vec<Token> {
        let extensions: Vec<Box<dyn BlockExtension>> =
            vec![Box::new(Admonitions), Box::new(CodeGroups)];
        let ids = GroupIds::new();
        let options = MarkdownOptions::all();
        Lexer::new(&extensions, &HL, &ids, &options)
            .with_references(src)
            .lex(src)
    }

    #[test]
    fn test_fence_state() {
        let mut fence = FenceState::default();
        assert!(fence.feed("```ts"));
        assert!(fence.is_open());
        assert!(!fence.feed("~~~"));
        assert!(!fence.feed("```not a close"));
        assert!(fence.feed("```"));
        assert!(!fence.is_open());
        assert!(!fence.feed("``"));
        assert!(!fence.feed("    ```"));
    }

    #[test]
    fn test_lines_offsets() {
        let src = "a\r\nbb\nccc";
        let collected: Vec<_> = lines(src).collect();
        assert_eq!(collected, vec![(0, "a"), (3, "bb"), (6, "ccc")]);
    }

    #[test]
    fn test_extension_splits_paragraphs() {
        let tokens = lex("Intro text\n:::note\nInside\n:::\nOutro\n");
        assert_eq!(tokens.len(), 3);
        assert!(matches!(tokens[0], Token::Paragraph { .. }));
        assert!(matches!(tokens[1], Token::CustomBlock(_)));
        assert!(matches!(tokens[2], Token::Paragraph { .. }));
    }

    #[test]
    fn test_directive_inside_code_fence_ignored() {
        let tokens = lex("```md\n:::note\nnot a block\n:::\n```\n");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0], Token::Code { .. }));
    }

    #[test]
    fn test_back_to_back_blocks() {
        let tokens = lex(":::tip\nA\n:::\n:::warning\nB\n:::\n");
        let kinds: Vec<_> = tokens
            .iter()
            .filter(|t| matches!(t, Token::CustomBlock(_)))
            .collect();
        assert_eq!(kinds.len(), 2);
    }

    #[test]
    fn test_unterminated_falls_through() {
        let tokens = lex(":::danger\nOops");
        assert!(tokens.iter().all(|t| !matches!(t, Token::CustomBlock(_))));
        assert!(Token::plain_text(&tokens).contains(":::danger"));
    }

    #[test]
    fn test_reference_definition_across_block() {
        let tokens = lex("See [B][b].\n\n:::note\nhi\n:::\n\n[b]: ../beta/index.md\n");
        let Token::Paragraph { tokens: inline, .. } = &tokens[0] else {
            panic!("expected paragraph, got {tokens:?}");
        };
        assert!(inline
            .iter()
            .any(|t| matches!(t, Token::Link { href, .. } if href == "../beta/index.md")));
    }
}
