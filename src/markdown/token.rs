//! Token tree produced by the lexer and consumed by the renderer.

use super::admonition::CustomBlock;
use super::code_group::CodeGroup;

/// A node of the intermediate representation.
///
/// Block tokens nest through `tokens`; tokens are never mutated once the
/// lexer has built them.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Paragraph, with the source text it was parsed from.
    Paragraph { raw: String, tokens: Vec<Token> },
    /// Heading; `text` is the plain text with code spans in backticks.
    Heading {
        level: u8,
        text: String,
        tokens: Vec<Token>,
    },
    /// Fenced or indented code block; `lang` is the full info string.
    Code { lang: String, text: String },
    /// Admonition (`:::note` ... `:::`).
    CustomBlock(CustomBlock),
    /// Tabbed code blocks (`:::code-group` ... `:::`).
    CodeGroup(CodeGroup),
    /// Generic element without override (blockquote, list, table, em, ...).
    Container {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
        tokens: Vec<Token>,
    },
    Link {
        href: String,
        title: String,
        tokens: Vec<Token>,
    },
    Image {
        src: String,
        title: String,
        alt: String,
    },
    Codespan(String),
    Text(String),
    Html(String),
    FootnoteRef(String),
    TaskMarker(bool),
    SoftBreak,
    HardBreak,
    Rule,
}

impl Token {
    /// Concatenated text content; code spans are wrapped in backticks.
    pub fn plain_text(tokens: &[Token]) -> String {
        let mut out = String::new();
        collect_text(tokens, &mut out);
        out
    }
}

fn collect_text(tokens: &[Token], out: &mut String) {
    for token in tokens {
        match token {
            Token::Text(t) => out.push_str(t),
            Token::Codespan(c) => {
                out.push('`');
                out.push_str(c);
                out.push('`');
            }
            Token::SoftBreak | Token::HardBreak => out.push(' '),
            Token::Image { alt, .. } => out.push_str(alt),
            Token::Paragraph { tokens, .. }
            | Token::Heading { tokens, .. }
            | Token::Container { tokens, .. }
            | Token::Link { tokens, .. } => collect_text(tokens, out),
            _ => {}
        }
    }
}
