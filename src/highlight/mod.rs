//! Syntax highlighting adapter.
//!
//! [`Highlighter::highlight`] turns a code block into themed markup:
//!
//! ```text
//! info string ──► CodeInfo (lang, line spec, filename)
//!      │
//! source ──► syntect lines × spans ──► Palette (color → var) ──► HTML
//! ```
//!
//! Output never embeds literal colors, only `var(--code-*)` references, so
//! the same HTML serves every theme. Unknown languages fall back to plain
//! text and never fail.

mod info;
pub mod lang;
pub mod palette;

pub use info::{CodeInfo, LineSet};
pub use palette::{Palette, UNKNOWN_VAR};

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use thiserror::Error;

use crate::config::HighlightSection;
use crate::utils::{hash, html::escape};

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("unknown highlight theme `{name}` (available: {available})")]
    UnknownTheme { name: String, available: String },
}

/// One colored run of text within a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<'a> {
    pub text: &'a str,
    /// CSS variable name, e.g. `--code-keyword`.
    pub var: &'a str,
}

/// Grammar set, active theme and its palette. Build once, share across posts.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
    theme: Theme,
    dark_theme: Option<Theme>,
    palette: Palette,
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("theme", &self.theme.name)
            .field("palette", &self.palette.len())
            .finish()
    }
}

impl Highlighter {
    /// Load default grammars and themes and select a theme by name.
    pub fn new(theme: &str) -> Result<Self, HighlightError> {
        let themes = ThemeSet::load_defaults();
        let theme = find_theme(&themes, theme)?;
        let palette = Palette::from_theme(&theme);

        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes,
            theme,
            dark_theme: None,
            palette,
        })
    }

    pub fn from_config(config: &HighlightSection) -> Result<Self, HighlightError> {
        let mut highlighter = Self::new(&config.theme)?;
        if let Some(dark) = &config.dark_theme {
            highlighter.dark_theme = Some(find_theme(&highlighter.themes, dark)?);
        }
        Ok(highlighter)
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Variable declarations for the active theme (`:root`) and the dark
    /// theme (`[data-theme="dark"]`) if one is configured.
    pub fn css(&self) -> String {
        let mut css = palette::theme_css(":root", &self.theme, &self.palette);
        if let Some(dark) = &self.dark_theme {
            css.push('\n');
            css.push_str(&palette::theme_css("[data-theme=\"dark\"]", dark, &self.palette));
        }
        css
    }

    /// Grammar for a canonical language name, plain text if none matches.
    fn syntax_for(&self, lang: &str) -> &SyntaxReference {
        self.syntaxes
            .find_syntax_by_token(lang)
            .or_else(|| lang::grammar_fallback(lang).and_then(|t| self.syntaxes.find_syntax_by_token(t)))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    /// Split source into lines of colored spans.
    ///
    /// Line endings are not part of any span. A grammar error on one line
    /// degrades that line to a single foreground span.
    pub fn tokenize<'a>(&'a self, source: &'a str, lang: &str) -> Vec<Vec<Span<'a>>> {
        let lang = lang::normalize(lang);
        let mut lines = HighlightLines::new(self.syntax_for(&lang), &self.theme);

        LinesWithEndings::from(source)
            .map(|line| {
                let content = line.trim_end_matches(['\n', '\r']);
                match lines.highlight_line(line, &self.syntaxes) {
                    Ok(ranges) => ranges
                        .into_iter()
                        .map(|(style, text)| Span {
                            text: text.trim_end_matches(['\n', '\r']),
                            var: self.palette.var_for(style.foreground),
                        })
                        .filter(|span| !span.text.is_empty())
                        .collect(),
                    Err(_) => vec![Span {
                        text: content,
                        var: palette::FOREGROUND_VAR,
                    }],
                }
            })
            .collect()
    }

    /// Render a code block from its source and fenced info string.
    pub fn highlight(&self, source: &str, info: &str) -> String {
        let info = CodeInfo::parse(info);
        let lang = lang::normalize(&info.lang);
        let id = format!("code-{}", hash::fingerprint(source));

        let mut html = String::with_capacity(source.len() * 4);
        html.push_str("<div class=\"code-block\">");
        push_heading(&mut html, &lang, info.filename.as_deref(), &id);

        html.push_str(&format!("<pre id=\"{id}\""));
        if !lang.is_empty() {
            html.push_str(&format!(" class=\"language-{}\"", escape(&lang)));
        }
        html.push_str("><code>");

        for (index, spans) in self.tokenize(source, &lang).iter().enumerate() {
            let number = index + 1;
            let mut class = String::from("line");
            if !info.lines.is_empty() {
                class.push_str(if info.lines.contains(number) {
                    " highlighted"
                } else {
                    " dimmed"
                });
            }

            if spans.iter().all(|s| s.text.is_empty()) {
                html.push_str(&format!("<div class=\"{class} empty\">&#8203;</div>"));
                continue;
            }

            html.push_str(&format!("<div class=\"{class}\">"));
            for span in spans {
                html.push_str(&format!(
                    "<span style=\"color: var({})\">{}</span>",
                    span.var,
                    escape(span.text)
                ));
            }
            html.push_str("</div>");
        }

        html.push_str("</code></pre></div>");
        html
    }
}

fn push_heading(html: &mut String, lang: &str, filename: Option<&str>, id: &str) {
    html.push_str("<div class=\"code-heading\">");
    html.push_str(&format!(
        "<span class=\"code-lang\"><i class=\"icon icon-{}\"></i>{}</span>",
        lang::icon(lang),
        escape(lang)
    ));
    if let Some(name) = filename {
        html.push_str(&format!("<span class=\"code-filename\">{}</span>", escape(name)));
    }
    html.push_str(&format!(
        "<button class=\"copy-code\" type=\"button\" data-copy-target=\"{id}\" aria-label=\"Copy code\">Copy</button>"
    ));
    html.push_str("</div>");
}

fn find_theme(themes: &ThemeSet, name: &str) -> Result<Theme, HighlightError> {
    themes
        .themes
        .get(name)
        .cloned()
        .ok_or_else(|| HighlightError::UnknownTheme {
            name: name.to_string(),
            available: themes.themes.keys().cloned().collect::<Vec<_>>().join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static HL: LazyLock<Highlighter> =
        LazyLock::new(|| Highlighter::from_config(&HighlightSection::default()).unwrap());

    fn line_classes(html: &str) -> Vec<&str> {
        html.match_indices("<div class=\"line")
            .map(|(i, _)| {
                let rest = &html[i + "<div class=\"".len()..];
                &rest[..rest.find('"').unwrap()]
            })
            .collect()
    }

    #[test]
    fn test_unknown_theme() {
        let err = Highlighter::new("no-such-theme").unwrap_err();
        assert!(err.to_string().contains("no-such-theme"));
    }

    #[test]
    fn test_tokenize_shape() {
        let lines = HL.tokenize("let a = 1;\nlet b = 2;\n", "js");
        assert_eq!(lines.len(), 2);
        let first: String = lines[0].iter().map(|s| s.text).collect();
        assert_eq!(first, "let a = 1;");
        assert!(lines[0].iter().all(|s| s.var.starts_with("--code-")));
    }

    #[test]
    fn test_keywords_get_symbolic_vars() {
        let lines = HL.tokenize("fn main() {}", "rust");
        let fn_span = lines[0].iter().find(|s| s.text == "fn").unwrap();
        assert_ne!(fn_span.var, UNKNOWN_VAR);
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let html = HL.highlight("<just text & stuff>", "klingon");
        assert!(html.contains("&lt;just text &amp; stuff&gt;"));
        assert!(html.contains("icon-code"));
    }

    #[test]
    fn test_no_inline_hex_colors() {
        let html = HL.highlight("const x: number = 42;", "ts");
        assert!(html.contains("var(--code-"));
        assert!(!html.contains("color: #"));
        assert!(html.contains("class=\"language-typescript\""));
        assert!(html.contains("icon-typescript"));
    }

    #[test]
    fn test_line_range_highlight() {
        let source: String = (1..=10).map(|n| format!("let v{n} = {n};\n")).collect();
        let html = HL.highlight(&source, "ts{2,4-6}");
        let classes = line_classes(&html);
        assert_eq!(classes.len(), 10);
        for (i, class) in classes.iter().enumerate() {
            let n = i + 1;
            if [2, 4, 5, 6].contains(&n) {
                assert_eq!(*class, "line highlighted", "line {n}");
            } else {
                assert_eq!(*class, "line dimmed", "line {n}");
            }
        }
    }

    #[test]
    fn test_no_line_spec_no_dimming() {
        let html = HL.highlight("a\nb\n", "txt");
        assert_eq!(line_classes(&html), vec!["line", "line"]);
    }

    #[test]
    fn test_empty_lines_marked() {
        let html = HL.highlight("a\n\nb\n", "txt");
        assert_eq!(line_classes(&html), vec!["line", "line empty", "line"]);
    }

    #[test]
    fn test_whitespace_line_keeps_indentation() {
        let html = HL.highlight("a\n    \nb\n", "txt");
        assert_eq!(line_classes(&html), vec!["line", "line", "line"]);
        assert!(html.contains(">    </span></div>"));
    }

    #[test]
    fn test_filename_and_copy_button() {
        let source = "echo hi\n";
        let html = HL.highlight(source, "sh:install.sh");
        let id = format!("code-{}", hash::fingerprint(source));
        assert!(html.contains("<span class=\"code-filename\">install.sh</span>"));
        assert!(html.contains(&format!("data-copy-target=\"{id}\"")));
        assert!(html.contains(&format!("<pre id=\"{id}\"")));
        assert!(html.contains("icon-terminal"));
    }

    #[test]
    fn test_content_hash_stable() {
        let a = HL.highlight("x = 1\n", "py");
        let b = HL.highlight("x = 1\n", "python{1}");
        let id = |h: &str| h[h.find("<pre id=\"").unwrap()..].split('"').nth(1).unwrap().to_string();
        assert_eq!(id(&a), id(&b));
    }

    #[test]
    fn test_css_has_both_blocks() {
        let css = HL.css();
        assert!(css.contains(":root {"));
        assert!(css.contains("[data-theme=\"dark\"] {"));
    }
}
