//! Built-in block handling: pulldown-cmark events → [`Token`] tree.
//!
//! The lexer hands every stretch of source that no extension claims to this
//! converter. Events are folded into tokens with a stack of open frames.
//!
//! Link reference and footnote definitions are collected once per document
//! ([`References::scan`]) so `[text][label]` and `[^name]` still resolve
//! when the definition sits in another stretch.

use pulldown_cmark::{BrokenLink, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag};
use rustc_hash::{FxHashMap, FxHashSet};

use super::token::Token;

/// Options for markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
        }
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            // Keeps `[^name]` a reference even when its definition lives in
            // another stretch; unknown names are filtered in `convert`.
            opts.insert(Options::ENABLE_OLD_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        opts
    }
}

/// Link reference and footnote definitions of a whole document.
#[derive(Debug, Clone, Default)]
pub struct References {
    /// Normalized label → (destination, title)
    defs: FxHashMap<String, (String, String)>,
    /// Normalized footnote names; `None` when the document was not scanned.
    footnotes: Option<FxHashSet<String>>,
}

impl References {
    /// Collect every `[label]: dest "title"` and `[^name]:` definition of
    /// `markdown`.
    pub fn scan(markdown: &str, options: &MarkdownOptions) -> Self {
        if !markdown.contains("]:") {
            return Self {
                defs: FxHashMap::default(),
                footnotes: Some(FxHashSet::default()),
            };
        }
        let parser = Parser::new_ext(markdown, options.to_pulldown_options());
        let defs = parser
            .reference_definitions()
            .iter()
            .map(|(label, def)| {
                let title = def.title.as_deref().unwrap_or_default();
                (normalize_label(label), (def.dest.to_string(), title.to_string()))
            })
            .collect();
        let footnotes = parser
            .filter_map(|event| match event {
                Event::Start(Tag::FootnoteDefinition(name)) => Some(normalize_label(&name)),
                _ => None,
            })
            .collect();

        Self {
            defs,
            footnotes: Some(footnotes),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty() && self.footnotes.as_ref().is_none_or(FxHashSet::is_empty)
    }

    fn resolve(&self, label: &str) -> Option<(String, String)> {
        self.defs.get(&normalize_label(label)).cloned()
    }

    fn has_footnote(&self, name: &str) -> bool {
        self.footnotes
            .as_ref()
            .is_none_or(|names| names.contains(&normalize_label(name)))
    }
}

/// Case-folded label with inner whitespace collapsed.
fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// What an open frame turns into when its end tag arrives.
enum Frame {
    Paragraph { raw: String },
    Heading { level: u8 },
    Code { lang: String },
    Link { href: String, title: String },
    Image { src: String, title: String },
    HtmlBlock,
    Container {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
    },
    Skip,
}

/// Stack frame for tracking nested elements
struct StackFrame {
    frame: Frame,
    children: Vec<Token>,
}

/// Markdown to token converter
struct Converter {
    /// Stack of open elements (for nested structures)
    stack: Vec<StackFrame>,
    /// Root tokens (collected when stack is empty)
    root: Vec<Token>,
}

impl Converter {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            root: Vec::new(),
        }
    }

    fn convert(mut self, markdown: &str, options: &MarkdownOptions, references: &References) -> Vec<Token> {
        // Labels defined elsewhere in the document
        let callback = |link: BrokenLink| {
            references
                .resolve(&link.reference)
                .map(|(dest, title)| (CowStr::from(dest), CowStr::from(title)))
        };
        let parser =
            Parser::new_with_broken_link_callback(markdown, options.to_pulldown_options(), Some(callback))
                .into_offset_iter();

        for (event, range) in parser {
            let event = match event {
                Event::FootnoteReference(name) if !references.has_footnote(&name) => {
                    Event::Text(format!("[^{name}]").into())
                }
                event => event,
            };
            self.handle_event(event, &markdown[range]);
        }

        // Unbalanced input: close whatever is still open
        while !self.stack.is_empty() {
            self.end_tag();
        }
        self.root
    }

    /// Handle a single pulldown-cmark event
    fn handle_event(&mut self, event: Event, source: &str) {
        match event {
            Event::Start(tag) => self.start_tag(tag, source),
            Event::End(_) => self.end_tag(),
            Event::Text(text) => self.add(Token::Text(text.to_string())),
            Event::Code(code) => self.add(Token::Codespan(code.to_string())),
            Event::Html(html) | Event::InlineHtml(html) => self.add(Token::Html(html.to_string())),
            Event::SoftBreak => self.add(Token::SoftBreak),
            Event::HardBreak => self.add(Token::HardBreak),
            Event::Rule => self.add(Token::Rule),
            Event::FootnoteReference(name) => self.add(Token::FootnoteRef(name.to_string())),
            Event::TaskListMarker(checked) => self.add(Token::TaskMarker(checked)),
            // Math is not enabled; keep the source visible if it ever shows up
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.add(Token::Text(math.to_string()))
            }
        }
    }

    fn start_tag(&mut self, tag: Tag, source: &str) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph {
                raw: source.trim_end().to_string(),
            },
            Tag::Heading { level, .. } => Frame::Heading {
                level: heading_level(level),
            },
            Tag::CodeBlock(kind) => Frame::Code {
                lang: match kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    CodeBlockKind::Indented => String::new(),
                },
            },
            Tag::Link {
                dest_url, title, ..
            } => Frame::Link {
                href: dest_url.to_string(),
                title: title.to_string(),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                src: dest_url.to_string(),
                title: title.to_string(),
            },
            Tag::HtmlBlock => Frame::HtmlBlock,
            Tag::MetadataBlock(_) => Frame::Skip,
            Tag::TableCell => {
                let tag = if self.in_table_head() { "th" } else { "td" };
                container(tag, vec![])
            }
            other => {
                let (tag, attrs) = element_for(&other);
                container(tag, attrs)
            }
        };

        self.stack.push(StackFrame {
            frame,
            children: Vec::new(),
        });
    }

    fn end_tag(&mut self) {
        let Some(StackFrame { frame, children }) = self.stack.pop() else {
            return;
        };

        let token = match frame {
            Frame::Paragraph { raw } => Token::Paragraph {
                raw,
                tokens: children,
            },
            Frame::Heading { level } => Token::Heading {
                level,
                text: Token::plain_text(&children),
                tokens: children,
            },
            Frame::Code { lang } => Token::Code {
                lang,
                text: Token::plain_text(&children),
            },
            Frame::Link { href, title } => Token::Link {
                href,
                title,
                tokens: children,
            },
            Frame::Image { src, title } => Token::Image {
                src,
                title,
                alt: Token::plain_text(&children),
            },
            Frame::HtmlBlock => Token::Html(
                children
                    .into_iter()
                    .filter_map(|t| match t {
                        Token::Html(h) | Token::Text(h) => Some(h),
                        _ => None,
                    })
                    .collect(),
            ),
            Frame::Container { tag, attrs } => Token::Container {
                tag,
                attrs,
                tokens: children,
            },
            Frame::Skip => return,
        };

        self.add(token);
    }

    fn in_table_head(&self) -> bool {
        self.stack
            .iter()
            .any(|f| matches!(f.frame, Frame::Container { tag: "thead", .. }))
    }

    /// Add a token to current context (top of stack or root)
    fn add(&mut self, token: Token) {
        if let Some(frame) = self.stack.last_mut() {
            frame.children.push(token);
        } else {
            self.root.push(token);
        }
    }
}

fn container(tag: &'static str, attrs: Vec<(&'static str, String)>) -> Frame {
    Frame::Container { tag, attrs }
}

/// Element name and attributes for tags without a dedicated token.
fn element_for(tag: &Tag) -> (&'static str, Vec<(&'static str, String)>) {
    match tag {
        Tag::BlockQuote(_) => ("blockquote", vec![]),
        Tag::List(Some(start)) if *start != 1 => ("ol", vec![("start", start.to_string())]),
        Tag::List(Some(_)) => ("ol", vec![]),
        Tag::List(None) => ("ul", vec![]),
        Tag::Item => ("li", vec![]),
        Tag::FootnoteDefinition(name) => (
            "div",
            vec![("class", "footnote".to_string()), ("id", format!("fn-{name}"))],
        ),
        Tag::Table(_) => ("table", vec![]),
        Tag::TableHead => ("thead", vec![]),
        Tag::TableRow => ("tr", vec![]),
        Tag::Emphasis => ("em", vec![]),
        Tag::Strong => ("strong", vec![]),
        Tag::Strikethrough => ("del", vec![]),
        Tag::Superscript => ("sup", vec![]),
        Tag::Subscript => ("sub", vec![]),
        Tag::DefinitionList => ("dl", vec![]),
        Tag::DefinitionListTitle => ("dt", vec![]),
        Tag::DefinitionListDefinition => ("dd", vec![]),
        _ => ("div", vec![]),
    }
}

/// Convert heading level to number
fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Convert a stretch of markdown into tokens.
pub fn tokens(markdown: &str, options: &MarkdownOptions, references: &References) -> Vec<Token> {
    Converter::new().convert(markdown, options, references)
}
