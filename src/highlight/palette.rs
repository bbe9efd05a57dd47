//! Theme color → CSS variable reverse lookup.
//!
//! The highlighter hands out literal colors. Emitting them inline would bake
//! one theme into the HTML, so every color is mapped back to a symbolic
//! variable derived from the theme scope that defines it
//! (`keyword.control` → `--code-keyword-control`). A light/dark switch then
//! only swaps the variable values in CSS.
//!
//! Colors are compared as lowercase `#rrggbb` (plus `aa` when not opaque),
//! so case differences between sources never cause a miss.
//!
//! Themes reuse colors across unrelated scopes. When several scopes share a
//! color, the variable comes from the most general well-known scope
//! ([`PREFERRED_SCOPES`]), so `keyword` wins over `keyword.operator.regexp`.

use rustc_hash::FxHashMap;
use syntect::highlighting::{Color, Theme};

/// Variable for colors the theme does not define.
pub const UNKNOWN_VAR: &str = "--code-unknown";

/// Variable for the theme's default foreground.
pub const FOREGROUND_VAR: &str = "--code-foreground";

/// Variable for the theme's background (CSS export only).
pub const BACKGROUND_VAR: &str = "--code-background";

/// Scope families that name a shared color, most preferred first.
pub const PREFERRED_SCOPES: &[&str] = &[
    "comment",
    "string",
    "keyword",
    "storage",
    "constant.numeric",
    "constant",
    "entity.name.function",
    "entity.name.type",
    "entity.name.tag",
    "entity.other.attribute-name",
    "support",
    "variable",
    "punctuation",
];

/// Lower is preferred: (family position, scope depth).
type Rank = (usize, usize);

/// Rank of the theme foreground, ahead of every scope.
const FOREGROUND_RANK: Rank = (0, 0);

/// Reverse map from theme colors to symbolic variable names.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    /// color key → best-ranked variable name
    by_color: FxHashMap<String, (Rank, String)>,
    /// variable name → color key, in theme order
    entries: Vec<(String, String)>,
}

impl Palette {
    /// Build the palette once from a theme definition.
    pub fn from_theme(theme: &Theme) -> Self {
        let mut palette = Self::default();

        if let Some(fg) = theme.settings.foreground {
            palette.insert(FOREGROUND_VAR.to_string(), color_key(fg), FOREGROUND_RANK);
        }

        for item in &theme.scopes {
            let Some(color) = item.style.foreground else {
                continue;
            };
            let key = color_key(color);
            for selector in &item.scope.selectors {
                if let Some(scope) = selector.path.as_slice().last() {
                    let scope = scope.build_string();
                    palette.insert(scope_var(&scope), key.clone(), scope_rank(&scope));
                }
            }
        }

        palette
    }

    fn insert(&mut self, name: String, key: String, rank: Rank) {
        if self.entries.iter().any(|(n, _)| *n == name) {
            return;
        }
        match self.by_color.get_mut(&key) {
            // Ties keep the earlier definition
            Some(best) if rank < best.0 => *best = (rank, name.clone()),
            Some(_) => {}
            None => {
                self.by_color.insert(key.clone(), (rank, name.clone()));
            }
        }
        self.entries.push((name, key));
    }

    /// Variable name for a highlighter color, [`UNKNOWN_VAR`] on a miss.
    pub fn var_for(&self, color: Color) -> &str {
        self.var_for_key(&color_key(color))
    }

    /// Variable name for a textual color such as `#D73A49`.
    pub fn var_for_key(&self, key: &str) -> &str {
        self.by_color
            .get(&key.to_ascii_lowercase())
            .map_or(UNKNOWN_VAR, |(_, name)| name.as_str())
    }

    /// Color of a variable in this palette.
    pub fn color_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_str())
    }

    /// `(variable, color)` pairs in theme order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render a CSS rule assigning this theme's colors to the variables named
/// by `names`. Variables the theme lacks fall back to its foreground.
pub fn theme_css(selector: &str, theme: &Theme, names: &Palette) -> String {
    let palette = Palette::from_theme(theme);
    let fallback = palette.color_of(FOREGROUND_VAR).unwrap_or("inherit");

    let mut css = format!("{selector} {{\n");
    if let Some(bg) = theme.settings.background {
        css.push_str(&format!("  {BACKGROUND_VAR}: {};\n", color_key(bg)));
    }
    for (name, _) in names.entries() {
        let color = palette.color_of(name).unwrap_or(fallback);
        css.push_str(&format!("  {name}: {color};\n"));
    }
    css.push_str(&format!("  {UNKNOWN_VAR}: {fallback};\n"));
    css.push_str("}\n");
    css
}

/// Normalized textual key of a color.
pub fn color_key(c: Color) -> String {
    if c.a == 0xff {
        format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a)
    }
}

fn scope_rank(scope: &str) -> Rank {
    let family = PREFERRED_SCOPES
        .iter()
        .position(|p| {
            scope
                .strip_prefix(p)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
        .map_or(PREFERRED_SCOPES.len() + 1, |i| i + 1);
    (family, scope.matches('.').count())
}

/// `keyword.control.ts` → `--code-keyword-control-ts`
fn scope_var(scope: &str) -> String {
    let name: String = scope
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("--code-{}", name.trim_matches('-'))
}
