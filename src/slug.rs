//! Anchor and identifier slugs.
//!
//! [`slugify`] turns heading text (possibly carrying escaped inline code or
//! HTML entities) into a lowercase, URL-safe fragment. It is a pure function:
//! hand-written links in other posts point at these fragments, so the same
//! text must always produce the same slug.
//!
//! Output alphabet is `[a-z0-9_-]`, without leading, trailing or doubled
//! hyphens, which makes `slugify` a fixed point on its own output.
//! No uniqueness is enforced; callers deal with collisions.

use crate::utils::html::unescape;

/// Derive an anchor slug from arbitrary text.
///
/// Returns an empty string when nothing survives stripping; callers treat
/// that as "no anchor".
///
/// # Example
/// ```ignore
/// assert_eq!(slugify("Crème brûlée & <code>Rust</code>"), "creme-brulee-and-rust");
/// ```
pub fn slugify(text: &str) -> String {
    let text = unescape(text);
    let text = text.replace("<code>", "`").replace("</code>", "`");
    let text = text.to_lowercase();

    let mut out = String::with_capacity(text.len());
    let mut in_space = false;

    for c in text.chars() {
        if c == ',' || c == '.' {
            continue;
        }
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
                in_space = true;
            }
            continue;
        }
        in_space = false;

        if let Some(ascii) = fold_diacritic(c) {
            out.push_str(ascii);
        } else if c == '&' {
            out.push_str("-and-");
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
        }
    }

    collapse_hyphens(&out)
}

/// Collapse hyphen runs and trim hyphens at both ends.
fn collapse_hyphens(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '-' && (out.is_empty() || out.ends_with('-')) {
            continue;
        }
        out.push(c);
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Map a lowercase Latin letter with diacritics to its ASCII base.
fn fold_diacritic(c: char) -> Option<&'static str> {
    let ascii = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(ascii)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
    }

    #[test]
    fn test_punctuation_stripped() {
        assert_eq!(slugify("Step 1. Install, then run!"), "step-1-install-then-run");
        assert_eq!(slugify("What's new?"), "whats-new");
    }

    #[test]
    fn test_ampersand() {
        assert_eq!(slugify("Tips & Tricks"), "tips-and-tricks");
        assert_eq!(slugify("Tips &amp; Tricks"), "tips-and-tricks");
        assert_eq!(slugify("R&D"), "r-and-d");
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(slugify("Using <code>useState</code> hooks"), "using-usestate-hooks");
        assert_eq!(slugify("The `map` operator"), "the-map-operator");
        assert_eq!(slugify("&lt;code&gt;inject&lt;/code&gt; function"), "inject-function");
    }

    #[test]
    fn test_diacritics() {
        assert_eq!(slugify("Crème Brûlée"), "creme-brulee");
        assert_eq!(slugify("Façade Niño Straße"), "facade-nino-strasse");
        assert_eq!(slugify("Łódź"), "lodz");
    }

    #[test]
    fn test_unknown_scripts_stripped() {
        assert_eq!(slugify("日本語"), "");
        assert_eq!(slugify("Rust 日本"), "rust");
    }

    #[test]
    fn test_hyphens_collapsed() {
        assert_eq!(slugify("a -- b --- c"), "a-b-c");
        assert_eq!(slugify("-edge-"), "edge");
    }

    #[test]
    fn test_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!! ???"), "");
    }

    #[test]
    fn test_fixed_point() {
        for input in [
            "Hello World",
            "Tips & Tricks",
            "Crème Brûlée, again.",
            "Using <code>inject()</code> in Angular 17",
            "snake_case and kebab-case",
            "__dunder__",
        ] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "not a fixed point for {input:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "Signals vs. Observables: a comparison";
        let first = slugify(text);
        for _ in 0..10 {
            assert_eq!(slugify(text), first);
        }
        assert_eq!(first, "signals-vs-observables-a-comparison");
    }
}
