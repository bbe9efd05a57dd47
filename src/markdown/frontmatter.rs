//! Front-matter splitting.
//!
//! ```text
//! ---
//! title: "Signals in depth"
//! tags: angular, signals
//! translations: [nl, es]
//! series:
//! ---
//! body...
//! ```
//!
//! Values are line oriented `key: value`. Lists are written `[a, b]` or as
//! indented `- item` lines under an empty key. A bare `a, b` stays a string;
//! the consumer decides whether a key is a list.

use serde_json::{Map, Value};

/// Parsed front-matter: key → scalar, list or null.
pub type Frontmatter = Map<String, Value>;

/// Split `content` into front-matter and body.
///
/// Returns `None` if the content does not start with a `---` block.
pub fn split(content: &str) -> Option<(Frontmatter, &str)> {
    let (block, body) = detect(content)?;
    Some((parse(block), body))
}

/// Locate the `---` ... `---` block. Returns `(block, body)`.
fn detect(content: &str) -> Option<(&str, &str)> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    let rest = trimmed.strip_prefix("---")?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest).strip_prefix('\n')?;

    // Closing fence may directly follow the opening one
    if let Some(body) = rest.strip_prefix("---") {
        return Some(("", body.trim_start_matches(['\r', '\n'])));
    }

    let end = rest.find("\n---")?;
    let block = &rest[..end];
    let after = &rest[end + "\n---".len()..];
    let body = after.split_once('\n').map_or("", |(_, body)| body);
    Some((block, body.trim_start_matches(['\r', '\n'])))
}

fn parse(block: &str) -> Frontmatter {
    let mut map = Frontmatter::new();
    let mut list_key: Option<String> = None;

    for line in block.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(item) = trimmed.strip_prefix("- ").or_else(|| (trimmed == "-").then_some(""))
            && let Some(key) = &list_key
        {
            if let Some(Value::Array(items)) = map.get_mut(key) {
                items.push(Value::String(unquote(item.trim()).to_string()));
            }
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim().to_string();
        let value = value.trim();

        if value.is_empty() {
            // Either a null or the head of a `- item` list
            map.insert(key.clone(), Value::Array(Vec::new()));
            list_key = Some(key);
        } else {
            map.insert(key, parse_value(value));
            list_key = None;
        }
    }

    // Empty keys without items are nulls
    for value in map.values_mut() {
        if matches!(value, Value::Array(items) if items.is_empty()) {
            *value = Value::Null;
        }
    }
    map
}

/// Parse a YAML-like scalar or inline list.
fn parse_value(s: &str) -> Value {
    if let Some(inner) = s.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return Value::Array(
            inner
                .split(',')
                .map(|item| unquote(item.trim()))
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        );
    }

    if is_quoted(s) {
        return Value::String(unquote(s).to_string());
    }

    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if s.eq_ignore_ascii_case("null") || s == "~" {
        return Value::Null;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }

    Value::String(s.to_string())
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
}

fn unquote(s: &str) -> &str {
    if is_quoted(s) { &s[1..s.len() - 1] } else { s }
}
