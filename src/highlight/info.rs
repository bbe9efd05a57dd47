//! Fenced code block info string: `<lang>{<line-spec>}:<filename>`.
//!
//! Both `{...}` and `:filename` are optional and may appear in either
//! order after the language.
//!
//! | Info string            | lang  | lines       | filename  |
//! |------------------------|-------|-------------|-----------|
//! | `ts`                   | `ts`  | -           | -         |
//! | `ts{2,4-6}`            | `ts`  | 2, 4, 5, 6  | -         |
//! | `ts:app.ts{1-3}`       | `ts`  | 1, 2, 3     | `app.ts`  |
//! | `rust{3}:src/main.rs`  | `rust`| 3           | `src/main.rs` |

use std::ops::RangeInclusive;

/// Parsed info string of a fenced code block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeInfo {
    pub lang: String,
    pub lines: LineSet,
    pub filename: Option<String>,
}

impl CodeInfo {
    pub fn parse(info: &str) -> Self {
        let info = info.trim();
        let lang_end = info.find(['{', ':']).unwrap_or(info.len());
        let lang = info[..lang_end].trim().to_string();
        let mut rest = &info[lang_end..];

        let mut lines = LineSet::default();
        let mut filename = None;

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('{') {
                let end = after.find('}').unwrap_or(after.len());
                lines = LineSet::parse(&after[..end]);
                rest = after.get(end + 1..).unwrap_or("");
            } else if let Some(after) = rest.strip_prefix(':') {
                let end = after.find('{').unwrap_or(after.len());
                let name = after[..end].trim();
                if !name.is_empty() {
                    filename = Some(name.to_string());
                }
                rest = &after[end..];
            } else {
                break;
            }
        }

        Self {
            lang,
            lines,
            filename,
        }
    }
}

/// Set of 1-based line numbers selected for emphasis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSet {
    ranges: Vec<RangeInclusive<usize>>,
}

impl LineSet {
    /// Parse `n`, `n-m` and comma-separated lists of both.
    ///
    /// Malformed parts are skipped.
    pub fn parse(spec: &str) -> Self {
        let ranges = spec
            .split(',')
            .filter_map(|part| {
                let part = part.trim();
                match part.split_once('-') {
                    Some((a, b)) => {
                        let (a, b) = (a.trim().parse().ok()?, b.trim().parse().ok()?);
                        (a <= b).then_some(a..=b)
                    }
                    None => part.parse().ok().map(|n| n..=n),
                }
            })
            .collect();
        Self { ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, line: usize) -> bool {
        self.ranges.iter().any(|r| r.contains(&line))
    }
}
