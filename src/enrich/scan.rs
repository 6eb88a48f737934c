//! Locating directives in text.
//!
//! Matches are found left to right without overlapping, and scanning resumes after each match.

use crate::error::EnrichError;
use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence<'t> {
    pub range: Range<usize>,
    /// The whole match, e.g. `@Check[reflex]{Reflex}`.
    pub text: &'t str,
    pub name: &'t str,
    pub payload: &'t str,
    pub display: Option<&'t str>,
}

impl<'t> Occurrence<'t> {
    fn from_captures(caps: Captures<'t>) -> Option<Self> {
        let whole = caps.get(0)?;
        Some(Self {
            range: whole.range(),
            text: whole.as_str(),
            name: caps.get(1)?.as_str(),
            payload: caps.get(2)?.as_str(),
            display: caps.get(3).map(|m| m.as_str()),
        })
    }
}

macro_rules! pattern {
    ($name:ident, $re:literal) => {
        fn $name() -> &'static Regex {
            static PATTERN: OnceLock<Regex> = OnceLock::new();
            PATTERN.get_or_init(|| Regex::new($re).expect(concat!("invalid pattern ", $re)))
        }
    };
}

pattern!(block_pattern, r"@(\w+)\[([^\]]+)\](?:\{([^}]+)\})?");
pattern!(inline_pattern, r"\[\[/(\w+) ([^\]]+)\]\](?:\{([^}]+)\})?");
pattern!(damage_opener, r"@Damage\[");
pattern!(display_pattern, r"\A\{([^}]+)\}");

fn occurrences<'t>(pattern: &Regex, text: &'t str) -> Vec<Occurrence<'t>> {
    pattern
        .captures_iter(text)
        .filter_map(Occurrence::from_captures)
        .collect()
}

/// End of the payload opened just before `from`, counting nested brackets.
fn closing_bracket(text: &str, from: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.as_bytes()[from..].iter().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' if depth == 0 => return Some(from + i),
            b']' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// `@Damage[payload]`, where the payload may hold balanced brackets of its own.
pub fn damage_blocks(text: &str) -> Vec<Occurrence> {
    let mut ret = Vec::new();
    let mut pos = 0;
    while let Some(opener) = damage_opener().find_at(text, pos) {
        let payload_end = match closing_bracket(text, opener.end()) {
            Some(end) => end,
            None => {
                pos = opener.end();
                continue;
            }
        };
        let mut end = payload_end + 1;
        let display = display_pattern().captures(&text[end..]).and_then(|caps| {
            end += caps.get(0)?.len();
            Some(caps.get(1)?.as_str())
        });
        ret.push(Occurrence {
            range: opener.start()..end,
            text: &text[opener.start()..end],
            name: "Damage",
            payload: &text[opener.end()..payload_end],
            display,
        });
        pos = end;
    }
    ret
}

/// `@Name[payload]`, where the payload runs to the first `]`.
pub fn blocks(text: &str) -> Vec<Occurrence> {
    occurrences(block_pattern(), text)
}

/// `[[/name payload]]`, with exactly one space after the name.
pub fn inline_rolls(text: &str) -> Vec<Occurrence> {
    occurrences(inline_pattern(), text)
}

/// Rebuilds `text` with every occurrence replaced by the result of `f`.
pub fn replace<'t>(
    text: &'t str,
    occurrences: Vec<Occurrence<'t>>,
    mut f: impl FnMut(&Occurrence<'t>) -> Result<String, EnrichError>,
) -> Result<String, EnrichError> {
    let mut ret = String::with_capacity(text.len());
    let mut last = 0;
    for occurrence in &occurrences {
        ret.push_str(&text[last..occurrence.range.start]);
        ret.push_str(&f(occurrence)?);
        last = occurrence.range.end;
    }
    ret.push_str(&text[last..]);
    Ok(ret)
}
