//! Text normalization for dictionary keys and candidates

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading question number: a single letter, or a token containing digits,
/// then one of `.` `:` `)` and whitespace (`1. `, `a) `, `Q12b: `)
static NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[a-zA-Z]|\S*\d+[.a-z]*)[.:)]\s+").expect("Invalid number prefix regex")
});

fn collapse(mut text: String, pattern: &str, with: &str) -> String {
    while text.contains(pattern) {
        text = text.replace(pattern, with);
    }
    text
}

/// Normalize whitespace
///
/// Trims the ends, converts line endings to `\n`, drops spaces next to
/// newlines and collapses runs of spaces.
pub fn clean_string(text: &str) -> String {
    let text = text.trim().replace("\r\n", "\n").replace('\r', "\n");
    let text = collapse(text, " \n", "\n");
    let text = collapse(text, "\n ", "\n");
    collapse(text, "  ", " ")
}

/// Split a leading question number off `text`
///
/// Returns `(prefix, rest)` with `prefix + rest == text`. Text of a single
/// word is never split, so a lone `1.` stays intact.
pub fn split_numbered_text(text: &str) -> (&str, &str) {
    if text.split_whitespace().nth(1).is_none() {
        return ("", text);
    }
    match NUMBER_PREFIX.find(text) {
        Some(m) => text.split_at(m.end()),
        None => ("", text),
    }
}

/// Dictionary form of a cell's text
pub fn translation_key(text: &str, strip_numbering: bool) -> String {
    let cleaned = clean_string(text);
    if strip_numbering {
        split_numbered_text(&cleaned).1.to_string()
    } else {
        cleaned
    }
}
