//! Common utility functions shared across the extractors
//!
//! Every extractor is an ordered table of [`PatternRule`]s evaluated by
//! [`first_match`]. The word-level helpers below bound free-text captures
//! (places, names) at the next temporal or connective keyword.

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// One entry in an extractor's priority table.
///
/// `extract` receives the captures, the full haystack and the caller's
/// context; returning `None` lets the driver try the next capture of the same
/// pattern, then the next rule.
pub struct PatternRule<C, T> {
    pub name: &'static str,
    pub pattern: &'static Lazy<Regex>,
    pub extract: fn(&Captures<'_>, &str, &C) -> Option<T>,
}

/// Evaluate `rules` in order and return the first extracted value.
pub fn first_match<C, T>(rules: &[PatternRule<C, T>], text: &str, ctx: &C) -> Option<T> {
    for rule in rules {
        for caps in rule.pattern.captures_iter(text) {
            if let Some(value) = (rule.extract)(&caps, text, ctx) {
                debug!(
                    "Rule '{}' matched '{}'",
                    rule.name,
                    caps.get(0).map_or("", |m| m.as_str())
                );
                return Some(value);
            }
        }
    }
    None
}

/// Filter out control characters except for newlines and tabs
pub fn sanitize_user_input(input: &str) -> String {
    input
        .chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
        .collect::<String>()
}

pub const WEEKDAYS: [&str; 7] =
    ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Words that end a free-text span such as a place or a name.
pub const BOUNDARY_WORDS: &[&str] = &[
    "at", "on", "in", "@", "from", "by", "for", "to", "with", "about", "regarding", "until",
    "between", "today", "tomorrow", "tonight", "next", "this",
];

const ABBREVIATIONS: &[&str] =
    &["dr.", "mr.", "mrs.", "ms.", "st.", "ave.", "prof.", "jr.", "sr.", "mt."];

/// Resolve a month name or its three-letter prefix (`oct`, `sept`) to 1..=12.
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.trim_end_matches('.').to_lowercase();
    if lower.chars().count() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|month| month.starts_with(lower.as_str()))
        .map(|idx| idx as u32 + 1)
}

pub fn is_month_name(word: &str) -> bool {
    month_number(word).is_some()
}

pub fn is_weekday(word: &str) -> bool {
    WEEKDAYS.contains(&word.to_lowercase().as_str())
}

/// Clock-time tokens: `2:00`, `14:30`, `3pm`, `PM`, `noon`.
pub fn is_time_token(word: &str) -> bool {
    let lower = word
        .trim_matches(|c: char| !c.is_alphanumeric() && c != ':')
        .to_lowercase();
    if matches!(lower.as_str(), "am" | "pm" | "a.m" | "p.m" | "noon" | "midnight") {
        return true;
    }
    let digits = lower.trim_end_matches("am").trim_end_matches("pm");
    let has_digit = digits.chars().any(|c| c.is_ascii_digit());
    let all_clock = digits.chars().all(|c| c.is_ascii_digit() || c == ':');
    has_digit && all_clock && (digits.contains(':') || digits.len() < lower.len())
}

/// Trim whitespace and punctuation that never belongs at the edges of a
/// title or place.
pub fn trim_fragment(s: &str) -> String {
    s.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '|' | '!' | '?'))
        .trim_end_matches('.')
        .trim()
        .to_string()
}

/// Byte offset of the first sentence terminator in `s`, or `s.len()`.
///
/// A terminator is `.`, `!`, `?` or `;` followed by whitespace or the end of
/// the text; the dot of an abbreviation such as `Dr.` does not count.
pub fn sentence_end(s: &str) -> usize {
    for (idx, c) in s.char_indices() {
        if !matches!(c, '.' | '!' | '?' | ';') {
            continue;
        }
        let after = &s[idx + c.len_utf8()..];
        if !(after.is_empty() || after.starts_with(char::is_whitespace)) {
            continue;
        }
        if c == '.' {
            let word = s[..=idx].split_whitespace().last().unwrap_or("").to_lowercase();
            if ABBREVIATIONS.contains(&word.as_str()) {
                continue;
            }
        }
        return idx;
    }
    s.len()
}

/// Drop a leading lowercase article (`the office` -> `office`). A capitalized
/// `The` belongs to a proper name and is kept.
pub fn strip_article(s: &str) -> &str {
    s.strip_prefix("the ").map_or(s, str::trim_start)
}

/// Collect words from the start of `rest` (first line only) until a
/// boundary: a word in `stops`, a clock time, a weekday, a label, a comma or
/// a sentence terminator. At most `max_words` words are kept.
pub fn bounded_phrase(rest: &str, stops: &[&str], max_words: usize) -> String {
    let line = rest.lines().next().unwrap_or("");
    let mut words: Vec<&str> = Vec::new();

    for raw in line.split_whitespace() {
        if words.len() >= max_words || raw.ends_with(':') {
            break;
        }
        let lower_raw = raw.to_lowercase();
        let abbreviation = ABBREVIATIONS.contains(&lower_raw.as_str());
        let word = if abbreviation {
            raw
        } else {
            raw.trim_end_matches(|c: char| matches!(c, ',' | ';' | '.' | '!' | '?' | ')'))
        };
        if !word.chars().any(char::is_alphanumeric) && word != "@" {
            break;
        }
        let lower = word.to_lowercase();
        if stops.contains(&lower.as_str()) || is_time_token(word) || is_weekday(word) {
            break;
        }
        words.push(word);
        if !abbreviation && word.len() < raw.len() {
            break;
        }
    }

    words.join(" ")
}
