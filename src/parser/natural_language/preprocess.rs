//! Text normalization ahead of extraction
//!
//! Multi-line input is normalized one line at a time so that phrasing on one
//! line never bleeds into matches on another. The rewrites are lossy,
//! best-effort heuristics: anything they do not recognize passes through.

use crate::parser::utils::sanitize_user_input;
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());

static TIME_ABBREVIATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*([ap])(?:\.\s?m\.|\.\s?m\b|m\b)").unwrap()
});

static WILL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:(?:we|i)\s+will\s+)+").unwrap());

static NARRATIVE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^on\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday),?\s+the\s+(?:\w+\s+){0,3}?\w+\s+will\s+(?:attend|visit|host|join|have|go\s+to|participate\s+in)\s+(?:the\s+|a\s+|an\s+|our\s+)?(.+?)[.!]?$",
    )
    .unwrap()
});

/// A single textual rewrite applied at most once per line.
struct Rewrite {
    name: &'static str,
    pattern: &'static Lazy<Regex>,
    rewrite: fn(&Captures<'_>) -> String,
}

fn strip_will_prefix(_caps: &Captures<'_>) -> String {
    String::new()
}

fn event_on_weekday(caps: &Captures<'_>) -> String {
    format!("{} on {}", caps[2].trim(), &caps[1])
}

static REWRITES: [Rewrite; 2] = [
    Rewrite { name: "will-prefix", pattern: &WILL_PREFIX, rewrite: strip_will_prefix },
    Rewrite { name: "narrative-prefix", pattern: &NARRATIVE_PREFIX, rewrite: event_on_weekday },
];

/// Normalize raw input text. Deterministic, total and idempotent.
pub fn normalize(text: &str) -> String {
    sanitize_user_input(text)
        .split('\n')
        .map(normalize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_line(line: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(line.trim(), " ");
    let mut out = normalize_time_abbreviations(&collapsed);

    for rule in &REWRITES {
        if rule.pattern.is_match(&out) {
            let rewritten = rule.pattern.replace(&out, rule.rewrite).trim().to_string();
            debug!("Rewrite '{}': '{}' -> '{}'", rule.name, out, rewritten);
            out = rewritten;
        }
    }

    out
}

/// Rewrite `9am`, `9a.m.`, `9:30p.m`, `9 PM` as `9:00 AM`, `9:30 PM`.
pub fn normalize_time_abbreviations(line: &str) -> String {
    TIME_ABBREVIATION
        .replace_all(line, |caps: &Captures<'_>| {
            let hour = caps[1].parse::<u32>().unwrap_or(0);
            let minute = caps.get(2).map_or(Some(0), |m| m.as_str().parse::<u32>().ok());
            match minute {
                Some(minute) if (1..=12).contains(&hour) && minute < 60 => {
                    let meridiem = if caps[3].eq_ignore_ascii_case("a") { "AM" } else { "PM" };
                    format!("{}:{:02} {}", hour, minute, meridiem)
                }
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}
