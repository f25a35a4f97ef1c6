//! Location extraction
//!
//! Evaluated from the most precise pattern to the loosest so that a labeled
//! field or street address is never shadowed by a prepositional guess.

use crate::parser::utils::{
    bounded_phrase, first_match, is_month_name, is_weekday, sentence_end, strip_article,
    trim_fragment, PatternRule, BOUNDARY_WORDS,
};
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// How the location was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Coordinates,
    Labeled,
    Address,
    Prepositional,
}

impl LocationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationSource::Coordinates => "coordinates",
            LocationSource::Labeled => "labeled",
            LocationSource::Address => "address",
            LocationSource::Prepositional => "prepositional",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationMatch {
    pub text: String,
    pub source: LocationSource,
}

static COORDINATES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(coordinates\s*:\s*)?(-?\d{1,3}\.(\d+))\s*,\s*(-?\d{1,3}\.(\d+))").unwrap()
});
static LOCATION_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:location|where|venue|address)\s*:[ \t]*([^\n]+)").unwrap()
});
static NEXT_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s(?:date|time|when|where|location|venue|address|due|deadline)\s*:").unwrap()
});
static STREET_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:^|[^:\d.])(\d{1,6}\s+(?:[A-Z0-9][A-Za-z0-9'.-]*\s+){1,4}?(?i:street|st|avenue|ave|road|rd|drive|dr|lane|ln|boulevard|blvd|way|court|ct|parkway|pkwy|highway|hwy|place|pl|terrace|circle)\b\.?(?:,\s*[A-Z][A-Za-z]*(?:\s+[A-Z][A-Za-z]*){0,2})?(?:,\s*[A-Z]{2})?(?:\s+\d{5}(?:-\d{4})?)?)",
    )
    .unwrap()
});
// The whitespace after the keyword is left unconsumed so that adjacent
// prepositions ("check in at") each get a match.
static PREPOSITION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?:^|\s)(at|in|@)").unwrap());

/// Fractional digits an unlabeled pair needs before it reads as coordinates
/// rather than prices or scores.
const MIN_UNLABELED_PRECISION: usize = 3;

/// First words that make a prepositional phrase temporal or idiomatic.
const NOT_A_PLACE: &[&str] = &[
    "a", "an", "least", "all", "once", "first", "last", "most", "it", "that", "which", "what",
    "any", "some", "around", "about", "approximately", "half", "morning", "afternoon", "evening",
    "night", "dawn", "dusk", "noon", "midnight", "week", "weeks", "weekend", "month", "months",
    "year", "years", "day", "days", "hour", "hours", "minute", "minutes", "time",
];

/// Idioms that only follow `in`.
const NOT_A_PLACE_AFTER_IN: &[&str] = &[
    "person", "advance", "case", "order", "progress", "total", "general", "mind", "touch",
    "charge", "time",
];

fn coordinates(caps: &Captures<'_>, _: &str, _: &()) -> Option<LocationMatch> {
    let precise = [3, 5].iter().all(|&idx| caps[idx].len() >= MIN_UNLABELED_PRECISION);
    if caps.get(1).is_none() && !precise {
        return None;
    }
    let lat = caps[2].parse::<f64>().ok()?;
    let lng = caps[4].parse::<f64>().ok()?;
    if lat.abs() > 90.0 || lng.abs() > 180.0 {
        return None;
    }
    Some(LocationMatch {
        text: format!("{}, {}", &caps[2], &caps[4]),
        source: LocationSource::Coordinates,
    })
}

fn labeled(caps: &Captures<'_>, _: &str, _: &()) -> Option<LocationMatch> {
    let raw = &caps[1];
    let mut value = &raw[..sentence_end(raw)];
    if let Some(next) = NEXT_LABEL.find(value) {
        value = &value[..next.start()];
    }
    let text = trim_fragment(strip_article(value.trim()));
    if text.is_empty() {
        return None;
    }
    Some(LocationMatch { text, source: LocationSource::Labeled })
}

fn street_address(caps: &Captures<'_>, _: &str, _: &()) -> Option<LocationMatch> {
    let text = trim_fragment(&caps[1]);
    Some(LocationMatch { text, source: LocationSource::Address })
}

fn prepositional(caps: &Captures<'_>, haystack: &str, _: &()) -> Option<LocationMatch> {
    let preposition = caps[1].to_lowercase();
    let rest = &haystack[caps.get(0)?.end()..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let phrase = bounded_phrase(rest, BOUNDARY_WORDS, 6);
    let phrase = strip_article(&phrase);

    let first = phrase.split_whitespace().next()?;
    let first_lower = first.to_lowercase();
    let temporal = first.starts_with(|c: char| c.is_ascii_digit())
        || NOT_A_PLACE.contains(&first_lower.as_str())
        || is_month_name(first)
        || is_weekday(first);
    if temporal || (preposition == "in" && NOT_A_PLACE_AFTER_IN.contains(&first_lower.as_str())) {
        debug!("Skipping '{} {}': not a place", preposition, phrase);
        return None;
    }

    let text = trim_fragment(phrase);
    if text.is_empty() {
        return None;
    }
    Some(LocationMatch { text, source: LocationSource::Prepositional })
}

static LOCATION_RULES: [PatternRule<(), LocationMatch>; 4] = [
    PatternRule { name: "coordinates", pattern: &COORDINATES, extract: coordinates },
    PatternRule { name: "labeled", pattern: &LOCATION_LABEL, extract: labeled },
    PatternRule { name: "street-address", pattern: &STREET_ADDRESS, extract: street_address },
    PatternRule { name: "prepositional", pattern: &PREPOSITION, extract: prepositional },
];

/// Find at most one place reference in `text`.
pub fn extract_location(text: &str) -> Option<LocationMatch> {
    first_match(&LOCATION_RULES, text, &())
}
