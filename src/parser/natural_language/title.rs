//! Title extraction
//!
//! Derives a short label from the structure around the event: quoted
//! spans, structured fields, party or appointment phrasing, or the words that
//! lead up to the first temporal keyword. Always produces something.

use crate::parser::utils::{
    bounded_phrase, first_match, is_time_token, is_weekday, sentence_end, trim_fragment,
    PatternRule, BOUNDARY_WORDS,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Title used when the input has no visible text at all.
pub const DEFAULT_TITLE: &str = "Event";

const MAX_TITLE_CHARS: usize = 100;
const MAX_LEAD_WORDS: usize = 12;

/// How the title was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    Quoted,
    Structured,
    Party,
    Appointment,
    Lead,
    Fallback,
}

impl TitleSource {
    pub fn as_str(self) -> &'static str {
        match self {
            TitleSource::Quoted => "quoted",
            TitleSource::Structured => "structured",
            TitleSource::Party => "party",
            TitleSource::Appointment => "appointment",
            TitleSource::Lead => "lead",
            TitleSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMatch {
    pub text: String,
    pub source: TitleSource,
}

static DOUBLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"\n]{2,100})""#).unwrap());
static CURLY_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"“([^”\n]{2,100})”").unwrap());
// The surrounding non-word characters keep contractions (don't, it's) out.
static SINGLE_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\w])'([^'\n]{2,100})'(?:[^\w]|$)").unwrap());
static BACKTICKED: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]{2,100})`").unwrap());
static FIELD_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:due\s+date|deadline|date|time|location|when|where|at)\s*:").unwrap()
});
static PARTY_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:party|celebration|birthday|anniversary|wedding)\b").unwrap()
});
static APPOINTMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:appointment|appt)\.?\s+(with|for|at)\s+").unwrap());
static LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(.+)$").unwrap());
static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d{4}-\d{1,2}-\d{1,2}(?:T[\d:]+)?|\d{1,2}/\d{1,2}(?:/\d{2,4})?)$").unwrap()
});

/// Words that end the lead-in to an event name.
const LEAD_STOPS: &[&str] = &["at", "on", "in", "@", "tomorrow", "today", "tonight", "next", "this"];

/// Filler left dangling before a temporal keyword ("Review is on ...").
const TRAILING_FILLER: &[&str] =
    &["is", "are", "will", "be", "was", "starts", "begins", "scheduled", "set", "due", "from"];

/// Words that never open a party title ("Join us for ...", "invited to a ...").
const PARTY_LEAD_STOPS: &[&str] = &[
    "for", "to", "join", "us", "attend", "invite", "invited", "celebrate", "celebrating", "a",
    "an", "the", "our", "your", "my", "at", "on", "in", "with", "and", "please", "you", "you're",
    "are", "we", "i", "will", "come", "is", "be", "have", "having", "host", "hosting", "throwing",
];

fn quoted(caps: &Captures<'_>, _: &str, _: &()) -> Option<TitleMatch> {
    let text = trim_fragment(&caps[1]);
    if text.chars().count() < 2 || !text.chars().any(char::is_alphabetic) {
        return None;
    }
    Some(TitleMatch { text, source: TitleSource::Quoted })
}

fn structured(caps: &Captures<'_>, haystack: &str, _: &()) -> Option<TitleMatch> {
    let preceding = &haystack[..caps.get(0)?.start()];
    let line = preceding.lines().rev().map(str::trim).find(|l| !l.is_empty())?;
    let text = trim_fragment(line);
    // A colon means this is not the first label in the text.
    if text.is_empty() || text.contains(':') || text.chars().count() > MAX_TITLE_CHARS {
        return None;
    }
    Some(TitleMatch { text, source: TitleSource::Structured })
}

fn party(caps: &Captures<'_>, haystack: &str, _: &()) -> Option<TitleMatch> {
    let keyword = caps.get(0)?;
    // Part of a hyphenated compound ("third-party", "party-goers").
    if haystack[..keyword.start()].ends_with('-') || haystack[keyword.end()..].starts_with('-') {
        return None;
    }
    let line_start = haystack[..keyword.start()].rfind('\n').map_or(0, |i| i + 1);
    let line_end = haystack[keyword.end()..]
        .find('\n')
        .map_or(haystack.len(), |i| keyword.end() + i);

    let mut lead: Vec<&str> = Vec::new();
    for word in haystack[line_start..keyword.start()].split_whitespace().rev() {
        let lower = word.to_lowercase();
        let closes_sentence = sentence_end(word) < word.len() || word.ends_with(':');
        if lead.len() >= 4
            || closes_sentence
            || PARTY_LEAD_STOPS.contains(&lower.as_str())
            || is_time_token(word)
            || is_weekday(word)
        {
            break;
        }
        lead.push(word);
    }
    lead.reverse();

    let tail = bounded_phrase(&haystack[keyword.end()..line_end], BOUNDARY_WORDS, 3);

    let mut parts = lead;
    parts.push(keyword.as_str());
    if !tail.is_empty() {
        parts.push(&tail);
    }
    let text = trim_fragment(&parts.join(" "));
    Some(TitleMatch { text, source: TitleSource::Party })
}

fn appointment(caps: &Captures<'_>, haystack: &str, _: &()) -> Option<TitleMatch> {
    let preposition = caps[1].to_lowercase();
    let rest = &haystack[caps.get(0)?.end()..];
    let who = trim_fragment(&bounded_phrase(rest, BOUNDARY_WORDS, 6));
    if who.is_empty() {
        return None;
    }
    Some(TitleMatch {
        text: format!("Appointment {} {}", preposition, who),
        source: TitleSource::Appointment,
    })
}

/// `2-3:00`, `10-11:30am`: a clock range written without spaces.
fn is_time_range(word: &str) -> bool {
    word.split_once('-').is_some_and(|(from, to)| {
        !from.is_empty() && from.chars().all(|c| c.is_ascii_digit() || c == ':') && is_time_token(to)
    })
}

fn lead(caps: &Captures<'_>, _: &str, _: &()) -> Option<TitleMatch> {
    let line = caps.get(1)?.as_str();
    let mut words: Vec<&str> = Vec::new();
    // Words of the last completed sentence, for "Team lunch. Tomorrow at noon."
    let mut previous: Vec<&str> = Vec::new();
    let mut stopped = false;

    for raw in line.split_whitespace() {
        let bare = raw.trim_end_matches(|c: char| matches!(c, ',' | '.' | '!' | '?' | ';'));
        if LEAD_STOPS.contains(&raw.to_lowercase().as_str())
            || is_time_token(raw)
            || is_time_range(bare)
            || is_weekday(bare)
            || NUMERIC_DATE.is_match(bare)
        {
            stopped = true;
            break;
        }
        if raw.ends_with(':') {
            words.clear();
            previous.clear();
            continue;
        }
        words.push(raw);
        if sentence_end(raw) < raw.len() {
            previous = std::mem::take(&mut words);
        }
    }
    if words.is_empty() {
        words = previous;
    }

    while let Some(last) = words.last() {
        if TRAILING_FILLER.contains(&last.to_lowercase().as_str()) {
            words.pop();
        } else {
            break;
        }
    }

    if !stopped || words.is_empty() || words.len() > MAX_LEAD_WORDS {
        return None;
    }
    let text = trim_fragment(&words.join(" "));
    if text.is_empty() {
        return None;
    }
    Some(TitleMatch { text, source: TitleSource::Lead })
}

static TITLE_RULES: [PatternRule<(), TitleMatch>; 8] = [
    PatternRule { name: "double-quoted", pattern: &DOUBLE_QUOTED, extract: quoted },
    PatternRule { name: "curly-quoted", pattern: &CURLY_QUOTED, extract: quoted },
    PatternRule { name: "single-quoted", pattern: &SINGLE_QUOTED, extract: quoted },
    PatternRule { name: "backticked", pattern: &BACKTICKED, extract: quoted },
    PatternRule { name: "structured", pattern: &FIELD_LABEL, extract: structured },
    PatternRule { name: "party", pattern: &PARTY_KEYWORD, extract: party },
    PatternRule { name: "appointment", pattern: &APPOINTMENT, extract: appointment },
    PatternRule { name: "lead", pattern: &LINE, extract: lead },
];

/// Whitespace-collapsed prefix of the input, at most `max_chars` characters.
pub fn fallback_title(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(max_chars).collect();
    match truncated.trim() {
        "" => DEFAULT_TITLE.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Derive a title for `text`; falls back to its first `fallback_chars`
/// characters when nothing structural is found.
pub fn extract_title(text: &str, fallback_chars: usize) -> TitleMatch {
    first_match(&TITLE_RULES, text, &()).unwrap_or_else(|| TitleMatch {
        text: fallback_title(text, fallback_chars),
        source: TitleSource::Fallback,
    })
}
