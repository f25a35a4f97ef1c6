//! The candidate event produced by one extraction call, and its wire form.

use crate::parser::natural_language::location::LocationSource;
use crate::parser::natural_language::time_extractor::{DateSource, TimeSource};
use crate::parser::natural_language::title::TitleSource;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Start or end of a candidate event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// Wall-clock time in the requested zone, carrying its UTC offset.
    Timed(DateTime<FixedOffset>),
    /// A calendar date with no time of day.
    AllDay(NaiveDate),
}

impl EventTime {
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::Timed(dt) => dt.date_naive(),
            EventTime::AllDay(date) => *date,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            EventTime::Timed(dt) => Some(*dt),
            EventTime::AllDay(_) => None,
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Timed(dt) => write!(f, "{}", dt.to_rfc3339()),
            EventTime::AllDay(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Which strategy each extractor used. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionPath {
    pub title: TitleSource,
    pub date: Option<DateSource>,
    pub time: Option<TimeSource>,
    pub location: Option<LocationSource>,
}

impl fmt::Display for ExtractionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "heuristic/title:{}/date:{}/time:{}/location:{}",
            self.title.as_str(),
            self.date.map_or("none", DateSource::as_str),
            self.time.map_or("none", TimeSource::as_str),
            self.location.map_or("none", LocationSource::as_str),
        )
    }
}

/// Structured output of one extraction call.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEvent {
    pub title: String,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub location: Option<String>,
    pub all_day: bool,
    /// The caller's input, verbatim.
    pub description: String,
    pub confidence: f64,
    pub extraction_path: ExtractionPath,
}

/// JSON shape returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub title: String,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    pub location: Option<String>,
    pub description: String,
    pub all_day: bool,
    pub confidence_score: f64,
    pub parsing_path: String,
}

impl From<&CandidateEvent> for EventResponse {
    fn from(event: &CandidateEvent) -> Self {
        Self {
            title: event.title.clone(),
            start_datetime: event.start.map(|t| t.to_string()),
            end_datetime: event.end.map(|t| t.to_string()),
            location: event.location.clone(),
            description: event.description.clone(),
            all_day: event.all_day,
            confidence_score: event.confidence,
            parsing_path: event.extraction_path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_event_time_display() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let timed = EventTime::Timed(offset.with_ymd_and_hms(2024, 1, 2, 14, 0, 0).unwrap());
        assert_eq!(timed.to_string(), "2024-01-02T14:00:00-05:00");

        let all_day = EventTime::AllDay(NaiveDate::from_ymd_opt(2025, 10, 15).unwrap());
        assert_eq!(all_day.to_string(), "2025-10-15");
        assert_eq!(all_day.as_datetime(), None);
    }

    #[test]
    fn test_response_from_candidate() {
        let event = CandidateEvent {
            title: "Project deadline".to_string(),
            start: Some(EventTime::AllDay(NaiveDate::from_ymd_opt(2025, 10, 15).unwrap())),
            end: None,
            location: None,
            all_day: true,
            description: "Project deadline\nDue Date: Oct 15, 2025".to_string(),
            confidence: 0.75,
            extraction_path: ExtractionPath {
                title: TitleSource::Structured,
                date: Some(DateSource::DueLabel),
                time: None,
                location: None,
            },
        };

        let response = EventResponse::from(&event);
        assert_eq!(response.start_datetime.as_deref(), Some("2025-10-15"));
        assert_eq!(response.end_datetime, None);
        assert_eq!(
            response.parsing_path,
            "heuristic/title:structured/date:due-label/time:none/location:none"
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["confidence_score"], 0.75);
        assert_eq!(json["all_day"], true);
    }
}
