//! Time extraction module for natural language parsing
//!
//! Finds one date expression and one clock time in the text and resolves them
//! against the caller's reference time and timezone. Dates and times are each
//! resolved by their own priority table; the first rule that matches wins.

use crate::event::EventTime;
use crate::parser::utils::{first_match, month_number, PatternRule, WEEKDAYS};
use crate::parser::ExtractionContext;
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    Offset, TimeZone,
};
use chrono_tz::Tz;
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn parse(marker: &str) -> Option<Self> {
        match marker.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('a') => Some(Meridiem::Am),
            Some('p') => Some(Meridiem::Pm),
            _ => None,
        }
    }
}

/// How the date was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    DueLabel,
    MonthName,
    Numeric,
    Relative,
    Weekday,
}

impl DateSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DateSource::DueLabel => "due-label",
            DateSource::MonthName => "month-name",
            DateSource::Numeric => "numeric",
            DateSource::Relative => "relative",
            DateSource::Weekday => "weekday",
        }
    }
}

/// How the clock time was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    Meridiem,
    BareMeridiem,
    TwentyFourHour,
    Named,
}

impl TimeSource {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeSource::Meridiem => "meridiem",
            TimeSource::BareMeridiem => "bare-meridiem",
            TimeSource::TwentyFourHour => "24-hour",
            TimeSource::Named => "named",
        }
    }
}

/// Resolved temporal range for a candidate event.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalMatch {
    pub start: EventTime,
    pub end: Option<EventTime>,
    pub all_day: bool,
    pub date_source: Option<DateSource>,
    pub time_source: Option<TimeSource>,
}

#[derive(Debug, Clone, Copy)]
struct DateMatch {
    date: NaiveDate,
    source: DateSource,
}

#[derive(Debug, Clone, Copy)]
struct TimeMatch {
    time: NaiveTime,
    source: TimeSource,
}

/// Inputs the date rules resolve against.
struct DateContext {
    today: NaiveDate,
    month_first: bool,
}

/// Convert 12-hour time to 24-hour format
pub fn convert_to_24_hour(hour: u32, minute: u32, meridiem: Meridiem) -> (u32, u32) {
    let hour_24 = match (hour, meridiem) {
        (12, Meridiem::Am) => 0,
        (h, Meridiem::Am) => h,
        (12, Meridiem::Pm) => 12,
        (h, Meridiem::Pm) => h + 12,
    };
    (hour_24, minute)
}

// ---------------------------------------------------------------------------
// Clock times
// ---------------------------------------------------------------------------

static MERIDIEM_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(1[0-2]|0?[1-9]):([0-5]\d)\s*([ap])\.?m\b").unwrap());
static BARE_MERIDIEM_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(1[0-2]|0?[1-9])\s*([ap])\.?m\b").unwrap());
static TWENTY_FOUR_HOUR_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\b|T)([01]?\d|2[0-3]):([0-5]\d)\b").unwrap());
static NAMED_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(noon|midday|midnight)\b").unwrap());

fn twelve_hour(hour: &str, minute: &str, marker: &str, source: TimeSource) -> Option<TimeMatch> {
    let hour = hour.parse::<u32>().ok()?;
    let minute = minute.parse::<u32>().ok()?;
    let (hour_24, minute) = convert_to_24_hour(hour, minute, Meridiem::parse(marker)?);
    let time = NaiveTime::from_hms_opt(hour_24, minute, 0)?;
    Some(TimeMatch { time, source })
}

fn meridiem_time(caps: &Captures<'_>, _: &str, _: &()) -> Option<TimeMatch> {
    twelve_hour(&caps[1], &caps[2], &caps[3], TimeSource::Meridiem)
}

fn bare_meridiem_time(caps: &Captures<'_>, _: &str, _: &()) -> Option<TimeMatch> {
    twelve_hour(&caps[1], "0", &caps[2], TimeSource::BareMeridiem)
}

fn twenty_four_hour_time(caps: &Captures<'_>, _: &str, _: &()) -> Option<TimeMatch> {
    let hour = caps[1].parse::<u32>().ok()?;
    let minute = caps[2].parse::<u32>().ok()?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(TimeMatch { time, source: TimeSource::TwentyFourHour })
}

fn named_time(caps: &Captures<'_>, _: &str, _: &()) -> Option<TimeMatch> {
    let hour = if caps[1].eq_ignore_ascii_case("midnight") { 0 } else { 12 };
    let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
    Some(TimeMatch { time, source: TimeSource::Named })
}

static TIME_RULES: [PatternRule<(), TimeMatch>; 4] = [
    PatternRule { name: "meridiem", pattern: &MERIDIEM_TIME, extract: meridiem_time },
    PatternRule { name: "bare-meridiem", pattern: &BARE_MERIDIEM_TIME, extract: bare_meridiem_time },
    PatternRule { name: "24-hour", pattern: &TWENTY_FOUR_HOUR_TIME, extract: twenty_four_hour_time },
    PatternRule { name: "named", pattern: &NAMED_TIME, extract: named_time },
];

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

static DUE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:due(?:\s+date)?|deadline)\s*:\s*([^\n]+)").unwrap());
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(\d{4})\b)?",
    )
    .unwrap()
});
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\b\.?(?:,?\s+(\d{4})\b)?",
    )
    .unwrap()
});
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})(?:\b|T)").unwrap());
static SLASHED_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").unwrap());
static RELATIVE_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(day\s+after\s+tomorrow|tomorrow|today|tonight|this\s+(?:morning|afternoon|evening)|next\s+week)\b",
    )
    .unwrap()
});
static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(next|this|coming)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
    )
    .unwrap()
});

/// Build a date, rolling a year-less date forward to its next occurrence.
fn calendar_date(year: Option<i32>, month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        None => {
            let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
            match this_year {
                Some(date) if date >= today => Some(date),
                _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
            }
        }
    }
}

fn parse_year(caps: &Captures<'_>, idx: usize) -> Option<Option<i32>> {
    match caps.get(idx) {
        None => Some(None),
        Some(m) => {
            let year = m.as_str().parse::<i32>().ok()?;
            Some(Some(if m.as_str().len() == 2 { 2000 + year } else { year }))
        }
    }
}

fn due_label(caps: &Captures<'_>, _: &str, ctx: &DateContext) -> Option<DateMatch> {
    let labeled = first_match(&DATE_RULES[1..], &caps[1], ctx)?;
    debug!("Due-date label resolved to {}", labeled.date);
    Some(DateMatch { date: labeled.date, source: DateSource::DueLabel })
}

fn month_day(caps: &Captures<'_>, _: &str, ctx: &DateContext) -> Option<DateMatch> {
    let month = month_number(&caps[1])?;
    let day = caps[2].parse::<u32>().ok()?;
    let date = calendar_date(parse_year(caps, 3)?, month, day, ctx.today)?;
    Some(DateMatch { date, source: DateSource::MonthName })
}

fn day_month(caps: &Captures<'_>, _: &str, ctx: &DateContext) -> Option<DateMatch> {
    let day = caps[1].parse::<u32>().ok()?;
    let month = month_number(&caps[2])?;
    let date = calendar_date(parse_year(caps, 3)?, month, day, ctx.today)?;
    Some(DateMatch { date, source: DateSource::MonthName })
}

fn iso_date(caps: &Captures<'_>, _: &str, _: &DateContext) -> Option<DateMatch> {
    let date = NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )?;
    Some(DateMatch { date, source: DateSource::Numeric })
}

fn slashed_date(caps: &Captures<'_>, _: &str, ctx: &DateContext) -> Option<DateMatch> {
    let first = caps[1].parse::<u32>().ok()?;
    let second = caps[2].parse::<u32>().ok()?;
    let (month, day) = if ctx.month_first { (first, second) } else { (second, first) };
    let date = calendar_date(parse_year(caps, 3)?, month, day, ctx.today)?;
    Some(DateMatch { date, source: DateSource::Numeric })
}

fn relative_day(caps: &Captures<'_>, _: &str, ctx: &DateContext) -> Option<DateMatch> {
    let phrase = caps[1].to_lowercase();
    let days = if phrase.starts_with("day") {
        2
    } else if phrase == "tomorrow" {
        1
    } else if phrase.starts_with("next") {
        7
    } else {
        0
    };
    let date = ctx.today + Duration::days(days);
    Some(DateMatch { date, source: DateSource::Relative })
}

fn weekday(caps: &Captures<'_>, _: &str, ctx: &DateContext) -> Option<DateMatch> {
    let name = caps[2].to_lowercase();
    let target = WEEKDAYS.iter().position(|day| *day == name)? as i64;
    let current = ctx.today.weekday().num_days_from_monday() as i64;
    let ahead = (target - current).rem_euclid(7);

    let modifier = caps.get(1).map(|m| m.as_str().to_lowercase());
    let days = match modifier.as_deref() {
        // The weekday after the coming one.
        Some("next") if ahead == 0 => 7,
        Some("next") => ahead + 7,
        Some("this") => ahead,
        _ if ahead == 0 => 7,
        _ => ahead,
    };
    let date = ctx.today + Duration::days(days);
    Some(DateMatch { date, source: DateSource::Weekday })
}

static DATE_RULES: [PatternRule<DateContext, DateMatch>; 7] = [
    PatternRule { name: "due-label", pattern: &DUE_LABEL, extract: due_label },
    PatternRule { name: "month-day", pattern: &MONTH_DAY, extract: month_day },
    PatternRule { name: "day-month", pattern: &DAY_MONTH, extract: day_month },
    PatternRule { name: "iso-date", pattern: &ISO_DATE, extract: iso_date },
    PatternRule { name: "slashed-date", pattern: &SLASHED_DATE, extract: slashed_date },
    PatternRule { name: "relative-day", pattern: &RELATIVE_DAY, extract: relative_day },
    PatternRule { name: "weekday", pattern: &WEEKDAY, extract: weekday },
];

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Interpret a wall-clock time in `tz`. Ambiguous times take the earlier
/// instant; times skipped by a DST transition move forward one hour.
fn localize(tz: Tz, naive: NaiveDateTime) -> DateTime<FixedOffset> {
    let local = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    };
    local.with_timezone(&local.offset().fix())
}

/// Find a date and/or time in `text` and resolve it against `ctx`.
///
/// Returns `None` when the text carries no temporal signal at all.
pub fn extract_temporal(
    text: &str,
    ctx: &ExtractionContext,
    duration: Duration,
) -> Option<TemporalMatch> {
    let date_ctx = DateContext { today: ctx.today(), month_first: ctx.month_first_dates() };
    let date = first_match(&DATE_RULES, text, &date_ctx);
    let time = first_match(&TIME_RULES, text, &());

    match (date, time) {
        (None, None) => {
            debug!("No temporal signal found");
            None
        }
        (Some(date), None) => Some(all_day(date)),
        (Some(date), Some(_)) if date.source == DateSource::DueLabel => {
            debug!("Ignoring clock time in favour of due-date label");
            Some(all_day(date))
        }
        (date, Some(time)) => {
            let day = date.map_or(date_ctx.today, |d| d.date);
            let start = localize(ctx.timezone, day.and_time(time.time));
            // Re-read the offset at the end instant; it differs across a DST change.
            let end = (start + duration).with_timezone(&ctx.timezone);
            let end = end.with_timezone(&end.offset().fix());
            debug!("Resolved start {} end {}", start, end);
            Some(TemporalMatch {
                start: EventTime::Timed(start),
                end: Some(EventTime::Timed(end)),
                all_day: false,
                date_source: date.map(|d| d.source),
                time_source: Some(time.source),
            })
        }
    }
}

fn all_day(date: DateMatch) -> TemporalMatch {
    TemporalMatch {
        start: EventTime::AllDay(date.date),
        end: None,
        all_day: true,
        date_source: Some(date.source),
        time_source: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Utc};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    // 2024-01-01 is a Monday.
    fn context(timezone: &str, locale: &str) -> ExtractionContext {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        ExtractionContext::new(now, timezone, locale).unwrap()
    }

    fn extract(text: &str) -> Option<TemporalMatch> {
        extract_temporal(text, &context("UTC", "en-US"), Duration::hours(1))
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_convert_to_24_hour_law() {
        for h in 1..=12 {
            assert_eq!(convert_to_24_hour(h, 30, Meridiem::Pm), ((h % 12) + 12, 30));
            assert_eq!(convert_to_24_hour(h, 30, Meridiem::Am), (h % 12, 30));
        }
    }

    #[test_case("Call at 2:30 PM", 14, 30, TimeSource::Meridiem)]
    #[test_case("Call at 12:15 am", 0, 15, TimeSource::Meridiem)]
    #[test_case("Call at 3pm", 15, 0, TimeSource::BareMeridiem)]
    #[test_case("Call at 9 a.m", 9, 0, TimeSource::BareMeridiem)]
    #[test_case("Standup 09:45", 9, 45, TimeSource::TwentyFourHour)]
    #[test_case("Deploy at 23:10", 23, 10, TimeSource::TwentyFourHour)]
    #[test_case("Lunch at noon", 12, 0, TimeSource::Named)]
    #[test_case("Meet 18:00 or 7:00 PM", 19, 0, TimeSource::Meridiem ; "meridiem beats 24-hour")]
    fn test_time_only_defaults_to_today(text: &str, hour: u32, minute: u32, source: TimeSource) {
        let m = extract(text).unwrap();
        let start = m.start.as_datetime().unwrap();
        assert_eq!(start.date_naive(), ymd(2024, 1, 1));
        assert_eq!((start.hour(), start.minute()), (hour, minute));
        assert_eq!(m.time_source, Some(source));
        assert_eq!(m.date_source, None);
        assert!(!m.all_day);
    }

    #[test_case("Dinner tomorrow at 7pm", ymd(2024, 1, 2), DateSource::Relative)]
    #[test_case("Dinner day after tomorrow at 7pm", ymd(2024, 1, 3), DateSource::Relative)]
    #[test_case("Dinner tonight at 7pm", ymd(2024, 1, 1), DateSource::Relative)]
    #[test_case("Review next week at 10:00", ymd(2024, 1, 8), DateSource::Relative)]
    #[test_case("Lunch Friday at 12:30 PM", ymd(2024, 1, 5), DateSource::Weekday)]
    #[test_case("Lunch next Friday at 12:30 PM", ymd(2024, 1, 12), DateSource::Weekday)]
    #[test_case("Sync Monday 10:00", ymd(2024, 1, 8), DateSource::Weekday ; "same weekday rolls a week")]
    #[test_case("Sync this Monday 10:00", ymd(2024, 1, 1), DateSource::Weekday)]
    #[test_case("Launch on March 3rd at 9am", ymd(2024, 3, 3), DateSource::MonthName)]
    #[test_case("Launch on 3 March 2026 at 9am", ymd(2026, 3, 3), DateSource::MonthName)]
    #[test_case("Launch 2024-06-30 09:00", ymd(2024, 6, 30), DateSource::Numeric)]
    #[test_case("Launch 6/30/2024 9am", ymd(2024, 6, 30), DateSource::Numeric)]
    #[test_case("Launch 2024-06-30T09:00", ymd(2024, 6, 30), DateSource::Numeric ; "iso datetime")]
    fn test_date_resolution(text: &str, expected: NaiveDate, source: DateSource) {
        let m = extract(text).unwrap();
        assert_eq!(m.start.date(), expected);
        assert_eq!(m.date_source, Some(source));
    }

    #[test]
    fn test_year_less_date_in_the_past_rolls_forward() {
        let m = extract("Party Dec 31").unwrap();
        assert_eq!(m.start, EventTime::AllDay(ymd(2024, 12, 31)));

        let ctx = ExtractionContext::new(
            Utc.with_ymd_and_hms(2024, 11, 20, 12, 0, 0).unwrap(),
            "UTC",
            "en-US",
        )
        .unwrap();
        let m = extract_temporal("Kickoff Jan 5", &ctx, Duration::hours(1)).unwrap();
        assert_eq!(m.start, EventTime::AllDay(ymd(2025, 1, 5)));
    }

    #[test]
    fn test_slashed_date_follows_locale() {
        let us = extract_temporal("Fair 03/04/2024", &context("UTC", "en-US"), Duration::hours(1));
        assert_eq!(us.unwrap().start, EventTime::AllDay(ymd(2024, 3, 4)));

        let gb = extract_temporal("Fair 03/04/2024", &context("UTC", "en-GB"), Duration::hours(1));
        assert_eq!(gb.unwrap().start, EventTime::AllDay(ymd(2024, 4, 3)));
    }

    #[test]
    fn test_due_date_forces_all_day() {
        let m = extract("Due Date: Oct 15, 2025").unwrap();
        assert_eq!(m.start, EventTime::AllDay(ymd(2025, 10, 15)));
        assert_eq!(m.end, None);
        assert!(m.all_day);
        assert_eq!(m.date_source, Some(DateSource::DueLabel));

        let m = extract("Submit by 5:00 PM. Deadline: Oct 15, 2025").unwrap();
        assert!(m.all_day);
        assert_eq!(m.start, EventTime::AllDay(ymd(2025, 10, 15)));
        assert_eq!(m.time_source, None);
    }

    #[test]
    fn test_date_without_time_is_all_day() {
        let m = extract("Company picnic tomorrow").unwrap();
        assert!(m.all_day);
        assert_eq!(m.start, EventTime::AllDay(ymd(2024, 1, 2)));
        assert_eq!(m.end, None);
    }

    #[test]
    fn test_end_is_start_plus_duration() {
        let m = extract_temporal(
            "Meeting tomorrow at 2:00 PM",
            &context("UTC", "en-US"),
            Duration::minutes(30),
        )
        .unwrap();
        let start = m.start.as_datetime().unwrap();
        let end = m.end.unwrap().as_datetime().unwrap();
        assert_eq!(end - start, Duration::minutes(30));
    }

    #[test]
    fn test_timezone_offset_is_applied() {
        let m = extract_temporal(
            "Call tomorrow at 2:00 PM",
            &context("America/New_York", "en-US"),
            Duration::hours(1),
        )
        .unwrap();
        assert_eq!(m.start.to_string(), "2024-01-02T14:00:00-05:00");
    }

    #[test]
    fn test_dst_gap_moves_forward() {
        // 2024-03-10 02:30 does not exist in New York.
        let m = extract_temporal(
            "Backup 2024-03-10 02:30",
            &context("America/New_York", "en-US"),
            Duration::hours(1),
        )
        .unwrap();
        assert_eq!(m.start.to_string(), "2024-03-10T03:30:00-04:00");
    }

    #[test]
    fn test_iso_datetime_with_t_separator() {
        let m = extract("Deploy window 2024-06-30T21:15").unwrap();
        assert_eq!(m.start.to_string(), "2024-06-30T21:15:00+00:00");
        assert_eq!(m.date_source, Some(DateSource::Numeric));
        assert_eq!(m.time_source, Some(TimeSource::TwentyFourHour));
    }

    #[test_case("2024-11-03 at 1:30 AM", "2024-11-03T01:30:00-04:00", "2024-11-03T01:30:00-05:00" ; "fall back")]
    #[test_case("2024-03-10 at 1:30 AM", "2024-03-10T01:30:00-05:00", "2024-03-10T03:30:00-04:00" ; "spring forward")]
    fn test_end_offset_follows_dst(text: &str, start: &str, end: &str) {
        let m = extract_temporal(text, &context("America/New_York", "en-US"), Duration::hours(1))
            .unwrap();
        assert_eq!(m.start.to_string(), start);
        assert_eq!(m.end.map(|t| t.to_string()).as_deref(), Some(end));

        let start = m.start.as_datetime().unwrap();
        let end = m.end.and_then(|t| t.as_datetime()).unwrap();
        assert_eq!(end - start, Duration::hours(1));
    }

    #[test_case("hello world")]
    #[test_case("Room 42 on the third floor")]
    #[test_case("Coordinates: 40.7128, -74.0060")]
    fn test_no_signal(text: &str) {
        assert_eq!(extract(text), None);
    }
}
