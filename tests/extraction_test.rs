use chrono::{DateTime, NaiveDate, TimeZone, Timelike, Utc};
use pretty_assertions::assert_eq;
use snapcal::parser::natural_language::preprocess::normalize;
use snapcal::{
    CandidateEvent, EventResponse, EventTime, ExtractError, ExtractionContext, ExtractorSettings,
    HeuristicExtractor, extract,
};
use test_case::test_case;

// 2024-01-01 is a Monday.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

fn run(text: &str) -> CandidateEvent {
    extract(text, now(), "UTC", "en-US").unwrap()
}

fn accepts(confidence: f64) -> bool {
    ExtractorSettings::default().scoring.accepts(confidence)
}

#[test]
fn test_meeting_tomorrow_at_2pm() {
    let event = run("Meeting tomorrow at 2pm");

    assert_eq!(event.title, "Meeting");
    assert!(!event.all_day);
    let response = EventResponse::from(&event);
    assert_eq!(response.start_datetime.as_deref(), Some("2024-01-02T14:00:00+00:00"));
    assert_eq!(response.end_datetime.as_deref(), Some("2024-01-02T15:00:00+00:00"));
    assert!(accepts(event.confidence), "confidence {}", event.confidence);
}

#[test]
fn test_due_date_label() {
    let event = run("Due Date: Oct 15, 2025");

    assert!(event.all_day);
    assert_eq!(event.start, Some(EventTime::AllDay(NaiveDate::from_ymd_opt(2025, 10, 15).unwrap())));
    assert_eq!(event.end, None);
}

#[test]
fn test_due_label_wins_over_clock_time() {
    let event = run("Lab report\nDue Date: Oct 15, 2025 at 5:00 PM");

    assert!(event.all_day);
    assert_eq!(event.title, "Lab report");
    assert_eq!(event.start.map(|t| t.date()), NaiveDate::from_ymd_opt(2025, 10, 15));
}

#[test]
fn test_lunch_at_the_keg() {
    let event = run("Lunch at The Keg next Friday 12:30pm");

    assert!(event.title.contains("Lunch"));
    assert!(event.location.as_deref().unwrap_or("").contains("The Keg"));
    let start = event.start.and_then(|t| t.as_datetime()).unwrap();
    assert_eq!((start.hour(), start.minute()), (12, 30));
    assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
}

#[test_case("Check in at the Hilton tomorrow at 3pm", "Hilton")]
#[test_case("Drop in at Central Library on Friday", "Central Library")]
fn test_stacked_prepositions(text: &str, expected: &str) {
    assert_eq!(run(text).location.as_deref(), Some(expected));
}

#[test_case("Team lunch. Tomorrow at noon.", "Team lunch")]
#[test_case("Quarterly review. Friday at 2pm.", "Quarterly review")]
fn test_name_in_its_own_sentence(text: &str, expected: &str) {
    let event = run(text);

    assert_eq!(event.title, expected);
    assert!(event.start.is_some());
    assert!(accepts(event.confidence), "confidence {}", event.confidence);
}

#[test]
fn test_hyphenated_party_keyword() {
    let event = run("Third-party audit tomorrow at 10am");

    assert_eq!(event.title, "Third-party audit");
    assert!(event.extraction_path.to_string().contains("title:lead"));
}

#[test]
fn test_clock_range_stays_out_of_title() {
    let event = run("Meeting 2-3pm tomorrow");

    assert_eq!(event.title, "Meeting");
    assert_eq!(
        event.start.map(|t| t.to_string()).as_deref(),
        Some("2024-01-02T15:00:00+00:00")
    );
}

#[test]
fn test_iso_datetime() {
    let event = run("Launch 2024-06-30T09:00");

    assert_eq!(event.title, "Launch");
    assert_eq!(
        event.start.map(|t| t.to_string()).as_deref(),
        Some("2024-06-30T09:00:00+00:00")
    );
}

#[test]
fn test_prices_are_not_coordinates() {
    let event = run("Tickets 12.50, 15.00 at the door tomorrow");
    assert_eq!(event.location.as_deref(), Some("door"));
    assert!(!event.extraction_path.to_string().contains("coordinates"));
}

#[test]
fn test_coordinates() {
    let event = run("Coordinates: 40.7128, -74.0060");
    assert_eq!(event.location.as_deref(), Some("40.7128, -74.0060"));
}

#[test]
fn test_hello_world_is_lowest_tier() {
    let event = run("hello world");

    assert_eq!(event.title, "hello world");
    assert_eq!(event.start, None);
    assert_eq!(event.end, None);
    assert!(!event.all_day);
    assert_eq!(event.confidence, 0.4);
    assert!(!accepts(event.confidence));
}

#[test]
fn test_structured_flyer() {
    let event = run("Science Fair\nDATE: Oct 15\nTIME: 6:00 PM\nLOCATION: Gym");

    assert_eq!(event.title, "Science Fair");
    assert_eq!(event.location.as_deref(), Some("Gym"));
    assert_eq!(
        event.start.map(|t| t.to_string()).as_deref(),
        Some("2024-10-15T18:00:00+00:00")
    );
    assert_eq!(event.confidence, 1.0);
    assert_eq!(
        event.extraction_path.to_string(),
        "heuristic/title:structured/date:month-name/time:meridiem/location:labeled"
    );
}

#[test]
fn test_narrative_rewrite() {
    let event = run("On Friday the Grade 5 class will attend the Science Fair at 9am.");

    assert_eq!(event.title, "Science Fair");
    assert_eq!(event.location, None);
    assert_eq!(
        event.start.map(|t| t.to_string()).as_deref(),
        Some("2024-01-05T09:00:00+00:00")
    );
}

#[test]
fn test_timezone_offset_is_kept() {
    let event = extract("Standup tomorrow at 9:30 AM", now(), "America/New_York", "en-US").unwrap();
    assert_eq!(
        event.start.map(|t| t.to_string()).as_deref(),
        Some("2024-01-02T09:30:00-05:00")
    );
}

#[test]
fn test_ambiguous_local_time_takes_earliest() {
    let event = extract("Flight 2024-11-03 at 1:30 AM", now(), "America/New_York", "en-US").unwrap();
    assert_eq!(
        event.start.map(|t| t.to_string()).as_deref(),
        Some("2024-11-03T01:30:00-04:00")
    );
}

#[test]
fn test_end_crossing_dst_uses_new_offset() {
    let event = extract("Late show 2024-11-03 at 1:30 AM", now(), "America/New_York", "en-US").unwrap();
    assert_eq!(
        event.end.map(|t| t.to_string()).as_deref(),
        Some("2024-11-03T01:30:00-05:00")
    );
}

#[test]
fn test_invalid_timezone_is_an_error() {
    let err = extract("Lunch at noon", now(), "Nowhere/Special", "en-US").unwrap_err();
    assert_eq!(err, ExtractError::InvalidTimezone("Nowhere/Special".to_string()));
    assert!(err.is_input_error());
}

#[test]
fn test_configured_limits() {
    let settings = ExtractorSettings { max_input_chars: 20, ..ExtractorSettings::default() };
    let extractor = HeuristicExtractor::new(settings);
    let ctx = ExtractionContext::new(now(), "UTC", "en-US").unwrap();

    assert!(extractor.extract("Short note at 9am", &ctx).is_ok());
    assert!(matches!(
        extractor.extract("This note is definitely too long", &ctx),
        Err(ExtractError::InputTooLong { max: 20, .. })
    ));
}

#[test_case("")]
#[test_case("   ")]
#[test_case("!!!???")]
#[test_case("\u{0000}\u{0007}")]
#[test_case("at at at on in @ tomorrow next this")]
#[test_case("99:99 13pm 0am 32/13/2024 Feb 30")]
#[test_case("\"\" '' `` “”")]
#[test_case("日本語のテキスト 明日 午後3時")]
fn test_total_on_odd_input(text: &str) {
    let event = run(text);
    assert!(!event.title.is_empty());
    assert!((0.0..=1.0).contains(&event.confidence));
}

#[test_case("Meeting tomorrow at 2pm")]
#[test_case("We will   have dinner at Luigi's on Friday 7p.m.")]
#[test_case("On Sunday the kids will visit the Zoo!\nBring snacks")]
#[test_case("Board sync\nWhen: 3/4 10:00\nWhere: HQ")]
fn test_extraction_is_idempotent_under_normalization(text: &str) {
    let once = normalize(text);
    let twice = normalize(&once);
    assert_eq!(run(&once), run(&twice));
}

#[test]
fn test_ordering_of_candidates() {
    let explicit = run("\"Design Review\" on Oct 3 at 2:00 PM\nLocation: Room 4");
    let partial = run("Design review on Friday");
    let fallback = run("design review notes");

    assert!(explicit.confidence > partial.confidence);
    assert!(partial.confidence > fallback.confidence);
    assert!(accepts(explicit.confidence));
    assert!(!accepts(fallback.confidence));
}
