//! Confidence scoring
//!
//! Additive weights over the strategies recorded in the extraction path.

use crate::config::ScoringConfig;
use crate::event::ExtractionPath;
use crate::parser::natural_language::location::LocationSource;
use crate::parser::natural_language::time_extractor::{DateSource, TimeSource};
use crate::parser::natural_language::title::TitleSource;

/// Confidence in [0, 1] for a candidate found via `path`, rounded to three
/// decimals.
pub fn score(path: &ExtractionPath, weights: &ScoringConfig) -> f64 {
    let title = match path.title {
        TitleSource::Quoted | TitleSource::Structured => weights.title_explicit,
        TitleSource::Party | TitleSource::Appointment => weights.title_phrase,
        TitleSource::Lead => weights.title_lead,
        TitleSource::Fallback => 0.0,
    };
    let time = path.time.map_or(0.0, |source| match source {
        TimeSource::Meridiem | TimeSource::BareMeridiem => weights.time_meridiem,
        TimeSource::TwentyFourHour => weights.time_24_hour,
        TimeSource::Named => weights.time_named,
    });
    let date = path.date.map_or(0.0, |source| match source {
        DateSource::DueLabel => weights.date_due_label,
        DateSource::MonthName | DateSource::Numeric => weights.date_explicit,
        DateSource::Relative => weights.date_relative,
        DateSource::Weekday => weights.date_weekday,
    });
    let location = path.location.map_or(0.0, |source| match source {
        LocationSource::Coordinates | LocationSource::Labeled => weights.location_precise,
        LocationSource::Address => weights.location_address,
        LocationSource::Prepositional => weights.location_prepositional,
    });

    let mut total = (weights.base + title + time + date + location).min(1.0);
    if path.title == TitleSource::Fallback {
        total = total.min(weights.fallback_title_cap);
    }
    (total.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}
