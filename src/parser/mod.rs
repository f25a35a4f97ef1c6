//! SnapCal parser module
//!
//! Turns free text into a [`CandidateEvent`] through a fixed heuristic
//! pipeline. Extractors are exposed behind the [`EventExtractor`] trait.

pub mod natural_language;
pub mod traits;
pub mod utils;

use crate::config::{Config, ScoringConfig};
use crate::error::ExtractError;
use crate::event::{CandidateEvent, ExtractionPath};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use log::{debug, error};
use natural_language::location::extract_location;
use natural_language::preprocess::normalize;
use natural_language::scoring::score;
use natural_language::time_extractor::extract_temporal;
use natural_language::title::extract_title;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

pub use traits::{EventExtractor, create_extractor};

/// Reference point for resolving relative dates.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionContext {
    pub now: DateTime<Utc>,
    pub timezone: Tz,
    pub locale: String,
}

impl ExtractionContext {
    pub fn new(now: DateTime<Utc>, timezone: &str, locale: &str) -> Result<Self, ExtractError> {
        let timezone = timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| ExtractError::InvalidTimezone(timezone.to_string()))?;
        Ok(Self { now, timezone, locale: locale.to_string() })
    }

    /// Parse an RFC 3339 reference time as supplied by HTTP and CLI callers.
    pub fn parse_now(value: &str) -> Result<DateTime<Utc>, ExtractError> {
        DateTime::parse_from_rfc3339(value.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| ExtractError::InvalidNow(value.to_string()))
    }

    /// The calendar date of `now` in the requested zone.
    pub fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.timezone).date_naive()
    }

    /// `MM/DD` for US English, `DD/MM` everywhere else.
    pub fn month_first_dates(&self) -> bool {
        let locale = self.locale.trim().to_lowercase().replace('_', "-");
        matches!(locale.as_str(), "en-us" | "en")
    }
}

/// Knobs of the heuristic pipeline, usually taken from [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorSettings {
    pub default_duration: Duration,
    pub max_input_chars: usize,
    pub title_fallback_chars: usize,
    pub scoring: ScoringConfig,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ExtractorSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_duration: Duration::minutes(config.extraction.default_duration_minutes),
            max_input_chars: config.extraction.max_input_chars,
            title_fallback_chars: config.extraction.title_fallback_chars,
            scoring: config.scoring.clone(),
        }
    }
}

/// Rule-based extractor: normalize, then find time range, location and
/// title independently, then score.
#[derive(Debug, Clone, Default)]
pub struct HeuristicExtractor {
    settings: ExtractorSettings,
}

impl HeuristicExtractor {
    pub fn new(settings: ExtractorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    /// Extract one candidate event from `text`.
    ///
    /// Missing signals only lower the confidence; errors are reserved for
    /// oversized input and internal faults.
    pub fn extract(
        &self,
        text: &str,
        ctx: &ExtractionContext,
    ) -> Result<CandidateEvent, ExtractError> {
        let len = text.chars().count();
        if len > self.settings.max_input_chars {
            return Err(ExtractError::InputTooLong { len, max: self.settings.max_input_chars });
        }

        panic::catch_unwind(AssertUnwindSafe(|| self.run_pipeline(text, ctx))).map_err(|payload| {
            let message = panic_message(payload.as_ref());
            error!("Extraction aborted: {}", message);
            ExtractError::Internal(message)
        })
    }

    fn run_pipeline(&self, text: &str, ctx: &ExtractionContext) -> CandidateEvent {
        let normalized = normalize(text);
        debug!("Normalized input: {:?}", normalized);

        let temporal = extract_temporal(&normalized, ctx, self.settings.default_duration);
        let location = extract_location(&normalized);
        let title = extract_title(&normalized, self.settings.title_fallback_chars);

        let extraction_path = ExtractionPath {
            title: title.source,
            date: temporal.as_ref().and_then(|t| t.date_source),
            time: temporal.as_ref().and_then(|t| t.time_source),
            location: location.as_ref().map(|l| l.source),
        };
        let confidence = score(&extraction_path, &self.settings.scoring);
        debug!("Path {} scored {}", extraction_path, confidence);

        CandidateEvent {
            title: title.text,
            start: temporal.as_ref().map(|t| t.start),
            end: temporal.as_ref().and_then(|t| t.end),
            location: location.map(|l| l.text),
            all_day: temporal.as_ref().is_some_and(|t| t.all_day),
            description: text.to_string(),
            confidence,
            extraction_path,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
