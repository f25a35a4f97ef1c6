pub mod api_server;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod parser;

use chrono::{DateTime, Utc};

pub fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Extract one candidate event from `text` with the default settings.
///
/// `now` anchors relative phrases ("tomorrow", "next Friday"); `timezone` is
/// an IANA name and `locale` decides the order of numeric dates.
pub fn extract(
    text: &str,
    now: DateTime<Utc>,
    timezone: &str,
    locale: &str,
) -> Result<CandidateEvent, ExtractError> {
    let ctx = ExtractionContext::new(now, timezone, locale)?;
    HeuristicExtractor::default().extract(text, &ctx)
}

// Re-export commonly used types
pub use config::Config;
pub use error::ExtractError;
pub use event::{CandidateEvent, EventResponse, EventTime};
pub use parser::{EventExtractor, ExtractionContext, ExtractorSettings, HeuristicExtractor};
