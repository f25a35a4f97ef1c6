//! Parser traits module for SnapCal
//!
//! This module defines the seam between callers (HTTP, CLI) and extractor
//! implementations, so a model-backed extractor can sit beside the heuristic
//! one and produce the same [`CandidateEvent`].

use crate::error::ExtractError;
use crate::event::CandidateEvent;
use crate::parser::{ExtractionContext, ExtractorSettings, HeuristicExtractor};
use anyhow::{Result, anyhow};
use async_trait::async_trait;

/// Extractor trait for all extractor implementations
#[async_trait]
pub trait EventExtractor: Send + Sync {
    /// Short identifier used in logs and by [`create_extractor`]
    fn name(&self) -> &'static str;

    /// Extract a single candidate event from free text
    async fn extract_event(
        &self,
        text: &str,
        ctx: &ExtractionContext,
    ) -> Result<CandidateEvent, ExtractError>;
}

#[async_trait]
impl EventExtractor for HeuristicExtractor {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn extract_event(
        &self,
        text: &str,
        ctx: &ExtractionContext,
    ) -> Result<CandidateEvent, ExtractError> {
        self.extract(text, ctx)
    }
}

/// Extractor factory for creating extractors by name
pub fn create_extractor(
    name: &str,
    settings: ExtractorSettings,
) -> Result<Box<dyn EventExtractor + Send + Sync>> {
    match name.to_lowercase().as_str() {
        "heuristic" => Ok(Box::new(HeuristicExtractor::new(settings))),
        _ => Err(anyhow!("Unknown extractor type: {}", name)),
    }
}
