//! Error type for the extraction pipeline.
//!
//! Ambiguous or missing signals are never errors; they only lower the
//! confidence of the returned candidate. The variants here cover bad caller
//! parameters and internal faults caught at the pipeline boundary.

/// Errors returned by [`crate::parser::HeuristicExtractor`] and the
/// top-level [`crate::extract`] function.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
    #[error("Invalid reference time '{0}': expected RFC 3339")]
    InvalidNow(String),
    #[error("Input is {len} characters long; the limit is {max}")]
    InputTooLong { len: usize, max: usize },
    #[error("Internal extraction failure: {0}")]
    Internal(String),
}

impl ExtractError {
    /// True for errors caused by the caller's input rather than a defect.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, ExtractError::Internal(_))
    }
}
