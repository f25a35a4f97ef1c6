//! Heuristic natural language extraction
//!
//! Each submodule handles one concern and is a pure function of its input.
//! [`crate::parser::HeuristicExtractor`] wires them into a pipeline:
//! normalize, then extract temporal range, location and title, then score.

pub mod location;
pub mod preprocess;
pub mod scoring;
pub mod time_extractor;
pub mod title;
