//! Filter implementations for the query pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod already_succeeded;
pub mod score_threshold;

// Re-export for convenience
pub use already_succeeded::AlreadySucceededFilter;
pub use score_threshold::ScoreThresholdFilter;
