//! Scoring, filtering and ranking of creatives for one user.
//!
//! This crate provides:
//! - `score_creatives`: model predictions joined with names and aggregate counts
//! - Filter trait and implementations, composed by FilterPipeline
//! - `take_ordered`: score ordering and truncation
//!
//! ## Architecture
//! A query runs in stages:
//! 1. Candidate creative ids are scored for the user
//! 2. Filters remove creatives the user already has events for and those
//!    outside the score threshold
//! 3. The survivors are ordered by score and cut to the requested count
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, UserContext, RankOrder, score_creatives, take_ordered};
//! use pipeline::filters::*;
//!
//! let pipeline = FilterPipeline::new()
//!     .add_filter(AlreadySucceededFilter)
//!     .add_filter(ScoreThresholdFilter::at_least(50.0));
//!
//! let context = UserContext::from_index(&index, user_id);
//! let scored = score_creatives(&model, &index, user_id, &index.get_all_creative_ids());
//! let top = take_ordered(pipeline.apply(scored, &context)?, 10, RankOrder::Descending);
//! ```

pub mod filter_pipeline;
pub mod filters;
pub mod ranking;
pub mod scoring;
pub mod traits;
pub mod types;

// Re-export main types
pub use filter_pipeline::FilterPipeline;
pub use ranking::{take_ordered, RankOrder};
pub use scoring::score_creatives;
pub use traits::Filter;
pub use types::{ScoredCreative, UserContext};
