//! The `Filter` seam used by top / last queries.

use crate::types::{ScoredCreative, UserContext};
use anyhow::Result;

/// One stage of a `FilterPipeline`.
///
/// Filters are shared by concurrent request handlers, hence `Send + Sync`.
pub trait Filter: Send + Sync {
    /// Short label used in pipeline logs
    fn name(&self) -> &str;

    /// Keep the creatives that pass, in their original order
    fn apply(
        &self,
        scored: Vec<ScoredCreative>,
        context: &UserContext,
    ) -> Result<Vec<ScoredCreative>>;
}
