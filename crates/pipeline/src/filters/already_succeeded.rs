//! Filter to remove creatives the user already has success events for.
//!
//! Top / last queries only rank creatives the user has not been served yet,
//! so this is the first filter in both pipelines.

use crate::traits::Filter;
use crate::types::{ScoredCreative, UserContext};
use anyhow::Result;

/// Removes creatives present in `UserContext::succeeded_creatives`.
///
/// Matches on creative id, using the HashSet for O(1) lookups.
pub struct AlreadySucceededFilter;

impl Filter for AlreadySucceededFilter {
    fn name(&self) -> &str {
        "AlreadySucceededFilter"
    }

    fn apply(
        &self,
        scored: Vec<ScoredCreative>,
        context: &UserContext,
    ) -> Result<Vec<ScoredCreative>> {
        let filtered: Vec<ScoredCreative> = scored
            .into_iter()
            .filter(|s| !context.succeeded_creatives.contains(&s.creative_id))
            .collect();
        Ok(filtered)
    }
}
