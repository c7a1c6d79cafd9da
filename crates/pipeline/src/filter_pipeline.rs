//! Ordered chain of `Filter`s.

use crate::traits::Filter;
use crate::types::{ScoredCreative, UserContext};
use anyhow::{Context, Result};
use tracing::debug;

/// Filters run in insertion order; each sees the previous one's output.
///
/// ```ignore
/// let top = FilterPipeline::new()
///     .add_filter(AlreadySucceededFilter)
///     .add_filter(ScoreThresholdFilter::at_least(50.0));
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter for `context.user_id`, stopping at the first error
    pub fn apply(
        &self,
        mut scored: Vec<ScoredCreative>,
        context: &UserContext,
    ) -> Result<Vec<ScoredCreative>> {
        for filter in &self.filters {
            let before = scored.len();
            scored = filter
                .apply(scored, context)
                .with_context(|| format!("Filter {} failed", filter.name()))?;
            debug!(
                "{}: {} -> {} creatives for user {}",
                filter.name(),
                before,
                scored.len(),
                context.user_id
            );
        }
        Ok(scored)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{AlreadySucceededFilter, ScoreThresholdFilter};

    fn scored() -> Vec<ScoredCreative> {
        vec![
            ScoredCreative::new(1, "a", 90.0, 3),
            ScoredCreative::new(2, "b", 10.0, 3),
            ScoredCreative::new(3, "c", 70.0, 3),
        ]
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let context = UserContext::new(1);

        let filtered = pipeline.apply(scored(), &context).unwrap();
        assert_eq!(filtered.len(), 3);
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_single_filter() {
        let mut context = UserContext::new(1);
        context.succeeded_creatives.insert(1);

        let pipeline = FilterPipeline::new().add_filter(AlreadySucceededFilter);

        let filtered = pipeline.apply(scored(), &context).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].creative_id, 2);
    }

    #[test]
    fn test_filters_compose_in_order() {
        let mut context = UserContext::new(1);
        context.succeeded_creatives.insert(1);

        let pipeline = FilterPipeline::new()
            .add_filter(AlreadySucceededFilter)
            .add_filter(ScoreThresholdFilter::at_least(50.0));

        let filtered = pipeline.apply(scored(), &context).unwrap();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].creative_id, 3);
    }
}
