//! Filter on the predicted score.
//!
//! Top queries keep confident winners (`>= 50` by default), last queries
//! keep likely losers (`< 20` by default).

use crate::traits::Filter;
use crate::types::{ScoredCreative, UserContext};
use anyhow::Result;

/// Which side of the threshold survives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Keep `score >= threshold`
    AtLeast,
    /// Keep `score < threshold`
    Below,
}

/// Keeps creatives whose predicted score is on one side of a threshold.
///
/// NaN predictions never pass.
pub struct ScoreThresholdFilter {
    threshold: f32,
    bound: Bound,
}

impl ScoreThresholdFilter {
    pub fn at_least(threshold: f32) -> Self {
        Self {
            threshold,
            bound: Bound::AtLeast,
        }
    }

    pub fn below(threshold: f32) -> Self {
        Self {
            threshold,
            bound: Bound::Below,
        }
    }

    fn keeps(&self, score: f32) -> bool {
        match self.bound {
            Bound::AtLeast => score >= self.threshold,
            Bound::Below => score < self.threshold,
        }
    }
}

impl Filter for ScoreThresholdFilter {
    fn name(&self) -> &str {
        match self.bound {
            Bound::AtLeast => "ScoreThresholdFilter(at_least)",
            Bound::Below => "ScoreThresholdFilter(below)",
        }
    }

    fn apply(
        &self,
        scored: Vec<ScoredCreative>,
        _context: &UserContext,
    ) -> Result<Vec<ScoredCreative>> {
        let filtered: Vec<ScoredCreative> = scored
            .into_iter()
            .filter(|s| self.keeps(s.predicted_nbr_success))
            .collect();
        Ok(filtered)
    }
}
