//! Ordering and truncation of scored creatives.

use crate::types::ScoredCreative;
use std::cmp::Ordering;

/// Sort direction on the predicted score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Highest predicted score first
    Descending,
    /// Lowest predicted score first
    Ascending,
}

/// Sort by predicted score and keep at most `n` entries.
///
/// Equal scores are ordered by creative id so results are stable across
/// calls. NaN scores sort last in either direction.
pub fn take_ordered(
    mut scored: Vec<ScoredCreative>,
    n: usize,
    order: RankOrder,
) -> Vec<ScoredCreative> {
    scored.sort_by(|a, b| {
        compare_scores(a.predicted_nbr_success, b.predicted_nbr_success, order)
            .then_with(|| a.creative_id.cmp(&b.creative_id))
    });
    scored.truncate(n);
    scored
}

fn compare_scores(a: f32, b: f32, order: RankOrder) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match order {
            RankOrder::Descending => b.total_cmp(&a),
            RankOrder::Ascending => a.total_cmp(&b),
        },
    }
}
