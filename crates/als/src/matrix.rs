//! Sparse observation matrix with dense row indices.

use data_loader::{CreativeId, SuccessEvent, UserId};
use std::collections::HashMap;

/// Success events re-indexed for ALS.
///
/// Users and creatives get dense indices in first-seen order, so two matrices
/// built from the same event sequence are identical. Each event is one
/// observation; repeated (user, creative) pairs are not merged.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    pub(crate) user_ids: Vec<UserId>,
    pub(crate) creative_ids: Vec<CreativeId>,
    pub(crate) user_index: HashMap<UserId, usize>,
    pub(crate) creative_index: HashMap<CreativeId, usize>,
    /// Per user row: (creative row, value)
    pub(crate) by_user: Vec<Vec<(usize, f32)>>,
    /// Per creative row: (user row, value)
    pub(crate) by_creative: Vec<Vec<(usize, f32)>>,
}

impl RatingMatrix {
    pub fn from_events(events: &[SuccessEvent]) -> Self {
        let mut matrix = Self {
            user_ids: Vec::new(),
            creative_ids: Vec::new(),
            user_index: HashMap::new(),
            creative_index: HashMap::new(),
            by_user: Vec::new(),
            by_creative: Vec::new(),
        };

        for event in events {
            let u = *matrix.user_index.entry(event.user_id).or_insert_with(|| {
                matrix.user_ids.push(event.user_id);
                matrix.by_user.push(Vec::new());
                matrix.user_ids.len() - 1
            });
            let c = *matrix
                .creative_index
                .entry(event.creative_id)
                .or_insert_with(|| {
                    matrix.creative_ids.push(event.creative_id);
                    matrix.by_creative.push(Vec::new());
                    matrix.creative_ids.len() - 1
                });

            matrix.by_user[u].push((c, event.nbr_success));
            matrix.by_creative[c].push((u, event.nbr_success));
        }

        matrix
    }

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_creatives(&self) -> usize {
        self.creative_ids.len()
    }

    pub fn num_observations(&self) -> usize {
        self.by_user.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }

    /// Iterate every observation as (user row, creative row, value)
    pub(crate) fn observations(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.by_user
            .iter()
            .enumerate()
            .flat_map(|(u, row)| row.iter().map(move |&(c, value)| (u, c, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_indexing() {
        let events = vec![
            SuccessEvent::new(7, 100, 1.0),
            SuccessEvent::new(3, 200, 2.0),
            SuccessEvent::new(7, 200, 3.0),
        ];
        let matrix = RatingMatrix::from_events(&events);

        assert_eq!(matrix.user_ids, vec![7, 3]);
        assert_eq!(matrix.creative_ids, vec![100, 200]);
        assert_eq!(matrix.by_user[0], vec![(0, 1.0), (1, 3.0)]);
        assert_eq!(matrix.by_creative[1], vec![(1, 2.0), (0, 3.0)]);
        assert_eq!(matrix.num_observations(), 3);
    }

    #[test]
    fn test_duplicates_are_separate_observations() {
        let events = vec![SuccessEvent::new(1, 1, 5.0), SuccessEvent::new(1, 1, 5.0)];
        let matrix = RatingMatrix::from_events(&events);

        assert_eq!(matrix.num_users(), 1);
        assert_eq!(matrix.num_creatives(), 1);
        assert_eq!(matrix.num_observations(), 2);
    }
}
