//! Prediction and join stage.
//!
//! Turns a list of creative ids into `ScoredCreative`s for one user:
//! 1. Predict each (user, creative) pair with the trained model
//! 2. Join with the creative name table
//! 3. Join with the aggregate stats (event count)
//!
//! All joins are inner joins: a pair is dropped when the model has no factors
//! for either side, the creative has no name, or it has no events.

use als::MatrixFactorizationModel;
use data_loader::{CreativeId, DataIndex, UserId};
use rayon::prelude::*;
use tracing::debug;

use crate::types::ScoredCreative;

/// Score `creative_ids` for `user_id`, preserving input order.
pub fn score_creatives(
    model: &MatrixFactorizationModel,
    index: &DataIndex,
    user_id: UserId,
    creative_ids: &[CreativeId],
) -> Vec<ScoredCreative> {
    let predictions = model.predict_all(creative_ids.iter().map(|&c| (user_id, c)));

    let scored: Vec<ScoredCreative> = predictions
        .par_iter()
        .filter_map(|prediction| {
            let creative = index.get_creative(prediction.creative_id)?;
            let stats = index.get_creative_stats(prediction.creative_id)?;
            Some(ScoredCreative {
                creative_id: prediction.creative_id,
                creative_name: creative.name.clone(),
                predicted_nbr_success: prediction.nbr_success,
                nbr_success_count: stats.nbr_success_count,
            })
        })
        .collect();

    debug!(
        "Scored {} of {} requested creatives for user {}",
        scored.len(),
        creative_ids.len(),
        user_id
    );
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use als::{AlsConfig, AlsTrainer};
    use data_loader::{Creative, SuccessEvent};

    fn build_index() -> DataIndex {
        let mut index = DataIndex::new();
        for (id, name) in [(10, "Hero"), (11, "Sidebar"), (12, "Never served")] {
            index.insert_creative(Creative {
                id,
                name: name.to_string(),
            });
        }
        index.extend_events([
            SuccessEvent::new(1, 10, 60.0),
            SuccessEvent::new(1, 11, 5.0),
            SuccessEvent::new(2, 10, 70.0),
            SuccessEvent::new(2, 11, 8.0),
            // creative 99 has events but no name
            SuccessEvent::new(2, 99, 30.0),
        ]);
        index.compute_creative_stats();
        index
    }

    #[test]
    fn test_score_creatives_inner_joins() {
        let index = build_index();
        let model = AlsTrainer::new(AlsConfig::default())
            .train(index.events())
            .unwrap();

        let scored = score_creatives(&model, &index, 1, &[10, 11, 12, 99]);

        let ids: Vec<_> = scored.iter().map(|s| s.creative_id).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(scored[0].creative_name, "Hero");
        assert_eq!(scored[0].nbr_success_count, 2);
        assert_eq!(
            Some(scored[1].predicted_nbr_success),
            model.predict(1, 11)
        );
    }

    #[test]
    fn test_score_creatives_keeps_request_order() {
        let index = build_index();
        let model = AlsTrainer::new(AlsConfig::default())
            .train(index.events())
            .unwrap();

        let scored = score_creatives(&model, &index, 2, &[11, 99, 10]);
        let ids: Vec<_> = scored.iter().map(|s| s.creative_id).collect();
        assert_eq!(ids, vec![11, 10]);
    }

    #[test]
    fn test_unknown_user_scores_nothing() {
        let index = build_index();
        let model = AlsTrainer::new(AlsConfig::default())
            .train(index.events())
            .unwrap();

        assert!(score_creatives(&model, &index, 404, &[10, 11]).is_empty());
    }
}
