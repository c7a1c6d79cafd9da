//! Offline evaluation: seeded splits, RMSE and a rank sweep.

use crate::config::AlsConfig;
use crate::model::MatrixFactorizationModel;
use crate::trainer::AlsTrainer;
use crate::{AlsError, Result};
use data_loader::SuccessEvent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Validation error of one candidate rank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankScore {
    pub rank: usize,
    /// `None` when the model could score none of the validation events
    pub rmse: Option<f64>,
}

/// Outcome of `tune_rank`
#[derive(Debug, Clone, PartialEq)]
pub struct TuningReport {
    pub scores: Vec<RankScore>,
    pub best_rank: usize,
    pub best_rmse: f64,
}

/// Randomly partition events by relative weights.
///
/// Every event draws one uniform number from a generator seeded with `seed`
/// and lands in the split whose normalized cumulative weight first exceeds
/// it. The same input, weights and seed always give the same partition.
pub fn random_split(
    events: &[SuccessEvent],
    weights: &[f64],
    seed: u64,
) -> Result<Vec<Vec<SuccessEvent>>> {
    let total: f64 = weights.iter().sum();
    if weights.is_empty() || weights.iter().any(|w| *w < 0.0) || total <= 0.0 {
        return Err(AlsError::InvalidConfig(format!(
            "split weights must be non-negative with a positive sum, got {:?}",
            weights
        )));
    }

    let mut bounds = Vec::with_capacity(weights.len());
    let mut cumulative = 0.0;
    for weight in weights {
        cumulative += weight / total;
        bounds.push(cumulative);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut splits = vec![Vec::new(); weights.len()];
    for event in events {
        let draw: f64 = rng.random();
        let slot = bounds
            .iter()
            .position(|bound| draw < *bound)
            .unwrap_or(weights.len() - 1);
        splits[slot].push(*event);
    }
    Ok(splits)
}

/// Root mean squared error over the events the model can score
pub fn rmse(model: &MatrixFactorizationModel, events: &[SuccessEvent]) -> Option<f64> {
    let mut sum = 0.0_f64;
    let mut count = 0_usize;
    for event in events {
        if let Some(predicted) = model.predict(event.user_id, event.creative_id) {
            sum += ((event.nbr_success - predicted) as f64).powi(2);
            count += 1;
        }
    }
    (count > 0).then(|| (sum / count as f64).sqrt())
}

/// Train one model per rank on `train` and keep the rank with the lowest
/// validation RMSE. Earlier ranks win ties.
pub fn tune_rank(
    train: &[SuccessEvent],
    validation: &[SuccessEvent],
    ranks: &[usize],
    base: AlsConfig,
) -> Result<TuningReport> {
    let mut scores = Vec::with_capacity(ranks.len());
    let mut best: Option<(usize, f64)> = None;

    for &rank in ranks {
        let model = AlsTrainer::new(base.with_rank(rank)).train(train)?;
        let error = rmse(&model, validation);
        info!("For rank {} the validation RMSE is {:?}", rank, error);

        if let Some(error) = error {
            if best.map_or(true, |(_, best_error)| error < best_error) {
                best = Some((rank, error));
            }
        }
        scores.push(RankScore { rank, rmse: error });
    }

    let (best_rank, best_rmse) = best.ok_or_else(|| {
        AlsError::InvalidConfig(
            "no candidate rank could score the validation split".to_string(),
        )
    })?;
    info!("The best model was trained with rank {}", best_rank);

    Ok(TuningReport {
        scores,
        best_rank,
        best_rmse,
    })
}
