//! Trained latent-factor model.

use data_loader::{CreativeId, UserId};
use ndarray::Array2;
use std::collections::HashMap;

/// A predicted score for one (user, creative) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub user_id: UserId,
    pub creative_id: CreativeId,
    pub nbr_success: f32,
}

/// User and creative factor matrices plus the id maps that address them.
///
/// Immutable once trained; a retrain produces a new model.
#[derive(Debug, Clone)]
pub struct MatrixFactorizationModel {
    pub(crate) rank: usize,
    pub(crate) user_index: HashMap<UserId, usize>,
    pub(crate) creative_index: HashMap<CreativeId, usize>,
    /// [num_users x rank]
    pub(crate) user_factors: Array2<f32>,
    /// [num_creatives x rank]
    pub(crate) creative_factors: Array2<f32>,
}

impl MatrixFactorizationModel {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn has_user(&self, user_id: UserId) -> bool {
        self.user_index.contains_key(&user_id)
    }

    pub fn has_creative(&self, creative_id: CreativeId) -> bool {
        self.creative_index.contains_key(&creative_id)
    }

    /// Predicted nbr_success, or `None` when either side was not in the
    /// training data.
    pub fn predict(&self, user_id: UserId, creative_id: CreativeId) -> Option<f32> {
        let u = *self.user_index.get(&user_id)?;
        let c = *self.creative_index.get(&creative_id)?;
        Some(self.user_factors.row(u).dot(&self.creative_factors.row(c)))
    }

    /// Predict every pair the model knows both sides of, preserving input
    /// order and silently dropping the rest.
    pub fn predict_all(
        &self,
        pairs: impl IntoIterator<Item = (UserId, CreativeId)>,
    ) -> Vec<Prediction> {
        pairs
            .into_iter()
            .filter_map(|(user_id, creative_id)| {
                self.predict(user_id, creative_id).map(|nbr_success| Prediction {
                    user_id,
                    creative_id,
                    nbr_success,
                })
            })
            .collect()
    }
}
