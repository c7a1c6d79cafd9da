//! Types flowing through the scoring and filtering stages.

use data_loader::{CreativeId, DataIndex, UserId};
use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// A creative with its predicted score for one user, joined with the
/// creative's name and aggregate event count.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCreative {
    pub creative_id: CreativeId,
    pub creative_name: String,
    pub predicted_nbr_success: f32,
    pub nbr_success_count: u32,
}

impl ScoredCreative {
    pub fn new(
        creative_id: CreativeId,
        creative_name: impl Into<String>,
        predicted_nbr_success: f32,
        nbr_success_count: u32,
    ) -> Self {
        Self {
            creative_id,
            creative_name: creative_name.into(),
            predicted_nbr_success,
            nbr_success_count,
        }
    }
}

/// Serialized as `[creative_name, creative_id, predicted_nbr_success, nbr_success_count]`
impl Serialize for ScoredCreative {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            &self.creative_name,
            self.creative_id,
            self.predicted_nbr_success,
            self.nbr_success_count,
        )
            .serialize(serializer)
    }
}

/// What the filters need to know about the requesting user
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub user_id: UserId,
    /// Creatives the user already has success events for
    pub succeeded_creatives: HashSet<CreativeId>,
}

impl UserContext {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            succeeded_creatives: HashSet::new(),
        }
    }

    /// Build the context from the user's events in the index.
    ///
    /// Unknown users get an empty context rather than an error.
    pub fn from_index(index: &DataIndex, user_id: UserId) -> Self {
        Self {
            user_id,
            succeeded_creatives: index
                .get_user_creatives(user_id)
                .cloned()
                .unwrap_or_default(),
        }
    }
}
