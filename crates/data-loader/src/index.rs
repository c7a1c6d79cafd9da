//! DataIndex loading and aggregation.
//!
//! - Load both CSV files from a dataset directory
//! - Compute per-creative aggregates (count and mean of nbr_success)
//! - Report events that reference creatives missing from the reference table

use crate::error::Result;
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::{info, warn};

/// File holding the success events inside a dataset directory
pub const SUCCESS_EVENTS_FILE: &str = "creatives_rating.csv";

/// File holding the creative reference table inside a dataset directory
pub const CREATIVES_FILE: &str = "creatives.csv";

impl DataIndex {
    /// Load the creative dataset from a directory
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Build primary indices
    /// 3. Compute creative statistics
    /// 4. Warn about dangling creative references (they are kept)
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading creative dataset from {:?}", data_dir);

        let events_path = data_dir.join(SUCCESS_EVENTS_FILE);
        let creatives_path = data_dir.join(CREATIVES_FILE);

        let (events, creatives) = rayon::join(
            || parser::parse_success_events(&events_path),
            || parser::parse_creatives(&creatives_path),
        );
        let events = events?;
        let creatives = creatives?;

        let mut index = DataIndex::new();
        for creative in creatives {
            index.insert_creative(creative);
        }
        index.extend_events(events);

        index.compute_creative_stats();

        let dangling = index.unknown_creative_references();
        if !dangling.is_empty() {
            warn!(
                "{} creative id(s) referenced by success events are missing from {}: {:?}",
                dangling.len(),
                CREATIVES_FILE,
                dangling
            );
        }

        let (creatives, events, users) = index.counts();
        info!(
            "Loaded {} creatives, {} success events from {} users",
            creatives, events, users
        );
        Ok(index)
    }

    /// Recompute aggregate statistics for every creative with events.
    ///
    /// Always a full recomputation; previous stats are discarded.
    pub fn compute_creative_stats(&mut self) {
        self.creative_stats = self
            .creative_successes
            .par_iter()
            .map(|(&creative_id, successes)| (creative_id, counts_and_average(successes)))
            .collect();
    }

    /// Creative ids referenced by events but absent from the reference table,
    /// sorted ascending
    pub fn unknown_creative_references(&self) -> Vec<CreativeId> {
        let mut ids: Vec<CreativeId> = self
            .creative_successes
            .keys()
            .filter(|id| !self.creatives.contains_key(id))
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Count and mean of a creative's success values
fn counts_and_average(successes: &[f32]) -> CreativeStats {
    let nbr_success_count = successes.len() as u32;
    let avg_nbr_success = if nbr_success_count > 0 {
        successes.iter().sum::<f32>() / nbr_success_count as f32
    } else {
        0.0
    };
    CreativeStats {
        nbr_success_count,
        avg_nbr_success,
    }
}
