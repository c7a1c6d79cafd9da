//! Core domain types for the creative success dataset.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - Type aliases for domain clarity (UserId, CreativeId)
//! - Success events, creatives and their aggregate statistics
//! - DataIndex, the in-memory store the engine trains and queries from

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a creative
pub type CreativeId = u32;

// =============================================================================
// Event and Reference Types
// =============================================================================

/// A single observation: how many successes a creative produced for a user.
///
/// Small and `Copy`, so it can be pushed into several indices without cloning
/// heap data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessEvent {
    pub user_id: UserId,
    pub creative_id: CreativeId,
    pub nbr_success: f32,
}

impl SuccessEvent {
    pub fn new(user_id: UserId, creative_id: CreativeId, nbr_success: f32) -> Self {
        Self {
            user_id,
            creative_id,
            nbr_success,
        }
    }
}

/// A creative from the reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creative {
    pub id: CreativeId,
    pub name: String,
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Aggregate statistics for a creative, derived from its success events.
///
/// Recomputed in full after every ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreativeStats {
    pub nbr_success_count: u32,
    pub avg_nbr_success: f32,
}

// =============================================================================
// DataIndex - The Core In-Memory Store
// =============================================================================

/// Holds every success event and creative plus lookup indices.
///
/// `Clone` is deliberate: ingestion copies the current index, appends to the
/// copy and publishes it alongside a freshly trained model.
#[derive(Debug, Clone)]
pub struct DataIndex {
    /// Reference table
    pub(crate) creatives: HashMap<CreativeId, Creative>,

    /// Every event in arrival order (training input)
    pub(crate) events: Vec<SuccessEvent>,

    /// Creatives each user has at least one event for
    pub(crate) user_creatives: HashMap<UserId, HashSet<CreativeId>>,
    /// Success values observed for each creative
    pub(crate) creative_successes: HashMap<CreativeId, Vec<f32>>,

    // Precomputed statistics
    pub(crate) creative_stats: HashMap<CreativeId, CreativeStats>,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self {
            creatives: HashMap::new(),
            events: Vec::new(),
            user_creatives: HashMap::new(),
            creative_successes: HashMap::new(),
            creative_stats: HashMap::new(),
        }
    }

    /// Get a creative by ID
    pub fn get_creative(&self, id: CreativeId) -> Option<&Creative> {
        self.creatives.get(&id)
    }

    /// Get precomputed statistics for a creative
    pub fn get_creative_stats(&self, id: CreativeId) -> Option<&CreativeStats> {
        self.creative_stats.get(&id)
    }

    /// All success events, in the order they were inserted
    pub fn events(&self) -> &[SuccessEvent] {
        &self.events
    }

    /// Creatives the user has at least one success event for.
    ///
    /// Returns `None` for users the index has never seen.
    pub fn get_user_creatives(&self, user_id: UserId) -> Option<&HashSet<CreativeId>> {
        self.user_creatives.get(&user_id)
    }

    /// Every creative id in the reference table, sorted ascending
    pub fn get_all_creative_ids(&self) -> Vec<CreativeId> {
        let mut ids: Vec<CreativeId> = self.creatives.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Insert a creative into the reference table
    pub fn insert_creative(&mut self, creative: Creative) {
        self.creatives.insert(creative.id, creative);
    }

    /// Insert a success event and update indices.
    ///
    /// Aggregates are not touched; call `compute_creative_stats` once a batch
    /// has been inserted.
    pub fn insert_event(&mut self, event: SuccessEvent) {
        self.user_creatives
            .entry(event.user_id)
            .or_default()
            .insert(event.creative_id);

        self.creative_successes
            .entry(event.creative_id)
            .or_default()
            .push(event.nbr_success);

        self.events.push(event);
    }

    /// Append a batch of events (no deduplication)
    pub fn extend_events(&mut self, events: impl IntoIterator<Item = SuccessEvent>) {
        for event in events {
            self.insert_event(event);
        }
    }

    /// Get counts for debugging/validation: (creatives, events, users)
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.creatives.len(),
            self.events.len(),
            self.user_creatives.len(),
        )
    }
}

impl Default for DataIndex {
    fn default() -> Self {
        Self::new()
    }
}
