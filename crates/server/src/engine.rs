//! # Creative Recommendation Engine
//!
//! This module owns the served state and answers every query:
//! 1. Load the dataset and train the initial model
//! 2. Ingest new success events, recompute aggregates, retrain
//! 3. Score requested creatives for a user
//! 4. Rank unseen creatives into top / last lists
//!
//! Events, aggregates and model are published together as one immutable
//! `EngineSnapshot`. Readers clone the current `Arc` and never block on a
//! retrain; ingestions are serialized so no batch is lost.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use als::{AlsTrainer, MatrixFactorizationModel};
use data_loader::{CreativeId, DataIndex, SuccessEvent, UserId};
use pipeline::filters::{AlreadySucceededFilter, ScoreThresholdFilter};
use pipeline::{FilterPipeline, RankOrder, ScoredCreative, UserContext, score_creatives, take_ordered};

use crate::config::EngineConfig;

/// Everything a query reads, published atomically
#[derive(Debug)]
pub struct EngineSnapshot {
    pub index: DataIndex,
    pub model: MatrixFactorizationModel,
}

/// Counts reported by the health route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineSummary {
    pub creatives: usize,
    pub success_events: usize,
    pub users: usize,
    pub model_rank: usize,
}

/// Main engine that coordinates loading, training and querying
pub struct CreativeRecommendationEngine {
    trainer: AlsTrainer,
    snapshot: RwLock<Arc<EngineSnapshot>>,
    ingest_lock: Mutex<()>,
    top_pipeline: FilterPipeline,
    last_pipeline: FilterPipeline,
}

impl CreativeRecommendationEngine {
    /// Build an engine over an already loaded index, training the first
    /// model synchronously.
    pub fn new(mut index: DataIndex, config: EngineConfig) -> Result<Self> {
        info!("Starting up the Creative Recommendation Engine");
        let trainer = AlsTrainer::new(config.als);

        index.compute_creative_stats();
        let model = trainer
            .train(index.events())
            .context("Failed to train initial ALS model")?;

        let top_pipeline = FilterPipeline::new()
            .add_filter(AlreadySucceededFilter)
            .add_filter(ScoreThresholdFilter::at_least(config.top_min_nbr_success));
        let last_pipeline = FilterPipeline::new()
            .add_filter(AlreadySucceededFilter)
            .add_filter(ScoreThresholdFilter::below(config.last_max_nbr_success));

        Ok(Self {
            trainer,
            snapshot: RwLock::new(Arc::new(EngineSnapshot { index, model })),
            ingest_lock: Mutex::new(()),
            top_pipeline,
            last_pipeline,
        })
    }

    /// Load the dataset directory and train, off the async runtime
    pub async fn load(dataset_path: PathBuf, config: EngineConfig) -> Result<Self> {
        tokio::task::spawn_blocking(move || {
            let index = DataIndex::load_from_files(&dataset_path).with_context(|| {
                format!("Failed to load creative dataset from {:?}", dataset_path)
            })?;
            Self::new(index, config)
        })
        .await
        .context("Engine startup task panicked")?
    }

    /// The snapshot queries currently read from
    pub async fn current(&self) -> Arc<EngineSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Append events, recompute aggregates, retrain and publish.
    ///
    /// Returns the ingested events. On training failure the previous
    /// snapshot stays in place and the error is returned.
    pub async fn add_nbr_success(&self, events: Vec<SuccessEvent>) -> Result<Vec<SuccessEvent>> {
        if events.is_empty() {
            return Ok(events);
        }

        let _guard = self.ingest_lock.lock().await;
        let start_time = Instant::now();

        let mut index = self.current().await.index.clone();
        index.extend_events(events.iter().copied());
        info!("Counting creative nbr_success after adding {} events", events.len());
        index.compute_creative_stats();

        let trainer = self.trainer.clone();
        let snapshot = tokio::task::spawn_blocking(move || {
            trainer
                .train(index.events())
                .map(|model| EngineSnapshot { index, model })
        })
        .await
        .context("Training task panicked")?
        .context("Failed to retrain ALS model")?;

        *self.snapshot.write().await = Arc::new(snapshot);

        info!(
            "Ingested {} events and retrained in {:.2?}",
            events.len(),
            start_time.elapsed()
        );
        Ok(events)
    }

    /// Predicted scores for the given creatives, unfiltered, in request order
    pub async fn get_nbr_success_for_creative_ids(
        &self,
        user_id: UserId,
        creative_ids: &[CreativeId],
    ) -> Result<Vec<ScoredCreative>> {
        let snapshot = self.current().await;
        Ok(score_creatives(&snapshot.model, &snapshot.index, user_id, creative_ids))
    }

    /// Up to `count` unseen creatives predicted at or above the top
    /// threshold, best first
    pub async fn get_top_nbr_success(
        &self,
        user_id: UserId,
        count: usize,
    ) -> Result<Vec<ScoredCreative>> {
        self.rank_unseen(user_id, count, &self.top_pipeline, RankOrder::Descending)
            .await
            .context("Failed to rank top creatives")
    }

    /// Up to `count` unseen creatives predicted below the last threshold,
    /// worst first
    pub async fn get_last_nbr_success(
        &self,
        user_id: UserId,
        count: usize,
    ) -> Result<Vec<ScoredCreative>> {
        self.rank_unseen(user_id, count, &self.last_pipeline, RankOrder::Ascending)
            .await
            .context("Failed to rank last creatives")
    }

    pub async fn summary(&self) -> EngineSummary {
        let snapshot = self.current().await;
        let (creatives, success_events, users) = snapshot.index.counts();
        EngineSummary {
            creatives,
            success_events,
            users,
            model_rank: snapshot.model.rank(),
        }
    }

    async fn rank_unseen(
        &self,
        user_id: UserId,
        count: usize,
        filters: &FilterPipeline,
        order: RankOrder,
    ) -> Result<Vec<ScoredCreative>> {
        let snapshot = self.current().await;
        let context = UserContext::from_index(&snapshot.index, user_id);

        let candidates = snapshot.index.get_all_creative_ids();
        let scored = score_creatives(&snapshot.model, &snapshot.index, user_id, &candidates);
        let filtered = filters.apply(scored, &context)?;
        debug!(
            "User {}: {} candidates, {} after filters",
            user_id,
            candidates.len(),
            filtered.len()
        );

        Ok(take_ordered(filtered, count, order))
    }
}
