//! ALS training loop.
//!
//! ## Algorithm
//! 1. Index the events into a sparse matrix
//! 2. Seed both factor matrices with unit-length random rows
//! 3. Repeat `iterations` times:
//!    - solve every user row against the fixed creative factors
//!    - solve every creative row against the fixed user factors
//!
//! Rows within one half-step are independent, so they are solved in parallel
//! with rayon without affecting determinism.

use crate::config::AlsConfig;
use crate::matrix::RatingMatrix;
use crate::model::MatrixFactorizationModel;
use crate::solver::solve_row;
use crate::{AlsError, Result};
use data_loader::SuccessEvent;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

/// Fits matrix factorization models with a fixed configuration
#[derive(Debug, Clone)]
pub struct AlsTrainer {
    config: AlsConfig,
}

impl AlsTrainer {
    pub fn new(config: AlsConfig) -> Self {
        Self { config }
    }

    /// Train a model over the given events
    #[instrument(skip(self, events), fields(events = events.len(), rank = self.config.rank))]
    pub fn train(&self, events: &[SuccessEvent]) -> Result<MatrixFactorizationModel> {
        self.config.validate()?;
        if events.is_empty() {
            return Err(AlsError::EmptyTrainingSet);
        }

        let matrix = RatingMatrix::from_events(events);
        info!(
            "Training ALS model: {} users x {} creatives, {} observations",
            matrix.num_users(),
            matrix.num_creatives(),
            matrix.num_observations()
        );

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut user_factors = init_factors(matrix.num_users(), self.config.rank, &mut rng);
        let mut creative_factors =
            init_factors(matrix.num_creatives(), self.config.rank, &mut rng);

        for iteration in 0..self.config.iterations {
            user_factors = self.solve_all(&matrix.by_user, &creative_factors)?;
            creative_factors = self.solve_all(&matrix.by_creative, &user_factors)?;

            debug!(
                "ALS iteration {}: training RMSE = {:.4}",
                iteration + 1,
                training_rmse(&matrix, &user_factors, &creative_factors)
            );
        }

        info!("ALS model built");
        Ok(MatrixFactorizationModel {
            rank: self.config.rank,
            user_index: matrix.user_index,
            creative_index: matrix.creative_index,
            user_factors,
            creative_factors,
        })
    }

    /// Solve every row of one side given the other side's factors
    fn solve_all(
        &self,
        rows: &[Vec<(usize, f32)>],
        fixed: &Array2<f32>,
    ) -> Result<Array2<f32>> {
        let solved: Vec<Array1<f32>> = rows
            .par_iter()
            .map(|observations| solve_row(observations, fixed, self.config.regularization))
            .collect::<Result<_>>()?;

        let mut factors = Array2::<f32>::zeros((rows.len(), self.config.rank));
        for (i, row) in solved.into_iter().enumerate() {
            factors.row_mut(i).assign(&row);
        }
        Ok(factors)
    }
}

/// Uniform positive entries, each row scaled to unit length
fn init_factors(rows: usize, rank: usize, rng: &mut StdRng) -> Array2<f32> {
    let mut factors = Array2::<f32>::zeros((rows, rank));
    for mut row in factors.rows_mut() {
        for value in row.iter_mut() {
            // Strictly positive so the norm below is never zero
            *value = rng.random_range(0.01_f32..1.0);
        }
        let norm = row.dot(&row).sqrt();
        row.mapv_inplace(|v| v / norm);
    }
    factors
}

fn training_rmse(
    matrix: &RatingMatrix,
    user_factors: &Array2<f32>,
    creative_factors: &Array2<f32>,
) -> f64 {
    let mut sum = 0.0_f64;
    let mut count = 0_usize;
    for (u, c, value) in matrix.observations() {
        let predicted = user_factors.row(u).dot(&creative_factors.row(c));
        sum += ((value - predicted) as f64).powi(2);
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        (sum / count as f64).sqrt()
    }
}
