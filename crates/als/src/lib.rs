//! Alternating Least Squares matrix factorization for creative success data.
//!
//! This crate fits a latent-factor model over `(user, creative, nbr_success)`
//! observations and answers point predictions from it. It handles:
//! - Mapping sparse user / creative ids onto dense factor rows
//! - Seeded, reproducible factor initialisation
//! - Weighted-lambda ALS updates solved with a Cholesky decomposition
//! - Offline evaluation: random splits, RMSE and a rank sweep

pub mod config;
pub mod evaluation;
pub mod matrix;
pub mod model;
pub mod solver;
pub mod trainer;

use thiserror::Error;

pub use config::AlsConfig;
pub use evaluation::{random_split, rmse, tune_rank, RankScore, TuningReport};
pub use matrix::RatingMatrix;
pub use model::{MatrixFactorizationModel, Prediction};
pub use trainer::AlsTrainer;

/// Errors that can occur while training or evaluating a model
#[derive(Error, Debug, PartialEq)]
pub enum AlsError {
    #[error("Cannot train on an empty set of success events")]
    EmptyTrainingSet,

    #[error("Invalid ALS configuration: {0}")]
    InvalidConfig(String),

    #[error("Normal equations are not positive definite (pivot {pivot} = {value})")]
    NotPositiveDefinite { pivot: usize, value: f64 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, AlsError>;
