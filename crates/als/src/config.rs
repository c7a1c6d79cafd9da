use crate::{AlsError, Result};

/// Hyperparameters fixed when a trainer is constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlsConfig {
    /// Number of latent factors per user / creative
    pub rank: usize,
    /// Number of full user + creative sweeps
    pub iterations: usize,
    /// Lambda, scaled by each row's observation count. Must be positive:
    /// rows with fewer observations than `rank` are singular without it.
    pub regularization: f64,
    /// Seed for factor initialisation
    pub seed: u64,
}

impl Default for AlsConfig {
    fn default() -> Self {
        Self {
            rank: 6,
            iterations: 10,
            regularization: 0.1,
            seed: 5,
        }
    }
}

impl AlsConfig {
    /// Same config with a different rank (builder style)
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.rank == 0 {
            return Err(AlsError::InvalidConfig("rank must be at least 1".into()));
        }
        if self.iterations == 0 {
            return Err(AlsError::InvalidConfig(
                "iterations must be at least 1".into(),
            ));
        }
        if !self.regularization.is_finite() || self.regularization <= 0.0 {
            return Err(AlsError::InvalidConfig(format!(
                "regularization must be a positive number, got {}",
                self.regularization
            )));
        }
        Ok(())
    }
}
