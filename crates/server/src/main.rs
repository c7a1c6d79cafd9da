//! HTTP server binary for the creative recommendation engine.
//!
//! Loads the dataset directory, trains the initial model and serves the
//! recommendation routes.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use als::AlsConfig;
use server::{AppState, CreativeRecommendationEngine, EngineConfig, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "creative-recs-server")]
#[command(about = "Serve creative recommendations over HTTP", long_about = None)]
struct Args {
    /// Directory holding creatives_rating.csv and creatives.csv
    #[arg(long, default_value = "datasets")]
    dataset_path: PathBuf,

    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Number of latent factors
    #[arg(long, default_value_t = 6)]
    rank: usize,

    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Lambda, must be positive
    #[arg(long, default_value_t = 0.1)]
    regularization: f64,

    #[arg(long, default_value_t = 5)]
    seed: u64,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            dataset_path: self.dataset_path,
            engine: EngineConfig {
                als: AlsConfig {
                    rank: self.rank,
                    iterations: self.iterations,
                    regularization: self.regularization,
                    seed: self.seed,
                },
                ..EngineConfig::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Args::parse().into_config();
    config.engine.als.validate()?;

    info!("Loading dataset from {:?}", config.dataset_path);
    let engine = CreativeRecommendationEngine::load(config.dataset_path.clone(), config.engine).await?;

    let summary = engine.summary().await;
    info!(
        "Engine ready: {} creatives, {} success events, {} users",
        summary.creatives, summary.success_events, summary.users
    );

    server::serve(&config, AppState::new(engine)).await
}
