use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;

use als::{random_split, rmse, tune_rank, AlsConfig, AlsTrainer};
use data_loader::{CreativeId, DataIndex, UserId};
use pipeline::ScoredCreative;
use server::{CreativeRecommendationEngine, EngineConfig};

/// Creative recommendation engine, offline tools
#[derive(Parser)]
#[command(name = "creative-recs")]
#[command(about = "Creative recommendations using alternating least squares", long_about = None)]
struct Cli {
    /// Directory holding creatives_rating.csv and creatives.csv
    #[arg(short, long, default_value = "datasets")]
    data_dir: PathBuf,

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

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Best unseen creatives for a user
    Top {
        #[arg(long)]
        user_id: UserId,

        #[arg(long, default_value = "10")]
        count: usize,
    },

    /// Worst unseen creatives for a user
    Last {
        #[arg(long)]
        user_id: UserId,

        #[arg(long, default_value = "10")]
        count: usize,
    },

    /// Predicted nbr_success of one creative for a user
    Rate {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        creative_id: CreativeId,
    },

    /// Dataset statistics and the most served creatives
    Stats {
        /// Number of creatives to list
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Sweep ranks on a 60/20/20 split and report the test RMSE
    Tune {
        /// Candidate ranks
        #[arg(long, value_delimiter = ',', default_value = "6,8,12")]
        ranks: Vec<usize>,

        /// Seed of the random split
        #[arg(long, default_value_t = 0)]
        split_seed: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let als_config = AlsConfig {
        rank: cli.rank,
        iterations: cli.iterations,
        regularization: cli.regularization,
        seed: cli.seed,
    };
    als_config.validate()?;

    println!("Loading creatives dataset from {}...", cli.data_dir.display());
    let start = Instant::now();
    let data_index = DataIndex::load_from_files(&cli.data_dir)
        .context("Failed to load creatives dataset")?;
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());

    match cli.command {
        Commands::Top { user_id, count } => {
            let engine = build_engine(data_index, als_config)?;
            let top = engine.get_top_nbr_success(user_id, count).await?;
            print_scored(&format!("Top creatives for user {}", user_id), &top);
        }
        Commands::Last { user_id, count } => {
            let engine = build_engine(data_index, als_config)?;
            let last = engine.get_last_nbr_success(user_id, count).await?;
            print_scored(&format!("Last creatives for user {}", user_id), &last);
        }
        Commands::Rate {
            user_id,
            creative_id,
        } => {
            let engine = build_engine(data_index, als_config)?;
            let scored = engine
                .get_nbr_success_for_creative_ids(user_id, &[creative_id])
                .await?;
            if scored.is_empty() {
                println!(
                    "{} No prediction for user {} and creative {}",
                    "✗".red(),
                    user_id,
                    creative_id
                );
            } else {
                print_scored(&format!("Prediction for user {}", user_id), &scored);
            }
        }
        Commands::Stats { limit } => handle_stats(data_index, limit),
        Commands::Tune { ranks, split_seed } => {
            handle_tune(data_index, als_config, &ranks, split_seed)?
        }
    }

    Ok(())
}

fn build_engine(index: DataIndex, als: AlsConfig) -> Result<CreativeRecommendationEngine> {
    let start = Instant::now();
    let engine = CreativeRecommendationEngine::new(
        index,
        EngineConfig {
            als,
            ..EngineConfig::default()
        },
    )?;
    println!(
        "{} Trained rank {} model in {:?}",
        "✓".green(),
        als.rank,
        start.elapsed()
    );
    Ok(engine)
}

/// Handle the 'stats' command
fn handle_stats(mut data_index: DataIndex, limit: usize) {
    data_index.compute_creative_stats();
    let (creatives, events, users) = data_index.counts();

    println!("{}", "Dataset statistics:".bold().blue());
    println!("{}Creatives: {}", "• ".green(), creatives);
    println!("{}Success events: {}", "• ".green(), events);
    println!("{}Users: {}", "• ".green(), users);

    let mut served: Vec<_> = data_index
        .get_all_creative_ids()
        .into_iter()
        .filter_map(|id| {
            let stats = data_index.get_creative_stats(id)?;
            let name = data_index.get_creative(id).map(|c| c.name.as_str()).unwrap_or("?");
            Some((id, name, *stats))
        })
        .collect();
    served.sort_by(|a, b| {
        b.2.nbr_success_count
            .cmp(&a.2.nbr_success_count)
            .then_with(|| a.0.cmp(&b.0))
    });

    println!("{}", "Most served creatives:".bold().blue());
    for (id, name, stats) in served.iter().take(limit) {
        println!(
            "  {}: {} ({} events, avg {:.2})",
            id, name, stats.nbr_success_count, stats.avg_nbr_success
        );
    }
}

/// Handle the 'tune' command
fn handle_tune(data_index: DataIndex, base: AlsConfig, ranks: &[usize], split_seed: u64) -> Result<()> {
    let splits = random_split(data_index.events(), &[6.0, 2.0, 2.0], split_seed)?;
    let (train, validation, test) = (&splits[0], &splits[1], &splits[2]);
    println!(
        "Split into {} training, {} validation and {} test events",
        train.len(),
        validation.len(),
        test.len()
    );

    let report = tune_rank(train, validation, ranks, base).context("Rank sweep failed")?;

    println!("{}", "Validation RMSE by rank:".bold().blue());
    for score in &report.scores {
        let rmse = score
            .rmse
            .map(|e| format!("{:.4}", e))
            .unwrap_or_else(|| "n/a".to_string());
        let marker = if score.rank == report.best_rank {
            "★".yellow().to_string()
        } else {
            " ".to_string()
        };
        println!("{} rank {:>3}: {}", marker, score.rank, rmse);
    }

    let model = AlsTrainer::new(base.with_rank(report.best_rank)).train(train)?;
    match rmse(&model, test) {
        Some(error) => println!(
            "{} For testing data the RMSE is {:.4} (rank {})",
            "✓".green(),
            error,
            report.best_rank
        ),
        None => println!("{} The model could score none of the test events", "✗".red()),
    }
    Ok(())
}

/// Print scored creatives as a ranked list
fn print_scored(title: &str, scored: &[ScoredCreative]) {
    println!("{}", format!("{}:", title).bold().blue());
    if scored.is_empty() {
        println!("  (none)");
        return;
    }
    for (i, s) in scored.iter().enumerate() {
        println!(
            "{}. {} [{}] - Predicted: {:.2} ({} events)",
            (i + 1).to_string().green(),
            s.creative_name,
            s.creative_id,
            s.predicted_nbr_success,
            s.nbr_success_count
        );
    }
}
