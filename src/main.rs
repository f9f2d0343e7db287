mod cluster;
mod config;
mod export;
mod features;
mod feedback;
mod inference;
mod ingest;
mod kmeans;
mod lexicons;
mod models;
mod orchestrator;
mod patterns;
mod period;
mod prompts;
mod render;
mod sentiment;
mod tfidf;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

use config::{EngineConfig, PeriodFrequency};

/// Journal Insights - structured psychological signal from free-text journals
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input CSV with at least a `text` column (plus optional text_clean,
    /// emotion, bias/distortion, context, date)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of text-theme (quirk) clusters
    #[arg(long)]
    quirk_clusters: Option<usize>,

    /// Override the number of trait-based peer groups
    #[arg(long)]
    peer_clusters: Option<usize>,

    /// Override the aggregation period
    #[arg(long, value_enum)]
    frequency: Option<PeriodFrequency>,

    /// Override the clustering seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting journal-insights");

    let args = Args::parse();

    let mut cfg = EngineConfig::load(args.config.as_deref())?;
    if let Some(k) = args.quirk_clusters {
        debug!("CLI override - n_clusters_quirk={}", k);
        cfg.n_clusters_quirk = k;
    }
    if let Some(k) = args.peer_clusters {
        debug!("CLI override - n_clusters_peer={}", k);
        cfg.n_clusters_peer = k;
    }
    if let Some(freq) = args.frequency {
        debug!("CLI override - period_frequency={}", freq);
        cfg.period_frequency = freq;
    }
    if let Some(seed) = args.seed {
        debug!("CLI override - kmeans_seed={}", seed);
        cfg.kmeans_seed = seed;
    }

    orchestrator::run_batch(&cfg, &args.input, &args.output_dir)
}
