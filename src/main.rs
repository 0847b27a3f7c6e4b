// src/main.rs

//! jobsync CLI
//!
//! Fetches postings from configured ATS sources, filters them against the
//! keyword policy, and reconciles them with the local job store.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};

use jobsync::{
    error::Result,
    filter::AdmissionFilter,
    models::AppConfig,
    pipeline::{self, FetchOrchestrator},
    sources::build_adapters,
    storage::{JobStore, LocalStore},
};

/// jobsync - ATS job posting aggregator
#[derive(Parser, Debug)]
#[command(name = "jobsync", version, about = "ATS job posting aggregator")]
struct Cli {
    /// Path to the data directory containing config.toml and jobs.json
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a full sync cycle: fetch, filter, reconcile, expire
    Sync,

    /// Fetch and filter only, printing admitted postings without touching
    /// the store
    Fetch,

    /// Expire stale records without fetching
    Expire,

    /// Validate configuration
    Validate,

    /// Show store statistics
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.data_dir.join("config.toml");
    let config = AppConfig::load_or_default(&config_path);

    match cli.command {
        Command::Sync => {
            config.validate()?;
            let store = Arc::new(LocalStore::open(&cli.data_dir).await?);
            let stats = pipeline::run_sync(&config, store).await?;
            log::info!("Sync complete: {} new postings", stats.new);
        }

        Command::Fetch => {
            config.validate()?;
            let filter = AdmissionFilter::new(&config.filter)?;
            let orchestrator = FetchOrchestrator::new(&config.crawler)?;
            let adapters = build_adapters(&config);

            let summary = orchestrator.run_all(&adapters).await;
            let mut admitted = 0;
            for posting in summary.postings.iter().filter(|p| filter.matches(p)) {
                admitted += 1;
                println!(
                    "[{}] {} - {} ({})",
                    posting.source, posting.company, posting.title, posting.url
                );
            }
            log::info!(
                "{} of {} postings admitted, {} sources failed",
                admitted,
                summary.postings.len(),
                summary.sources_failed()
            );
        }

        Command::Expire => {
            config.validate()?;
            let store: Arc<dyn JobStore> = Arc::new(LocalStore::open(&cli.data_dir).await?);
            let reconciler = pipeline::Reconciler::new(store);
            let expired = reconciler
                .expire(Utc::now().date_naive(), config.crawler.retention_days)
                .await?;
            log::info!("Expired {} stale records", expired);
        }

        Command::Validate => {
            config.validate()?;
            AdmissionFilter::new(&config.filter)?;
            log::info!(
                "Config OK: {} sources, retention {} days",
                config.sources.len(),
                config.crawler.retention_days
            );
        }

        Command::Info => {
            let store = LocalStore::open(&cli.data_dir).await?;
            let stale_cutoff = Utc::now().date_naive()
                - chrono::Duration::days(i64::from(config.crawler.retention_days));
            let expiring = store.find_active_last_seen_before(stale_cutoff).await?;

            let mut active = store.find_active().await?;
            active.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));

            log::info!("Store: {}", cli.data_dir.join("jobs.json").display());
            log::info!("Active records: {}", active.len());
            log::info!("Records past retention: {}", expiring.len());
            for record in active.iter().take(10) {
                println!(
                    "[{}] {} - {} (last seen {}, {})",
                    record.source, record.company, record.title, record.last_seen, record.status
                );
            }
        }
    }

    Ok(())
}
