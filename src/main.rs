//! # Signal Scout CLI (`scout`)
//!
//! The `scout` binary is the primary interface for Signal Scout. It
//! provides commands for database initialization, source collection, the
//! full scoring/clustering engine run, daily report generation, and the
//! job HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! scout --config ./config/scout.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scout init` | Create the SQLite database and run schema migrations |
//! | `scout sources` | List configured sources and stored item counts |
//! | `scout collect` | Pull from every configured source, dedup, persist |
//! | `scout engine` | Full run: collect, score, cluster, correlate |
//! | `scout report` | Write (or overwrite) the daily report snapshot |
//! | `scout serve` | Start the job HTTP server |

mod cluster;
mod collector_codehost;
mod collector_forum;
mod collector_websearch;
mod config;
mod correlate;
mod db;
mod dedup;
mod engine;
mod keywords;
mod llm;
mod migrate;
mod models;
mod report;
mod scoring;
mod server;
mod sources;
mod store;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Signal Scout — a batch pipeline for discovering, scoring, and
/// correlating startup-idea mentions across public sources.
#[derive(Parser)]
#[command(
    name = "scout",
    about = "Signal Scout — discover, score, and correlate startup-idea mentions",
    version,
    long_about = "Signal Scout collects candidate startup-idea mentions from configured \
    text sources (forum APIs, code-host search, web-search proxies), scores them with a \
    multi-factor relevance model, clusters recent items into cross-platform trends, and \
    rolls everything up into daily report snapshots."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/scout.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables (items,
    /// correlations, daily_reports, category_trends, alerts). Idempotent.
    Init,

    /// List configured sources and stored item counts.
    Sources,

    /// Collect from every configured source.
    ///
    /// Runs each source's queries, applies the discovery allow-list,
    /// deduplicates against stored items, and persists the rest.
    Collect,

    /// Run the full intelligence engine.
    ///
    /// Collects, scores every unscored item, clusters the look-back
    /// window, and writes correlation records. Per-source and per-item
    /// failures are reported in the outcome counters without aborting.
    Engine {
        /// Mark this run as manually triggered (informational).
        #[arg(long)]
        manual: bool,
    },

    /// Write the daily report snapshot.
    ///
    /// Selects top ideas and special mentions, writes per-category trend
    /// rows and high-score alerts, and upserts the snapshot for the date
    /// (rerunning overwrites).
    Report {
        /// Report date (YYYY-MM-DD); defaults to today (UTC).
        #[arg(long)]
        date: Option<String>,
    },

    /// Start the job HTTP server.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sources => {
            sources::list_sources(&cfg).await?;
        }
        Commands::Collect => {
            let pool = db::connect(&cfg).await?;
            engine::run_collect(&cfg, &pool).await?;
            pool.close().await;
        }
        Commands::Engine { manual } => {
            let pool = db::connect(&cfg).await?;
            engine::run_engine(&cfg, &pool, manual).await?;
            pool.close().await;
        }
        Commands::Report { date } => {
            let date = match date {
                Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")?,
                None => chrono::Utc::now().date_naive(),
            };
            let pool = db::connect(&cfg).await?;
            report::generate_daily_report(&cfg, &pool, date).await?;
            pool.close().await;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
