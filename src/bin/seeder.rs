//! Bulk seeder for the configured entry store.
//!
//! Saves `count` random `https://example.com/<n>` URLs through the entry
//! service using `workers` concurrent tasks, printing a live progress line.
//!
//! # Usage
//!
//! ```bash
//! # 1000 entries, 4 workers (defaults)
//! cargo run --bin seeder
//!
//! # Truncate first, 50k entries, 16 workers, one visit per entry
//! cargo run --bin seeder -- --fresh -n 50000 -w 16 --visits
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `STORE_BACKEND`, `DATABASE_URL`, `MONGODB_URI`, ...
//! The memory backend works but is discarded when the process exits.

use getsit::application::seeder::{SeedOptions, TerminalSink, run_seed};
use getsit::application::services::EntryService;
use getsit::config::{self, StoreBackend};
use getsit::infrastructure::persistence::connect_repository;
use getsit::telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use dialoguer::Confirm;
use std::process::ExitCode;
use std::sync::Arc;

/// Seeds the url entry store with random entries.
#[derive(Parser)]
#[command(name = "seeder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of entries to save
    #[arg(short = 'n', long, default_value_t = 1000)]
    count: usize,

    /// Number of concurrent workers
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    workers: u16,

    /// Delete every entry before seeding
    #[arg(long)]
    fresh: bool,

    /// Record one visit for every saved entry
    #[arg(long)]
    visits: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    telemetry::init_tracing(&config.log_level, &config.log_format);

    println!("{}", "🌱 Seeding url entries".bright_blue().bold());
    println!("  Backend: {}", config.store_backend.to_string().cyan());
    println!("  Entries: {}", cli.count.to_string().cyan());
    println!("  Workers: {}", cli.workers.to_string().cyan());
    if config.store_backend == StoreBackend::Memory {
        println!(
            "{}",
            "⚠️  Memory backend: entries are lost when the seeder exits".yellow()
        );
    }
    println!();

    if cli.fresh && !cli.yes {
        let confirmed = Confirm::new()
            .with_prompt("Delete every existing entry before seeding?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(ExitCode::SUCCESS);
        }
    }

    let repository = connect_repository(&config)
        .await
        .context("Failed to open entry store")?;
    let service = Arc::new(EntryService::new(repository));

    let options = SeedOptions {
        total: cli.count,
        workers: usize::from(cli.workers),
        fresh: cli.fresh,
        record_visits: cli.visits,
        ..SeedOptions::default()
    };

    let report = run_seed(service, options, TerminalSink)
        .await
        .map_err(|e| anyhow::anyhow!("Seeding failed: {}", e))?;

    println!(
        "  Elapsed: {}",
        format!("{:.2?}", report.elapsed).bright_white()
    );
    if cli.visits {
        println!(
            "  Visits recorded: {}",
            report.progress.visits.to_string().bright_white()
        );
    }
    println!();

    if report.aborted_workers > 0 {
        println!(
            "{}",
            format!(
                "❌ {} worker(s) stopped on a store error",
                report.aborted_workers
            )
            .red()
            .bold()
        );
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", "✅ Seeding complete".green().bold());
    Ok(ExitCode::SUCCESS)
}
