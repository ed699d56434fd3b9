//! Bulk population of the store with synthetic entries.
//!
//! The seeder splits a target count across a fixed number of workers. Each
//! worker saves `https://example.com/<random>` URLs through the
//! [`EntryService`], optionally recording a visit for every saved entry.
//! Workers share nothing but the service; token uniqueness is left to the
//! repository.
//!
//! A worker stops at its first store failure. The other workers keep going and
//! the failure is reported in [`SeedReport::aborted_workers`].

pub mod progress;

use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::application::services::EntryService;
use crate::domain::repositories::EntryRepository;
use crate::error::AppError;

pub use progress::{
    Progress, ProgressEvent, ProgressReporter, ProgressSink, REPORT_INTERVAL, TerminalSink,
};

/// Host used for every synthetic URL.
pub const SEED_URL_PREFIX: &str = "https://example.com/";

/// Exclusive upper bound of the random path segment.
const SEED_SUFFIX_RANGE: u64 = 1_000_000_000_000_000_000;

/// Parameters for one seeding run.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Total number of saves to attempt.
    pub total: usize,
    /// Number of concurrent workers; clamped to at least one.
    pub workers: usize,
    /// Truncate the store before seeding.
    pub fresh: bool,
    /// Record one visit for each saved entry.
    pub record_visits: bool,
    /// How often the reporter emits a snapshot.
    pub report_interval: Duration,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            total: 1000,
            workers: 4,
            fresh: false,
            record_visits: false,
            report_interval: REPORT_INTERVAL,
        }
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub progress: Progress,
    /// Workers that stopped early on a store error.
    pub aborted_workers: usize,
    pub elapsed: Duration,
}

impl SeedReport {
    pub fn is_complete(&self) -> bool {
        self.aborted_workers == 0 && self.progress.completed() == self.progress.target
    }
}

/// Splits `total` across `workers`, giving the remainder to the first workers.
pub fn split_work(total: usize, workers: usize) -> Vec<usize> {
    let workers = workers.max(1);
    let base = total / workers;
    let extra = total % workers;

    (0..workers).map(|i| base + usize::from(i < extra)).collect()
}

/// Builds a random `https://example.com/<n>` URL.
pub fn synthetic_url() -> String {
    let suffix = rand::rng().random_range(0..SEED_SUFFIX_RANGE);
    format!("{SEED_URL_PREFIX}{suffix}")
}

/// Seeds the store behind `service`.
///
/// # Errors
///
/// Returns an error only if truncating a `fresh` run fails. Worker failures do
/// not fail the run; they are counted in the report.
pub async fn run_seed<R, S>(
    service: Arc<EntryService<R>>,
    options: SeedOptions,
    sink: S,
) -> Result<SeedReport, AppError>
where
    R: EntryRepository + ?Sized + 'static,
    S: ProgressSink,
{
    if options.fresh {
        service.truncate().await?;
    }

    let shares = split_work(options.total, options.workers);
    tracing::info!(
        total = options.total,
        workers = shares.len(),
        record_visits = options.record_visits,
        "Seeding url entries with random tokens"
    );

    let started = Instant::now();
    let reporter = ProgressReporter::spawn(options.total, options.report_interval, sink);

    let mut workers = JoinSet::new();
    for (worker, share) in shares.into_iter().enumerate() {
        workers.spawn(run_worker(
            worker,
            share,
            options.record_visits,
            service.clone(),
            reporter.sender(),
        ));
    }

    let mut aborted_workers = 0;
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(_)) => aborted_workers += 1,
            Err(e) => {
                tracing::error!(error = %e, "seed worker panicked");
                aborted_workers += 1;
            }
        }
    }

    let progress = reporter.finish().await;
    let elapsed = started.elapsed();

    tracing::info!(
        created = progress.created,
        existing = progress.existing,
        visits = progress.visits,
        aborted_workers,
        elapsed_ms = elapsed.as_millis() as u64,
        "Seeding finished"
    );

    Ok(SeedReport {
        progress,
        aborted_workers,
        elapsed,
    })
}

async fn run_worker<R>(
    worker: usize,
    share: usize,
    record_visits: bool,
    service: Arc<EntryService<R>>,
    events: mpsc::UnboundedSender<ProgressEvent>,
) -> Result<(), AppError>
where
    R: EntryRepository + ?Sized,
{
    for _ in 0..share {
        let saved = match service.save_url(&synthetic_url()).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::error!(worker, error = %e, "seed worker aborted");
                return Err(e);
            }
        };
        let _ = events.send(ProgressEvent::Saved {
            created: saved.created,
        });

        if record_visits {
            if let Err(e) = service.record_visit(saved.entry.token.as_str()).await {
                tracing::error!(worker, error = %e, "seed worker aborted");
                return Err(e);
            }
            let _ = events.send(ProgressEvent::Visited);
        }
    }

    Ok(())
}
