//! Seeding progress reporting.
//!
//! Workers push [`ProgressEvent`]s over an unbounded channel, so sending never
//! blocks a producer. A single reporter task folds them into a [`Progress`]
//! snapshot and hands it to a [`ProgressSink`] on a fixed cadence. The seeder
//! ends the reporter through a oneshot; the reporter then drains what is left
//! and emits one final snapshot.

use colored::Colorize;
use std::io::Write;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};

/// Default reporting cadence.
pub const REPORT_INTERVAL: Duration = Duration::from_millis(10);

/// What a worker tells the reporter after each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A save finished; `created` is false when the URL already had an entry.
    Saved { created: bool },
    /// A visit was recorded for the entry just saved.
    Visited,
}

/// Running totals for one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub target: usize,
    pub created: usize,
    pub existing: usize,
    pub visits: usize,
    /// Set only on the last snapshot of a run.
    pub finished: bool,
}

impl Progress {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Saves completed so far, new or not.
    pub fn completed(&self) -> usize {
        self.created + self.existing
    }

    /// Percent of the target completed, `100.0` for an empty target.
    pub fn percent(&self) -> f64 {
        if self.target == 0 {
            return 100.0;
        }
        self.completed() as f64 * 100.0 / self.target as f64
    }

    fn apply(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Saved { created: true } => self.created += 1,
            ProgressEvent::Saved { created: false } => self.existing += 1,
            ProgressEvent::Visited => self.visits += 1,
        }
    }
}

/// Destination for progress snapshots.
pub trait ProgressSink: Send + 'static {
    fn report(&mut self, progress: &Progress);
}

/// Rewrites a single terminal line with the current totals.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl ProgressSink for TerminalSink {
    fn report(&mut self, progress: &Progress) {
        let percent = format!("{:.2}%", progress.percent());
        let percent = if progress.finished {
            percent.bright_green().bold()
        } else {
            percent.bright_yellow()
        };

        print!(
            "\rEntries Seeded: {}, Duplicates (Already Existed): {}, Percent {}",
            progress.created.to_string().bright_white().bold(),
            progress.existing.to_string().bright_black(),
            percent
        );
        if progress.finished {
            println!();
        }
        let _ = std::io::stdout().flush();
    }
}

/// Handle to a running reporter task.
pub struct ProgressReporter {
    target: usize,
    events: mpsc::UnboundedSender<ProgressEvent>,
    done: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<Progress>,
}

impl ProgressReporter {
    /// Spawns a reporter for a run of `target` saves.
    pub fn spawn<S: ProgressSink>(target: usize, interval: Duration, sink: S) -> Self {
        let (events, rx) = mpsc::unbounded_channel();
        let (done, done_rx) = oneshot::channel();
        let task = tokio::spawn(run_reporter(target, interval, rx, done_rx, sink));

        Self {
            target,
            events,
            done,
            task,
        }
    }

    /// A sender for one worker.
    pub fn sender(&self) -> mpsc::UnboundedSender<ProgressEvent> {
        self.events.clone()
    }

    /// Signals completion and waits for the final snapshot.
    ///
    /// If the reporter task died, the counts are lost and an empty snapshot for
    /// the original target is returned, so the run never reads as complete.
    pub async fn finish(self) -> Progress {
        drop(self.events);
        let _ = self.done.send(());

        match self.task.await {
            Ok(progress) => progress,
            Err(e) => {
                tracing::error!(error = %e, "progress reporter failed");
                Progress {
                    finished: true,
                    ..Progress::new(self.target)
                }
            }
        }
    }
}

async fn run_reporter<S: ProgressSink>(
    target: usize,
    interval: Duration,
    mut rx: mpsc::UnboundedReceiver<ProgressEvent>,
    mut done: oneshot::Receiver<()>,
    mut sink: S,
) -> Progress {
    let mut progress = Progress::new(target);
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut open = true;

    loop {
        tokio::select! {
            _ = &mut done => break,
            event = rx.recv(), if open => match event {
                Some(event) => progress.apply(event),
                None => open = false,
            },
            _ = ticker.tick() => sink.report(&progress),
        }
    }

    while let Ok(event) = rx.try_recv() {
        progress.apply(event);
    }

    progress.finished = true;
    sink.report(&progress);
    progress
}
