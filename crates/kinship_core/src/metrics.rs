//! Pipeline metrics and structured logging.
//!
//! Counters are diagnostic only; nothing in the simulation reads them back.

use kinship_data::ContagionStats;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Runs between two `info` summaries.
const SUMMARY_EVERY: u64 = 100;

/// Running totals across contagion pipeline runs.
pub struct Metrics {
    runs: AtomicU64,
    skipped_ticks: AtomicU64,
    proposals_applied: AtomicU64,
    neutral_resets: AtomicU64,
    agent_count: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            runs: AtomicU64::new(0),
            skipped_ticks: AtomicU64::new(0),
            proposals_applied: AtomicU64::new(0),
            neutral_resets: AtomicU64::new(0),
            agent_count: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed pipeline run.
    pub fn record_run(&self, stats: &ContagionStats, duration: Duration) {
        let run = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
        self.agent_count.store(stats.agents as u64, Ordering::Relaxed);
        self.proposals_applied
            .fetch_add(stats.applied as u64, Ordering::Relaxed);
        self.neutral_resets
            .fetch_add(stats.reset_to_neutral as u64, Ordering::Relaxed);

        tracing::debug!(
            run,
            agents = stats.agents,
            candidates = stats.candidates,
            rolls_won = stats.rolls_won,
            applied = stats.applied,
            reset_to_neutral = stats.reset_to_neutral,
            duration_us = duration.as_micros() as u64,
            "contagion pass"
        );

        if run % SUMMARY_EVERY == 0 {
            tracing::info!(
                runs = run,
                agents = stats.agents,
                applied_total = self.proposals_applied(),
                resets_total = self.neutral_resets(),
                "contagion summary"
            );
        }
    }

    /// Records a tick that the throttle turned into a no-op.
    pub fn record_skip(&self) {
        self.skipped_ticks.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn skipped_ticks(&self) -> u64 {
        self.skipped_ticks.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn proposals_applied(&self) -> u64 {
        self.proposals_applied.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn neutral_resets(&self) -> u64 {
        self.neutral_resets.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn agent_count(&self) -> u64 {
        self.agent_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs a global fmt subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
