//! Batch runner: one session per configured day.
//!
//! RULES:
//!   - Days run one at a time, in index order, to completion.
//!   - Each day owns its RNG stream (`RngBank::for_day`); nothing
//!     mutable is shared between days.
//!   - Chunking is a scheduling concern only. Any chunk size yields
//!     the same results in the same order.

use crate::{
    config::SimulationConfig,
    rng::RngBank,
    session::{simulate_day, DayResult},
    types::DayIndex,
};
use serde::{Deserialize, Serialize};

/// Batches above this many days are split into chunks by default.
pub const CHUNKING_THRESHOLD_DAYS: u64 = 1_000;
pub const DEFAULT_CHUNK_DAYS: u64 = 100;

/// Where a batch stands after a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub days_done:  u64,
    pub days_total: u64,
}

impl BatchProgress {
    pub fn is_complete(&self) -> bool {
        self.days_done >= self.days_total
    }

    /// Whole-number percentage, rounded.
    pub fn percent(&self) -> u64 {
        if self.days_total == 0 {
            return 100;
        }
        (self.days_done * 100 + self.days_total / 2) / self.days_total
    }
}

pub struct BatchRunner {
    config:     SimulationConfig,
    rng_bank:   RngBank,
    chunk_size: u64,
    next_day:   DayIndex,
    results:    Vec<DayResult>,
}

impl BatchRunner {
    /// Panics if `config` is not a validated config.
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        assert!(config.is_valid(), "batch started with an unvalidated config");
        let chunk_size = default_chunk_size(config.days);
        Self {
            results:  Vec::with_capacity(config.days as usize),
            rng_bank: RngBank::new(seed),
            chunk_size,
            next_day: 0,
            config,
        }
    }

    /// Override the chunk size. Values below 1 are treated as 1.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng_bank.master_seed()
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn progress(&self) -> BatchProgress {
        BatchProgress {
            days_done:  self.next_day,
            days_total: self.config.days,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress().is_complete()
    }

    /// Results produced so far, in day order.
    pub fn results(&self) -> &[DayResult] {
        &self.results
    }

    /// Run the next day. Returns `None` once every day has run.
    pub fn step(&mut self) -> Option<&DayResult> {
        if self.is_complete() {
            return None;
        }
        let day = self.next_day;
        let mut rng = self.rng_bank.for_day(day);
        let result = simulate_day(&self.config, &mut rng);

        log::debug!(
            "day={} spins={} hits={} streaks={} max_streak={} payout={} profit={}",
            day + 1,
            result.spins,
            result.total_hits,
            result.streaks.len(),
            result.max_streak,
            result.payout_balls,
            result.profit_yen
        );

        self.results.push(result);
        self.next_day += 1;
        self.results.last()
    }

    /// Run up to one chunk of days. This is the cooperative yield point:
    /// callers regain control between chunks.
    pub fn run_chunk(&mut self) -> BatchProgress {
        for _ in 0..self.chunk_size {
            if self.step().is_none() {
                break;
            }
        }
        let progress = self.progress();
        log::debug!(
            "chunk done: {}/{} days ({}%)",
            progress.days_done,
            progress.days_total,
            progress.percent()
        );
        progress
    }

    /// Run every remaining chunk, calling `on_chunk` after each one.
    pub fn run_with_progress<F>(&mut self, mut on_chunk: F)
    where
        F: FnMut(&BatchProgress),
    {
        log::info!(
            "batch started: days={} seed={} chunk={}",
            self.config.days,
            self.seed(),
            self.chunk_size
        );
        while !self.is_complete() {
            let progress = self.run_chunk();
            on_chunk(&progress);
        }
        log::info!("batch finished: {} days", self.results.len());
    }

    /// Run everything and hand back the results in day order.
    pub fn run_to_completion(mut self) -> Vec<DayResult> {
        self.run_with_progress(|_| {});
        self.results
    }

    pub fn into_results(self) -> Vec<DayResult> {
        self.results
    }
}

/// Whole batch at once for ordinary sizes, fixed chunks beyond that.
pub fn default_chunk_size(days: u64) -> u64 {
    if days > CHUNKING_THRESHOLD_DAYS {
        DEFAULT_CHUNK_DAYS
    } else {
        days.max(1)
    }
}

/// Convenience: run a validated config to completion.
pub fn run_batch(config: &SimulationConfig, seed: u64) -> Vec<DayResult> {
    BatchRunner::new(config.clone(), seed).run_to_completion()
}
