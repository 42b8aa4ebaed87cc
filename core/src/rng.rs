//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through a `RandomSource` handed to the session
//! by its caller. The batch runner derives one `SessionRng` per day
//! from a single master seed:
//!   - Each day's stream depends only on (master_seed, day_index).
//!   - Running days in chunks, or in a different grouping, never
//!     changes any day's draws.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::types::DayIndex;

/// The draws a session needs. Implemented by `SessionRng` for real runs;
/// tests implement it to script outcomes.
pub trait RandomSource {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Roll a u64 in [0, n).
    fn next_u64_below(&mut self, n: u64) -> u64;

    /// Bernoulli trial: returns true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick one entry uniformly. Panics on an empty table.
    fn pick<T: Copy>(&mut self, table: &[T]) -> T
    where
        Self: Sized,
    {
        assert!(!table.is_empty(), "pick() from an empty table");
        table[self.next_u64_below(table.len() as u64) as usize]
    }
}

/// A seeded PCG stream for one simulated day.
pub struct SessionRng {
    inner: Pcg64Mcg,
}

impl SessionRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self { inner: Pcg64Mcg::seed_from_u64(seed) }
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

impl RandomSource for SessionRng {
    fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }
}

/// Per-day RNG streams for a single batch, all derived from one seed.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_day(&self, day: DayIndex) -> SessionRng {
        // +1 keeps day 0 from reusing the bare master seed.
        let derived_seed =
            self.master_seed ^ (day.wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15));
        SessionRng::seed_from_u64(derived_seed)
    }
}
