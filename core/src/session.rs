//! Session simulator: one independent day of play.
//!
//! STATE MACHINE:
//!   Normal ──hit, entry──────────────▶ Bonus
//!   Normal ──hit, no entry──────────▶ TimeLimited (or Normal + close streak)
//!   TimeLimited ──hit───────────────▶ same as a Normal hit
//!   TimeLimited ──miss, countdown 0─▶ Normal + close streak
//!   Bonus ──hit, continue───────────▶ Bonus
//!   Bonus ──hit, no continue────────▶ TimeLimited (or Normal + close streak)
//!
//! There is no terminal state. The day ends when the spin budget runs
//! out, and any open streak is closed at that point.
//!
//! RULES:
//!   - Bonus spins use the bonus hit probability; every other state
//!     (including TimeLimited) uses the base probability.
//!   - Hits in Normal and TimeLimited count as normal hits.
//!   - All randomness comes from the caller's `RandomSource`.

use crate::{
    config::{ContinuationMode, SimulationConfig},
    rng::RandomSource,
    types::{Balls, ProfitYen, Spin},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlayState {
    Normal,
    /// Elevated odds. ST and LOOP behave identically apart from the rate.
    Bonus { mode: ContinuationMode },
    /// Base odds for a bounded number of misses.
    TimeLimited { spins_left: u64 },
}

impl PlayState {
    pub fn is_bonus(&self) -> bool {
        matches!(self, Self::Bonus { .. })
    }

    pub fn is_time_limited(&self) -> bool {
        matches!(self, Self::TimeLimited { .. })
    }
}

/// What happened on a single spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinOutcome {
    Miss,
    NormalHit { payout: Balls },
    BonusHit { payout: Balls },
}

/// The outcome of one simulated day. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayResult {
    /// Balls consumed per spin on this day (redrawn daily).
    pub balls_per_spin:       Balls,
    pub spins:                Spin,
    pub total_hits:           u64,
    pub normal_hits:          u64,
    pub bonus_hits:           u64,
    pub bonus_entries:        u64,
    pub time_limited_entries: u64,
    /// Closed streak lengths in the order they closed. Every entry is ≥ 1.
    pub streaks:              Vec<u64>,
    pub max_streak:           u64,
    pub payout_balls:         Balls,
    pub profit_yen:           ProfitYen,
    /// Cumulative payout, sampled every `sample_cadence` spins plus the last spin.
    pub payout_progress:      Vec<Balls>,
    /// Cumulative profit, sampled alongside `payout_progress`.
    pub profit_progress:      Vec<ProfitYen>,
}

/// Spin count for a day: balls bought, divided by balls per spin.
pub fn spins_for_day(config: &SimulationConfig, balls_per_spin: Balls) -> Spin {
    config.balls_per_day() / balls_per_spin
}

/// Spins between progress samples: `max(1, floor(spins / budget))`.
/// Keeps roughly `budget` samples and never `2 * budget` or more;
/// the last spin is sampled on top of the cadence.
pub fn sample_cadence(total_spins: Spin, budget: u64) -> Spin {
    (total_spins / budget.max(1)).max(1)
}

/// One day's in-flight state. Drive it with `spin()` and close it with
/// `finish()`, or let `simulate_day` do both.
pub struct SessionSimulator<'a> {
    config:         &'a SimulationConfig,
    state:          PlayState,
    total_spins:    Spin,
    spins_done:     Spin,
    cadence:        Spin,
    open_streak:    u64,
    result:         DayResult,
}

impl<'a> SessionSimulator<'a> {
    /// Start a day. Draws the day's balls-per-spin from `rng`.
    ///
    /// Panics if `config` is not a validated config.
    pub fn new<R: RandomSource>(config: &'a SimulationConfig, rng: &mut R) -> Self {
        assert!(config.is_valid(), "session started with an unvalidated config");

        let balls_per_spin = rng.pick(&config.policy.balls_per_spin_table);
        let total_spins = spins_for_day(config, balls_per_spin);
        let cadence = sample_cadence(total_spins, config.policy.progress_sample_budget);

        Self {
            config,
            state: PlayState::Normal,
            total_spins,
            spins_done: 0,
            cadence,
            open_streak: 0,
            result: DayResult {
                balls_per_spin,
                spins: 0,
                total_hits: 0,
                normal_hits: 0,
                bonus_hits: 0,
                bonus_entries: 0,
                time_limited_entries: 0,
                streaks: Vec::new(),
                max_streak: 0,
                payout_balls: 0,
                profit_yen: -(config.daily_budget_yen as ProfitYen),
                payout_progress: Vec::new(),
                profit_progress: Vec::new(),
            },
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn total_spins(&self) -> Spin {
        self.total_spins
    }

    pub fn spins_remaining(&self) -> Spin {
        self.total_spins - self.spins_done
    }

    /// Hits in the streak that has not closed yet.
    pub fn open_streak(&self) -> u64 {
        self.open_streak
    }

    /// Play one spin. Returns `None` once the day's spins are used up.
    pub fn spin<R: RandomSource>(&mut self, rng: &mut R) -> Option<SpinOutcome> {
        if self.spins_done >= self.total_spins {
            return None;
        }
        self.spins_done += 1;

        let p_hit = if self.state.is_bonus() {
            self.config.bonus_hit_probability
        } else {
            self.config.base_hit_probability
        };

        let outcome = if rng.chance(p_hit) {
            let payout = rng.pick(&self.config.policy.payout_table_balls);
            self.result.total_hits += 1;
            self.result.payout_balls += payout;
            self.open_streak += 1;

            match self.state {
                PlayState::Normal | PlayState::TimeLimited { .. } => {
                    self.result.normal_hits += 1;
                    if rng.chance(self.config.bonus_entry_probability) {
                        self.result.bonus_entries += 1;
                        self.transition(PlayState::Bonus { mode: self.config.continuation });
                    } else {
                        self.fall_back();
                    }
                    SpinOutcome::NormalHit { payout }
                }
                PlayState::Bonus { mode } => {
                    self.result.bonus_hits += 1;
                    if !rng.chance(mode.rate()) {
                        self.fall_back();
                    }
                    SpinOutcome::BonusHit { payout }
                }
            }
        } else {
            if let PlayState::TimeLimited { spins_left } = self.state {
                let spins_left = spins_left.saturating_sub(1);
                if spins_left == 0 {
                    self.transition(PlayState::Normal);
                    self.close_streak();
                } else {
                    self.state = PlayState::TimeLimited { spins_left };
                }
            }
            SpinOutcome::Miss
        };

        if self.spins_done.is_multiple_of(self.cadence) || self.spins_done == self.total_spins {
            self.sample();
        }

        Some(outcome)
    }

    /// Close any open streak and hand back the day's result. Finishing
    /// early records only the spins actually played.
    pub fn finish(mut self) -> DayResult {
        self.close_streak();
        self.result.spins = self.spins_done;
        self.result.profit_yen = self.profit();
        self.result
    }

    /// Non-continuing hit: enter TimeLimited if configured, else close out.
    fn fall_back(&mut self) {
        if self.config.time_limited_enabled() {
            self.result.time_limited_entries += 1;
            self.transition(PlayState::TimeLimited {
                spins_left: self.config.time_limited_spins,
            });
        } else {
            self.transition(PlayState::Normal);
            self.close_streak();
        }
    }

    fn close_streak(&mut self) {
        if self.open_streak > 0 {
            self.result.streaks.push(self.open_streak);
            self.result.max_streak = self.result.max_streak.max(self.open_streak);
            self.open_streak = 0;
        }
    }

    fn transition(&mut self, next: PlayState) {
        log::trace!(
            "spin={} {:?} -> {:?} (streak {})",
            self.spins_done,
            self.state,
            next,
            self.open_streak
        );
        self.state = next;
    }

    fn profit(&self) -> ProfitYen {
        (self.result.payout_balls * self.config.bet_unit_yen) as ProfitYen
            - self.config.daily_budget_yen as ProfitYen
    }

    fn sample(&mut self) {
        self.result.payout_progress.push(self.result.payout_balls);
        let profit = self.profit();
        self.result.profit_progress.push(profit);
    }
}

/// Run one complete day with the given random source.
pub fn simulate_day<R: RandomSource>(config: &SimulationConfig, rng: &mut R) -> DayResult {
    let mut session = SessionSimulator::new(config, rng);
    while session.spin(rng).is_some() {}
    session.finish()
}
