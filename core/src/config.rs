use crate::{
    error::SimResult,
    types::{Balls, Yen},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

// ── Policy tables ──────────────────────────────────────────────────
// Input domains accepted by the validator. A conforming front end
// offers exactly these options.

/// Cost per ball: 1-yen and 4-yen machines.
pub const BET_UNITS_YEN: [Yen; 2] = [1, 4];
pub const DAILY_BUDGET_RANGE_YEN: (Yen, Yen) = (100, 1_000_000);
pub const DAYS_RANGE: (u64, u64) = (1, 1_000);
/// Normal-state hit odds, as the x in 1/x.
pub const BASE_HIT_DENOMINATORS: [u32; 3] = [319, 199, 99];
pub const BONUS_ENTRY_PERCENTS: [u32; 4] = [50, 60, 70, 80];
/// Bonus-state hit odds, as the y in 1/y.
pub const BONUS_HIT_DENOMINATORS: [u32; 7] = [30, 40, 50, 60, 70, 80, 90];
pub const CONTINUATION_PERCENT_RANGE: (u32, u32) = (1, 100);
/// 0 disables the time-limited state; otherwise this range applies.
pub const TIME_LIMITED_SPINS_RANGE: (u64, u64) = (10, 1_000);

// Machine behaviour, swappable through `MachinePolicy`.

/// Balls paid out per hit, drawn uniformly.
pub const PAYOUT_TABLE_BALLS: [Balls; 4] = [400, 600, 1000, 1500];
/// Balls consumed per spin, redrawn once per day.
pub const BALLS_PER_SPIN_TABLE: [Balls; 3] = [4, 5, 6];
/// Target count of retained progress samples per day.
pub const PROGRESS_SAMPLE_BUDGET: u64 = 1_000;

/// Which continuation model the bonus state uses, carrying its rate.
/// Holding the rate inside the variant makes "both" and "neither"
/// unrepresentable once a config exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "rate", rename_all = "snake_case")]
pub enum ContinuationMode {
    St(f64),
    Loop(f64),
}

impl ContinuationMode {
    pub fn rate(&self) -> f64 {
        match self {
            Self::St(rate) | Self::Loop(rate) => *rate,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::St(_)   => "ST",
            Self::Loop(_) => "LOOP",
        }
    }
}

/// Machine behaviour tables. Replacing these never touches the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachinePolicy {
    pub payout_table_balls: Vec<Balls>,
    pub balls_per_spin_table: Vec<Balls>,
    pub progress_sample_budget: u64,
}

impl Default for MachinePolicy {
    fn default() -> Self {
        Self {
            payout_table_balls:     PAYOUT_TABLE_BALLS.to_vec(),
            balls_per_spin_table:   BALLS_PER_SPIN_TABLE.to_vec(),
            progress_sample_budget: PROGRESS_SAMPLE_BUDGET,
        }
    }
}

impl MachinePolicy {
    pub fn is_valid(&self) -> bool {
        !self.payout_table_balls.is_empty()
            && !self.balls_per_spin_table.is_empty()
            && self.balls_per_spin_table.iter().all(|b| *b > 0)
            && self.progress_sample_budget > 0
    }
}

/// A validated, immutable simulation configuration.
///
/// Build one through `validate::validate`. Sessions assert `is_valid()`
/// before running; a config that fails it is a caller bug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub bet_unit_yen:            Yen,
    pub daily_budget_yen:        Yen,
    pub days:                    u64,
    pub base_hit_probability:    f64,
    pub bonus_entry_probability: f64,
    pub bonus_hit_probability:   f64,
    pub continuation:            ContinuationMode,
    /// 0 disables the time-limited state.
    pub time_limited_spins:      u64,
    #[serde(default)]
    pub policy:                  MachinePolicy,
}

impl SimulationConfig {
    /// Balls bought with one day's budget.
    pub fn balls_per_day(&self) -> Balls {
        self.daily_budget_yen / self.bet_unit_yen
    }

    pub fn time_limited_enabled(&self) -> bool {
        self.time_limited_spins > 0
    }

    /// Structural check of the validated-config contract.
    pub fn is_valid(&self) -> bool {
        let unit = |p: f64| p > 0.0 && p <= 1.0;
        self.bet_unit_yen > 0
            && self.daily_budget_yen > 0
            && self.days > 0
            && unit(self.base_hit_probability)
            && unit(self.bonus_entry_probability)
            && unit(self.bonus_hit_probability)
            && unit(self.continuation.rate())
            && self.policy.is_valid()
    }

    /// Config with hardcoded defaults for use in unit tests.
    /// 4-yen machine, 1/319 base odds, 60% entry, 1/60 bonus odds,
    /// ST 80%, 100 time-limited spins, one day of 1,000 yen.
    pub fn default_test() -> Self {
        Self {
            bet_unit_yen:            4,
            daily_budget_yen:        1_000,
            days:                    1,
            base_hit_probability:    1.0 / 319.0,
            bonus_entry_probability: 0.60,
            bonus_hit_probability:   1.0 / 60.0,
            continuation:            ContinuationMode::St(0.80),
            time_limited_spins:      100,
            policy:                  MachinePolicy::default(),
        }
    }
}

/// Raw scalars as a front end supplies them, before validation.
/// Every field is optional; the validator decides what is missing.
/// JSON values may be numbers, numeric strings, `""` or `null`; anything
/// that does not parse to a finite number is read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInput {
    #[serde(deserialize_with = "lenient_scalar")]
    pub bet_unit_yen:              Option<f64>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub daily_budget_yen:          Option<f64>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub days:                      Option<f64>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub base_hit_denominator:      Option<f64>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub bonus_entry_percent:       Option<f64>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub bonus_hit_denominator:     Option<f64>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub st_continuation_percent:   Option<f64>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub loop_continuation_percent: Option<f64>,
    #[serde(deserialize_with = "lenient_scalar")]
    pub time_limited_spins:        Option<f64>,
}

impl RawInput {
    /// Load a raw input record from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let raw: RawInput = serde_json::from_str(&content)?;
        Ok(raw)
    }

    /// Build from `key = value` string pairs, e.g. form fields.
    /// Unknown keys are ignored; unparsable values stay absent.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut raw = RawInput::default();
        for (key, value) in pairs {
            raw.set(key, value);
        }
        raw
    }

    /// Set one field from its string form. Returns false for an unknown key.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let parsed = parse_finite(value);
        let slot = match key {
            "bet_unit_yen"              => &mut self.bet_unit_yen,
            "daily_budget_yen"          => &mut self.daily_budget_yen,
            "days"                      => &mut self.days,
            "base_hit_denominator"      => &mut self.base_hit_denominator,
            "bonus_entry_percent"       => &mut self.bonus_entry_percent,
            "bonus_hit_denominator"     => &mut self.bonus_hit_denominator,
            "st_continuation_percent"   => &mut self.st_continuation_percent,
            "loop_continuation_percent" => &mut self.loop_continuation_percent,
            "time_limited_spins"        => &mut self.time_limited_spins,
            _ => return false,
        };
        *slot = parsed;
        true
    }

    /// The scenario config from `SimulationConfig::default_test`, in raw form.
    pub fn default_test() -> Self {
        Self {
            bet_unit_yen:              Some(4.0),
            daily_budget_yen:          Some(1_000.0),
            days:                      Some(1.0),
            base_hit_denominator:      Some(319.0),
            bonus_entry_percent:       Some(60.0),
            bonus_hit_denominator:     Some(60.0),
            st_continuation_percent:   Some(80.0),
            loop_continuation_percent: None,
            time_limited_spins:        Some(100.0),
        }
    }
}

fn lenient_scalar<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Number(v)) => Some(v).filter(|v| v.is_finite()),
        Some(Scalar::Text(text)) => parse_finite(&text),
        None => None,
    })
}

fn parse_finite(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
