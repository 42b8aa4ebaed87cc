//! Configuration validator: raw scalars in, `SimulationConfig` out.
//!
//! RULE ORDER (first failure wins):
//!   1. Every required field is present and finite   → MissingField
//!   2. Exactly one continuation rate is set          → Both/NoContinuationModeSet
//!   3. Every field lies in its domain                → OutOfRange
//!
//! The validator only classifies. Surfacing the message is the caller's job.

use crate::{
    config::{
        ContinuationMode, MachinePolicy, RawInput, SimulationConfig, BASE_HIT_DENOMINATORS,
        BET_UNITS_YEN, BONUS_ENTRY_PERCENTS, BONUS_HIT_DENOMINATORS, CONTINUATION_PERCENT_RANGE,
        DAILY_BUDGET_RANGE_YEN, DAYS_RANGE, TIME_LIMITED_SPINS_RANGE,
    },
    error::{SimResult, ValidationError},
};
use std::path::Path;

/// Load a raw input JSON file and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> SimResult<SimulationConfig> {
    let raw = RawInput::load(path)?;
    Ok(validate(&raw)?)
}

/// Validate with the default machine policy.
pub fn validate(raw: &RawInput) -> Result<SimulationConfig, ValidationError> {
    validate_with_policy(raw, MachinePolicy::default())
}

pub fn validate_with_policy(
    raw: &RawInput,
    policy: MachinePolicy,
) -> Result<SimulationConfig, ValidationError> {
    // ── Rule 1: required fields ────────────────────────────────
    let bet_unit_yen       = required(raw.bet_unit_yen, "bet_unit_yen")?;
    let daily_budget_yen   = required(raw.daily_budget_yen, "daily_budget_yen")?;
    let days               = required(raw.days, "days")?;
    let base_hit           = required(raw.base_hit_denominator, "base_hit_denominator")?;
    let bonus_entry        = required(raw.bonus_entry_percent, "bonus_entry_percent")?;
    let bonus_hit          = required(raw.bonus_hit_denominator, "bonus_hit_denominator")?;
    let time_limited_spins = required(raw.time_limited_spins, "time_limited_spins")?;

    // ── Rule 2: exactly one continuation mode ─────────────────
    let st   = continuation_percent(raw.st_continuation_percent);
    let loop_ = continuation_percent(raw.loop_continuation_percent);
    let (continuation_field, continuation_pct, is_st) = match (st, loop_) {
        (Some(_), Some(_)) => return Err(ValidationError::BothContinuationModesSet),
        (None, None)       => return Err(ValidationError::NoContinuationModeSet),
        (Some(pct), None)  => ("st_continuation_percent", pct, true),
        (None, Some(pct))  => ("loop_continuation_percent", pct, false),
    };

    // ── Rule 3: domains ───────────────────────────────────────
    let bet_unit_yen = one_of(bet_unit_yen, &BET_UNITS_YEN, "bet_unit_yen")?;
    let daily_budget_yen =
        within(daily_budget_yen, DAILY_BUDGET_RANGE_YEN, "daily_budget_yen")?;
    let days = within(days, DAYS_RANGE, "days")?;
    let base_hit = one_of(base_hit, &BASE_HIT_DENOMINATORS, "base_hit_denominator")?;
    let bonus_entry = one_of(bonus_entry, &BONUS_ENTRY_PERCENTS, "bonus_entry_percent")?;
    let bonus_hit = one_of(bonus_hit, &BONUS_HIT_DENOMINATORS, "bonus_hit_denominator")?;
    let continuation_pct = within(
        continuation_pct,
        (
            u64::from(CONTINUATION_PERCENT_RANGE.0),
            u64::from(CONTINUATION_PERCENT_RANGE.1),
        ),
        continuation_field,
    )?;
    let time_limited_spins = if time_limited_spins == 0.0 {
        0
    } else {
        within(time_limited_spins, TIME_LIMITED_SPINS_RANGE, "time_limited_spins")?
    };

    let rate = continuation_pct as f64 / 100.0;
    let continuation = if is_st {
        ContinuationMode::St(rate)
    } else {
        ContinuationMode::Loop(rate)
    };

    let config = SimulationConfig {
        bet_unit_yen,
        daily_budget_yen,
        days,
        base_hit_probability:    1.0 / f64::from(base_hit),
        bonus_entry_probability: f64::from(bonus_entry) / 100.0,
        bonus_hit_probability:   1.0 / f64::from(bonus_hit),
        continuation,
        time_limited_spins,
        policy,
    };

    log::debug!(
        "validated config: bet={}yen budget={}yen days={} hit=1/{} entry={}% bonus_hit=1/{} {}={}% time_limited={}",
        config.bet_unit_yen,
        config.daily_budget_yen,
        config.days,
        base_hit,
        bonus_entry,
        bonus_hit,
        config.continuation.label(),
        continuation_pct,
        config.time_limited_spins
    );

    Ok(config)
}

fn required(value: Option<f64>, field: &'static str) -> Result<f64, ValidationError> {
    value
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::MissingField { field })
}

/// A blank, zero, or non-finite rate counts as unset.
fn continuation_percent(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

fn integral(value: f64, field: &'static str) -> Result<u64, ValidationError> {
    if value.fract() != 0.0 || value < 0.0 || value > u64::MAX as f64 {
        return Err(ValidationError::OutOfRange { field, value });
    }
    Ok(value as u64)
}

fn within(value: f64, (lo, hi): (u64, u64), field: &'static str) -> Result<u64, ValidationError> {
    let v = integral(value, field)?;
    if v < lo || v > hi {
        return Err(ValidationError::OutOfRange { field, value });
    }
    Ok(v)
}

fn one_of<T>(value: f64, allowed: &[T], field: &'static str) -> Result<T, ValidationError>
where
    T: Copy + Into<u64>,
{
    let v = integral(value, field)?;
    allowed
        .iter()
        .copied()
        .find(|a| (*a).into() == v)
        .ok_or(ValidationError::OutOfRange { field, value })
}
