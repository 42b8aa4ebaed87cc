//! Batch summary: everything a presentation layer needs, in one record.

use crate::{
    session::DayResult,
    stats::{multi_stats, series_stats, streak_histogram, MultiStats, SeriesPoint},
};
use serde::{Deserialize, Serialize};

/// Per-day metrics summarised across the batch, in display order.
pub const DAY_METRICS: [DayMetric; 7] = [
    DayMetric::Spins,
    DayMetric::TotalHits,
    DayMetric::BonusEntries,
    DayMetric::TimeLimitedEntries,
    DayMetric::MaxStreak,
    DayMetric::PayoutBalls,
    DayMetric::ProfitYen,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayMetric {
    Spins,
    TotalHits,
    BonusEntries,
    TimeLimitedEntries,
    MaxStreak,
    PayoutBalls,
    ProfitYen,
}

impl DayMetric {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Spins              => "Total spins",
            Self::TotalHits          => "Total hits",
            Self::BonusEntries       => "Bonus entries",
            Self::TimeLimitedEntries => "Time-limited entries",
            Self::MaxStreak          => "Max streak",
            Self::PayoutBalls        => "Payout (balls)",
            Self::ProfitYen          => "Profit (yen)",
        }
    }

    pub fn value(&self, day: &DayResult) -> f64 {
        match self {
            Self::Spins              => day.spins as f64,
            Self::TotalHits          => day.total_hits as f64,
            Self::BonusEntries       => day.bonus_entries as f64,
            Self::TimeLimitedEntries => day.time_limited_entries as f64,
            Self::MaxStreak          => day.max_streak as f64,
            Self::PayoutBalls        => day.payout_balls as f64,
            Self::ProfitYen          => day.profit_yen as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub metric: DayMetric,
    pub label:  String,
    pub stats:  MultiStats,
}

/// Hits split by the state they happened in, plus misses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitDistribution {
    pub normal_hits: u64,
    pub bonus_hits:  u64,
    pub misses:      u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    pub bonus_entries:        u64,
    pub time_limited_entries: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakHistogram {
    /// `"{n}-streak"` for n = 1..=longest.
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

impl StreakHistogram {
    pub fn from_streaks(streaks: &[u64]) -> Self {
        let counts = streak_histogram(streaks);
        let labels = (1..=counts.len()).map(|n| format!("{n}-streak")).collect();
        Self { labels, counts }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub days:            usize,
    pub metrics:         Vec<MetricRow>,
    /// Every streak of every day, pooled.
    pub streaks:         MultiStats,
    pub hits:            HitDistribution,
    pub entries:         EntryTotals,
    pub histogram:       StreakHistogram,
    pub payout_progress: Vec<SeriesPoint>,
    pub profit_progress: Vec<SeriesPoint>,
}

impl BatchSummary {
    pub fn from_days(days: &[DayResult]) -> Self {
        let metrics = DAY_METRICS
            .iter()
            .map(|metric| {
                let values: Vec<f64> = days.iter().map(|d| metric.value(d)).collect();
                MetricRow {
                    metric: *metric,
                    label:  metric.label().to_string(),
                    stats:  multi_stats(&values),
                }
            })
            .collect();

        let all_streaks: Vec<u64> = days.iter().flat_map(|d| d.streaks.iter().copied()).collect();
        let streak_values: Vec<f64> = all_streaks.iter().map(|s| *s as f64).collect();

        let total_spins: u64 = days.iter().map(|d| d.spins).sum();
        let normal_hits: u64 = days.iter().map(|d| d.normal_hits).sum();
        let bonus_hits: u64 = days.iter().map(|d| d.bonus_hits).sum();

        let payout_series: Vec<Vec<f64>> = days
            .iter()
            .map(|d| d.payout_progress.iter().map(|v| *v as f64).collect())
            .collect();
        let profit_series: Vec<Vec<f64>> = days
            .iter()
            .map(|d| d.profit_progress.iter().map(|v| *v as f64).collect())
            .collect();

        Self {
            days: days.len(),
            metrics,
            streaks: multi_stats(&streak_values),
            hits: HitDistribution {
                normal_hits,
                bonus_hits,
                misses: total_spins.saturating_sub(normal_hits + bonus_hits),
            },
            entries: EntryTotals {
                bonus_entries:        days.iter().map(|d| d.bonus_entries).sum(),
                time_limited_entries: days.iter().map(|d| d.time_limited_entries).sum(),
            },
            histogram: StreakHistogram::from_streaks(&all_streaks),
            payout_progress: series_stats(&payout_series),
            profit_progress: series_stats(&profit_series),
        }
    }

    pub fn metric(&self, metric: DayMetric) -> Option<&MultiStats> {
        self.metrics.iter().find(|row| row.metric == metric).map(|row| &row.stats)
    }
}
