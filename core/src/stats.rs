//! Statistics aggregator: pure functions over finite numeric sequences.
//!
//! RULE: An empty input yields 0 for every statistic, never an error,
//! so rendering code never branches on emptiness.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) / values.len() as f64
}

/// Middle value; the average of the two middle values for even lengths.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    median_of_sorted(&sorted(values))
}

/// The first value to reach the highest frequency while scanning in
/// input order. A later value only takes over by exceeding that count.
pub fn mode(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    let mut freq: HashMap<u64, usize> = HashMap::new();
    let mut best = first;
    let mut best_count = 0;
    for &v in values {
        let count = freq.entry(key(v)).or_insert(0);
        *count += 1;
        if *count > best_count {
            best_count = *count;
            best = v;
        }
    }
    best
}

/// All six statistics in one pass over one sorted copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiStats {
    pub min:    f64,
    pub max:    f64,
    pub mean:   f64,
    pub sum:    f64,
    pub median: f64,
    pub mode:   f64,
}

/// Same numbers as calling each function separately.
pub fn multi_stats(values: &[f64]) -> MultiStats {
    if values.is_empty() {
        return MultiStats::default();
    }
    let sorted = sorted(values);
    let total = sum(values);
    MultiStats {
        min:    sorted[0],
        max:    sorted[sorted.len() - 1],
        mean:   total / values.len() as f64,
        sum:    total,
        median: median_of_sorted(&sorted),
        mode:   mode(values),
    }
}

/// Streak-length histogram. Bucket `i` counts streaks of length `i + 1`,
/// from length 1 up to the longest observed; unseen lengths are 0.
pub fn streak_histogram(streaks: &[u64]) -> Vec<u64> {
    let longest = streaks.iter().copied().max().unwrap_or(0);
    let mut buckets = vec![0u64; longest as usize];
    for &len in streaks {
        if len > 0 {
            buckets[(len - 1) as usize] += 1;
        }
    }
    buckets
}

/// Cross-section statistics at one sample index of many series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// How many series were long enough to contribute.
    pub samples: usize,
    pub mean:    f64,
    pub min:     f64,
    pub median:  f64,
    pub mode:    f64,
}

/// For each index up to the longest series, gather the value from every
/// series that reaches that far. Shorter series are absent, not zero.
pub fn series_stats<S: AsRef<[f64]>>(series: &[S]) -> Vec<SeriesPoint> {
    let longest = series.iter().map(|s| s.as_ref().len()).max().unwrap_or(0);
    let mut column = Vec::with_capacity(series.len());
    (0..longest)
        .map(|i| {
            column.clear();
            column.extend(series.iter().filter_map(|s| s.as_ref().get(i).copied()));
            let stats = multi_stats(&column);
            SeriesPoint {
                samples: column.len(),
                mean:    stats.mean,
                min:     stats.min,
                median:  stats.median,
                mode:    stats.mode,
            }
        })
        .collect()
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Hash key for frequency counting. -0.0 and 0.0 count as one value.
fn key(v: f64) -> u64 {
    if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
}
