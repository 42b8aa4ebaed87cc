//! Shared primitive types used across the entire simulation.

/// An amount of currency. One unit = one yen.
pub type Yen = u64;

/// Signed currency, for profit and loss.
pub type ProfitYen = i64;

/// A count of pachinko balls.
pub type Balls = u64;

/// A spin index or spin count within one day.
pub type Spin = u64;

/// Zero-based index of a simulated day within a batch.
pub type DayIndex = u64;
