//! pachinko-core: a reproducible pachinko play-session simulator.
//!
//! raw input → `validate` → `SimulationConfig` → `BatchRunner`
//! (one `session` per day) → `Vec<DayResult>` → `summary` / `stats`.

pub mod batch;
pub mod config;
pub mod error;
pub mod rng;
pub mod session;
pub mod stats;
pub mod summary;
pub mod types;
pub mod validate;
