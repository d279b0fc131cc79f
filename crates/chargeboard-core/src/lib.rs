//! Core types, error handling and normalization for chargeboard
//!
//! This crate provides the canonical charging tables, the shared error
//! type, timezone configuration, and the normalizer that turns raw vendor
//! payloads into canonical rows. It performs no I/O.

pub mod error;
pub mod normalize;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{ChargeboardError, Result};
pub use normalize::{Parsed, SkipReason, build_charge_sessions, build_daily_aggregates};
pub use timezone::TimezoneConfig;
pub use types::{ChargeSession, DailyAggregate, EnergySource};
