//! Periodic reconciliation
//!
//! Passes never overlap: the loop awaits each pass before waiting for the
//! next cron tick.

mod core;

pub use self::core::{parse_schedule, ReconcileScheduler};
