//! Reconciliation engine
//!
//! Resolves every controller-managed application against its chart
//! repository and publishes the result as an immutable snapshot.

pub mod chart_cache;
pub mod metrics;
mod reconciler;
#[cfg(test)]
pub(crate) mod testing;
pub mod version;

pub use chart_cache::ChartCache;
pub use reconciler::Reconciler;
pub use version::{is_update_available, latest_released, released_versions, SelectionPolicy};
