//! Atomically swappable holder of the current snapshot

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use prometheus_client::encoding::text::encode;
use prometheus_client::registry::Registry;
use tracing::debug;

use super::Snapshot;
use crate::controller::metrics::{refresh_update_gauge, UpdateGauge, APP_UPDATE_AVAILABLE};
use crate::error::{Error, Result};

/// Holds the last successfully published snapshot
///
/// Reads are a single atomic load. Publishing and metrics encoding share one
/// mutex, so gauge series and the snapshot pointer change together.
pub struct SnapshotStore {
    current: ArcSwapOption<Snapshot>,
    publish_lock: Mutex<()>,
    gauge: UpdateGauge,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Store backed by the process-wide update gauge
    pub fn new() -> Self {
        Self::with_gauge(APP_UPDATE_AVAILABLE.clone())
    }

    pub fn with_gauge(gauge: UpdateGauge) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            publish_lock: Mutex::new(()),
            gauge,
        }
    }

    /// Latest snapshot, or `None` before the first successful pass
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// True once at least one pass has been published
    pub fn ready(&self) -> bool {
        self.current.load().is_some()
    }

    /// Swap in `snapshot` and refresh the update gauge
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        let _guard = self
            .publish_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let previous = self.current.load_full();
        refresh_update_gauge(&self.gauge, previous.as_deref(), &next);
        self.current.store(Some(Arc::clone(&next)));

        debug!(applications = next.all().len(), "Published snapshot");
        next
    }

    /// Encode `registry` without interleaving with a publish
    pub fn encode_metrics(&self, registry: &Registry) -> Result<String> {
        let _guard = self
            .publish_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut buffer = String::new();
        encode(&mut buffer, registry)
            .map_err(|e| Error::ConfigError(format!("Failed to encode metrics: {e}")))?;
        Ok(buffer)
    }
}
