//! Reconciliation pass: fetch, resolve, publish
//!
//! A pass is all-or-nothing. Any gateway failure returns an error before
//! the store is touched, so readers keep seeing the previous snapshot.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use super::chart_cache::ChartCache;
use super::metrics::{ErrorLabels, RECONCILE_DURATION_SECONDS, RECONCILE_ERRORS_TOTAL};
use super::version::{self, SelectionPolicy};
use crate::error::Result;
use crate::gateway::{Credentials, Gateway};
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::types::{ResolvedApplication, SourceKind};

/// Drives reconciliation passes against one controller
pub struct Reconciler<G> {
    gateway: G,
    credentials: Option<Credentials>,
    server_url: String,
    policy: SelectionPolicy,
    store: Arc<SnapshotStore>,
}

impl<G: Gateway> Reconciler<G> {
    /// `server_url` is the deep-link base used when settings carry no URL
    pub fn new(gateway: G, server_url: impl Into<String>, store: Arc<SnapshotStore>) -> Self {
        Self {
            gateway,
            credentials: None,
            server_url: server_url.into().trim_end_matches('/').to_string(),
            policy: SelectionPolicy::default(),
            store,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_selection_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Run one pass and publish its snapshot
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<Arc<Snapshot>> {
        let start = Instant::now();
        let result = self.build_snapshot().await;
        RECONCILE_DURATION_SECONDS.observe(start.elapsed().as_secs_f64());

        match result {
            Ok(snapshot) => Ok(self.store.publish(snapshot)),
            Err(e) => {
                RECONCILE_ERRORS_TOTAL
                    .get_or_create(&ErrorLabels {
                        kind: e.kind().to_string(),
                    })
                    .inc();
                warn!(kind = e.kind(), "Reconciliation pass failed, keeping previous snapshot");
                Err(e)
            }
        }
    }

    async fn build_snapshot(&self) -> Result<Snapshot> {
        let token = match &self.credentials {
            Some(credentials) => Some(self.gateway.authenticate(credentials).await?),
            None => None,
        };
        let token = token.as_deref();

        let settings = self.gateway.settings(token).await?;
        let server_url = if settings.url.is_empty() {
            self.server_url.clone()
        } else {
            settings.url.trim_end_matches('/').to_string()
        };

        let mut raw_apps = self.gateway.list_applications(token).await?;
        // Stable: equal names keep fetch order
        raw_apps.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));

        let mut cache = ChartCache::new(&self.gateway, token);
        let mut applications = Vec::with_capacity(raw_apps.len());

        for raw in &raw_apps {
            let mut app = ResolvedApplication::from_raw(raw);

            if app.source_kind == SourceKind::Helm {
                let catalog = cache.resolve(&app.repo_url).await?;
                let latest = version::latest_released(catalog, &app.chart, self.policy);
                if version::is_update_available(&app.revision, latest.as_deref()) {
                    debug!(
                        app = %app.name,
                        current = %app.revision,
                        latest = ?latest,
                        "Update available"
                    );
                    app.latest_version = latest;
                }
            }

            applications.push(app);
        }

        let snapshot = Snapshot::new(applications, server_url);
        info!(
            applications = snapshot.all().len(),
            updates = snapshot.with_updates_available("").len(),
            repositories = cache.len(),
            "Reconciliation pass complete"
        );
        Ok(snapshot)
    }
}
