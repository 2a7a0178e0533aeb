//! Prometheus metrics for argocd-app-updates
//!
//! # Exported metrics
//! - `argocd_app_update_available` (gauge): 1 if a newer chart version is available,
//!   0 otherwise, labeled by project/name/current_version/latest_version. Every
//!   application in the published snapshot has exactly one series.
//! - `argocd_app_updates_reconcile_duration_seconds` (histogram): duration of
//!   reconciliation passes.
//! - `argocd_app_updates_reconcile_errors_total` (counter): failed passes labeled by error kind.

use std::sync::atomic::{AtomicI64, AtomicU64};

use once_cell::sync::Lazy;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

use crate::snapshot::Snapshot;
use crate::types::ResolvedApplication;

/// Labels for the per-application update gauge
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct AppUpdateLabels {
    pub project: String,
    pub name: String,
    pub current_version: String,
    /// Empty when no update is available
    pub latest_version: String,
}

impl From<&ResolvedApplication> for AppUpdateLabels {
    fn from(app: &ResolvedApplication) -> Self {
        Self {
            project: app.project.clone(),
            name: app.name.clone(),
            current_version: app.revision.clone(),
            latest_version: app.latest_version.clone().unwrap_or_default(),
        }
    }
}

/// Labels for reconcile error metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    /// Error kind, e.g. "transport", "upstream", "auth"
    pub kind: String,
}

pub type UpdateGauge = Family<AppUpdateLabels, Gauge<i64, AtomicI64>>;

/// Gauge tracking update availability per application
pub static APP_UPDATE_AVAILABLE: Lazy<UpdateGauge> = Lazy::new(Family::default);

/// Histogram tracking reconcile duration (seconds)
pub static RECONCILE_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    // 10ms .. ~40s across 12 buckets
    Histogram::new(exponential_buckets(0.01, 2.0, 12))
});

/// Counter tracking failed reconciliation passes
pub static RECONCILE_ERRORS_TOTAL: Lazy<Family<ErrorLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::default();

    registry.register(
        "argocd_app_update_available",
        "1 if an update is available for the argocd application",
        APP_UPDATE_AVAILABLE.clone(),
    );
    registry.register(
        "argocd_app_updates_reconcile_duration_seconds",
        "Duration of reconciliation passes in seconds",
        RECONCILE_DURATION_SECONDS.clone(),
    );
    // Counters get the `_total` suffix on encode
    registry.register(
        "argocd_app_updates_reconcile_errors",
        "Total number of failed reconciliation passes",
        RECONCILE_ERRORS_TOTAL.clone(),
    );

    registry
});

/// Replace the series of `previous` with those of `next`
///
/// Series for applications that disappeared or changed version are removed
/// so label cardinality stays bounded by the current snapshot.
pub fn refresh_update_gauge(gauge: &UpdateGauge, previous: Option<&Snapshot>, next: &Snapshot) {
    if let Some(previous) = previous {
        for app in previous.all() {
            gauge.remove(&AppUpdateLabels::from(app));
        }
    }
    for app in next.all() {
        gauge
            .get_or_create(&AppUpdateLabels::from(app))
            .set(i64::from(app.update_available()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HealthStatus, SourceKind, SyncStatus};

    fn app(name: &str, revision: &str, latest: Option<&str>) -> ResolvedApplication {
        ResolvedApplication {
            name: name.to_string(),
            namespace: String::new(),
            project: "default".to_string(),
            cluster: String::new(),
            source_kind: SourceKind::Helm,
            repo_url: "https://charts.example.com".to_string(),
            chart: name.to_string(),
            path: String::new(),
            revision: revision.to_string(),
            health: HealthStatus::Healthy,
            sync: SyncStatus::Synced,
            automated: false,
            latest_version: latest.map(str::to_string),
        }
    }

    fn encode(gauge: &UpdateGauge) -> String {
        let mut registry = Registry::default();
        registry.register("argocd_app_update_available", "test", gauge.clone());
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &registry).unwrap();
        buffer
    }

    #[test]
    fn test_gauge_values_follow_update_availability() {
        let gauge = UpdateGauge::default();
        let snapshot = Snapshot::new(
            vec![app("a", "1.0.0", Some("1.1.0")), app("b", "2.0.0", None)],
            "http://argocd".to_string(),
        );
        refresh_update_gauge(&gauge, None, &snapshot);

        let out = encode(&gauge);
        assert!(out.contains(r#"name="a",current_version="1.0.0",latest_version="1.1.0"} 1"#));
        assert!(out.contains(r#"name="b",current_version="2.0.0",latest_version=""} 0"#));
    }

    #[test]
    fn test_stale_series_removed() {
        let gauge = UpdateGauge::default();
        let first = Snapshot::new(
            vec![app("a", "1.0.0", Some("1.1.0")), app("gone", "1.0.0", None)],
            String::new(),
        );
        refresh_update_gauge(&gauge, None, &first);

        let second = Snapshot::new(vec![app("a", "1.1.0", None)], String::new());
        refresh_update_gauge(&gauge, Some(&first), &second);

        let out = encode(&gauge);
        assert!(!out.contains("gone"));
        assert!(!out.contains(r#"current_version="1.0.0""#));
        assert!(out.contains(r#"name="a",current_version="1.1.0",latest_version=""} 0"#));
    }
}
