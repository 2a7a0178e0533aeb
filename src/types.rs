//! Domain types held by the published snapshot
//!
//! - [`SourceKind`] - where an application is deployed from (Helm or Git)
//! - [`HealthStatus`] / [`SyncStatus`] - controller-reported state, with an
//!   `Unknown` variant for values this crate does not recognize
//! - [`ResolvedApplication`] - one application after version resolution

use serde::Serialize;

use crate::gateway::RawApplication;

/// Where an application's manifests come from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SourceKind {
    /// Chart from a Helm repository; eligible for update detection
    Helm,
    /// Path inside a Git repository
    Git,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Helm => write!(f, "Helm"),
            SourceKind::Git => write!(f, "Git"),
        }
    }
}

/// Application health as reported by the controller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum HealthStatus {
    Healthy,
    Progressing,
    Degraded,
    Suspended,
    Missing,
    #[default]
    Unknown,
}

impl From<&str> for HealthStatus {
    fn from(value: &str) -> Self {
        match value {
            "Healthy" => HealthStatus::Healthy,
            "Progressing" => HealthStatus::Progressing,
            "Degraded" => HealthStatus::Degraded,
            "Suspended" => HealthStatus::Suspended,
            "Missing" => HealthStatus::Missing,
            _ => HealthStatus::Unknown,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "Healthy"),
            HealthStatus::Progressing => write!(f, "Progressing"),
            HealthStatus::Degraded => write!(f, "Degraded"),
            HealthStatus::Suspended => write!(f, "Suspended"),
            HealthStatus::Missing => write!(f, "Missing"),
            HealthStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Sync state between desired and live manifests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SyncStatus {
    Synced,
    OutOfSync,
    #[default]
    Unknown,
}

impl From<&str> for SyncStatus {
    fn from(value: &str) -> Self {
        match value {
            "Synced" => SyncStatus::Synced,
            "OutOfSync" => SyncStatus::OutOfSync,
            _ => SyncStatus::Unknown,
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Synced => write!(f, "Synced"),
            SyncStatus::OutOfSync => write!(f, "OutOfSync"),
            SyncStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// An application after classification and version resolution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedApplication {
    pub name: String,
    pub namespace: String,
    pub project: String,
    /// Destination cluster server URL, or its name when no URL is set
    pub cluster: String,
    pub source_kind: SourceKind,
    pub repo_url: String,
    pub chart: String,
    pub path: String,
    /// Deployed target revision (chart version for Helm sources)
    pub revision: String,
    pub health: HealthStatus,
    pub sync: SyncStatus,
    pub automated: bool,
    /// Set only for Helm sources with a strictly newer released version
    pub latest_version: Option<String>,
}

impl ResolvedApplication {
    /// Classify a raw application without resolving versions
    pub fn from_raw(raw: &RawApplication) -> Self {
        let source = &raw.spec.source;
        let destination = &raw.spec.destination;
        let source_kind = if raw.is_git_source() {
            SourceKind::Git
        } else {
            SourceKind::Helm
        };
        let cluster = if destination.server.is_empty() {
            destination.name.clone()
        } else {
            destination.server.clone()
        };

        Self {
            name: raw.metadata.name.clone(),
            namespace: raw.metadata.namespace.clone(),
            project: raw.spec.project.clone(),
            cluster,
            source_kind,
            repo_url: source.repo_url.clone(),
            chart: source.chart.clone(),
            path: source.path.clone(),
            revision: source.target_revision.clone(),
            health: HealthStatus::from(raw.status.health.status.as_str()),
            sync: SyncStatus::from(raw.status.sync.status.as_str()),
            automated: raw.spec.sync_policy.automated.is_some(),
            latest_version: None,
        }
    }

    pub fn update_available(&self) -> bool {
        self.latest_version.is_some()
    }
}
