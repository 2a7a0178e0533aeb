//! Response bodies for the REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;
use crate::types::{HealthStatus, ResolvedApplication, SourceKind, SyncStatus};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// `?project=` filter shared by all listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    #[serde(default)]
    pub project: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub name: String,
    pub namespace: String,
    pub project: String,
    pub cluster: String,
    pub source_kind: SourceKind,
    pub repo_url: String,
    pub chart: String,
    pub path: String,
    pub revision: String,
    pub health: HealthStatus,
    pub sync: SyncStatus,
    pub automated: bool,
    pub latest_version: Option<String>,
    /// Deep link into the controller UI
    pub url: String,
}

impl ApplicationSummary {
    pub fn new(snapshot: &Snapshot, app: &ResolvedApplication) -> Self {
        Self {
            name: app.name.clone(),
            namespace: app.namespace.clone(),
            project: app.project.clone(),
            cluster: app.cluster.clone(),
            source_kind: app.source_kind,
            repo_url: app.repo_url.clone(),
            chart: app.chart.clone(),
            path: app.path.clone(),
            revision: app.revision.clone(),
            health: app.health,
            sync: app.sync,
            automated: app.automated,
            latest_version: app.latest_version.clone(),
            url: snapshot.app_url(app),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationSummary>,
    pub total: usize,
    pub server_url: Option<String>,
    pub reconciled_at: Option<DateTime<Utc>>,
}

impl ApplicationListResponse {
    /// Response before the first successful pass
    pub fn not_ready() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            server_url: None,
            reconciled_at: None,
        }
    }

    pub fn from_selection(snapshot: &Snapshot, apps: Vec<&ResolvedApplication>) -> Self {
        let items: Vec<ApplicationSummary> = apps
            .into_iter()
            .map(|app| ApplicationSummary::new(snapshot, app))
            .collect();
        let total = items.len();
        Self {
            items,
            total,
            server_url: Some(snapshot.server_url().to_string()),
            reconciled_at: Some(snapshot.reconciled_at()),
        }
    }
}
