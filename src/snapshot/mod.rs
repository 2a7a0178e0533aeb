//! Published result of the latest successful reconciliation pass
//!
//! A [`Snapshot`] is immutable once built. Readers get it from the
//! [`SnapshotStore`] and query it with side-effect-free filters.

mod store;

use chrono::{DateTime, Utc};

use crate::types::{ResolvedApplication, SourceKind};

pub use store::SnapshotStore;

/// Resolved applications ordered by name
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    applications: Vec<ResolvedApplication>,
    server_url: String,
    reconciled_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build a snapshot; applications are stable-sorted by name
    pub fn new(mut applications: Vec<ResolvedApplication>, server_url: String) -> Self {
        applications.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            applications,
            server_url,
            reconciled_at: Utc::now(),
        }
    }

    pub fn all(&self) -> &[ResolvedApplication] {
        &self.applications
    }

    /// Externally advertised controller URL used for deep links
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn reconciled_at(&self) -> DateTime<Utc> {
        self.reconciled_at
    }

    /// Deep link to an application in the controller UI
    pub fn app_url(&self, app: &ResolvedApplication) -> String {
        format!("{}/applications/{}", self.server_url, app.name)
    }

    /// Applications of `project`; an empty name selects every project
    pub fn for_project(&self, project: &str) -> Vec<&ResolvedApplication> {
        self.applications
            .iter()
            .filter(|app| project.is_empty() || app.project == project)
            .collect()
    }

    pub fn with_source_kind(&self, kind: SourceKind, project: &str) -> Vec<&ResolvedApplication> {
        self.for_project(project)
            .into_iter()
            .filter(|app| app.source_kind == kind)
            .collect()
    }

    pub fn with_updates_available(&self, project: &str) -> Vec<&ResolvedApplication> {
        self.for_project(project)
            .into_iter()
            .filter(|app| app.update_available())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HealthStatus, SyncStatus};

    fn app(
        name: &str,
        project: &str,
        kind: SourceKind,
        latest: Option<&str>,
    ) -> ResolvedApplication {
        ResolvedApplication {
            name: name.to_string(),
            namespace: "argocd".to_string(),
            project: project.to_string(),
            cluster: "https://kubernetes.default.svc".to_string(),
            source_kind: kind,
            repo_url: String::new(),
            chart: String::new(),
            path: String::new(),
            revision: "1.0.0".to_string(),
            health: HealthStatus::Healthy,
            sync: SyncStatus::Synced,
            automated: false,
            latest_version: latest.map(str::to_string),
        }
    }

    fn fixture() -> Snapshot {
        Snapshot::new(
            vec![
                app("echo", "teamB", SourceKind::Helm, Some("2.0.0")),
                app("delta", "teamA", SourceKind::Helm, None),
                app("charlie", "teamA", SourceKind::Git, None),
                app("bravo", "teamB", SourceKind::Git, None),
                app("alpha", "teamA", SourceKind::Helm, Some("1.1.0")),
            ],
            "https://argocd.example.com".to_string(),
        )
    }

    fn names(apps: Vec<&ResolvedApplication>) -> Vec<&str> {
        apps.into_iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_name() {
        let snapshot = fixture();
        let all: Vec<&str> = snapshot.all().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(all, vec!["alpha", "bravo", "charlie", "delta", "echo"]);
    }

    #[test]
    fn test_sort_keeps_input_order_for_equal_names() {
        let snapshot = Snapshot::new(
            vec![
                app("same", "second", SourceKind::Helm, None),
                app("same", "first", SourceKind::Git, None),
                app("a", "x", SourceKind::Git, None),
            ],
            String::new(),
        );
        let projects: Vec<&str> = snapshot.all().iter().map(|a| a.project.as_str()).collect();
        assert_eq!(projects, vec!["x", "second", "first"]);
    }

    #[test]
    fn test_for_project() {
        let snapshot = fixture();
        assert_eq!(snapshot.for_project("").len(), 5);
        assert_eq!(names(snapshot.for_project("teamA")), vec!["alpha", "charlie", "delta"]);
        assert!(snapshot.for_project("teama").is_empty());
    }

    #[test]
    fn test_source_kind_composes_with_project() {
        let snapshot = fixture();
        assert_eq!(
            names(snapshot.with_source_kind(SourceKind::Helm, "teamA")),
            vec!["alpha", "delta"]
        );
        assert_eq!(
            names(snapshot.with_source_kind(SourceKind::Git, "")),
            vec!["bravo", "charlie"]
        );
    }

    #[test]
    fn test_updates_available() {
        let snapshot = fixture();
        assert_eq!(names(snapshot.with_updates_available("")), vec!["alpha", "echo"]);
        assert_eq!(names(snapshot.with_updates_available("teamB")), vec!["echo"]);
        assert!(snapshot.with_updates_available("nobody").is_empty());
    }

    #[test]
    fn test_filters_do_not_mutate() {
        let snapshot = fixture();
        let before = snapshot.clone();
        let _ = snapshot.with_updates_available("teamA");
        let _ = snapshot.with_source_kind(SourceKind::Git, "teamB");
        assert_eq!(snapshot, before);
    }

    #[test]
    fn test_app_url() {
        let snapshot = fixture();
        assert_eq!(
            snapshot.app_url(&snapshot.all()[0]),
            "https://argocd.example.com/applications/alpha"
        );
    }
}
