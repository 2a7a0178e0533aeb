//! Wire types for the Argo CD REST API
//!
//! Only the fields the reconciler reads are modelled. Everything defaults to
//! empty so partially populated applications still decode.

use serde::{Deserialize, Deserializer, Serialize};

/// Decode a list that the API may send as `null` when empty
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Login request body for `POST /api/v1/session`
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub token: String,
}

/// Response of `GET /api/v1/settings`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<RawApplication>,
}

/// An application as returned by the controller
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawApplication {
    pub metadata: AppMetadata,
    pub spec: AppSpec,
    pub status: AppStatus,
}

impl RawApplication {
    /// Helm sources have no path inside the repository
    pub fn is_git_source(&self) -> bool {
        !self.spec.source.path.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSpec {
    pub project: String,
    pub source: AppSource,
    pub destination: AppDestination,
    pub sync_policy: SyncPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppSource {
    #[serde(rename = "repoURL")]
    pub repo_url: String,
    #[serde(rename = "targetRevision")]
    pub target_revision: String,
    pub chart: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppDestination {
    pub server: String,
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncPolicy {
    /// Present (even as `{}`) when automated sync is enabled
    pub automated: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppStatus {
    pub health: StatusField,
    pub sync: StatusField,
    pub source_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatusField {
    pub status: String,
}

/// One chart and its versions, in registry order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChartEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub versions: Vec<String>,
}

/// All charts served by one repository, in registry order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChartCatalog {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<ChartEntry>,
}

impl ChartCatalog {
    /// First chart with exactly this name
    pub fn chart(&self, name: &str) -> Option<&ChartEntry> {
        self.items.iter().find(|entry| entry.name == name)
    }
}
