//! Remote gateway to the Argo CD API
//!
//! The reconciler only talks to the controller through the [`Gateway`] trait.
//! [`ArgoClient`] is the HTTP implementation.

mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use client::{ArgoClient, GatewayConfig};
pub use types::{ChartCatalog, ChartEntry, Credentials, RawApplication, Settings};

/// Narrow request/response contract consumed by the reconciler
///
/// `token` is the bearer token obtained from [`Gateway::authenticate`], or
/// `None` when no credentials are configured.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<String>;

    async fn settings(&self, token: Option<&str>) -> Result<Settings>;

    async fn list_applications(&self, token: Option<&str>) -> Result<Vec<RawApplication>>;

    async fn list_chart_versions(
        &self,
        repo_url: &str,
        token: Option<&str>,
    ) -> Result<ChartCatalog>;
}
