//! Per-pass memo of chart catalogs keyed by repository URL

use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::gateway::{ChartCatalog, Gateway};

/// Chart catalogs fetched during one reconciliation pass
///
/// Lives only as long as the pass that created it, so catalogs never go
/// stale across passes.
pub struct ChartCache<'a, G: ?Sized> {
    gateway: &'a G,
    token: Option<&'a str>,
    catalogs: HashMap<String, ChartCatalog>,
}

impl<'a, G: Gateway + ?Sized> ChartCache<'a, G> {
    pub fn new(gateway: &'a G, token: Option<&'a str>) -> Self {
        Self {
            gateway,
            token,
            catalogs: HashMap::new(),
        }
    }

    /// Catalog for `repo_url`, fetching it on first use
    pub async fn resolve(&mut self, repo_url: &str) -> Result<&ChartCatalog> {
        if !self.catalogs.contains_key(repo_url) {
            debug!("Fetching chart catalog for {}", repo_url);
            let catalog = self.gateway.list_chart_versions(repo_url, self.token).await?;
            self.catalogs.insert(repo_url.to_string(), catalog);
        }
        Ok(&self.catalogs[repo_url])
    }

    /// Number of distinct repositories fetched so far
    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}
