//! In-memory gateway used by controller tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::gateway::{ChartCatalog, ChartEntry, Credentials, Gateway, RawApplication, Settings};

#[derive(Default)]
pub struct FakeGateway {
    login_token: Option<String>,
    settings_url: String,
    apps: Vec<RawApplication>,
    catalogs: HashMap<String, ChartCatalog>,
    fail_listing: AtomicBool,
    chart_calls: Mutex<Vec<String>>,
    tokens: Mutex<Vec<Option<String>>>,
}

impl FakeGateway {
    pub fn with_login(mut self, token: &str) -> Self {
        self.login_token = Some(token.to_string());
        self
    }

    pub fn with_settings_url(mut self, url: &str) -> Self {
        self.settings_url = url.to_string();
        self
    }

    pub fn with_app(mut self, app: RawApplication) -> Self {
        self.apps.push(app);
        self
    }

    pub fn with_chart(mut self, repo_url: &str, chart: &str, versions: &[&str]) -> Self {
        self.catalogs
            .entry(repo_url.to_string())
            .or_default()
            .items
            .push(ChartEntry {
                name: chart.to_string(),
                versions: versions.iter().map(|v| v.to_string()).collect(),
            });
        self
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn chart_calls(&self, repo_url: &str) -> usize {
        self.chart_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.as_str() == repo_url)
            .count()
    }

    pub fn tokens_seen(&self) -> Vec<Option<String>> {
        self.tokens.lock().unwrap().clone()
    }

    fn record_token(&self, token: Option<&str>) {
        self.tokens.lock().unwrap().push(token.map(str::to_string));
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<String> {
        self.login_token.clone().ok_or(Error::Auth {
            status: 401,
            body: "invalid username or password".to_string(),
        })
    }

    async fn settings(&self, token: Option<&str>) -> Result<Settings> {
        self.record_token(token);
        Ok(Settings {
            url: self.settings_url.clone(),
        })
    }

    async fn list_applications(&self, token: Option<&str>) -> Result<Vec<RawApplication>> {
        self.record_token(token);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Error::Upstream {
                status: 503,
                url: "/api/v1/applications".to_string(),
                body: "unavailable".to_string(),
            });
        }
        Ok(self.apps.clone())
    }

    async fn list_chart_versions(
        &self,
        repo_url: &str,
        token: Option<&str>,
    ) -> Result<ChartCatalog> {
        self.record_token(token);
        self.chart_calls.lock().unwrap().push(repo_url.to_string());
        self.catalogs
            .get(repo_url)
            .cloned()
            .ok_or_else(|| Error::Upstream {
                status: 404,
                url: repo_url.to_string(),
                body: "repository not found".to_string(),
            })
    }
}

pub fn helm_app(
    name: &str,
    project: &str,
    repo_url: &str,
    chart: &str,
    revision: &str,
) -> RawApplication {
    let mut app = RawApplication::default();
    app.metadata.name = name.to_string();
    app.spec.project = project.to_string();
    app.spec.source.repo_url = repo_url.to_string();
    app.spec.source.chart = chart.to_string();
    app.spec.source.target_revision = revision.to_string();
    app.status.health.status = "Healthy".to_string();
    app.status.sync.status = "Synced".to_string();
    app
}

pub fn git_app(name: &str, project: &str, path: &str) -> RawApplication {
    let mut app = RawApplication::default();
    app.metadata.name = name.to_string();
    app.spec.project = project.to_string();
    app.spec.source.repo_url = "https://github.com/acme/deploy.git".to_string();
    app.spec.source.path = path.to_string();
    app.spec.source.target_revision = "HEAD".to_string();
    app
}
