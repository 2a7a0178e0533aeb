//! HTTP client for the Argo CD REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{
    ApplicationList, ChartCatalog, Credentials, RawApplication, SessionResponse, Settings,
};
use super::Gateway;
use crate::error::{Error, Result};

const API_V1: &str = "/api/v1";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`ArgoClient`]
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the Argo CD server, e.g. `https://argocd.example.com`
    pub server: String,
    /// Upper bound for every single request
    pub timeout: Duration,
    /// Skip TLS certificate verification
    pub insecure: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:8080".to_string(),
            timeout: DEFAULT_TIMEOUT,
            insecure: false,
        }
    }
}

/// reqwest-backed [`Gateway`]
#[derive(Clone)]
pub struct ArgoClient {
    http_client: Client,
    base_url: String,
}

impl ArgoClient {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let base_url = config.server.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::ConfigError("server URL must not be empty".to_string()));
        }
        let parsed = url::Url::parse(&base_url)
            .map_err(|e| Error::ConfigError(format!("Invalid server URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
            return Err(Error::ConfigError(format!(
                "Invalid server URL '{base_url}': expected http(s)://host[:port]"
            )));
        }

        let http_client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_V1, path)
    }

    fn get(&self, url: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.http_client.get(url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and decode a successful JSON body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        debug!("Requesting {}", url);

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Path segment for a repository URL, escaped like a query value
pub(crate) fn encode_repo_url(repo_url: &str) -> String {
    url::form_urlencoded::byte_serialize(repo_url.as_bytes()).collect()
}

#[async_trait]
impl Gateway for ArgoClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<String> {
        let url = self.url("/session");
        let request = self.http_client.post(&url).json(credentials);

        let session: SessionResponse = match self.send(request, &url).await {
            Ok(session) => session,
            Err(Error::Upstream { status, body, .. }) => {
                return Err(Error::Auth { status, body });
            }
            Err(e) => return Err(e),
        };

        if session.token.is_empty() {
            return Err(Error::Auth {
                status: 200,
                body: "session response did not contain a token".to_string(),
            });
        }

        debug!("Obtained session token for user {}", credentials.username);
        Ok(session.token)
    }

    async fn settings(&self, token: Option<&str>) -> Result<Settings> {
        let url = self.url("/settings");
        self.send(self.get(&url, token), &url).await
    }

    async fn list_applications(&self, token: Option<&str>) -> Result<Vec<RawApplication>> {
        let url = self.url("/applications");
        let list: ApplicationList = self.send(self.get(&url, token), &url).await?;
        Ok(list.items)
    }

    async fn list_chart_versions(
        &self,
        repo_url: &str,
        token: Option<&str>,
    ) -> Result<ChartCatalog> {
        let url = self.url(&format!(
            "/repositories/{}/helmcharts",
            encode_repo_url(repo_url)
        ));
        self.send(self.get(&url, token), &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ArgoClient {
        ArgoClient::new(&GatewayConfig {
            server: format!("{}/", server.uri()),
            timeout: Duration::from_secs(5),
            insecure: false,
        })
        .unwrap()
    }

    #[test]
    fn test_encode_repo_url() {
        assert_eq!(
            encode_repo_url("https://charts.bitnami.com/bitnami"),
            "https%3A%2F%2Fcharts.bitnami.com%2Fbitnami"
        );
    }

    #[test]
    fn test_empty_server_rejected() {
        let config = GatewayConfig {
            server: "/".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            ArgoClient::new(&config),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_malformed_server_rejected() {
        for server in ["argocd.example.com", "localhost:8080", "ftp://argocd"] {
            let config = GatewayConfig {
                server: server.to_string(),
                ..Default::default()
            };
            match ArgoClient::new(&config) {
                Err(Error::ConfigError(msg)) => assert!(msg.contains(server), "{msg}"),
                Err(other) => panic!("expected config error for {server}, got {other:?}"),
                Ok(_) => panic!("expected {server} to be rejected"),
            }
        }
    }

    #[test]
    fn test_server_with_path_accepted() {
        let config = GatewayConfig {
            server: "https://gitops.example.com/argocd/".to_string(),
            ..Default::default()
        };
        assert!(ArgoClient::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/session"))
            .and(body_json(serde_json::json!({"username": "admin", "password": "secret"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "abc"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let token = client
            .authenticate(&Credentials {
                username: "admin".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();
        assert_eq!(token, "abc");
    }

    #[tokio::test]
    async fn test_authenticate_rejected_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/session"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string("invalid username or password"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .authenticate(&Credentials {
                username: "admin".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        match err {
            Error::Auth { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid username"));
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bearer_token_sent_on_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/applications"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"metadata": {"name": "app1"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let apps = client.list_applications(Some("abc")).await.unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].metadata.name, "app1");
    }

    #[tokio::test]
    async fn test_helmcharts_path_is_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/api/v1/repositories/https%3A%2F%2Fcharts.example.com%2Fstable/helmcharts",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"name": "nginx", "versions": ["1.1.0", "1.0.0"]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let catalog = client
            .list_chart_versions("https://charts.example.com/stable", None)
            .await
            .unwrap();
        assert_eq!(catalog.chart("nginx").unwrap().versions, vec!["1.1.0", "1.0.0"]);
    }

    #[tokio::test]
    async fn test_non_success_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/settings"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        match client.settings(None).await.unwrap_err() {
            Error::Upstream { status, url, body } => {
                assert_eq!(status, 500);
                assert!(url.ends_with("/api/v1/settings"));
                assert_eq!(body, "boom");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/applications"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.list_applications(None).await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/settings"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"url": ""}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = ArgoClient::new(&GatewayConfig {
            server: server.uri(),
            timeout: Duration::from_millis(50),
            insecure: false,
        })
        .unwrap();
        let err = client.settings(None).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.kind(), "transport");
    }
}
