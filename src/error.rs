//! Error types for argocd-app-updates
//!
//! Every failure during a reconciliation pass aborts that pass. The variants
//! distinguish transient network trouble from upstream rejections so the
//! scheduler can log them meaningfully.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Connection, TLS or timeout failure talking to a remote endpoint
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Remote endpoint answered with a non-success status
    #[error("Upstream error: {status} {url}: {body}")]
    Upstream {
        status: u16,
        url: String,
        body: String,
    },

    /// Session login was rejected
    #[error("Authentication failed: {status}: {body}")]
    Auth { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid local configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Short, stable label used for the reconcile error counter
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Transport(_) => "transport",
            Error::Upstream { .. } => "upstream",
            Error::Auth { .. } => "auth",
            Error::Decode { .. } => "decode",
            Error::ConfigError(_) => "config",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
