//! argocd-app-updates: Helm chart update reporting for Argo CD
//!
//! This crate periodically reconciles the applications managed by an Argo CD
//! server against their Helm chart repositories and publishes which ones have
//! a newer released chart version.

pub mod controller;
pub mod error;
pub mod gateway;
pub mod scheduler;
pub mod snapshot;
pub mod terminal;
pub mod types;

#[cfg(feature = "rest-api")]
pub mod rest_api;

pub use crate::error::{Error, Result};
