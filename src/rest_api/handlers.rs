//! HTTP handlers for the REST API
//!
//! Handlers only read the published snapshot; they never reach the
//! controller themselves.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, instrument};

use crate::controller::metrics::REGISTRY;
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::types::{ResolvedApplication, SourceKind};

use super::dto::{ApplicationListResponse, ErrorResponse, HealthResponse, ProjectQuery};

const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Shared state for the API handlers
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<SnapshotStore>,
}

fn list_with<F>(state: &ApiState, select: F) -> Json<ApplicationListResponse>
where
    F: for<'a> FnOnce(&'a Snapshot) -> Vec<&'a ResolvedApplication>,
{
    match state.store.current() {
        Some(snapshot) => {
            let apps = select(&*snapshot);
            Json(ApplicationListResponse::from_selection(&snapshot, apps))
        }
        None => Json(ApplicationListResponse::not_ready()),
    }
}

/// Readiness: OK once a snapshot has been published
#[instrument(skip(state))]
pub async fn health(State(state): State<ApiState>) -> (StatusCode, Json<HealthResponse>) {
    if state.store.ready() {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "OK".to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "AppsNotUpdated".to_string(),
            }),
        )
    }
}

/// Applications with a newer chart version
#[instrument(skip(state))]
pub async fn list_updates(
    State(state): State<ApiState>,
    Query(query): Query<ProjectQuery>,
) -> Json<ApplicationListResponse> {
    list_with(&state, |s| s.with_updates_available(&query.project))
}

#[instrument(skip(state))]
pub async fn list_all(
    State(state): State<ApiState>,
    Query(query): Query<ProjectQuery>,
) -> Json<ApplicationListResponse> {
    list_with(&state, |s| s.for_project(&query.project))
}

#[instrument(skip(state))]
pub async fn list_helm(
    State(state): State<ApiState>,
    Query(query): Query<ProjectQuery>,
) -> Json<ApplicationListResponse> {
    list_with(&state, |s| s.with_source_kind(SourceKind::Helm, &query.project))
}

#[instrument(skip(state))]
pub async fn list_git(
    State(state): State<ApiState>,
    Query(query): Query<ProjectQuery>,
) -> Json<ApplicationListResponse> {
    list_with(&state, |s| s.with_source_kind(SourceKind::Git, &query.project))
}

/// Metrics endpoint handler
pub async fn metrics(State(state): State<ApiState>) -> Response {
    match state.store.encode_metrics(&REGISTRY) {
        Ok(body) => ([(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("encode_failed", &e.to_string())),
            )
                .into_response()
        }
    }
}
