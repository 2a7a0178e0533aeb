//! REST API module for dashboards and monitoring
//!
//! Provides JSON views of the published snapshot, a readiness probe and a
//! separate Prometheus metrics listener.

mod dto;
mod handlers;
mod server;

pub use dto::{ApplicationListResponse, ApplicationSummary};
pub use handlers::ApiState;
pub use server::{api_router, metrics_router, run_server, ServerConfig};
