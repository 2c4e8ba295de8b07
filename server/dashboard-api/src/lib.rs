//! On-Call Health Dashboard API
//!
//! HTTP service exposing burnout-engine aggregations to the dashboard.
//! Bind to 127.0.0.1 by default (internal only).

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
  routing::{get, post},
  Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(handlers::health))
    .route("/risk/affected", post(handlers::risk_affected))
    .route("/risk/tags", post(handlers::risk_tags))
    .route("/risk/breakdown", post(handlers::risk_breakdown))
    .route("/trends/running-average", post(handlers::running_average))
    .route("/trends/series", post(handlers::trend_series))
    .route("/github/affected", post(handlers::github_affected))
    .route("/github/tags", post(handlers::github_tags))
    .route("/self-reports/summary", post(handlers::self_report_summary))
    .route("/members/match", post(handlers::match_member))
    .route(
      "/oncall/:integration_id",
      get(handlers::oncall_get)
        .put(handlers::oncall_put)
        .delete(handlers::oncall_clear),
    )
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}
