//! # hfd-api — Axum HTTP Service for HTML Fast Deploy
//!
//! Serves operator-uploaded HTML applications and the admin surface used
//! to manage them.
//!
//! ## API Surface
//!
//! | Prefix            | Module                 | Auth  |
//! |-------------------|------------------------|-------|
//! | `/apps/*`         | [`routes::apps`]       | none  |
//! | `/admin`, `/admin/apps*` | [`routes::admin`] | Basic |
//! | `/openapi.json`   | [`openapi`]            | Basic |
//! | `/health/*`, `/metrics`, `/` | this module | none  |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → [admin: AuthMiddleware → body limit] → Handler
//!                                  [apps: CORS]
//! ```

pub mod auth;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::{Extension, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::{ApiMetrics, MetricsSnapshot};

pub use error::AppError;
pub use state::{AppConfig, AppState};

/// Assemble the full application router with all routes and middleware.
///
/// Application serving, health probes and `/metrics` are public; everything
/// under `/admin` and the OpenAPI document require Basic credentials.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();

    let admin = Router::new()
        .merge(routes::admin::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(from_fn(auth::auth_middleware))
        .layer(Extension(state.config.credentials.clone()));

    let public = routes::apps::router().layer(CorsLayer::permissive());

    let operational = Router::new()
        .route("/", get(|| async { Redirect::to("/admin") }))
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(metrics_json));

    Router::new()
        .merge(operational)
        .merge(public)
        .merge(admin)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(metrics))
        .with_state(state)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 while the apps root is a readable directory.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match tokio::fs::read_dir(state.store.root()).await {
        Ok(_) => (StatusCode::OK, "ready").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, root = %state.store.root().display(), "apps root unreadable");
            (StatusCode::SERVICE_UNAVAILABLE, "apps root unreadable").into_response()
        }
    }
}

/// GET /metrics — Request counters as JSON.
async fn metrics_json(Extension(metrics): Extension<ApiMetrics>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}
