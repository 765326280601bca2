//! HTTP API server for the payment lifecycle service.
//!
//! Exposes create/process/cancel/complete endpoints over an in-memory
//! payment registry, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::PaymentRegistry;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::payments::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/state/payments", get(routes::payments::list))
        .route("/state/payments/{id}", get(routes::payments::get))
        .route("/state/payments/{id}/create", post(routes::payments::create))
        .route("/state/payments/{id}/process", post(routes::payments::process))
        .route("/state/payments/{id}/cancel", post(routes::payments::cancel))
        .route("/state/payments/{id}/complete", post(routes::payments::complete))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with an empty registry configured from `config`.
pub fn create_state(config: &Config) -> Arc<AppState> {
    Arc::new(AppState {
        registry: PaymentRegistry::with_policy(config.create_policy),
    })
}
