// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

mod config;
mod forwarder;
mod http;
mod middleware;
mod submit;
mod telemetry;
mod upstream;

pub const CRATE_NAME: &str = "rsia-kpi-server";

pub use config::{
    validate_startup_config_contract, ApiConfig, UpstreamConfig, CONFIG_SCHEMA_VERSION,
};
pub use forwarder::{forward_batch, ForwardAck, ForwardError};
pub use submit::{submit_batch, SubmitError};
pub use telemetry::metrics::RequestMetrics;
pub use upstream::fake::{FakeUpstream, RecordedCall};
pub use upstream::script::ScriptUpstream;
pub use upstream::{fetch_master_indicators, MasterDataError, UpstreamError, UpstreamService};

#[derive(Clone)]
pub struct AppState {
    pub api: ApiConfig,
    pub upstream: Arc<dyn UpstreamService>,
    pub accepting_requests: Arc<AtomicBool>,
    pub(crate) metrics: Arc<RequestMetrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(upstream: Arc<dyn UpstreamService>) -> Self {
        Self::with_config(upstream, ApiConfig::default())
    }

    #[must_use]
    pub fn with_config(upstream: Arc<dyn UpstreamService>, api: ApiConfig) -> Self {
        Self {
            api,
            upstream,
            accepting_requests: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/metrics", get(http::handlers::metrics_handler))
        .route("/v1/version", get(http::handlers::version_handler))
        .route("/v1/openapi.json", get(http::handlers::openapi_handler))
        .route("/api/register", post(http::handlers::register_handler))
        .route("/api/login", post(http::handlers::login_handler))
        .route("/api/kpi-batch", post(http::handlers::kpi_batch_handler))
        .route(
            "/api/indikator-data",
            get(http::handlers::indicator_data_handler),
        )
        .route("/api/kpi-my", get(http::handlers::kpi_my_handler))
        .route("/api/kpi-update", post(http::handlers::kpi_update_handler))
        .route("/api/team-kpi", post(http::handlers::team_kpi_handler))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::cors::cors_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
