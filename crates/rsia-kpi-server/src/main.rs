// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use rsia_kpi_server::{
    build_router, validate_startup_config_contract, ApiConfig, AppState, ScriptUpstream,
    UpstreamConfig,
};
use std::env;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

fn env_list(name: &str, default: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn bind_address() -> String {
    if let Ok(bind) = env::var("RSIA_BIND") {
        return bind;
    }
    let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    format!("{host}:{port}")
}

fn upstream_url() -> String {
    env::var("RSIA_UPSTREAM_URL")
        .or_else(|_| env::var("GOOGLE_SCRIPT_URL"))
        .unwrap_or_default()
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                warn!("unix signal handlers unavailable; falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("RSIA_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();
    let bind_addr = bind_address();

    let api_cfg = ApiConfig {
        max_body_bytes: env_usize("RSIA_MAX_BODY_BYTES", 50 * 1024 * 1024),
        cors_allowed_origins: env_list("RSIA_CORS_ALLOWED_ORIGINS", "*"),
        shutdown_drain: env_duration_ms("RSIA_SHUTDOWN_DRAIN_MS", 2000),
    };
    let upstream_cfg = UpstreamConfig {
        url: upstream_url(),
        timeout: env_duration_ms("RSIA_UPSTREAM_TIMEOUT_MS", 15_000),
        ..UpstreamConfig::default()
    };
    validate_startup_config_contract(&api_cfg, &upstream_cfg)?;

    let upstream = ScriptUpstream::new(&upstream_cfg).map_err(|e| e.to_string())?;
    let drain = api_cfg.shutdown_drain;
    let state = AppState::with_config(Arc::new(upstream), api_cfg);
    let app = build_router(state.clone());

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!(
        bind = %bind_addr,
        upstream_timeout_ms = upstream_cfg.timeout.as_millis() as u64,
        "rsia-kpi-server listening"
    );
    let accepting = state.accepting_requests.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            accepting.store(false, Ordering::Relaxed);
            info!(drain_ms = drain.as_millis() as u64, "draining before shutdown");
            tokio::time::sleep(drain).await;
        })
        .await
        .map_err(|e| format!("server failed: {e}"))
}
