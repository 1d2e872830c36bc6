// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
    pub shutdown_drain: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 50 * 1024 * 1024,
            cors_allowed_origins: vec!["*".to_string()],
            shutdown_drain: Duration::from_millis(2000),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.cors_allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }

    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.iter().any(|allowed| allowed == "*")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpstreamConfig {
    pub url: String,
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout: Duration::from_secs(15),
            max_redirects: 10,
        }
    }
}

pub fn validate_startup_config_contract(
    api: &ApiConfig,
    upstream: &UpstreamConfig,
) -> Result<(), String> {
    if api.max_body_bytes == 0 {
        return Err("RSIA_MAX_BODY_BYTES must be > 0".to_string());
    }
    if api.cors_allowed_origins.is_empty() {
        return Err("RSIA_CORS_ALLOWED_ORIGINS must list at least one origin or *".to_string());
    }
    let url = upstream.url.trim();
    if url.is_empty() {
        return Err("RSIA_UPSTREAM_URL (or GOOGLE_SCRIPT_URL) is required".to_string());
    }
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(format!("RSIA_UPSTREAM_URL must be an http(s) URL, got {url}"));
    }
    if upstream.timeout.is_zero() {
        return Err("RSIA_UPSTREAM_TIMEOUT_MS must be > 0".to_string());
    }
    Ok(())
}
