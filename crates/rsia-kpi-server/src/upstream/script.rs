// SPDX-License-Identifier: Apache-2.0

use super::{UpstreamError, UpstreamService};
use crate::config::UpstreamConfig;
use async_trait::async_trait;
use rsia_kpi_api::{UpstreamReply, UpstreamRequest};
use tracing::{instrument, warn};

const ERROR_BODY_PREVIEW_BYTES: usize = 512;

/// JSON-over-HTTPS client of the deployed scripting endpoint.
pub struct ScriptUpstream {
    url: String,
    client: reqwest::Client,
}

impl ScriptUpstream {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;
        Ok(Self {
            url: config.url.trim().to_string(),
            client,
        })
    }
}

fn classify(err: &reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Unreachable(err.to_string())
    }
}

fn preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    text.chars().take(ERROR_BODY_PREVIEW_BYTES).collect()
}

#[async_trait]
impl UpstreamService for ScriptUpstream {
    fn backend_tag(&self) -> &'static str {
        "script"
    }

    #[instrument(
        name = "upstream_call",
        skip(self, request, idempotency_key),
        fields(action = request.action())
    )]
    async fn call(
        &self,
        request: &UpstreamRequest,
        idempotency_key: Option<&str>,
    ) -> Result<UpstreamReply, UpstreamError> {
        let mut req = self.client.post(&self.url).json(request);
        if let Some(key) = idempotency_key {
            req = req.header("Idempotency-Key", key);
        }
        let response = req.send().await.map_err(|e| classify(&e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| classify(&e))?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "upstream answered with an error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: preview(&body),
            });
        }
        serde_json::from_slice::<UpstreamReply>(&body)
            .map_err(|e| UpstreamError::InvalidReply(e.to_string()))
    }
}
