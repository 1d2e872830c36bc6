// SPDX-License-Identifier: Apache-2.0

//! The scripting service that owns persistence and authentication.

use async_trait::async_trait;
use rsia_kpi_api::{UpstreamReply, UpstreamRequest};
use rsia_kpi_model::MasterIndicator;
use thiserror::Error;
use tracing::error;

pub(crate) mod fake;
pub(crate) mod script;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum UpstreamError {
    #[error("upstream client could not be built: {0}")]
    Client(String),
    #[error("upstream unreachable: {0}")]
    Unreachable(String),
    #[error("upstream timed out")]
    Timeout,
    #[error("upstream answered HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upstream reply is not valid JSON: {0}")]
    InvalidReply(String),
}

#[async_trait]
pub trait UpstreamService: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str;

    /// Sends one request. Never retries.
    async fn call(
        &self,
        request: &UpstreamRequest,
        idempotency_key: Option<&str>,
    ) -> Result<UpstreamReply, UpstreamError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MasterDataError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("master data request refused: {0}")]
    Refused(String),
    #[error("master data has an unexpected shape: {0}")]
    Malformed(String),
}

/// Reads the whole master indicator table.
pub async fn fetch_master_indicators(
    upstream: &dyn UpstreamService,
) -> Result<Vec<MasterIndicator>, MasterDataError> {
    let reply = upstream
        .call(&UpstreamRequest::GetIndicatorData, None)
        .await?;
    if !reply.is_success() {
        let reason = reply.message_text();
        error!(reason = %reason, "master data request refused");
        return Err(MasterDataError::Refused(reason));
    }
    reply
        .master_indicators()
        .map_err(|e| MasterDataError::Malformed(e.to_string()))
}
