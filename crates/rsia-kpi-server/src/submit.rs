// SPDX-License-Identifier: Apache-2.0

//! `POST /api/kpi-batch`: parse, validate against master data, forward.

use crate::forwarder::{forward_batch, ForwardAck, ForwardError};
use crate::upstream::{fetch_master_indicators, MasterDataError, UpstreamService};
use rsia_kpi_api::error_mapping::map_error;
use rsia_kpi_api::{messages, ApiError, ApiErrorCode, ApiErrorEnvelope, KpiBatchRequest};
use rsia_kpi_core::canonical::batch_idempotency_key;
use rsia_kpi_core::{validate_batch, KpiValidationError};
use rsia_kpi_model::{KpiBatch, ModelError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Input(#[from] ModelError),
    #[error(transparent)]
    Validation(#[from] KpiValidationError),
    #[error("master data unavailable: {0}")]
    MasterDataUnavailable(#[from] MasterDataError),
    #[error(transparent)]
    Forward(#[from] ForwardError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl SubmitError {
    #[must_use]
    pub fn to_envelope(&self) -> ApiErrorEnvelope {
        match self {
            Self::Input(e) => ApiErrorEnvelope::from(e),
            Self::Validation(e) => ApiErrorEnvelope::from(e),
            Self::MasterDataUnavailable(e) => ApiErrorEnvelope::new(
                ApiError::new(
                    ApiErrorCode::MasterDataUnavailable,
                    e.to_string(),
                    json!({}),
                    "req-unknown",
                ),
                messages::MASTER_DATA_FAILED,
            ),
            Self::Forward(ForwardError::NetworkError { reason }) => ApiErrorEnvelope::new(
                ApiError::new(
                    ApiErrorCode::UpstreamUnavailable,
                    "upstream unreachable",
                    json!({"reason": reason}),
                    "req-unknown",
                ),
                messages::KPI_SUBMIT_FAILED,
            ),
            Self::Forward(ForwardError::RejectedByUpstream { message }) => ApiErrorEnvelope::new(
                ApiError::new(
                    ApiErrorCode::RejectedByUpstream,
                    "upstream rejected the batch",
                    json!({"upstream_message": message}),
                    "req-unknown",
                ),
                message.clone(),
            ),
            Self::Internal(reason) => ApiErrorEnvelope::new(
                ApiError::new(
                    ApiErrorCode::Internal,
                    reason.clone(),
                    json!({}),
                    "req-unknown",
                ),
                messages::INTERNAL,
            ),
        }
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        map_error(&self.to_envelope().error).status_code
    }
}

/// Runs one submission: input checks, master fetch, validation, forward.
///
/// Input errors return before any upstream call; validation errors return
/// before the forward call.
pub async fn submit_batch(
    upstream: &dyn UpstreamService,
    request: KpiBatchRequest,
    idempotency_key: Option<String>,
) -> Result<ForwardAck, SubmitError> {
    if request.batch.entries.is_empty() {
        return Err(ModelError::EmptyBatch.into());
    }
    let credentials = request.credentials()?;
    let batch = KpiBatch::try_from(request.batch)?;

    let master = fetch_master_indicators(upstream).await.map_err(|e| {
        error!(error = %e, "master data fetch failed");
        SubmitError::from(e)
    })?;
    validate_batch(batch.entries(), batch.employee_name(), &master).map_err(|e| {
        warn!(
            employee = batch.employee_name(),
            error = %e,
            "kpi batch failed validation"
        );
        SubmitError::from(e)
    })?;

    let key = match idempotency_key.filter(|k| !k.trim().is_empty()) {
        Some(key) => key,
        None => batch_idempotency_key(&credentials.email, &batch)
            .map_err(|e| SubmitError::Internal(format!("idempotency key: {e}")))?,
    };
    Ok(forward_batch(upstream, &credentials, &batch, &key).await?)
}
