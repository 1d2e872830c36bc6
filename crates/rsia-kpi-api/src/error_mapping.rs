// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, ApiErrorCode};

pub const API_ERROR_SCHEMA_REF: &str = "#/components/schemas/ApiErrorEnvelope";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiErrorMapping {
    pub status_code: u16,
    pub schema_ref: &'static str,
}

#[must_use]
pub fn map_error(error: &ApiError) -> ApiErrorMapping {
    let status_code = match error.code {
        ApiErrorCode::InvalidRequest
        | ApiErrorCode::EmptyBatch
        | ApiErrorCode::UnknownIndicator
        | ApiErrorCode::TargetImmutable => 400,
        ApiErrorCode::MasterDataUnavailable => 503,
        ApiErrorCode::UpstreamUnavailable | ApiErrorCode::RejectedByUpstream => 502,
        ApiErrorCode::Internal => 500,
    };

    ApiErrorMapping {
        status_code,
        schema_ref: API_ERROR_SCHEMA_REF,
    }
}
