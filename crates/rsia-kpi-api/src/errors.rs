// SPDX-License-Identifier: Apache-2.0

use rsia_kpi_core::{EncodeError, KpiValidationError};
use rsia_kpi_model::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    InvalidRequest,
    EmptyBatch,
    UnknownIndicator,
    TargetImmutable,
    MasterDataUnavailable,
    UpstreamUnavailable,
    RejectedByUpstream,
    Internal,
}

pub const API_ERROR_CODES: [ApiErrorCode; 8] = [
    ApiErrorCode::InvalidRequest,
    ApiErrorCode::EmptyBatch,
    ApiErrorCode::UnknownIndicator,
    ApiErrorCode::TargetImmutable,
    ApiErrorCode::MasterDataUnavailable,
    ApiErrorCode::UpstreamUnavailable,
    ApiErrorCode::RejectedByUpstream,
    ApiErrorCode::Internal,
];

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "InvalidRequest",
            Self::EmptyBatch => "EmptyBatch",
            Self::UnknownIndicator => "UnknownIndicator",
            Self::TargetImmutable => "TargetImmutable",
            Self::MasterDataUnavailable => "MasterDataUnavailable",
            Self::UpstreamUnavailable => "UpstreamUnavailable",
            Self::RejectedByUpstream => "RejectedByUpstream",
            Self::Internal => "Internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(
        code: ApiErrorCode,
        message: impl Into<String>,
        details: Value,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn missing_field(name: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidRequest,
            format!("missing required field: {name}"),
            json!({"field_errors": [{"field": name, "reason": "required"}]}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn invalid_body(reason: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidRequest,
            "invalid request body",
            json!({"reason": reason}),
            "req-unknown",
        )
    }
}

/// Body of every error response the proxy produces itself.
///
/// `result` and `message` are what the legacy front end reads; `error` is the
/// typed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiErrorEnvelope {
    pub result: String,
    pub message: String,
    pub error: ApiError,
}

impl ApiErrorEnvelope {
    #[must_use]
    pub fn new(error: ApiError, user_message: impl Into<String>) -> Self {
        Self {
            result: "error".to_string(),
            message: user_message.into(),
            error,
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.error.request_id = request_id.to_string();
        self
    }

    #[must_use]
    pub fn code(&self) -> ApiErrorCode {
        self.error.code
    }
}

impl From<&ModelError> for ApiErrorEnvelope {
    fn from(err: &ModelError) -> Self {
        let (code, details) = match err {
            ModelError::EmptyBatch => (ApiErrorCode::EmptyBatch, json!({})),
            ModelError::MissingField(field) => (
                ApiErrorCode::InvalidRequest,
                json!({"field_errors": [{"field": field, "reason": "required"}]}),
            ),
            ModelError::DuplicateIndicator { indicator_name }
            | ModelError::MissingEvidence { indicator_name } => (
                ApiErrorCode::InvalidRequest,
                json!({"indicator_name": indicator_name}),
            ),
            ModelError::UnsupportedEvidenceType { mime_type } => (
                ApiErrorCode::InvalidRequest,
                json!({"mime_type": mime_type}),
            ),
            _ => (ApiErrorCode::InvalidRequest, json!({})),
        };
        Self::new(
            ApiError::new(code, err.to_string(), details, "req-unknown"),
            err.user_message(),
        )
    }
}

impl From<&KpiValidationError> for ApiErrorEnvelope {
    fn from(err: &KpiValidationError) -> Self {
        let code = match err {
            KpiValidationError::EmptyBatch => ApiErrorCode::EmptyBatch,
            KpiValidationError::UnknownIndicator { .. } => ApiErrorCode::UnknownIndicator,
            KpiValidationError::TargetImmutable { .. } => ApiErrorCode::TargetImmutable,
            _ => ApiErrorCode::InvalidRequest,
        };
        let details = match err.indicator_name() {
            Some(name) => json!({"indicator_name": name}),
            None => json!({}),
        };
        Self::new(
            ApiError::new(code, err.to_string(), details, "req-unknown"),
            err.user_message(),
        )
    }
}

impl From<&EncodeError> for ApiErrorEnvelope {
    fn from(err: &EncodeError) -> Self {
        let details = match err {
            EncodeError::UnsupportedType { mime_type } => json!({"mime_type": mime_type}),
            _ => json!({}),
        };
        Self::new(
            ApiError::new(
                ApiErrorCode::InvalidRequest,
                err.to_string(),
                details,
                "req-unknown",
            ),
            err.user_message(),
        )
    }
}

const _: fn() = || {
    fn assert_traits<T: Serialize + for<'de> Deserialize<'de>>() {}
    assert_traits::<ApiErrorCode>();
    assert_traits::<ApiErrorEnvelope>();
};
