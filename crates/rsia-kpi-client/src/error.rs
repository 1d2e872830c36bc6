// SPDX-License-Identifier: Apache-2.0

use rsia_kpi_api::ApiErrorEnvelope;
use rsia_kpi_core::{EncodeError, ExitCode, KpiValidationError};
use rsia_kpi_model::ModelError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error("not logged in")]
    NotLoggedIn,
    #[error("{endpoint}: request failed: {reason}")]
    Transport {
        endpoint: &'static str,
        reason: String,
    },
    #[error("{endpoint}: HTTP {status}: {}", .envelope.error.message)]
    Api {
        endpoint: &'static str,
        status: u16,
        envelope: Box<ApiErrorEnvelope>,
    },
    #[error("{endpoint}: refused: {message}")]
    Rejected {
        endpoint: &'static str,
        message: String,
    },
    #[error("{endpoint}: unreadable reply: {reason}")]
    InvalidReply {
        endpoint: &'static str,
        reason: String,
    },
    #[error("employee `{0}` has no indicators in master data")]
    UnknownEmployee(String),
    #[error("session file {}: {reason}", .path.display())]
    SessionFile { path: PathBuf, reason: String },
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Validation(#[from] KpiValidationError),
}

impl ClientError {
    /// Text shown to the employee.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotLoggedIn => "Silakan login terlebih dahulu.".to_string(),
            Self::Transport { .. } => "Gagal terhubung ke server.".to_string(),
            Self::Api { envelope, .. } => envelope.message.clone(),
            Self::Rejected { message, .. } => message.clone(),
            Self::InvalidReply { .. } => "Balasan server tidak dapat dibaca.".to_string(),
            Self::UnknownEmployee(name) => format!("Nama \"{name}\" tidak ditemukan."),
            Self::SessionFile { .. } => "Sesi login tidak dapat dibaca.".to_string(),
            Self::Model(e) => e.user_message(),
            Self::Encode(e) => e.user_message(),
            Self::Validation(e) => e.user_message(),
        }
    }

    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::NotLoggedIn => ExitCode::Usage,
            Self::Api { status, .. } if *status < 500 => ExitCode::Validation,
            Self::Model(_) | Self::Encode(_) | Self::Validation(_) | Self::UnknownEmployee(_) => {
                ExitCode::Validation
            }
            Self::Api { .. }
            | Self::Transport { .. }
            | Self::Rejected { .. }
            | Self::InvalidReply { .. } => ExitCode::DependencyFailure,
            Self::SessionFile { .. } => ExitCode::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsia_kpi_api::{ApiError, ApiErrorCode};
    use serde_json::json;

    #[test]
    fn exit_codes_split_caller_faults_from_dependency_faults() {
        let envelope = |code| {
            Box::new(ApiErrorEnvelope::new(
                ApiError::new(code, "x", json!({}), "req-1"),
                "pesan",
            ))
        };
        let bad_input = ClientError::Api {
            endpoint: "kpi-batch",
            status: 400,
            envelope: envelope(ApiErrorCode::TargetImmutable),
        };
        assert_eq!(bad_input.exit_code(), ExitCode::Validation);
        assert_eq!(bad_input.user_message(), "pesan");

        let upstream_down = ClientError::Api {
            endpoint: "kpi-batch",
            status: 502,
            envelope: envelope(ApiErrorCode::UpstreamUnavailable),
        };
        assert_eq!(upstream_down.exit_code(), ExitCode::DependencyFailure);
        assert_eq!(ClientError::NotLoggedIn.exit_code(), ExitCode::Usage);
        assert_eq!(
            ClientError::from(ModelError::EmptyBatch).exit_code(),
            ExitCode::Validation
        );
    }
}
