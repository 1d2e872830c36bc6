// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Rejections raised while constructing model values from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("batch must contain at least one indicator entry")]
    EmptyBatch,
    #[error("required field `{0}` is missing or blank")]
    MissingField(&'static str),
    #[error("signature is required")]
    MissingSignature,
    #[error("indicator `{indicator_name}` appears more than once in the batch")]
    DuplicateIndicator { indicator_name: String },
    #[error("indicator `{indicator_name}` has no evidence attached")]
    MissingEvidence { indicator_name: String },
    #[error("evidence type `{mime_type}` is not accepted")]
    UnsupportedEvidenceType { mime_type: String },
    #[error("malformed evidence: {reason}")]
    MalformedEvidence { reason: String },
    #[error("edit limit of {limit} reached for `{kpi_key}`")]
    EditLimitReached { kpi_key: String, limit: u32 },
}

impl ModelError {
    /// Message shown to employees by the legacy front end.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyBatch => "Indikator KPI tidak valid.".to_string(),
            Self::MissingField(field) => format!("Field \"{field}\" wajib diisi."),
            Self::MissingSignature => "Tanda tangan wajib diisi.".to_string(),
            Self::DuplicateIndicator { indicator_name } => {
                format!("Indikator \"{indicator_name}\" sudah ditambahkan.")
            }
            Self::MissingEvidence { indicator_name } => {
                format!("Bukti nilai untuk indikator \"{indicator_name}\" wajib diunggah.")
            }
            Self::UnsupportedEvidenceType { .. } => {
                "File harus berupa JPG, JPEG, PNG, atau PDF.".to_string()
            }
            Self::MalformedEvidence { .. } => "File bukti tidak dapat dibaca.".to_string(),
            Self::EditLimitReached { limit, .. } => {
                format!("Anda hanya bisa mengedit KPI ini maksimal {limit} kali.")
            }
        }
    }
}
