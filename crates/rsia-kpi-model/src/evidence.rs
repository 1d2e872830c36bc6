// SPDX-License-Identifier: Apache-2.0

use crate::ModelError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_PDF: &str = "application/pdf";

/// Browsers report some JPEGs as `image/jpg`; it is kept as sent.
pub const ACCEPTED_EVIDENCE_TYPES: [&str; 4] = [MIME_JPEG, "image/jpg", MIME_PNG, MIME_PDF];

#[must_use]
pub fn is_accepted_evidence_type(mime_type: &str) -> bool {
    let normalized = mime_type.trim().to_ascii_lowercase();
    ACCEPTED_EVIDENCE_TYPES.contains(&normalized.as_str())
}

/// A file in transportable form: Base64 payload plus its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEvidence {
    filename: String,
    mime_type: String,
    payload: String,
}

impl EncodedEvidence {
    /// Builds evidence from an already Base64-encoded payload.
    ///
    /// An empty payload is allowed here (an untouched signature canvas);
    /// entries and batches reject it at their own boundary.
    pub fn from_base64(filename: &str, mime_type: &str, payload: &str) -> Result<Self, ModelError> {
        let mime_type = mime_type.trim().to_ascii_lowercase();
        if !is_accepted_evidence_type(&mime_type) {
            return Err(ModelError::UnsupportedEvidenceType { mime_type });
        }
        let payload = payload.trim();
        if !payload.is_empty() {
            STANDARD
                .decode(payload)
                .map_err(|e| ModelError::MalformedEvidence {
                    reason: format!("payload is not base64: {e}"),
                })?;
        }
        Ok(Self {
            filename: filename.trim().to_string(),
            mime_type,
            payload: payload.to_string(),
        })
    }

    /// Parses `data:<mime>;base64,<payload>`.
    pub fn parse_data_uri(filename: &str, uri: &str) -> Result<Self, ModelError> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| ModelError::MalformedEvidence {
                reason: "expected a data URI".to_string(),
            })?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| ModelError::MalformedEvidence {
                reason: "data URI has no payload separator".to_string(),
            })?;
        let mut parts = meta.split(';');
        let mime_type = parts.next().unwrap_or_default();
        if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
            return Err(ModelError::MalformedEvidence {
                reason: "data URI must be base64 encoded".to_string(),
            });
        }
        Self::from_base64(filename, mime_type, payload)
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    #[must_use]
    pub fn is_pdf(&self) -> bool {
        self.mime_type == MIME_PDF
    }

    /// Data URI form; empty when the payload is empty.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        if self.payload.is_empty() {
            return String::new();
        }
        format!("data:{};base64,{}", self.mime_type, self.payload)
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>, ModelError> {
        STANDARD
            .decode(&self.payload)
            .map_err(|e| ModelError::MalformedEvidence {
                reason: format!("payload is not base64: {e}"),
            })
    }
}

/// Encoded freehand signature as sent in `tanda_tangan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    pub fn parse(input: &str) -> Result<Self, ModelError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ModelError::MissingSignature);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn from_evidence(evidence: &EncodedEvidence) -> Result<Self, ModelError> {
        Self::parse(&evidence.to_data_uri())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
