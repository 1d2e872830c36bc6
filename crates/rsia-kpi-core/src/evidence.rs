// SPDX-License-Identifier: Apache-2.0

use crate::signature::SignaturePad;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rsia_kpi_model::{
    is_accepted_evidence_type, EncodedEvidence, ModelError, MIME_JPEG, MIME_PDF, MIME_PNG,
};
use thiserror::Error;

/// A file as picked by the user, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    #[must_use]
    pub fn new(filename: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("file type `{mime_type}` is not accepted")]
    UnsupportedType { mime_type: String },
    #[error("signature could not be rendered: {0}")]
    Raster(#[from] std::io::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl EncodeError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedType { .. } => "File harus berupa JPG, JPEG, PNG, atau PDF.".to_string(),
            Self::Raster(_) => "Tanda tangan tidak dapat diproses.".to_string(),
            Self::Model(e) => e.user_message(),
        }
    }
}

/// Base64-encodes `file` after checking its type against the accepted set.
pub fn encode(file: &RawFile) -> Result<EncodedEvidence, EncodeError> {
    if !is_accepted_evidence_type(&file.mime_type) {
        return Err(EncodeError::UnsupportedType {
            mime_type: file.mime_type.clone(),
        });
    }
    let payload = STANDARD.encode(&file.bytes);
    Ok(EncodedEvidence::from_base64(
        &file.filename,
        &file.mime_type,
        &payload,
    )?)
}

/// Accepted MIME type for a file name, by extension.
#[must_use]
pub fn mime_for_filename(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some(MIME_JPEG),
        "png" => Some(MIME_PNG),
        "pdf" => Some(MIME_PDF),
        _ => None,
    }
}

/// PNG evidence of the drawn signature. An untouched pad gives an empty payload.
pub fn encode_signature(pad: &SignaturePad) -> Result<EncodedEvidence, EncodeError> {
    let png = pad.to_png()?;
    encode(&RawFile::new("tanda_tangan.png", MIME_PNG, png))
}
