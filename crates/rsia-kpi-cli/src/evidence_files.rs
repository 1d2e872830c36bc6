// SPDX-License-Identifier: Apache-2.0

use crate::CliError;
use rsia_kpi_client::ClientError;
use rsia_kpi_core::{
    encode, encode_signature, mime_for_filename, RawFile, SignaturePad, MAX_PAD_SIDE,
};
use rsia_kpi_model::EncodedEvidence;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One `--entry INDICATOR|ACTUAL|EVIDENCE_FILE[|TARGET]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryArg {
    pub indicator: String,
    pub actual: String,
    pub evidence: PathBuf,
    pub target: Option<String>,
}

impl EntryArg {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
        let (indicator, actual, evidence, target) = match parts.as_slice() {
            [indicator, actual, evidence] => (*indicator, *actual, *evidence, None),
            [indicator, actual, evidence, target] => (*indicator, *actual, *evidence, Some(*target)),
            _ => return Err("entry must be INDICATOR|ACTUAL|EVIDENCE_FILE[|TARGET]".to_string()),
        };
        if indicator.is_empty() || evidence.is_empty() {
            return Err("entry needs an indicator name and an evidence file".to_string());
        }
        Ok(Self {
            indicator: indicator.to_string(),
            actual: actual.to_string(),
            evidence: PathBuf::from(evidence),
            target: target.filter(|t| !t.is_empty()).map(ToString::to_string),
        })
    }
}

/// Reads a file, typing it by extension. Unknown extensions are left for
/// [`encode`] to refuse.
pub(crate) fn read_raw(path: &Path) -> Result<RawFile, CliError> {
    let bytes =
        fs::read(path).map_err(|e| CliError::input(format!("{}: {e}", path.display())))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = mime_for_filename(&filename).unwrap_or("application/octet-stream");
    Ok(RawFile::new(&filename, mime_type, bytes))
}

pub(crate) fn load_evidence(path: &Path) -> Result<EncodedEvidence, CliError> {
    let raw = read_raw(path)?;
    Ok(encode(&raw).map_err(ClientError::from)?)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StrokeFile {
    width: u32,
    height: u32,
    strokes: Vec<Vec<[f32; 2]>>,
}

/// Signature from an image, or from a `.json` stroke file drawn onto a pad.
pub(crate) fn load_signature(path: &Path) -> Result<EncodedEvidence, CliError> {
    let is_strokes = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_strokes {
        return load_evidence(path);
    }
    let raw =
        fs::read(path).map_err(|e| CliError::input(format!("{}: {e}", path.display())))?;
    let file: StrokeFile = serde_json::from_slice(&raw)
        .map_err(|e| CliError::input(format!("{}: {e}", path.display())))?;
    let sides = 1..=MAX_PAD_SIDE;
    if !sides.contains(&file.width) || !sides.contains(&file.height) {
        return Err(CliError::input(format!(
            "{}: pad must be between 1x1 and {MAX_PAD_SIDE}x{MAX_PAD_SIDE} pixels",
            path.display()
        )));
    }
    let mut pad = SignaturePad::new(file.width, file.height);
    for stroke in &file.strokes {
        let mut points = stroke.iter();
        if let Some([x, y]) = points.next() {
            pad.begin_stroke(*x, *y);
            for [x, y] in points {
                pad.line_to(*x, *y);
            }
        }
    }
    Ok(encode_signature(&pad).map_err(ClientError::from)?)
}
