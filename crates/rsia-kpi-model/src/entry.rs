// SPDX-License-Identifier: Apache-2.0

use crate::serde_helpers::{value_to_flag, value_to_text};
use crate::{CellValue, EncodedEvidence, ModelError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const INDICATOR_NAME: &str = "indikator_kpi";
const TARGET: &str = "target";
const ACTUAL: &str = "actual";
const EVIDENCE: &str = "bukti_nilai";
const EVIDENCE_NAME: &str = "bukti_nilai_name";
const EVIDENCE_IS_PDF: &str = "bukti_pdf";

/// `indikator_list[]` item exactly as the form posts it.
///
/// Columns are read leniently through the accessors; the object itself is
/// forwarded untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpiEntryWire {
    fields: Map<String, Value>,
}

impl KpiEntryWire {
    #[must_use]
    pub fn indicator_name(&self) -> String {
        self.text(INDICATOR_NAME)
    }

    #[must_use]
    pub fn target(&self) -> CellValue {
        self.cell(TARGET)
    }

    #[must_use]
    pub fn actual(&self) -> CellValue {
        self.cell(ACTUAL)
    }

    #[must_use]
    pub fn evidence(&self) -> String {
        self.text(EVIDENCE)
    }

    #[must_use]
    pub fn evidence_name(&self) -> String {
        self.text(EVIDENCE_NAME)
    }

    #[must_use]
    pub fn evidence_is_pdf(&self) -> bool {
        self.fields.get(EVIDENCE_IS_PDF).is_some_and(value_to_flag)
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn text(&self, key: &str) -> String {
        self.fields.get(key).map(value_to_text).unwrap_or_default()
    }

    fn cell(&self, key: &str) -> CellValue {
        self.fields.get(key).cloned().unwrap_or_default().into()
    }
}

impl From<Map<String, Value>> for KpiEntryWire {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// One reported indicator inside a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KpiEntryWire", into = "KpiEntryWire")]
pub struct KpiEntry {
    indicator_name: String,
    target: CellValue,
    actual: CellValue,
    evidence: EncodedEvidence,
    evidence_is_pdf: bool,
    fields: Map<String, Value>,
}

impl KpiEntry {
    pub fn new(
        indicator_name: &str,
        target: impl Into<CellValue>,
        actual: impl Into<CellValue>,
        evidence: EncodedEvidence,
    ) -> Result<Self, ModelError> {
        if indicator_name.trim().is_empty() {
            return Err(ModelError::MissingField("indikator_kpi"));
        }
        if evidence.is_empty() {
            return Err(ModelError::MissingEvidence {
                indicator_name: indicator_name.to_string(),
            });
        }
        let target = target.into();
        let actual = actual.into();
        let mut fields = Map::new();
        fields.insert(INDICATOR_NAME.to_string(), Value::from(indicator_name));
        fields.insert(TARGET.to_string(), target.as_json().clone());
        fields.insert(ACTUAL.to_string(), actual.as_json().clone());
        fields.insert(EVIDENCE.to_string(), Value::from(evidence.to_data_uri()));
        fields.insert(EVIDENCE_NAME.to_string(), Value::from(evidence.filename()));
        fields.insert(EVIDENCE_IS_PDF.to_string(), Value::from(evidence.is_pdf()));
        Ok(Self {
            indicator_name: indicator_name.to_string(),
            target,
            actual,
            evidence_is_pdf: evidence.is_pdf(),
            evidence,
            fields,
        })
    }

    /// Attaches a pass-through form field such as `area_kinerja` or `satuan`.
    ///
    /// Validated columns are owned by [`KpiEntry::new`] and left as they are.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        let validated = [
            INDICATOR_NAME,
            TARGET,
            ACTUAL,
            EVIDENCE,
            EVIDENCE_NAME,
            EVIDENCE_IS_PDF,
        ];
        if !validated.contains(&key) {
            self.fields.insert(key.to_string(), value.into());
        }
        self
    }

    #[must_use]
    pub fn indicator_name(&self) -> &str {
        &self.indicator_name
    }

    #[must_use]
    pub fn target(&self) -> &CellValue {
        &self.target
    }

    #[must_use]
    pub fn actual(&self) -> &CellValue {
        &self.actual
    }

    #[must_use]
    pub fn evidence(&self) -> &EncodedEvidence {
        &self.evidence
    }

    #[must_use]
    pub fn evidence_is_pdf(&self) -> bool {
        self.evidence_is_pdf
    }

    #[must_use]
    pub fn performance_area(&self) -> Option<String> {
        self.fields.get("area_kinerja").map(value_to_text)
    }

    #[must_use]
    pub fn unit_of_measure(&self) -> Option<String> {
        self.fields.get("satuan").map(value_to_text)
    }

    /// The object forwarded upstream, as the caller sent it.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<KpiEntryWire> for KpiEntry {
    type Error = ModelError;

    fn try_from(wire: KpiEntryWire) -> Result<Self, Self::Error> {
        let indicator_name = wire.indicator_name();
        if indicator_name.trim().is_empty() {
            return Err(ModelError::MissingField(INDICATOR_NAME));
        }
        let uri = wire.evidence();
        if uri.trim().is_empty() {
            return Err(ModelError::MissingEvidence { indicator_name });
        }
        let evidence = EncodedEvidence::parse_data_uri(&wire.evidence_name(), &uri)?;
        if evidence.is_empty() {
            return Err(ModelError::MissingEvidence { indicator_name });
        }
        Ok(Self {
            indicator_name,
            target: wire.target(),
            actual: wire.actual(),
            evidence,
            evidence_is_pdf: wire.evidence_is_pdf(),
            fields: wire.fields,
        })
    }
}

impl From<KpiEntry> for KpiEntryWire {
    fn from(entry: KpiEntry) -> Self {
        Self {
            fields: entry.fields,
        }
    }
}
