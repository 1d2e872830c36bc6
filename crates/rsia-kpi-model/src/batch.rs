// SPDX-License-Identifier: Apache-2.0

use crate::serde_helpers::{lenient_list, value_to_text};
use crate::{KpiEntry, KpiEntryWire, ModelError, Signature};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

const EMPLOYEE_NAME: &str = "nama";
const DIVISION: &str = "divisi";
const UNIT: &str = "unit";
const SIGNATURE: &str = "tanda_tangan";

/// Batch body as posted by the KPI form (identity fields excluded).
///
/// Only `indikator_list` is typed. Every other column, including ones this
/// proxy does not know, is kept as sent and forwarded with the batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KpiBatchWire {
    #[serde(
        rename = "indikator_list",
        default,
        deserialize_with = "lenient_list::deserialize"
    )]
    pub entries: Vec<KpiEntryWire>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl KpiBatchWire {
    #[must_use]
    pub fn employee_name(&self) -> String {
        self.text(EMPLOYEE_NAME)
    }

    #[must_use]
    pub fn division(&self) -> String {
        self.text(DIVISION)
    }

    #[must_use]
    pub fn unit(&self) -> String {
        self.text(UNIT)
    }

    #[must_use]
    pub fn signature(&self) -> String {
        self.text(SIGNATURE)
    }

    fn text(&self, key: &str) -> String {
        self.fields.get(key).map(value_to_text).unwrap_or_default()
    }
}

/// One employee's KPI submission for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KpiBatchWire", into = "KpiBatchWire")]
pub struct KpiBatch {
    employee_name: String,
    division: String,
    unit: String,
    signature: Signature,
    entries: Vec<KpiEntry>,
    fields: Map<String, Value>,
}

impl KpiBatch {
    pub fn new(
        employee_name: &str,
        division: &str,
        unit: &str,
        signature: &str,
        entries: Vec<KpiEntry>,
    ) -> Result<Self, ModelError> {
        let employee_name = require_employee_name(employee_name)?;
        if entries.is_empty() {
            return Err(ModelError::EmptyBatch);
        }
        let signature = Signature::parse(signature)?;
        ensure_unique(entries.iter().map(KpiEntry::indicator_name))?;
        let mut fields = Map::new();
        fields.insert(EMPLOYEE_NAME.to_string(), Value::from(employee_name.as_str()));
        fields.insert(DIVISION.to_string(), Value::from(division));
        fields.insert(UNIT.to_string(), Value::from(unit));
        fields.insert(SIGNATURE.to_string(), Value::from(signature.as_str()));
        Ok(Self {
            employee_name,
            division: division.to_string(),
            unit: unit.to_string(),
            signature,
            entries,
            fields,
        })
    }

    #[must_use]
    pub fn employee_name(&self) -> &str {
        &self.employee_name
    }

    #[must_use]
    pub fn division(&self) -> &str {
        &self.division
    }

    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    #[must_use]
    pub fn entries(&self) -> &[KpiEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level columns forwarded with the batch, as the caller sent them.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

fn require_employee_name(input: &str) -> Result<String, ModelError> {
    if input.trim().is_empty() {
        return Err(ModelError::MissingField("nama"));
    }
    Ok(input.to_string())
}

fn ensure_unique<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), ModelError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ModelError::DuplicateIndicator {
                indicator_name: name.to_string(),
            });
        }
    }
    Ok(())
}

impl TryFrom<KpiBatchWire> for KpiBatch {
    type Error = ModelError;

    fn try_from(wire: KpiBatchWire) -> Result<Self, Self::Error> {
        let employee_name = require_employee_name(&wire.employee_name())?;
        if wire.entries.is_empty() {
            return Err(ModelError::EmptyBatch);
        }
        let signature = Signature::parse(&wire.signature())?;
        let names: Vec<String> = wire.entries.iter().map(KpiEntryWire::indicator_name).collect();
        ensure_unique(names.iter().map(String::as_str))?;
        let division = wire.division();
        let unit = wire.unit();
        let entries = wire
            .entries
            .into_iter()
            .map(KpiEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            employee_name,
            division,
            unit,
            signature,
            entries,
            fields: wire.fields,
        })
    }
}

impl From<KpiBatch> for KpiBatchWire {
    fn from(batch: KpiBatch) -> Self {
        Self {
            entries: batch.entries.into_iter().map(KpiEntryWire::from).collect(),
            fields: batch.fields,
        }
    }
}
