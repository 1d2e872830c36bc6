// SPDX-License-Identifier: Apache-2.0

use crate::ClientError;
use rsia_kpi_core::{validate_batch, KpiValidationError};
use rsia_kpi_model::{
    indicators_for, EncodedEvidence, KpiBatch, KpiEntry, MasterIndicator, ModelError, Signature,
};

/// Assembles one employee's batch from the master rows assigned to them.
///
/// Rows carry the master target, performance area and unit of measure the
/// same way the KPI form fills them in. `build` runs the same validation the
/// proxy runs, so a batch that builds is one the proxy accepts.
#[derive(Debug, Clone)]
pub struct BatchBuilder<'m> {
    master: &'m [MasterIndicator],
    employee_name: String,
    division: String,
    unit: String,
    entries: Vec<KpiEntry>,
    signature: Option<Signature>,
}

impl<'m> BatchBuilder<'m> {
    pub fn for_employee(
        master: &'m [MasterIndicator],
        employee_name: &str,
    ) -> Result<Self, ClientError> {
        let first = indicators_for(master, employee_name)
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::UnknownEmployee(employee_name.to_string()))?;
        Ok(Self {
            master,
            employee_name: first.name.clone(),
            division: first.division.clone(),
            unit: first.unit.clone(),
            entries: Vec::new(),
            signature: None,
        })
    }

    /// Master rows this employee reports on.
    #[must_use]
    pub fn assigned(&self) -> Vec<&'m MasterIndicator> {
        indicators_for(self.master, &self.employee_name)
    }

    #[must_use]
    pub fn employee_name(&self) -> &str {
        &self.employee_name
    }

    #[must_use]
    pub fn entries(&self) -> &[KpiEntry] {
        &self.entries
    }

    /// Adds an entry reported against the master target.
    pub fn add(
        &mut self,
        indicator_name: &str,
        actual: &str,
        evidence: EncodedEvidence,
    ) -> Result<&mut Self, ClientError> {
        let target = self.row(indicator_name)?.target.clone();
        self.push(indicator_name, &target, actual, evidence)
    }

    /// Adds an entry with its own target; only fluctuating targets accept a new value.
    pub fn add_with_target(
        &mut self,
        indicator_name: &str,
        target: &str,
        actual: &str,
        evidence: EncodedEvidence,
    ) -> Result<&mut Self, ClientError> {
        self.push(indicator_name, target, actual, evidence)
    }

    pub fn sign(&mut self, signature: &EncodedEvidence) -> Result<&mut Self, ClientError> {
        self.signature = Some(Signature::from_evidence(signature)?);
        Ok(self)
    }

    pub fn build(&self) -> Result<KpiBatch, ClientError> {
        let signature = self
            .signature
            .as_ref()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();
        let batch = KpiBatch::new(
            &self.employee_name,
            &self.division,
            &self.unit,
            &signature,
            self.entries.clone(),
        )?;
        validate_batch(batch.entries(), batch.employee_name(), self.master)?;
        Ok(batch)
    }

    fn row(&self, indicator_name: &str) -> Result<&'m MasterIndicator, ClientError> {
        self.master
            .iter()
            .find(|m| m.belongs_to(&self.employee_name, indicator_name))
            .ok_or_else(|| {
                ClientError::from(KpiValidationError::UnknownIndicator {
                    indicator_name: indicator_name.to_string(),
                })
            })
    }

    fn push(
        &mut self,
        indicator_name: &str,
        target: &str,
        actual: &str,
        evidence: EncodedEvidence,
    ) -> Result<&mut Self, ClientError> {
        let row = self.row(indicator_name)?;
        if self
            .entries
            .iter()
            .any(|e| e.indicator_name() == indicator_name)
        {
            return Err(ModelError::DuplicateIndicator {
                indicator_name: indicator_name.to_string(),
            }
            .into());
        }
        let entry = KpiEntry::new(indicator_name, target, actual, evidence)?
            .with_field("nama", self.employee_name.as_str())
            .with_field("divisi", self.division.as_str())
            .with_field("unit", self.unit.as_str())
            .with_field("area_kinerja", row.performance_area.as_str())
            .with_field("satuan", row.unit_of_measure.as_str());
        self.entries.push(entry);
        Ok(self)
    }
}
