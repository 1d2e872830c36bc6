// SPDX-License-Identifier: Apache-2.0

//! Server-side check of a KPI batch against the master indicator table.

use rsia_kpi_model::{KpiEntry, MasterIndicator, FLUCTUATING_TARGET_MARKER};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum KpiValidationError {
    #[error("batch contains no entries")]
    EmptyBatch,
    #[error("employee name is blank")]
    BlankEmployeeName,
    #[error("indicator `{indicator_name}` is not assigned to this employee")]
    UnknownIndicator { indicator_name: String },
    #[error("target of indicator `{indicator_name}` is fixed and was changed")]
    TargetImmutable { indicator_name: String },
}

impl KpiValidationError {
    #[must_use]
    pub fn indicator_name(&self) -> Option<&str> {
        match self {
            Self::UnknownIndicator { indicator_name } | Self::TargetImmutable { indicator_name } => {
                Some(indicator_name)
            }
            Self::EmptyBatch | Self::BlankEmployeeName => None,
        }
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyBatch => "Indikator KPI tidak valid.".to_string(),
            Self::BlankEmployeeName => "Nama pegawai wajib diisi.".to_string(),
            Self::UnknownIndicator { indicator_name } => {
                format!("Indikator \"{indicator_name}\" tidak ditemukan.")
            }
            Self::TargetImmutable { indicator_name } => {
                format!("Target untuk indikator \"{indicator_name}\" tidak boleh diubah.")
            }
        }
    }
}

/// Checks every entry against the employee's master indicators.
///
/// First failure wins. An entry passes when a master row with the same
/// employee and indicator name exists and either its target carries the
/// fluctuating marker or the submitted target equals it ignoring case.
pub fn validate_batch(
    entries: &[KpiEntry],
    employee_name: &str,
    master: &[MasterIndicator],
) -> Result<(), KpiValidationError> {
    if entries.is_empty() {
        return Err(KpiValidationError::EmptyBatch);
    }
    if employee_name.trim().is_empty() {
        return Err(KpiValidationError::BlankEmployeeName);
    }
    for entry in entries {
        let indicator_name = entry.indicator_name();
        let Some(row) = master
            .iter()
            .find(|m| m.belongs_to(employee_name, indicator_name))
        else {
            return Err(KpiValidationError::UnknownIndicator {
                indicator_name: indicator_name.to_string(),
            });
        };
        let master_target = row.target.to_lowercase();
        if master_target.contains(FLUCTUATING_TARGET_MARKER) {
            continue;
        }
        if entry.target().text().to_lowercase() != master_target {
            return Err(KpiValidationError::TargetImmutable {
                indicator_name: indicator_name.to_string(),
            });
        }
    }
    Ok(())
}
