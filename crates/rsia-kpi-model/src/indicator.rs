// SPDX-License-Identifier: Apache-2.0

use crate::serde_helpers::lenient_string;
use serde::{Deserialize, Serialize};

/// Marker embedded in a master target meaning "target may vary per submission".
pub const FLUCTUATING_TARGET_MARKER: &str = "fluktuatif";

/// One master-data row: the authoritative target of an indicator for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterIndicator {
    #[serde(rename = "nama", default, deserialize_with = "lenient_string::deserialize")]
    pub name: String,
    #[serde(rename = "divisi", default, deserialize_with = "lenient_string::deserialize")]
    pub division: String,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub unit: String,
    #[serde(
        rename = "area_kinerja",
        default,
        deserialize_with = "lenient_string::deserialize"
    )]
    pub performance_area: String,
    #[serde(
        rename = "indikator_kpi",
        default,
        deserialize_with = "lenient_string::deserialize"
    )]
    pub indicator_name: String,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub target: String,
    #[serde(rename = "satuan", default, deserialize_with = "lenient_string::deserialize")]
    pub unit_of_measure: String,
}

impl MasterIndicator {
    #[must_use]
    pub fn new(name: &str, indicator_name: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            division: String::new(),
            unit: String::new(),
            performance_area: String::new(),
            indicator_name: indicator_name.to_string(),
            target: target.to_string(),
            unit_of_measure: String::new(),
        }
    }

    #[must_use]
    pub fn with_placement(mut self, division: &str, unit: &str) -> Self {
        self.division = division.to_string();
        self.unit = unit.to_string();
        self
    }

    #[must_use]
    pub fn is_target_fluctuating(&self) -> bool {
        is_fluctuating_target(&self.target)
    }

    #[must_use]
    pub fn belongs_to(&self, employee_name: &str, indicator_name: &str) -> bool {
        self.name == employee_name && self.indicator_name == indicator_name
    }
}

/// Case-insensitive substring test for [`FLUCTUATING_TARGET_MARKER`].
#[must_use]
pub fn is_fluctuating_target(target: &str) -> bool {
    target.to_lowercase().contains(FLUCTUATING_TARGET_MARKER)
}

/// Distinct employee names in first-seen order.
#[must_use]
pub fn employee_names(master: &[MasterIndicator]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for row in master {
        if !row.name.is_empty() && !out.contains(&row.name.as_str()) {
            out.push(&row.name);
        }
    }
    out
}

/// Indicators assigned to one employee, in master order.
#[must_use]
pub fn indicators_for<'a>(
    master: &'a [MasterIndicator],
    employee_name: &str,
) -> Vec<&'a MasterIndicator> {
    master.iter().filter(|m| m.name == employee_name).collect()
}
