// SPDX-License-Identifier: Apache-2.0

use crate::serde_helpers::value_to_text;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// A value typed into a spreadsheet-backed form field.
///
/// Kept as the JSON the caller sent so it is forwarded unchanged; compared
/// through its textual form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellValue(Value);

impl CellValue {
    #[must_use]
    pub fn text(&self) -> String {
        value_to_text(&self.0)
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }

    #[must_use]
    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text())
    }
}
