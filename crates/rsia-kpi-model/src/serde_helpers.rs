// SPDX-License-Identifier: Apache-2.0

//! Spreadsheet cells come back as whatever JSON type the sheet inferred.
//! These helpers fold them into strings so comparisons stay textual.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[must_use]
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub mod lenient_string {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().map(value_to_text).unwrap_or_default())
    }
}

/// Reads a checkbox-like cell: `true`, `"true"`, `"1"` or a non-zero number.
#[must_use]
pub fn value_to_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true") || s == "1",
        Value::Number(n) => n.as_i64().is_some_and(|v| v != 0),
        _ => false,
    }
}

/// A list column that may arrive as `null`, a scalar or an object.
///
/// Anything that is not an array reads as empty so the caller's own
/// emptiness check decides the outcome.
pub mod lenient_list {
    use super::*;
    use serde::de::{DeserializeOwned, Error};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
                .collect(),
            _ => Ok(Vec::new()),
        }
    }
}
