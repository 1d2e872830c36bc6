// SPDX-License-Identifier: Apache-2.0

use crate::{CliError, OutputMode};
use rsia_kpi_core::canonical;
use serde_json::Value;

pub(crate) fn emit_ok(output: OutputMode, payload: &Value) -> Result<(), CliError> {
    let text = if output.json {
        let bytes = canonical::stable_json_bytes(payload)
            .map_err(|e| CliError::internal(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CliError::internal(e.to_string()))?
    } else {
        serde_json::to_string_pretty(payload).map_err(|e| CliError::internal(e.to_string()))?
    };
    println!("{text}");
    Ok(())
}
