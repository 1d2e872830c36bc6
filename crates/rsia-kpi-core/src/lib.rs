// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod canonical;
mod errors;
pub mod evidence;
pub mod signature;
pub mod validation;

use std::path::PathBuf;

pub use errors::{ErrorContext, ResultExt};
pub use evidence::{encode, encode_signature, mime_for_filename, EncodeError, RawFile};
pub use signature::{GrayImage, Point, SignaturePad, MAX_PAD_SIDE};
pub use validation::{validate_batch, KpiValidationError};

pub const CRATE_NAME: &str = "rsia-kpi-core";

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Usage = 2,
    Validation = 3,
    DependencyFailure = 4,
    Internal = 10,
}

pub const ENV_RSIA_SESSION_FILE: &str = "RSIA_SESSION_FILE";

/// Where the CLI keeps the logged-in session between invocations.
#[must_use]
pub fn resolve_session_path() -> PathBuf {
    if let Some(explicit) = non_blank_env(ENV_RSIA_SESSION_FILE) {
        return PathBuf::from(explicit);
    }
    if let Some(xdg_config_home) = non_blank_env("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg_config_home)
            .join("rsia-kpi")
            .join("session.json");
    }
    if let Some(home) = non_blank_env("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("rsia-kpi")
            .join("session.json");
    }
    PathBuf::from(".rsia-kpi").join("session.json")
}

fn non_blank_env(name: &str) -> Option<String> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
