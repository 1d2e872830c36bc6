// SPDX-License-Identifier: Apache-2.0

use crate::ClientError;
use rsia_kpi_core::{resolve_session_path, ResultExt};
use rsia_kpi_model::Session;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Session persisted between CLI invocations as one JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the location the environment selects (`RSIA_SESSION_FILE`, XDG, home).
    #[must_use]
    pub fn at_default_location() -> Self {
        Self::new(resolve_session_path())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_error(&self, reason: impl ToString) -> ClientError {
        ClientError::SessionFile {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    /// `None` when nobody is logged in.
    pub fn load(&self) -> Result<Option<Session>, ClientError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.file_error(e)),
        };
        let session = serde_json::from_slice::<Session>(&raw)
            .with_context("decode session")
            .map_err(|e| self.file_error(e))?;
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context("create session directory")
                .map_err(|e| self.file_error(e))?;
        }
        let body = serde_json::to_vec_pretty(session)
            .with_context("encode session")
            .map_err(|e| self.file_error(e))?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body)
            .with_context("write session")
            .map_err(|e| self.file_error(e))?;
        restrict_permissions(&staging).map_err(|e| self.file_error(e))?;
        fs::rename(&staging, &self.path)
            .with_context("install session")
            .map_err(|e| self.file_error(e))?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Removes the session file. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.file_error(e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
