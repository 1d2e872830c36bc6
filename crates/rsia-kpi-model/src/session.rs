// SPDX-License-Identifier: Apache-2.0

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of times an employee may revise one submitted entry.
pub const MAX_EDITS_PER_ENTRY: u32 = 2;

/// Identity forwarded with every batch: the upstream authenticates on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Result<Self, ModelError> {
        if email.trim().is_empty() {
            return Err(ModelError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(ModelError::MissingField("password"));
        }
        Ok(Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
    }
}

/// Logged-in user context. Created by a successful login, dropped on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Session {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub credential: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Session {
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.credential.clone(),
        }
    }
}

/// Client-side mirror of the upstream edit counters.
///
/// Advisory: the upstream holds the authoritative count and this only
/// saves a round trip for edits that would be refused anyway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCounter {
    counts: BTreeMap<String, u32>,
}

impl EditCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(&self, kpi_key: &str) -> u32 {
        self.counts.get(kpi_key).copied().unwrap_or(0)
    }

    pub fn set(&mut self, kpi_key: &str, count: u32) {
        self.counts.insert(kpi_key.to_string(), count);
    }

    pub fn ensure_can_edit(&self, kpi_key: &str) -> Result<(), ModelError> {
        if self.count(kpi_key) >= MAX_EDITS_PER_ENTRY {
            return Err(ModelError::EditLimitReached {
                kpi_key: kpi_key.to_string(),
                limit: MAX_EDITS_PER_ENTRY,
            });
        }
        Ok(())
    }

    /// Stores the upstream's count when it reported one, else increments locally.
    pub fn record_edit(&mut self, kpi_key: &str, upstream_count: Option<u32>) -> u32 {
        let next = upstream_count.unwrap_or_else(|| self.count(kpi_key) + 1);
        self.set(kpi_key, next);
        next
    }
}
