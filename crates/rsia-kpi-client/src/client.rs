// SPDX-License-Identifier: Apache-2.0

use crate::ClientError;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use rsia_kpi_api::{
    ApiErrorEnvelope, KpiBatchRequest, LoginRequest, RegisterRequest, UpstreamReply,
};
use rsia_kpi_core::canonical::batch_idempotency_key;
use rsia_kpi_core::RawFile;
use rsia_kpi_model::serde_helpers::value_to_text;
use rsia_kpi_model::{EditCounter, KpiBatch, KpiBatchWire, MasterIndicator, Session};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const ENV_RSIA_API_BASE_URL: &str = "RSIA_API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
/// Covers the proxy's own upstream timeout plus evidence upload time.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct KpiClient {
    base_url: String,
    http: reqwest::Client,
    session: Option<Session>,
    edits: EditCounter,
}

impl KpiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                endpoint: "client",
                reason: e.to_string(),
            })?;
        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            http,
            session: None,
            edits: EditCounter::new(),
        })
    }

    /// Resumes a session restored from a [`crate::SessionStore`].
    #[must_use]
    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn require_session(&self) -> Result<&Session, ClientError> {
        self.session.as_ref().ok_or(ClientError::NotLoggedIn)
    }

    #[must_use]
    pub fn edits(&self) -> &EditCounter {
        &self.edits
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<UpstreamReply, ClientError> {
        let body = RegisterRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            name: name.trim().to_string(),
        };
        let req = self.http.post(self.url("/api/register")).json(&body);
        call("register", req).await
    }

    /// Logs in and keeps the resulting session.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, ClientError> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let req = self.http.post(self.url("/api/login")).json(&body);
        let reply = call("login", req).await?;
        let text = |key: &str| {
            reply
                .extra
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let session = Session {
            uid: text("uid"),
            name: text("name"),
            email: body.email,
            credential: body.password,
            photo: text("photo"),
            is_admin: false,
        };
        info!(email = %session.email, "logged in");
        self.edits = EditCounter::new();
        Ok(&*self.session.insert(session))
    }

    /// Drops the session. Returns the one that was active.
    pub fn logout(&mut self) -> Option<Session> {
        self.edits = EditCounter::new();
        self.session.take()
    }

    pub async fn indicators(&self) -> Result<Vec<MasterIndicator>, ClientError> {
        let req = self.http.get(self.url("/api/indikator-data"));
        let reply = call("indikator-data", req).await?;
        reply
            .master_indicators()
            .map_err(|e| ClientError::InvalidReply {
                endpoint: "indikator-data",
                reason: e.to_string(),
            })
    }

    /// Submits a batch under the active session.
    ///
    /// The idempotency key depends only on the identity and the batch, so a
    /// retry after a lost reply carries the same key.
    pub async fn submit(&self, batch: &KpiBatch) -> Result<UpstreamReply, ClientError> {
        let session = self.require_session()?;
        let credentials = session.credentials();
        let key = batch_idempotency_key(&credentials.email, batch).map_err(|e| {
            ClientError::InvalidReply {
                endpoint: "kpi-batch",
                reason: format!("idempotency key: {e}"),
            }
        })?;
        let body = KpiBatchRequest {
            email: credentials.email,
            password: credentials.password,
            batch: KpiBatchWire::from(batch.clone()),
        };
        debug!(entries = batch.len(), idempotency_key = %key, "submitting kpi batch");
        let req = self
            .http
            .post(self.url("/api/kpi-batch"))
            .header("Idempotency-Key", key)
            .json(&body);
        call("kpi-batch", req).await
    }

    /// The session user's own KPI rows.
    ///
    /// Also refreshes the edit counters from each row's `edit_count`, keyed by
    /// the row `id` or, lacking one, its indicator name.
    pub async fn my_kpi(&mut self) -> Result<Value, ClientError> {
        let session = self.require_session()?;
        let req = self
            .http
            .get(self.url("/api/kpi-my"))
            .query(&[("email", session.email.as_str())]);
        let rows = call("kpi-my", req).await?.message;
        for row in rows.as_array().into_iter().flatten() {
            let key = ["id", "indikator_kpi"]
                .iter()
                .filter_map(|field| row.get(*field))
                .map(value_to_text)
                .find(|key| !key.is_empty());
            if let Some(key) = key {
                let count = row.get("edit_count").map_or(0, count_of);
                self.edits.set(&key, count);
            }
        }
        Ok(rows)
    }

    /// Revises one submitted entry, at most [`rsia_kpi_model::MAX_EDITS_PER_ENTRY`] times.
    pub async fn update_kpi(
        &mut self,
        kpi_key: &str,
        actual: Option<&str>,
        evidence: Option<RawFile>,
    ) -> Result<UpstreamReply, ClientError> {
        self.edits.ensure_can_edit(kpi_key)?;
        let email = self.require_session()?.email.clone();
        let mut form = Form::new()
            .text("kpiKey", kpi_key.to_string())
            .text("email", email);
        if let Some(actual) = actual {
            form = form.text("actual", actual.to_string());
        }
        if let Some(file) = evidence {
            let part = Part::bytes(file.bytes)
                .file_name(file.filename)
                .mime_str(&file.mime_type)
                .map_err(|e| ClientError::Transport {
                    endpoint: "kpi-update",
                    reason: e.to_string(),
                })?;
            form = form.part("buktiFile", part);
        }
        let req = self.http.post(self.url("/api/kpi-update")).multipart(form);
        let reply = call("kpi-update", req).await?;
        let count = self.edits.record_edit(kpi_key, reply.edit_count());
        info!(kpi_key, edit_count = count, "kpi entry updated");
        Ok(reply)
    }

    /// KPI rows of the team the session user supervises.
    pub async fn team_kpi(&self) -> Result<Value, ClientError> {
        let session = self.require_session()?;
        let req = self
            .http
            .post(self.url("/api/team-kpi"))
            .json(&json!({ "nama": session.name }));
        Ok(call("team-kpi", req).await?.message)
    }
}

fn count_of(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

async fn send(endpoint: &'static str, req: RequestBuilder) -> Result<Response, ClientError> {
    req.send().await.map_err(|e| {
        warn!(endpoint, error = %e, "request failed");
        ClientError::Transport {
            endpoint,
            reason: e.to_string(),
        }
    })
}

/// Decodes a reply, turning error envelopes and refusals into [`ClientError`].
fn decode(endpoint: &'static str, status: u16, body: &[u8]) -> Result<UpstreamReply, ClientError> {
    if (200..300).contains(&status) {
        return serde_json::from_slice::<UpstreamReply>(body).map_err(|e| {
            ClientError::InvalidReply {
                endpoint,
                reason: e.to_string(),
            }
        });
    }
    if let Ok(envelope) = serde_json::from_slice::<ApiErrorEnvelope>(body) {
        return Err(ClientError::Api {
            endpoint,
            status,
            envelope: Box::new(envelope),
        });
    }
    // Refusals relayed with the upstream's own body (team-kpi).
    match serde_json::from_slice::<UpstreamReply>(body) {
        Ok(reply) => Err(ClientError::Rejected {
            endpoint,
            message: reply.message_text(),
        }),
        Err(_) => Err(ClientError::InvalidReply {
            endpoint,
            reason: format!("HTTP {status}"),
        }),
    }
}

/// Sends one request and keeps only successful replies.
async fn call(endpoint: &'static str, req: RequestBuilder) -> Result<UpstreamReply, ClientError> {
    let resp = send(endpoint, req).await?;
    let status = resp.status().as_u16();
    let body = resp.bytes().await.map_err(|e| ClientError::Transport {
        endpoint,
        reason: e.to_string(),
    })?;
    let reply = decode(endpoint, status, &body)?;
    if reply.is_success() {
        Ok(reply)
    } else {
        Err(ClientError::Rejected {
            endpoint,
            message: reply.message_text(),
        })
    }
}
