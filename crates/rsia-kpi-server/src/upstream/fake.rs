// SPDX-License-Identifier: Apache-2.0

use super::{UpstreamError, UpstreamService};
use async_trait::async_trait;
use rsia_kpi_api::{UpstreamReply, UpstreamRequest};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub action: &'static str,
    pub body: Value,
    pub idempotency_key: Option<String>,
}

/// In-memory scripting service with scripted replies per action.
///
/// Actions without a scripted reply answer `{"result":"success","message":null}`.
#[derive(Default)]
pub struct FakeUpstream {
    pub replies: Mutex<HashMap<&'static str, Result<UpstreamReply, UpstreamError>>>,
    pub calls: Mutex<Vec<RecordedCall>>,
    pub call_count: AtomicU64,
}

impl FakeUpstream {
    pub async fn respond(&self, action: &'static str, reply: UpstreamReply) {
        self.replies.lock().await.insert(action, Ok(reply));
    }

    pub async fn fail(&self, action: &'static str, error: UpstreamError) {
        self.replies.lock().await.insert(action, Err(error));
    }

    pub async fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    #[must_use]
    pub fn calls_made(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl UpstreamService for FakeUpstream {
    fn backend_tag(&self) -> &'static str {
        "fake"
    }

    async fn call(
        &self,
        request: &UpstreamRequest,
        idempotency_key: Option<&str>,
    ) -> Result<UpstreamReply, UpstreamError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::to_value(request)
            .map_err(|e| UpstreamError::InvalidReply(e.to_string()))?;
        self.calls.lock().await.push(RecordedCall {
            action: request.action(),
            body,
            idempotency_key: idempotency_key.map(ToString::to_string),
        });
        self.replies
            .lock()
            .await
            .get(request.action())
            .cloned()
            .unwrap_or_else(|| Ok(UpstreamReply::success(Value::Null)))
    }
}
