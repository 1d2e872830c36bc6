// SPDX-License-Identifier: Apache-2.0

use crate::upstream::{UpstreamError, UpstreamService};
use rsia_kpi_api::{UpstreamReply, UpstreamRequest};
use rsia_kpi_model::{Credentials, KpiBatch, KpiBatchWire};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

/// Upstream acknowledgement of a stored batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardAck {
    pub message: Value,
    pub reply: UpstreamReply,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForwardError {
    #[error("upstream unreachable: {reason}")]
    NetworkError { reason: String },
    #[error("upstream rejected the batch: {message}")]
    RejectedByUpstream { message: String },
}

impl From<UpstreamError> for ForwardError {
    fn from(err: UpstreamError) -> Self {
        Self::NetworkError {
            reason: err.to_string(),
        }
    }
}

/// Relays a validated batch upstream in exactly one request.
///
/// The body carries every column the caller sent, unchanged, under the
/// `kpiBatch` action.
pub async fn forward_batch(
    upstream: &dyn UpstreamService,
    credentials: &Credentials,
    batch: &KpiBatch,
    idempotency_key: &str,
) -> Result<ForwardAck, ForwardError> {
    let mut wire = KpiBatchWire::from(batch.clone());
    // The request tag owns `action`.
    wire.fields.remove("action");
    let request = UpstreamRequest::KpiBatch {
        email: credentials.email.clone(),
        password: credentials.password.clone(),
        batch: wire,
    };
    let reply = upstream
        .call(&request, Some(idempotency_key))
        .await
        .map_err(|e| {
            error!(error = %e, idempotency_key, "kpi batch forward failed");
            ForwardError::from(e)
        })?;
    if !reply.is_success() {
        let message = reply.message_text();
        warn!(message = %message, idempotency_key, "kpi batch rejected upstream");
        return Err(ForwardError::RejectedByUpstream { message });
    }
    info!(
        entries = batch.len(),
        idempotency_key, "kpi batch stored upstream"
    );
    Ok(ForwardAck {
        message: reply.message.clone(),
        reply,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FakeUpstream;
    use rsia_kpi_model::{EncodedEvidence, KpiEntry, MIME_PNG};

    fn batch() -> KpiBatch {
        let ev = EncodedEvidence::from_base64("b.png", MIME_PNG, "AA==").expect("evidence");
        let entry = KpiEntry::new("Attendance", "95%", "96%", ev)
            .expect("entry")
            .with_field("satuan", "%");
        KpiBatch::new("Alice", "Medis", "IGD", "data:image/png;base64,AA==", vec![entry])
            .expect("batch")
    }

    fn credentials() -> Credentials {
        Credentials::new("alice@rsia.id", "pw").expect("credentials")
    }

    #[tokio::test]
    async fn forwards_once_with_action_identity_and_key() {
        let upstream = FakeUpstream::default();
        upstream
            .respond("kpiBatch", UpstreamReply::success(Value::from("KPI tersimpan")))
            .await;
        let ack = forward_batch(&upstream, &credentials(), &batch(), "key-1")
            .await
            .expect("ack");
        assert_eq!(ack.message, Value::from("KPI tersimpan"));

        let calls = upstream.recorded().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].action, "kpiBatch");
        assert_eq!(calls[0].idempotency_key.as_deref(), Some("key-1"));
        assert_eq!(calls[0].body["email"], "alice@rsia.id");
        assert_eq!(calls[0].body["nama"], "Alice");
        assert_eq!(calls[0].body["indikator_list"][0]["satuan"], "%");
    }

    #[tokio::test]
    async fn caller_columns_are_forwarded_but_cannot_rename_the_action() {
        let upstream = FakeUpstream::default();
        upstream
            .respond("kpiBatch", UpstreamReply::success(Value::from("ok")))
            .await;
        let batch: KpiBatch = serde_json::from_value(serde_json::json!({
            "action": "register",
            "periode": "2026-01",
            "nama": "Alice",
            "tanda_tangan": "data:image/png;base64,AA==",
            "indikator_list": [{
                "indikator_kpi": "Attendance",
                "bukti_nilai": "data:image/png;base64,AA==",
                "bukti_pdf": "false"
            }]
        }))
        .expect("batch");
        forward_batch(&upstream, &credentials(), &batch, "key-4")
            .await
            .expect("ack");

        let calls = upstream.recorded().await;
        assert_eq!(calls[0].body["action"], "kpiBatch");
        assert_eq!(calls[0].body["periode"], "2026-01");
        assert_eq!(calls[0].body["indikator_list"][0]["bukti_pdf"], "false");
        assert!(calls[0].body.get("divisi").is_none());
    }

    #[tokio::test]
    async fn rejection_passes_message_through() {
        let upstream = FakeUpstream::default();
        upstream
            .respond("kpiBatch", UpstreamReply::error("Periode sudah ditutup"))
            .await;
        let err = forward_batch(&upstream, &credentials(), &batch(), "key-2")
            .await
            .expect_err("rejected");
        assert_eq!(
            err,
            ForwardError::RejectedByUpstream {
                message: "Periode sudah ditutup".to_string()
            }
        );
    }

    #[tokio::test]
    async fn transport_failure_is_network_error_without_retry() {
        let upstream = FakeUpstream::default();
        upstream.fail("kpiBatch", UpstreamError::Timeout).await;
        let err = forward_batch(&upstream, &credentials(), &batch(), "key-3")
            .await
            .expect_err("timeout");
        assert!(matches!(err, ForwardError::NetworkError { .. }));
        assert_eq!(upstream.calls_made(), 1);
    }
}
