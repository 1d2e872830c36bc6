// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::sync::{Arc, Mutex};

use rsia_kpi_server::{build_router, AppState, FakeUpstream};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter(Arc::clone(&self.0))
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn json_lines(&self) -> Vec<Value> {
        let bytes = self.0.lock().expect("lock output").clone();
        let text = String::from_utf8(bytes).expect("utf8 log output");
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("json log line"))
            .collect()
    }
}

#[test]
fn structured_logging_format_is_valid_json() {
    let sink = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .json()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!(
            target: "rsia_kpi_audit",
            employee = "Alice",
            indicator_name = "Attendance",
            "kpi batch failed validation"
        );
    });

    let lines = sink.json_lines();
    let parsed = lines.first().expect("log line");
    assert_eq!(parsed.get("level").and_then(|v| v.as_str()), Some("WARN"));
    assert_eq!(
        parsed.get("target").and_then(|v| v.as_str()),
        Some("rsia_kpi_audit")
    );
    let fields = parsed.get("fields").expect("fields object");
    assert_eq!(
        fields.get("indicator_name").and_then(|v| v.as_str()),
        Some("Attendance")
    );
}

#[tokio::test(flavor = "current_thread")]
async fn request_log_carries_the_request_span() {
    let sink = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .json()
        .with_max_level(Level::INFO)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let state = AppState::new(Arc::new(FakeUpstream::default()));
    tokio::spawn(async move {
        axum::serve(listener, build_router(state))
            .await
            .expect("serve");
    });
    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/healthz"))
        .header("x-request-id", "req-log-1")
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status().as_u16(), 200);

    let lines = sink.json_lines();
    let completed = lines
        .iter()
        .find(|l| l["fields"]["message"] == "request completed")
        .expect("request completed line");
    assert_eq!(completed["level"], "INFO");
    assert_eq!(completed["fields"]["status"], 200);
    assert_eq!(completed["span"]["name"], "http.request");
    assert_eq!(completed["span"]["request_id"], "req-log-1");
    assert_eq!(completed["span"]["route"], "/healthz");
    assert_eq!(completed["span"]["method"], "GET");
}
