// SPDX-License-Identifier: Apache-2.0

use reqwest::multipart::{Form, Part};
use rsia_kpi_api::UpstreamReply;
use rsia_kpi_server::{build_router, AppState, FakeUpstream, UpstreamError};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn(upstream: Arc<FakeUpstream>) -> SocketAddr {
    let state = AppState::new(upstream);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, build_router(state))
            .await
            .expect("serve");
    });
    addr
}

async fn post_json(addr: SocketAddr, path: &str, body: &Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}{path}"))
        .json(body)
        .send()
        .await
        .expect("send");
    let status = resp.status().as_u16();
    (status, resp.json().await.expect("json body"))
}

async fn get_json(addr: SocketAddr, path: &str) -> (u16, Value) {
    let resp = reqwest::get(format!("http://{addr}{path}"))
        .await
        .expect("send");
    let status = resp.status().as_u16();
    (status, resp.json().await.expect("json body"))
}

#[tokio::test]
async fn register_requires_every_field() {
    let upstream = Arc::new(FakeUpstream::default());
    let addr = spawn(upstream.clone()).await;
    let (status, body) = post_json(
        addr,
        "/api/register",
        &json!({"email": "a@rsia.id", "password": "pw", "name": " "}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Email, password, dan nama wajib diisi!");
    assert_eq!(upstream.calls_made(), 0);
}

#[tokio::test]
async fn register_relays_to_upstream() {
    let upstream = Arc::new(FakeUpstream::default());
    upstream
        .respond(
            "register",
            UpstreamReply::success(Value::from("Registrasi berhasil")),
        )
        .await;
    let addr = spawn(upstream.clone()).await;
    let (status, body) = post_json(
        addr,
        "/api/register",
        &json!({"email": "a@rsia.id", "password": "pw", "name": "Alice"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Registrasi berhasil");
    let calls = upstream.recorded().await;
    assert_eq!(
        calls[0].body,
        json!({"action": "register", "email": "a@rsia.id", "password": "pw", "name": "Alice"})
    );
}

#[tokio::test]
async fn login_passes_profile_extras_through() {
    let upstream = Arc::new(FakeUpstream::default());
    upstream
        .respond(
            "login",
            UpstreamReply::success(Value::from("Login berhasil"))
                .with_extra("uid", Value::from("u-1"))
                .with_extra("name", Value::from("Alice")),
        )
        .await;
    let addr = spawn(upstream.clone()).await;
    let (status, body) = post_json(
        addr,
        "/api/login",
        &json!({"email": "a@rsia.id", "password": "pw"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["uid"], "u-1");
    assert_eq!(body["name"], "Alice");
}

#[tokio::test]
async fn login_refusal_is_passed_through_unchanged() {
    let upstream = Arc::new(FakeUpstream::default());
    upstream
        .respond("login", UpstreamReply::error("Email atau password salah"))
        .await;
    let addr = spawn(upstream.clone()).await;
    let (status, body) = post_json(
        addr,
        "/api/login",
        &json!({"email": "a@rsia.id", "password": "nope"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["result"], "error");
    assert_eq!(body["message"], "Email atau password salah");
}

#[tokio::test]
async fn login_transport_failure_is_502() {
    let upstream = Arc::new(FakeUpstream::default());
    upstream.fail("login", UpstreamError::Timeout).await;
    let addr = spawn(upstream.clone()).await;
    let (status, body) = post_json(
        addr,
        "/api/login",
        &json!({"email": "a@rsia.id", "password": "pw"}),
    )
    .await;
    assert_eq!(status, 502);
    assert_eq!(body["message"], "Terjadi kesalahan saat login.");
}

#[tokio::test]
async fn indicator_data_is_relayed() {
    let upstream = Arc::new(FakeUpstream::default());
    upstream
        .respond(
            "getIndikatorData",
            UpstreamReply::success(json!([{"nama": "Alice", "indikator_kpi": "Attendance"}])),
        )
        .await;
    let addr = spawn(upstream.clone()).await;
    let (status, body) = get_json(addr, "/api/indikator-data").await;
    assert_eq!(status, 200);
    assert_eq!(body["message"][0]["indikator_kpi"], "Attendance");
}

#[tokio::test]
async fn indicator_data_failure_uses_its_own_message() {
    let upstream = Arc::new(FakeUpstream::default());
    upstream
        .fail(
            "getIndikatorData",
            UpstreamError::Status {
                status: 500,
                body: "boom".to_string(),
            },
        )
        .await;
    let addr = spawn(upstream.clone()).await;
    let (status, body) = get_json(addr, "/api/indikator-data").await;
    assert_eq!(status, 502);
    assert_eq!(body["message"], "Gagal mengambil indikator!");
}

#[tokio::test]
async fn kpi_my_requires_email() {
    let upstream = Arc::new(FakeUpstream::default());
    let addr = spawn(upstream.clone()).await;
    let (status, body) = get_json(addr, "/api/kpi-my").await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Email wajib dikirim");
    assert_eq!(upstream.calls_made(), 0);

    let (status, _) = get_json(addr, "/api/kpi-my?email=alice%40rsia.id").await;
    assert_eq!(status, 200);
    let calls = upstream.recorded().await;
    assert_eq!(
        calls[0].body,
        json!({"action": "getKpiByUser", "email": "alice@rsia.id"})
    );
}

#[tokio::test]
async fn team_kpi_trims_viewer_name() {
    let upstream = Arc::new(FakeUpstream::default());
    upstream
        .respond("getTeamKPI", UpstreamReply::success(json!([])))
        .await;
    let addr = spawn(upstream.clone()).await;
    let (status, _) = post_json(addr, "/api/team-kpi", &json!({"nama": "  Dr. Rina  "})).await;
    assert_eq!(status, 200);
    let calls = upstream.recorded().await;
    assert_eq!(calls[0].body["nama"], "Dr. Rina");
}

#[tokio::test]
async fn team_kpi_rejects_non_string_viewer() {
    let upstream = Arc::new(FakeUpstream::default());
    let addr = spawn(upstream.clone()).await;
    let (status, body) = post_json(addr, "/api/team-kpi", &json!({"nama": 7})).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Nama viewer wajib dikirim");
    assert_eq!(upstream.calls_made(), 0);
}

#[tokio::test]
async fn team_kpi_refusal_is_400_with_upstream_body() {
    let upstream = Arc::new(FakeUpstream::default());
    upstream
        .respond("getTeamKPI", UpstreamReply::error("Anda bukan atasan"))
        .await;
    let addr = spawn(upstream.clone()).await;
    let (status, body) = post_json(addr, "/api/team-kpi", &json!({"nama": "Budi"})).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({"result": "error", "message": "Anda bukan atasan"}));
}

#[tokio::test]
async fn team_kpi_transport_failure_is_502() {
    let upstream = Arc::new(FakeUpstream::default());
    upstream
        .fail(
            "getTeamKPI",
            UpstreamError::InvalidReply("<html>".to_string()),
        )
        .await;
    let addr = spawn(upstream.clone()).await;
    let (status, body) = post_json(addr, "/api/team-kpi", &json!({"nama": "Budi"})).await;
    assert_eq!(status, 502);
    assert_eq!(body["message"], "Server gagal memproses KPI team");
}

async fn post_form(addr: SocketAddr, form: Form) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/kpi-update"))
        .multipart(form)
        .send()
        .await
        .expect("send");
    let status = resp.status().as_u16();
    (status, resp.json().await.expect("json body"))
}

#[tokio::test]
async fn kpi_update_encodes_the_evidence_file() {
    let upstream = Arc::new(FakeUpstream::default());
    upstream
        .respond(
            "updateKPI",
            UpstreamReply::success(Value::from("KPI diperbarui"))
                .with_extra("edit_count", Value::from(1)),
        )
        .await;
    let addr = spawn(upstream.clone()).await;
    let file = Part::bytes(vec![0x89, b'P', b'N', b'G'])
        .file_name("bukti.png")
        .mime_str("image/png")
        .expect("mime");
    let form = Form::new()
        .text("kpiKey", "row-12")
        .text("actual", "98%")
        .text("email", "alice@rsia.id")
        .part("buktiFile", file);

    let (status, body) = post_form(addr, form).await;
    assert_eq!(status, 200);
    assert_eq!(body["edit_count"], 1);
    let calls = upstream.recorded().await;
    assert_eq!(calls[0].body["action"], "updateKPI");
    assert_eq!(calls[0].body["id"], "row-12");
    assert_eq!(calls[0].body["actual"], "98%");
    assert_eq!(calls[0].body["bukti"], "data:image/png;base64,iVBORw==");
}

#[tokio::test]
async fn kpi_update_without_file_sends_empty_evidence() {
    let upstream = Arc::new(FakeUpstream::default());
    let addr = spawn(upstream.clone()).await;
    let form = Form::new()
        .text("kpiKey", "row-12")
        .text("email", "alice@rsia.id");
    let (status, _) = post_form(addr, form).await;
    assert_eq!(status, 200);
    let calls = upstream.recorded().await;
    assert_eq!(
        calls[0].body,
        json!({"action": "updateKPI", "id": "row-12", "email": "alice@rsia.id", "bukti": ""})
    );
}

#[tokio::test]
async fn kpi_update_requires_key_and_email() {
    let upstream = Arc::new(FakeUpstream::default());
    let addr = spawn(upstream.clone()).await;
    let (status, body) = post_form(addr, Form::new().text("actual", "1")).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "ID KPI dan email wajib dikirim!");
    assert_eq!(upstream.calls_made(), 0);
}

#[tokio::test]
async fn kpi_update_rejects_unsupported_files() {
    let upstream = Arc::new(FakeUpstream::default());
    let addr = spawn(upstream.clone()).await;
    let file = Part::bytes(b"hello".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .expect("mime");
    let form = Form::new()
        .text("kpiKey", "row-12")
        .text("email", "alice@rsia.id")
        .part("buktiFile", file);
    let (status, body) = post_form(addr, form).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"]["mime_type"], "text/plain");
    assert_eq!(upstream.calls_made(), 0);
}
