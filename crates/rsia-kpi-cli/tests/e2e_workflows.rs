// SPDX-License-Identifier: Apache-2.0

use assert_cmd::Command;
use rsia_kpi_api::UpstreamReply;
use rsia_kpi_server::{build_router, AppState, FakeUpstream};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

struct Proxy {
    runtime: Runtime,
    upstream: Arc<FakeUpstream>,
    base_url: String,
}

fn spawn_proxy() -> Proxy {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("runtime");
    let upstream = Arc::new(FakeUpstream::default());
    runtime.block_on(async {
        upstream
            .respond(
                "login",
                UpstreamReply::success(Value::from("Login berhasil"))
                    .with_extra("uid", json!("u-1"))
                    .with_extra("name", json!("Alice")),
            )
            .await;
        upstream
            .respond(
                "getIndikatorData",
                UpstreamReply::success(json!([
                    {"nama": "Alice", "divisi": "Medis", "unit": "IGD",
                     "indikator_kpi": "Attendance", "target": "95%"},
                    {"nama": "Alice", "divisi": "Medis", "unit": "IGD",
                     "indikator_kpi": "Visits", "target": "Fluktuatif"}
                ])),
            )
            .await;
        upstream
            .respond(
                "getKpiByUser",
                UpstreamReply::success(json!([
                    {"id": "row-1", "indikator_kpi": "Attendance", "edit_count": 2}
                ])),
            )
            .await;
    });
    let listener = runtime
        .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let state = AppState::new(upstream.clone());
    runtime.spawn(async move {
        axum::serve(listener, build_router(state))
            .await
            .expect("serve");
    });
    Proxy {
        runtime,
        upstream,
        base_url: format!("http://{addr}"),
    }
}

fn rsia_kpi(proxy: &Proxy, session: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rsia-kpi"));
    cmd.env_remove("RSIA_PASSWORD")
        .env_remove("RSIA_LOG")
        .env("RSIA_API_BASE_URL", &proxy.base_url)
        .env("RSIA_SESSION_FILE", session)
        .arg("--json");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json stdout")
}

#[test]
fn login_submit_review_logout() {
    let proxy = spawn_proxy();
    let dir = tempfile::tempdir().expect("tempdir");
    let session = dir.path().join("session.json");
    let evidence = dir.path().join("bukti.png");
    std::fs::write(&evidence, [0x89, b'P', b'N', b'G']).expect("evidence");
    let signature = dir.path().join("ttd.json");
    std::fs::write(
        &signature,
        r#"{"width":60,"height":30,"strokes":[[[5,5],[50,25]]]}"#,
    )
    .expect("signature");

    let login = rsia_kpi(&proxy, &session)
        .args(["login", "--email", "alice@rsia.id"])
        .env("RSIA_PASSWORD", "rahasia")
        .output()
        .expect("login");
    assert_eq!(stdout_json(&login)["name"], "Alice");
    assert!(session.exists());

    let submit = rsia_kpi(&proxy, &session)
        .args(["submit", "--employee", "Alice", "--entry"])
        .arg(format!("Attendance|97%|{}", evidence.display()))
        .arg("--entry")
        .arg(format!("Visits|14|{}|12", evidence.display()))
        .arg("--signature")
        .arg(&signature)
        .output()
        .expect("submit");
    assert_eq!(stdout_json(&submit)["entries"], 2);

    let calls = proxy.runtime.block_on(proxy.upstream.recorded());
    let batch = calls
        .iter()
        .find(|c| c.action == "kpiBatch")
        .expect("batch forwarded");
    assert_eq!(batch.body["email"], "alice@rsia.id");
    assert_eq!(batch.body["password"], "rahasia");
    assert_eq!(batch.body["indikator_list"][1]["target"], "12");
    assert!(batch.body["tanda_tangan"]
        .as_str()
        .is_some_and(|s| s.starts_with("data:image/png;base64,")));

    let mine = rsia_kpi(&proxy, &session)
        .arg("my-kpi")
        .output()
        .expect("my-kpi");
    assert_eq!(stdout_json(&mine)["rows"][0]["id"], "row-1");

    let logout = rsia_kpi(&proxy, &session)
        .arg("logout")
        .output()
        .expect("logout");
    assert_eq!(stdout_json(&logout)["status"], "ok");
    assert!(!session.exists());
}

#[test]
fn changed_fixed_target_is_refused_locally() {
    let proxy = spawn_proxy();
    let dir = tempfile::tempdir().expect("tempdir");
    let session = dir.path().join("session.json");
    let evidence = dir.path().join("bukti.pdf");
    std::fs::write(&evidence, b"%PDF-1.4").expect("evidence");
    let signature = dir.path().join("ttd.png");
    std::fs::write(&signature, [0x89, b'P', b'N', b'G']).expect("signature");

    let login = rsia_kpi(&proxy, &session)
        .args(["login", "--email", "alice@rsia.id", "--password", "rahasia"])
        .output()
        .expect("login");
    assert!(login.status.success());

    let submit = rsia_kpi(&proxy, &session)
        .args(["submit", "--employee", "Alice", "--entry"])
        .arg(format!("Attendance|97%|{}|90%", evidence.display()))
        .arg("--signature")
        .arg(&signature)
        .output()
        .expect("submit");
    assert_eq!(submit.status.code(), Some(3));
    let stderr = String::from_utf8(submit.stderr).expect("utf8 stderr");
    assert!(stderr.contains("tidak boleh diubah"), "{stderr}");
    let calls = proxy.runtime.block_on(proxy.upstream.recorded());
    assert!(calls.iter().all(|c| c.action != "kpiBatch"));
}

#[test]
fn third_edit_is_refused_from_seeded_counters() {
    let proxy = spawn_proxy();
    let dir = tempfile::tempdir().expect("tempdir");
    let session = dir.path().join("session.json");
    let login = rsia_kpi(&proxy, &session)
        .args(["login", "--email", "alice@rsia.id", "--password", "rahasia"])
        .output()
        .expect("login");
    assert!(login.status.success());

    let update = rsia_kpi(&proxy, &session)
        .args(["update", "--key", "row-1", "--actual", "99%"])
        .output()
        .expect("update");
    assert_eq!(update.status.code(), Some(3));
    let calls = proxy.runtime.block_on(proxy.upstream.recorded());
    assert!(calls.iter().all(|c| c.action != "updateKPI"));
}
