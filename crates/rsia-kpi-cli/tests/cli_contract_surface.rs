// SPDX-License-Identifier: Apache-2.0

use assert_cmd::Command;

fn parse_commands_from_help(text: &str) -> Vec<String> {
    let mut commands = Vec::new();
    let mut in_commands = false;
    for line in text.lines() {
        let trimmed = line.trim_end();
        if trimmed == "Commands:" {
            in_commands = true;
            continue;
        }
        if in_commands {
            if trimmed.is_empty() || !line.starts_with(' ') {
                break;
            }
            let entry = trimmed.trim_start();
            let name = entry.split_whitespace().next().unwrap_or("");
            if !name.is_empty() && name != "help" {
                commands.push(name.to_string());
            }
        }
    }
    commands.sort();
    commands
}

fn rsia_kpi() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rsia-kpi"));
    cmd.env_remove("RSIA_API_BASE_URL")
        .env_remove("RSIA_SESSION_FILE")
        .env_remove("RSIA_PASSWORD")
        .env_remove("RSIA_LOG");
    cmd
}

#[test]
fn help_command_surface_is_stable() {
    let output = rsia_kpi().arg("--help").output().expect("run help");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8 help");
    let observed = parse_commands_from_help(&text);
    let expected = include_str!("snapshots/help.commands.txt")
        .lines()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    assert_eq!(observed, expected);
    assert!(text.contains("RSIA_API_BASE_URL"));
}

#[test]
fn version_output_contains_crate_version() {
    let output = rsia_kpi().arg("--version").output().expect("run version");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8 version output");
    assert!(text.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_flag_returns_usage_exit_code_with_machine_error() {
    let output = rsia_kpi()
        .args(["--json", "--unknown-flag"])
        .output()
        .expect("run bad cli");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("utf8 stderr");
    assert!(stderr.contains("usage_error"));
}

#[test]
fn missing_command_is_a_usage_error() {
    let output = rsia_kpi().output().expect("run without command");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn logout_without_session_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session = dir.path().join("session.json");
    let output = rsia_kpi()
        .args(["--json", "logout", "--session-file"])
        .arg(&session)
        .output()
        .expect("run logout");
    assert!(output.status.success());
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(payload["status"], "no-session");
}

#[test]
fn session_commands_require_login() {
    let dir = tempfile::tempdir().expect("tempdir");
    let session = dir.path().join("session.json");
    for command in ["my-kpi", "team-kpi"] {
        let output = rsia_kpi()
            .args(["--json", command, "--session-file"])
            .arg(&session)
            .output()
            .expect("run command");
        assert_eq!(output.status.code(), Some(2), "{command}");
        let stderr = String::from_utf8(output.stderr).expect("utf8 stderr");
        assert!(stderr.contains("not_logged_in"), "{command}: {stderr}");
        assert!(stderr.contains("Silakan login terlebih dahulu."));
    }
}

#[test]
fn unreachable_proxy_is_a_dependency_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let output = rsia_kpi()
        .args(["--json", "indicators", "--api-url"])
        .arg(format!("http://{addr}"))
        .output()
        .expect("run indicators");
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8(output.stderr).expect("utf8 stderr");
    assert!(stderr.contains("transport_error"), "{stderr}");
}

#[test]
fn update_without_changes_is_refused_before_any_request() {
    let output = rsia_kpi()
        .args(["update", "--key", "row-1", "--api-url", "http://127.0.0.1:9"])
        .output()
        .expect("run update");
    assert_eq!(output.status.code(), Some(2));
}
