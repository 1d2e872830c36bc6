// SPDX-License-Identifier: Apache-2.0

use rsia_kpi_client::{ClientError, SessionStore};
use rsia_kpi_model::Session;

fn alice() -> Session {
    Session {
        uid: "u-1".to_string(),
        name: "Alice".to_string(),
        email: "alice@rsia.id".to_string(),
        credential: "rahasia".to_string(),
        photo: String::new(),
        is_admin: false,
    }
}

#[test]
fn missing_file_means_logged_out() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::new(dir.path().join("session.json"));
    assert_eq!(store.load().expect("load"), None);
    assert!(!store.clear().expect("clear"));
}

#[test]
fn save_then_load_then_clear() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::new(dir.path().join("nested/rsia-kpi/session.json"));
    store.save(&alice()).expect("save");
    assert_eq!(store.load().expect("load"), Some(alice()));
    assert!(!dir.path().join("nested/rsia-kpi/session.json.tmp").exists());
    assert!(store.clear().expect("clear"));
    assert_eq!(store.load().expect("load"), None);
}

#[cfg(unix)]
#[test]
fn session_file_is_private_to_owner() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let store = SessionStore::new(dir.path().join("session.json"));
    store.save(&alice()).expect("save");
    let mode = std::fs::metadata(store.path())
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn corrupt_file_is_reported_not_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    std::fs::write(&path, b"{\"uid\": 1").expect("write");
    let err = SessionStore::new(&path).load().expect_err("corrupt");
    assert!(matches!(err, ClientError::SessionFile { .. }));
    assert!(err.to_string().contains("decode session"), "{err}");
}
