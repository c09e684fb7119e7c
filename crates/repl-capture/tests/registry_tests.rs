//! Registry lifecycle tests.

mod common;

use common::fake_repl_config;
use repl_capture::{CaptureError, InitScript, SessionRegistry};
use std::sync::Arc;

#[tokio::test]
async fn get_or_create_returns_the_same_session() {
    let registry = SessionRegistry::new(fake_repl_config());

    let first = registry.get_or_create("guide/a.rst").await.expect("create");
    let second = registry.get_or_create("guide/a.rst").await.expect("reuse");
    assert!(Arc::ptr_eq(&first, &second));

    let first_pid = first.lock().await.pid();
    let second_pid = second.lock().await.pid();
    assert!(first_pid.is_some());
    assert_eq!(first_pid, second_pid);
    assert_eq!(registry.len().await, 1);

    registry.kill_all().await;
}

#[tokio::test]
async fn distinct_documents_get_distinct_sessions() {
    let registry = SessionRegistry::new(fake_repl_config());

    let a = registry.get_or_create("a.rst").await.expect("a");
    let b = registry.get_or_create("b.rst").await.expect("b");
    assert!(!Arc::ptr_eq(&a, &b));
    assert_ne!(a.lock().await.pid(), b.lock().await.pid());
    assert_eq!(registry.len().await, 2);

    registry.kill_all().await;
}

#[tokio::test]
async fn kill_removes_and_recreates() {
    let registry = SessionRegistry::new(fake_repl_config());

    let first = registry.get_or_create("doc.rst").await.expect("create");
    let first_pid = first.lock().await.pid();
    registry.kill("doc.rst").await;
    assert!(registry.is_empty().await);

    // Killing an absent document is a no-op.
    registry.kill("doc.rst").await;

    let second = registry.get_or_create("doc.rst").await.expect("recreate");
    assert_ne!(first_pid, second.lock().await.pid());

    registry.kill_all().await;
}

#[tokio::test]
async fn kill_all_is_idempotent() {
    let registry = SessionRegistry::new(fake_repl_config());
    registry.get_or_create("a.rst").await.expect("a");
    registry.get_or_create("b.rst").await.expect("b");

    registry.kill_all().await;
    assert!(registry.is_empty().await);

    // Safe to call again after everything is gone.
    registry.kill_all().await;
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn sessions_are_usable_through_the_registry() {
    let registry = SessionRegistry::new(fake_repl_config());
    let handle = registry.get_or_create("doc.rst").await.expect("create");

    let transcript = handle
        .lock()
        .await
        .communicate(["echo via registry"])
        .await
        .expect("communicate");
    assert_eq!(transcript.len(), 2);

    registry.kill_all().await;
}

#[tokio::test]
async fn silent_bootstrap_registers_the_session() {
    let config = fake_repl_config().bootstrap(InitScript::new(["configure backend"]));
    let registry = SessionRegistry::new(config);

    // "configure backend" is unknown to the fake interpreter and prints
    // nothing, so bootstrap succeeds.
    let handle = registry.get_or_create("doc.rst").await.expect("create");
    assert!(handle.lock().await.is_idle());
    assert_eq!(registry.len().await, 1);

    registry.kill_all().await;
}

#[tokio::test]
async fn noisy_bootstrap_fails_and_registers_nothing() {
    let config = fake_repl_config().bootstrap(InitScript::new(["echo unexpected warning"]));
    let registry = SessionRegistry::new(config);

    let err = registry.get_or_create("doc.rst").await.unwrap_err();
    match err {
        CaptureError::Bootstrap { lines } => {
            assert_eq!(lines, vec!["unexpected warning".to_string()]);
        }
        other => panic!("expected Bootstrap error, got {other}"),
    }
    assert!(registry.is_empty().await);

    registry.kill_all().await;
}
