//! End-to-end session tests against a real subprocess.

mod common;

use std::time::Duration;

use common::fake_repl_config;
use repl_capture::{
    CaptureConfig, CaptureError, DisplayOverride, ReplSession, Signal, TranscriptLine,
};
use repl_pipe::SpawnConfig;

fn text(s: &str) -> TranscriptLine {
    TranscriptLine::Text(s.to_string())
}

#[tokio::test]
async fn captures_input_echo_and_output() {
    let mut session = ReplSession::spawn(&fake_repl_config()).await.expect("spawn");
    let transcript = session.communicate(["echo hello"]).await.expect("communicate");
    assert_eq!(transcript, vec![text(">>> echo hello"), text("hello")]);
    session.kill().await.expect("kill");
}

#[tokio::test]
async fn idle_state_is_reusable_across_invocations() {
    let mut session = ReplSession::spawn(&fake_repl_config()).await.expect("spawn");

    let first = session.communicate(["echo one"]).await.expect("first");
    assert_eq!(first.len(), 2);
    assert!(session.is_idle());

    // A no-op invocation performs no I/O and leaves the session idle.
    let empty = session
        .communicate(Vec::<String>::new())
        .await
        .expect("empty invocation");
    assert!(empty.is_empty());
    assert!(session.is_idle());

    let second = session.communicate(["echo two"]).await.expect("second");
    assert_eq!(second, vec![text(">>> echo two"), text("two")]);
    session.kill().await.expect("kill");
}

#[tokio::test]
async fn incomplete_statement_drains_to_primary_prompt() {
    let mut session = ReplSession::spawn(&fake_repl_config()).await.expect("spawn");
    let transcript = session
        .communicate(["for x in items:"])
        .await
        .expect("communicate");
    // The loop auto-submits blank lines until the primary prompt returns;
    // each one echoes the bare continuation marker.
    assert_eq!(transcript, vec![text(">>> for x in items:"), text("... ")]);
    assert!(session.is_idle());
    session.kill().await.expect("kill");
}

#[tokio::test]
async fn nested_continuation_echoes_each_drained_line() {
    let mut session = ReplSession::spawn(&fake_repl_config()).await.expect("spawn");
    let transcript = session
        .communicate(["for x in items:", "    body(x)"])
        .await
        .expect("communicate");
    assert_eq!(
        transcript,
        vec![
            text(">>> for x in items:"),
            text("...     body(x)"),
            text("... "),
        ]
    );
    assert!(session.is_idle());
    session.kill().await.expect("kill");
}

#[tokio::test]
async fn suppressed_output_keeps_signal_lines() {
    let mut session = ReplSession::spawn(&fake_repl_config()).await.expect("spawn");
    let transcript = session
        .communicate_with(
            ["lines noise|@/out/_images/fig-1.svg|more"],
            DisplayOverride::none().input(false).output(false),
        )
        .await
        .expect("communicate");
    assert_eq!(
        transcript,
        vec![TranscriptLine::Signal(Signal::artifact(
            "/out/_images/fig-1.svg"
        ))]
    );
    session.kill().await.expect("kill");
}

#[tokio::test]
async fn toggle_directive_persists_until_overridden() {
    let mut session = ReplSession::spawn(&fake_repl_config()).await.expect("spawn");

    session
        .communicate(["#repl:hide-output"])
        .await
        .expect("toggle");
    let quiet = session.communicate(["echo hush"]).await.expect("quiet");
    assert_eq!(quiet, vec![text(">>> echo hush")]);

    session
        .communicate(["#repl:show"])
        .await
        .expect("toggle back");
    let loud = session.communicate(["echo loud"]).await.expect("loud");
    assert_eq!(loud, vec![text(">>> echo loud"), text("loud")]);
    session.kill().await.expect("kill");
}

#[tokio::test]
async fn wrong_width_prompt_surfaces_desynchronization() {
    let config = CaptureConfig::default()
        .spawn(SpawnConfig::new("sh").args([
            "-c",
            "printf '??? '\nwhile IFS= read -r line; do printf '??? '; done",
        ]))
        .read_timeout(Some(Duration::from_millis(300)));
    let mut session = ReplSession::spawn(&config).await.expect("spawn");
    let err = session.communicate(["x"]).await.unwrap_err();
    assert!(err.is_desynchronized(), "expected desynchronization: {err}");
    session.kill().await.expect("kill");
}

#[tokio::test]
async fn interpreter_exit_mid_protocol_is_eof() {
    let config = CaptureConfig::default().spawn(
        SpawnConfig::new("sh").args(["-c", "printf '>>> '\nIFS= read -r line\nexit 0"]),
    );
    let mut session = ReplSession::spawn(&config).await.expect("spawn");
    let err = session.communicate(["x"]).await.unwrap_err();
    assert!(matches!(err, CaptureError::Eof { .. }), "got: {err}");
    session.kill().await.expect("kill");
}
