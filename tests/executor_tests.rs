//! Process-runner and trial-executor behavior against real child processes.

#![cfg(unix)]

use core::time::Duration;

use tuner::runner::ProcessRunner;
use tuner::{Error, Invocation, TrialExecutor};

fn temp_dir(tag: &str) -> std::path::PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let mut path = std::env::temp_dir();
    path.push(format!(
        "tuner_executor_test_{tag}_{}_{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&path).unwrap();
    path
}

fn write_script(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("trainer.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn executor() -> TrialExecutor {
    TrialExecutor::new(ProcessRunner::new()).with_stagger(Duration::from_millis(1))
}

#[tokio::test]
async fn echo_literal_parses_as_score() {
    let runner = ProcessRunner::new();
    let value = runner.run(&Invocation::new("echo").arg("1")).await.unwrap();
    assert_eq!(value, 1.0);
}

#[tokio::test]
async fn non_numeric_output_is_malformed() {
    let runner = ProcessRunner::new();
    let err = runner
        .run(&Invocation::new("echo").arg("hi"))
        .await
        .unwrap_err();
    match err {
        Error::MalformedOutput { raw, .. } => assert_eq!(raw.as_deref(), Some("hi")),
        other => panic!("expected MalformedOutput, got {other:?}"),
    }
}

#[tokio::test]
async fn last_non_empty_line_wins() {
    let dir = temp_dir("last_line");
    let script = write_script(&dir, "echo 0.5\necho not-a-score\necho 2.5\necho\n");
    let runner = ProcessRunner::new();
    let value = runner
        .run(&Invocation::new(script.to_str().unwrap()))
        .await
        .unwrap();
    assert_eq!(value, 2.5);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn exit_status_is_ignored_when_last_line_parses() {
    let dir = temp_dir("exit_status");
    let script = write_script(&dir, "echo 0.75\nexit 3\n");
    let runner = ProcessRunner::new();
    let value = runner
        .run(&Invocation::new(script.to_str().unwrap()))
        .await
        .unwrap();
    assert_eq!(value, 0.75);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn custom_extractor_replaces_parsing_policy() {
    // The terminal-value policy is pluggable: take the last whitespace
    // token instead of the whole line.
    let runner = ProcessRunner::with_extractor(|line| {
        line.split_whitespace().last().and_then(|t| t.parse().ok())
    });
    let dir = temp_dir("extractor");
    let script = write_script(&dir, "echo 'final wrmsse: 0.82'\n");
    let value = runner
        .run(&Invocation::new(script.to_str().unwrap()))
        .await
        .unwrap();
    assert_eq!(value, 0.82);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn repeated_echo_aggregates_to_the_literal() {
    let value = executor()
        .execute(&Invocation::new("echo").arg("1"), 3)
        .await
        .unwrap();
    assert_eq!(value, 1.0);
}

#[tokio::test]
async fn single_repetition_is_allowed() {
    let value = executor()
        .execute(&Invocation::new("echo").arg("1"), 1)
        .await
        .unwrap();
    assert_eq!(value, 1.0);
}

#[tokio::test]
async fn any_malformed_repetition_fails_the_trial() {
    let err = executor()
        .execute(&Invocation::new("echo").arg("hi"), 3)
        .await
        .unwrap_err();
    assert!(err.is_trial_failure());
    match err {
        Error::TrialFailed(inner) => {
            assert!(matches!(*inner, Error::MalformedOutput { .. }));
        }
        other => panic!("expected TrialFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn aggregate_is_independent_of_completion_order() {
    // Each repetition claims a distinct slot via the atomicity of mkdir,
    // then sleeps so that completion order is the reverse of launch order:
    // slot 1 sleeps longest and finishes last.
    let dir = temp_dir("ordering");
    let slots = dir.join("slots");
    std::fs::create_dir_all(&slots).unwrap();
    let script = write_script(
        &dir,
        &format!(
            "for i in 1 2 3; do\n\
             \tif mkdir \"{slots}/slot$i\" 2>/dev/null; then\n\
             \t\tsleep \"0.$((4 - i))\"\n\
             \t\techo \"$i.0\"\n\
             \t\texit 0\n\
             \tfi\n\
             done\n\
             echo no-free-slot\n",
            slots = slots.display()
        ),
    );

    let value = executor()
        .execute(&Invocation::new(script.to_str().unwrap()), 3)
        .await
        .unwrap();
    assert_eq!(value, 2.0);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn missing_program_is_a_fatal_spawn_error() {
    let err = executor()
        .execute(&Invocation::new("/nonexistent/trainer"), 2)
        .await
        .unwrap_err();
    // A missing binary would fail every trial identically; it must not be
    // mistaken for a recoverable diverged-model failure.
    assert!(!err.is_trial_failure());
    assert!(matches!(err, Error::Spawn { .. }));
}
