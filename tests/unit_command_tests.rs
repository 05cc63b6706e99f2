#![cfg(unix)]

use std::io;
use std::time::Duration;

use tempfile::tempdir;
use variant_matrix::infra::command::{
    CommandExecutor, CommandSpec, DryRunExecutor, SystemExecutor, spawn_and_capture,
};

/// Both output streams are captured along with the exit code.
/// 同时捕获两个输出流以及退出码。
#[tokio::test]
async fn test_spawn_and_capture_collects_both_streams() {
    let mut cmd = tokio::process::Command::new("sh");
    cmd.args(["-c", "echo to-stdout; echo to-stderr 1>&2; exit 3"]);

    let (status, lines) = spawn_and_capture(cmd).await;

    assert_eq!(status.unwrap().code(), Some(3));
    assert!(lines.contains(&"to-stdout".to_string()));
    assert!(lines.contains(&"to-stderr".to_string()));
}

#[tokio::test]
async fn test_system_executor_passes_environment() {
    let spec = CommandSpec::new("sh")
        .args(["-c", "echo \"$DJANGO-$DATABASE\""])
        .env("DJANGO", "3.0")
        .env("DATABASE", "sqlite");

    let output = SystemExecutor.execute(&spec).await.unwrap();

    assert!(output.success());
    assert_eq!(output.lines, vec!["3.0-sqlite"]);
}

#[tokio::test]
async fn test_system_executor_runs_in_current_dir() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "").unwrap();
    let spec = CommandSpec::new("ls").current_dir(dir.path());

    let output = SystemExecutor.execute(&spec).await.unwrap();

    assert_eq!(output.lines, vec!["marker.txt"]);
}

#[tokio::test]
async fn test_non_zero_exit_is_not_an_error() {
    let output = SystemExecutor
        .execute(&CommandSpec::new("sh").args(["-c", "exit 7"]))
        .await
        .unwrap();
    assert_eq!(output.exit_code, 7);
    assert!(!output.success());
}

#[tokio::test]
async fn test_missing_program_is_not_found() {
    let err = SystemExecutor
        .execute(&CommandSpec::new("variant-matrix-no-such-program"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}

/// A command that outlives its timeout is killed and reported as timed out.
/// 超时的命令会被终止并报告为超时。
#[tokio::test]
async fn test_timeout_kills_long_running_command() {
    let spec = CommandSpec::new("sleep")
        .arg("5")
        .timeout(Some(Duration::from_millis(200)));

    let started = std::time::Instant::now();
    let err = SystemExecutor.execute(&spec).await.unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_dry_run_executes_nothing() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("created-by-touch");
    let spec = CommandSpec::new("touch").arg(target.to_string_lossy());

    let output = DryRunExecutor.execute(&spec).await.unwrap();

    assert!(output.success());
    assert!(output.lines.is_empty());
    assert!(!target.exists());
}
