//! # Command Execution Module / 命令执行模块
//!
//! Every collaborator of the orchestrator (package manager, service manager,
//! `psql`, the tool installer and the test command) is an opaque subprocess.
//! They are all described as a [`CommandSpec`] and executed through the
//! [`CommandExecutor`] trait so the host-mutating phases can be faked in tests
//! or printed instead of executed (`--dry-run`).
//!
//! 编排器的所有协作者（包管理器、服务管理器、`psql`、工具安装器和测试命令）
//! 都是不透明的子进程。它们都被描述为 [`CommandSpec`]，并通过
//! [`CommandExecutor`] trait 执行，因此修改主机的阶段可以在测试中被替换，
//! 或者只打印而不执行（`--dry-run`）。

use colored::*;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::infra::t;

/// A fully described subprocess invocation.
/// 一个完整描述的子进程调用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub current_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            current_dir: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Prefixes the invocation with `sudo` when `elevate` is set.
    /// 当 `elevate` 为真时，在调用前加上 `sudo`。
    pub fn elevated(self, elevate: bool) -> Self {
        if !elevate {
            return self;
        }
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: "sudo".to_string(),
            args,
            ..self
        }
    }

    /// Builds a spec from a shell-like command line. Environment references
    /// (`$VAR`, `~`) are expanded first.
    ///
    /// 从类 shell 的命令行构建规格。会先展开环境变量引用（`$VAR`、`~`）。
    pub fn parse(command_line: &str) -> Result<Self, String> {
        Self::parse_with_env(command_line, &BTreeMap::new())
    }

    /// Like [`CommandSpec::parse`], but `$VAR` references are resolved against
    /// `env` before the process environment, and `env` is exported to the child.
    /// Unknown variables are left as written.
    pub fn parse_with_env(command_line: &str, env: &BTreeMap<String, String>) -> Result<Self, String> {
        let lookup = |var: &str| -> Result<Option<String>, std::env::VarError> {
            if let Some(value) = env.get(var) {
                return Ok(Some(value.clone()));
            }
            match std::env::var(var) {
                Ok(value) => Ok(Some(value)),
                Err(std::env::VarError::NotPresent) => Ok(None),
                Err(e) => Err(e),
            }
        };
        let expanded = shellexpand::full_with_context(command_line, || std::env::var("HOME").ok(), lookup)
            .map_err(|e| format!("{command_line}: {e}"))?
            .to_string();
        let mut parts = shlex::split(&expanded)
            .ok_or_else(|| expanded.clone())?
            .into_iter();
        let program = parts.next().ok_or_else(|| expanded.clone())?;

        let mut spec = Self::new(program).args(parts);
        spec.env.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(spec)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        match shlex::try_join(words) {
            Ok(line) => f.write_str(&line),
            Err(_) => write!(f, "{} {}", self.program, self.args.join(" ")),
        }
    }
}

/// Exit code and interleaved output lines of a finished subprocess.
/// 已结束子进程的退出码和交错的输出行。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub lines: Vec<String>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Case-insensitive search across all captured lines.
    pub fn contains(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.lines
            .iter()
            .any(|line| line.to_ascii_lowercase().contains(&needle))
    }
}

/// Runs subprocesses on behalf of the provisioning, bootstrap and run phases.
///
/// `Err` is reserved for transport-level failures (program not found,
/// timeout); a non-zero exit is returned as `Ok` with its exit code.
pub trait CommandExecutor {
    fn execute(&self, spec: &CommandSpec) -> impl Future<Output = io::Result<CommandOutput>>;
}

/// Executes commands on the real host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
    async fn execute(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        tracing::debug!(command = %spec, dir = ?spec.current_dir, "spawning subprocess");

        let mut cmd = tokio::process::Command::new(&spec.program);
        cmd.args(&spec.args).envs(&spec.env).kill_on_drop(true);
        if let Some(dir) = &spec.current_dir {
            cmd.current_dir(dir);
        }

        let (status, lines) = match spec.timeout {
            Some(limit) => tokio::time::timeout(limit, spawn_and_capture(cmd))
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, format!("{spec}")))?,
            None => spawn_and_capture(cmd).await,
        };
        let status = status?;
        let exit_code = status.code().unwrap_or(-1);
        tracing::debug!(command = %spec, exit_code, lines = lines.len(), "subprocess finished");

        Ok(CommandOutput { exit_code, lines })
    }
}

/// Prints each command instead of executing it and reports success.
/// 打印每条命令而不执行，并报告成功。
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunExecutor;

impl CommandExecutor for DryRunExecutor {
    async fn execute(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        let mut line = String::new();
        for (key, value) in &spec.env {
            line.push_str(&format!("{key}={value} "));
        }
        line.push_str(&spec.to_string());
        println!("  {} {}", t!("dry_run.would_run").dimmed(), line);
        Ok(CommandOutput::default())
    }
}

/// Spawns a command, capturing stdout and stderr as interleaved lines.
/// Both streams are read concurrently; lines are recorded in arrival order.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The captured lines.
///
/// 派生一个命令，以交错行的形式捕获其 stdout 和 stderr。
/// 两个流被并发读取；各行按到达顺序记录。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
) -> (io::Result<std::process::ExitStatus>, Vec<String>) {
    let mut child = match cmd
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return (Err(e), Vec::new()),
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return (
            Err(io::Error::other(t!("command.capture_failed").to_string())),
            Vec::new(),
        );
    };

    let output = Arc::new(tokio::sync::Mutex::new(Vec::new()));

    let stdout_output = Arc::clone(&output);
    let stdout_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            stdout_output.lock().await.push(line);
        }
    });

    let stderr_output = Arc::clone(&output);
    let stderr_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            stderr_output.lock().await.push(line);
        }
    });

    let status = child.wait().await;

    // Drain both readers so no trailing output is lost.
    if let Err(e) = stdout_handle.await {
        tracing::warn!("failed to join stdout reader: {e}");
    }
    if let Err(e) = stderr_handle.await {
        tracing::warn!("failed to join stderr reader: {e}");
    }

    let lines = std::mem::take(&mut *output.lock().await);
    (status, lines)
}
