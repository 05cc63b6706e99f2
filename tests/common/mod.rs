// Shared test helpers for integration tests
#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use variant_matrix::config::{DatabaseConfig, RunnerConfig};
use variant_matrix::infra::command::{CommandExecutor, CommandOutput, CommandSpec};
use variant_matrix::models::{DbBackend, Variant};

/// A scripted reply of the [`FakeExecutor`].
#[derive(Debug, Clone)]
pub enum Scripted {
    Exit(i32, Vec<String>),
    NotFound,
    TimedOut,
}

impl Scripted {
    pub fn fail(code: i32, line: &str) -> Self {
        Scripted::Exit(code, vec![line.to_string()])
    }

    fn reply(&self) -> io::Result<CommandOutput> {
        match self {
            Scripted::Exit(exit_code, lines) => Ok(CommandOutput {
                exit_code: *exit_code,
                lines: lines.clone(),
            }),
            Scripted::NotFound => Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory")),
            Scripted::TimedOut => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out")),
        }
    }
}

#[derive(Default)]
struct FakeState {
    calls: Vec<CommandSpec>,
    rules: Vec<(String, VecDeque<Scripted>)>,
}

/// Records every command it is asked to run and answers from a script.
///
/// A command matches the first rule whose needle occurs in its command line.
/// Replies queued for a rule are consumed in order; the last one repeats.
/// Unmatched commands succeed with no output.
///
/// 记录每条被要求运行的命令，并按脚本作答。
#[derive(Clone, Default)]
pub struct FakeExecutor {
    state: Arc<Mutex<FakeState>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, needle: &str, reply: Scripted) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            match state.rules.iter_mut().find(|(n, _)| n == needle) {
                Some((_, replies)) => replies.push_back(reply),
                None => state.rules.push((needle.to_string(), VecDeque::from([reply]))),
            }
        }
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Program and arguments of every recorded call, joined by spaces.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(command_line).collect()
    }
}

pub fn command_line(spec: &CommandSpec) -> String {
    std::iter::once(spec.program.as_str())
        .chain(spec.args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

impl CommandExecutor for FakeExecutor {
    async fn execute(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(spec.clone());

        let line = command_line(spec);
        let Some((_, replies)) = state.rules.iter_mut().find(|(needle, _)| line.contains(needle.as_str())) else {
            return Ok(CommandOutput::default());
        };
        let reply = if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap()
        };
        reply.reply()
    }
}

pub fn postgres(index: usize, runtime: &str, framework: &str) -> Variant {
    Variant::new(index, runtime, framework, DbBackend::Postgres)
}

pub fn sqlite(index: usize, runtime: &str, framework: &str) -> Variant {
    Variant::new(index, runtime, framework, DbBackend::Sqlite)
}

pub fn runner_config(command: &str) -> RunnerConfig {
    RunnerConfig {
        install: None,
        command: command.to_string(),
        timeout_secs: None,
        runtime_var: "TRAVIS_PYTHON_VERSION".to_string(),
        framework_var: "DJANGO".to_string(),
        database_var: "DATABASE".to_string(),
        env: BTreeMap::new(),
    }
}

pub fn database_config() -> DatabaseConfig {
    DatabaseConfig::default()
}

/// Writes a matrix file into `dir` and returns its path.
pub fn write_config(dir: &TempDir, file_name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(file_name);
    fs::write(&path, content).expect("Failed to write config file");
    path
}

/// A matrix that only uses SQLite, so running it never touches the host's
/// package or service managers.
pub fn sqlite_matrix(command: &str) -> String {
    format!(
        r#"
language = "en"

[runtime]
check_installed = false

[runner]
command = '{command}'

[[variants]]
runtime_version = "3.7"
framework_version = "2.2"
db_backend = "sqlite"

[[variants]]
runtime_version = "3.8"
framework_version = "3.0"
db_backend = "sqlite"
"#
    )
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("test paths are UTF-8")
}
