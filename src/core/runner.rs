//! # Runner Module / 运行器模块
//!
//! Executes the project's test command for one fully provisioned variant,
//! exporting the variant's versions through environment variables.
//! A non-zero exit is a normal, reportable outcome; only failures to launch
//! the command at all are errors.
//!
//! 为一个已完全配置的变体执行项目的测试命令，并通过环境变量导出变体的版本。
//! 非零退出是正常的、可报告的结果；只有根本无法启动命令才算错误。

use colored::*;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::core::config::RunnerConfig;
use crate::core::error::RunnerError;
use crate::core::models::{RunResult, Variant};
use crate::infra::command::{CommandExecutor, CommandSpec};
use crate::infra::t;

/// Executes the test command for a variant.
pub trait Runner {
    fn run(&mut self, variant: &Variant) -> impl Future<Output = Result<RunResult, RunnerError>>;
}

/// Runs the configured test command through a [`CommandExecutor`].
pub struct CommandRunner<E> {
    executor: E,
    config: RunnerConfig,
    project_dir: PathBuf,
    tool_installed: bool,
}

impl<E: CommandExecutor> CommandRunner<E> {
    pub fn new(executor: E, config: RunnerConfig, project_dir: PathBuf) -> Self {
        Self {
            executor,
            config,
            project_dir,
            tool_installed: false,
        }
    }

    fn timeout(&self) -> Option<Duration> {
        self.config.timeout_secs.map(Duration::from_secs)
    }

    /// The fully resolved test command for `variant`.
    /// 为 `variant` 完整解析后的测试命令。
    pub fn test_command(&self, variant: &Variant) -> Result<CommandSpec, RunnerError> {
        let mut env = self.config.env.clone();
        env.insert(self.config.runtime_var.clone(), variant.runtime_version().to_string());
        env.insert(self.config.framework_var.clone(), variant.framework_version().to_string());
        env.insert(self.config.database_var.clone(), variant.db_backend().as_str().to_string());

        let spec = CommandSpec::parse_with_env(&self.config.command, &env)
            .map_err(RunnerError::InvalidCommand)?;
        Ok(spec.current_dir(&self.project_dir).timeout(self.timeout()))
    }

    fn map_io_error(&self, spec: &CommandSpec, source: io::Error) -> RunnerError {
        if source.kind() == io::ErrorKind::TimedOut {
            RunnerError::Timeout {
                secs: self.config.timeout_secs.unwrap_or_default(),
            }
        } else {
            RunnerError::Launch {
                program: spec.program.clone(),
                source,
            }
        }
    }

    /// Installs the test tool once per process.
    async fn ensure_tool_installed(&mut self) -> Result<(), RunnerError> {
        if self.tool_installed {
            return Ok(());
        }
        if let Some(install) = &self.config.install {
            let spec = CommandSpec::parse(install)
                .map_err(RunnerError::InvalidCommand)?
                .current_dir(&self.project_dir)
                .timeout(self.timeout());
            println!("  {}", t!("run.installing_tool", command = &spec).dimmed());

            let output = self
                .executor
                .execute(&spec)
                .await
                .map_err(|e| self.map_io_error(&spec, e))?;
            if !output.success() {
                return Err(RunnerError::InstallFailed {
                    exit_code: output.exit_code,
                    output: output.lines,
                });
            }
        }
        self.tool_installed = true;
        Ok(())
    }
}

impl<E: CommandExecutor> Runner for CommandRunner<E> {
    async fn run(&mut self, variant: &Variant) -> Result<RunResult, RunnerError> {
        self.ensure_tool_installed().await?;

        let spec = self.test_command(variant)?;
        println!(
            "  {} {}",
            t!("run.command_prefix").blue(),
            spec
        );

        let start = Instant::now();
        let output = self
            .executor
            .execute(&spec)
            .await
            .map_err(|e| self.map_io_error(&spec, e))?;
        let duration = start.elapsed();

        if !output.lines.is_empty() {
            println!("{}", output.lines.join("\n"));
        }

        Ok(RunResult {
            variant: variant.clone(),
            exit_code: output.exit_code,
            log: output.lines,
            duration,
        })
    }
}
