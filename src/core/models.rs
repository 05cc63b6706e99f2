//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the variant matrix:
//! the immutable `Variant` descriptor, the `RunResult` produced by the runner,
//! and the per-variant and aggregate reports assembled by the orchestrator.
//!
//! 此模块定义了整个变体矩阵中使用的核心数据结构：
//! 不可变的 `Variant` 描述符、运行器产生的 `RunResult`，
//! 以及编排器汇总的单变体报告和总体报告。

use crate::infra::t;
use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// The database backend a variant tests against.
/// 变体测试所使用的数据库后端。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DbBackend {
    /// A PostgreSQL server provisioned on the host.
    /// 在主机上配置的 PostgreSQL 服务器。
    Postgres,
    /// An in-process SQLite database; needs no host setup.
    /// 进程内 SQLite 数据库；无需主机配置。
    Sqlite,
}

impl DbBackend {
    /// Whether the backend needs a running database service and a bootstrapped role.
    pub fn needs_service(self) -> bool {
        matches!(self, DbBackend::Postgres)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DbBackend::Postgres => "postgres",
            DbBackend::Sqlite => "sqlite",
        }
    }
}

impl FromStr for DbBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DbBackend::Postgres),
            "sqlite" | "sqlite3" => Ok(DbBackend::Sqlite),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for DbBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point in the test matrix. Created by the matrix expander and
/// consumed read-only by every later phase.
///
/// 测试矩阵中的一个点。由矩阵展开器创建，之后的所有阶段只读使用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    index: usize,
    name: Option<String>,
    runtime_version: String,
    framework_version: String,
    db_backend: DbBackend,
}

impl Variant {
    pub fn new(
        index: usize,
        runtime_version: impl Into<String>,
        framework_version: impl Into<String>,
        db_backend: DbBackend,
    ) -> Self {
        Self {
            index,
            name: None,
            runtime_version: runtime_version.into(),
            framework_version: framework_version.into(),
            db_backend,
        }
    }

    /// Attaches an explicit display name, overriding the generated label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 1-based position in the declared matrix.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn runtime_version(&self) -> &str {
        &self.runtime_version
    }

    pub fn framework_version(&self) -> &str {
        &self.framework_version
    }

    pub fn db_backend(&self) -> DbBackend {
        self.db_backend
    }

    /// A short identifier such as `py3.7-dj2.2-postgres`, or the declared name.
    /// 简短的标识符，例如 `py3.7-dj2.2-postgres`，或声明的名称。
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!(
                "py{}-dj{}-{}",
                self.runtime_version, self.framework_version, self.db_backend
            ),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.index, self.label())
    }
}

/// Outcome of executing the test command for one fully provisioned variant.
/// 为一个已完全配置的变体执行测试命令的结果。
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// The variant that was run / 被运行的变体
    pub variant: Variant,
    /// Exit code of the test command; `-1` when killed by a signal.
    /// 测试命令的退出码；被信号终止时为 `-1`。
    pub exit_code: i32,
    /// Interleaved stdout/stderr lines / 交错的 stdout/stderr 行
    pub log: Vec<String>,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
}

impl RunResult {
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }
}

/// Terminal classification of a variant.
/// 变体的最终分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The test command exited 0.
    Passed,
    /// The test command ran and exited non-zero.
    Failed,
    /// A phase before or around the test command failed.
    Errored,
    /// Never started because the run was interrupted.
    Skipped,
}

impl Outcome {
    /// Gets the status as a localized string for display.
    /// 以本地化字符串形式获取状态以供显示。
    pub fn label(self, locale: &str) -> String {
        match self {
            Outcome::Passed => t!("report.status_passed", locale = locale).to_string(),
            Outcome::Failed => t!("report.status_failed", locale = locale).to_string(),
            Outcome::Errored => t!("report.status_errored", locale = locale).to_string(),
            Outcome::Skipped => t!("report.status_skipped", locale = locale).to_string(),
        }
    }

    /// Gets the appropriate CSS class for the status.
    pub fn css_class(self) -> &'static str {
        match self {
            Outcome::Passed => "status-Passed",
            Outcome::Failed => "status-Failed",
            Outcome::Errored => "status-Errored",
            Outcome::Skipped => "status-Skipped",
        }
    }
}

/// States of the per-variant lifecycle.
/// 单变体生命周期的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Pending,
    Provisioning,
    Bootstrapping,
    Running,
    Completed(Outcome),
}

/// Everything the orchestrator knows about one variant once it is terminal.
/// 变体进入终态后编排器所掌握的全部信息。
#[derive(Debug, Clone, Serialize)]
pub struct VariantReport {
    pub variant: Variant,
    /// Phases visited, in order, ending with `Completed`.
    /// 按顺序访问的阶段，以 `Completed` 结尾。
    pub phases: Vec<Phase>,
    pub outcome: Outcome,
    /// Present whenever the runner produced a result.
    pub run: Option<RunResult>,
    /// Rendered error for `Errored` variants.
    pub error: Option<String>,
    /// Output captured by the failing phase, if any.
    pub error_output: Vec<String>,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
}

impl VariantReport {
    /// A variant that was never started.
    pub fn skipped(variant: Variant) -> Self {
        Self {
            variant,
            phases: vec![Phase::Pending, Phase::Completed(Outcome::Skipped)],
            outcome: Outcome::Skipped,
            run: None,
            error: None,
            error_output: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    /// The log to show for this variant: the runner's output when it ran,
    /// otherwise whatever the failing phase captured.
    /// 此变体要显示的日志：运行过则为运行器的输出，否则为失败阶段捕获的输出。
    pub fn log(&self) -> &[String] {
        match &self.run {
            Some(run) => &run.log,
            None => &self.error_output,
        }
    }
}

/// The aggregated result of a whole matrix run.
/// 整个矩阵运行的汇总结果。
#[derive(Debug, Clone, Serialize)]
pub struct MatrixReport {
    pub reports: Vec<VariantReport>,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl MatrixReport {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.reports.iter().filter(|r| r.outcome == outcome).count()
    }

    /// `true` iff every variant passed. An empty report is not a success.
    pub fn is_success(&self) -> bool {
        !self.reports.is_empty() && self.reports.iter().all(VariantReport::is_passed)
    }

    /// Process exit status for the run.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
