//! # Error Taxonomy Module / 错误分类模块
//!
//! Typed errors for each phase of a variant's lifecycle. Configuration errors
//! abort the whole run before anything touches the host; the other kinds only
//! abort the variant they occurred in.
//!
//! 变体生命周期各阶段的类型化错误。配置错误会在任何主机操作之前中止整个运行；
//! 其他错误只中止发生错误的那个变体。

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The matrix or its surrounding configuration is malformed or unsupported.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("the matrix declares no variants")]
    EmptyMatrix,

    #[error("variant #{index}: unsupported db_backend '{value}' (expected postgres or sqlite)")]
    UnsupportedBackend { index: usize, value: String },

    #[error("variant #{index}: runtime_version '{value}' is not in the runtime axis {allowed:?}")]
    RuntimeNotInAxis {
        index: usize,
        value: String,
        allowed: Vec<String>,
    },

    #[error("variant #{index}: framework_version '{value}' is not in the framework axis {allowed:?}")]
    FrameworkNotInAxis {
        index: usize,
        value: String,
        allowed: Vec<String>,
    },

    #[error("variant #{index}: runtime {version} is not installable on this host (looked for '{interpreter}')")]
    RuntimeNotInstallable {
        index: usize,
        version: String,
        interpreter: String,
    },

    #[error("invalid superuser role name '{0}': must be a plain SQL identifier")]
    InvalidRoleName(String),

    #[error("runner command is empty")]
    EmptyCommand,

    #[error("no variant matches the selection '{0}'")]
    UnmatchedSelection(String),
}

/// Host provisioning failed for a variant.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("provisioning step '{step}' exited with code {exit_code}")]
    StepFailed {
        step: String,
        exit_code: i32,
        output: Vec<String>,
    },

    #[error("provisioning step '{step}' could not be launched: {source}")]
    Spawn {
        step: String,
        #[source]
        source: io::Error,
    },
}

/// Creating the superuser role failed.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("database service is unreachable")]
    ServiceUnavailable { output: Vec<String> },

    #[error("permission denied while creating the role")]
    PermissionDenied { output: Vec<String> },

    #[error("role '{role}' already exists without SUPERUSER, CREATEDB and LOGIN")]
    ConflictingRole { role: String },

    #[error("role creation exited with code {exit_code}")]
    Failed { exit_code: i32, output: Vec<String> },

    #[error("database client could not be launched: {0}")]
    Spawn(#[source] io::Error),
}

/// The test command could not be executed at all.
///
/// A test command that runs and exits non-zero is *not* an error; it is an
/// ordinary failed [`RunResult`](crate::core::models::RunResult).
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid command '{0}'")]
    InvalidCommand(String),

    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("tool installation exited with code {exit_code}")]
    InstallFailed { exit_code: i32, output: Vec<String> },

    #[error("test command timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Any error that terminates a single variant as `Errored`.
#[derive(Debug, Error)]
pub enum VariantError {
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("interrupted by user")]
    Interrupted,
}

impl VariantError {
    /// Captured subprocess output attached to the error, if any.
    pub fn output(&self) -> &[String] {
        match self {
            VariantError::Provision(ProvisionError::StepFailed { output, .. })
            | VariantError::Bootstrap(BootstrapError::ServiceUnavailable { output })
            | VariantError::Bootstrap(BootstrapError::PermissionDenied { output })
            | VariantError::Bootstrap(BootstrapError::Failed { output, .. })
            | VariantError::Runner(RunnerError::InstallFailed { output, .. }) => output,
            _ => &[],
        }
    }
}
