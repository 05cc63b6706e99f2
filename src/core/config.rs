//! # Configuration Module / 配置模块
//!
//! Parses `VariantMatrix.toml` into typed settings. Structural problems
//! (bad TOML, unknown keys, an invalid role name) are reported as
//! [`ConfigError`]; per-variant validation happens in the matrix expander.
//!
//! 将 `VariantMatrix.toml` 解析为类型化设置。结构性问题
//! （无效的 TOML、未知键、无效的角色名）报告为 [`ConfigError`]；
//! 逐变体校验在矩阵展开器中进行。

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "VariantMatrix.toml";

/// Represents the entire matrix configuration, loaded from a TOML file.
/// 代表从 TOML 文件加载的整个矩阵配置。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixConfig {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub axes: AxesConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    pub runner: RunnerConfig,

    /// The explicit, ordered list of variants. Never cross-multiplied.
    /// 显式的、有序的变体列表。不会进行笛卡尔积展开。
    #[serde(default)]
    pub variants: Vec<VariantSpec>,
}

/// Allowed values per matrix dimension. An empty list leaves the dimension unrestricted.
/// 每个矩阵维度允许的值。空列表表示该维度不受限制。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AxesConfig {
    #[serde(default)]
    pub runtime: Vec<String>,
    #[serde(default)]
    pub framework: Vec<String>,
}

/// How runtime installability is checked on the host.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Interpreter executable looked up on `PATH`; `{version}` is substituted.
    /// 在 `PATH` 上查找的解释器可执行文件；`{version}` 会被替换。
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    #[serde(default = "default_true")]
    pub check_installed: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            check_installed: true,
        }
    }
}

impl RuntimeConfig {
    /// The interpreter name for a given runtime version.
    pub fn interpreter_for(&self, version: &str) -> String {
        self.interpreter.replace("{version}", version)
    }
}

/// Settings for the pinned PostgreSQL installation and its superuser role.
/// 固定版本 PostgreSQL 安装及其超级用户角色的设置。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Pinned server/client major version, e.g. "11".
    #[serde(default = "default_server_version")]
    pub server_version: String,
    /// Port the server must listen on after provisioning.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Role created for the test suite.
    #[serde(default = "default_superuser")]
    pub superuser: String,
    /// Existing administrative role used to run `psql`.
    #[serde(default = "default_admin_user")]
    pub admin_user: String,
    #[serde(default = "default_service")]
    pub service: String,
    #[serde(default = "default_config_root")]
    pub config_root: String,
    #[serde(default = "default_cluster")]
    pub cluster: String,
    /// Prior server version whose `pg_hba.conf` is copied over the fresh one.
    /// Set it to `server_version` to keep the packaged file.
    /// 将其 `pg_hba.conf` 复制到新安装上的旧服务器版本。
    #[serde(default = "default_auth_template_version")]
    pub auth_template_version: Option<String>,
    #[serde(default = "default_true")]
    pub use_sudo: bool,
    #[serde(default = "default_true")]
    pub refresh_package_index: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            server_version: default_server_version(),
            port: default_port(),
            superuser: default_superuser(),
            admin_user: default_admin_user(),
            service: default_service(),
            config_root: default_config_root(),
            cluster: default_cluster(),
            auth_template_version: default_auth_template_version(),
            use_sudo: true,
            refresh_package_index: true,
        }
    }
}

impl DatabaseConfig {
    /// Path of a file inside a version's cluster config directory.
    pub fn cluster_file(&self, version: &str, file: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config_root.trim_end_matches('/'),
            version,
            self.cluster,
            file
        )
    }
}

/// How the test-orchestration tool is installed and invoked.
/// 测试编排工具的安装和调用方式。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Installs the test tool once per process, e.g. `pip install tox-travis`.
    #[serde(default)]
    pub install: Option<String>,
    /// The test command, e.g. `tox`.
    pub command: String,
    /// Optional timeout in seconds for each test command.
    /// 每个测试命令的可选超时时间（秒）。
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_runtime_var")]
    pub runtime_var: String,
    #[serde(default = "default_framework_var")]
    pub framework_var: String,
    #[serde(default = "default_database_var")]
    pub database_var: String,
    /// Extra variables exported to every test command.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// A variant as written in the config file, before validation.
/// 配置文件中书写的变体（校验之前）。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VariantSpec {
    pub runtime_version: String,
    pub framework_version: String,
    pub db_backend: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

fn default_interpreter() -> String {
    "python{version}".to_string()
}

fn default_server_version() -> String {
    "11".to_string()
}

fn default_auth_template_version() -> Option<String> {
    Some("9.6".to_string())
}

fn default_port() -> u16 {
    5432
}

fn default_superuser() -> String {
    "travis".to_string()
}

fn default_admin_user() -> String {
    "postgres".to_string()
}

fn default_service() -> String {
    "postgresql".to_string()
}

fn default_config_root() -> String {
    "/etc/postgresql".to_string()
}

fn default_cluster() -> String {
    "main".to_string()
}

fn default_runtime_var() -> String {
    "TRAVIS_PYTHON_VERSION".to_string()
}

fn default_framework_var() -> String {
    "DJANGO".to_string()
}

fn default_database_var() -> String {
    "DATABASE".to_string()
}

/// Returns true when `name` is a plain, unquoted SQL identifier.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parses configuration text and checks the structural invariants.
pub fn parse_matrix(content: &str) -> Result<MatrixConfig, ConfigError> {
    let config: MatrixConfig = toml::from_str(content)?;

    if !is_sql_identifier(&config.database.superuser) {
        return Err(ConfigError::InvalidRoleName(config.database.superuser));
    }
    if !is_sql_identifier(&config.database.admin_user) {
        return Err(ConfigError::InvalidRoleName(config.database.admin_user));
    }
    if config.runner.command.trim().is_empty() {
        return Err(ConfigError::EmptyCommand);
    }

    Ok(config)
}

/// Loads and validates the matrix configuration from a file.
/// 从文件加载并校验矩阵配置。
pub fn load_matrix(path: &Path) -> Result<MatrixConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_matrix(&content)
}
