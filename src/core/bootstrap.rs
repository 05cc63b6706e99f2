//! # Database Bootstrapper Module / 数据库引导模块
//!
//! Creates the superuser role the test suite logs in as. The statement is
//! idempotent in intent: a role that already exists with the required
//! attributes is accepted, one that exists in another form is a conflict.
//!
//! 创建测试套件登录所用的超级用户角色。该语句在意图上是幂等的：
//! 已存在且具备所需属性的角色会被接受，以其他形式存在的角色视为冲突。

use colored::*;
use std::future::Future;

use crate::core::config::DatabaseConfig;
use crate::core::error::BootstrapError;
use crate::infra::command::{CommandExecutor, CommandOutput, CommandSpec};
use crate::infra::t;

const UNREACHABLE_MARKERS: &[&str] = &[
    "could not connect",
    "connection refused",
    "no such file or directory",
    "is the server running",
];

// Checked first: psql 14+ prefixes every connection error with
// `connection to server on socket "..." failed:`.
const DENIED_MARKERS: &[&str] = &[
    "permission denied",
    "authentication failed",
    "must be superuser",
];

/// Creates the database objects a test run needs.
pub trait Bootstrapper {
    fn bootstrap(&mut self) -> impl Future<Output = Result<(), BootstrapError>>;
}

/// Creates the role through the `psql` administrative client.
pub struct PsqlBootstrapper<E> {
    executor: E,
    db: DatabaseConfig,
}

impl<E: CommandExecutor> PsqlBootstrapper<E> {
    pub fn new(executor: E, db: DatabaseConfig) -> Self {
        Self { executor, db }
    }

    /// `CREATE ROLE <role> SUPERUSER LOGIN CREATEDB;`
    pub fn create_statement(&self) -> String {
        format!("CREATE ROLE {} SUPERUSER LOGIN CREATEDB;", self.db.superuser)
    }

    /// Query that prints `t` when the existing role has every required attribute.
    pub fn verify_statement(&self) -> String {
        format!(
            "SELECT rolsuper AND rolcreatedb AND rolcanlogin FROM pg_roles WHERE rolname = '{}';",
            self.db.superuser
        )
    }

    fn psql(&self) -> CommandSpec {
        CommandSpec::new("psql")
            .arg("-U")
            .arg(&self.db.admin_user)
            .arg("-p")
            .arg(self.db.port.to_string())
            .args(["-v", "ON_ERROR_STOP=1"])
    }

    async fn execute(&self, spec: CommandSpec) -> Result<CommandOutput, BootstrapError> {
        self.executor
            .execute(&spec)
            .await
            .map_err(BootstrapError::Spawn)
    }

    /// Checks whether the already-existing role matches what the tests need.
    async fn verify_existing_role(&self) -> Result<(), BootstrapError> {
        let output = self
            .execute(self.psql().arg("-tAc").arg(self.verify_statement()))
            .await?;
        if !output.success() {
            return Err(classify_failure(output));
        }
        if output.lines.iter().any(|line| line.trim() == "t") {
            println!(
                "  {}",
                t!("bootstrap.role_exists", role = &self.db.superuser).dimmed()
            );
            Ok(())
        } else {
            Err(BootstrapError::ConflictingRole {
                role: self.db.superuser.clone(),
            })
        }
    }
}

impl<E: CommandExecutor> Bootstrapper for PsqlBootstrapper<E> {
    async fn bootstrap(&mut self) -> Result<(), BootstrapError> {
        let statement = self.create_statement();
        println!("  {}", t!("bootstrap.creating_role", statement = &statement).dimmed());

        let output = self.execute(self.psql().arg("-c").arg(statement)).await?;
        if output.success() {
            return Ok(());
        }
        if output.contains("already exists") {
            return self.verify_existing_role().await;
        }
        Err(classify_failure(output))
    }
}

/// Maps a failed `psql` invocation to the error that best explains it.
/// "Service down" and "permission denied" are told apart for diagnostics.
///
/// 将失败的 `psql` 调用映射为最能解释它的错误。
/// 为便于诊断，会区分“服务不可用”和“权限被拒绝”。
pub fn classify_failure(output: CommandOutput) -> BootstrapError {
    if DENIED_MARKERS.iter().any(|m| output.contains(m)) || names_missing_role(&output) {
        BootstrapError::PermissionDenied {
            output: output.lines,
        }
    } else if UNREACHABLE_MARKERS.iter().any(|m| output.contains(m)) {
        BootstrapError::ServiceUnavailable {
            output: output.lines,
        }
    } else {
        BootstrapError::Failed {
            exit_code: output.exit_code,
            output: output.lines,
        }
    }
}

/// `FATAL:  role "postgres" does not exist`
fn names_missing_role(output: &CommandOutput) -> bool {
    output.lines.iter().any(|line| {
        let line = line.to_ascii_lowercase();
        line.find("role \"")
            .is_some_and(|start| line[start..].contains("\" does not exist"))
    })
}
