//! # Environment Provisioner Module / 环境配置模块
//!
//! Brings the host into the state a variant's database backend needs before
//! any test runs. For PostgreSQL that means a pinned server listening on the
//! expected port with a known-good client-auth file; SQLite needs nothing.
//!
//! Side effects are host-global and never rolled back.
//!
//! 在任何测试运行之前，使主机达到变体数据库后端所需的状态。
//! 对于 PostgreSQL，这意味着一个固定版本的服务器在预期端口上监听，
//! 并使用已知可用的客户端认证文件；SQLite 则无需任何操作。
//!
//! 副作用是主机全局的，且永不回滚。

use colored::*;
use std::future::Future;

use crate::core::config::DatabaseConfig;
use crate::core::error::ProvisionError;
use crate::core::models::Variant;
use crate::infra::command::{CommandExecutor, CommandSpec};
use crate::infra::t;

/// Performs one-time host setup for a variant.
pub trait Provisioner {
    /// Prepares the host for `variant`. Calling it again for the same
    /// backend must succeed and leave the service running.
    fn prepare(&mut self, variant: &Variant) -> impl Future<Output = Result<(), ProvisionError>>;
}

/// A single provisioning command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionStep {
    pub name: &'static str,
    pub command: CommandSpec,
    /// A failing tolerant step is logged and skipped.
    pub tolerate_failure: bool,
}

impl ProvisionStep {
    fn new(name: &'static str, command: CommandSpec) -> Self {
        Self {
            name,
            command,
            tolerate_failure: false,
        }
    }

    fn tolerant(mut self) -> Self {
        self.tolerate_failure = true;
        self
    }
}

/// Provisions a pinned PostgreSQL through the OS package and service managers.
/// 通过操作系统的包管理器和服务管理器配置固定版本的 PostgreSQL。
pub struct PostgresProvisioner<E> {
    executor: E,
    db: DatabaseConfig,
    /// Set once the full installation has succeeded in this process.
    provisioned: bool,
}

impl<E: CommandExecutor> PostgresProvisioner<E> {
    pub fn new(executor: E, db: DatabaseConfig) -> Self {
        Self {
            executor,
            db,
            provisioned: false,
        }
    }

    /// The `sed` expression that pins the server port.
    pub fn port_rewrite_expression(port: u16) -> String {
        format!("s/^#\\?port = [0-9]\\+/port = {port}/")
    }

    /// Every step of a fresh installation, in execution order.
    /// 全新安装的所有步骤，按执行顺序排列。
    pub fn full_plan(&self) -> Vec<ProvisionStep> {
        let db = &self.db;
        let version = &db.server_version;
        let sudo = db.use_sudo;
        let mut steps = Vec::new();

        if db.refresh_package_index {
            steps.push(ProvisionStep::new(
                "refresh package index",
                CommandSpec::new("apt-get").arg("update").elevated(sudo),
            ));
        }

        // Nothing to remove on a clean host.
        steps.push(
            ProvisionStep::new(
                "remove existing server",
                CommandSpec::new("apt-get")
                    .args(["--yes", "remove", "postgresql*"])
                    .elevated(sudo),
            )
            .tolerant(),
        );

        steps.push(ProvisionStep::new(
            "install server",
            CommandSpec::new("apt-get")
                .args(["--yes", "install"])
                .arg(format!("postgresql-{version}"))
                .arg(format!("postgresql-client-{version}"))
                .elevated(sudo),
        ));

        steps.push(ProvisionStep::new(
            "configure port",
            CommandSpec::new("sed")
                .arg("-i")
                .arg(Self::port_rewrite_expression(db.port))
                .arg(db.cluster_file(version, "postgresql.conf"))
                .elevated(sudo),
        ));

        if let Some(template) = db.auth_template_version.as_ref().filter(|t| *t != version) {
            steps.push(ProvisionStep::new(
                "copy client auth config",
                CommandSpec::new("cp")
                    .arg(db.cluster_file(template, "pg_hba.conf"))
                    .arg(db.cluster_file(version, "pg_hba.conf"))
                    .elevated(sudo),
            ));
        }

        steps.push(self.restart_step());
        steps
    }

    fn restart_step(&self) -> ProvisionStep {
        ProvisionStep::new(
            "restart service",
            CommandSpec::new("service")
                .arg(&self.db.service)
                .arg("restart")
                .arg(&self.db.server_version)
                .elevated(self.db.use_sudo),
        )
    }

    async fn run_step(&self, step: &ProvisionStep) -> Result<(), ProvisionError> {
        println!("  {}", t!("provision.step", step = step.name, command = &step.command).dimmed());

        let output = self
            .executor
            .execute(&step.command)
            .await
            .map_err(|source| ProvisionError::Spawn {
                step: step.name.to_string(),
                source,
            })?;

        if output.success() {
            return Ok(());
        }
        if step.tolerate_failure {
            tracing::warn!(
                step = step.name,
                exit_code = output.exit_code,
                "tolerated provisioning failure"
            );
            return Ok(());
        }
        Err(ProvisionError::StepFailed {
            step: step.name.to_string(),
            exit_code: output.exit_code,
            output: output.lines,
        })
    }
}

impl<E: CommandExecutor> Provisioner for PostgresProvisioner<E> {
    async fn prepare(&mut self, variant: &Variant) -> Result<(), ProvisionError> {
        if !variant.db_backend().needs_service() {
            tracing::debug!(variant = %variant, "backend needs no provisioning");
            return Ok(());
        }

        let steps = if self.provisioned {
            println!(
                "  {}",
                t!("provision.already_provisioned", version = &self.db.server_version).dimmed()
            );
            vec![self.restart_step()]
        } else {
            self.full_plan()
        };

        for step in &steps {
            self.run_step(step).await?;
        }
        self.provisioned = true;
        Ok(())
    }
}
