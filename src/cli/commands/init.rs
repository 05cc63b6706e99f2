//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which writes a starter
//! `VariantMatrix.toml`. In interactive mode a short wizard asks for the
//! test command, the pinned database version and the superuser role.
//!
//! 此模块实现 `init` 命令，用于写入初始的 `VariantMatrix.toml`。
//! 在交互模式下，一个简短的向导会询问测试命令、固定的数据库版本和超级用户角色。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::{fs, path::Path};

use crate::core::config::is_sql_identifier;
use crate::infra::t;

const CONFIG_TEMPLATE: &str = r#"# Variant Matrix Configuration / 变体矩阵配置

# Language for messages / 消息语言
language = {language}

# Allowed values per dimension; empty lists are unrestricted.
# 每个维度允许的值；空列表表示不受限制。
[axes]
runtime = ["3.7", "3.8"]
framework = ["2.2", "3.0"]

# Interpreter probed on PATH for each runtime version.
# 为每个运行时版本在 PATH 上探测的解释器。
[runtime]
interpreter = "python{version}"
check_installed = true

[database]
server_version = {server_version}
port = 5432
superuser = {superuser}
admin_user = "postgres"
service = "postgresql"
config_root = "/etc/postgresql"
cluster = "main"
# pg_hba.conf is copied from this version / 从此版本复制 pg_hba.conf
auth_template_version = "9.6"
use_sudo = true
refresh_package_index = true

[runner]
install = "pip install tox-travis"
command = {command}
timeout_secs = 3600
runtime_var = "TRAVIS_PYTHON_VERSION"
framework_var = "DJANGO"
database_var = "DATABASE"

# Explicit variant list, run in this order. Not a cross product.
# 显式变体列表，按此顺序运行。不是笛卡尔积。
[[variants]]
runtime_version = "3.7"
framework_version = "2.2"
db_backend = "postgres"

[[variants]]
runtime_version = "3.7"
framework_version = "2.2"
db_backend = "sqlite"

[[variants]]
runtime_version = "3.8"
framework_version = "2.2"
db_backend = "postgres"

[[variants]]
runtime_version = "3.7"
framework_version = "3.0"
db_backend = "postgres"

[[variants]]
runtime_version = "3.8"
framework_version = "3.0"
db_backend = "postgres"
"#;

/// Answers collected by the wizard, or the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitAnswers {
    pub command: String,
    pub server_version: String,
    pub superuser: String,
}

impl Default for InitAnswers {
    fn default() -> Self {
        Self {
            command: "tox".to_string(),
            server_version: "11".to_string(),
            superuser: "travis".to_string(),
        }
    }
}

/// Fills the configuration template.
pub fn render_config(answers: &InitAnswers, language: &str) -> String {
    CONFIG_TEMPLATE
        .replace("{language}", &toml_string(language))
        .replace("{server_version}", &toml_string(&answers.server_version))
        .replace("{superuser}", &toml_string(&answers.superuser))
        .replace("{command}", &toml_string(&answers.command))
}

/// Renders `value` as a quoted, escaped TOML string.
fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

/// Executes the init command.
///
/// Without `force`, an existing file is only overwritten after interactive
/// confirmation; in non-interactive mode it is left alone.
pub fn execute(output: &Path, force: bool, non_interactive: bool, language: &str) -> Result<()> {
    let theme = ColorfulTheme::default();

    if !non_interactive {
        println!("\n{}", t!("init.welcome", locale = language).cyan().bold());
    }

    if output.exists() && !force {
        if non_interactive {
            println!("{}", t!("init.file_exists", locale = language, path = output.display()).red());
            println!("{}", t!("init.use_force", locale = language).yellow());
            return Ok(());
        }
        let confirmed = Confirm::with_theme(&theme)
            .with_prompt(t!("init.overwrite_prompt", locale = language, path = output.display()))
            .default(false)
            .interact()
            .context(t!("init.confirmation_failed", locale = language).to_string())?;
        if !confirmed {
            println!("{}", t!("init.aborted", locale = language));
            return Ok(());
        }
    }

    let answers = if non_interactive {
        InitAnswers::default()
    } else {
        ask(&theme, language)?
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            t!("init.create_parent_dir_failed", locale = language, path = parent.display()).to_string()
        })?;
    }

    fs::write(output, render_config(&answers, language))
        .with_context(|| t!("init.write_failed", locale = language, path = output.display()).to_string())?;

    println!("{}", t!("init.success", locale = language, path = output.display()).green());
    println!("{}", t!("init.next_steps", locale = language));
    Ok(())
}

fn ask(theme: &ColorfulTheme, language: &str) -> Result<InitAnswers> {
    let defaults = InitAnswers::default();

    let command: String = Input::with_theme(theme)
        .with_prompt(t!("init.command_prompt", locale = language))
        .default(defaults.command)
        .interact_text()?;

    let server_version: String = Input::with_theme(theme)
        .with_prompt(t!("init.server_version_prompt", locale = language))
        .default(defaults.server_version)
        .interact_text()?;

    let invalid_role = t!("init.invalid_role", locale = language).to_string();
    let superuser: String = Input::with_theme(theme)
        .with_prompt(t!("init.superuser_prompt", locale = language))
        .default(defaults.superuser)
        .validate_with(move |input: &String| -> Result<(), String> {
            if is_sql_identifier(input) {
                Ok(())
            } else {
                Err(invalid_role.clone())
            }
        })
        .interact_text()?;

    Ok(InitAnswers {
        command,
        server_version,
        superuser,
    })
}
