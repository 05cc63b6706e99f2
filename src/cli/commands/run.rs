//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command: it loads and validates the
//! matrix, then provisions, bootstraps and tests every variant in order and
//! reports the aggregate result through the process exit status.
//!
//! 此模块实现 `run` 命令：加载并校验矩阵，然后按顺序为每个变体执行配置、
//! 引导和测试，并通过进程退出状态报告汇总结果。

use anyhow::{Context, Result};
use colored::*;
use std::{fs, path::PathBuf};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        bootstrap::PsqlBootstrapper,
        config::{self, MatrixConfig},
        matrix,
        models::{MatrixReport, Variant},
        orchestrator::Orchestrator,
        provision::PostgresProvisioner,
        runner::CommandRunner,
    },
    infra::{
        command::{CommandExecutor, DryRunExecutor, SystemExecutor},
        probe::PathProbe,
        t,
    },
    reporting::{generate_html_report, print_error_details, print_summary, write_json_report},
};

/// Arguments of the `run` subcommand.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: PathBuf,
    pub project_dir: PathBuf,
    /// Variant labels or 1-based indices to restrict the run to.
    pub only: Vec<String>,
    pub dry_run: bool,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// Language given with `--lang`; wins over the config file's `language`.
    pub lang_override: Option<String>,
}

/// Executes the run command.
///
/// # Errors
/// Fails on configuration errors (before anything touches the host) and when
/// any variant did not pass.
pub async fn execute(options: RunOptions) -> Result<()> {
    let (config, config_path) = setup_and_parse_config(&options.config)?;
    let locale = crate::resolve_locale(options.lang_override.as_deref().unwrap_or(&config.language));
    rust_i18n::set_locale(&locale);

    let project_root = fs::canonicalize(&options.project_dir).with_context(|| {
        t!("project_dir_not_found", locale = &locale, path = options.project_dir.display()).to_string()
    })?;

    println!(
        "{}",
        t!("loading_matrix", locale = &locale, path = config_path.display())
    );
    println!(
        "{}",
        t!("project_root_detected", locale = &locale, path = project_root.display())
    );

    let variants = matrix::expand(&config, &PathProbe::default())
        .with_context(|| t!("matrix_invalid", locale = &locale).to_string())?;
    let variants = matrix::select(variants, &options.only)
        .with_context(|| t!("matrix_invalid", locale = &locale).to_string())?;

    println!(
        "{}",
        t!("variants_planned", locale = &locale, count = variants.len()).bold()
    );
    if options.dry_run {
        println!("{}", t!("dry_run.banner", locale = &locale).yellow());
    }

    let stop_token = setup_signal_handler(&locale);

    let report = if options.dry_run {
        run_matrix_with(DryRunExecutor, &config, project_root, &variants, stop_token).await
    } else {
        run_matrix_with(SystemExecutor, &config, project_root, &variants, stop_token).await
    };

    print_summary(&report, &locale);

    if let Some(path) = &options.html {
        println!("\n{}", t!("report.html_writing", locale = &locale, path = path.display()));
        if let Err(e) = generate_html_report(&report, path, &locale) {
            eprintln!("{} {:#}", t!("report.write_failed", locale = &locale).red(), e);
        }
    }
    if let Some(path) = &options.json {
        println!("{}", t!("report.json_writing", locale = &locale, path = path.display()));
        if let Err(e) = write_json_report(&report, path) {
            eprintln!("{} {:#}", t!("report.write_failed", locale = &locale).red(), e);
        }
    }

    if report.is_success() {
        println!("\n{}", t!("all_variants_passed", locale = &locale).green().bold());
        Ok(())
    } else {
        print_error_details(&report, &locale);
        anyhow::bail!(t!("matrix_failed", locale = &locale).to_string());
    }
}

/// Reads and validates the matrix configuration file.
fn setup_and_parse_config(config_path_arg: &PathBuf) -> Result<(MatrixConfig, PathBuf)> {
    let config_path = fs::canonicalize(config_path_arg).with_context(|| {
        t!("config_read_failed_path", path = config_path_arg.display()).to_string()
    })?;

    let config = config::load_matrix(&config_path)
        .with_context(|| t!("config_parse_failed").to_string())?;

    Ok((config, config_path))
}

/// Wires the real components around `executor` and runs the matrix.
async fn run_matrix_with<E: CommandExecutor + Clone>(
    executor: E,
    config: &MatrixConfig,
    project_root: PathBuf,
    variants: &[Variant],
    stop_token: CancellationToken,
) -> MatrixReport {
    let mut orchestrator = Orchestrator::new(
        PostgresProvisioner::new(executor.clone(), config.database.clone()),
        PsqlBootstrapper::new(executor.clone(), config.database.clone()),
        CommandRunner::new(executor, config.runner.clone(), project_root),
    )
    .with_stop_token(stop_token);

    orchestrator.run_matrix(variants).await
}

/// Sets up a Ctrl-C handler that cancels the returned token.
fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("shutdown_signal", locale = &locale).yellow());
            token_clone.cancel();
        }
    });

    token
}
