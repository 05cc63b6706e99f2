//! # Orchestrator Module / 编排模块
//!
//! Drives each variant through `Pending → Provisioning → Bootstrapping →
//! Running → Completed`, strictly one variant at a time and in declaration
//! order. Variants share host-global resources (the installed database
//! service and its configuration), so no two are ever in flight together.
//!
//! 驱动每个变体依次经过 `Pending → Provisioning → Bootstrapping →
//! Running → Completed`，严格地一次一个、按声明顺序进行。
//! 变体共享主机全局资源（已安装的数据库服务及其配置），因此任何时候只有一个变体在执行。

use chrono::Local;
use colored::*;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::bootstrap::Bootstrapper;
use crate::core::error::VariantError;
use crate::core::models::{MatrixReport, Outcome, Phase, RunResult, Variant, VariantReport};
use crate::core::provision::Provisioner;
use crate::core::runner::Runner;
use crate::infra::t;

/// Sequences provisioning, bootstrapping and running across a matrix.
pub struct Orchestrator<P, B, R> {
    provisioner: P,
    bootstrapper: B,
    runner: R,
    stop_token: CancellationToken,
}

impl<P, B, R> Orchestrator<P, B, R>
where
    P: Provisioner,
    B: Bootstrapper,
    R: Runner,
{
    pub fn new(provisioner: P, bootstrapper: B, runner: R) -> Self {
        Self {
            provisioner,
            bootstrapper,
            runner,
            stop_token: CancellationToken::new(),
        }
    }

    /// Uses `token` to interrupt the run; cancelling it aborts the current
    /// variant and skips the remaining ones.
    pub fn with_stop_token(mut self, token: CancellationToken) -> Self {
        self.stop_token = token;
        self
    }

    /// Runs every variant exactly once, in order, and aggregates the results.
    /// 按顺序将每个变体恰好运行一次，并汇总结果。
    pub async fn run_matrix(&mut self, variants: &[Variant]) -> MatrixReport {
        let started_at = Local::now();
        let mut reports = Vec::with_capacity(variants.len());

        for (position, variant) in variants.iter().enumerate() {
            if self.stop_token.is_cancelled() {
                reports.push(VariantReport::skipped(variant.clone()));
                continue;
            }

            println!(
                "\n{}",
                t!(
                    "run.variant_banner",
                    current = position + 1,
                    total = variants.len(),
                    label = variant.label()
                )
                .cyan()
                .bold()
            );

            let report = self.run_variant(variant).await;
            print_variant_outcome(&report);
            reports.push(report);
        }

        MatrixReport {
            reports,
            started_at,
            finished_at: Local::now(),
        }
    }

    /// Runs a single variant to a terminal state.
    pub async fn run_variant(&mut self, variant: &Variant) -> VariantReport {
        let start = Instant::now();
        let mut phases = vec![Phase::Pending];
        let stop_token = self.stop_token.clone();

        let result = tokio::select! {
            biased;
            _ = stop_token.cancelled() => Err(VariantError::Interrupted),
            res = self.advance(variant, &mut phases) => res,
        };

        let (outcome, run, error) = match result {
            Ok(run) if run.passed() => (Outcome::Passed, Some(run), None),
            Ok(run) => (Outcome::Failed, Some(run), None),
            Err(e) => (Outcome::Errored, None, Some(e)),
        };
        phases.push(Phase::Completed(outcome));

        let error_output = error.as_ref().map(|e| e.output().to_vec()).unwrap_or_default();
        if let Some(e) = &error {
            tracing::warn!(variant = %variant, error = %e, "variant errored");
        }

        VariantReport {
            variant: variant.clone(),
            phases,
            outcome,
            run,
            error: error.map(|e| e.to_string()),
            error_output,
            duration: start.elapsed(),
        }
    }

    async fn advance(
        &mut self,
        variant: &Variant,
        phases: &mut Vec<Phase>,
    ) -> Result<RunResult, VariantError> {
        phases.push(Phase::Provisioning);
        println!("{}", t!("run.phase_provisioning", backend = variant.db_backend()).blue());
        self.provisioner.prepare(variant).await?;

        if variant.db_backend().needs_service() {
            phases.push(Phase::Bootstrapping);
            println!("{}", t!("run.phase_bootstrapping").blue());
            self.bootstrapper.bootstrap().await?;
        }

        phases.push(Phase::Running);
        println!("{}", t!("run.phase_running").blue());
        Ok(self.runner.run(variant).await?)
    }
}

fn print_variant_outcome(report: &VariantReport) {
    let secs = format!("{:.2}", report.duration.as_secs_f64());
    let label = report.variant.label();
    match report.outcome {
        Outcome::Passed => println!(
            "{}",
            t!("run.variant_passed", label = label, duration = secs).green()
        ),
        Outcome::Failed => {
            let code = report.run.as_ref().map(|r| r.exit_code).unwrap_or_default();
            println!(
                "{}",
                t!("run.variant_failed", label = label, code = code, duration = secs).red()
            )
        }
        Outcome::Errored => println!(
            "{}",
            t!(
                "run.variant_errored",
                label = label,
                error = report.error.as_deref().unwrap_or_default()
            )
            .red()
        ),
        Outcome::Skipped => {}
    }
}
