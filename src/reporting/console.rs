//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints the end-of-run summary to the console: a colored
//! table with one row per variant, followed by the captured logs of every
//! variant that did not pass.
//!
//! 此模块在控制台打印运行结束时的摘要：每个变体一行的彩色表格，
//! 随后是每个未通过变体的捕获日志。

use colored::*;

use crate::core::models::{MatrixReport, Outcome, VariantReport};
use crate::infra::t;

/// Prints a formatted summary of the matrix run to the console.
///
/// 在控制台打印格式化的矩阵运行摘要。
///
/// # Output Format / 输出格式
/// ```text
/// --- Matrix Summary ---
///   - Status     | Variant                                  |   Duration  Exit
///   - Passed     | py3.7-dj2.2-postgres                     |     41.20s  0
///   - Failed     | py3.7-dj2.2-sqlite                       |     12.03s  1
///   - Errored    | py3.8-dj3.0-postgres                     |      0.45s  -
/// ```
pub fn print_summary(report: &MatrixReport, locale: &str) {
    println!("\n{}", t!("summary.banner", locale = locale).bold());

    for variant in &report.reports {
        let status = variant.outcome.label(locale);
        let status = match variant.outcome {
            Outcome::Passed => status.green(),
            Outcome::Failed | Outcome::Errored => status.red(),
            Outcome::Skipped => status.dimmed(),
        };
        let duration = match variant.outcome {
            Outcome::Skipped => "N/A".to_string(),
            _ => format!("{:.2}s", variant.duration.as_secs_f64()),
        };
        let exit = variant
            .run
            .as_ref()
            .map(|r| r.exit_code.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  - {:<12} | {:<40} | {:>10}  {}",
            status,
            variant.variant.label(),
            duration,
            exit
        );
    }

    println!(
        "\n{}",
        t!(
            "summary.counts",
            locale = locale,
            passed = report.count(Outcome::Passed),
            failed = report.count(Outcome::Failed),
            errored = report.count(Outcome::Errored),
            skipped = report.count(Outcome::Skipped)
        )
    );
}

/// Prints the captured output of every variant that failed or errored.
/// Returns early when there is nothing to show.
///
/// 打印每个失败或出错变体的捕获输出。没有可显示内容时提前返回。
pub fn print_error_details(report: &MatrixReport, locale: &str) {
    let troubled: Vec<&VariantReport> = report
        .reports
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Failed | Outcome::Errored))
        .collect();
    if troubled.is_empty() {
        return;
    }

    println!("\n{}", t!("summary.failure_banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));

    for (i, variant) in troubled.iter().enumerate() {
        println!(
            "[{}/{}] {} '{}'",
            i + 1,
            troubled.len(),
            variant.outcome.label(locale).red(),
            variant.variant.label().cyan()
        );
        if let Some(error) = &variant.error {
            println!("  {}", error.yellow());
        }

        let log = variant.log();
        if !log.is_empty() {
            println!("\n--- {} ---\n", t!("summary.log_header", locale = locale).yellow());
            println!("{}", log.join("\n"));
        }
        println!("\n{}", "-".repeat(80));
    }
}
