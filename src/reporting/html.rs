//! # HTML Reporting Module / HTML 报告模块
//!
//! This module renders the matrix report as a standalone HTML page with
//! summary statistics, a results table and a collapsible log per variant.
//!
//! 此模块将矩阵报告渲染为独立的 HTML 页面，包含汇总统计、结果表格以及每个变体可折叠的日志。

use anyhow::{Context, Result};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;

use crate::core::models::{MatrixReport, Outcome};
use crate::infra::t;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2em; color: #24292f; }
h1 { border-bottom: 1px solid #d0d7de; padding-bottom: .3em; }
.stats span { display: inline-block; margin-right: 1.5em; font-weight: 600; }
table { border-collapse: collapse; width: 100%; margin-top: 1em; }
th, td { border: 1px solid #d0d7de; padding: 6px 10px; text-align: left; vertical-align: top; }
th { background: #f6f8fa; }
.status-Passed { color: #1a7f37; }
.status-Failed { color: #cf222e; }
.status-Errored { color: #bc4c00; }
.status-Skipped { color: #6e7781; }
pre { background: #f6f8fa; padding: 1em; overflow-x: auto; max-height: 40em; }
"#;

/// Renders the report into HTML markup.
/// 将报告渲染为 HTML 标记。
pub fn render_html_report(report: &MatrixReport, locale: &str) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title", locale = locale)) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header", locale = locale)) }
                p {
                    (t!("html_report.generated_at", locale = locale,
                        time = report.finished_at.format("%Y-%m-%d %H:%M:%S")))
                }
                div class="stats" {
                    span class="status-Passed" {
                        (t!("report.status_passed", locale = locale)) ": " (report.count(Outcome::Passed))
                    }
                    span class="status-Failed" {
                        (t!("report.status_failed", locale = locale)) ": " (report.count(Outcome::Failed))
                    }
                    span class="status-Errored" {
                        (t!("report.status_errored", locale = locale)) ": " (report.count(Outcome::Errored))
                    }
                    span class="status-Skipped" {
                        (t!("report.status_skipped", locale = locale)) ": " (report.count(Outcome::Skipped))
                    }
                }
                table {
                    thead {
                        tr {
                            th { "#" }
                            th { (t!("html_report.header_variant", locale = locale)) }
                            th { (t!("html_report.header_status", locale = locale)) }
                            th { (t!("html_report.header_duration", locale = locale)) }
                            th { (t!("html_report.header_details", locale = locale)) }
                        }
                    }
                    tbody {
                        @for variant in &report.reports {
                            tr {
                                td { (variant.variant.index()) }
                                td {
                                    code { (variant.variant.label()) }
                                }
                                td class=(variant.outcome.css_class()) {
                                    (variant.outcome.label(locale))
                                }
                                td { (format!("{:.2}s", variant.duration.as_secs_f64())) }
                                td {
                                    @if let Some(error) = &variant.error {
                                        p { (error) }
                                    }
                                    @let log = variant.log();
                                    @if !log.is_empty() {
                                        details {
                                            summary { (t!("html_report.view_log", locale = locale)) }
                                            pre { (log.join("\n")) }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Writes the HTML report to `output_path`.
///
/// # Errors
/// Returns an error if the file cannot be written.
///
/// 将 HTML 报告写入 `output_path`。
pub fn generate_html_report(report: &MatrixReport, output_path: &Path, locale: &str) -> Result<()> {
    let markup = render_html_report(report, locale);
    fs::write(output_path, markup.into_string())
        .with_context(|| format!("Failed to write HTML report to {}", output_path.display()))
}
