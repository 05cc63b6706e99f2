//! # JSON Reporting Module / JSON 报告模块
//!
//! Serializes the whole [`MatrixReport`] for consumption by other tools.
//!
//! 序列化整个 [`MatrixReport`]，供其他工具使用。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::models::MatrixReport;

/// Renders the report as pretty-printed JSON.
pub fn render_json_report(report: &MatrixReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize matrix report")
}

/// Writes the JSON report to `output_path`.
pub fn write_json_report(report: &MatrixReport, output_path: &Path) -> Result<()> {
    let json = render_json_report(report)?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))
}
