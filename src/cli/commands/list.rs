//! # List Command Module / 列表命令模块
//!
//! Prints the validated matrix without touching the host.
//!
//! 打印经过校验的矩阵，不对主机做任何修改。

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use crate::core::{config, matrix};
use crate::infra::{probe::PathProbe, t};

pub fn execute(config_path: &Path, lang_override: Option<String>) -> Result<()> {
    let config = config::load_matrix(config_path).with_context(|| t!("config_parse_failed").to_string())?;
    let locale = crate::resolve_locale(lang_override.as_deref().unwrap_or(&config.language));
    rust_i18n::set_locale(&locale);

    let variants = matrix::expand(&config, &PathProbe::default())
        .with_context(|| t!("matrix_invalid", locale = &locale).to_string())?;

    println!("{}", t!("list.banner", locale = &locale, count = variants.len()).bold());
    println!(
        "  {:>3}  {:<32} {:<10} {:<10} {}",
        "#".dimmed(),
        t!("list.header_label", locale = &locale).dimmed(),
        t!("list.header_runtime", locale = &locale).dimmed(),
        t!("list.header_framework", locale = &locale).dimmed(),
        t!("list.header_backend", locale = &locale).dimmed()
    );
    for variant in &variants {
        println!(
            "  {:>3}  {:<32} {:<10} {:<10} {}",
            variant.index(),
            variant.label().cyan(),
            variant.runtime_version(),
            variant.framework_version(),
            variant.db_backend()
        );
    }
    Ok(())
}
