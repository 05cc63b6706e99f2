//! # Variant Matrix Library / Variant Matrix 库
//!
//! This library provides the core functionality for the Variant Matrix tool,
//! a configuration-driven orchestrator that provisions a database, bootstraps
//! a superuser role and runs a test command across an explicit list of
//! runtime/framework/database variants.
//!
//! 此库为 Variant Matrix 工具提供核心功能，
//! 这是一个配置驱动的编排器：它配置数据库、引导超级用户角色，
//! 并在显式的运行时/框架/数据库变体列表上运行测试命令。
//!
//! ## Modules / 模块
//!
//! - `core` - Configuration, data models, matrix expansion and the variant pipeline
//! - `infra` - Subprocess execution and host probing
//! - `reporting` - Console, HTML and JSON reports
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 配置、数据模型、矩阵展开和变体流水线
//! - `infra` - 子进程执行和主机探测
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::error;
pub use core::models;

/// Maps a requested locale onto one the message catalogs provide.
///
/// It tries the full locale first (e.g., "zh-CN"), then just the language
/// code (e.g., "en" from "en-US"), and finally falls back to "en".
///
/// 将请求的语言区域映射到消息目录提供的区域。
/// 先尝试完整区域（如 "zh-CN"），再尝试语言代码（如 "en-US" 中的 "en"），最后回退到 "en"。
pub fn resolve_locale(requested: &str) -> String {
    let available = rust_i18n::available_locales!();
    let requested = requested.replace('_', "-");

    if let Some(exact) = available.iter().find(|l| l.eq_ignore_ascii_case(&requested)) {
        return exact.to_string();
    }
    let language = requested.split('-').next().unwrap_or_default();
    available
        .iter()
        .find(|l| l.eq_ignore_ascii_case(language) || l.split('-').next() == Some(language))
        .map(|l| l.to_string())
        .unwrap_or_else(|| "en".to_string())
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");

#[cfg(test)]
mod tests {
    use super::resolve_locale;

    #[test]
    fn resolves_exact_partial_and_unknown_locales() {
        assert_eq!(resolve_locale("zh-CN"), "zh-CN");
        assert_eq!(resolve_locale("en_US"), "en");
        assert_eq!(resolve_locale("zh"), "zh-CN");
        assert_eq!(resolve_locale("fr-FR"), "en");
    }
}
