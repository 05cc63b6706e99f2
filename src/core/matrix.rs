//! # Matrix Expander Module / 矩阵展开模块
//!
//! Turns the declared variant list into validated [`Variant`]s. The matrix is
//! a literal enumeration: the output is the input, in the same order, and no
//! missing combinations are ever inferred.
//!
//! 将声明的变体列表转换为经过校验的 [`Variant`]。矩阵是字面枚举：
//! 输出即输入，顺序不变，从不推断缺失的组合。

use crate::core::config::MatrixConfig;
use crate::core::error::ConfigError;
use crate::core::models::{DbBackend, Variant};
use crate::infra::probe::RuntimeProbe;

/// Validates every declared variant and returns them in declaration order.
///
/// # Errors
/// Returns a [`ConfigError`] for an empty matrix, an unknown backend, a value
/// outside a restricted axis, or a runtime whose interpreter the probe cannot find.
///
/// 校验每个声明的变体并按声明顺序返回。
pub fn expand<P: RuntimeProbe>(config: &MatrixConfig, probe: &P) -> Result<Vec<Variant>, ConfigError> {
    if config.variants.is_empty() {
        return Err(ConfigError::EmptyMatrix);
    }

    let mut variants = Vec::with_capacity(config.variants.len());
    for (i, spec) in config.variants.iter().enumerate() {
        let index = i + 1;

        let backend: DbBackend = spec
            .db_backend
            .parse()
            .map_err(|value| ConfigError::UnsupportedBackend { index, value })?;

        let axes = &config.axes;
        if !axes.runtime.is_empty() && !axes.runtime.contains(&spec.runtime_version) {
            return Err(ConfigError::RuntimeNotInAxis {
                index,
                value: spec.runtime_version.clone(),
                allowed: axes.runtime.clone(),
            });
        }
        if !axes.framework.is_empty() && !axes.framework.contains(&spec.framework_version) {
            return Err(ConfigError::FrameworkNotInAxis {
                index,
                value: spec.framework_version.clone(),
                allowed: axes.framework.clone(),
            });
        }

        if config.runtime.check_installed {
            let interpreter = config.runtime.interpreter_for(&spec.runtime_version);
            if !probe.is_available(&interpreter) {
                return Err(ConfigError::RuntimeNotInstallable {
                    index,
                    version: spec.runtime_version.clone(),
                    interpreter,
                });
            }
        }

        let mut variant = Variant::new(
            index,
            spec.runtime_version.clone(),
            spec.framework_version.clone(),
            backend,
        );
        if let Some(name) = &spec.name {
            variant = variant.with_name(name.clone());
        }
        variants.push(variant);
    }

    Ok(variants)
}

/// Narrows the matrix to the variants named by `filters` (labels or 1-based
/// indices), keeping declaration order. An empty filter list keeps everything.
///
/// 将矩阵缩小到 `filters` 指定的变体（标签或从 1 开始的索引），保持声明顺序。
/// 空的过滤列表保留全部变体。
pub fn select(variants: Vec<Variant>, filters: &[String]) -> Result<Vec<Variant>, ConfigError> {
    if filters.is_empty() {
        return Ok(variants);
    }

    let matches = |variant: &Variant, filter: &str| {
        variant.label() == filter
            || filter
                .parse::<usize>()
                .is_ok_and(|index| index == variant.index())
    };

    if let Some(unmatched) = filters
        .iter()
        .find(|f| !variants.iter().any(|v| matches(v, f)))
    {
        return Err(ConfigError::UnmatchedSelection(unmatched.clone()));
    }

    Ok(variants
        .into_iter()
        .filter(|v| filters.iter().any(|f| matches(v, f)))
        .collect())
}
