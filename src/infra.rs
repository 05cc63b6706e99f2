//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Variant Matrix,
//! including subprocess execution, runtime probing, and i18n support.
//!
//! 此模块为 Variant Matrix 提供基础设施服务，
//! 包括子进程执行、运行时探测和国际化支持。

pub mod command;
pub mod probe;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
