//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Variant Matrix:
//! configuration, the variant data model, matrix expansion, and the
//! provision → bootstrap → run pipeline driven by the orchestrator.
//!
//! 此模块包含 Variant Matrix 的核心功能：
//! 配置、变体数据模型、矩阵展开，以及由编排器驱动的配置 → 引导 → 运行流水线。

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod matrix;
pub mod models;
pub mod orchestrator;
pub mod provision;
pub mod runner;

// Re-exports
pub use config::MatrixConfig;
pub use models::{MatrixReport, Variant};
pub use orchestrator::Orchestrator;
