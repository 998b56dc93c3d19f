//! # Infrastructure Module / 基础设施模块
//!
//! Shell execution, file system preparation and scheme editing.
//!
//! Shell 执行、文件系统准备以及 scheme 编辑。

pub mod fs;
pub mod scheme;
pub mod shell;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
