//! # Configuration Errors / 配置错误
//!
//! Typed errors raised while a task is being configured or validated.
//! They are always fatal and surface before any command runs.
//!
//! 在配置或校验任务时抛出的类型化错误。
//! 它们总是致命的，并在任何命令运行之前出现。

use thiserror::Error;

/// Errors produced while building or validating a configuration.
/// 构建或校验配置时产生的错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration as a whole is inconsistent or incomplete
    /// (invalid runner, missing target, SDK/version conflict, missing scheme).
    /// 配置整体不一致或不完整。
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A single value could not be assigned (wrong type, unknown platform,
    /// malformed destination).
    /// 单个值无法赋值（类型错误、未知平台、格式错误的目标）。
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ConfigError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
