//! # Core Module / 核心模块
//!
//! Configuration inheritance, destination handling, command rendering,
//! result aggregation and the task orchestration built on top of them.
//!
//! 配置继承、目标处理、命令渲染、结果汇总，以及构建于其上的任务编排。

pub mod command;
pub mod config;
pub mod destination;
pub mod error;
pub mod report;
pub mod subtask;
pub mod task;

// Re-exports
pub use command::build_command;
pub use config::{Configuration, Overrides, Runner, RunnerKind, Sdk};
pub use destination::{Destination, DestinationSpec, Platform};
pub use error::{ConfigError, ConfigResult};
pub use report::{OptionSet, ReportLine, TestReport};
pub use subtask::Subtask;
pub use task::{Selection, TestTask};
