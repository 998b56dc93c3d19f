//! # xcmatrix Library / xcmatrix 库
//!
//! Generates and runs Xcode test invocations (xctool, xcodebuild and
//! xcodebuild piped through xcpretty) from a declarative task file, and
//! aggregates their outcomes into one pass/fail report.
//!
//! 根据声明式任务文件生成并运行 Xcode 测试调用（xctool、xcodebuild 以及经由
//! xcpretty 管道的 xcodebuild），并将结果汇总为一份通过/失败报告。
//!
//! ## Modules / 模块
//!
//! - `core` - Configuration, destinations, command rendering and the result report
//! - `infra` - Shell execution, file system preparation and scheme editing
//! - `reporting` - Console and HTML output of the final report
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 配置、目标、命令渲染和结果报告
//! - `infra` - Shell 执行、文件系统准备和 scheme 编辑
//! - `reporting` - 最终报告的控制台和 HTML 输出
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use self::core::config;
pub use self::core::report;
pub use infra::t;

/// Picks the closest available locale for `requested`: the full locale
/// (e.g. "zh-CN"), then its language part (e.g. "en" from "en-US"), then "en".
///
/// 为 `requested` 选择最接近的可用语言：先完整匹配（如 "zh-CN"），
/// 再匹配语言部分（如 "en-US" 中的 "en"），最后回退到 "en"。
pub fn resolve_locale(requested: &str) -> String {
    let available_locales = rust_i18n::available_locales!();

    if available_locales.iter().any(|l| *l == requested) {
        return requested.to_string();
    }
    requested
        .split(['-', '_'])
        .next()
        .filter(|lang_code| available_locales.iter().any(|l| l == lang_code))
        .unwrap_or("en")
        .to_string()
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
