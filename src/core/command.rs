//! # Command Builder Module / 命令构建模块
//!
//! Renders a validated [`Configuration`] into the exact shell command for
//! one runner invocation. Rendering is pure: the same configuration and iOS
//! version always yield the same string.
//!
//! 将已校验的 [`Configuration`] 渲染为单次运行器调用的精确 shell 命令。
//! 渲染是纯函数：相同的配置和 iOS 版本总是产生相同的字符串。

use std::borrow::Cow;
use std::path::Path;

use crate::core::config::{Configuration, RedirectStderr, RunnerKind};

/// Best-effort command issued before every simulator run.
pub const KILL_SIMULATOR_COMMAND: &str = r#"killall "iPhone Simulator""#;

/// Wrapper invocation used when the runner is plain `xcpretty`.
pub const DEFAULT_XCPRETTY: &str = "xcpretty -c";

/// Keeps the build's exit status instead of the formatter's.
const PIPESTATUS_SUFFIX: &str = "; exit ${PIPESTATUS[0]}";

/// Builds the command for one expansion of a configuration.
///
/// The token order is: executable, target, scheme, sdk, destinations,
/// actions, settings, then the tee/wrapper pipeline and stderr redirection.
/// `ios_version` is appended to the SDK with no separator.
///
/// 为配置的一次展开构建命令。
/// 顺序为：可执行文件、target、scheme、sdk、destinations、actions、settings，
/// 然后是 tee/格式化管道以及 stderr 重定向。`ios_version` 直接拼接在 SDK 之后。
///
/// # Example
/// ```
/// use xcmatrix::core::config::Configuration;
/// use xcmatrix::core::command::build_command;
///
/// let mut config = Configuration::new();
/// config.set_workspace("W");
/// config.xcodebuild_path = "xcodebuild".into();
/// config.scheme = Some("S".to_string());
/// assert_eq!(
///     build_command(&config, None),
///     "xcodebuild -workspace W -scheme 'S' -sdk iphonesimulator clean build test"
/// );
/// ```
pub fn build_command(config: &Configuration, ios_version: Option<&str>) -> String {
    let runner = config.runner();
    let mut parts: Vec<String> = Vec::new();

    parts.push(executable(config));

    if let Some(target) = config.target() {
        parts.push(format!("{} {}", target.flag(), quote_path(target.path())));
    }

    parts.push(format!("-scheme '{}'", config.scheme.as_deref().unwrap_or_default()));
    parts.push(format!("-sdk {}{}", config.sdk, ios_version.unwrap_or_default()));

    parts.push(
        config
            .destinations
            .iter()
            .map(|d| format!("-destination {}", d.to_argument()))
            .collect::<Vec<_>>()
            .join(" "),
    );

    parts.push(config.actions.join(" "));
    if runner.kind == RunnerKind::Xctool && ios_version.is_some() {
        parts.push("-freshSimulator".to_string());
    }

    parts.push(
        config
            .settings
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" "),
    );

    if let Some(log) = &config.output_log {
        parts.push(format!("| tee -a {}", quote_path(log)));
    }

    if runner.kind == RunnerKind::Xcpretty {
        let wrapper = if runner.has_extra_flags() {
            runner.to_string()
        } else {
            DEFAULT_XCPRETTY.to_string()
        };
        parts.push(format!("| {wrapper} {PIPESTATUS_SUFFIX}"));
    }

    match &config.redirect_stderr {
        Some(RedirectStderr::Discard) => parts.push("2> /dev/null".to_string()),
        Some(RedirectStderr::Path(path)) => parts.push(format!("2> {}", quote_path(path))),
        None => {}
    }

    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// The executable (plus any flags) that starts the command.
fn executable(config: &Configuration) -> String {
    let runner = config.runner();
    match runner.kind {
        // Custom xctool/xcodebuild strings are used as-is.
        RunnerKind::Xctool | RunnerKind::Xcodebuild if runner.has_extra_flags() => runner.to_string(),
        RunnerKind::Xctool => quote_path(&config.xctool_path),
        RunnerKind::Xcodebuild | RunnerKind::Xcpretty => quote_path(&config.xcodebuild_path),
    }
}

/// Shell-quotes a path; paths without special characters stay as they are.
/// 对路径进行 shell 引用；不含特殊字符的路径保持不变。
fn quote_path(path: &Path) -> String {
    let raw = path.display().to_string();
    // Only a NUL byte makes quoting fail, and no file system path holds one.
    let quoted = shlex::try_quote(&raw).map(Cow::into_owned).ok();
    quoted.unwrap_or(raw)
}
