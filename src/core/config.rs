//! # Configuration Module / 配置模块
//!
//! The settings container shared by a task and all of its subtasks.
//! A subtask never mutates the base configuration: it calls
//! [`Configuration::derive`] and receives an independent copy with its
//! overrides applied.
//!
//! 任务及其所有子任务共享的设置容器。
//! 子任务从不修改基础配置：它调用 [`Configuration::derive`]，
//! 获得一个应用了覆盖项的独立副本。

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};

use crate::core::destination::{Destination, DestinationSpec};
use crate::core::error::{ConfigError, ConfigResult};

pub const DEFAULT_XCTOOL_PATH: &str = "/usr/local/bin/xctool";
pub const DEFAULT_XCODEBUILD_PATH: &str = "/usr/bin/xcodebuild";
pub const DEFAULT_ACTIONS: [&str; 3] = ["clean", "build", "test"];

/// The SDK a scheme is built against, in canonical lowercase form.
/// 构建 scheme 所用的 SDK，使用规范的小写形式。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Sdk {
    #[default]
    IphoneSimulator,
    IphoneOs,
    MacOsx,
    Other(String),
}

impl Sdk {
    pub fn as_str(&self) -> &str {
        match self {
            Sdk::IphoneSimulator => "iphonesimulator",
            Sdk::IphoneOs => "iphoneos",
            Sdk::MacOsx => "macosx",
            Sdk::Other(name) => name,
        }
    }

    pub fn is_simulator(&self) -> bool {
        matches!(self, Sdk::IphoneSimulator)
    }

    pub fn is_desktop(&self) -> bool {
        matches!(self, Sdk::MacOsx)
    }

    /// Converts a loosely typed TOML value. Only strings are accepted.
    /// 转换松散类型的 TOML 值。只接受字符串。
    pub fn from_value(value: &toml::Value) -> ConfigResult<Self> {
        match value {
            toml::Value::String(s) => s.parse(),
            other => Err(ConfigError::invalid_argument(format!(
                "can only assign sdk from a string, got {}",
                other.type_str()
            ))),
        }
    }
}

impl FromStr for Sdk {
    type Err = ConfigError;

    fn from_str(value: &str) -> ConfigResult<Self> {
        let normalized = value.trim().trim_start_matches(':').to_ascii_lowercase();
        match normalized.as_str() {
            "" => Err(ConfigError::invalid_argument("sdk must not be empty")),
            "iphonesimulator" => Ok(Sdk::IphoneSimulator),
            "iphoneos" => Ok(Sdk::IphoneOs),
            "macosx" => Ok(Sdk::MacOsx),
            _ if normalized.chars().any(char::is_whitespace) => Err(
                ConfigError::invalid_argument(format!("sdk '{value}' must be a single identifier")),
            ),
            _ => Ok(Sdk::Other(normalized)),
        }
    }
}

impl fmt::Display for Sdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three supported runner programs.
/// 三种受支持的运行器程序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunnerKind {
    Xctool,
    Xcodebuild,
    Xcpretty,
}

impl RunnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RunnerKind::Xctool => "xctool",
            RunnerKind::Xcodebuild => "xcodebuild",
            RunnerKind::Xcpretty => "xcpretty",
        }
    }
}

/// A runner selection, parsed once at assignment.
///
/// `extra_flags` holds whatever followed the leading token, so that e.g.
/// `xcpretty -s` or `xctool -reporter pretty` keep their flags.
///
/// 运行器选择，在赋值时解析一次。
/// `extra_flags` 保存首个词之后的内容，例如 `xcpretty -s` 会保留其参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runner {
    pub kind: RunnerKind,
    pub extra_flags: String,
}

impl Runner {
    pub fn new(kind: RunnerKind) -> Self {
        Self {
            kind,
            extra_flags: String::new(),
        }
    }

    pub fn has_extra_flags(&self) -> bool {
        !self.extra_flags.is_empty()
    }
}

impl Default for Runner {
    fn default() -> Self {
        Runner::new(RunnerKind::Xcodebuild)
    }
}

impl FromStr for Runner {
    type Err = ConfigError;

    fn from_str(value: &str) -> ConfigResult<Self> {
        let trimmed = value.trim();
        let (head, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (trimmed, ""),
        };
        let kind = match head.trim_start_matches(':') {
            "xctool" => RunnerKind::Xctool,
            "xcodebuild" => RunnerKind::Xcodebuild,
            "xcpretty" => RunnerKind::Xcpretty,
            _ => {
                return Err(ConfigError::configuration(format!(
                    "runner must be one of xcodebuild, xctool or xcpretty, got '{value}'"
                )));
            }
        };
        Ok(Runner {
            kind,
            extra_flags: rest.to_string(),
        })
    }
}

impl fmt::Display for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_extra_flags() {
            write!(f, "{} {}", self.kind.as_str(), self.extra_flags)
        } else {
            f.write_str(self.kind.as_str())
        }
    }
}

/// The build container passed to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Workspace(PathBuf),
    Project(PathBuf),
}

impl Target {
    pub fn path(&self) -> &Path {
        match self {
            Target::Workspace(p) | Target::Project(p) => p,
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            Target::Workspace(_) => "-workspace",
            Target::Project(_) => "-project",
        }
    }
}

/// Where the runner's stderr goes.
/// 运行器的 stderr 输出去向。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectStderr {
    /// `2> /dev/null`
    Discard,
    Path(PathBuf),
}

impl RedirectStderr {
    /// `true` discards, `false` disables, a string redirects to a path.
    /// `true` 表示丢弃，`false` 表示禁用，字符串表示重定向到路径。
    pub fn from_value(value: &toml::Value) -> ConfigResult<Option<Self>> {
        match value {
            toml::Value::Boolean(true) => Ok(Some(RedirectStderr::Discard)),
            toml::Value::Boolean(false) => Ok(None),
            toml::Value::String(path) if !path.is_empty() => {
                Ok(Some(RedirectStderr::Path(PathBuf::from(path))))
            }
            other => Err(ConfigError::invalid_argument(format!(
                "redirect_stderr must be a boolean or a non-empty path, got {}",
                other.type_str()
            ))),
        }
    }
}

/// An insertion-ordered string map. Re-inserting a key replaces its value
/// in place.
///
/// 保持插入顺序的字符串映射。重新插入已有键会原地替换其值。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValues(Vec<(String, String)>);

impl KeyValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Applies every entry of `other` on top of `self`.
    pub fn merge(&mut self, other: &KeyValues) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = KeyValues::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<'de> Deserialize<'de> for KeyValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyValuesVisitor;

        impl<'de> Visitor<'de> for KeyValuesVisitor {
            type Value = KeyValues;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of string keys to scalar values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<KeyValues, A::Error> {
                let mut map = KeyValues::new();
                while let Some((key, value)) = access.next_entry::<String, toml::Value>()? {
                    let value = match value {
                        toml::Value::String(s) => s,
                        toml::Value::Integer(i) => i.to_string(),
                        toml::Value::Float(f) => f.to_string(),
                        toml::Value::Boolean(b) => (if b { "YES" } else { "NO" }).to_string(),
                        other => {
                            return Err(de::Error::custom(format!(
                                "value for '{key}' must be a scalar, got {}",
                                other.type_str()
                            )));
                        }
                    };
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(KeyValuesVisitor)
    }
}

/// Input accepted by [`Configuration::add_destination`].
/// [`Configuration::add_destination`] 接受的输入。
#[derive(Debug, Clone)]
pub enum DestinationInput {
    /// A pre-escaped specifier, pushed verbatim.
    Raw(String),
    /// Recognized destination keys.
    Fields(Vec<(String, String)>),
    /// An empty structured destination, usually filled in by a callback.
    Default,
}

/// Overrides a subtask (or the top level of a task file) applies on top of
/// an inherited configuration. `None` means "inherit".
///
/// 子任务（或任务文件顶层）在继承配置之上应用的覆盖项。`None` 表示“继承”。
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub workspace: Option<PathBuf>,
    pub project: Option<PathBuf>,
    pub schemes_dir: Option<PathBuf>,
    pub sdk: Option<Sdk>,
    pub runner: Option<Runner>,
    pub xctool_path: Option<PathBuf>,
    pub xcodebuild_path: Option<PathBuf>,
    /// Merged key-wise onto the inherited settings.
    pub settings: KeyValues,
    /// Replaces the inherited destinations.
    pub destinations: Option<Vec<Destination>>,
    /// Replaces the inherited actions.
    pub actions: Option<Vec<String>>,
    pub scheme: Option<String>,
    /// Replaces the inherited iOS versions.
    pub ios_versions: Option<Vec<String>>,
    pub output_log: Option<PathBuf>,
    /// `Some(None)` explicitly disables an inherited redirection.
    pub redirect_stderr: Option<Option<RedirectStderr>>,
    /// Merged key-wise onto the inherited environment.
    pub environment: KeyValues,
}

/// Build and test settings for one runnable unit.
/// 单个可运行单元的构建与测试设置。
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub workspace: Option<PathBuf>,
    pub project: Option<PathBuf>,
    pub schemes_dir: Option<PathBuf>,
    pub sdk: Sdk,
    runner: Runner,
    pub xctool_path: PathBuf,
    pub xcodebuild_path: PathBuf,
    pub settings: KeyValues,
    pub destinations: Vec<Destination>,
    pub actions: Vec<String>,
    pub scheme: Option<String>,
    pub ios_versions: Vec<String>,
    pub output_log: Option<PathBuf>,
    pub redirect_stderr: Option<RedirectStderr>,
    pub environment: KeyValues,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            workspace: None,
            project: None,
            schemes_dir: None,
            sdk: Sdk::default(),
            runner: Runner::default(),
            xctool_path: PathBuf::from(DEFAULT_XCTOOL_PATH),
            xcodebuild_path: PathBuf::from(DEFAULT_XCODEBUILD_PATH),
            settings: KeyValues::new(),
            destinations: Vec::new(),
            actions: DEFAULT_ACTIONS.iter().map(|a| a.to_string()).collect(),
            scheme: None,
            ios_versions: Vec::new(),
            output_log: None,
            redirect_stderr: None,
            environment: KeyValues::new(),
        }
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Validates and stores a runner string such as `xcpretty -s`.
    /// Fails immediately on an unknown runner.
    ///
    /// 校验并保存运行器字符串（如 `xcpretty -s`）。未知运行器会立即失败。
    pub fn set_runner(&mut self, runner: &str) -> ConfigResult<()> {
        self.runner = runner.parse()?;
        Ok(())
    }

    pub fn set_sdk(&mut self, sdk: &str) -> ConfigResult<()> {
        self.sdk = sdk.parse()?;
        Ok(())
    }

    pub fn set_workspace(&mut self, path: impl Into<PathBuf>) {
        self.workspace = Some(path.into());
        self.project = None;
    }

    pub fn set_project(&mut self, path: impl Into<PathBuf>) {
        self.project = Some(path.into());
        self.workspace = None;
    }

    /// The resolved workspace or project, if exactly one is configured.
    pub fn target(&self) -> Option<Target> {
        match (&self.workspace, &self.project) {
            (Some(w), None) => Some(Target::Workspace(w.clone())),
            (None, Some(p)) => Some(Target::Project(p.clone())),
            _ => None,
        }
    }

    pub fn is_versioned(&self) -> bool {
        !self.ios_versions.is_empty()
    }

    /// Appends a destination. A raw specifier cannot be combined with a
    /// customization callback.
    ///
    /// 追加一个目标。原始字符串不能与自定义回调同时使用。
    pub fn add_destination<F>(&mut self, input: DestinationInput, customize: Option<F>) -> ConfigResult<()>
    where
        F: FnOnce(&mut DestinationSpec) -> ConfigResult<()>,
    {
        let destination = match input {
            DestinationInput::Raw(raw) => {
                if customize.is_some() {
                    return Err(ConfigError::invalid_argument(
                        "a raw destination string cannot be combined with a customization block",
                    ));
                }
                Destination::Raw(raw)
            }
            DestinationInput::Fields(pairs) => {
                let mut spec = DestinationSpec::from_pairs(pairs)?;
                if let Some(customize) = customize {
                    customize(&mut spec)?;
                }
                Destination::Structured(spec)
            }
            DestinationInput::Default => {
                let mut spec = DestinationSpec::new();
                if let Some(customize) = customize {
                    customize(&mut spec)?;
                }
                Destination::Structured(spec)
            }
        };
        self.destinations.push(destination);
        Ok(())
    }

    pub fn push_raw_destination(&mut self, raw: impl Into<String>) {
        self.destinations.push(Destination::Raw(raw.into()));
    }

    pub fn destination<F>(&mut self, customize: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut DestinationSpec) -> ConfigResult<()>,
    {
        self.add_destination(DestinationInput::Default, Some(customize))
    }

    /// Returns a new configuration with `overrides` applied. `self` is left
    /// untouched; every container of the result is an independent copy.
    ///
    /// 返回应用了 `overrides` 的新配置。`self` 保持不变；
    /// 结果中的每个容器都是独立的副本。
    pub fn derive(&self, overrides: &Overrides) -> ConfigResult<Configuration> {
        if overrides.workspace.is_some() && overrides.project.is_some() {
            return Err(ConfigError::configuration(
                "workspace and project are mutually exclusive",
            ));
        }

        let mut derived = self.clone();

        if let Some(workspace) = &overrides.workspace {
            derived.set_workspace(workspace.clone());
        }
        if let Some(project) = &overrides.project {
            derived.set_project(project.clone());
        }
        if let Some(dir) = &overrides.schemes_dir {
            derived.schemes_dir = Some(dir.clone());
        }
        if let Some(sdk) = &overrides.sdk {
            derived.sdk = sdk.clone();
        }
        if let Some(runner) = &overrides.runner {
            derived.runner = runner.clone();
        }
        if let Some(path) = &overrides.xctool_path {
            derived.xctool_path = path.clone();
        }
        if let Some(path) = &overrides.xcodebuild_path {
            derived.xcodebuild_path = path.clone();
        }
        derived.settings.merge(&overrides.settings);
        if let Some(destinations) = &overrides.destinations {
            derived.destinations = destinations.clone();
        }
        if let Some(actions) = &overrides.actions {
            derived.actions = actions.clone();
        }
        if let Some(scheme) = &overrides.scheme {
            derived.scheme = Some(scheme.clone());
        }
        if let Some(versions) = &overrides.ios_versions {
            derived.ios_versions = versions.clone();
        }
        if let Some(log) = &overrides.output_log {
            derived.output_log = Some(log.clone());
        }
        if let Some(redirect) = &overrides.redirect_stderr {
            derived.redirect_stderr = redirect.clone();
        }
        derived.environment.merge(&overrides.environment);

        Ok(derived)
    }

    /// Checks the workspace/project exclusivity alone.
    pub fn validate_target(&self) -> ConfigResult<()> {
        match (&self.workspace, &self.project) {
            (Some(_), Some(_)) => Err(ConfigError::configuration(
                "workspace and project are mutually exclusive",
            )),
            (None, None) => Err(ConfigError::configuration(
                "a workspace or a project must be configured",
            )),
            _ => Ok(()),
        }
    }

    /// Validates a configuration before it is turned into commands.
    /// 在配置转换为命令之前进行校验。
    pub fn validate(&self) -> ConfigResult<()> {
        self.validate_target()?;

        match &self.scheme {
            Some(scheme) if !scheme.trim().is_empty() => {}
            _ => return Err(ConfigError::configuration("a scheme must be configured")),
        }

        if self.sdk.is_desktop() && self.is_versioned() {
            return Err(ConfigError::configuration(format!(
                "cannot specify iOS versions with an SDK of {}",
                self.sdk
            )));
        }

        Ok(())
    }
}
