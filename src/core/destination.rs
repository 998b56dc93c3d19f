//! # Destination Module / 目标设备模块
//!
//! Device/platform specifiers passed to the runner through `-destination`.
//! A destination is either a raw string that the caller already escaped for
//! the shell, or a structured record that is serialized in a fixed key order.
//!
//! 通过 `-destination` 传递给运行器的设备/平台描述。
//! 目标要么是调用方已为 shell 转义的原始字符串，
//! 要么是按固定键顺序序列化的结构化记录。

use std::fmt;
use std::str::FromStr;

use crate::core::error::{ConfigError, ConfigResult};

/// The closed set of destination platforms.
/// 目标平台的封闭集合。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Desktop (`osx` / "OS X")
    OsX,
    /// Physical device (`ios` / "iOS")
    Ios,
    /// Simulator (`iossimulator` / "iOS Simulator")
    IosSimulator,
}

impl Platform {
    const ALL: [Platform; 3] = [Platform::OsX, Platform::Ios, Platform::IosSimulator];

    /// The canonical display string stored in the destination.
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::OsX => "OS X",
            Platform::Ios => "iOS",
            Platform::IosSimulator => "iOS Simulator",
        }
    }

    /// The symbolic name accepted on input.
    pub fn symbol(self) -> &'static str {
        match self {
            Platform::OsX => "osx",
            Platform::Ios => "ios",
            Platform::IosSimulator => "iossimulator",
        }
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    /// Accepts either the symbolic form or the exact display string.
    /// 接受符号形式或精确的显示字符串。
    fn from_str(value: &str) -> ConfigResult<Self> {
        Platform::ALL
            .into_iter()
            .find(|p| p.symbol() == value || p.display_name() == value)
            .ok_or_else(|| {
                ConfigError::invalid_argument(format!(
                    "invalid destination platform '{value}', expected one of osx, ios, iossimulator, 'OS X', 'iOS', 'iOS Simulator'"
                ))
            })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A structured destination. Every field is optional.
/// 结构化的目标。所有字段都是可选的。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationSpec {
    pub platform: Option<Platform>,
    pub name: Option<String>,
    pub arch: Option<String>,
    pub id: Option<String>,
    pub os: Option<String>,
}

impl DestinationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a destination from `key = value` pairs.
    /// Unknown keys are rejected.
    ///
    /// 从 `key = value` 键值对构建目标。未知的键会被拒绝。
    pub fn from_pairs<I, K, V>(pairs: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut spec = Self::default();
        for (key, value) in pairs {
            spec.set(key.as_ref(), value)?;
        }
        Ok(spec)
    }

    /// Assigns one recognized key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> ConfigResult<()> {
        let value = value.into();
        match key.to_ascii_lowercase().as_str() {
            "platform" => self.set_platform(&value)?,
            "name" => self.name = Some(value),
            "arch" | "architecture" => self.arch = Some(value),
            "id" | "device-id" | "device_id" => self.id = Some(value),
            "os" | "os-version" | "os_version" | "osversion" => self.os = Some(value),
            other => {
                return Err(ConfigError::invalid_argument(format!(
                    "malformed destination specifier: unknown key '{other}'"
                )));
            }
        }
        Ok(())
    }

    pub fn set_platform(&mut self, value: &str) -> ConfigResult<()> {
        self.platform = Some(value.parse()?);
        Ok(())
    }

    pub fn platform(mut self, value: &str) -> ConfigResult<Self> {
        self.set_platform(value)?;
        Ok(self)
    }

    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = Some(value.into());
        self
    }

    pub fn arch(mut self, value: impl Into<String>) -> Self {
        self.arch = Some(value.into());
        self
    }

    pub fn id(mut self, value: impl Into<String>) -> Self {
        self.id = Some(value.into());
        self
    }

    pub fn os(mut self, value: impl Into<String>) -> Self {
        self.os = Some(value.into());
        self
    }

    /// Serializes as `key='value'` pairs joined by commas, in the order
    /// platform, name, arch, id, OS. Unset keys are omitted.
    ///
    /// 序列化为以逗号连接的 `key='value'` 对，顺序为 platform、name、arch、id、OS。
    /// 未设置的键会被省略。
    pub fn to_argument(&self) -> String {
        let fields = [
            ("platform", self.platform.map(Platform::display_name)),
            ("name", self.name.as_deref()),
            ("arch", self.arch.as_deref()),
            ("id", self.id.as_deref()),
            ("OS", self.os.as_deref()),
        ];

        fields
            .iter()
            .filter_map(|(key, value)| value.map(|v| format!("{key}='{v}'")))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// A configured destination.
/// 已配置的目标。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Emitted verbatim; the caller is responsible for shell escaping.
    /// 原样输出；调用方负责 shell 转义。
    Raw(String),
    Structured(DestinationSpec),
}

impl Destination {
    /// Shell-quotes an unescaped specifier such as
    /// `platform=iOS Simulator,OS=7.1,name=iPhone Retina (4-inch)`.
    pub fn quoted(specifier: &str) -> ConfigResult<Self> {
        let quoted = shlex::try_quote(specifier).map_err(|e| {
            ConfigError::invalid_argument(format!("malformed destination specifier: {e}"))
        })?;
        Ok(Destination::Raw(quoted.into_owned()))
    }

    pub fn to_argument(&self) -> String {
        match self {
            Destination::Raw(raw) => raw.clone(),
            Destination::Structured(spec) => spec.to_argument(),
        }
    }
}

impl From<DestinationSpec> for Destination {
    fn from(spec: DestinationSpec) -> Self {
        Destination::Structured(spec)
    }
}
