//! # Test Task Module / 测试任务模块
//!
//! A `TestTask` holds the base configuration and the ordered list of
//! subtasks. It is built from a TOML task file (or programmatically),
//! validated up front, and run strictly in order: pre-flight checks, the
//! prepare step, then every selected subtask.
//!
//! `TestTask` 持有基础配置和有序的子任务列表。它从 TOML 任务文件（或以编程方式）
//! 构建，预先校验，并严格按顺序运行：预检、准备步骤，然后是每个选中的子任务。
//!
//! ## Task file / 任务文件
//!
//! ```toml
//! name = "test"
//! workspace = "LayerKit.xcworkspace"
//! schemes_dir = "Tests/Schemes"
//! runner = "xctool"
//!
//! [[subtasks]]
//! name = "unit"
//! scheme = "Unit Tests"
//! ios_versions = ["7.0", "7.1"]
//!
//! [[subtasks]]
//! name = "functional"
//! scheme = "Functional Tests"
//! runner = "xcodebuild"
//! destinations = [
//!     { platform = "iossimulator", name = "iPad Retina", os = "latest" },
//!     "platform=iOS Simulator,OS=7.1,name=iPhone Retina (4-inch)",
//! ]
//! ```

use anyhow::{Context, Result};
use colored::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::{Configuration, KeyValues, Overrides, RedirectStderr, Runner, Sdk};
use crate::core::destination::{Destination, DestinationSpec};
use crate::core::error::{ConfigError, ConfigResult};
use crate::core::report::TestReport;
use crate::core::subtask::Subtask;
use crate::infra::{fs as xfs, shell::ShellRunner, t};

pub const DEFAULT_TASK_NAME: &str = "test";
pub const DEFAULT_CONFIG_FILE: &str = "XcTasks.toml";

/// Configuration keys as they appear in a task file, shared by the top
/// level and every `[[subtasks]]` table.
///
/// 任务文件中出现的配置键，由顶层和每个 `[[subtasks]]` 表共享。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFields {
    pub workspace: Option<String>,
    pub project: Option<String>,
    pub schemes_dir: Option<String>,
    pub sdk: Option<toml::Value>,
    pub runner: Option<String>,
    pub xctool_path: Option<String>,
    pub xcodebuild_path: Option<String>,
    pub settings: KeyValues,
    pub destinations: Option<Vec<toml::Value>>,
    pub actions: Option<Vec<String>>,
    pub scheme: Option<String>,
    pub ios_versions: Option<Vec<String>>,
    pub output_log: Option<String>,
    pub redirect_stderr: Option<toml::Value>,
    pub environment: KeyValues,
}

#[derive(Debug, Deserialize)]
pub struct SubtaskFields {
    pub name: String,
    #[serde(flatten)]
    pub fields: ConfigFields,
}

/// The raw task file.
#[derive(Debug, Deserialize)]
pub struct TaskFile {
    #[serde(default)]
    pub name: Option<String>,
    /// The language for console messages (e.g. "en", "zh-CN").
    /// 控制台消息的语言（例如 "en"、"zh-CN"）。
    #[serde(default)]
    pub language: Option<String>,
    #[serde(flatten)]
    pub base: ConfigFields,
    #[serde(default)]
    pub subtasks: Vec<SubtaskFields>,
}

impl TryFrom<ConfigFields> for Overrides {
    type Error = ConfigError;

    fn try_from(fields: ConfigFields) -> ConfigResult<Self> {
        if fields.workspace.is_some() && fields.project.is_some() {
            return Err(ConfigError::configuration(
                "workspace and project are mutually exclusive",
            ));
        }

        let path = |value: &Option<String>| -> ConfigResult<Option<PathBuf>> {
            value.as_deref().map(xfs::expand_path).transpose()
        };

        let destinations = fields
            .destinations
            .as_ref()
            .map(|values| values.iter().map(destination_from_value).collect::<ConfigResult<Vec<_>>>())
            .transpose()?;

        Ok(Overrides {
            workspace: path(&fields.workspace)?,
            project: path(&fields.project)?,
            schemes_dir: path(&fields.schemes_dir)?,
            sdk: fields.sdk.as_ref().map(Sdk::from_value).transpose()?,
            runner: fields.runner.as_deref().map(str::parse::<Runner>).transpose()?,
            xctool_path: path(&fields.xctool_path)?,
            xcodebuild_path: path(&fields.xcodebuild_path)?,
            settings: fields.settings,
            destinations,
            actions: fields.actions,
            scheme: fields.scheme,
            ios_versions: fields.ios_versions,
            output_log: path(&fields.output_log)?,
            redirect_stderr: fields
                .redirect_stderr
                .as_ref()
                .map(RedirectStderr::from_value)
                .transpose()?,
            environment: fields.environment,
        })
    }
}

/// A string destination is shell-quoted; a table is parsed key by key.
/// 字符串目标会被 shell 引用；表会逐键解析。
fn destination_from_value(value: &toml::Value) -> ConfigResult<Destination> {
    match value {
        toml::Value::String(raw) => Destination::quoted(raw),
        toml::Value::Table(table) => {
            let pairs = table
                .iter()
                .map(|(key, value)| match value {
                    toml::Value::String(s) => Ok((key.clone(), s.clone())),
                    other => Err(ConfigError::invalid_argument(format!(
                        "malformed destination specifier: '{key}' must be a string, got {}",
                        other.type_str()
                    ))),
                })
                .collect::<ConfigResult<Vec<_>>>()?;
            Ok(Destination::Structured(DestinationSpec::from_pairs(pairs)?))
        }
        other => Err(ConfigError::invalid_argument(format!(
            "malformed destination specifier: expected a string or a table, got {}",
            other.type_str()
        ))),
    }
}

/// A subtask, or a single iOS version of one, picked from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub subtask: String,
    pub ios_version: Option<String>,
}

#[derive(Debug)]
pub struct TestTask {
    name: String,
    language: Option<String>,
    base: Configuration,
    subtasks: Vec<Subtask>,
}

impl TestTask {
    /// Validates the base target and derives every subtask.
    /// 校验基础 target 并派生每个子任务。
    pub fn new(
        name: impl Into<String>,
        base: Configuration,
        subtasks: Vec<(String, Overrides)>,
    ) -> ConfigResult<Self> {
        base.validate_target()?;
        if subtasks.is_empty() {
            return Err(ConfigError::configuration(
                "at least one subtask must be configured",
            ));
        }

        let mut seen = HashSet::new();
        let mut built = Vec::with_capacity(subtasks.len());
        for (subtask_name, overrides) in subtasks {
            if !seen.insert(subtask_name.clone()) {
                return Err(ConfigError::configuration(format!(
                    "subtask '{subtask_name}' is defined more than once"
                )));
            }
            built.push(Subtask::new(subtask_name, &base, &overrides)?);
        }

        Ok(Self {
            name: name.into(),
            language: None,
            base,
            subtasks: built,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TaskFile = toml::from_str(content).context(t!("config.parse_failed").to_string())?;
        Ok(Self::from_task_file(file)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
        Self::from_toml_str(&content)
    }

    pub fn from_task_file(file: TaskFile) -> ConfigResult<Self> {
        let base_overrides = Overrides::try_from(file.base)?;
        let base = Configuration::new().derive(&base_overrides)?;

        let subtasks = file
            .subtasks
            .into_iter()
            .map(|s| Ok((s.name, Overrides::try_from(s.fields)?)))
            .collect::<ConfigResult<Vec<_>>>()?;

        let mut task = TestTask::new(
            file.name.unwrap_or_else(|| DEFAULT_TASK_NAME.to_string()),
            base,
            subtasks,
        )?;
        task.language = file.language;
        Ok(task)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn base(&self) -> &Configuration {
        &self.base
    }

    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    pub fn subtask(&self, name: &str) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.name() == name)
    }

    /// Task names in `task:subtask[:version]` form, in run order.
    /// 以 `task:subtask[:version]` 形式列出的任务名，按运行顺序排列。
    pub fn task_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for subtask in &self.subtasks {
            names.push(format!("{}:{}", self.name, subtask.name()));
            for version in &subtask.config().ios_versions {
                names.push(format!("{}:{}:{}", self.name, subtask.name(), version));
            }
        }
        names
    }

    /// Resolves `subtask` or `subtask:version` selectors (optionally prefixed
    /// with the task name). An empty list selects every subtask.
    ///
    /// The result follows the configured subtask and version order and lists
    /// each run once: a whole-subtask selector absorbs that subtask's versions.
    ///
    /// 解析 `subtask` 或 `subtask:version` 选择器（可带任务名前缀）。
    /// 空列表表示选择所有子任务。结果按配置顺序排列且不重复。
    pub fn select(&self, selectors: &[String]) -> ConfigResult<Vec<Selection>> {
        let prefix = format!("{}:", self.name);
        let mut whole = HashSet::new();
        let mut versioned: HashSet<(&str, &str)> = HashSet::new();

        for selector in selectors {
            let stripped = selector.strip_prefix(&prefix).unwrap_or(selector);
            let (name, version) = match stripped.split_once(':') {
                Some((name, version)) => (name, Some(version)),
                None => (stripped, None),
            };

            let subtask = self.subtask(name).ok_or_else(|| {
                ConfigError::configuration(format!("unknown subtask '{selector}'"))
            })?;
            match version {
                Some(version) if !subtask.config().ios_versions.iter().any(|v| v == version) => {
                    return Err(ConfigError::configuration(format!(
                        "subtask '{name}' has no iOS version '{version}'"
                    )));
                }
                Some(version) => {
                    versioned.insert((subtask.name(), version));
                }
                None => {
                    whole.insert(subtask.name());
                }
            }
        }

        let mut selection = Vec::new();
        for subtask in &self.subtasks {
            let name = subtask.name();
            if selectors.is_empty() || whole.contains(name) {
                selection.push(Selection {
                    subtask: name.to_string(),
                    ios_version: None,
                });
                continue;
            }
            for version in &subtask.config().ios_versions {
                if versioned.contains(&(name, version.as_str())) {
                    selection.push(Selection {
                        subtask: name.to_string(),
                        ios_version: Some(version.clone()),
                    });
                }
            }
        }
        Ok(selection)
    }

    /// Checks that every selected subtask's workspace/project and schemes
    /// directory exist.
    pub fn preflight(&self, selection: &[Selection]) -> Result<()> {
        for subtask in self.selected(selection) {
            let config = subtask.config();
            if let Some(target) = config.target() {
                xfs::preflight(&target, config.schemes_dir.as_deref())?;
            }
        }
        Ok(())
    }

    /// Installs shared schemes, truncates output logs and injects
    /// environment variables, once per distinct target/log.
    ///
    /// 安装共享 scheme、截断输出日志并注入环境变量，每个不同的 target/日志只处理一次。
    pub fn prepare(&self, selection: &[Selection]) -> Result<()> {
        let mut installed = HashSet::new();
        let mut truncated = HashSet::new();

        for subtask in self.selected(selection) {
            let config = subtask.config();

            if let (Some(dir), Some(target)) = (&config.schemes_dir, config.target()) {
                if installed.insert((dir.clone(), target.path().to_path_buf())) {
                    let copied = xfs::install_schemes(dir, &target)?;
                    println!(
                        "{}",
                        t!(
                            "prepare.installed_schemes",
                            count = copied.len(),
                            path = xfs::shared_schemes_path(&target).display()
                        )
                        .blue()
                    );
                }
            }

            if let Some(log) = &config.output_log {
                if truncated.insert(log.clone()) {
                    xfs::truncate_log(log)?;
                }
            }

            subtask.prepare()?;
        }
        Ok(())
    }

    /// Runs pre-flight checks, the prepare step and the selected subtasks,
    /// in order. Command failures are recorded in `report`, never returned.
    ///
    /// 按顺序运行预检、准备步骤和选中的子任务。
    /// 命令失败会记录在 `report` 中，而不会作为错误返回。
    pub async fn run<R: ShellRunner>(
        &self,
        shell: &mut R,
        report: &mut TestReport,
        selection: &[Selection],
    ) -> Result<()> {
        self.preflight(selection)?;
        self.prepare(selection)?;
        self.run_commands(shell, report, selection).await;
        Ok(())
    }

    /// Runs the selected commands only, skipping pre-flight and prepare.
    /// Used for dry runs.
    ///
    /// 仅运行选中的命令，跳过预检和准备步骤。用于试运行。
    pub async fn run_commands<R: ShellRunner>(
        &self,
        shell: &mut R,
        report: &mut TestReport,
        selection: &[Selection],
    ) {
        for item in selection {
            if let Some(subtask) = self.subtask(&item.subtask) {
                subtask
                    .run_selected(shell, report, item.ios_version.as_deref())
                    .await;
            }
        }
    }

    fn selected<'a>(&'a self, selection: &'a [Selection]) -> impl Iterator<Item = &'a Subtask> + 'a {
        self.subtasks
            .iter()
            .filter(move |s| selection.iter().any(|item| item.subtask == s.name()))
    }
}
