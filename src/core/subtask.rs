//! # Subtask Module / 子任务模块
//!
//! A subtask is one named unit of work with its own copy of the task's
//! configuration. At run time it expands over its iOS versions (or runs once
//! when unversioned) and records every outcome in the [`TestReport`].
//!
//! 子任务是一个具名的工作单元，拥有任务配置的独立副本。
//! 运行时它按 iOS 版本展开（未指定版本时只运行一次），
//! 并将每个结果记录到 [`TestReport`] 中。

use anyhow::Result;
use colored::*;
use std::path::PathBuf;

use crate::core::command::{KILL_SIMULATOR_COMMAND, build_command};
use crate::core::config::{Configuration, Overrides};
use crate::core::error::{ConfigError, ConfigResult};
use crate::core::report::{OptionSet, TestReport};
use crate::infra::{fs::shared_schemes_path, scheme, shell::ShellRunner, t};

#[derive(Debug, Clone)]
pub struct Subtask {
    name: String,
    config: Configuration,
}

impl Subtask {
    /// Derives the subtask's configuration from `base` and validates it.
    /// The scheme defaults to the inherited one; pass it in `overrides` for
    /// the `name => scheme` form.
    ///
    /// 从 `base` 派生子任务配置并进行校验。
    /// scheme 默认继承；若使用 `name => scheme` 形式，请通过 `overrides` 传入。
    pub fn new(name: impl Into<String>, base: &Configuration, overrides: &Overrides) -> ConfigResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::configuration("subtask name must not be empty"));
        }
        if name.contains(':') {
            return Err(ConfigError::configuration(format!(
                "subtask name '{name}' must not contain ':'"
            )));
        }

        let config = base.derive(overrides)?;
        config
            .validate()
            .map_err(|e| ConfigError::configuration(format!("subtask '{name}': {}", message(&e))))?;

        Ok(Self { name, config })
    }

    /// Shorthand for a subtask that only names its scheme.
    pub fn with_scheme(name: impl Into<String>, scheme: impl Into<String>, base: &Configuration) -> ConfigResult<Self> {
        let overrides = Overrides {
            scheme: Some(scheme.into()),
            ..Overrides::default()
        };
        Self::new(name, base, &overrides)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn is_versioned(&self) -> bool {
        self.config.is_versioned()
    }

    /// One option set per iOS version, or a single empty one.
    pub fn option_sets(&self) -> Vec<OptionSet> {
        if self.is_versioned() {
            self.config.ios_versions.iter().map(OptionSet::ios).collect()
        } else {
            vec![OptionSet::unversioned()]
        }
    }

    pub fn command(&self, options: &OptionSet) -> String {
        build_command(&self.config, options.ios_version.as_deref())
    }

    /// Every command this subtask would run, in order.
    /// 此子任务将按顺序运行的所有命令。
    pub fn commands(&self) -> Vec<(OptionSet, String)> {
        self.option_sets()
            .into_iter()
            .map(|options| {
                let command = self.command(&options);
                (options, command)
            })
            .collect()
    }

    /// The scheme file that environment variables are injected into.
    pub fn scheme_path(&self) -> Option<PathBuf> {
        let target = self.config.target()?;
        let scheme = self.config.scheme.as_deref()?;
        Some(shared_schemes_path(&target).join(format!("{scheme}.xcscheme")))
    }

    /// Injects the configured environment into the scheme file.
    /// Does nothing when no environment is configured.
    ///
    /// 将配置的环境变量注入 scheme 文件。未配置环境变量时不做任何事。
    pub fn prepare(&self) -> Result<()> {
        if self.config.environment.is_empty() {
            return Ok(());
        }
        if let Some(path) = self.scheme_path() {
            println!(
                "{}",
                t!("prepare.injecting_environment", name = &self.name, path = path.display()).blue()
            );
            scheme::inject_environment(&path, &self.config.environment)?;
        }
        Ok(())
    }

    /// Runs every expansion in order and records each outcome. A failing
    /// command never stops the remaining ones.
    ///
    /// 按顺序运行每个展开并记录每个结果。失败的命令不会中断剩余命令。
    pub async fn run_commands<R: ShellRunner>(&self, shell: &mut R, report: &mut TestReport) {
        self.run_selected(shell, report, None).await;
    }

    /// Like [`Subtask::run_commands`], restricted to one iOS version when given.
    pub async fn run_selected<R: ShellRunner>(
        &self,
        shell: &mut R,
        report: &mut TestReport,
        only_version: Option<&str>,
    ) {
        for options in self.option_sets() {
            if only_version.is_some() && options.ios_version.as_deref() != only_version {
                continue;
            }

            println!(
                "{}",
                t!("run.running_subtask", name = &self.name, options = &options).blue()
            );

            if self.config.sdk.is_simulator() {
                // Best effort, the result is ignored.
                shell.run(KILL_SIMULATOR_COMMAND, false).await;
            }

            let command = self.command(&options);
            let success = shell.run(&command, true).await;

            if success {
                println!("{}", t!("run.subtask_passed", name = &self.name, options = &options).green());
            } else {
                println!("{}", t!("run.subtask_failed", name = &self.name, options = &options).red());
            }
            report.record_result(&self.name, options, success);
        }
    }
}

fn message(error: &ConfigError) -> &str {
    match error {
        ConfigError::Configuration(m) | ConfigError::InvalidArgument(m) => m,
    }
}
