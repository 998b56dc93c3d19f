//! # Init Command Module / 初始化命令模块
//!
//! Creates a new `XcTasks.toml`, either from a default template or through
//! an interactive wizard.
//!
//! 创建新的 `XcTasks.toml`，可使用默认模板，也可通过交互式向导生成。

use anyhow::{Context, Result, bail};
use colored::*;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::fs;
use std::path::Path;

use crate::core::config::RunnerKind;
use crate::core::task::TestTask;
use crate::infra::t;

pub const DEFAULT_CONFIG: &str = r#"# xcmatrix task file / xcmatrix 任务文件

# Task namespace, subtasks are listed as "test:<subtask>" / 任务命名空间
name = "test"
# Language for console messages / 控制台消息的语言
language = "en"

# Exactly one of workspace or project / workspace 与 project 二选一
workspace = "App.xcworkspace"
# Shared schemes copied into the workspace before running / 运行前复制的共享 scheme
# schemes_dir = "Tests/Schemes"

# xcodebuild, xctool or xcpretty, optionally with extra flags / 可附带额外参数
runner = "xcpretty -c"
sdk = "iphonesimulator"
# output_log = "xcodebuild.log"
# redirect_stderr = true

[settings]
GCC_INSTRUMENT_PROGRAM_FLOW_ARCS = "YES"

[[subtasks]]
name = "unit"
scheme = "Unit Tests"
ios_versions = ["7.0", "7.1"]

[[subtasks]]
name = "functional"
scheme = "Functional Tests"
destinations = [
    { platform = "iossimulator", name = "iPhone Retina (4-inch)", os = "latest" },
]

[subtasks.environment]
API_HOST = "localhost"
"#;

struct WizardAnswers {
    container_key: &'static str,
    container: String,
    runner: &'static str,
    subtask: String,
    scheme: String,
    ios_versions: Vec<String>,
}

/// Runs the wizard (or writes the default template) to `config_path`.
///
/// 运行向导（或写入默认模板）到 `config_path`。
pub fn run_init_wizard(config_path: &Path, language: &str, non_interactive: bool) -> Result<()> {
    if non_interactive {
        if config_path.exists() {
            bail!("{}", t!("init.file_exists", path = config_path.display()));
        }
        return write_config(config_path, DEFAULT_CONFIG);
    }

    let theme = ColorfulTheme::default();
    println!("{}", t!("init.welcome").bold());

    if config_path.exists() {
        let overwrite = Confirm::with_theme(&theme)
            .with_prompt(t!("init.overwrite_prompt", path = config_path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("{}", t!("init.aborted").yellow());
            return Ok(());
        }
    }

    let kinds = ["workspace", "project"];
    let kind = Select::with_theme(&theme)
        .with_prompt(t!("init.container_kind_prompt"))
        .items(&kinds)
        .default(0)
        .interact()?;
    let container: String = Input::with_theme(&theme)
        .with_prompt(t!("init.container_path_prompt"))
        .interact_text()?;

    let runners = [
        RunnerKind::Xcpretty.as_str(),
        RunnerKind::Xcodebuild.as_str(),
        RunnerKind::Xctool.as_str(),
    ];
    let runner = Select::with_theme(&theme)
        .with_prompt(t!("init.runner_prompt"))
        .items(&runners)
        .default(0)
        .interact()?;

    let subtask: String = Input::with_theme(&theme)
        .with_prompt(t!("init.subtask_prompt"))
        .default("unit".to_string())
        .interact_text()?;
    let scheme: String = Input::with_theme(&theme)
        .with_prompt(t!("init.scheme_prompt"))
        .interact_text()?;
    let versions: String = Input::with_theme(&theme)
        .with_prompt(t!("init.ios_versions_prompt"))
        .allow_empty(true)
        .interact_text()?;

    let answers = WizardAnswers {
        container_key: kinds[kind],
        container,
        runner: runners[runner],
        subtask,
        scheme,
        ios_versions: versions
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect(),
    };

    write_config(config_path, &render_config(&answers, language)?)
}

fn render_config(answers: &WizardAnswers, language: &str) -> Result<String> {
    let mut base = toml::Table::new();
    base.insert("name".into(), "test".into());
    base.insert("language".into(), language.into());
    base.insert(answers.container_key.into(), answers.container.as_str().into());
    base.insert("runner".into(), answers.runner.into());

    let mut subtask = toml::Table::new();
    subtask.insert("name".into(), answers.subtask.as_str().into());
    subtask.insert("scheme".into(), answers.scheme.as_str().into());
    if !answers.ios_versions.is_empty() {
        subtask.insert("ios_versions".into(), answers.ios_versions.clone().into());
    }
    base.insert("subtasks".into(), toml::Value::Array(vec![toml::Value::Table(subtask)]));

    Ok(toml::to_string(&base)?)
}

fn write_config(path: &Path, content: &str) -> Result<()> {
    // Refuse to write a file the loader would reject.
    TestTask::from_toml_str(content).context(t!("init.invalid_template").to_string())?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                t!("init.create_parent_dir_failed", path = parent.display()).to_string()
            })?;
        }
    }
    fs::write(path, content)
        .with_context(|| t!("init.write_failed", path = path.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success", path = path.display()).bold()
    );
    println!("{}", t!("init.next_steps"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_loads() {
        let task = TestTask::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(task.language(), Some("en"));
        assert_eq!(
            task.task_names(),
            vec!["test:unit", "test:unit:7.0", "test:unit:7.1", "test:functional"]
        );
    }

    #[test]
    fn test_wizard_answers_render_a_loadable_file() {
        let answers = WizardAnswers {
            container_key: "project",
            container: "App.xcodeproj".to_string(),
            runner: "xctool",
            subtask: "unit".to_string(),
            scheme: "App Tests".to_string(),
            ios_versions: vec!["8.1".to_string()],
        };
        let task = TestTask::from_toml_str(&render_config(&answers, "zh-CN").unwrap()).unwrap();
        assert_eq!(task.language(), Some("zh-CN"));
        assert_eq!(task.task_names(), vec!["test:unit", "test:unit:8.1"]);
    }
}
