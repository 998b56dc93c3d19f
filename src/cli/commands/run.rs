//! # Run Command Module / 运行命令模块
//!
//! Loads the task file, resolves the selected subtasks, runs them and
//! prints the final report.
//!
//! 加载任务文件，解析选中的子任务，运行它们并打印最终报告。

use anyhow::Result;
use colored::*;
use std::path::PathBuf;

use crate::core::report::TestReport;
use crate::core::task::TestTask;
use crate::infra::shell::{BashShell, DryRunShell};
use crate::infra::t;
use crate::reporting::{generate_html_report, print_report};
use crate::resolve_locale;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: PathBuf,
    pub dry_run: bool,
    pub html: Option<PathBuf>,
    pub selectors: Vec<String>,
    /// Whether `--lang` was given; otherwise the task file's `language` wins.
    pub explicit_language: bool,
}

/// Executes the `run` command. Command failures only show up in `report`.
///
/// 执行 `run` 命令。命令失败只会体现在 `report` 中。
///
/// # Errors / 错误
/// Returns an error if the task file cannot be loaded, a selector is
/// unknown, or a pre-flight or prepare step fails.
/// 如果无法加载任务文件、选择器未知，或预检/准备步骤失败，则返回错误。
pub async fn execute(options: RunOptions, report: &mut TestReport) -> Result<()> {
    let task = TestTask::from_file(&options.config)?;

    if !options.explicit_language {
        if let Some(language) = task.language() {
            rust_i18n::set_locale(&resolve_locale(language));
        }
    }

    let selection = task.select(&options.selectors)?;
    println!(
        "{}",
        t!(
            "run.loaded_task",
            name = task.name(),
            count = selection.len(),
            path = options.config.display()
        )
        .bold()
    );

    if options.dry_run {
        println!("{}", t!("run.dry_run_banner").yellow());
        task.preflight(&selection)?;
        let mut shell = DryRunShell::default();
        task.run_commands(&mut shell, report, &selection).await;
    } else {
        let mut shell = BashShell::new();
        task.run(&mut shell, report, &selection).await?;
    }

    print_report(report);

    if let Some(html_path) = &options.html {
        generate_html_report(task.name(), report, html_path)?;
        println!("{}", t!("html_report.written", path = html_path.display()).green());
    }

    Ok(())
}
