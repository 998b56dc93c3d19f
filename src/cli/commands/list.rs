//! # List Command Module / 列表命令模块
//!
//! Prints the task names a task file defines, optionally with the exact
//! command each one would run.
//!
//! 打印任务文件定义的任务名，可选地附带每个任务将要运行的具体命令。

use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::core::task::TestTask;

/// One line per task name; with `show_commands`, each versioned or
/// unversioned expansion is followed by its indented command.
///
/// 每个任务名一行；启用 `show_commands` 时，每个展开后附带缩进的命令。
pub fn render_listing(task: &TestTask, show_commands: bool) -> Vec<String> {
    if !show_commands {
        return task.task_names();
    }

    let mut lines = Vec::new();
    for subtask in task.subtasks() {
        for (options, command) in subtask.commands() {
            match &options.ios_version {
                Some(version) => lines.push(format!("{}:{}:{}", task.name(), subtask.name(), version)),
                None => lines.push(format!("{}:{}", task.name(), subtask.name())),
            }
            lines.push(format!("    {command}"));
        }
    }
    lines
}

pub fn execute(config: &Path, show_commands: bool) -> Result<()> {
    let task = TestTask::from_file(config)?;
    for line in render_listing(&task, show_commands) {
        if line.starts_with(' ') {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line.bold());
        }
    }
    Ok(())
}
