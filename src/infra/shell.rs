//! # Shell Execution Module / Shell 执行模块
//!
//! Runs fully rendered command strings. The rendered commands rely on pipes
//! and `${PIPESTATUS[0]}`, so they are handed to `bash -c` as a whole.
//!
//! 执行完整渲染的命令字符串。渲染后的命令依赖管道和 `${PIPESTATUS[0]}`，
//! 因此整体交给 `bash -c` 执行。

use colored::*;
use std::future::Future;
use std::process::Stdio;

use crate::infra::t;

/// Executes a shell command and reports whether it succeeded.
/// Output is never inspected.
///
/// 执行 shell 命令并报告是否成功。从不检查输出内容。
pub trait ShellRunner {
    fn run(&mut self, command: &str, echo: bool) -> impl Future<Output = bool>;
}

/// Runs commands through `bash -c` with inherited stdio.
#[derive(Debug, Clone)]
pub struct BashShell {
    shell: String,
}

impl Default for BashShell {
    fn default() -> Self {
        Self {
            shell: "bash".to_string(),
        }
    }
}

impl BashShell {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShellRunner for BashShell {
    async fn run(&mut self, command: &str, echo: bool) -> bool {
        if echo {
            println!("{}", t!("run.executing", command = command).blue());
        }

        let status = tokio::process::Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .status()
            .await;

        match status {
            Ok(status) => status.success(),
            Err(e) => {
                eprintln!(
                    "{}",
                    t!("run.spawn_failed", shell = &self.shell, error = e).red()
                );
                false
            }
        }
    }
}

/// Prints commands instead of running them; every command "succeeds".
/// 打印命令而不执行；每条命令都视为“成功”。
#[derive(Debug, Clone, Default)]
pub struct DryRunShell {
    pub commands: Vec<String>,
}

impl ShellRunner for DryRunShell {
    async fn run(&mut self, command: &str, echo: bool) -> bool {
        if echo {
            println!("{}", command);
        }
        self.commands.push(command.to_string());
        true
    }
}
