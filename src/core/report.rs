//! # Test Report Module / 测试报告模块
//!
//! Aggregates the outcome of every executed command into one overall status.
//! A single `TestReport` is owned by the binary's `main` for the whole run and
//! lent to the task; the process exit code is derived from it on every
//! return path.
//!
//! 将每条已执行命令的结果汇总为一个总体状态。
//! 在整个运行期间，单个 `TestReport` 由二进制程序的 `main` 持有并借给任务；
//! 进程退出码在每条返回路径上都由它得出。

use std::fmt;
use std::process::ExitCode;

/// The expansion key of one command: the iOS version it ran under, if any.
/// 单条命令的展开键：运行时所用的 iOS 版本（如果有）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OptionSet {
    pub ios_version: Option<String>,
}

impl OptionSet {
    pub fn unversioned() -> Self {
        Self::default()
    }

    pub fn ios(version: impl Into<String>) -> Self {
        Self {
            ios_version: Some(version.into()),
        }
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ios_version {
            Some(version) => write!(f, "{{ios_version: {version}}}"),
            None => f.write_str("{}"),
        }
    }
}

/// One line of the final report.
/// 最终报告中的一行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Failure { subtask: String, options: OptionSet },
    Success,
}

/// Outcomes recorded for a single subtask, in execution order.
#[derive(Debug, Clone)]
pub struct SubtaskOutcomes {
    pub subtask: String,
    pub outcomes: Vec<(OptionSet, bool)>,
}

/// Pass/fail outcomes of a whole run.
/// 整个运行的通过/失败结果。
#[derive(Debug, Clone)]
pub struct TestReport {
    entries: Vec<SubtaskOutcomes>,
    success: bool,
}

impl Default for TestReport {
    fn default() -> Self {
        Self::new()
    }
}

impl TestReport {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            success: true,
        }
    }

    /// Records one outcome. Recording the same (subtask, options) pair again
    /// updates the stored outcome, but a failure is never overwritten by a
    /// later success.
    ///
    /// 记录一个结果。再次记录同一 (subtask, options) 对会更新已保存的结果，
    /// 但失败永远不会被之后的成功覆盖。
    pub fn record_result(&mut self, subtask: &str, options: OptionSet, success: bool) {
        if !success {
            self.success = false;
        }

        let index = match self.entries.iter().position(|e| e.subtask == subtask) {
            Some(index) => index,
            None => {
                self.entries.push(SubtaskOutcomes {
                    subtask: subtask.to_string(),
                    outcomes: Vec::new(),
                });
                self.entries.len() - 1
            }
        };

        let outcomes = &mut self.entries[index].outcomes;
        match outcomes.iter_mut().find(|(o, _)| *o == options) {
            Some(entry) => entry.1 &= success,
            None => outcomes.push((options, success)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }

    /// The outcome recorded for a pair, if any.
    pub fn outcome(&self, subtask: &str, options: &OptionSet) -> Option<bool> {
        self.entries
            .iter()
            .find(|e| e.subtask == subtask)?
            .outcomes
            .iter()
            .find(|(o, _)| o == options)
            .map(|(_, success)| *success)
    }

    pub fn entries(&self) -> &[SubtaskOutcomes] {
        &self.entries
    }

    /// Total number of recorded outcomes.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.outcomes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One `Failure` line per failed pair, or a single `Success` line.
    /// 每个失败的组合一行 `Failure`，或者单独一行 `Success`。
    pub fn report(&self) -> Vec<ReportLine> {
        if self.success {
            return vec![ReportLine::Success];
        }

        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .outcomes
                    .iter()
                    .filter(|(_, success)| !success)
                    .map(|(options, _)| ReportLine::Failure {
                        subtask: entry.subtask.clone(),
                        options: options.clone(),
                    })
            })
            .collect()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_failure() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}
