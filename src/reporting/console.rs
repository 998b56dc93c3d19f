//! # Console Reporting Module / 控制台报告模块
//!
//! Prints the final report: one red line per failed subtask/option pair, or
//! a single green line when everything passed.
//!
//! 打印最终报告：每个失败的子任务/选项组合一行红色输出，
//! 或在全部通过时输出一行绿色信息。

use colored::*;

use crate::core::report::{ReportLine, TestReport};
use crate::infra::t;

/// Renders the report lines as plain (uncolored) text.
/// 将报告行渲染为纯文本（无颜色）。
///
/// # Output Format / 输出格式
/// ```text
/// !! unit tests failed {ios_version: 7.0}
/// !! functional tests failed {}
/// ```
/// or / 或
/// ```text
/// ** All tests executed successfully
/// ```
pub fn format_report(report: &TestReport) -> Vec<String> {
    report
        .report()
        .into_iter()
        .map(|line| match line {
            ReportLine::Failure { subtask, options } => t!(
                "report.failure",
                subtask = subtask,
                options = options
            )
            .to_string(),
            ReportLine::Success => t!("report.success").to_string(),
        })
        .collect()
}

/// Prints the final report to stdout.
pub fn print_report(report: &TestReport) {
    println!();
    for line in format_report(report) {
        if report.is_success() {
            println!("{}", line.green());
        } else {
            println!("{}", line.red());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::OptionSet;

    #[test]
    fn test_format_report_lists_failures_only() {
        rust_i18n::set_locale("en");
        let mut report = TestReport::new();
        report.record_result("unit", OptionSet::ios("7.0"), false);
        report.record_result("unit", OptionSet::ios("7.1"), true);

        assert_eq!(
            format_report(&report),
            vec!["!! unit tests failed {ios_version: 7.0}".to_string()]
        );
    }
}
