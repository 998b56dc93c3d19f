//! # HTML Reporting Module / HTML 报告模块
//!
//! Renders the report as a standalone HTML page: a summary header and one
//! table row per recorded subtask/option outcome.
//!
//! 将报告渲染为独立的 HTML 页面：一个摘要头部，以及每个已记录的子任务/选项结果一行表格。

use anyhow::{Context, Result};
use chrono::Local;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::Path;

use crate::core::report::TestReport;
use crate::infra::t;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, Helvetica, Arial, sans-serif; margin: 2em; color: #222; }
h1 { font-size: 1.6em; }
.summary span { margin-right: 1.5em; }
table { border-collapse: collapse; width: 100%; margin-top: 1em; }
th, td { border: 1px solid #ddd; padding: 6px 10px; text-align: left; }
th { background: #f4f4f4; }
.passed { color: #1a7f37; font-weight: bold; }
.failed { color: #cf222e; font-weight: bold; }
"#;

/// Builds the report page.
/// 构建报告页面。
pub fn render_html_report(task_name: &str, report: &TestReport) -> Markup {
    let total = report.len();
    let failed = report
        .entries()
        .iter()
        .flat_map(|e| e.outcomes.iter())
        .filter(|(_, success)| !success)
        .count();
    let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title", task = task_name)) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.title", task = task_name)) }
                p { (t!("html_report.generated_at", time = generated)) }
                div class="summary" {
                    span { (t!("html_report.summary.total")) ": " (total) }
                    span class="passed" { (t!("html_report.summary.passed")) ": " (total - failed) }
                    span class="failed" { (t!("html_report.summary.failed")) ": " (failed) }
                }
                table {
                    thead {
                        tr {
                            th { (t!("html_report.table.subtask")) }
                            th { (t!("html_report.table.options")) }
                            th { (t!("html_report.table.status")) }
                        }
                    }
                    tbody {
                        @for entry in report.entries() {
                            @for (options, success) in &entry.outcomes {
                                tr {
                                    td { (entry.subtask) }
                                    td { (options.to_string()) }
                                    @if *success {
                                        td class="passed" { (t!("html_report.status.passed")) }
                                    } @else {
                                        td class="failed" { (t!("html_report.status.failed")) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Writes the HTML report to `output_path`, creating parent directories.
///
/// # Errors / 错误
/// Returns an error if the file or its parent directory cannot be written.
/// 如果无法写入文件或其父目录，则返回错误。
pub fn generate_html_report(task_name: &str, report: &TestReport, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    let page = render_html_report(task_name, report).into_string();
    fs::write(output_path, page)
        .with_context(|| t!("html_report.write_failed", path = output_path.display()).to_string())?;
    Ok(())
}
