//! # Reporting Module / 报告模块
//!
//! Prints the final report to the console and optionally renders it as an
//! HTML file.
//!
//! 将最终报告打印到控制台，并可选地渲染为 HTML 文件。

pub mod console;
pub mod html;

// Re-export common reporting functions
pub use console::print_report;
pub use html::generate_html_report;
