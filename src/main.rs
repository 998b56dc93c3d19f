use colored::*;
use std::process::ExitCode;
use xcmatrix::{cli, report::TestReport};

#[tokio::main]
async fn main() -> ExitCode {
    let mut report = TestReport::new();

    match cli::run(&mut report).await {
        Ok(()) => report.exit_code(),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
