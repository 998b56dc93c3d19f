//! # CLI Module / 命令行模块
//!
//! Builds the `xcmatrix` command line and dispatches to the subcommands.
//! Help texts are translated, so the language is resolved before the
//! parser is built.
//!
//! 构建 `xcmatrix` 命令行并分发到各子命令。
//! 帮助文本是经过翻译的，因此在构建解析器之前先确定语言。

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::core::report::TestReport;
use crate::core::task::DEFAULT_CONFIG_FILE;
use crate::infra::t;
use crate::resolve_locale;

pub mod commands;

/// Finds an explicit `--lang <VALUE>` or `--lang=<VALUE>` argument.
fn explicit_language<I: IntoIterator<Item = String>>(args: I) -> Option<String> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--lang" {
            return args.next();
        }
        if let Some(lang) = arg.strip_prefix("--lang=") {
            return Some(lang.to_string());
        }
    }
    None
}

/// Pre-parses the command line arguments to find the language setting, so
/// i18n is initialized before the full CLI is built. Falls back to the
/// system locale.
fn pre_parse_language() -> (String, bool) {
    match explicit_language(env::args()) {
        Some(lang) => (resolve_locale(&lang), true),
        None => {
            let system = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
            (resolve_locale(&system), false)
        }
    }
}

fn config_arg(locale: &str) -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help(t!("cli.arg_config", locale = locale).to_string())
        .value_name("CONFIG")
        .default_value(DEFAULT_CONFIG_FILE)
        .value_parser(clap::value_parser!(PathBuf))
        .action(ArgAction::Set)
}

pub fn build_cli(locale: &str) -> Command {
    Command::new("xcmatrix")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.arg_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cli.cmd_run_about", locale = locale).to_string())
                .arg(config_arg(locale))
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help(t!("cli.arg_dry_run", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help(t!("cli.arg_html", locale = locale).to_string())
                        .value_name("HTML")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("selectors")
                        .help(t!("cli.arg_selectors", locale = locale).to_string())
                        .value_name("SUBTASK[:VERSION]")
                        .num_args(0..)
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("list")
                .about(t!("cli.cmd_list_about", locale = locale).to_string())
                .arg(config_arg(locale))
                .arg(
                    Arg::new("commands")
                        .long("commands")
                        .help(t!("cli.arg_commands", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.cmd_init_about", locale = locale).to_string())
                .arg(config_arg(locale))
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("cli.arg_non_interactive", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn config_path(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Parses the command line and runs the chosen subcommand. Outcomes of
/// executed commands land in `report`; the error path is reserved for
/// configuration and pre-flight problems.
///
/// 解析命令行并运行所选子命令。已执行命令的结果记录在 `report` 中；
/// 错误路径仅用于配置和预检问题。
pub async fn run(report: &mut TestReport) -> Result<()> {
    let (language, explicit) = pre_parse_language();
    rust_i18n::set_locale(&language);

    let matches = build_cli(&language).get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let options = commands::run::RunOptions {
                config: config_path(run_matches),
                dry_run: run_matches.get_flag("dry-run"),
                html: run_matches.get_one::<PathBuf>("html").cloned(),
                selectors: run_matches
                    .get_many::<String>("selectors")
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default(),
                explicit_language: explicit,
            };
            commands::run::execute(options, report).await?;
        }
        Some(("list", list_matches)) => {
            commands::list::execute(&config_path(list_matches), list_matches.get_flag("commands"))?;
        }
        Some(("init", init_matches)) => {
            commands::init::run_init_wizard(
                &config_path(init_matches),
                &language,
                init_matches.get_flag("non-interactive"),
            )?;
        }
        _ => {
            // Clap has already printed the help.
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_explicit_language_forms() {
        assert_eq!(explicit_language(args(&["xcmatrix", "--lang", "zh-CN", "run"])), Some("zh-CN".to_string()));
        assert_eq!(explicit_language(args(&["xcmatrix", "run", "--lang=en"])), Some("en".to_string()));
        assert_eq!(explicit_language(args(&["xcmatrix", "run"])), None);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli("en").debug_assert();
    }
}
