//! # Command-Line Interface Module / 命令行接口模块
//!
//! Builds the localized clap command tree and dispatches to the `run`,
//! `list` and `init` subcommands.
//!
//! 构建本地化的 clap 命令树，并分发到 `run`、`list` 和 `init` 子命令。

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::core::config::DEFAULT_CONFIG_FILE;
use crate::infra::t;

pub mod commands;

/// Pre-parses the command line arguments to find an explicit `--lang <VALUE>`.
/// This allows i18n to be initialized before the full CLI is built.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|arg| arg == "--lang")
        .and_then(|pos| args.get(pos + 1))
        .cloned()
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

fn build_cli(locale: &str) -> Command {
    Command::new("variant-matrix")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cli.cmd_run_about", locale = locale).to_string())
                .arg(config_arg(locale))
                .arg(
                    Arg::new("project-dir")
                        .long("project-dir")
                        .help(t!("cli.arg_project_dir", locale = locale).to_string())
                        .value_name("PROJECT_DIR")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("only")
                        .long("only")
                        .help(t!("cli.arg_only", locale = locale).to_string())
                        .value_name("VARIANT")
                        .action(ArgAction::Append),
                )
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
                    Arg::new("json")
                        .long("json")
                        .help(t!("cli.arg_json", locale = locale).to_string())
                        .value_name("JSON")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("list")
                .about(t!("cli.cmd_list_about", locale = locale).to_string())
                .arg(config_arg(locale)),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.cmd_init_about", locale = locale).to_string())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("cli.arg_output", locale = locale).to_string())
                        .value_name("FILE")
                        .default_value(DEFAULT_CONFIG_FILE)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("cli.arg_force", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("cli.arg_non_interactive", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn path_arg(matches: &ArgMatches, id: &str) -> PathBuf {
    // Only used for arguments that carry a default value.
    matches.get_one::<PathBuf>(id).cloned().unwrap_or_default()
}

/// Parses the command line and executes the selected subcommand.
pub async fn run() -> Result<()> {
    let explicit_lang = pre_parse_language();
    let language = crate::resolve_locale(
        explicit_lang
            .clone()
            .or_else(sys_locale::get_locale)
            .as_deref()
            .unwrap_or("en"),
    );
    rust_i18n::set_locale(&language);

    let matches = build_cli(&language).get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let options = commands::run::RunOptions {
                config: path_arg(run_matches, "config"),
                project_dir: path_arg(run_matches, "project-dir"),
                only: run_matches
                    .get_many::<String>("only")
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default(),
                dry_run: run_matches.get_flag("dry-run"),
                html: run_matches.get_one::<PathBuf>("html").cloned(),
                json: run_matches.get_one::<PathBuf>("json").cloned(),
                lang_override: explicit_lang,
            };
            commands::run::execute(options).await?;
        }
        Some(("list", list_matches)) => {
            commands::list::execute(&path_arg(list_matches, "config"), explicit_lang)?;
        }
        Some(("init", init_matches)) => {
            if explicit_lang.is_none() {
                println!(
                    "🌐 {}",
                    t!("system_language_detected", locale = &language, lang = &language)
                );
            }
            commands::init::execute(
                &path_arg(init_matches, "output"),
                init_matches.get_flag("force"),
                init_matches.get_flag("non-interactive"),
                &language,
            )?;
        }
        _ => {
            // Clap has already printed help.
        }
    }
    Ok(())
}
