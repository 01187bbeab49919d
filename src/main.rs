//! Steamodded injector
//!
//! Installs the Steamodded mod loader into a packaged Balatro game: the loader sources
//! are appended to `main.lua`, a start call is inserted into `game.lua`, and both files
//! are written back into the game archive with 7-Zip.

use std::io::IsTerminal;

use clap::{CommandFactory, Parser};
use console::Style;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

mod archive;
mod cli;
mod commands;
mod common;
mod config;
mod error;
mod injector;
mod merge;
mod patch;
mod progress;
mod temp;

use cli::{Cli, Commands, InjectArgs};

/// Diagnostics go to stderr; `LOG_LEVEL` (e.g. `debug`, `steamodded_injector=trace`)
/// overrides the level picked from `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = match (cli.command, cli.archive) {
        (Some(command), _) => command,
        (None, Some(archive)) => Commands::Inject(InjectArgs::for_archive(archive)),
        (None, None) => {
            let _ = Cli::command().print_help();
            std::process::exit(2);
        }
    };

    let wait = matches!(&command, Commands::Inject(args) if args.wait);

    let result = match command {
        Commands::Inject(args) => commands::inject::run(&args, cli.verbose),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!(
            "{} {}",
            Style::new().for_stderr().bold().red().apply_to("Error:"),
            e
        );
        if let Some(help) = e.help() {
            eprintln!("  help: {}", help);
        }
        tracing::debug!(code = ?e.code().map(|c| c.to_string()), "injection aborted");

        if wait {
            commands::inject::wait_for_key();
        }
        std::process::exit(1);
    }

    if wait {
        commands::inject::wait_for_key();
    }
}
