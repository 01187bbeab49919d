//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Steamodded injector - installs the Steamodded mod loader into Balatro
#[derive(Parser, Debug)]
#[command(
    name = "steamodded-injector",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Injects the Steamodded mod loader into Balatro",
    long_about = "Extracts main.lua and game.lua from the packaged game, appends the loader \
                  sources (core, debug, loader) to main.lua, inserts the loader start call into \
                  game.lua and writes both files back into the archive. Requires 7-Zip.\n\n\
                  Do not run two injections against the same game file at the same time.",
    arg_required_else_help = true,
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  steamodded-injector Balatro.exe\n    \
                  steamodded-injector inject Balatro.exe --sources ./steamodded\n    \
                  steamodded-injector inject Balatro.exe --seven-zip /usr/bin/7zz\n    \
                  steamodded-injector completions --shell bash"
)]
pub struct Cli {
    /// Game archive to inject into (shorthand for `inject <ARCHIVE>`)
    pub archive: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inject the mod loader into a game archive
    #[command(visible_alias = "i")]
    Inject(InjectArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the inject command
#[derive(Parser, Debug, Default)]
#[command(after_help = "EXAMPLES:\n  \
                  Inject using 7-Zip from PATH:\n    steamodded-injector inject Balatro.exe\n\n\
                  Use loader sources from another directory:\n    steamodded-injector inject Balatro.exe --sources ~/Steamodded\n\n\
                  Run a Windows 7z.exe through wine:\n    steamodded-injector inject Balatro.exe --launcher wine --seven-zip ~/7-Zip/7z.exe\n\n\
                  Override the anchor for another game version:\n    steamodded-injector inject Balatro.exe --config inject.yaml")]
pub struct InjectArgs {
    /// Game archive (Balatro.exe) or macOS app bundle (Balatro.app)
    pub archive: PathBuf,

    /// 7-Zip executable (path or name on PATH)
    #[arg(long = "seven-zip", value_name = "PATH", env = "STEAMODDED_7Z")]
    pub seven_zip: Option<PathBuf>,

    /// Run 7-Zip through this program (e.g. wine); requires --seven-zip
    #[arg(long, value_name = "PROGRAM", requires = "seven_zip")]
    pub launcher: Option<PathBuf>,

    /// Directory containing the loader source directories (defaults to the executable's directory)
    #[arg(long, value_name = "DIR")]
    pub sources: Option<PathBuf>,

    /// YAML file overriding script names, source directories, anchor or insertion
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Inject even if the game already calls the loader
    #[arg(long)]
    pub force: bool,

    /// Wait for a key press before exiting (always on for the bare archive form)
    #[arg(long)]
    pub wait: bool,
}

impl InjectArgs {
    /// Arguments for the bare `steamodded-injector <ARCHIVE>` form.
    ///
    /// This is what a drag-and-drop launch runs, so the console is held open.
    pub fn for_archive(archive: PathBuf) -> Self {
        Self {
            archive,
            seven_zip: std::env::var_os("STEAMODDED_7Z").map(PathBuf::from),
            wait: true,
            ..Self::default()
        }
    }
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    steamodded-injector completions --shell bash > ~/.bash_completion.d/steamodded-injector\n\n\
                  Generate zsh completions:\n    steamodded-injector completions --shell zsh > ~/.zfunc/_steamodded-injector\n\n\
                  Generate PowerShell completions:\n    steamodded-injector completions --shell powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
