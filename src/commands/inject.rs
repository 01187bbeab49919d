//! Inject command implementation

use std::path::PathBuf;

use console::{Style, Term};

use crate::archive::{Archiver, SevenZip};
use crate::cli::InjectArgs;
use crate::config::InjectConfig;
use crate::error::{InjectorError, Result};
use crate::injector::{InjectReport, Injector};
use crate::merge::SourceSummary;
use crate::patch::PatchOutcome;
use crate::progress::StageProgress;

/// Run inject command
pub fn run(args: &InjectArgs, verbose: bool) -> Result<()> {
    let config = match &args.config {
        Some(path) => InjectConfig::load(path)?,
        None => InjectConfig::default(),
    };

    let sources_dir = match &args.sources {
        Some(dir) => dir.clone(),
        None => default_sources_dir()?,
    };

    let seven_zip = match (&args.launcher, &args.seven_zip) {
        (Some(launcher), Some(tool)) => SevenZip::launched_by(launcher, tool),
        _ => SevenZip::locate(args.seven_zip.as_deref())?,
    };
    tracing::debug!(
        tool = %seven_zip.name(),
        program = %seven_zip.program().display(),
        sources = %sources_dir.display(),
        "resolved inputs"
    );

    println!(
        "{} {}",
        Style::new().bold().green().apply_to("Injecting Steamodded into"),
        args.archive.display()
    );

    let mut progress = StageProgress::new(!verbose && console::user_attended_stderr());
    let result = Injector::new(&seven_zip, &config, sources_dir)
        .force(args.force)
        .run(&args.archive, &mut |stage| progress.stage(stage));

    match result {
        Ok(report) => {
            progress.finish();
            if report.merge.has_skipped() {
                tracing::warn!("some loader fragments could not be read and were left out");
            }
            print_report(&report, &config);
            Ok(())
        }
        Err(e) => {
            progress.abandon();
            Err(e)
        }
    }
}

/// Loader sources ship next to the injector executable
fn default_sources_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| InjectorError::IoError {
        message: format!("Failed to locate the running executable: {}", e),
    })?;
    exe.parent()
        .map(PathBuf::from)
        .ok_or_else(|| InjectorError::IoError {
            message: format!("Executable has no parent directory: {}", exe.display()),
        })
}

fn print_report(report: &InjectReport, config: &InjectConfig) {
    let bold = Style::new().bold();
    let warn = Style::new().bold().yellow();

    if let Some(version) = &report.game_version {
        println!("  {} {}", bold.apply_to("Game version:"), version);
    }

    let missing = report.merge.missing_sources();
    if missing.len() == report.merge.sources.len() {
        tracing::warn!(?missing, "none of the loader source directories were found");
    }

    println!("  {}", bold.apply_to("Sources:"));
    for source in &report.merge.sources {
        println!("    {}", describe_source(source));
        if !source.skipped.is_empty() {
            println!(
                "      {} {}",
                warn.apply_to("unreadable, skipped:"),
                source.skipped.join(", ")
            );
        }
    }

    match report.patch {
        PatchOutcome::Inserted { line } => println!(
            "  {} loader call inserted after line {}",
            bold.apply_to(format!("{}:", config.game_script)),
            line
        ),
        PatchOutcome::AnchorNotFound => println!(
            "  {} anchor line not found, loader call NOT inserted ({:?})",
            warn.apply_to(format!("{}:", config.game_script)),
            config.anchor.trim()
        ),
    }

    println!(
        "{} {}",
        Style::new().bold().green().apply_to("Updated"),
        report.archive.display()
    );
}

fn describe_source(source: &SourceSummary) -> String {
    if source.missing {
        return format!("{} (not found)", source.name);
    }
    match source.merged.len() {
        1 => format!("{} (1 file)", source.name),
        n => format!("{} ({} files)", source.name, n),
    }
}

/// Keep a console window open until a key is pressed (drag-and-drop launches)
pub fn wait_for_key() {
    let term = Term::stdout();
    if !term.is_term() {
        return;
    }
    println!("Press any key to exit...");
    let _ = term.read_key();
}
