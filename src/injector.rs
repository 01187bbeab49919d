//! Archive round trip: extract, merge, patch, repack
//!
//! ```text
//! archive ──extract──▶ work dir ──merge──▶ main.lua
//!                                ──patch──▶ game.lua
//!         ◀──update (main.lua, game.lua)──┘
//! ```
//!
//! The working directory lives for one run and is removed when [`Injector::run`]
//! returns, whatever the outcome. Nothing in the archive is written before both
//! scripts have been found and rewritten; the only write is one batched update.
//!
//! There is no locking: running two injections against the same archive at the same
//! time is undefined.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::archive::Archiver;
use crate::common::fs::read_script;
use crate::config::InjectConfig;
use crate::error::{InjectorError, Result};
use crate::merge::{self, MergeReport};
use crate::patch::{self, PatchOutcome};
use crate::temp;

/// Location of the game archive inside a macOS `Balatro.app` bundle
const BUNDLE_ARCHIVE: [&str; 3] = ["Contents", "Resources", "Balatro.love"];

/// Archive member holding the game version on its first line
const VERSION_FILE: &str = "version.jkr";

/// Pipeline stages, reported as each one starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Merge,
    Patch,
    Repack,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Extract, Stage::Merge, Stage::Patch, Stage::Repack];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Extract => "Extracting archive",
            Stage::Merge => "Merging loader sources",
            Stage::Patch => "Patching game script",
            Stage::Repack => "Updating archive",
        };
        f.write_str(label)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct InjectReport {
    pub archive: PathBuf,
    /// First line of `version.jkr`, when the archive has one
    pub game_version: Option<String>,
    pub merge: MergeReport,
    pub patch: PatchOutcome,
}

/// Injects loader sources into one archive
pub struct Injector<'a> {
    archiver: &'a dyn Archiver,
    config: &'a InjectConfig,
    sources_dir: PathBuf,
    force: bool,
}

impl<'a> Injector<'a> {
    /// `sources_dir` holds the configured source directories
    pub fn new(
        archiver: &'a dyn Archiver,
        config: &'a InjectConfig,
        sources_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            archiver,
            config,
            sources_dir: sources_dir.into(),
            force: false,
        }
    }

    /// Inject even when the game script already calls the loader
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Run the whole pipeline against `archive`, calling `on_stage` as stages begin
    pub fn run(&self, archive: &Path, on_stage: &mut dyn FnMut(Stage)) -> Result<InjectReport> {
        let archive = resolve_archive(archive)?;

        let work = temp::work_dir()?;
        tracing::debug!(
            archive = %archive.display(),
            work_dir = %work.path().display(),
            tool = %self.archiver.name(),
            "starting injection"
        );

        on_stage(Stage::Extract);
        self.archiver.extract_all(&archive, work.path())?;
        tracing::info!("extracted {}", archive.display());

        let main_script = self.member(&archive, work.path(), &self.config.main_script)?;
        let game_script = self.member(&archive, work.path(), &self.config.game_script)?;

        let game_version = read_game_version(work.path());
        match &game_version {
            Some(version) => tracing::info!(version = %version, "detected game version"),
            None => tracing::debug!("no {} in archive, game version unknown", VERSION_FILE),
        }

        if !self.force {
            let game_text = read_script(&game_script)?;
            if patch::is_patched(&game_text, &self.config.anchor, &self.config.insertion) {
                return Err(InjectorError::AlreadyPatched {
                    archive: archive.display().to_string(),
                });
            }
        }

        on_stage(Stage::Merge);
        let merge = merge::merge_into_script(&main_script, &self.sources_dir, self.config)?;

        on_stage(Stage::Patch);
        let patch = patch::patch_script(&game_script, &self.config.anchor, &self.config.insertion)?;

        if !patch.is_inserted() {
            tracing::debug!("repacking without a loader call in {}", self.config.game_script);
        }

        on_stage(Stage::Repack);
        self.archiver.update_members(
            &archive,
            work.path(),
            &[self.config.main_script.as_str(), self.config.game_script.as_str()],
        )?;
        tracing::info!("updated {}", archive.display());

        Ok(InjectReport {
            archive,
            game_version,
            merge,
            patch,
        })
    }

    fn member(&self, archive: &Path, root: &Path, name: &str) -> Result<PathBuf> {
        let path = root.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(InjectorError::MissingMember {
                member: name.to_string(),
                archive: archive.display().to_string(),
            })
        }
    }
}

/// Resolve the file 7-Zip should operate on.
///
/// A file is used as is (the Windows executable). A directory must be a macOS app
/// bundle, whose game archive is `Contents/Resources/Balatro.love`.
pub fn resolve_archive(path: &Path) -> Result<PathBuf> {
    let not_found = || InjectorError::ArchiveNotFound {
        path: path.display().to_string(),
    };
    let resolved = dunce::canonicalize(path).map_err(|_| not_found())?;

    if resolved.is_file() {
        return Ok(resolved);
    }
    if resolved.is_dir() {
        let bundled: PathBuf = BUNDLE_ARCHIVE.iter().fold(resolved, |p, part| p.join(part));
        if bundled.is_file() {
            tracing::debug!(archive = %bundled.display(), "using app bundle archive");
            return Ok(bundled);
        }
    }
    Err(not_found())
}

/// Game version from the extracted archive, if present
fn read_game_version(root: &Path) -> Option<String> {
    let text = std::fs::read_to_string(root.join(VERSION_FILE)).ok()?;
    text.lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
}
