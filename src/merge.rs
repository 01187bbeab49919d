//! Script merging
//!
//! Appends the loader source directories to the end of the primary script. The
//! original script content is never touched, only extended:
//!
//! ```text
//! <original main.lua>
//! \n<core dir: core.lua \n a.lua \n b.lua>
//! \n<debug dir: ...>
//! \n<loader dir: ...>
//! ```
//!
//! Within a directory the core fragment comes first and the remaining fragments
//! follow in file name order. Fragment order beyond "core first" is not something
//! the loader documents as significant; sorting keeps the output identical across
//! platforms and filesystems.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::common::fs::{read_script, write_atomic};
use crate::config::InjectConfig;
use crate::error::Result;

/// What one source directory contributed to the merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSummary {
    /// Directory name as configured
    pub name: String,

    /// Fragment file names, in emission order
    pub merged: Vec<String>,

    /// Fragments that could not be read and contributed nothing
    pub skipped: Vec<String>,

    /// Directory did not exist
    pub missing: bool,
}

/// Merged text of a single source directory
#[derive(Debug, Clone, Default)]
pub struct MergedDirectory {
    pub text: String,
    pub summary: SourceSummary,
}

/// Result of merging all source directories into the primary script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub sources: Vec<SourceSummary>,
}

impl MergeReport {
    /// Total number of fragments appended to the script
    pub fn fragment_count(&self) -> usize {
        self.sources.iter().map(|s| s.merged.len()).sum()
    }

    /// Names of source directories that were not found
    pub fn missing_sources(&self) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|s| s.missing)
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Whether any fragment had to be skipped
    pub fn has_skipped(&self) -> bool {
        self.sources.iter().any(|s| !s.skipped.is_empty())
    }
}

/// Concatenate the fragments of one source directory.
///
/// A missing directory yields empty text. Unreadable fragments are logged and left
/// out; they never abort the merge.
pub fn merge_directory(dir: &Path, config: &InjectConfig) -> MergedDirectory {
    let mut summary = SourceSummary {
        name: dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string()),
        ..SourceSummary::default()
    };

    if !dir.is_dir() {
        tracing::info!(dir = %dir.display(), "source directory not found, skipping");
        summary.missing = true;
        return MergedDirectory {
            text: String::new(),
            summary,
        };
    }

    tracing::debug!(dir = %dir.display(), "merging source directory");

    let extension = OsStr::new(&config.fragment_extension);
    let mut fragments: Vec<(String, PathBuf)> = Vec::new();
    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to list source entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name != config.core_fragment && entry.path().extension() != Some(extension) {
            continue;
        }
        fragments.push((file_name, entry.into_path()));
    }

    let core_index = {
        let names: Vec<&str> = fragments.iter().map(|(name, _)| name.as_str()).collect();
        let core_exists = dir.join(&config.core_fragment).is_file();
        core_position(&names, &config.core_fragment, core_exists)
    };
    if let Some(index) = core_index {
        let core = fragments.remove(index);
        fragments.insert(0, core);
    }

    let mut pieces: Vec<String> = Vec::new();
    for (file_name, path) in &fragments {
        read_fragment(path, file_name, &mut pieces, &mut summary);
    }

    MergedDirectory {
        text: pieces.join("\n"),
        summary,
    }
}

/// Index of the core fragment among the listed file names.
///
/// An exact name wins. When `core_exists` says the filesystem resolves the core name
/// but no listed name equals it, the filesystem is case-insensitive and the entry is
/// the one matching without regard to ASCII case.
fn core_position(names: &[&str], core_fragment: &str, core_exists: bool) -> Option<usize> {
    names
        .iter()
        .position(|name| *name == core_fragment)
        .or_else(|| {
            core_exists
                .then(|| {
                    names
                        .iter()
                        .position(|name| name.eq_ignore_ascii_case(core_fragment))
                })
                .flatten()
        })
}

fn read_fragment(
    path: &Path,
    file_name: &str,
    pieces: &mut Vec<String>,
    summary: &mut SourceSummary,
) {
    match fs::read_to_string(path) {
        Ok(content) => {
            tracing::debug!(fragment = %path.display(), "appended fragment");
            pieces.push(content);
            summary.merged.push(file_name.to_string());
        }
        Err(e) => {
            tracing::warn!(fragment = %path.display(), error = %e, "failed to read fragment, skipping");
            summary.skipped.push(file_name.to_string());
        }
    }
}

/// Append every configured source directory under `base_dir` to `script`.
///
/// Each directory contributes a newline followed by its merged text, in
/// `config.source_dirs` order. The script is rewritten in place.
///
/// Running this twice appends the sources twice; callers that may see an already
/// patched archive must check before merging.
pub fn merge_into_script(
    script: &Path,
    base_dir: &Path,
    config: &InjectConfig,
) -> Result<MergeReport> {
    tracing::info!(
        script = %script.display(),
        base = %base_dir.display(),
        dirs = ?config.source_dirs,
        "merging loader sources"
    );

    let mut content = read_script(script)?;
    let mut report = MergeReport::default();

    for dir_name in &config.source_dirs {
        let merged = merge_directory(&base_dir.join(dir_name), config);
        content.push('\n');
        content.push_str(&merged.text);
        report.sources.push(SourceSummary {
            name: dir_name.clone(),
            ..merged.summary
        });
    }

    write_atomic(script, content.as_bytes())?;

    tracing::info!(
        fragments = report.fragment_count(),
        "merged loader sources into {}",
        script.display()
    );
    Ok(report)
}
