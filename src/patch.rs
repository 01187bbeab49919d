//! Anchor patching
//!
//! Inserts a single line into the secondary script directly after the first line
//! containing the anchor text. The game's per-frame update contains exactly such a
//! line, so the inserted call runs once per frame after the game has updated its own
//! state.
//!
//! Lines keep their original terminators (`\n` or `\r\n`); the inserted line takes
//! the terminator of the anchor line.

use std::path::Path;

use crate::common::fs::{read_script, write_atomic};
use crate::error::Result;

/// What the patcher did to the script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Inserted after the anchor found on this 1-based line
    Inserted { line: usize },
    /// No line contains the anchor; the script was not rewritten
    AnchorNotFound,
}

impl PatchOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, PatchOutcome::Inserted { .. })
    }
}

fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Insert `insertion` after the first line containing `anchor`.
///
/// Returns the index of the anchor line, or `None` (with `lines` untouched) when no
/// line matches. Later occurrences of the anchor are ignored.
pub fn insert_after_anchor(lines: &mut Vec<String>, anchor: &str, insertion: &str) -> Option<usize> {
    let index = lines.iter().position(|line| line.contains(anchor))?;
    let ending = line_ending(&lines[index]);
    lines.insert(index + 1, format!("{insertion}{ending}"));
    Some(index)
}

/// Whether the line right after the first anchor already is the insertion
pub fn is_patched(text: &str, anchor: &str, insertion: &str) -> bool {
    let mut lines = text.lines();
    if !lines.by_ref().any(|line| line.contains(anchor)) {
        return false;
    }
    lines
        .next()
        .is_some_and(|next| next.trim() == insertion.trim())
}

/// Patch the script at `path` in place.
///
/// The file is rewritten only after it was fully read and the anchor was found, and
/// the rewrite replaces the file in one step.
pub fn patch_script(path: &Path, anchor: &str, insertion: &str) -> Result<PatchOutcome> {
    let text = read_script(path)?;
    let mut lines: Vec<String> = text.split_inclusive('\n').map(String::from).collect();

    let Some(index) = insert_after_anchor(&mut lines, anchor, insertion) else {
        tracing::warn!(
            script = %path.display(),
            anchor,
            "anchor not found, leaving script unmodified"
        );
        return Ok(PatchOutcome::AnchorNotFound);
    };

    // Anchor on an unterminated last line: give it a newline so the insertion
    // lands on a line of its own.
    if line_ending(&lines[index]).is_empty() {
        lines[index].push('\n');
    }

    write_atomic(path, lines.concat().as_bytes())?;

    let line = index + 1;
    tracing::info!(script = %path.display(), line, "inserted loader call after anchor");
    Ok(PatchOutcome::Inserted { line })
}
