//! Script file access with unified error handling

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{InjectorError, Result};

/// Read a whole script as UTF-8 text
pub fn read_script(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| InjectorError::ScriptReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Replace a file's content in one step.
///
/// The content goes to a sibling temp file which is then renamed over `path`, so a
/// failed write leaves the previous content in place rather than a truncated file.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let write_failed = |reason: String| InjectorError::ScriptWriteFailed {
        path: path.display().to_string(),
        reason,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_failed(e.to_string()))?;
    tmp.write_all(content)
        .and_then(|()| tmp.flush())
        .map_err(|e| write_failed(e.to_string()))?;

    if let Ok(metadata) = fs::metadata(path) {
        // Keep the original permissions; NamedTempFile is created 0600.
        let _ = fs::set_permissions(tmp.path(), metadata.permissions());
    }

    tmp.persist(path)
        .map_err(|e| write_failed(e.error.to_string()))?;
    Ok(())
}
