//! Scoped working directories for a single injection run
//!
//! Extracted archive contents are handed to an external tool whose working directory
//! differs from ours, so the base is always absolute (even with TMPDIR=tmp or
//! TMPDIR=./tmp).

use std::env;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::error::{InjectorError, Result};

/// Prefix of every working directory the injector creates
pub const WORK_DIR_PREFIX: &str = "steamodded-";

/// Returns an absolute directory suitable for creating temporary directories.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        return t;
    }

    #[cfg(windows)]
    {
        env::var("TEMP")
            .or_else(|_| env::var("TMP"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/tmp")
    }
}

/// Create the working directory for one run.
///
/// The directory and everything extracted into it is removed when the returned
/// [`TempDir`] is dropped, on success and on error alike.
pub fn work_dir() -> Result<TempDir> {
    let base = temp_dir_base();
    tempfile::Builder::new()
        .prefix(WORK_DIR_PREFIX)
        .tempdir_in(&base)
        .map_err(|e| InjectorError::IoError {
            message: format!(
                "Failed to create working directory in {}: {}",
                base.display(),
                e
            ),
        })
}
