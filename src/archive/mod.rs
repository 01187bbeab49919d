//! Archive access
//!
//! The injector needs exactly two things from an archive: unpack everything into a
//! directory, and write a few files back over their existing members. [`Archiver`]
//! is that capability; [`SevenZip`] implements it by driving the 7-Zip command line
//! tool.

use std::path::Path;

use crate::error::Result;

pub mod seven_zip;

pub use seven_zip::SevenZip;

/// Extract-all and add-or-update operations on a container archive
pub trait Archiver {
    /// Short human readable name, used in logs and the run summary
    fn name(&self) -> String;

    /// Materialize the full archive content into `dest`
    fn extract_all(&self, archive: &Path, dest: &Path) -> Result<()>;

    /// Add or replace `members` in `archive` in a single update.
    ///
    /// Members are paths relative to `root` and are stored under those same relative
    /// names. Every other member of the archive is left as it was.
    fn update_members(&self, archive: &Path, root: &Path, members: &[&str]) -> Result<()>;
}
