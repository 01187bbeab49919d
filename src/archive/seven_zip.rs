//! 7-Zip command line backend
//!
//! Commands issued:
//!
//! - extract: `7z x <archive> -o<dir> -y`
//! - update:  `7z a <archive> <member>...` with the extraction root as working
//!   directory, so members are stored under their archive-relative names
//!
//! `a` replaces members with the same name, which is what makes the round trip
//! leave the rest of the archive alone. Both scripts go into one `a` call so an
//! interrupted run cannot leave only one of them updated.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::Archiver;
use crate::error::{InjectorError, Result};

/// Executable names searched for on PATH, in order of preference
#[cfg(windows)]
pub const CANDIDATES: &[&str] = &["7z.exe", "7za.exe"];
#[cfg(not(windows))]
pub const CANDIDATES: &[&str] = &["7zz", "7z", "7za"];

#[cfg(windows)]
const WELL_KNOWN: &[&str] = &[
    "C:\\Program Files\\7-Zip\\7z.exe",
    "C:\\Program Files (x86)\\7-Zip\\7z.exe",
];

/// A runnable 7-Zip executable
#[derive(Debug, Clone)]
pub struct SevenZip {
    /// What is spawned: 7-Zip itself, or a launcher such as `wine`
    program: PathBuf,
    /// Arguments placed before the 7-Zip operation (the tool path when launched)
    leading_args: Vec<OsString>,
}

impl SevenZip {
    /// Use the 7-Zip executable at `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Run `tool` through `launcher`, e.g. a Windows 7z.exe through `wine`
    pub fn launched_by(launcher: impl Into<PathBuf>, tool: impl Into<PathBuf>) -> Self {
        Self {
            program: launcher.into(),
            leading_args: vec![tool.into().into_os_string()],
        }
    }

    /// Resolve the 7-Zip executable.
    ///
    /// An explicit path wins; a bare name is looked up on PATH. Without one, the
    /// [`CANDIDATES`] are searched on PATH, then the default install locations.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        let path_var = env::var_os("PATH").unwrap_or_default();

        if let Some(path) = explicit {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "using configured 7-Zip");
                return Ok(Self::new(path));
            }
            let is_bare_name = path.components().count() == 1;
            if let Some(found) = is_bare_name
                .then(|| path.to_str())
                .flatten()
                .and_then(|name| find_in_path(&[name], &path_var))
            {
                tracing::debug!(path = %found.display(), "using configured 7-Zip from PATH");
                return Ok(Self::new(found));
            }
            return Err(InjectorError::ToolNotFound {
                tried: path.display().to_string(),
            });
        }

        if let Some(found) = find_in_path(CANDIDATES, &path_var) {
            tracing::debug!(path = %found.display(), "found 7-Zip on PATH");
            return Ok(Self::new(found));
        }

        #[cfg(windows)]
        for known in WELL_KNOWN {
            let path = Path::new(known);
            if path.is_file() {
                tracing::debug!(path = %path.display(), "found 7-Zip in default location");
                return Ok(Self::new(path));
            }
        }

        Err(InjectorError::ToolNotFound {
            tried: CANDIDATES.join(", "),
        })
    }

    /// The executable that gets spawned
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, args: &[&OsStr], cwd: Option<&Path>) -> std::result::Result<(), String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        tracing::debug!(program = %self.program.display(), ?args, "running 7-Zip");
        let output = cmd
            .output()
            .map_err(|e| format!("failed to run {}: {}", self.program.display(), e))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            tracing::trace!("7z: {}", line);
        }

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            Err(format!("7-Zip exited with {}", output.status))
        } else {
            Err(format!("7-Zip exited with {}: {}", output.status, stderr))
        }
    }
}

impl Archiver for SevenZip {
    fn name(&self) -> String {
        match self.leading_args.first() {
            Some(tool) => format!(
                "{} via {}",
                Path::new(tool).display(),
                self.program.display()
            ),
            None => self.program.display().to_string(),
        }
    }

    fn extract_all(&self, archive: &Path, dest: &Path) -> Result<()> {
        let mut output_dir = OsString::from("-o");
        output_dir.push(dest);

        self.run(
            &[
                OsStr::new("x"),
                archive.as_os_str(),
                &output_dir,
                OsStr::new("-y"),
            ],
            None,
        )
        .map_err(|reason| InjectorError::ExtractFailed {
            archive: archive.display().to_string(),
            reason,
        })
    }

    fn update_members(&self, archive: &Path, root: &Path, members: &[&str]) -> Result<()> {
        let update_failed = |reason: String| InjectorError::UpdateFailed {
            archive: archive.display().to_string(),
            reason,
        };

        // The tool runs inside `root`, so a relative archive path would point elsewhere.
        let archive_abs = std::path::absolute(archive).map_err(|e| update_failed(e.to_string()))?;

        let mut args: Vec<&OsStr> = vec![OsStr::new("a"), archive_abs.as_os_str()];
        args.extend(members.iter().map(OsStr::new));

        self.run(&args, Some(root)).map_err(update_failed)
    }
}

/// Find the first of `candidates` present as an executable file in `path_var`.
///
/// Candidates are tried in order, each across every PATH entry, so an earlier
/// candidate anywhere on PATH beats a later one.
pub fn find_in_path(candidates: &[&str], path_var: &OsStr) -> Option<PathBuf> {
    let dirs: Vec<PathBuf> = env::split_paths(path_var).collect();
    candidates
        .iter()
        .flat_map(|name| dirs.iter().map(move |dir| dir.join(name)))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// A stand-in for 7-Zip whose "archives" are plain directories
    const FAKE_7Z: &str = r#"#!/bin/sh
op="$1"; shift
case "$op" in
  x) archive="$1"; out="${2#-o}"; cp -R "$archive"/. "$out"/ ;;
  a) archive="$1"; shift; for f in "$@"; do cp "$f" "$archive/$f"; done; echo "$*" >> "$archive.log" ;;
  *) echo "unknown operation $op" >&2; exit 7 ;;
esac
"#;

    fn write_executable(path: &Path, content: &str) {
        fs::write(path, content).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Launch the fake through /bin/sh so the script itself never needs exec
    fn fake_seven_zip(temp: &TempDir, script: &str) -> SevenZip {
        let path = temp.path().join("fake7z.sh");
        fs::write(&path, script).unwrap();
        SevenZip::launched_by("/bin/sh", path)
    }

    #[test]
    fn test_find_in_path_prefers_candidate_order() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("a");
        let second = temp.path().join("b");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        write_executable(&first.join("7z"), "");
        write_executable(&second.join("7zz"), "");

        let path_var = env::join_paths([&first, &second]).unwrap();
        let found = find_in_path(&["7zz", "7z"], &path_var).unwrap();

        assert_eq!(found, second.join("7zz"));
    }

    #[test]
    fn test_find_in_path_skips_non_executable() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("7zz"), "").unwrap();

        let path_var = temp.path().as_os_str().to_os_string();
        assert!(find_in_path(&["7zz"], &path_var).is_none());
    }

    #[test]
    fn test_locate_explicit_file() {
        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("my7z");
        write_executable(&tool, "");

        let seven_zip = SevenZip::locate(Some(&tool)).unwrap();
        assert_eq!(seven_zip.program(), tool.as_path());
    }

    #[test]
    fn test_locate_explicit_missing() {
        let temp = TempDir::new().unwrap();
        let result = SevenZip::locate(Some(&temp.path().join("nope/7zz")));

        match result {
            Err(InjectorError::ToolNotFound { tried }) => assert!(tried.contains("nope")),
            other => panic!("Expected ToolNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_and_update_round_trip() {
        let temp = TempDir::new().unwrap();
        let seven_zip = fake_seven_zip(&temp, FAKE_7Z);

        let archive = temp.path().join("Balatro.exe");
        fs::create_dir_all(&archive).unwrap();
        fs::write(archive.join("main.lua"), "-- boot\n").unwrap();
        fs::write(archive.join("game.lua"), "game\n").unwrap();

        let work = temp.path().join("work");
        fs::create_dir_all(&work).unwrap();
        seven_zip.extract_all(&archive, &work).unwrap();
        assert_eq!(fs::read_to_string(work.join("main.lua")).unwrap(), "-- boot\n");

        fs::write(work.join("main.lua"), "patched main").unwrap();
        fs::write(work.join("game.lua"), "patched game").unwrap();
        seven_zip
            .update_members(&archive, &work, &["main.lua", "game.lua"])
            .unwrap();

        assert_eq!(fs::read_to_string(archive.join("main.lua")).unwrap(), "patched main");
        assert_eq!(fs::read_to_string(archive.join("game.lua")).unwrap(), "patched game");
        let log = fs::read_to_string(temp.path().join("Balatro.exe.log")).unwrap();
        assert_eq!(log.lines().collect::<Vec<_>>(), vec!["main.lua game.lua"]);
    }

    #[test]
    fn test_failure_carries_stderr() {
        let temp = TempDir::new().unwrap();
        let seven_zip = fake_seven_zip(&temp, "echo 'Can not open the file as archive' >&2\nexit 2\n");

        let result = seven_zip.extract_all(&temp.path().join("Balatro.exe"), temp.path());

        match result {
            Err(InjectorError::ExtractFailed { reason, .. }) => {
                assert!(reason.contains("Can not open the file as archive"));
            }
            other => panic!("Expected ExtractFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_update_failure_maps_to_update_failed() {
        let temp = TempDir::new().unwrap();
        let seven_zip = fake_seven_zip(&temp, "exit 2\n");

        let result = seven_zip.update_members(&temp.path().join("Balatro.exe"), temp.path(), &["main.lua"]);

        assert!(matches!(result, Err(InjectorError::UpdateFailed { .. })));
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        let seven_zip = SevenZip::new(temp.path().join("missing-7z"));

        let result = seven_zip.extract_all(&temp.path().join("Balatro.exe"), temp.path());

        match result {
            Err(InjectorError::ExtractFailed { reason, .. }) => {
                assert!(reason.contains("failed to run"));
            }
            other => panic!("Expected ExtractFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_name_mentions_launcher() {
        let seven_zip = SevenZip::launched_by("wine", "C:/7-Zip/7z.exe");
        assert_eq!(seven_zip.name(), "C:/7-Zip/7z.exe via wine");
    }
}
