//! Common test utilities for injector integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// Stand-in for 7-Zip, run through /bin/sh.
///
/// A fake "archive" is a small file holding the path of a directory that stores the
/// members, so `x` copies that directory out and `a` copies files back in. Every `a`
/// call is appended to `<store>.updates`.
#[allow(dead_code)]
pub const FAKE_7Z: &str = r#"op="$1"; shift
case "$op" in
  x)
    store=$(cat "$1")
    out="${2#-o}"
    cp -R "$store"/. "$out"/
    ;;
  a)
    store=$(cat "$1")
    shift
    for f in "$@"; do cp "$f" "$store/$f"; done
    echo "$*" >> "$store.updates"
    ;;
  *)
    echo "unsupported operation: $op" >&2
    exit 7
    ;;
esac
"#;

/// A test workspace for integration tests
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Write the fake 7-Zip script and return its path
    pub fn fake_seven_zip(&self, script: &str) -> PathBuf {
        self.write_file("tools/fake7z.sh", script);
        self.path.join("tools/fake7z.sh")
    }

    /// Create a fake game archive `Balatro.exe` whose members live in `store/`
    pub fn game_archive(&self, members: &[(&str, &str)]) -> PathBuf {
        let store = self.path.join("store");
        std::fs::create_dir_all(&store).expect("Failed to create archive store");
        for (name, content) in members {
            self.write_file(&format!("store/{}", name), content);
        }
        let archive = self.path.join("Balatro.exe");
        std::fs::write(&archive, store.display().to_string())
            .expect("Failed to write archive manifest");
        archive
    }

    /// Read a member of the fake game archive
    pub fn archive_member(&self, name: &str) -> String {
        self.read_file(&format!("store/{}", name))
    }

    /// Update calls the fake 7-Zip received, one line per call
    pub fn archive_updates(&self) -> Vec<String> {
        std::fs::read_to_string(self.path.join("store.updates"))
            .map(|log| log.lines().map(String::from).collect())
            .unwrap_or_default()
    }

    /// Write a loader source fragment under `sources/`
    pub fn source(&self, path: &str, content: &str) {
        self.write_file(&format!("sources/{}", path), content);
    }

    /// Directory holding the loader source directories
    pub fn sources_dir(&self) -> PathBuf {
        self.path.join("sources")
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Command for the injector binary with a clean environment
#[allow(deprecated, dead_code)]
pub fn injector_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("steamodded-injector").unwrap();
    cmd.env_remove("STEAMODDED_7Z").env_remove("LOG_LEVEL");
    cmd
}

/// `inject` command for the workspace's fake archive, using the fake 7-Zip
#[allow(dead_code)]
pub fn inject_cmd(workspace: &TestWorkspace, seven_zip: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = injector_cmd();
    cmd.arg("inject")
        .arg(workspace.path.join("Balatro.exe"))
        .arg("--launcher")
        .arg("/bin/sh")
        .arg("--seven-zip")
        .arg(seven_zip)
        .arg("--sources")
        .arg(workspace.sources_dir());
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_file_operations() {
        let workspace = TestWorkspace::new();
        workspace.write_file("test/file.txt", "hello");
        assert!(workspace.file_exists("test/file.txt"));
        assert_eq!(workspace.read_file("test/file.txt"), "hello");
    }

    #[test]
    fn test_game_archive_points_at_store() {
        let workspace = TestWorkspace::new();
        let archive = workspace.game_archive(&[("main.lua", "-- boot\n")]);

        let manifest = std::fs::read_to_string(archive).unwrap();
        assert_eq!(PathBuf::from(manifest), workspace.path.join("store"));
        assert_eq!(workspace.archive_member("main.lua"), "-- boot\n");
        assert!(workspace.archive_updates().is_empty());
    }
}
