//! Scratch Git repositories for history tests.
//!
//! Creates a throwaway repository with a fixed author identity so tests
//! do not depend on global git configuration. Tests should skip politely
//! when the `git` binary is unavailable.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// A temporary Git repository, removed on drop.
pub struct ScratchRepo {
    dir: TempDir,
}

impl ScratchRepo {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` and commit it with the given message.
    pub fn commit_file(&self, name: &str, content: &str, message: &str) -> PathBuf {
        let file = self.dir.path().join(name);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&file, content).expect("write file");
        self.git(&["add", "."]);
        self.git(&[
            "-c",
            "user.name=Codelore Tests",
            "-c",
            "user.email=tests@codelore.invalid",
            "commit",
            "-m",
            message,
        ]);
        file
    }

    fn git(&self, args: &[&str]) {
        let status = Command::new("git")
            .arg("-C")
            .arg(self.dir.path())
            .args(args)
            .output()
            .expect("run git");
        assert!(
            status.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&status.stderr)
        );
    }
}

/// Create a scratch repository, or `None` when git is not installed.
pub fn try_scratch_repo() -> Option<ScratchRepo> {
    let have_git = Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !have_git {
        return None;
    }

    let dir = TempDir::new().expect("create temp dir");
    let init = Command::new("git")
        .arg("-C")
        .arg(dir.path())
        .args(["init", "-q"])
        .output()
        .expect("run git init");
    if !init.status.success() {
        return None;
    }
    Some(ScratchRepo { dir })
}
