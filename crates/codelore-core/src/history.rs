//! Git history collection — commit enumeration and co-change analysis.
//!
//! Shells out to the `git` CLI rather than linking a libgit2 binding; the
//! output formats used here are plumbing-stable. "Not a repository" is a
//! recoverable condition — callers treat it as zero commits. Any other git
//! failure degrades to an empty history with a warning.

use std::collections::HashMap;
use std::path::Path;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::llm::types::{CoChangeEntry, CommitRecord};

/// How many co-changed files to report, most frequent first.
const CO_CHANGE_TOP: usize = 10;

/// Field separator in `git log` format strings; never appears in subjects.
const FIELD_SEP: char = '\u{1f}';

/// Errors from history collection.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The given path is not inside a Git work tree. Recoverable: analyze
    /// without history.
    #[error("not a valid Git repository: {0}")]
    NotARepository(String),

    /// The `git` binary could not be executed at all.
    #[error("failed to run git: {0}")]
    Git(String),
}

/// Commits that touched `file_path`, newest first, at most `limit`.
pub async fn commit_history(
    repo_path: &Path,
    file_path: &Path,
    limit: usize,
) -> Result<Vec<CommitRecord>, HistoryError> {
    ensure_repository(repo_path).await?;

    let rel_path = relative_path(repo_path, file_path);
    debug!(file = %rel_path, limit, "querying commit history");

    let output = Command::new("git")
        .arg("-C")
        .arg(repo_path)
        .args(["log", "-n"])
        .arg(limit.to_string())
        .arg(format!("--format=%H{FIELD_SEP}%an{FIELD_SEP}%aI{FIELD_SEP}%s"))
        .args(["--numstat", "--"])
        .arg(&rel_path)
        .output()
        .await
        .map_err(|e| HistoryError::Git(e.to_string()))?;

    if !output.status.success() {
        warn!(file = %rel_path, "git log failed, treating as empty history");
        return Ok(Vec::new());
    }

    let commits = parse_commit_log(&String::from_utf8_lossy(&output.stdout));
    debug!(count = commits.len(), file = %rel_path, "commit history collected");
    Ok(commits)
}

/// Files that changed in the same commits as `rel_path`, ranked by how
/// often, within the last `window` commits touching the file.
///
/// Failures degrade to an empty list — co-change is an enrichment, never a
/// reason to fail a request.
pub async fn co_changed_files(
    repo_path: &Path,
    rel_path: &str,
    window: usize,
) -> Vec<CoChangeEntry> {
    let hashes = match commits_touching(repo_path, rel_path, window).await {
        Ok(hashes) if !hashes.is_empty() => hashes,
        Ok(_) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "error finding co-changed files");
            return Vec::new();
        }
    };

    let output = Command::new("git")
        .arg("-C")
        .arg(repo_path)
        .args(["log", "--no-walk=unsorted", "--name-only", "--format=%x01%H"])
        .args(&hashes)
        .output()
        .await;

    match output {
        Ok(out) if out.status.success() => {
            parse_name_only(&String::from_utf8_lossy(&out.stdout), rel_path)
        }
        Ok(_) | Err(_) => {
            warn!("git log --name-only failed, skipping co-change analysis");
            Vec::new()
        }
    }
}

/// Compute the path of `file_path` relative to the repository root, for
/// use as a git pathspec. Files outside the repo keep their full path.
pub fn relative_path(repo_path: &Path, file_path: &Path) -> String {
    file_path
        .strip_prefix(repo_path)
        .unwrap_or(file_path)
        .to_string_lossy()
        .into_owned()
}

async fn ensure_repository(repo_path: &Path) -> Result<(), HistoryError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_path)
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .await
        .map_err(|e| HistoryError::Git(e.to_string()))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(HistoryError::NotARepository(
            repo_path.display().to_string(),
        ))
    }
}

async fn commits_touching(
    repo_path: &Path,
    rel_path: &str,
    window: usize,
) -> Result<Vec<String>, HistoryError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_path)
        .args(["log", "-n"])
        .arg(window.to_string())
        .args(["--format=%H", "--"])
        .arg(rel_path)
        .output()
        .await
        .map_err(|e| HistoryError::Git(e.to_string()))?;

    if !output.status.success() {
        return Err(HistoryError::NotARepository(
            repo_path.display().to_string(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .filter(|l| !l.is_empty())
        .collect())
}

// ── Output parsers (pure) ───────────────────────────────────────────────

/// Parse `git log --format=%H<US>%an<US>%aI<US>%s --numstat` output.
///
/// Header lines carry the field separator; numstat lines are
/// `added<TAB>deleted<TAB>path` and accumulate into the current commit's
/// `lines_changed` (binary files report `-` and count as zero).
fn parse_commit_log(output: &str) -> Vec<CommitRecord> {
    let mut commits: Vec<CommitRecord> = Vec::new();

    for line in output.lines() {
        if line.contains(FIELD_SEP) {
            let mut fields = line.splitn(4, FIELD_SEP);
            let full_hash = fields.next().unwrap_or_default().to_string();
            let author = fields.next().unwrap_or_default().to_string();
            let date = fields.next().unwrap_or_default().to_string();
            let message = fields.next().unwrap_or_default().trim().to_string();

            commits.push(CommitRecord {
                hash: full_hash.chars().take(7).collect(),
                full_hash,
                author,
                date,
                message,
                lines_changed: 0,
            });
        } else if let Some(current) = commits.last_mut() {
            let mut cols = line.split('\t');
            let added = cols.next().and_then(|c| c.parse::<u32>().ok());
            let deleted = cols.next().and_then(|c| c.parse::<u32>().ok());
            if cols.next().is_some() {
                current.lines_changed += added.unwrap_or(0) + deleted.unwrap_or(0);
            }
        }
    }

    commits
}

/// Parse `git log --name-only --format=%x01%H` output into co-change
/// counts, excluding the target file itself. Ties order by path for
/// determinism.
fn parse_name_only(output: &str, skip: &str) -> Vec<CoChangeEntry> {
    let mut counts: HashMap<&str, u32> = HashMap::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('\u{1}') {
            continue;
        }
        if line != skip {
            *counts.entry(line).or_insert(0) += 1;
        }
    }

    let mut entries: Vec<CoChangeEntry> = counts
        .into_iter()
        .map(|(path, frequency)| CoChangeEntry {
            path: path.to_string(),
            frequency,
        })
        .collect();
    entries.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.path.cmp(&b.path)));
    entries.truncate(CO_CHANGE_TOP);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const US: char = '\u{1f}';

    #[test]
    fn test_parse_commit_log() {
        let output = format!(
            "1111111aaaaaaa{US}Alice{US}2026-03-01T09:00:00+00:00{US}tune pivot selection\n\
             \n\
             10\t2\tsrc/sort.rs\n\
             2222222bbbbbbb{US}Bob{US}2026-02-20T09:00:00+00:00{US}initial sort\n\
             \n\
             -\t-\tassets/logo.png\n\
             3\t0\tsrc/sort.rs\n"
        );
        let commits = parse_commit_log(&output);

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].hash, "1111111");
        assert_eq!(commits[0].full_hash, "1111111aaaaaaa");
        assert_eq!(commits[0].author, "Alice");
        assert_eq!(commits[0].date, "2026-03-01T09:00:00+00:00");
        assert_eq!(commits[0].message, "tune pivot selection");
        assert_eq!(commits[0].lines_changed, 12);
        // Binary numstat entries count as zero
        assert_eq!(commits[1].lines_changed, 3);
    }

    #[test]
    fn test_parse_commit_log_empty() {
        assert!(parse_commit_log("").is_empty());
    }

    #[test]
    fn test_parse_commit_log_subject_with_tabs() {
        let output = format!("abcdef0123456{US}Eve{US}2026-01-01T00:00:00+00:00{US}fix\tweird\tsubject\n");
        let commits = parse_commit_log(&output);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "fix\tweird\tsubject");
    }

    #[test]
    fn test_parse_name_only_ranks_by_frequency() {
        let output = "\u{1}aaa\nsrc/sort.rs\nsrc/heap.rs\nsrc/cmp.rs\n\
                      \u{1}bbb\nsrc/sort.rs\nsrc/heap.rs\n\
                      \u{1}ccc\nsrc/sort.rs\nsrc/heap.rs\n";
        let entries = parse_name_only(output, "src/sort.rs");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "src/heap.rs");
        assert_eq!(entries[0].frequency, 3);
        assert_eq!(entries[1].path, "src/cmp.rs");
        assert_eq!(entries[1].frequency, 1);
    }

    #[test]
    fn test_parse_name_only_excludes_target() {
        let output = "\u{1}aaa\nsrc/sort.rs\n";
        assert!(parse_name_only(output, "src/sort.rs").is_empty());
    }

    #[test]
    fn test_relative_path_inside_and_outside_repo() {
        let repo = Path::new("/work/repo");
        assert_eq!(relative_path(repo, Path::new("/work/repo/src/lib.rs")), "src/lib.rs");
        assert_eq!(relative_path(repo, Path::new("/elsewhere/lib.rs")), "/elsewhere/lib.rs");
    }

    #[tokio::test]
    async fn test_commit_history_rejects_non_repository() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("f.rs");
        tokio::fs::write(&file, "fn f() {}").await.unwrap();

        let result = commit_history(tmp.path(), &file, 10).await;
        // NotARepository normally; Git if the binary itself is missing
        assert!(matches!(
            result,
            Err(HistoryError::NotARepository(_)) | Err(HistoryError::Git(_))
        ));
    }

    #[tokio::test]
    async fn test_co_changed_files_degrade_outside_repository() {
        let tmp = tempfile::TempDir::new().unwrap();
        let entries = co_changed_files(tmp.path(), "f.rs", 100).await;
        assert!(entries.is_empty());
    }
}
