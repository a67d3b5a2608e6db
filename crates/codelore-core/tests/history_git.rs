//! History collection against a real scratch repository.
//!
//! Skips quietly when the `git` binary is unavailable.

use codelore_core::history::{co_changed_files, commit_history, relative_path};
use codelore_test_utils::repo::try_scratch_repo;

#[tokio::test]
async fn commit_history_reads_real_commits_newest_first() {
    let Some(repo) = try_scratch_repo() else {
        return;
    };

    repo.commit_file("src/sort.py", "def sort(xs):\n    return xs\n", "initial sort");
    let file = repo.commit_file(
        "src/sort.py",
        "def sort(xs):\n    return sorted(xs)\n",
        "use builtin sorted",
    );

    let commits = commit_history(repo.path(), &file, 50).await.unwrap();

    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].message, "use builtin sorted");
    assert_eq!(commits[1].message, "initial sort");
    assert_eq!(commits[0].hash.len(), 7);
    assert_eq!(commits[0].author, "Codelore Tests");
    assert!(commits[0].full_hash.starts_with(&commits[0].hash));
    // ISO-8601 author date
    assert!(commits[0].date.contains('T'), "date: {}", commits[0].date);
    // One line replaced: one added, one deleted
    assert_eq!(commits[0].lines_changed, 2);
}

#[tokio::test]
async fn commit_history_respects_limit() {
    let Some(repo) = try_scratch_repo() else {
        return;
    };

    for i in 0..5 {
        repo.commit_file("notes.md", &format!("rev {i}\n"), &format!("rev {i}"));
    }
    let file = repo.path().join("notes.md");

    let commits = commit_history(repo.path(), &file, 3).await.unwrap();
    assert_eq!(commits.len(), 3);
    assert_eq!(commits[0].message, "rev 4");
}

#[tokio::test]
async fn co_changed_files_rank_shared_commits() {
    let Some(repo) = try_scratch_repo() else {
        return;
    };

    // heap.py changes alongside sort.py twice, cmp.py once
    repo.commit_file("sort.py", "a\n", "c1");
    repo.commit_file("heap.py", "b\n", "c2");
    std::fs::write(repo.path().join("sort.py"), "a2\n").unwrap();
    std::fs::write(repo.path().join("heap.py"), "b2\n").unwrap();
    repo.commit_file("cmp.py", "c\n", "c3 touches all three");
    std::fs::write(repo.path().join("sort.py"), "a3\n").unwrap();
    repo.commit_file("heap.py", "b3\n", "c4 touches sort and heap");

    let file = repo.path().join("sort.py");
    let rel = relative_path(repo.path(), &file);
    let entries = co_changed_files(repo.path(), &rel, 100).await;

    assert_eq!(entries[0].path, "heap.py");
    assert_eq!(entries[0].frequency, 2);
    assert!(entries.iter().any(|e| e.path == "cmp.py" && e.frequency == 1));
    assert!(entries.iter().all(|e| e.path != "sort.py"));
}
