//! Analysis input fixtures.
//!
//! Small, deterministic inputs for exercising providers and the
//! normalizer without touching a real repository.

use codelore_core::llm::{AnalysisInput, CoChangeEntry, CommitRecord, RelatedFiles};

/// A commit record with sensible defaults for tests.
pub fn commit(hash: &str, date: &str, message: &str) -> CommitRecord {
    CommitRecord {
        hash: hash.to_string(),
        full_hash: format!("{hash}{}", "0".repeat(40usize.saturating_sub(hash.len()))),
        author: "Test Author".to_string(),
        date: date.to_string(),
        message: message.to_string(),
        lines_changed: 10,
    }
}

/// Three commits, newest first — the canonical history fixture.
pub fn sample_commits() -> Vec<CommitRecord> {
    vec![
        commit("abc1234", "2026-03-01T09:00:00+00:00", "tune pivot selection"),
        commit("def5678", "2026-02-20T09:00:00+00:00", "initial sort implementation"),
        commit("aaa9999", "2026-02-01T09:00:00+00:00", "project scaffolding"),
    ]
}

/// An input with history, imports, and co-change data filled in.
pub fn input_with_history() -> AnalysisInput {
    AnalysisInput {
        file_path: "src/engine/sort.py".to_string(),
        file_content: "import heapq\n\ndef sort(xs):\n    return sorted(xs)\n".to_string(),
        commits: sample_commits(),
        related: RelatedFiles {
            imports: vec!["heapq.py".to_string()],
            co_changed: vec![CoChangeEntry {
                path: "src/engine/heap.py".to_string(),
                frequency: 4,
            }],
        },
        selected_code: None,
    }
}

/// An input with no history and no neighborhood at all.
pub fn bare_input() -> AnalysisInput {
    AnalysisInput::new("src/lonely.py", "print('hi')\n")
}
