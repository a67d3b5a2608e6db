//! Common types for the analysis pipeline.
//!
//! These types define the shared vocabulary between the context collectors
//! (history, imports), the LLM providers, and the HTTP API: what goes into
//! an analysis and the one strict shape that always comes out.

use serde::{Deserialize, Serialize};

/// Provider-specific diagnostics attached to every [`AnalysisResult`].
///
/// Always contains `commits_analyzed` and `llm_provider`; providers add
/// extras such as `llm_model`, `mock_response`, or `parse_error`.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One commit that touched the analyzed file.
///
/// Produced by [`crate::history`]; read-only everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Abbreviated hash (7 characters).
    pub hash: String,
    /// Full hash.
    pub full_hash: String,
    /// Author name.
    pub author: String,
    /// Commit date, ISO-8601.
    pub date: String,
    /// Subject line of the commit message.
    pub message: String,
    /// Added plus deleted lines for the analyzed file in this commit.
    pub lines_changed: u32,
}

/// A file that historically changes in the same commits as the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoChangeEntry {
    pub path: String,
    /// How many commits touched both files. Entries are ordered by this,
    /// descending.
    pub frequency: u32,
}

/// Import and co-change neighborhood of the analyzed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedFiles {
    /// Files imported by the target, in source order.
    pub imports: Vec<String>,
    /// Files co-changed with the target, most frequent first.
    pub co_changed: Vec<CoChangeEntry>,
}

/// Everything a provider needs to analyze one file.
///
/// Constructed per request and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisInput {
    pub file_path: String,
    pub file_content: String,
    /// Newest-first, bounded by the request's commit limit.
    pub commits: Vec<CommitRecord>,
    pub related: RelatedFiles,
    /// Snippet the user highlighted, sent to the backend in full.
    pub selected_code: Option<String>,
}

impl AnalysisInput {
    /// A minimal input with just a path and content.
    pub fn new(file_path: impl Into<String>, file_content: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            file_content: file_content.into(),
            ..Self::default()
        }
    }
}

/// A design decision surfaced from commit history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignDecision {
    /// Short title of the decision.
    pub title: String,
    /// One-line explanation.
    pub description: String,
    /// Commit hashes backing this decision.
    #[serde(default)]
    pub commits: Vec<String>,
}

/// A file a developer should read next, with the reason why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedFile {
    pub path: String,
    pub reason: String,
}

/// The canonical analysis record, identical in shape across all providers
/// and fallback tiers.
///
/// Every call that returns at all returns one of these fully populated —
/// callers never see a raw backend payload or a missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 2-3 sentence summary of what the file does. Never empty.
    pub summary: String,
    /// Key design decisions from Git history, at most 3.
    #[serde(default)]
    pub decisions: Vec<DesignDecision>,
    /// Related files to read next, at most 3.
    #[serde(default)]
    pub related_files: Vec<RelatedFile>,
    /// Explanation of the selected code. Present only when the input
    /// carried a selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weird_code_explanation: Option<String>,
    /// Diagnostics: provider, model, commit count, fallback flags.
    #[serde(default)]
    pub metadata: Metadata,
}

/// The fields the model itself fills in, without metadata.
///
/// This is the wire shape the hosted backend is asked to enforce; the
/// normalizer upgrades it to an [`AnalysisResult`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelPayload {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub decisions: Vec<DesignDecision>,
    #[serde(default)]
    pub related_files: Vec<RelatedFile>,
    #[serde(default)]
    pub weird_code_explanation: Option<String>,
}
