//! Request/response types for the HTTP API.
//!
//! Serialized as JSON between the editor extension and the server. The
//! analysis response itself is the canonical
//! [`AnalysisResult`](crate::llm::AnalysisResult) from the core.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body of `POST /context/file`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeFileRequest {
    /// Absolute path to the Git repository root. Optional; the file's
    /// directory is used as a fallback.
    #[serde(default)]
    pub repo_path: String,

    /// Absolute path to the file to analyze.
    pub file_path: String,

    /// Optional selected code snippet to explain.
    #[serde(default)]
    pub selected_code: Option<String>,

    /// Maximum number of commits to analyze (1..=100).
    #[serde(default)]
    pub commit_limit: Option<usize>,

    /// Provider override ("hosted", "ollama", "localai").
    #[serde(default)]
    pub llm_provider: Option<String>,

    /// Model override for the selected provider.
    #[serde(default)]
    pub llm_model: Option<String>,
}

/// Basic liveness response for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Detailed health response for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub git_hash: String,
    pub build_profile: String,
    /// The configured default provider.
    pub llm_provider: String,
    /// Probe result per provider.
    pub available_providers: BTreeMap<String, bool>,
}

/// Generic error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
