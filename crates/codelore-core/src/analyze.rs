//! Request orchestration — the one operation the HTTP layer calls.
//!
//! Collects the file's content, history, and neighborhood, selects a
//! provider, and dispatches. Degradation rules: a missing repository means
//! zero commits, a failing co-change scan means imports only, a missing
//! hosted API key means a mock response. Only an unreadable file or a
//! configured-but-broken local server stops the request.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use codelore_config::AppConfig;

use crate::history::{self, HistoryError};
use crate::imports;
use crate::llm::{self, AnalysisInput, AnalysisResult, ProviderError, RelatedFiles};
use crate::source::{self, SourceError};

/// How many imports and co-changed files reach the provider.
const RELATED_CAP: usize = 5;

/// One analysis request, as the HTTP layer hands it over.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeRequest {
    /// Repository root. Empty or nonexistent falls back to the file's
    /// parent directory.
    pub repo_path: String,
    /// Absolute path of the file to analyze.
    pub file_path: String,
    /// Snippet the user highlighted, if any.
    pub selected_code: Option<String>,
    /// Commit cap override; the config default applies when absent.
    pub commit_limit: Option<usize>,
    /// Provider name override ("hosted", "ollama", "localai").
    pub provider: Option<String>,
    /// Model override for the selected provider.
    pub model: Option<String>,
}

/// Errors surfaced to the caller of [`analyze_file`].
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("file does not exist: {0}")]
    FileNotFound(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    /// The selected local provider failed its availability probe.
    #[error("local LLM server not running: {hint}")]
    ProviderUnavailable { provider: &'static str, hint: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Analyze one file and return the canonical result.
pub async fn analyze_file(
    config: &AppConfig,
    request: &AnalyzeRequest,
) -> Result<AnalysisResult, AnalyzeError> {
    let file_path = Path::new(&request.file_path);
    if !file_path.exists() {
        return Err(AnalyzeError::FileNotFound(request.file_path.clone()));
    }

    let repo_path = resolve_repo_path(&request.repo_path, file_path);
    info!(file = %request.file_path, repo = %repo_path.display(), "analyzing file");

    let limit = request.commit_limit.unwrap_or(config.git.commit_limit);
    let commits = match history::commit_history(&repo_path, file_path, limit).await {
        Ok(commits) => {
            if commits.is_empty() {
                warn!("no commit history found for this file");
            }
            commits
        }
        Err(HistoryError::NotARepository(path)) => {
            warn!(repo = %path, "not a Git repository, continuing with file-only analysis");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "git unavailable, continuing with file-only analysis");
            Vec::new()
        }
    };

    let file_content = source::read_capped(file_path, config.git.max_file_lines).await?;

    let mut import_list = imports::extract_imports(&file_content, &request.file_path);
    import_list.truncate(RELATED_CAP);

    let rel_path = history::relative_path(&repo_path, file_path);
    let mut co_changed =
        history::co_changed_files(&repo_path, &rel_path, config.git.co_change_window).await;
    co_changed.truncate(RELATED_CAP);

    let mut llm_config = config.llm.clone();
    if let Some(ref model) = request.model {
        llm_config.model = model.clone();
    }
    let provider = llm::create_provider(request.provider.as_deref(), &llm_config);
    info!(provider = provider.name(), commits = commits.len(), "dispatching to LLM provider");

    // A dead local server is a setup error worth surfacing; the hosted
    // provider degrades to a mock instead.
    if !provider.is_available().await {
        match provider.name() {
            "ollama" => {
                return Err(AnalyzeError::ProviderUnavailable {
                    provider: "ollama",
                    hint: llm::ollama::START_HINT.to_string(),
                });
            }
            "localai" => {
                return Err(AnalyzeError::ProviderUnavailable {
                    provider: "localai",
                    hint: llm::localai::START_HINT.to_string(),
                });
            }
            _ => warn!(provider = provider.name(), "provider not configured"),
        }
    }

    let input = AnalysisInput {
        file_path: request.file_path.clone(),
        file_content,
        commits,
        related: RelatedFiles {
            imports: import_list,
            co_changed,
        },
        selected_code: request.selected_code.clone(),
    };

    Ok(provider.generate(&input).await?)
}

fn resolve_repo_path(repo_path: &str, file_path: &Path) -> PathBuf {
    if !repo_path.is_empty() && Path::new(repo_path).exists() {
        return PathBuf::from(repo_path);
    }
    file_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
