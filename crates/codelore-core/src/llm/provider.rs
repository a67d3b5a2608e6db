//! Analysis provider trait — the core abstraction over LLM backends.
//!
//! All backends (hosted API, Ollama, LocalAI) implement this trait. The
//! HTTP layer and CLI dispatch through it and only ever see the canonical
//! [`AnalysisResult`] shape.

use crate::BoxFuture;

use super::types::{AnalysisInput, AnalysisResult};

/// Errors from analysis provider calls.
///
/// Only failures of the transport to a configured backend surface here;
/// malformed replies are absorbed by the normalizer and a missing API key
/// degrades to a mock response instead.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A local server the user configured is not reachable. Carries a
    /// remediation hint ("start Ollama with: ollama serve").
    #[error("local LLM server not running: {hint}")]
    Unreachable { provider: &'static str, hint: String },

    /// A local server accepted the connection but did not answer in time.
    #[error("local LLM server timed out: {hint}")]
    Timeout { provider: &'static str, hint: String },

    /// The backend answered with an unexpected status code.
    #[error("{provider} request failed with status {status}: {message}")]
    Upstream {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// Transport-level failure that is neither a refused connection nor a
    /// timeout.
    #[error("network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// The provider this error originated from.
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::Unreachable { provider, .. }
            | ProviderError::Timeout { provider, .. }
            | ProviderError::Upstream { provider, .. } => provider,
            ProviderError::Network(_) => "unknown",
        }
    }
}

/// Core trait for analysis providers.
///
/// Implementations must be `Send + Sync` for use in the async server.
/// Uses `BoxFuture` for object safety (allows `Box<dyn AnalysisProvider>`).
/// Providers are stateless beyond their configuration and are constructed
/// fresh per request.
pub trait AnalysisProvider: Send + Sync {
    /// Stable provider identifier ("hosted", "ollama", "localai").
    fn name(&self) -> &'static str;

    /// Capability probe. Hosted: is an API key configured. Local servers:
    /// does a lightweight endpoint answer within 5 seconds. Never errors —
    /// any failure is `false`.
    fn is_available(&self) -> BoxFuture<'_, bool>;

    /// Analyze one file. Always returns a fully populated
    /// [`AnalysisResult`] unless the transport to a configured local
    /// server fails (see [`ProviderError`]).
    fn generate(
        &self,
        input: &AnalysisInput,
    ) -> BoxFuture<'_, Result<AnalysisResult, ProviderError>>;
}

/// Timeout for availability probes, in seconds.
pub const PROBE_TIMEOUT_SECS: u64 = 5;
