//! LLM provider integration — pluggable backends for file analysis.
//!
//! Codelore supports multiple backends through a unified
//! [`AnalysisProvider`] trait. Currently supported:
//!
//! - **Hosted** — cloud API behind an OpenAI-compatible endpoint with a
//!   JSON response contract; requires an API key
//! - **Ollama** — self-hosted server with a custom generate endpoint
//! - **LocalAI** — self-hosted OpenAI-compatible chat server
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐
//! │ HTTP handler │────▶│ AnalysisProvider │  (trait)
//! └──────────────┘     └────────┬─────────┘
//!                               │
//!              ┌────────────────┼────────────────┐
//!              ▼                ▼                ▼
//!      ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//!      │    Hosted    │ │    Ollama    │ │   LocalAI    │
//!      │  (cloud API) │ │ (/api/gen..) │ │ (/v1/chat..) │
//!      └──────────────┘ └──────────────┘ └──────────────┘
//! ```
//!
//! Whatever a backend returns, [`normalize`] turns it into one strict
//! [`AnalysisResult`] shape. Selection never fails: unknown names fall
//! back to the hosted provider with a warning.

pub mod hosted;
pub mod localai;
pub mod normalize;
pub mod ollama;
pub mod prompt;
pub mod provider;
pub mod truncate;
pub mod types;

use std::collections::BTreeMap;

use tracing::warn;

use codelore_config::{LlmConfig, LlmProviderKind};

pub use hosted::HostedProvider;
pub use localai::LocalAiProvider;
pub use ollama::OllamaProvider;
pub use provider::{AnalysisProvider, ProviderError};
pub use types::*;

/// Create an analysis provider.
///
/// Resolution order: the explicit `name` (from the request), else the
/// config default, else hosted. Unknown names fall back to hosted with a
/// warning — selection must never fail. Each call returns a fresh
/// instance; providers hold nothing but their configuration.
pub fn create_provider(name: Option<&str>, config: &LlmConfig) -> Box<dyn AnalysisProvider> {
    let kind = match name {
        Some(n) => LlmProviderKind::from_name(n).unwrap_or_else(|| {
            warn!(name = n, "unknown provider name, falling back to hosted");
            LlmProviderKind::Hosted
        }),
        None => config.provider,
    };

    match kind {
        LlmProviderKind::Hosted => Box::new(HostedProvider::from_config(config)),
        LlmProviderKind::Ollama => Box::new(OllamaProvider::from_config(config)),
        LlmProviderKind::LocalAi => Box::new(LocalAiProvider::from_config(config)),
    }
}

/// Probe every provider and report who is reachable.
///
/// Diagnostics only — request handling checks just the selected provider.
pub async fn available_providers(config: &LlmConfig) -> BTreeMap<String, bool> {
    let mut map = BTreeMap::new();
    for kind in [
        LlmProviderKind::Hosted,
        LlmProviderKind::Ollama,
        LlmProviderKind::LocalAi,
    ] {
        let provider = create_provider(Some(kind.as_str()), config);
        map.insert(kind.as_str().to_string(), provider.is_available().await);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_by_name() {
        let config = LlmConfig::default();
        assert_eq!(create_provider(Some("hosted"), &config).name(), "hosted");
        assert_eq!(create_provider(Some("ollama"), &config).name(), "ollama");
        assert_eq!(create_provider(Some("localai"), &config).name(), "localai");
    }

    #[test]
    fn test_create_provider_config_default() {
        let config = LlmConfig {
            provider: LlmProviderKind::Ollama,
            ..LlmConfig::default()
        };
        assert_eq!(create_provider(None, &config).name(), "ollama");
    }

    #[test]
    fn test_unknown_name_falls_back_to_hosted() {
        let config = LlmConfig {
            provider: LlmProviderKind::Ollama,
            ..LlmConfig::default()
        };
        // Explicit but bogus name wins over the config default, then falls
        // back to hosted.
        assert_eq!(create_provider(Some("chatgpt9000"), &config).name(), "hosted");
    }

    #[test]
    fn test_name_matching_is_case_insensitive() {
        let config = LlmConfig::default();
        assert_eq!(create_provider(Some("Ollama"), &config).name(), "ollama");
    }

    #[tokio::test]
    async fn test_available_providers_covers_all_backends() {
        // Point the local backends at a dead port so the probe fails fast.
        let config = LlmConfig {
            api_base: Some("http://127.0.0.1:1".to_string()),
            ..LlmConfig::default()
        };
        let map = available_providers(&config).await;

        assert_eq!(map.len(), 3);
        assert_eq!(map.get("hosted"), Some(&false)); // no key configured
        assert_eq!(map.get("ollama"), Some(&false));
        assert_eq!(map.get("localai"), Some(&false));
    }
}
