//! Ollama provider — self-hosted server with a custom generate endpoint.
//!
//! Sends a single prompt to `/api/generate` with `format: "json"` and
//! expects the returned `response` string to parse as JSON. A reply that
//! does not parse degrades through the normalizer; a server that cannot be
//! reached surfaces an error with a remediation hint, because a configured
//! but dead local server is a setup problem worth seeing.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use codelore_config::LlmConfig;

use crate::BoxFuture;

use super::normalize;
use super::prompt;
use super::provider::{AnalysisProvider, PROBE_TIMEOUT_SECS, ProviderError};
use super::truncate::{LOCAL_CHAR_BUDGET, truncate_to_chars};
use super::types::{AnalysisInput, AnalysisResult, Metadata};

const OLLAMA_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3";

/// How to bring the server up, quoted in availability errors.
pub const START_HINT: &str = "start Ollama with: ollama serve";
const TIMEOUT_HINT: &str = "try a smaller file or a faster model";

/// Self-hosted Ollama backend.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaProvider {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config
                .api_base
                .clone()
                .unwrap_or_else(|| OLLAMA_API_BASE.to_string()),
            model: if config.model.is_empty() {
                DEFAULT_MODEL.to_string()
            } else {
                config.model.clone()
            },
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url.trim_end_matches('/'))
    }

    fn metadata(&self, input: &AnalysisInput) -> Metadata {
        let mut meta = normalize::base_metadata("ollama", input);
        meta.insert("llm_model".to_string(), json!(self.model));
        meta.insert("has_commit_history".to_string(), json!(!input.commits.is_empty()));
        meta
    }

    fn classify(err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout {
                provider: "ollama",
                hint: TIMEOUT_HINT.to_string(),
            }
        } else if err.is_connect() {
            ProviderError::Unreachable {
                provider: "ollama",
                hint: START_HINT.to_string(),
            }
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

impl AnalysisProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn is_available(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.tags_url())
                .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
                .send()
                .await;
            match resp {
                Ok(r) => r.status().is_success(),
                Err(e) => {
                    debug!(error = %e, "ollama not available");
                    false
                }
            }
        })
    }

    fn generate(
        &self,
        input: &AnalysisInput,
    ) -> BoxFuture<'_, Result<AnalysisResult, ProviderError>> {
        let content = truncate_to_chars(&input.file_content, LOCAL_CHAR_BUDGET);
        let prompt = prompt::local_generate_prompt(input, &content);
        let input = input.clone();

        Box::pin(async move {
            let body = GenerateRequest {
                model: self.model.clone(),
                prompt,
                stream: false,
                format: "json".to_string(),
            };

            debug!(model = %self.model, url = %self.generate_url(), "ollama analysis request");

            let resp = self
                .client
                .post(self.generate_url())
                .timeout(self.timeout)
                .json(&body)
                .send()
                .await
                .map_err(Self::classify)?;

            let status = resp.status();
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(ProviderError::Upstream {
                    provider: "ollama",
                    status: status.as_u16(),
                    message,
                });
            }

            let envelope: GenerateResponse = match resp.json().await {
                Ok(env) => env,
                Err(e) => {
                    warn!(error = %e, "ollama envelope was not valid JSON, using fallback");
                    return Ok(normalize::parse_failure(&input, self.metadata(&input)));
                }
            };

            match serde_json::from_str::<Value>(&envelope.response) {
                Ok(value) => Ok(normalize::from_value(&value, &input, self.metadata(&input))),
                Err(e) => {
                    warn!(error = %e, "failed to parse ollama JSON response, using fallback");
                    Ok(normalize::parse_failure(&input, self.metadata(&input)))
                }
            }
        })
    }
}

// ── Wire types (private) ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    format: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_config() {
        let provider = OllamaProvider::from_config(&LlmConfig::default());
        assert_eq!(provider.model, DEFAULT_MODEL);
        assert_eq!(provider.generate_url(), "http://localhost:11434/api/generate");
        assert_eq!(provider.tags_url(), "http://localhost:11434/api/tags");
        assert_eq!(provider.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_config_overrides() {
        let config = LlmConfig {
            api_base: Some("http://10.0.0.2:11434/".to_string()),
            model: "codellama".to_string(),
            timeout_secs: 120,
            ..LlmConfig::default()
        };
        let provider = OllamaProvider::from_config(&config);
        assert_eq!(provider.generate_url(), "http://10.0.0.2:11434/api/generate");
        assert_eq!(provider.model, "codellama");
        assert_eq!(provider.timeout, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_unreachable_server_surfaces_hint() {
        // Port 1 is reserved and never listening.
        let config = LlmConfig {
            api_base: Some("http://127.0.0.1:1".to_string()),
            ..LlmConfig::default()
        };
        let provider = OllamaProvider::from_config(&config);
        let input = AnalysisInput::new("lib.rs", "fn f() {}");

        let err = provider.generate(&input).await.unwrap_err();
        assert!(err.to_string().contains("ollama serve"), "got: {err}");
    }

    #[tokio::test]
    async fn test_probe_is_false_when_unreachable() {
        let config = LlmConfig {
            api_base: Some("http://127.0.0.1:1".to_string()),
            ..LlmConfig::default()
        };
        let provider = OllamaProvider::from_config(&config);
        assert!(!provider.is_available().await);
    }
}
