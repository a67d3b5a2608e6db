//! LocalAI provider — self-hosted OpenAI-compatible chat server.
//!
//! Sends chat completions to `{base}/chat/completions` with the output
//! schema spelled out in the system prompt, since the server enforces
//! nothing. Reply content that parses as JSON is extracted field-by-field;
//! anything else becomes a plain-text summary. An unreachable server
//! surfaces an error with a remediation hint.

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

const LOCALAI_API_BASE: &str = "http://localhost:8080/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// How to bring the server up, quoted in availability errors.
pub const START_HINT: &str = "start LocalAI with: docker run -p 8080:8080 localai/localai";
const TIMEOUT_HINT: &str = "try a smaller file or a faster model";

/// Self-hosted OpenAI-compatible backend.
pub struct LocalAiProvider {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
    temperature: f32,
    max_tokens: u32,
}

impl LocalAiProvider {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config
                .api_base
                .clone()
                .unwrap_or_else(|| LOCALAI_API_BASE.to_string()),
            model: if config.model.is_empty() {
                DEFAULT_MODEL.to_string()
            } else {
                config.model.clone()
            },
            timeout: Duration::from_secs(config.timeout_secs),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url.trim_end_matches('/'))
    }

    fn metadata(&self, input: &AnalysisInput) -> Metadata {
        let mut meta = normalize::base_metadata("localai", input);
        meta.insert("llm_model".to_string(), json!(self.model));
        meta.insert("has_commit_history".to_string(), json!(!input.commits.is_empty()));
        meta
    }

    fn classify(err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout {
                provider: "localai",
                hint: TIMEOUT_HINT.to_string(),
            }
        } else if err.is_connect() {
            ProviderError::Unreachable {
                provider: "localai",
                hint: START_HINT.to_string(),
            }
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

impl AnalysisProvider for LocalAiProvider {
    fn name(&self) -> &'static str {
        "localai"
    }

    fn is_available(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.models_url())
                .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
                .send()
                .await;
            match resp {
                Ok(r) => r.status().is_success(),
                Err(e) => {
                    debug!(error = %e, "localai not available");
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
        let prompt = prompt::local_chat_messages(input, &content);
        let input = input.clone();

        Box::pin(async move {
            let body = ChatCompletionRequest {
                model: self.model.clone(),
                messages: vec![
                    ChatMessage {
                        role: "system".to_string(),
                        content: prompt.system,
                    },
                    ChatMessage {
                        role: "user".to_string(),
                        content: prompt.user,
                    },
                ],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            debug!(model = %self.model, url = %self.chat_url(), "localai analysis request");

            let resp = self
                .client
                .post(self.chat_url())
                .timeout(self.timeout)
                .json(&body)
                .send()
                .await
                .map_err(Self::classify)?;

            let status = resp.status();
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(ProviderError::Upstream {
                    provider: "localai",
                    status: status.as_u16(),
                    message,
                });
            }

            let api_resp: ChatCompletionResponse =
                resp.json().await.map_err(|e| ProviderError::Upstream {
                    provider: "localai",
                    status: status.as_u16(),
                    message: format!("invalid response body: {e}"),
                })?;

            let content = api_resp
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default();

            match serde_json::from_str::<Value>(&content) {
                Ok(value) => Ok(normalize::from_value(&value, &input, self.metadata(&input))),
                Err(_) => {
                    warn!("localai response was not JSON, using it as a plain summary");
                    Ok(normalize::from_text(&content, &input, self.metadata(&input)))
                }
            }
        })
    }
}

// ── Wire types (private) ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
