//! Hosted cloud provider.
//!
//! Talks to an OpenAI-compatible chat completions API with a JSON
//! response-format contract, so the reply deserializes straight into
//! [`ModelPayload`]. A missing API key or any upstream failure degrades to
//! a mock response — the hosted path never returns an error to the caller.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use codelore_config::LlmConfig;

use crate::BoxFuture;

use super::normalize;
use super::prompt;
use super::provider::{AnalysisProvider, ProviderError};
use super::truncate::{HOSTED_TOKEN_BUDGET, truncate_to_tokens};
use super::types::{AnalysisInput, AnalysisResult, Metadata, ModelPayload};

const HOSTED_API_BASE: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Schema-violating replies are retried this many times in total.
const MAX_ATTEMPTS: u32 = 2;

/// Cloud provider behind an OpenAI-compatible endpoint.
pub struct HostedProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl HostedProvider {
    /// Build from config. An empty `api_key` means "not configured" and
    /// every generate call will produce a mock response.
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config
                .api_base
                .clone()
                .unwrap_or_else(|| HOSTED_API_BASE.to_string()),
            model: if config.model.is_empty() {
                DEFAULT_MODEL.to_string()
            } else {
                config.model.clone()
            },
            temperature: config.temperature,
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_request_body(&self, input: &AnalysisInput) -> ChatCompletionRequest {
        let content = truncate_to_tokens(&input.file_content, HOSTED_TOKEN_BUDGET);
        let prompt = prompt::hosted_messages(input, &content);

        ChatCompletionRequest {
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
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
        }
    }

    fn success_metadata(&self, input: &AnalysisInput) -> Metadata {
        let mut meta = normalize::base_metadata("hosted", input);
        meta.insert("llm_model".to_string(), json!(self.model));
        meta.insert("has_commit_history".to_string(), json!(!input.commits.is_empty()));
        meta
    }

    /// One request/deserialize round. Any failure is a retryable string —
    /// the caller decides when to give up and mock.
    async fn attempt(&self, body: &ChatCompletionRequest) -> Result<ModelPayload, String> {
        let resp = self
            .client
            .post(self.chat_url())
            .timeout(REQUEST_TIMEOUT)
            .header("authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let error_body = resp.text().await.unwrap_or_default();
            return Err(format!("status {status}: {error_body}"));
        }

        let api_resp: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| format!("invalid response body: {e}"))?;

        let content = api_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| "no choices in response".to_string())?;

        serde_json::from_str(&content).map_err(|e| format!("schema violation: {e}"))
    }
}

impl AnalysisProvider for HostedProvider {
    fn name(&self) -> &'static str {
        "hosted"
    }

    fn is_available(&self) -> BoxFuture<'_, bool> {
        let configured = !self.api_key.is_empty();
        Box::pin(async move { configured })
    }

    fn generate(
        &self,
        input: &AnalysisInput,
    ) -> BoxFuture<'_, Result<AnalysisResult, ProviderError>> {
        let body = self.build_request_body(input);
        let input = input.clone();

        Box::pin(async move {
            if self.api_key.is_empty() {
                warn!("hosted API key not configured, returning mock response");
                return Ok(normalize::mock_response(
                    &input,
                    normalize::base_metadata("hosted", &input),
                ));
            }

            debug!(model = %body.model, url = %self.chat_url(), "hosted analysis request");

            for attempt in 1..=MAX_ATTEMPTS {
                match self.attempt(&body).await {
                    Ok(payload) => {
                        debug!(attempt, "hosted response received");
                        return Ok(normalize::from_payload(
                            payload,
                            &input,
                            self.success_metadata(&input),
                        ));
                    }
                    Err(reason) => {
                        warn!(attempt, %reason, "hosted request failed");
                    }
                }
            }

            // Degrade rather than surface: a broken cloud call should never
            // block the editor.
            Ok(normalize::mock_response(
                &input,
                normalize::base_metadata("hosted", &input),
            ))
        })
    }
}

// ── Wire types (private) ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
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
