//! Wire-level provider tests against a mock HTTP server.
//!
//! Each backend is exercised through its real request/response cycle:
//! happy paths, malformed replies, upstream failures, and availability
//! probes. No real LLM is involved — the mock returns canned bodies.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use codelore_config::LlmProviderKind;
use codelore_core::analyze::{AnalyzeRequest, analyze_file};
use codelore_core::llm::{
    AnalysisProvider, HostedProvider, LocalAiProvider, OllamaProvider, ProviderError,
    create_provider,
};
use codelore_test_utils::config::TestConfigBuilder;
use codelore_test_utils::input::{bare_input, input_with_history};
use codelore_test_utils::tracing_setup::init_test_tracing;

fn analysis_json() -> String {
    json!({
        "summary": "Sorts a list using the standard library.",
        "decisions": [
            {"title": "Lean on sorted()", "description": "No custom algorithm.", "commits": ["abc1234"]}
        ],
        "related_files": [
            {"path": "src/engine/heap.py", "reason": "Shares the comparison helpers"}
        ],
        "weird_code_explanation": null
    })
    .to_string()
}

// ── Ollama ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn ollama_generate_parses_json_reply() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "stream": false,
            "format": "json"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": analysis_json()})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfigBuilder::new().api_base(&server.uri()).build();
    let provider = OllamaProvider::from_config(&config.llm);

    let result = provider.generate(&input_with_history()).await.unwrap();
    assert_eq!(result.summary, "Sorts a list using the standard library.");
    assert_eq!(result.decisions.len(), 1);
    assert_eq!(result.decisions[0].commits, vec!["abc1234".to_string()]);
    assert_eq!(result.metadata["llm_provider"], json!("ollama"));
    assert_eq!(result.metadata["commits_analyzed"], json!(3));
}

#[tokio::test]
async fn ollama_unparseable_reply_degrades_with_flag() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "I'm sorry, I can't do JSON today."})),
        )
        .mount(&server)
        .await;

    let config = TestConfigBuilder::new().api_base(&server.uri()).build();
    let provider = OllamaProvider::from_config(&config.llm);

    let result = provider.generate(&input_with_history()).await.unwrap();
    assert_eq!(result.metadata["parse_error"], json!(true));
    assert!(result.summary.contains("could not be parsed"));
    // Synthesized context still present
    assert_eq!(result.decisions[0].title, "Recent Changes");
}

#[tokio::test]
async fn ollama_server_error_is_surfaced() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model exploded"))
        .mount(&server)
        .await;

    let config = TestConfigBuilder::new().api_base(&server.uri()).build();
    let provider = OllamaProvider::from_config(&config.llm);

    let err = provider.generate(&input_with_history()).await.unwrap_err();
    match err {
        ProviderError::Upstream { provider, status, message } => {
            assert_eq!(provider, "ollama");
            assert_eq!(status, 500);
            assert!(message.contains("model exploded"));
        }
        other => panic!("expected Upstream, got: {other}"),
    }
}

#[tokio::test]
async fn ollama_probe_hits_tags_endpoint() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfigBuilder::new().api_base(&server.uri()).build();
    let provider = OllamaProvider::from_config(&config.llm);
    assert!(provider.is_available().await);
}

// ── LocalAI ─────────────────────────────────────────────────────────────

fn chat_reply(content: &str) -> serde_json::Value {
    json!({
        "model": "gpt-3.5-turbo",
        "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
    })
}

#[tokio::test]
async fn localai_generate_parses_json_content() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-3.5-turbo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(&analysis_json())))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfigBuilder::new()
        .api_base(&format!("{}/v1", server.uri()))
        .build();
    let provider = LocalAiProvider::from_config(&config.llm);

    let result = provider.generate(&input_with_history()).await.unwrap();
    assert_eq!(result.summary, "Sorts a list using the standard library.");
    assert_eq!(result.metadata["llm_provider"], json!("localai"));
}

#[tokio::test]
async fn localai_plain_text_content_becomes_summary() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
            "Hello, this file implements sorting.",
        )))
        .mount(&server)
        .await;

    let config = TestConfigBuilder::new()
        .api_base(&format!("{}/v1", server.uri()))
        .build();
    let provider = LocalAiProvider::from_config(&config.llm);

    let result = provider.generate(&input_with_history()).await.unwrap();
    assert_eq!(result.summary, "Hello, this file implements sorting.");
    assert_eq!(result.metadata["text_response"], json!(true));
    assert!(result.weird_code_explanation.is_none());
}

#[tokio::test]
async fn localai_probe_hits_models_endpoint() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfigBuilder::new()
        .api_base(&format!("{}/v1", server.uri()))
        .build();
    let provider = LocalAiProvider::from_config(&config.llm);
    assert!(provider.is_available().await);
}

// ── Hosted ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn hosted_generate_returns_structured_result() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"response_format": {"type": "json_object"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(&analysis_json())))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfigBuilder::new()
        .api_key("test-key")
        .api_base(&format!("{}/v1", server.uri()))
        .build();
    let provider = HostedProvider::from_config(&config.llm);

    let result = provider.generate(&input_with_history()).await.unwrap();
    assert_eq!(result.summary, "Sorts a list using the standard library.");
    assert_eq!(result.metadata["llm_provider"], json!("hosted"));
    assert_eq!(result.metadata["has_commit_history"], json!(true));
    assert!(result.metadata.get("mock_response").is_none());
}

#[tokio::test]
async fn hosted_retries_schema_violation_then_mocks() {
    init_test_tracing();
    let server = MockServer::start().await;

    // Content that is not JSON at all — each attempt fails deserialization.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("not json")))
        .expect(2)
        .mount(&server)
        .await;

    let config = TestConfigBuilder::new()
        .api_key("test-key")
        .api_base(&format!("{}/v1", server.uri()))
        .build();
    let provider = HostedProvider::from_config(&config.llm);

    let result = provider.generate(&input_with_history()).await.unwrap();
    assert_eq!(result.metadata["mock_response"], json!(true));
    assert!(result.summary.contains("Found 3 commits in history"));
}

#[tokio::test]
async fn hosted_upstream_error_degrades_to_mock() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let config = TestConfigBuilder::new()
        .api_key("test-key")
        .api_base(&format!("{}/v1", server.uri()))
        .build();
    let provider = HostedProvider::from_config(&config.llm);

    let result = provider.generate(&bare_input()).await.unwrap();
    assert_eq!(result.metadata["mock_response"], json!(true));
}

// ── Full pipeline ───────────────────────────────────────────────────────

#[tokio::test]
async fn analyze_file_end_to_end_against_mock_ollama() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": analysis_json()})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    let tmp = tempfile::TempDir::new().unwrap();
    let file = tmp.path().join("sort.py");
    tokio::fs::write(&file, "import heapq\n\ndef sort(xs):\n    return sorted(xs)\n")
        .await
        .unwrap();

    let config = TestConfigBuilder::new()
        .provider(LlmProviderKind::Ollama)
        .api_base(&server.uri())
        .build();
    let request = AnalyzeRequest {
        file_path: file.to_string_lossy().into_owned(),
        ..AnalyzeRequest::default()
    };

    let result = analyze_file(&config, &request).await.unwrap();
    assert_eq!(result.summary, "Sorts a list using the standard library.");
    assert_eq!(result.metadata["llm_provider"], json!("ollama"));
    // No git repo around the temp dir, so history is empty
    assert_eq!(result.metadata["commits_analyzed"], json!(0));
}

#[tokio::test]
async fn selector_unknown_name_still_generates_via_hosted_mock() {
    init_test_tracing();
    let config = TestConfigBuilder::new().build();

    let provider = create_provider(Some("no-such-backend"), &config.llm);
    assert_eq!(provider.name(), "hosted");

    let result = provider.generate(&bare_input()).await.unwrap();
    assert_eq!(result.metadata["mock_response"], json!(true));
}
