//! Response normalization — converts whatever a backend returns into the
//! canonical [`AnalysisResult`].
//!
//! Four tiers, tried in order of how much structure the reply carries:
//! a schema-deserialized payload passes through, JSON text is extracted
//! field-by-field with defaults, free text becomes a summary with
//! synthesized context, and an unavailable backend yields a locally built
//! mock. Each tier is a pure function of the raw reply and the original
//! input; normalization itself never fails.

use serde_json::{Value, json};

use super::truncate::prefix_chars;
use super::types::{
    AnalysisInput, AnalysisResult, DesignDecision, Metadata, ModelPayload, RelatedFile,
    RelatedFiles,
};

/// Summary used when a reply carries no usable summary at all.
pub const SUMMARY_FALLBACK: &str = "Analysis completed.";

/// How much of a free-text reply becomes the summary.
const TEXT_SUMMARY_CHARS: usize = 300;

/// Cap on `decisions` and `related_files`.
const MAX_ENTRIES: usize = 3;

/// Which normalization tier produced a result.
///
/// Recorded in metadata under `normalized_from` so a caller can tell how
/// much of the result came from the model versus local synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Backend-enforced schema, passed through.
    Structured,
    /// Reply parsed as JSON, fields extracted with defaults.
    ParsedJson,
    /// Reply was not JSON; treated as a plain-text summary.
    TextFallback,
    /// No backend reply at all; synthesized locally.
    Mock,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Structured => "structured",
            Tier::ParsedJson => "parsed_json",
            Tier::TextFallback => "text_fallback",
            Tier::Mock => "mock",
        }
    }
}

/// Metadata every tier starts from.
pub fn base_metadata(provider: &'static str, input: &AnalysisInput) -> Metadata {
    let mut meta = Metadata::new();
    meta.insert("commits_analyzed".to_string(), json!(input.commits.len()));
    meta.insert("llm_provider".to_string(), json!(provider));
    meta
}

fn has_selection(input: &AnalysisInput) -> bool {
    input.selected_code.as_deref().is_some_and(|s| !s.is_empty())
}

fn file_name(path: &str) -> &str {
    std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

/// Tier 1: a payload the backend already validated against the schema.
pub fn from_payload(payload: ModelPayload, input: &AnalysisInput, metadata: Metadata) -> AnalysisResult {
    let mut result = AnalysisResult {
        summary: payload.summary,
        decisions: payload.decisions,
        related_files: payload.related_files,
        weird_code_explanation: payload.weird_code_explanation,
        metadata,
    };
    finish(&mut result, input, Tier::Structured);
    result
}

/// Tier 2: a JSON value of unknown shape; extract fields with defaults.
///
/// Missing `summary` becomes [`SUMMARY_FALLBACK`]; missing lists become
/// empty; decision and related-file entries tolerate missing members.
pub fn from_value(value: &Value, input: &AnalysisInput, metadata: Metadata) -> AnalysisResult {
    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or(SUMMARY_FALLBACK)
        .to_string();

    let decisions = value
        .get("decisions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(MAX_ENTRIES)
                .map(|d| DesignDecision {
                    title: d
                        .get("title")
                        .and_then(Value::as_str)
                        .unwrap_or("Design Decision")
                        .to_string(),
                    description: d
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    commits: d
                        .get("commits")
                        .and_then(Value::as_array)
                        .map(|hashes| {
                            hashes
                                .iter()
                                .filter_map(Value::as_str)
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    let related_files = value
        .get("related_files")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(MAX_ENTRIES)
                .map(|r| RelatedFile {
                    path: r.get("path").and_then(Value::as_str).unwrap_or_default().to_string(),
                    reason: r
                        .get("reason")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let weird_code_explanation = value
        .get("weird_code_explanation")
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut result = AnalysisResult {
        summary,
        decisions,
        related_files,
        weird_code_explanation,
        metadata,
    };
    finish(&mut result, input, Tier::ParsedJson);
    result
}

/// Tier 3: the reply was not JSON at all; keep its head as the summary and
/// synthesize the rest from the input.
pub fn from_text(text: &str, input: &AnalysisInput, mut metadata: Metadata) -> AnalysisResult {
    metadata.insert("text_response".to_string(), json!(true));

    let head = prefix_chars(text.trim(), TEXT_SUMMARY_CHARS);
    let summary = if head.is_empty() {
        SUMMARY_FALLBACK.to_string()
    } else {
        head.to_string()
    };

    let mut result = AnalysisResult {
        summary,
        decisions: recent_change_decision(input),
        related_files: related_from_imports(input, MAX_ENTRIES),
        weird_code_explanation: None,
        metadata,
    };
    finish(&mut result, input, Tier::TextFallback);
    result
}

/// Tier 3, Ollama flavor: the server promised JSON and delivered something
/// unparseable.
pub fn parse_failure(input: &AnalysisInput, mut metadata: Metadata) -> AnalysisResult {
    metadata.insert("parse_error".to_string(), json!(true));

    let mut result = AnalysisResult {
        summary: format!(
            "This file ({}) contains code. The model response could not be parsed properly.",
            file_name(&input.file_path)
        ),
        decisions: recent_change_decision(input),
        related_files: related_from_imports(input, MAX_ENTRIES),
        weird_code_explanation: None,
        metadata,
    };
    finish(&mut result, input, Tier::TextFallback);
    result
}

/// Tier 4: no backend at all — synthesize the entire result from the input.
pub fn mock_response(input: &AnalysisInput, mut metadata: Metadata) -> AnalysisResult {
    metadata.insert("llm_configured".to_string(), json!(false));
    metadata.insert("mock_response".to_string(), json!(true));

    let summary = format!(
        "This file ({}) is part of the codebase. Configure an API key for the hosted provider to get AI-powered analysis. Found {} commits in history.",
        file_name(&input.file_path),
        input.commits.len()
    );

    let decisions = input
        .commits
        .iter()
        .take(2)
        .map(|c| DesignDecision {
            title: format!("Change in {}", prefix_chars(&c.date, 10)),
            description: prefix_chars(&c.message, 80).to_string(),
            commits: vec![c.hash.clone()],
        })
        .collect();

    let mut related_files = related_from_imports(input, MAX_ENTRIES);
    for co in &input.related.co_changed {
        if related_files.len() >= MAX_ENTRIES {
            break;
        }
        related_files.push(RelatedFile {
            path: co.path.clone(),
            reason: format!("Changed together {} times", co.frequency),
        });
    }

    let weird_code_explanation = has_selection(input).then(|| {
        "Configure an API key for the hosted provider to get AI-powered code explanations."
            .to_string()
    });

    let mut result = AnalysisResult {
        summary,
        decisions,
        related_files,
        weird_code_explanation,
        metadata,
    };
    finish(&mut result, input, Tier::Mock);
    result
}

/// Invariants applied to every tier: caps, non-empty summary, the
/// selected-code gate (no explanation unless the input carried a
/// selection), and the tier record.
fn finish(result: &mut AnalysisResult, input: &AnalysisInput, tier: Tier) {
    result.decisions.truncate(MAX_ENTRIES);
    result.related_files.truncate(MAX_ENTRIES);
    if result.summary.trim().is_empty() {
        result.summary = SUMMARY_FALLBACK.to_string();
    }
    if !has_selection(input) {
        result.weird_code_explanation = None;
    }
    result
        .metadata
        .insert("normalized_from".to_string(), json!(tier.as_str()));
}

fn recent_change_decision(input: &AnalysisInput) -> Vec<DesignDecision> {
    input
        .commits
        .first()
        .map(|c| DesignDecision {
            title: "Recent Changes".to_string(),
            description: prefix_chars(&c.message, 80).to_string(),
            commits: vec![c.hash.clone()],
        })
        .into_iter()
        .collect()
}

fn related_from_imports(input: &AnalysisInput, cap: usize) -> Vec<RelatedFile> {
    input
        .related
        .imports
        .iter()
        .take(cap)
        .map(|imp| RelatedFile {
            path: imp.clone(),
            reason: "Imported by this file".to_string(),
        })
        .collect()
}
