//! Prompt composition — renders an [`AnalysisInput`] into backend-specific
//! instruction text.
//!
//! The hosted backend enforces the output schema out-of-band, so its prompt
//! states the contract but does not spell the schema out. Local backends
//! have no such enforcement and get the schema embedded in the prompt text.
//! File content arrives here already truncated by the calling provider;
//! selected code is always passed through in full.

use super::truncate::prefix_chars;
use super::types::{AnalysisInput, CommitRecord, RelatedFiles};

/// A system/user message pair for chat-style backends.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

const HOSTED_SYSTEM_PROMPT: &str = "\
You are a senior developer assistant helping a junior engineer understand code.
Analyze the provided file, commit history, and context.
Provide clear, educational insights in simple language.
Focus on helping developers learn and understand design decisions.
Output must be valid JSON matching the schema.";

const LOCAL_CHAT_SYSTEM_PROMPT: &str = r#"You are a code analysis assistant. Analyze files and provide insights.
Respond with JSON in this format:
{
  "summary": "2-3 sentence summary",
  "decisions": [{"title": "...", "description": "...", "commits": ["..."]}],
  "related_files": [{"path": "...", "reason": "..."}],
  "weird_code_explanation": "... or null"
}"#;

/// Messages for the hosted backend: detailed context, no inline schema.
pub fn hosted_messages(input: &AnalysisInput, file_content: &str) -> ChatPrompt {
    let commits_text = commits_detailed(&input.commits);
    let related_text = related_detailed(&input.related);

    let selected_section = match input.selected_code.as_deref() {
        Some(code) => format!(
            "\nUSER SELECTED CODE:\nThe user has highlighted this specific code block for explanation:\n```\n{code}\n```\nPlease explain why this code might be unusual or noteworthy in the 'weird_code_explanation' field.\n"
        ),
        None => String::new(),
    };

    let user = format!(
        "FILE: {path}\n\nFILE CONTENT:\n```\n{file_content}\n```\n\nRECENT COMMITS:\n{commits_text}\n\nRELATED FILES:\n{related_text}\n{selected_section}\nAnalyze this file and provide:\n1. A 2-3 sentence summary of what the file does\n2. Key design decisions from commit history (0-3 items)\n3. Related files developers should read next (0-3 items)\n4. Explanation of selected code if provided\n",
        path = input.file_path,
    );

    ChatPrompt {
        system: HOSTED_SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// Messages for an OpenAI-compatible local server: compact context, schema
/// spelled out in the system prompt.
pub fn local_chat_messages(input: &AnalysisInput, file_content: &str) -> ChatPrompt {
    let commits_text = commits_brief(&input.commits);
    let related_text = related_brief(&input.related);

    let selected_section = match input.selected_code.as_deref() {
        Some(code) => format!("\n\nUSER SELECTED CODE:\n{code}\n\nExplain this code."),
        None => String::new(),
    };

    let user = format!(
        "FILE: {path}\n\nCONTENT:\n{file_content}\n\nCOMMITS:\n{commits_text}\n\nRELATED:\n{related_text}{selected_section}\n\nAnalyze and respond with JSON only.",
        path = input.file_path,
    );

    ChatPrompt {
        system: LOCAL_CHAT_SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// Single-prompt form for Ollama's generate endpoint, schema embedded as an
/// example object.
pub fn local_generate_prompt(input: &AnalysisInput, file_content: &str) -> String {
    let commits_text = commits_brief(&input.commits);
    let related_text = related_brief(&input.related);

    let selected_section = match input.selected_code.as_deref() {
        Some(code) => format!(
            "\n\nUSER SELECTED CODE:\n{code}\n\nExplain this code in 'weird_code_explanation'."
        ),
        None => String::new(),
    };

    format!(
        r#"You are a code analysis assistant. Analyze this file and respond with ONLY valid JSON.

FILE: {path}

CONTENT:
{file_content}

COMMITS:
{commits_text}

RELATED:
{related_text}{selected_section}

Respond with JSON in this exact format:
{{
  "summary": "2-3 sentence summary of what this file does",
  "decisions": [
    {{"title": "Decision name", "description": "One sentence", "commits": ["hash1"]}}
  ],
  "related_files": [
    {{"path": "file.py", "reason": "Why it's related"}}
  ],
  "weird_code_explanation": "Explanation if code was selected, otherwise null"
}}

Respond with ONLY the JSON, no other text."#,
        path = input.file_path,
    )
}

// ── Formatting helpers ──────────────────────────────────────────────────

fn commits_detailed(commits: &[CommitRecord]) -> String {
    if commits.is_empty() {
        return "No commit history available for this file.".to_string();
    }
    commits
        .iter()
        .take(20)
        .map(|c| {
            format!(
                "- {} ({}, {}): {} [{} lines changed]",
                c.hash,
                prefix_chars(&c.date, 10),
                c.author,
                prefix_chars(&c.message, 100),
                c.lines_changed
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn commits_brief(commits: &[CommitRecord]) -> String {
    if commits.is_empty() {
        return "No commit history available.".to_string();
    }
    commits
        .iter()
        .take(15)
        .map(|c| {
            format!(
                "- {} ({}): {}",
                c.hash,
                prefix_chars(&c.date, 10),
                prefix_chars(&c.message, 80)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn related_detailed(related: &RelatedFiles) -> String {
    let mut out = String::new();
    if !related.imports.is_empty() {
        out.push_str("Imported files:\n");
        out.push_str(
            &related
                .imports
                .iter()
                .take(5)
                .map(|imp| format!("- {imp}"))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
    if !related.co_changed.is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str("Frequently co-changed files:\n");
        out.push_str(
            &related
                .co_changed
                .iter()
                .take(5)
                .map(|c| format!("- {} (changed together {} times)", c.path, c.frequency))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
    out
}

fn related_brief(related: &RelatedFiles) -> String {
    let mut out = String::new();
    if !related.imports.is_empty() {
        out.push_str("Imports: ");
        out.push_str(&related.imports.iter().take(5).cloned().collect::<Vec<_>>().join(", "));
    }
    if !related.co_changed.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("Co-changed: ");
        out.push_str(
            &related
                .co_changed
                .iter()
                .take(3)
                .map(|c| format!("{} ({}x)", c.path, c.frequency))
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::CoChangeEntry;

    fn commit(hash: &str, date: &str, message: &str) -> CommitRecord {
        CommitRecord {
            hash: hash.to_string(),
            full_hash: format!("{hash}000000000000000000000000000000000"),
            author: "Test Author".to_string(),
            date: date.to_string(),
            message: message.to_string(),
            lines_changed: 12,
        }
    }

    fn sample_input() -> AnalysisInput {
        AnalysisInput {
            file_path: "src/parser.rs".to_string(),
            file_content: "fn parse() {}".to_string(),
            commits: vec![commit("abc1234", "2026-01-15T10:00:00+00:00", "add parser")],
            related: RelatedFiles {
                imports: vec!["src/lexer.rs".to_string()],
                co_changed: vec![CoChangeEntry {
                    path: "src/ast.rs".to_string(),
                    frequency: 4,
                }],
            },
            selected_code: None,
        }
    }

    #[test]
    fn test_hosted_prompt_has_context_but_no_schema() {
        let input = sample_input();
        let prompt = hosted_messages(&input, &input.file_content);
        assert!(prompt.system.contains("senior developer"));
        assert!(!prompt.system.contains("\"summary\""));
        assert!(prompt.user.contains("src/parser.rs"));
        assert!(prompt.user.contains("abc1234 (2026-01-15, Test Author)"));
        assert!(prompt.user.contains("[12 lines changed]"));
        assert!(prompt.user.contains("changed together 4 times"));
    }

    #[test]
    fn test_local_chat_prompt_spells_out_schema() {
        let input = sample_input();
        let prompt = local_chat_messages(&input, &input.file_content);
        assert!(prompt.system.contains("\"summary\""));
        assert!(prompt.system.contains("\"weird_code_explanation\""));
        assert!(prompt.user.contains("Imports: src/lexer.rs"));
        assert!(prompt.user.contains("Co-changed: src/ast.rs (4x)"));
    }

    #[test]
    fn test_generate_prompt_demands_json_only() {
        let input = sample_input();
        let prompt = local_generate_prompt(&input, &input.file_content);
        assert!(prompt.contains("ONLY valid JSON"));
        assert!(prompt.contains("\"related_files\""));
        assert!(prompt.contains("- abc1234 (2026-01-15): add parser"));
    }

    #[test]
    fn test_selected_code_section_gated_on_input() {
        let mut input = sample_input();
        let without = hosted_messages(&input, &input.file_content);
        assert!(!without.user.contains("USER SELECTED CODE"));

        input.selected_code = Some("let x = y?;".to_string());
        let with = hosted_messages(&input, &input.file_content);
        assert!(with.user.contains("USER SELECTED CODE"));
        assert!(with.user.contains("let x = y?;"));
        assert!(with.user.contains("weird_code_explanation"));
    }

    #[test]
    fn test_empty_history_renders_placeholder() {
        let mut input = sample_input();
        input.commits.clear();
        let prompt = hosted_messages(&input, &input.file_content);
        assert!(prompt.user.contains("No commit history available for this file."));
        let brief = local_chat_messages(&input, &input.file_content);
        assert!(brief.user.contains("No commit history available."));
    }

    #[test]
    fn test_commit_lists_are_capped() {
        let mut input = sample_input();
        input.commits = (0..30)
            .map(|i| commit(&format!("hash{i:03}"), "2026-01-01T00:00:00+00:00", "msg"))
            .collect();

        let detailed = commits_detailed(&input.commits);
        assert_eq!(detailed.lines().count(), 20);
        let brief = commits_brief(&input.commits);
        assert_eq!(brief.lines().count(), 15);
    }

    #[test]
    fn test_long_messages_are_clipped() {
        let long_msg = "m".repeat(500);
        let commits = vec![commit("abc1234", "2026-01-01T00:00:00+00:00", &long_msg)];
        let detailed = commits_detailed(&commits);
        assert!(detailed.contains(&"m".repeat(100)));
        assert!(!detailed.contains(&"m".repeat(101)));
    }
}
