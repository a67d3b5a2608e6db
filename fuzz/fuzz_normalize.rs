//! Fuzz target for the response normalizer.
//!
//! Run with: cargo +nightly fuzz run fuzz_normalize
//!
//! The normalizer must turn any backend reply into a well-formed result
//! without panicking, so arbitrary bytes go through both the JSON and the
//! plain-text tiers.

#![no_main]

use libfuzzer_sys::fuzz_target;

use codelore_core::llm::normalize;
use codelore_core::llm::types::AnalysisInput;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let input = AnalysisInput::new("fuzz.rs", "fn main() {}");

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(s) {
        let result = normalize::from_value(&value, &input, normalize::base_metadata("ollama", &input));
        assert!(!result.summary.is_empty());
        assert!(result.decisions.len() <= 3);
        assert!(result.related_files.len() <= 3);
    }

    let result = normalize::from_text(s, &input, normalize::base_metadata("localai", &input));
    assert!(!result.summary.is_empty());
    // No selection in the input, so no explanation may ever appear
    assert!(result.weird_code_explanation.is_none());
});
