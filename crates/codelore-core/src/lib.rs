#![deny(unsafe_code)]

//! Codelore core — file-context analysis engine.
//!
//! Combines a source file's content, its Git history, and its import /
//! co-change neighborhood into a prompt for a pluggable LLM backend, and
//! normalizes whatever the backend returns into one strict result shape.
//! The HTTP API in [`api`] is what the editor extension talks to.

use std::future::Future;
use std::pin::Pin;

/// A type-erased, `Send`-safe, boxed future — the standard return type for async
/// trait methods that require dynamic dispatch (`dyn Trait`).
///
/// Native `async fn` in traits (stable since Rust 1.75) produces opaque return
/// types that are **not** object-safe. Traits consumed via `Box<dyn Trait>` or
/// `&dyn Trait` must return a concrete `Pin<Box<dyn Future>>` instead. This
/// alias keeps those signatures readable.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Request orchestration: validate, collect context, dispatch to a provider.
pub mod analyze;
/// HTTP API for the editor extension.
pub mod api;
/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Git history and co-change collection.
pub mod history;
/// Regex-based import extraction.
pub mod imports;
/// LLM provider abstraction, prompt composition, and response normalization.
pub mod llm;
/// Source file reading with a line cap.
pub mod source;

pub use analyze::{AnalyzeError, AnalyzeRequest, analyze_file};
pub use llm::{AnalysisInput, AnalysisProvider, AnalysisResult, ProviderError};
