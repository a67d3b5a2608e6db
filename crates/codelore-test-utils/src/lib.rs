#![deny(unsafe_code)]

//! Shared test utilities for the Codelore workspace.
//!
//! Provides reusable fixtures, config builders, and tracing helpers so that
//! individual crate tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! codelore-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod input;
pub mod repo;
pub mod tracing_setup;
