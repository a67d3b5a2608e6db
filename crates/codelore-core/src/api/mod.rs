//! HTTP API exposed to the editor extension.
//!
//! Three routes: `GET /` (liveness), `GET /health` (build info plus a
//! provider availability map), and `POST /context/file` (the analysis
//! operation). The [`server`] module owns the router and status mapping;
//! [`types`] holds the wire shapes.

pub mod server;
pub mod types;

pub use server::{ApiState, router, serve};
