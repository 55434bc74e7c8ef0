//! Cognee API client
//!
//! A dual-mode client for the cognee knowledge-graph backend. Every logical
//! call targets either the self-hosted deployment or the managed cloud
//! deployment, which differ in routing tree and authentication scheme.
//!
//! # Features
//!
//! - Per-mode URL rewriting from one logical path space
//! - API key persistence through injected durable storage
//! - Bearer session tokens with one silent refresh on `401`
//! - Bounded-retry liveness probes for the backend and the MCP server
//! - Uniform error classification across both deployments
//!
//! # Quick Start
//!
//! ```bash
//! COGNEE_API_KEY=xxx ./cognee-client
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  call(path, mode)  ┌────────────────────┐
//! │ Application  │───────────────────▶│     ApiClient      │──────▶ local  {base}/api/v1/...
//! │    code      │◀───────────────────│ (dispatch + retry) │──────▶ cloud  {base}/api/...
//! └──────────────┘   ApiResponse /    └─────────┬──────────┘
//!                    ClientError                │
//!                                               ▼
//!                                        DurableStorage
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod credentials;
pub mod environment;
pub mod error;
pub mod traits;

#[cfg(test)]
mod test_utils;
