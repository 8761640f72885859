//! Router module for provider selection and dispatch.
//!
//! This module handles:
//! - Candidate ordering (pinned provider or static priority list)
//! - Sequential dispatch with per-provider timeouts
//! - Local fallback when every candidate fails

mod dispatch;
#[cfg(test)]
mod mock;
mod request;
mod selector;

pub use dispatch::format_attempts_header;
pub use request::{AttemptRecord, GenerationRequest, GenerationResult, FALLBACK_PROVIDER};
pub use selector::{Candidates, Router};
