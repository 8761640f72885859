//! HTTP API module.
//!
//! This module provides the JSON API that accepts content requests and
//! hands them to the provider router and image service.

mod handlers;
mod server;
pub mod types;

pub use handlers::{ATTEMPTS_HEADER, LATENCY_MS_HEADER, LIVENESS_TEXT, PROVIDER_HEADER};
pub use server::{create_router, run_server, AppState, RequestId, REQUEST_ID_HEADER};
pub use types::{ImageRequest, PromptRequest, PromptResponse, ProviderStatus};
