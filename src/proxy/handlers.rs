//! HTTP request handlers.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use super::server::AppState;
use super::types::{ImageRequest, PromptRequest, PromptResponse, ProviderStatus};
use crate::error::Error;
use crate::images::ImageResult;
use crate::router::{format_attempts_header, GenerationRequest};

/// Response header: wall-clock latency in milliseconds (integer).
pub const LATENCY_MS_HEADER: &str = "x-copyrouter-latency-ms";
/// Response header: provider that produced the body, or "fallback".
pub const PROVIDER_HEADER: &str = "x-copyrouter-provider";
/// Response header: failed attempts, e.g. "openai:timeout, anthropic:http-500".
pub const ATTEMPTS_HEADER: &str = "x-copyrouter-attempts";

/// Upper bound on a single status probe.
const STATUS_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness text for `GET /`.
pub const LIVENESS_TEXT: &str = "copyrouter is running";

/// Attach routing metadata headers to a response.
///
/// Latency is always set; provider and attempts only when known.
fn attach_routing_headers(
    response: &mut Response,
    latency_ms: u64,
    provider: Option<&str>,
    attempts: Option<&str>,
) {
    let headers = response.headers_mut();

    headers.insert(
        HeaderName::from_static(LATENCY_MS_HEADER),
        HeaderValue::from(latency_ms),
    );

    if let Some(value) = provider.and_then(|p| HeaderValue::from_str(p).ok()) {
        headers.insert(HeaderName::from_static(PROVIDER_HEADER), value);
    }

    if let Some(value) = attempts.and_then(|a| HeaderValue::from_str(a).ok()) {
        headers.insert(HeaderName::from_static(ATTEMPTS_HEADER), value);
    }
}

/// Handle GET /
pub async fn root() -> &'static str {
    LIVENESS_TEXT
}

/// Handle POST /api/prompt
pub async fn prompt(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();

    let request: GenerationRequest = match payload {
        Ok(Json(body)) => body.into(),
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Rejected prompt body");
            let mut response =
                Error::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
                    .into_response();
            attach_routing_headers(&mut response, start.elapsed().as_millis() as u64, None, None);
            return response;
        }
    };

    tracing::info!(
        preferred = ?request.preferred_provider,
        template = %request.style.template(),
        "Received prompt request"
    );

    let result = state.router.route(&request).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(result) => {
            tracing::info!(
                provider = %result.provider_used,
                failed_attempts = result.attempt_log.len(),
                latency_ms,
                "Prompt served"
            );
            let provider = result.provider_used.clone();
            let attempts = format_attempts_header(&result.attempt_log);
            let mut response = Json(PromptResponse::from(result)).into_response();
            attach_routing_headers(&mut response, latency_ms, Some(&provider), attempts.as_deref());
            response
        }
        Err(err) => {
            let provider = match &err {
                Error::Provider { provider, .. } => Some(provider.clone()),
                _ => None,
            };
            tracing::info!(error = %err, latency_ms, "Prompt failed");
            let mut response = err.into_response();
            attach_routing_headers(&mut response, latency_ms, provider.as_deref(), None);
            response
        }
    }
}

/// Handle POST /api/image
///
/// Never fails: an unreadable body is treated as an empty request and gets a
/// placeholder. The body is parsed as JSON whatever its content type.
pub async fn image(State(state): State<AppState>, body: Bytes) -> Json<ImageResult> {
    let request = match serde_json::from_slice::<ImageRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable image body, using defaults");
            ImageRequest::default()
        }
    };

    let text = request.text.unwrap_or_default();
    let result = state
        .images
        .resolve(&text, request.category.as_deref())
        .await;
    tracing::info!(source = ?result.source, count = result.images.len(), "Image request served");
    Json(result)
}

/// Handle GET /api/status - probe every provider concurrently
pub async fn status(State(state): State<AppState>) -> Json<BTreeMap<String, ProviderStatus>> {
    let probes = state.router.providers().iter().map(|provider| async move {
        let timeout = provider.timeout().min(STATUS_PROBE_TIMEOUT);
        let outcome = match tokio::time::timeout(timeout, provider.probe(timeout)).await {
            Ok(Ok(detail)) => ProviderStatus {
                reachable: true,
                detail,
            },
            Ok(Err(e)) => ProviderStatus {
                reachable: false,
                detail: e.to_string(),
            },
            Err(_) => ProviderStatus {
                reachable: false,
                detail: format!("timed out after {} ms", timeout.as_millis()),
            },
        };
        (provider.name().to_string(), outcome)
    });

    let statuses: BTreeMap<String, ProviderStatus> =
        futures::future::join_all(probes).await.into_iter().collect();
    Json(statuses)
}
