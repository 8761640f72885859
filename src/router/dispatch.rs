//! Sequential dispatch with local fallback.
//!
//! Algorithm:
//! 1. Reject empty prompt text before touching any provider
//! 2. Format the provider prompt from the text and style hints
//! 3. Pinned provider: one attempt, failure is returned to the caller
//! 4. Otherwise: try each candidate once, in order, each bounded by its timeout
//! 5. No candidate succeeded: synthesize local copy, tagged `"fallback"`

use std::sync::Arc;

use super::request::{AttemptRecord, GenerationRequest, GenerationResult, FALLBACK_PROVIDER};
use super::selector::{Candidates, Router};
use crate::content::{build_prompt, fallback_body};
use crate::error::{Error, Result};
use crate::providers::{Prompt, ProviderError, TextProvider};

impl Router {
    /// Resolve a request to exactly one result.
    ///
    /// Returns `Err` only for empty prompt text or a failed pinned provider;
    /// every other failure is absorbed into the attempt log.
    pub async fn route(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        if request.text.trim().is_empty() {
            return Err(Error::missing_prompt());
        }

        let prompt_text = build_prompt(&request.text, &request.style);
        let prompt = Prompt {
            text: &prompt_text,
            temperature: request.style.temperature(),
        };

        match self.candidates(request.preferred_provider.as_deref()) {
            Candidates::Pinned(provider) => {
                let body = attempt(&provider, &prompt).await.map_err(|source| {
                    tracing::warn!(provider = %provider.name(), error = %source, "Pinned provider failed");
                    Error::Provider {
                        provider: provider.name().to_string(),
                        source,
                    }
                })?;
                Ok(GenerationResult {
                    body,
                    provider_used: provider.name().to_string(),
                    attempt_log: Vec::new(),
                })
            }
            Candidates::Ordered(candidates) => {
                Ok(self.route_ordered(&candidates, &prompt, request).await)
            }
        }
    }

    async fn route_ordered(
        &self,
        candidates: &[Arc<dyn TextProvider>],
        prompt: &Prompt<'_>,
        request: &GenerationRequest,
    ) -> GenerationResult {
        let mut attempt_log = Vec::new();

        for (i, provider) in candidates.iter().enumerate() {
            tracing::info!(
                provider = %provider.name(),
                attempt = i + 1,
                total = candidates.len(),
                "Trying provider"
            );

            match attempt(provider, prompt).await {
                Ok(body) => {
                    return GenerationResult {
                        body,
                        provider_used: provider.name().to_string(),
                        attempt_log,
                    };
                }
                Err(error) => {
                    tracing::warn!(
                        provider = %provider.name(),
                        error = %error,
                        "Provider failed, trying next"
                    );
                    attempt_log.push(AttemptRecord {
                        provider: provider.name().to_string(),
                        error,
                    });
                }
            }
        }

        let template = request.style.template();
        tracing::info!(
            attempts = attempt_log.len(),
            template = %template,
            "No provider succeeded, using local fallback"
        );
        GenerationResult {
            body: fallback_body(&request.text, template),
            provider_used: FALLBACK_PROVIDER.to_string(),
            attempt_log,
        }
    }
}

/// One provider call, bounded by that provider's timeout.
async fn attempt(
    provider: &Arc<dyn TextProvider>,
    prompt: &Prompt<'_>,
) -> std::result::Result<String, ProviderError> {
    let timeout = provider.timeout();
    match tokio::time::timeout(timeout, provider.attempt(prompt, timeout)).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(timeout.as_millis() as u64)),
    }
}

/// Format the attempt log for the `x-copyrouter-attempts` header.
///
/// Format: `"openai:timeout, anthropic:http-500"`, in attempt order.
/// Returns `None` if nothing failed.
pub fn format_attempts_header(attempts: &[AttemptRecord]) -> Option<String> {
    if attempts.is_empty() {
        return None;
    }
    Some(
        attempts
            .iter()
            .map(|a| format!("{}:{}", a.provider, a.error.code()))
            .collect::<Vec<_>>()
            .join(", "),
    )
}
