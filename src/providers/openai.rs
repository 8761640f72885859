//! OpenAI-compatible chat completions.
//!
//! Works with OpenAI, DeepSeek, OpenRouter, Groq, Together and any other
//! endpoint exposing `POST {base}/chat/completions`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};

use super::{check_status, non_empty, Prompt, ProviderError, TextProvider, SYSTEM_PROMPT};
use crate::config::{ApiKey, ProviderConfig};

pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: Option<ApiKey>,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(config: &ProviderConfig, timeout: Duration, client: reqwest::Client) -> Self {
        Self {
            name: config.name.clone(),
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_blank()),
            model: config.model.clone(),
            timeout,
            client,
        }
    }

    fn bearer(&self) -> Result<String, ProviderError> {
        self.api_key
            .as_ref()
            .map(|k| format!("Bearer {}", k.expose_secret()))
            .ok_or(ProviderError::NotConfigured)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl TextProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn attempt(
        &self,
        prompt: &Prompt<'_>,
        timeout: Duration,
    ) -> Result<String, ProviderError> {
        let auth = self.bearer()?;
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt.text,
                },
            ],
            temperature: prompt.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, auth)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, timeout))?;

        let response = check_status(response).await?;
        let raw = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, timeout))?;
        let parsed: ChatResponse =
            serde_json::from_str(&raw).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        non_empty(
            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content),
        )
    }

    async fn probe(&self, timeout: Duration) -> Result<String, ProviderError> {
        let auth = self.bearer()?;
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header(header::AUTHORIZATION, auth)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, timeout))?;
        let response = check_status(response).await?;
        Ok(format!("HTTP {}", response.status().as_u16()))
    }
}
