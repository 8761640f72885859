//! Anthropic messages API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{check_status, non_empty, Prompt, ProviderError, TextProvider, SYSTEM_PROMPT};
use crate::config::{ApiKey, ProviderConfig};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

pub struct AnthropicProvider {
    name: String,
    base_url: String,
    api_key: Option<ApiKey>,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl AnthropicProvider {
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

    fn request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ProviderError> {
        let key = self.api_key.as_ref().ok_or(ProviderError::NotConfigured)?;
        Ok(builder
            .header("x-api-key", key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION))
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl TextProvider for AnthropicProvider {
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
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: SYSTEM_PROMPT,
            messages: [Message {
                role: "user",
                content: prompt.text,
            }],
            // Anthropic accepts 0.0..=1.0 only.
            temperature: prompt.temperature.map(|t| t.min(1.0)),
        };

        let response = self
            .request(self.client.post(format!("{}/messages", self.base_url)))?
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
        let parsed: MessagesResponse =
            serde_json::from_str(&raw).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let text: String = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();
        non_empty(Some(text))
    }

    async fn probe(&self, timeout: Duration) -> Result<String, ProviderError> {
        let response = self
            .request(self.client.get(format!("{}/models", self.base_url)))?
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, timeout))?;
        let response = check_status(response).await?;
        Ok(format!("HTTP {}", response.status().as_u16()))
    }
}
