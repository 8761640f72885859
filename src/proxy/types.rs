//! JSON request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::content::StyleParameters;
use crate::router::{GenerationRequest, GenerationResult};

/// `POST /api/prompt` body.
///
/// Every field is optional at the JSON level so a missing `text` reaches the
/// router and produces the "Missing prompt" error instead of a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    #[serde(default, alias = "prompt")]
    pub text: Option<String>,
    #[serde(default, alias = "preferred_provider", alias = "provider")]
    pub preferred_provider: Option<String>,
    #[serde(default, alias = "style_parameters")]
    pub style_parameters: Option<StyleParameters>,
}

impl From<PromptRequest> for GenerationRequest {
    fn from(req: PromptRequest) -> Self {
        GenerationRequest {
            text: req.text.unwrap_or_default(),
            style: req.style_parameters.unwrap_or_default(),
            preferred_provider: req.preferred_provider,
        }
    }
}

/// `POST /api/prompt` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResponse {
    pub body: String,
    pub provider_used: String,
}

impl From<GenerationResult> for PromptResponse {
    fn from(result: GenerationResult) -> Self {
        Self {
            body: result.body,
            provider_used: result.provider_used,
        }
    }
}

/// `POST /api/image` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageRequest {
    #[serde(default, alias = "prompt")]
    pub text: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// One entry of the `GET /api/status` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub reachable: bool,
    pub detail: String,
}
