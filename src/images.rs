//! Image lookup for `/api/image`.
//!
//! Resolution order: curated gallery, AI image generation, placeholder.
//! Resolution never fails; the placeholder is always available.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{header, Url};
use serde::{Deserialize, Serialize};

use crate::config::{ImageProviderConfig, ImagesConfig};
use crate::providers::{check_status, ProviderError};

const DEFAULT_IMAGE_TIMEOUT_MS: u64 = 30_000;

/// Where the returned images came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Gallery,
    Placeholder,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageResult {
    pub images: Vec<String>,
    pub source: ImageSource,
}

/// Gallery lookup plus optional generation backend.
#[derive(Clone)]
pub struct ImageService {
    gallery: BTreeMap<String, Vec<String>>,
    placeholder_base: String,
    generator: Option<ImageGenerator>,
}

impl ImageService {
    pub fn new(config: &ImagesConfig, client: &reqwest::Client) -> Self {
        let generator = config
            .provider
            .as_ref()
            .filter(|p| p.has_credential())
            .map(|p| ImageGenerator::new(p, client.clone()));

        Self {
            gallery: config
                .gallery
                .iter()
                .filter(|(_, urls)| !urls.is_empty())
                .map(|(k, v)| (k.to_lowercase(), v.clone()))
                .collect(),
            placeholder_base: config.placeholder_base.clone(),
            generator,
        }
    }

    /// Resolve images for a prompt and optional category.
    pub async fn resolve(&self, text: &str, category: Option<&str>) -> ImageResult {
        if let Some(images) = self.gallery_match(text, category) {
            return ImageResult {
                images,
                source: ImageSource::Gallery,
            };
        }

        if let Some(generator) = &self.generator {
            if !text.trim().is_empty() {
                match generator.generate(text.trim()).await {
                    Ok(images) => {
                        return ImageResult {
                            images,
                            source: ImageSource::Ai,
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Image generation failed, using placeholder");
                    }
                }
            }
        }

        ImageResult {
            images: vec![self.placeholder_url(text)],
            source: ImageSource::Placeholder,
        }
    }

    /// Category first, then any gallery key appearing as a word in the text.
    fn gallery_match(&self, text: &str, category: Option<&str>) -> Option<Vec<String>> {
        if let Some(category) = category {
            if let Some(urls) = self.gallery.get(&category.trim().to_lowercase()) {
                return Some(urls.clone());
            }
        }

        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        self.gallery
            .iter()
            .find(|(key, _)| words.iter().any(|w| w == *key))
            .map(|(_, urls)| urls.clone())
    }

    fn placeholder_url(&self, text: &str) -> String {
        let label = match text.trim() {
            "" => "Your image here",
            t => t,
        };
        match Url::parse_with_params(&self.placeholder_base, &[("text", label)]) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, base = %self.placeholder_base, "Invalid placeholder base URL");
                self.placeholder_base.clone()
            }
        }
    }
}

/// OpenAI-compatible `/images/generations` client.
#[derive(Clone)]
struct ImageGenerator {
    endpoint: String,
    bearer: String,
    model: String,
    size: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

impl ImageGenerator {
    fn new(config: &ImageProviderConfig, client: reqwest::Client) -> Self {
        Self {
            endpoint: format!("{}/images/generations", config.url.trim_end_matches('/')),
            bearer: config
                .api_key
                .as_ref()
                .map(|k| format!("Bearer {}", k.expose_secret()))
                .unwrap_or_default(),
            model: config.model.clone(),
            size: config.size.clone(),
            timeout: Duration::from_millis(config.timeout_ms.unwrap_or(DEFAULT_IMAGE_TIMEOUT_MS)),
            client,
        }
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, &self.bearer)
            .timeout(self.timeout)
            .json(&GenerationRequest {
                model: &self.model,
                prompt,
                n: 1,
                size: &self.size,
            })
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        let response = check_status(response).await?;
        let parsed: GenerationResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let urls: Vec<String> = parsed.data.into_iter().filter_map(|d| d.url).collect();
        if urls.is_empty() {
            return Err(ProviderError::EmptyBody);
        }
        Ok(urls)
    }
}
