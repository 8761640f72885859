//! Configuration parsing and validation for copyrouter.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub images: ImagesConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:3000")
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Provider ordering and per-call limits.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Provider names in the order they are tried
    #[serde(default)]
    pub priority: Vec<String>,
    /// Default per-provider call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            priority: Vec::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// API key wrapper that redacts in Debug/Display/Serialize and zeroizes on drop.
///
/// Only accessible via `.expose_secret()`, so every use is grep-auditable.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Access the raw key value.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the key holds anything besides whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.expose_secret().trim().is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> serde::Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| ApiKey(SecretString::from(s)))
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        ApiKey(SecretString::from(s))
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        ApiKey(SecretString::from(s))
    }
}

/// How a provider's API key was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySource {
    /// Key was a literal string in config (no ${} references)
    Literal,
    /// Key contained ${VAR} references expanded from environment
    EnvExpanded,
    /// Key was auto-discovered from convention env var (holds var name)
    Convention(String),
    /// No key available
    None,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Literal => write!(f, "config-literal"),
            KeySource::EnvExpanded => write!(f, "env-expanded"),
            KeySource::Convention(var) => write!(f, "convention ({})", var),
            KeySource::None => write!(f, "none"),
        }
    }
}

/// Wire dialect spoken by a text provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-style `/chat/completions` (OpenAI, DeepSeek, OpenRouter, Groq, ...)
    #[default]
    #[serde(alias = "openai-compat", alias = "openai_compat")]
    OpenAi,
    /// Anthropic `/messages`
    Anthropic,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Text provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Unique name for this provider
    pub name: String,
    /// Request/response dialect
    #[serde(default)]
    pub kind: ProviderKind,
    /// Base URL for the provider's API (e.g., "https://api.openai.com/v1")
    pub url: String,
    /// Bearer credential
    pub api_key: Option<ApiKey>,
    /// Model identifier sent with every request
    pub model: String,
    /// Per-provider timeout override in milliseconds
    pub timeout_ms: Option<u64>,
}

impl ProviderConfig {
    /// A provider is usable only with a non-blank credential.
    pub fn has_credential(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_blank())
    }

    /// Effective call timeout, falling back to the routing default.
    pub fn timeout(&self, default_ms: u64) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(default_ms))
    }
}

/// Image endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    /// Base URL for placeholder images; the prompt is appended as `?text=`
    #[serde(default = "default_placeholder_base")]
    pub placeholder_base: String,
    /// Curated images keyed by lowercase category
    #[serde(default)]
    pub gallery: BTreeMap<String, Vec<String>>,
    /// Optional OpenAI-compatible image generation backend
    pub provider: Option<ImageProviderConfig>,
}

fn default_placeholder_base() -> String {
    "https://placehold.co/1024x1024".to_string()
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            placeholder_base: default_placeholder_base(),
            gallery: BTreeMap::new(),
            provider: None,
        }
    }
}

/// OpenAI-compatible `/images/generations` backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageProviderConfig {
    pub url: String,
    pub api_key: Option<ApiKey>,
    #[serde(default = "default_image_model")]
    pub model: String,
    #[serde(default = "default_image_size")]
    pub size: String,
    pub timeout_ms: Option<u64>,
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

impl ImageProviderConfig {
    pub fn has_credential(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_blank())
    }
}

/// Name used for the image backend in errors and convention lookups.
pub const IMAGE_PROVIDER_NAME: &str = "images";

impl Config {
    /// Parse configuration from a TOML string without environment expansion.
    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.is_empty() {
            tracing::warn!("No providers configured - every prompt will use local fallback text");
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "Provider with empty name".to_string(),
                ));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate provider name '{}'",
                    provider.name
                )));
            }
            if provider.url.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Provider '{}' has empty URL",
                    provider.name
                )));
            }
            if provider.timeout_ms == Some(0) {
                return Err(ConfigError::Validation(format!(
                    "Provider '{}' has zero timeout_ms",
                    provider.name
                )));
            }
        }

        for name in &self.routing.priority {
            if !seen.contains(name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Priority entry '{}' does not name a configured provider",
                    name
                )));
            }
        }

        if self.routing.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "routing.timeout_ms must be greater than zero".to_string(),
            ));
        }

        if let Some(images) = &self.images.provider {
            if images.url.is_empty() {
                return Err(ConfigError::Validation(
                    "Image provider has empty URL".to_string(),
                ));
            }
            if images.timeout_ms == Some(0) {
                return Err(ConfigError::Validation(
                    "Image provider has zero timeout_ms".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable '{var}' not set for provider '{provider}': {message}")]
    EnvVar {
        var: String,
        provider: String,
        message: String,
    },
}

/// Raw provider config deserialized directly from TOML.
/// `url` and `api_key` may contain `${VAR}` references not yet expanded.
#[derive(Deserialize)]
pub struct RawProviderConfig {
    name: String,
    #[serde(default)]
    kind: ProviderKind,
    url: String,
    api_key: Option<String>,
    model: String,
    timeout_ms: Option<u64>,
}

/// Raw image backend config; same expansion rules as providers.
#[derive(Deserialize)]
pub struct RawImageProviderConfig {
    url: String,
    api_key: Option<String>,
    #[serde(default = "default_image_model")]
    model: String,
    #[serde(default = "default_image_size")]
    size: String,
    timeout_ms: Option<u64>,
}

#[derive(Deserialize)]
pub struct RawImagesConfig {
    #[serde(default = "default_placeholder_base")]
    placeholder_base: String,
    #[serde(default)]
    gallery: BTreeMap<String, Vec<String>>,
    provider: Option<RawImageProviderConfig>,
}

impl Default for RawImagesConfig {
    fn default() -> Self {
        Self {
            placeholder_base: default_placeholder_base(),
            gallery: BTreeMap::new(),
            provider: None,
        }
    }
}

/// Raw configuration deserialized directly from TOML.
#[derive(Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    routing: RoutingConfig,
    #[serde(default)]
    providers: Vec<RawProviderConfig>,
    #[serde(default)]
    images: RawImagesConfig,
}

/// Expand all `${VAR}` references in a string using a custom lookup function.
///
/// Supports multiple `${VAR}` in one string (e.g., `${SCHEME}://${HOST}/v1`).
/// Fails on first missing variable, unclosed `${`, or empty variable name.
fn expand_env_vars_with<F>(
    input: &str,
    provider_name: &str,
    lookup: F,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !input.contains("${") {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let end = after.find('}').ok_or_else(|| ConfigError::EnvVar {
            var: "<unclosed>".to_string(),
            provider: provider_name.to_string(),
            message: format!("Unclosed '${{' in config value: {}", input),
        })?;

        let var_name = &after[..end];
        if var_name.is_empty() {
            return Err(ConfigError::EnvVar {
                var: "".to_string(),
                provider: provider_name.to_string(),
                message: "Empty variable name in '${}' reference".to_string(),
            });
        }

        let value = lookup(var_name).ok_or_else(|| ConfigError::EnvVar {
            var: var_name.to_string(),
            provider: provider_name.to_string(),
            message: format!(
                "Environment variable '{}' is not set (referenced in provider '{}')",
                var_name, provider_name
            ),
        })?;

        result.push_str(&value);
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

fn expand_env_vars(input: &str, provider_name: &str) -> Result<String, ConfigError> {
    expand_env_vars_with(input, provider_name, |name| std::env::var(name).ok())
}

/// Derive the convention-based env var name for a provider.
///
/// - "openai" -> "COPYROUTER_OPENAI_API_KEY"
/// - "deep-seek" -> "COPYROUTER_DEEP_SEEK_API_KEY"
pub fn convention_env_var_name(provider_name: &str) -> String {
    let upper_snake = provider_name.to_uppercase().replace(['-', ' '], "_");
    format!("COPYROUTER_{}_API_KEY", upper_snake)
}

fn convention_key_lookup(provider_name: &str) -> Option<(String, String)> {
    let var_name = convention_env_var_name(provider_name);
    std::env::var(&var_name).ok().map(|value| (var_name, value))
}

/// Resolve a raw `api_key` value into a key and its source.
///
/// - `${VAR}` references: expanded from environment
/// - literal string: wrapped directly
/// - absent: convention lookup (`COPYROUTER_<NAME>_API_KEY`)
fn resolve_api_key(
    raw_key: Option<String>,
    owner: &str,
) -> Result<(Option<ApiKey>, KeySource), ConfigError> {
    Ok(match raw_key {
        Some(raw) if raw.contains("${") => {
            let expanded = expand_env_vars(&raw, owner)?;
            (Some(ApiKey::from(expanded)), KeySource::EnvExpanded)
        }
        Some(raw) => (Some(ApiKey::from(raw)), KeySource::Literal),
        None => match convention_key_lookup(owner) {
            Some((var_name, value)) => (Some(ApiKey::from(value)), KeySource::Convention(var_name)),
            None => (None, KeySource::None),
        },
    })
}

impl Config {
    /// Convert raw (deserialized) config to final config with env var expansion.
    ///
    /// Returns the config plus the key source of every provider, in
    /// configuration order. The image backend, when present, is reported last
    /// under [`IMAGE_PROVIDER_NAME`].
    pub fn from_raw(raw: RawConfig) -> Result<(Self, Vec<(String, KeySource)>), ConfigError> {
        let mut providers = Vec::with_capacity(raw.providers.len());
        let mut key_sources = Vec::with_capacity(raw.providers.len() + 1);

        for rp in raw.providers {
            let url = expand_env_vars(&rp.url, &rp.name)?;
            let (api_key, source) = resolve_api_key(rp.api_key, &rp.name)?;
            key_sources.push((rp.name.clone(), source));

            providers.push(ProviderConfig {
                name: rp.name,
                kind: rp.kind,
                url,
                api_key,
                model: rp.model,
                timeout_ms: rp.timeout_ms,
            });
        }

        let image_provider = match raw.images.provider {
            Some(ip) => {
                let url = expand_env_vars(&ip.url, IMAGE_PROVIDER_NAME)?;
                let (api_key, source) = resolve_api_key(ip.api_key, IMAGE_PROVIDER_NAME)?;
                key_sources.push((IMAGE_PROVIDER_NAME.to_string(), source));
                Some(ImageProviderConfig {
                    url,
                    api_key,
                    model: ip.model,
                    size: ip.size,
                    timeout_ms: ip.timeout_ms,
                })
            }
            None => None,
        };

        let config = Config {
            server: raw.server,
            routing: raw.routing,
            providers,
            images: ImagesConfig {
                placeholder_base: raw.images.placeholder_base,
                gallery: raw
                    .images
                    .gallery
                    .into_iter()
                    .map(|(k, v)| (k.to_lowercase(), v))
                    .collect(),
                provider: image_provider,
            },
        };

        Ok((config, key_sources))
    }

    /// Parse a TOML string with environment variable expansion, then validate.
    pub fn parse_str_with_env(
        content: &str,
    ) -> Result<(Self, Vec<(String, KeySource)>), ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
        let (config, key_sources) = Self::from_raw(raw)?;
        config.validate()?;
        Ok((config, key_sources))
    }

    /// Load configuration from a TOML file with environment variable expansion.
    ///
    /// This is the entry point used by the binary.
    pub fn from_file_with_env(
        path: impl AsRef<Path>,
    ) -> Result<(Self, Vec<(String, KeySource)>), ConfigError> {
        let content = read_config(path.as_ref())?;
        Self::parse_str_with_env(&content)
    }
}
