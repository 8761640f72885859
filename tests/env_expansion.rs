//! Integration tests for the full Config::from_file_with_env pipeline.
//!
//! TOML file -> raw parse -> env var expansion -> final Config with KeySource metadata.
//!
//! Each test uses unique env var names to avoid parallel test interference.

use std::io::Write;

use copyrouter::config::{convention_env_var_name, Config, KeySource, IMAGE_PROVIDER_NAME};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp config");
    file.write_all(content.as_bytes()).expect("write temp config");
    file
}

#[test]
fn test_env_expansion_resolves_key_and_url() {
    unsafe {
        std::env::set_var("COPYROUTER_E2E_OPENAI_KEY", "sk-e2e");
        std::env::set_var("COPYROUTER_E2E_HOST", "llm.internal");
    }

    let file = write_config(
        r#"
[[providers]]
name = "e2e-openai"
url = "https://${COPYROUTER_E2E_HOST}/v1"
api_key = "${COPYROUTER_E2E_OPENAI_KEY}"
model = "gpt-4o-mini"
"#,
    );

    let (config, key_sources) = Config::from_file_with_env(file.path()).unwrap();
    let provider = &config.providers[0];
    assert_eq!(provider.url, "https://llm.internal/v1");
    assert_eq!(provider.api_key.as_ref().unwrap().expose_secret(), "sk-e2e");
    assert_eq!(
        key_sources,
        vec![("e2e-openai".to_string(), KeySource::EnvExpanded)]
    );

    unsafe {
        std::env::remove_var("COPYROUTER_E2E_OPENAI_KEY");
        std::env::remove_var("COPYROUTER_E2E_HOST");
    }
}

#[test]
fn test_missing_env_var_names_variable_and_provider() {
    unsafe { std::env::remove_var("COPYROUTER_E2E_DEFINITELY_MISSING") };

    let file = write_config(
        r#"
[[providers]]
name = "e2e-missing"
url = "https://example.com/v1"
api_key = "${COPYROUTER_E2E_DEFINITELY_MISSING}"
model = "m"
"#,
    );

    let err = Config::from_file_with_env(file.path())
        .unwrap_err()
        .to_string();
    assert!(err.contains("COPYROUTER_E2E_DEFINITELY_MISSING"), "{}", err);
    assert!(err.contains("e2e-missing"), "{}", err);
}

#[test]
fn test_convention_key_and_literal_key() {
    let var_name = convention_env_var_name("e2e-conv");
    unsafe { std::env::set_var(&var_name, "sk-conv") };

    let file = write_config(
        r#"
[routing]
priority = ["e2e-literal", "e2e-conv"]

[[providers]]
name = "e2e-conv"
kind = "anthropic"
url = "https://api.anthropic.com/v1"
model = "claude-3-5-haiku-latest"

[[providers]]
name = "e2e-literal"
url = "https://example.com/v1"
api_key = "sk-literal"
model = "m"
"#,
    );

    let (config, key_sources) = Config::from_file_with_env(file.path()).unwrap();
    assert!(config.providers.iter().all(|p| p.has_credential()));
    assert_eq!(key_sources[0], ("e2e-conv".to_string(), KeySource::Convention(var_name.clone())));
    assert_eq!(key_sources[1], ("e2e-literal".to_string(), KeySource::Literal));

    unsafe { std::env::remove_var(&var_name) };
}

#[test]
fn test_image_provider_key_resolution() {
    let var_name = convention_env_var_name(IMAGE_PROVIDER_NAME);
    unsafe { std::env::remove_var(&var_name) };

    let file = write_config(
        r#"
[images.provider]
url = "https://api.openai.com/v1"
"#,
    );

    let (config, key_sources) = Config::from_file_with_env(file.path()).unwrap();
    assert!(!config.images.provider.unwrap().has_credential());
    assert_eq!(
        key_sources,
        vec![(IMAGE_PROVIDER_NAME.to_string(), KeySource::None)]
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Config::from_file_with_env("/nonexistent/copyrouter.toml")
        .unwrap_err()
        .to_string();
    assert!(err.contains("Failed to read config file"), "{}", err);
}
