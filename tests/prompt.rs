//! Integration tests for POST /api/prompt.
//!
//! Verifies that:
//! - Missing or empty text returns 400 {"error": "Missing prompt"} with no upstream call
//! - The first provider in priority order that answers wins
//! - Failed providers are reported in x-copyrouter-attempts
//! - All providers failing yields deterministic fallback copy (HTTP 200)
//! - A preferred provider is the only one attempted, and its failure is a 502
//!
//! Providers are wiremock servers; the app is driven with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use http::Request;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use copyrouter::config::Config;
use copyrouter::proxy::{create_router, AppState};

/// Build the app from a list of `(name, kind, base_url, api_key)` providers.
fn setup_app(providers: &[(&str, &str, &str, &str)], priority: &[&str]) -> axum::Router {
    let mut toml = format!(
        "[routing]\npriority = [{}]\ntimeout_ms = 2000\n",
        priority
            .iter()
            .map(|p| format!("\"{}\"", p))
            .collect::<Vec<_>>()
            .join(", ")
    );
    for (name, kind, url, key) in providers {
        toml.push_str(&format!(
            "\n[[providers]]\nname = \"{}\"\nkind = \"{}\"\nurl = \"{}\"\napi_key = \"{}\"\nmodel = \"test-model\"\n",
            name, kind, url, key
        ));
    }
    let config = Config::parse_str(&toml).expect("valid test config");
    create_router(AppState::from_config(&config, &reqwest::Client::new()))
}

fn openai_completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}

fn anthropic_message(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "msg_mock",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}]
    }))
}

async fn post_prompt(
    app: axum::Router,
    body: serde_json::Value,
) -> (http::StatusCode, http::HeaderMap, serde_json::Value) {
    let request = Request::post("/api/prompt")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).unwrap_or_default();
    (status, headers, json)
}

// ============================================================================
// Input errors
// ============================================================================

#[tokio::test]
async fn test_empty_text_returns_400_without_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(openai_completion("never"))
        .expect(0)
        .mount(&server)
        .await;

    let url = format!("{}/v1", server.uri());
    let app = setup_app(&[("openai", "openai", url.as_str(), "sk-a")], &[]);

    let (status, headers, json) = post_prompt(app, serde_json::json!({"text": ""})).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(json, serde_json::json!({"error": "Missing prompt"}));
    assert!(headers.get("x-copyrouter-request-id").is_some());
    assert!(headers.get("x-copyrouter-provider").is_none());
}

#[tokio::test]
async fn test_missing_text_field_returns_400() {
    let app = setup_app(&[], &[]);
    let (status, _, json) =
        post_prompt(app, serde_json::json!({"styleParameters": {"template": "email"}})).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing prompt");
}

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let app = setup_app(&[], &[]);
    let request = Request::post("/api/prompt")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
}

// ============================================================================
// Priority order
// ============================================================================

#[tokio::test]
async fn test_first_priority_provider_wins() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-openai"))
        .respond_with(openai_completion("Fresh bread, fresh start."))
        .expect(1)
        .mount(&openai)
        .await;

    let claude = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(anthropic_message("unused"))
        .expect(0)
        .mount(&claude)
        .await;

    let openai_url = format!("{}/v1", openai.uri());
    let claude_url = format!("{}/v1", claude.uri());
    let app = setup_app(
        &[
            ("claude", "anthropic", claude_url.as_str(), "sk-claude"),
            ("openai", "openai", openai_url.as_str(), "sk-openai"),
        ],
        &["openai", "claude"],
    );

    let (status, headers, json) =
        post_prompt(app, serde_json::json!({"text": "new bakery opening"})).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!({"body": "Fresh bread, fresh start.", "providerUsed": "openai"})
    );
    assert_eq!(headers.get("x-copyrouter-provider").unwrap(), "openai");
    assert!(headers.get("x-copyrouter-attempts").is_none());
    assert!(headers.get("x-copyrouter-latency-ms").is_some());
}

#[tokio::test]
async fn test_failed_providers_are_skipped_and_reported() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&openai)
        .await;

    let deepseek = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(openai_completion("   "))
        .expect(1)
        .mount(&deepseek)
        .await;

    let claude = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-claude"))
        .respond_with(anthropic_message("Come taste the difference."))
        .expect(1)
        .mount(&claude)
        .await;

    let openai_url = format!("{}/v1", openai.uri());
    let deepseek_url = format!("{}/v1", deepseek.uri());
    let claude_url = format!("{}/v1", claude.uri());
    let app = setup_app(
        &[
            ("openai", "openai", openai_url.as_str(), "sk-openai"),
            ("deepseek", "openai", deepseek_url.as_str(), "sk-deepseek"),
            ("claude", "anthropic", claude_url.as_str(), "sk-claude"),
        ],
        &["openai", "deepseek", "claude"],
    );

    let (status, headers, json) =
        post_prompt(app, serde_json::json!({"text": "new bakery opening"})).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(json["providerUsed"], "claude");
    assert_eq!(json["body"], "Come taste the difference.");
    assert_eq!(
        headers.get("x-copyrouter-attempts").unwrap(),
        "openai:http-500, deepseek:empty"
    );
}

#[tokio::test]
async fn test_provider_without_key_is_never_called() {
    let keyless = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(openai_completion("unused"))
        .expect(0)
        .mount(&keyless)
        .await;

    let backup = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(openai_completion("Backup copy."))
        .expect(1)
        .mount(&backup)
        .await;

    let keyless_url = format!("{}/v1", keyless.uri());
    let backup_url = format!("{}/v1", backup.uri());
    let app = setup_app(
        &[
            ("keyless", "openai", keyless_url.as_str(), ""),
            ("backup", "openai", backup_url.as_str(), "sk-backup"),
        ],
        &["keyless", "backup"],
    );

    let (_, headers, json) = post_prompt(app, serde_json::json!({"text": "car wash"})).await;
    assert_eq!(json["providerUsed"], "backup");
    assert!(headers.get("x-copyrouter-attempts").is_none());
}

// ============================================================================
// Fallback
// ============================================================================

#[tokio::test]
async fn test_all_providers_failing_returns_fallback_copy() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&openai)
        .await;

    let claude = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&claude)
        .await;

    let openai_url = format!("{}/v1", openai.uri());
    let claude_url = format!("{}/v1", claude.uri());
    let providers = [
        ("openai", "openai", openai_url.as_str(), "sk-openai"),
        ("claude", "anthropic", claude_url.as_str(), "sk-claude"),
    ];
    let body = serde_json::json!({
        "text": "new bakery opening",
        "styleParameters": {"template": "facebook"}
    });

    let (status, headers, first) = post_prompt(setup_app(&providers, &[]), body.clone()).await;
    let (_, _, second) = post_prompt(setup_app(&providers, &[]), body).await;

    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(first["providerUsed"], "fallback");
    assert!(first["body"]
        .as_str()
        .unwrap()
        .contains("new bakery opening"));
    assert_eq!(first, second);
    assert_eq!(headers.get("x-copyrouter-provider").unwrap(), "fallback");
    assert_eq!(
        headers.get("x-copyrouter-attempts").unwrap(),
        "openai:http-503, claude:http-401"
    );
}

#[tokio::test]
async fn test_no_providers_configured_returns_fallback() {
    let app = setup_app(&[], &[]);
    let (status, _, json) = post_prompt(app, serde_json::json!({"text": "grand opening"})).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(json["providerUsed"], "fallback");
    assert!(json["body"].as_str().unwrap().contains("grand opening"));
}

// ============================================================================
// Preferred provider
// ============================================================================

#[tokio::test]
async fn test_preferred_provider_is_only_attempt() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(openai_completion("unused"))
        .expect(0)
        .mount(&openai)
        .await;

    let claude = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(anthropic_message("Pinned copy."))
        .expect(1)
        .mount(&claude)
        .await;

    let openai_url = format!("{}/v1", openai.uri());
    let claude_url = format!("{}/v1", claude.uri());
    let app = setup_app(
        &[
            ("openai", "openai", openai_url.as_str(), "sk-openai"),
            ("claude", "anthropic", claude_url.as_str(), "sk-claude"),
        ],
        &["openai", "claude"],
    );

    let (status, _, json) = post_prompt(
        app,
        serde_json::json!({"text": "spring sale", "preferredProvider": "claude"}),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(json["providerUsed"], "claude");
    assert_eq!(json["body"], "Pinned copy.");
}

#[tokio::test]
async fn test_preferred_provider_failure_is_502_naming_provider() {
    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(openai_completion("unused"))
        .expect(0)
        .mount(&openai)
        .await;

    let claude = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&claude)
        .await;

    let openai_url = format!("{}/v1", openai.uri());
    let claude_url = format!("{}/v1", claude.uri());
    let app = setup_app(
        &[
            ("openai", "openai", openai_url.as_str(), "sk-openai"),
            ("claude", "anthropic", claude_url.as_str(), "sk-claude"),
        ],
        &[],
    );

    let (status, headers, json) = post_prompt(
        app,
        serde_json::json!({"text": "spring sale", "preferredProvider": "claude"}),
    )
    .await;
    assert_eq!(status, http::StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("claude"));
    assert_eq!(headers.get("x-copyrouter-provider").unwrap(), "claude");
}
