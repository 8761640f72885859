//! HTTP server setup and configuration.

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use super::handlers;
use crate::config::Config;
use crate::images::ImageService;
use crate::router::Router as ProviderRouter;

/// Response header: correlation ID (UUID v4).
pub const REQUEST_ID_HEADER: &str = "x-copyrouter-request-id";

/// Per-request correlation ID, stored as a request extension.
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub Uuid);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProviderRouter>,
    pub images: Arc<ImageService>,
}

impl AppState {
    /// Build state from configuration, sharing one HTTP client.
    pub fn from_config(config: &Config, http_client: &Client) -> Self {
        Self {
            router: Arc::new(ProviderRouter::from_config(config, http_client)),
            images: Arc::new(ImageService::new(&config.images, http_client)),
        }
    }
}

/// Create the axum router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/prompt", post(handlers::prompt))
        .route("/api/image", post(handlers::image))
        .route("/api/status", get(handlers::status))
        .with_state(state)
        .layer(middleware::from_fn(assign_request_id))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Tag every request with a fresh correlation ID and echo it back.
///
/// The rest of the stack runs inside a `request` span carrying the ID.
async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let id = Uuid::new_v4();
    request.extensions_mut().insert(RequestId(id));

    let span = tracing::info_span!("request", request_id = %id);
    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

/// Run the HTTP server until Ctrl-C.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let listen_addr = config.server.listen.clone();

    // Per-call timeouts are set on each provider request.
    let http_client = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let state = AppState::from_config(&config, &http_client);

    let order: Vec<&str> = state.router.providers().iter().map(|p| p.name()).collect();
    let usable = state
        .router
        .providers()
        .iter()
        .filter(|p| p.has_credential())
        .count();
    tracing::info!(order = ?order, usable, "Provider priority");

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "Starting copyrouter server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                futures::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
