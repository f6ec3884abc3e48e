//! HTTP server
//!
//! One JSON endpoint (`POST /api/chat`) plus static files for the chat page.
//! All request state is immutable and shared through [`AppState`].

mod error;
mod handlers;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::backend::{CompletionClient, OpenAiClient};
use crate::config::{ServerConfig, ServerSettings, API_KEY_ENV};
use crate::error::{Error, Result};
use crate::persona::PersonaRegistry;

pub use error::ChatError;
pub use handlers::{truncate_chars, ChatReply, ChatRequest};

/// Shared, read-only request state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<PersonaRegistry>,
    pub client: Arc<dyn CompletionClient>,
    /// Checked on every request; nothing goes upstream without it
    pub api_key_configured: bool,
    pub max_message_chars: usize,
}

impl AppState {
    pub fn new(
        registry: PersonaRegistry,
        client: Arc<dyn CompletionClient>,
        api_key_configured: bool,
        max_message_chars: usize,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            client,
            api_key_configured,
            max_message_chars,
        }
    }
}

/// Build the application router
pub fn router(state: AppState, settings: &ServerSettings) -> Router {
    Router::new()
        .route("/api/chat", post(handlers::chat))
        .fallback_service(ServeDir::new(&settings.static_dir))
        .layer(DefaultBodyLimit::max(settings.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build request state from configuration: persona table and OpenAI client
pub fn build_state(config: &ServerConfig) -> Result<AppState> {
    let registry = match config.chat.personas_file {
        Some(ref path) => PersonaRegistry::load(Path::new(path))?,
        None => PersonaRegistry::bundled()?,
    };

    let client = OpenAiClient::new(config.openai.client_config())?;

    Ok(AppState::new(
        registry,
        Arc::new(client),
        config.openai.has_api_key(),
        config.chat.max_message_chars,
    ))
}

/// Run the server until Ctrl+C
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    if !state.api_key_configured {
        warn_missing_credential();
    }
    check_static_dir(Path::new(&config.server.static_dir));

    info!(
        personas = state.registry.len(),
        default = %state.registry.default_persona().id,
        model = %config.openai.model,
        max_message_chars = state.max_message_chars,
        "Chat proxy ready"
    );

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::ServerBind {
            addr: addr.clone(),
            source: e,
        })?;

    let local: SocketAddr = listener.local_addr().map_err(|e| Error::ServerBind {
        addr: addr.clone(),
        source: e,
    })?;
    info!(addr = %local, "Listening");
    info!("Open: http://localhost:{}", local.port());

    let app = router(state, &config.server);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn warn_missing_credential() {
    warn!(
        "{} is not set; every chat request will fail until it is configured",
        API_KEY_ENV
    );
    warn!("  export {}=sk-...      # shell", API_KEY_ENV);
    warn!("  [openai] api_key = \"sk-...\"  # config file");
}

fn check_static_dir(dir: &Path) {
    if !dir.join("index.html").is_file() {
        warn!(dir = %dir.display(), "No index.html in static directory; GET / will return 404");
    }
}
