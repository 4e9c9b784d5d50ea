//! HTTP server.
//!
//! Routes:
//! - `POST /bill-handler/` analyse an uploaded bill and open a chat session
//! - `POST /carbon-budget/` same analysis, flat response for older clients
//! - `POST /chat-reply/` follow-up question about the uploaded bill
//! - `GET /health`, `GET /metrics`

mod forms;
mod handlers;

use crate::api::{BillIngestionService, ChatReplyService};
use crate::config::Config;
use crate::model::GenerativeModel;
use crate::session::{InMemorySessionStore, SessionStore};
use crate::telemetry::Telemetry;
use crate::Result;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Allowance for multipart boundaries and the non-file form fields.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    ingestion: Arc<BillIngestionService>,
    chat: Arc<ChatReplyService>,
    sessions: Arc<dyn SessionStore>,
    telemetry: Arc<Telemetry>,
    model_name: String,
    body_limit: usize,
}

impl AppState {
    /// Wire the services around `model` with an in-memory session store.
    pub fn new(config: &Config, model: Arc<dyn GenerativeModel>) -> Self {
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        Self::with_sessions(config, model, sessions)
    }

    /// Wire the services around `model` and an existing session store.
    pub fn with_sessions(
        config: &Config,
        model: Arc<dyn GenerativeModel>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let telemetry = Arc::new(Telemetry::new(&config.telemetry));

        let ingestion = BillIngestionService::new(
            Arc::clone(&model),
            Arc::clone(&sessions),
            Arc::clone(&telemetry),
        )
        .with_config(config);
        let chat = ChatReplyService::new(
            Arc::clone(&model),
            Arc::clone(&sessions),
            Arc::clone(&telemetry),
        )
        .with_config(config);

        Self {
            ingestion: Arc::new(ingestion),
            chat: Arc::new(chat),
            sessions,
            telemetry,
            model_name: model.name().to_string(),
            body_limit: config.uploads.max_bytes + FORM_OVERHEAD_BYTES,
        }
    }

    /// The session store.
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// The telemetry sink.
    pub fn telemetry(&self) -> &Arc<Telemetry> {
        &self.telemetry
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.body_limit;

    Router::new()
        .route("/bill-handler/", post(handlers::bill_handler))
        .route("/carbon-budget/", post(handlers::carbon_budget))
        .route("/chat-reply/", post(handlers::chat_reply))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        // Any origin is accepted; restrict before exposing publicly.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind to the configured address and serve until ctrl-c.
pub async fn serve(config: &Config, model: Arc<dyn GenerativeModel>) -> Result<()> {
    let app = router(AppState::new(config, model));

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "EcoSync server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("EcoSync server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
