//! FAQ chat HTTP server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/chat` | Answer a message (`{"message": "...", "method": "hybrid"}`) |
//! | `GET`  | `/faqs` | List all FAQs |
//! | `GET`  | `/history` | Recent chat history |
//! | `POST` | `/admin/import` | Insert FAQs (`{"faqs": [...]}`) and refit the matcher |
//! | `GET`  | `/health` | Health check (returns version and matcher readiness) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "message must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `internal` (500). Malformed or
//! non-JSON request bodies are `bad_request`. Storage and embedding
//! failures surface as `internal`; the process keeps serving.
//!
//! # Concurrency
//!
//! The matcher sits behind a `tokio::sync::RwLock`: chat requests take the
//! read lock, imports take the write lock for the refit, so a query never
//! observes a half-fitted matcher.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use faq_harness_core::embedding::Embedder;
use faq_harness_core::matcher::{HybridMatcher, MatchMethod};
use faq_harness_core::models::{ChatTurn, FaqRecord, NewFaq};
use faq_harness_core::store::FaqStore;

use crate::chat::{self, ChatReply};
use crate::config::Config;
use crate::embedding::create_embedder;
use crate::sqlite_store::SqliteStore;
use crate::{db, import, migrate};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<dyn FaqStore>,
    matcher: Arc<RwLock<HybridMatcher>>,
}

/// Start the server with the embedding backend named in the config.
///
/// Connects to SQLite, applies migrations, fits the matcher, then serves on
/// `[server].bind` until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let embedder: Arc<dyn Embedder> = Arc::from(create_embedder(&config.embedding)?);
    run_server_with_embedder(config, embedder).await
}

/// Start the server with an explicit embedding backend.
///
/// Used by tests and by hosts that bring their own model.
pub async fn run_server_with_embedder(
    config: &Config,
    embedder: Arc<dyn Embedder>,
) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::apply_schema(&pool).await?;
    let store: Arc<dyn FaqStore> = Arc::new(SqliteStore::new(pool));

    let mut matcher = HybridMatcher::new(store.clone(), embedder, config.matcher.params());
    matcher.fit().await?;

    let state = AppState {
        config: Arc::new(config.clone()),
        store,
        matcher: Arc::new(RwLock::new(matcher)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/chat", post(handle_chat))
        .route("/faqs", get(handle_faqs))
        .route("/history", get(handle_history))
        .route("/admin/import", post(handle_import))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    let bind_addr = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("FAQ server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(err: anyhow::Error) -> AppError {
    tracing::error!(error = %err, "request failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: err.to_string(),
    }
}

// ============ POST /chat ============

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    method: Option<String>,
}

async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;
    if req.message.trim().is_empty() {
        return Err(bad_request("message must not be empty"));
    }
    let method = match req.method.as_deref() {
        Some(m) => m.parse::<MatchMethod>().map_err(bad_request)?,
        None => MatchMethod::Hybrid,
    };

    let matcher = state.matcher.read().await;
    let reply = chat::respond(
        &matcher,
        state.store.as_ref(),
        &state.config.chat,
        &req.message,
        method,
    )
    .await
    .map_err(internal)?;

    Ok(Json(reply))
}

// ============ GET /faqs ============

async fn handle_faqs(State(state): State<AppState>) -> Result<Json<Vec<FaqRecord>>, AppError> {
    let faqs = state.store.list_all_faqs().await.map_err(internal)?;
    Ok(Json(faqs))
}

// ============ GET /history ============

async fn handle_history(State(state): State<AppState>) -> Result<Json<Vec<ChatTurn>>, AppError> {
    let history = state
        .store
        .chat_history(state.config.chat.history_limit)
        .await
        .map_err(internal)?;
    Ok(Json(history))
}

// ============ POST /admin/import ============

#[derive(Deserialize)]
struct ImportRequest {
    #[serde(default)]
    faqs: Vec<NewFaq>,
}

#[derive(Serialize)]
struct ImportResponse {
    message: String,
    imported_count: usize,
}

async fn handle_import(
    State(state): State<AppState>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<Json<ImportResponse>, AppError> {
    let Json(req) = payload.map_err(|e| bad_request(e.body_text()))?;
    let faqs = import::clean(req.faqs);
    let imported_count = import::import_faqs(state.store.as_ref(), &faqs)
        .await
        .map_err(internal)?;

    state.matcher.write().await.fit().await.map_err(internal)?;

    Ok(Json(ImportResponse {
        message: format!("Successfully imported {} FAQs", imported_count),
        imported_count,
    }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    ready: bool,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ready: state.matcher.read().await.is_ready(),
    })
}
