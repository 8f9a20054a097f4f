//! HTTP façade.
//!
//! | Route | Method | Handler |
//! |---|---|---|
//! | `/` | GET | health message |
//! | `/chat/` | POST | [`chat::chat`] |
//! | `/rag/ingest-document` | POST multipart | [`rag::ingest_document`] |
//! | `/rag/ingest-schema` | POST multipart | [`rag::ingest_schema`] |
//! | `/retrieve/` | POST | [`retrieve::retrieve`] |
//! | `/sql/generate` | POST | [`sql::generate`] |

pub mod chat;
pub mod error;
pub mod rag;
pub mod retrieve;
pub mod sql;
pub mod state;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;
pub use state::AppState;

/// Health message returned by `GET /`.
pub const HEALTH_MESSAGE: &str = "RAG + SQL + Chat API is running successfully!";

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

async fn root() -> Json<Value> {
    Json(json!({ "message": HEALTH_MESSAGE }))
}

/// Builds the application router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/chat/", post(chat::chat))
        .route("/rag/ingest-document", post(rag::ingest_document))
        .route("/rag/ingest-schema", post(rag::ingest_schema))
        .route("/retrieve/", post(retrieve::retrieve))
        .route("/sql/generate", post(sql::generate))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API on `host:port` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("ragsql-rs listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}
