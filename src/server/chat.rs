//! `POST /chat/`: supervisor conversation.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::state::AppState;
use crate::context::ModelContext;

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    /// User query.
    pub query: String,
    /// Optional model context; defaults apply when absent.
    #[serde(default)]
    pub context: Option<ModelContext>,
}

/// Chat response body.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    /// Supervisor's final answer, or `[ERROR] Supervisor failed`.
    pub response: String,
}

/// Runs the supervisor. Pipeline failures are reported inside `response`,
/// never as an HTTP error.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(body) = body?;
    let response = state.team().run_supervisor(&body.query, body.context).await;
    Ok(Json(ChatReply { response }))
}
