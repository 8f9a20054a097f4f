//! `POST /sql/generate`: direct text-to-SQL.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;

use super::error::ApiError;
use super::state::AppState;
use crate::tools::{SqlRequest, generate_sql_direct};

/// SQL generation response body.
#[derive(Debug, Serialize)]
pub struct SqlReply {
    /// Raw model output.
    pub query: String,
}

/// Asks the model for SQL without schema retrieval and returns its raw text.
pub async fn generate(
    State(state): State<AppState>,
    body: Result<Json<SqlRequest>, JsonRejection>,
) -> Result<Json<SqlReply>, ApiError> {
    let Json(request) = body?;
    let query = generate_sql_direct(&state.gateways().models, &request).await?;
    Ok(Json(SqlReply { query }))
}
