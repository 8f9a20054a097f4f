//! `POST /retrieve/`: raw similarity search.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::error::ApiError;
use super::state::AppState;
use crate::context::ModelContext;

/// Retrieve request body.
#[derive(Debug, Deserialize)]
pub struct RetrieveBody {
    /// Search text.
    pub query: String,
    /// Routing keys and `k`.
    pub context: ModelContext,
}

/// One search hit.
#[derive(Debug, Serialize)]
pub struct RetrievedChunk {
    /// Distance to the query; lower is closer.
    pub score: f32,
    /// Chunk metadata.
    pub metadata: Map<String, Value>,
    /// Chunk text.
    pub content: String,
}

/// Returns the `k` closest chunks, closest first.
pub async fn retrieve(
    State(state): State<AppState>,
    body: Result<Json<RetrieveBody>, JsonRejection>,
) -> Result<Json<Vec<RetrievedChunk>>, ApiError> {
    let Json(RetrieveBody { query, context: ctx }) = body?;
    debug!(query, collection = ctx.collection, k = ctx.k, "retrieve");

    let store = state
        .gateways()
        .stores
        .get_store(&ctx.collection, &ctx.namespace, &ctx.embedding_model)
        .await?;
    let hits = store
        .similarity_search_with_score(&query, ctx.k)
        .await?
        .into_iter()
        .map(|(doc, score)| RetrievedChunk {
            score,
            metadata: doc.metadata,
            content: doc.content,
        })
        .collect();

    Ok(Json(hits))
}
