//! Retrieval-augmented answering over one collection.

use serde_json::Value;
use tracing::{debug, error};

use super::Gateways;
use crate::context::ModelContext;
use crate::error::AgentError;

/// Prefix of every failure string the RAG tool returns.
pub const RAG_ERROR_PREFIX: &str = "[ERROR] RAG Tool failed:";

/// Number of retrieved chunks placed into the prompt. The `Sources` list
/// still reports every retrieved chunk.
const PROMPT_CHUNKS: usize = 3;

/// Answers `query` from the collection selected by `ctx` (defaults if `None`).
///
/// Never fails: any store or model error is logged and returned as a string
/// starting with [`RAG_ERROR_PREFIX`].
pub async fn answer(gateways: &Gateways, query: &str, ctx: Option<&ModelContext>) -> String {
    let default_ctx;
    let ctx = if let Some(ctx) = ctx {
        ctx
    } else {
        default_ctx = ModelContext::default();
        &default_ctx
    };

    match try_answer(gateways, query, ctx).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %e, query, "rag tool failed");
            format!("{RAG_ERROR_PREFIX} {e}")
        }
    }
}

async fn try_answer(
    gateways: &Gateways,
    query: &str,
    ctx: &ModelContext,
) -> Result<String, AgentError> {
    debug!(query, collection = ctx.collection, "rag tool");

    let store = gateways
        .stores
        .get_store(&ctx.collection, &ctx.namespace, &ctx.embedding_model)
        .await?;
    let docs = store.similarity_search(query, ctx.k).await?;

    let context_text = docs
        .iter()
        .take(PROMPT_CHUNKS)
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let model = gateways.models.get_model(&ctx.llm_model, ctx.temperature);
    let response = model
        .invoke(&format!("Context:\n{context_text}\n\nUser: {query}"))
        .await?;

    let sources: Vec<Value> = docs
        .into_iter()
        .map(|d| Value::Object(d.metadata))
        .collect();
    let sources = serde_json::to_string(&sources).unwrap_or_else(|_| "[]".to_string());

    Ok(format!("{response}\n\nSources: {sources}"))
}
