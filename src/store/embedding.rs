//! Text embedding backends.
//!
//! The store only needs "texts in, vectors out"; the production backend is
//! the runtime's OpenAI-compatible `/v1/embeddings` endpoint.

use std::sync::Arc;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::CreateEmbeddingRequestArgs;
use async_trait::async_trait;
use tracing::debug;

use crate::error::StoreError;

/// Turns texts into vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds each text, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Embedding`] if the model cannot be reached or
    /// returns the wrong number of vectors.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError>;
}

/// Builds an [`Embedder`] for a named embedding model.
pub trait EmbedderFactory: Send + Sync {
    /// Returns an embedder bound to `model`.
    fn embedder(&self, model: &str) -> Arc<dyn Embedder>;
}

/// Factory producing [`OpenAiEmbedder`]s over one shared client.
#[derive(Clone)]
pub struct OpenAiEmbedderFactory {
    client: Client<OpenAIConfig>,
}

impl OpenAiEmbedderFactory {
    /// Creates a factory over `client`.
    #[must_use]
    pub const fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }
}

impl EmbedderFactory for OpenAiEmbedderFactory {
    fn embedder(&self, model: &str) -> Arc<dyn Embedder> {
        debug!(model, "loading embedding model");
        Arc::new(OpenAiEmbedder {
            client: self.client.clone(),
            model: model.to_string(),
        })
    }
}

/// Embeds through an OpenAI-compatible endpoint.
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(texts.to_vec())
            .build()
            .map_err(|e| StoreError::Embedding {
                message: e.to_string(),
            })?;

        let response =
            self.client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| StoreError::Embedding {
                    message: format!("{} ({})", e, self.model),
                })?;

        let mut data = response.data;
        if data.len() != texts.len() {
            return Err(StoreError::Embedding {
                message: format!(
                    "expected {} embeddings from {}, got {}",
                    texts.len(),
                    self.model,
                    data.len()
                ),
            });
        }
        data.sort_by_key(|e| e.index);
        Ok(data.into_iter().map(|e| e.embedding).collect())
    }
}
