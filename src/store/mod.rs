//! Vector store gateway.
//!
//! Resolves a `(collection, namespace, embedding model)` triple to a
//! searchable store handle. Namespaces map to directories under the persist
//! root; collections partition documents inside a namespace. Keys are opaque
//! caller-chosen strings with no uniqueness checks.
//!
//! # Architecture
//!
//! ```text
//! StoreGateway::get_store(collection, namespace, model)
//!   ├── create_dir_all(<persist_dir>/<namespace>)
//!   ├── open <namespace>/store.sqlite3
//!   └── SqliteVectorStore { collection, Embedder(model) }
//!         ├── add_documents → embed → INSERT
//!         └── similarity_search → embed query → cosine distance scan
//! ```

pub mod embedding;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

pub use embedding::{Embedder, EmbedderFactory, OpenAiEmbedderFactory};
pub use sqlite::{SqliteStoreGateway, SqliteVectorStore};

/// A unit of text stored in and returned from a vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Chunk text.
    pub content: String,
    /// Arbitrary metadata (source file, table name, caller metadata, …).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    /// Creates a document with empty metadata.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Map::new(),
        }
    }

    /// Creates a document with the given metadata.
    #[must_use]
    pub fn with_metadata(content: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// A searchable handle onto one collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Embeds and persists `documents`, returning how many were stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if embedding or persistence fails.
    async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, StoreError>;

    /// Returns up to `k` documents closest to `query`, closest first, each
    /// paired with its distance (lower is closer).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if embedding or the scan fails.
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>, StoreError>;

    /// Like [`VectorStore::similarity_search_with_score`] without scores.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if embedding or the scan fails.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .similarity_search_with_score(query, k)
            .await?
            .into_iter()
            .map(|(doc, _)| doc)
            .collect())
    }
}

/// Resolves routing keys to store handles.
#[async_trait]
pub trait StoreGateway: Send + Sync {
    /// Returns a handle for `collection` in `namespace`, embedding with
    /// `embedding_model`. Creates the namespace directory if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the directory or database
    /// cannot be initialised.
    async fn get_store(
        &self,
        collection: &str,
        namespace: &str,
        embedding_model: &str,
    ) -> Result<Arc<dyn VectorStore>, StoreError>;
}
