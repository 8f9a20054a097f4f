//! `SQLite`-backed vector store.
//!
//! One database file per namespace directory; every collection shares the
//! `documents` table. Similarity is brute-force cosine distance over the
//! collection's rows, which is adequate for the few thousand chunks a
//! namespace typically holds.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Connection, params};
use serde_json::{Map, Value};
use tracing::debug;

use super::embedding::{Embedder, EmbedderFactory};
use super::{Document, StoreGateway, VectorStore};
use crate::error::StoreError;

/// Database filename inside each namespace directory.
const STORE_FILENAME: &str = "store.sqlite3";
/// How long a writer waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    embedding_model TEXT NOT NULL,
    content TEXT NOT NULL,
    metadata TEXT NOT NULL,
    embedding BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, embedding_model);
";

/// Gateway that opens one [`SqliteVectorStore`] per call.
pub struct SqliteStoreGateway {
    persist_dir: PathBuf,
    embedders: Arc<dyn EmbedderFactory>,
}

impl SqliteStoreGateway {
    /// Creates a gateway rooted at `persist_dir`.
    #[must_use]
    pub fn new(persist_dir: impl Into<PathBuf>, embedders: Arc<dyn EmbedderFactory>) -> Self {
        Self {
            persist_dir: persist_dir.into(),
            embedders,
        }
    }

    /// Root directory holding the namespace directories.
    #[must_use]
    pub fn persist_dir(&self) -> &Path {
        &self.persist_dir
    }
}

#[async_trait]
impl StoreGateway for SqliteStoreGateway {
    async fn get_store(
        &self,
        collection: &str,
        namespace: &str,
        embedding_model: &str,
    ) -> Result<Arc<dyn VectorStore>, StoreError> {
        let dir = self.persist_dir.join(namespace);
        let conn = tokio::task::spawn_blocking(move || open_namespace(&dir))
            .await
            .map_err(|e| StoreError::Task {
                message: e.to_string(),
            })??;

        debug!(collection, namespace, embedding_model, "opened vector store");
        Ok(Arc::new(SqliteVectorStore {
            conn: Arc::new(Mutex::new(conn)),
            collection: collection.to_string(),
            embedding_model: embedding_model.to_string(),
            embedder: self.embedders.embedder(embedding_model),
        }))
    }
}

/// Ensures the namespace directory exists and opens its database.
///
/// `create_dir_all` succeeds when the directory already exists, including
/// when another request created it concurrently.
fn open_namespace(dir: &Path) -> Result<Connection, StoreError> {
    std::fs::create_dir_all(dir).map_err(|e| StoreError::Unavailable {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let path = dir.join(STORE_FILENAME);
    let unavailable = |e: rusqlite::Error| StoreError::Unavailable {
        path: path.clone(),
        message: e.to_string(),
    };
    let conn = Connection::open(&path).map_err(unavailable)?;
    conn.busy_timeout(BUSY_TIMEOUT).map_err(unavailable)?;
    conn.execute_batch(SCHEMA).map_err(unavailable)?;
    Ok(conn)
}

/// Handle onto one collection of a namespace database.
pub struct SqliteVectorStore {
    conn: Arc<Mutex<Connection>>,
    collection: String,
    embedding_model: String,
    embedder: Arc<dyn Embedder>,
}

impl SqliteVectorStore {
    /// Opens a store over an existing connection (used by tests).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the schema cannot be created.
    pub fn from_connection(
        conn: Connection,
        collection: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            collection: collection.to_string(),
            embedding_model: "custom".to_string(),
            embedder,
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|e| StoreError::Task {
                message: format!("connection lock poisoned: {e}"),
            })?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Task {
            message: e.to_string(),
        })?
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, StoreError> {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;

        let collection = self.collection.clone();
        let model = self.embedding_model.clone();
        let count = documents.len();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO documents (collection, embedding_model, content, metadata, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;
                for (doc, vector) in documents.iter().zip(&vectors) {
                    let metadata = serde_json::to_string(&doc.metadata)?;
                    stmt.execute(params![
                        collection,
                        model,
                        doc.content,
                        metadata,
                        encode_vector(vector)
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await?;

        debug!(collection = self.collection, count, "stored documents");
        Ok(count)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>, StoreError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Embedding {
                message: "no embedding returned for query".to_string(),
            })?;

        let collection = self.collection.clone();
        let model = self.embedding_model.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT content, metadata, embedding FROM documents
                 WHERE collection = ?1 AND embedding_model = ?2",
            )?;
            let rows = stmt.query_map(params![collection, model], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Vec<u8>>(2)?,
                ))
            })?;

            let mut scored = Vec::new();
            for row in rows {
                let (content, metadata, blob) = row?;
                let vector = decode_vector(&blob);
                if vector.len() != query_vector.len() {
                    continue;
                }
                let metadata: Map<String, Value> = serde_json::from_str(&metadata)?;
                let distance = cosine_distance(&query_vector, &vector);
                scored.push((Document::with_metadata(content, metadata), distance));
            }

            scored.sort_by(|a, b| a.1.total_cmp(&b.1));
            scored.truncate(k);
            Ok(scored)
        })
        .await
    }
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// `1 - cos(a, b)`; zero vectors are treated as maximally dissimilar.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}
