//! Document and schema ingestion pipelines.
//!
//! # Architecture
//!
//! ```text
//! ingest_document(filename, bytes, ctx)
//!   ├── FileKind::for_filename  (unsupported → error, no store access)
//!   ├── loader::load            → Vec<Document> tagged with source
//!   ├── merge ctx.metadata      (caller keys win)
//!   ├── TextSplitter            → chunks
//!   └── store(ctx.collection, ctx.namespace).add_documents
//!
//! ingest_schema(bytes, ctx)
//!   ├── SchemaText::parse       → db name + table sections
//!   ├── resolve_db_uri          → registry entry or sqlite file URI
//!   └── store("schemas", ctx.namespace).add_documents
//! ```

pub mod loader;
pub mod schema;
pub mod splitter;

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::context::ModelContext;
use crate::error::IngestError;
use crate::store::StoreGateway;
use crate::tools::sql::SCHEMA_COLLECTION;

pub use loader::FileKind;
pub use schema::{SchemaText, resolve_db_uri};
pub use splitter::TextSplitter;

const SUCCESS: &str = "success";

/// Result of a document ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentIngested {
    /// Always `"success"`.
    pub status: &'static str,
    /// Number of chunks stored.
    pub chunks: usize,
    /// Collection the chunks went into.
    pub collection: String,
}

/// Result of a schema ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaIngested {
    /// Always `"success"`.
    pub status: &'static str,
    /// Logical database name.
    pub db: String,
    /// Number of table chunks stored.
    pub tables: usize,
    /// Resolved connection URI.
    pub uri: String,
    /// Always `"schemas"`.
    pub collection: &'static str,
}

/// Where schema ingestion looks up and places database files.
#[derive(Debug, Clone, Copy)]
pub struct DbLocations<'a> {
    /// JSON registry of `name → URI`.
    pub registry_path: &'a Path,
    /// Directory for fallback `SQLite` files.
    pub data_dir: &'a Path,
}

/// Loads, splits and stores an uploaded document.
///
/// # Errors
///
/// Returns [`IngestError::UnsupportedFileType`] before touching the store
/// when the extension has no loader; otherwise loader, chunking or store
/// failures.
pub async fn ingest_document(
    stores: &dyn StoreGateway,
    filename: &str,
    bytes: &[u8],
    ctx: &ModelContext,
) -> Result<DocumentIngested, IngestError> {
    let kind = FileKind::for_filename(filename)?;
    let splitter = TextSplitter::new(ctx.chunk_size, ctx.chunk_overlap)?;

    let mut docs = loader::load(kind, filename, bytes)?;
    for doc in &mut docs {
        for (key, value) in &ctx.metadata {
            doc.metadata.insert(key.clone(), value.clone());
        }
    }
    let chunks = splitter.split_documents(&docs);
    debug!(filename, documents = docs.len(), chunks = chunks.len(), "document split");

    let store = stores
        .get_store(&ctx.collection, &ctx.namespace, &ctx.embedding_model)
        .await?;
    let stored = store.add_documents(chunks).await?;

    info!(
        filename,
        chunks = stored,
        collection = ctx.collection,
        namespace = ctx.namespace,
        "document ingested"
    );
    Ok(DocumentIngested {
        status: SUCCESS,
        chunks: stored,
        collection: ctx.collection.clone(),
    })
}

/// Parses a schema description and stores one chunk per table.
///
/// # Errors
///
/// Returns registry, I/O or store failures.
pub async fn ingest_schema(
    stores: &dyn StoreGateway,
    bytes: &[u8],
    ctx: &ModelContext,
    locations: DbLocations<'_>,
) -> Result<SchemaIngested, IngestError> {
    let text = String::from_utf8_lossy(bytes);
    let parsed = SchemaText::parse(&text);
    let db = parsed.db.clone();
    let uri = resolve_db_uri(&db, locations.registry_path, locations.data_dir)?;

    let docs = parsed.into_documents(&uri);
    let tables = docs.len();

    let store = stores
        .get_store(SCHEMA_COLLECTION, &ctx.namespace, &ctx.embedding_model)
        .await?;
    store.add_documents(docs).await?;

    info!(db, tables, uri, namespace = ctx.namespace, "schema ingested");
    Ok(SchemaIngested {
        status: SUCCESS,
        db,
        tables,
        uri,
        collection: SCHEMA_COLLECTION,
    })
}
