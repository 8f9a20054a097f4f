//! Error types for ragsql-rs.
//!
//! Each layer owns a `thiserror` enum; [`Error`] wraps them all for the
//! CLI and server entrypoints.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Agent, provider or tool failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Vector store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Document or schema ingestion failure.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid configuration context supplied by a caller.
    #[error("invalid context: {0}")]
    Context(#[from] serde_json::Error),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the agent layer (providers, tools, tool-calling loop).
#[derive(Debug, Error)]
pub enum AgentError {
    /// The chat runtime rejected the request or could not be reached.
    #[error("model request failed: {message}")]
    ApiRequest {
        /// Error text reported by the client.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// A tool call could not be executed.
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Tool name.
        name: String,
        /// Failure description.
        message: String,
    },

    /// The model kept requesting tools past the iteration limit.
    #[error("tool loop exceeded {max_iterations} iterations without a final answer")]
    ToolLoopExceeded {
        /// Configured limit.
        max_iterations: usize,
    },

    /// Unknown provider name in configuration.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// The rejected provider name.
        name: String,
    },

    /// Vector store failure surfaced through a tool.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by the vector store gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing directory or database could not be initialised.
    #[error("vector store unavailable at {}: {message}", path.display())]
    Unavailable {
        /// Directory or database path.
        path: PathBuf,
        /// Underlying failure.
        message: String,
    },

    /// The embedding model could not produce vectors.
    #[error("embedding failed: {message}")]
    Embedding {
        /// Underlying failure.
        message: String,
    },

    /// `SQLite` error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Metadata (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blocking task panicked or was cancelled.
    #[error("store task failed: {message}")]
    Task {
        /// Join error description.
        message: String,
    },
}

/// Errors raised while loading, splitting or registering ingested files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File extension has no loader.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// A loader could not parse the file.
    #[error("failed to load {kind} file: {message}")]
    Load {
        /// Loader kind (e.g. `"pdf"`).
        kind: &'static str,
        /// Parser error.
        message: String,
    },

    /// Chunk overlap exceeds chunk size.
    #[error("chunk overlap {chunk_overlap} is larger than chunk size {chunk_size}")]
    InvalidChunking {
        /// Requested chunk size.
        chunk_size: usize,
        /// Requested overlap.
        chunk_overlap: usize,
    },

    /// The database registry file is malformed.
    #[error("invalid database registry: {message}")]
    Registry {
        /// Parse error.
        message: String,
    },

    /// Storing chunks failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds an unusable value.
    #[error("invalid configuration for {field}: {message}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}
