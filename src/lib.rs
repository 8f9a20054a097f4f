//! # ragsql-rs
//!
//! HTTP service coordinating document retrieval (RAG), text-to-SQL
//! generation and a supervisor agent over a local Ollama runtime.
//!
//! ## Layout
//!
//! - [`context`]: per-request model and routing settings
//! - [`store`]: namespaced vector collections persisted in `SQLite`
//! - [`ingest`]: file loaders, text splitting and schema parsing
//! - [`tools`]: RAG answering and SQL generation
//! - [`agent`]: provider abstraction, tool-calling loop and the
//!   supervisor/RAG/SQL delegates
//! - [`server`]: the axum HTTP API
//! - [`cli`]: command-line entry points
//!
//! ## Example
//!
//! ```no_run
//! use ragsql_rs::config::AppConfig;
//! use ragsql_rs::server::{AppState, serve};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AppConfig::from_env()?;
//! let state = AppState::from_config(&config)?;
//! serve(state, "127.0.0.1", 8000).await
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod ingest;
pub mod server;
pub mod store;
pub mod tools;

pub use config::AppConfig;
pub use context::ModelContext;
pub use error::{AgentError, ConfigError, Error, IngestError, Result, StoreError};
