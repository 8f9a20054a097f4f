//! Agentic layer for ragsql-rs.
//!
//! A supervisor delegates to a RAG specialist and a SQL specialist, each of
//! which drives a tool-calling loop against an OpenAI-compatible chat
//! runtime (Ollama by default).
//!
//! # Architecture
//!
//! ```text
//! AgentTeam::run_supervisor(query, ctx)
//!   ├── Delegate::supervisor + SupervisorExecutor
//!   │   ├── run_rag_agent → Delegate::rag + RagToolExecutor → tools::answer
//!   │   └── run_sql_agent → Delegate::sql + SqlToolExecutor → tools::sql_tool
//!   └── agentic_loop: model → tool calls → tool results → model → …
//! ```

pub mod agentic_loop;
pub mod client;
pub mod delegate;
pub mod executor;
pub mod message;
pub mod model;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod supervisor;
pub mod tool;
pub mod traits;

// Re-export key types
pub use client::create_provider;
pub use delegate::Delegate;
pub use executor::{RagToolExecutor, SqlToolExecutor, SupervisorExecutor, ToolExecutor};
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role};
pub use model::{ChatModel, ModelGateway};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use supervisor::{AgentTeam, SUPERVISOR_FAILED};
pub use tool::{ToolCall, ToolDefinition, ToolResult, ToolSet};
pub use traits::{Agent, AgentResponse, execute_with_tools};
