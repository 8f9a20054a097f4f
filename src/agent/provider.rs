//! Pluggable LLM provider trait.
//!
//! Implementations translate [`ChatRequest`]/[`ChatResponse`] into a concrete
//! runtime's API so delegates and tools never depend on a particular client.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::AgentError;

/// Trait for chat runtime backends.
///
/// One call is one blocking round-trip from the caller's point of view: no
/// streaming, no retries, no caching.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g. `"openai"`).
    fn name(&self) -> &'static str;

    /// Executes a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] when the runtime is unreachable or
    /// rejects the request.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}
