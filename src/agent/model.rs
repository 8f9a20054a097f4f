//! Chat model gateway.
//!
//! Resolves a `(model, temperature)` pair to an invocable [`ChatModel`]
//! bound to the shared provider. Handles are cheap and never cached.

use std::sync::Arc;

use tracing::debug;

use super::message::ChatRequest;
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Hands out [`ChatModel`] handles over one provider.
#[derive(Clone)]
pub struct ModelGateway {
    provider: Arc<dyn LlmProvider>,
}

impl ModelGateway {
    /// Creates a gateway over `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Returns a handle for `model_id` sampled at `temperature`.
    #[must_use]
    pub fn get_model(&self, model_id: &str, temperature: f32) -> ChatModel {
        debug!(model = model_id, temperature, "loading chat model");
        ChatModel {
            provider: Arc::clone(&self.provider),
            model: model_id.to_string(),
            temperature,
        }
    }

    /// The underlying provider, for delegates that drive the tool loop themselves.
    #[must_use]
    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }
}

impl std::fmt::Debug for ModelGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelGateway")
            .field("provider", &self.provider.name())
            .finish()
    }
}

/// A chat model bound to a model id and temperature.
#[derive(Clone)]
pub struct ChatModel {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
}

impl ChatModel {
    /// Model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` as a single user message and returns the reply text untouched.
    ///
    /// # Errors
    ///
    /// Propagates the provider's [`AgentError`] verbatim.
    pub async fn invoke(&self, prompt: &str) -> Result<String, AgentError> {
        let request = ChatRequest::prompt(&self.model, self.temperature, prompt);
        let response = self.provider.chat(&request).await?;
        Ok(response.content)
    }
}
