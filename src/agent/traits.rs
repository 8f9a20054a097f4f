//! Agent trait definition.
//!
//! All delegates (RAG, SQL, supervisor) implement this trait, which gives a
//! uniform interface to the team that runs them.

use async_trait::async_trait;

use super::executor::ToolExecutor;
use super::message::{ChatMessage, ChatRequest, system_message};
use super::provider::LlmProvider;
use super::tool::ToolDefinition;
use crate::error::AgentError;

/// Response from an agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's final text output.
    pub content: String,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Trait implemented by all agents in the system.
///
/// Agents encapsulate a role with a fixed system prompt and model
/// configuration. Agents that call tools override [`Agent::tools`] and are
/// run through [`execute_with_tools`].
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response. `None` leaves it to the runtime.
    fn max_tokens(&self) -> Option<u32> {
        None
    }

    /// Tool definitions available to this agent.
    fn tools(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    /// Maximum tool-calling loop iterations before aborting.
    fn max_tool_iterations(&self) -> usize {
        10
    }

    /// Builds a request: the system prompt followed by `conversation`.
    fn request(&self, conversation: Vec<ChatMessage>, tools: Vec<ToolDefinition>) -> ChatRequest {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(system_message(self.system_prompt()));
        messages.extend(conversation);
        ChatRequest {
            model: self.model().to_string(),
            messages,
            temperature: Some(self.temperature()),
            max_tokens: self.max_tokens(),
            tools,
        }
    }

    /// Executes the agent on `conversation` without tools.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        conversation: Vec<ChatMessage>,
    ) -> Result<AgentResponse, AgentError> {
        let request = self.request(conversation, Vec::new());
        let response = provider.chat(&request).await?;

        Ok(AgentResponse {
            content: response.content,
            finish_reason: response.finish_reason,
        })
    }
}

/// Executes an agent with tool-calling support.
///
/// If the agent's [`Agent::tools`] returns definitions, builds a tool-enabled
/// request and runs the agentic loop. Otherwise falls through to
/// [`Agent::execute`].
///
/// # Errors
///
/// Returns [`AgentError`] on API failures or if the tool loop exceeds the
/// agent's max iterations. Tool failures are fed back to the model, not
/// returned.
pub async fn execute_with_tools(
    agent: &dyn Agent,
    provider: &dyn LlmProvider,
    conversation: Vec<ChatMessage>,
    executor: &dyn ToolExecutor,
) -> Result<AgentResponse, AgentError> {
    let tool_defs = agent.tools();

    if tool_defs.is_empty() {
        return agent.execute(provider, conversation).await;
    }

    let mut request = agent.request(conversation, tool_defs);
    let response = super::agentic_loop::agentic_loop(
        provider,
        &mut request,
        executor,
        agent.max_tool_iterations(),
    )
    .await?;

    Ok(AgentResponse {
        content: response.content,
        finish_reason: response.finish_reason,
    })
}
