//! Agentic tool-calling loop.
//!
//! Drives the model ↔ tool round-trip shared by every delegate:
//!
//! ```text
//! awaiting-model ──tool calls──▶ executing-tool ──results──▶ awaiting-model
//!       │
//!       └──plain answer──▶ done
//! ```
//!
//! Tool failures are not fatal: their error text is fed back as the tool's
//! result and the model decides what to do next.

use tracing::debug;

use super::executor::ToolExecutor;
use super::message::{ChatRequest, ChatResponse, assistant_tool_calls_message, tool_message};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Runs an agentic loop: model → tool calls → tool results → model → …
///
/// Continues until the model responds without tool calls (a final text
/// answer) or `max_iterations` model calls have requested tools.
///
/// # Arguments
///
/// * `provider` - LLM provider to call.
/// * `request` - Initial chat request (mutated in-place with tool messages).
/// * `executor` - Dispatches tool calls.
/// * `max_iterations` - Limit on model round-trips that request tools.
///
/// # Errors
///
/// Returns [`AgentError::ToolLoopExceeded`] if the model keeps requesting
/// tools beyond `max_iterations`. Propagates provider errors.
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    executor: &dyn ToolExecutor,
    max_iterations: usize,
) -> Result<ChatResponse, AgentError> {
    for iteration in 0..max_iterations {
        let response = provider.chat(request).await?;

        if response.tool_calls.is_empty() {
            debug!(iteration, "agentic loop completed with final text response");
            return Ok(response);
        }

        debug!(
            iteration,
            tool_count = response.tool_calls.len(),
            "executing tool calls"
        );

        request.messages.push(assistant_tool_calls_message(
            &response.content,
            response.tool_calls.clone(),
        ));

        for call in &response.tool_calls {
            let result = executor.execute(call).await;
            debug!(
                tool = call.name,
                call_id = call.id,
                is_error = result.is_error,
                "tool execution complete"
            );
            request
                .messages
                .push(tool_message(&result.tool_call_id, &result.content));
        }
    }

    Err(AgentError::ToolLoopExceeded { max_iterations })
}
