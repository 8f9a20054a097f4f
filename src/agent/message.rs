//! Provider-agnostic chat message types.
//!
//! Delegates build conversations out of these; providers translate them to
//! whatever wire format the runtime speaks.

use serde::{Deserialize, Serialize};

use super::tool::{ToolCall, ToolDefinition};

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// User input.
    User,
    /// Model output.
    Assistant,
    /// Tool result.
    Tool,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Tool calls requested by the assistant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Tool call this message answers (tool messages only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A chat completion request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier (e.g. `qwen3:1.7b`).
    pub model: String,
    /// Conversation so far, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Tools the model may call. Empty means plain completion.
    pub tools: Vec<ToolDefinition>,
}

impl ChatRequest {
    /// Builds a tool-less request holding a single user prompt.
    #[must_use]
    pub fn prompt(model: &str, temperature: f32, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![user_message(prompt)],
            temperature: Some(temperature),
            max_tokens: None,
            tools: Vec::new(),
        }
    }
}

/// A chat completion response.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// Generated text.
    pub content: String,
    /// Tool calls requested by the model; empty for a final answer.
    pub tool_calls: Vec<ToolCall>,
    /// Finish reason reported by the runtime (e.g. `"stop"`, `"tool_calls"`).
    pub finish_reason: Option<String>,
}

/// Creates a system message.
#[must_use]
pub fn system_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::System,
        content: content.to_string(),
        tool_calls: Vec::new(),
        tool_call_id: None,
    }
}

/// Creates a user message.
#[must_use]
pub fn user_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::User,
        content: content.to_string(),
        tool_calls: Vec::new(),
        tool_call_id: None,
    }
}

/// Creates the assistant turn that requested `tool_calls`.
///
/// Any text the model produced alongside the calls is kept.
#[must_use]
pub fn assistant_tool_calls_message(content: &str, tool_calls: Vec<ToolCall>) -> ChatMessage {
    ChatMessage {
        role: Role::Assistant,
        content: content.to_string(),
        tool_calls,
        tool_call_id: None,
    }
}

/// Creates a tool result message.
#[must_use]
pub fn tool_message(tool_call_id: &str, content: &str) -> ChatMessage {
    ChatMessage {
        role: Role::Tool,
        content: content.to_string(),
        tool_calls: Vec::new(),
        tool_call_id: Some(tool_call_id.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_request_has_single_user_turn() {
        let request = ChatRequest::prompt("qwen3:1.7b", 0.3, "Context:\nabc\n\nUser: hi");
        assert_eq!(request.model, "qwen3:1.7b");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert!(request.tools.is_empty());
        assert_eq!(request.temperature, Some(0.3));
    }

    #[test]
    fn test_tool_message_links_call() {
        let msg = tool_message("call_7", r#"{"sql":"SELECT 1"}"#);
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_7"));
    }

    #[test]
    fn test_assistant_tool_calls_keep_text() {
        let msg = assistant_tool_calls_message(
            "Let me look that up.",
            vec![ToolCall {
                id: "call_1".to_string(),
                name: "run_rag_agent".to_string(),
                arguments: r#"{"request":"vacation policy"}"#.to_string(),
            }],
        );
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "Let me look that up.");
        assert_eq!(msg.tool_calls[0].name, "run_rag_agent");
    }

    #[test]
    fn test_serialization_omits_empty_tool_fields() {
        let json = serde_json::to_string(&system_message("You are the SQL Agent."))
            .unwrap_or_default();
        assert!(json.contains("\"system\""));
        assert!(!json.contains("tool_calls"));
        assert!(!json.contains("tool_call_id"));
    }
}
