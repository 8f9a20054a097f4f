//! Tool definitions for the delegate hierarchy.
//!
//! Each delegate gets a fixed [`ToolSet`]: the specialists wrap one tool
//! apiece and the supervisor's two tools each run a whole specialist.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Answers a question from document embeddings.
pub const RAG_TOOL: &str = "rag_tool";
/// Generates SQL from natural language.
pub const SQL_TOOL: &str = "sql_tool";
/// Runs the RAG delegate on a request.
pub const RUN_RAG_AGENT: &str = "run_rag_agent";
/// Runs the SQL delegate on a request.
pub const RUN_SQL_AGENT: &str = "run_sql_agent";

/// A tool definition sent to the model for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match an executor's dispatch table).
    pub name: String,
    /// What the tool does, as shown to the model.
    pub description: String,
    /// JSON Schema object describing the arguments.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call identifier assigned by the runtime.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
}

/// The outcome of one tool call, fed back to the model verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the call this result answers.
    pub tool_call_id: String,
    /// Tool output on success, error text on failure.
    pub content: String,
    /// Whether `content` is an error message.
    pub is_error: bool,
}

/// The tools bound to one delegate.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    definitions: Vec<ToolDefinition>,
}

impl ToolSet {
    /// Returns the tool definitions in this set.
    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Returns `true` if this set contains no tools.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the number of tools in this set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Consumes the set, returning its definitions.
    #[must_use]
    pub fn into_definitions(self) -> Vec<ToolDefinition> {
        self.definitions
    }

    /// Tools for the RAG delegate: `rag_tool`.
    #[must_use]
    pub fn rag_agent_tools() -> Self {
        Self {
            definitions: vec![def_rag_tool()],
        }
    }

    /// Tools for the SQL delegate: `sql_tool`.
    #[must_use]
    pub fn sql_agent_tools() -> Self {
        Self {
            definitions: vec![def_sql_tool()],
        }
    }

    /// Tools for the supervisor: `run_rag_agent` and `run_sql_agent`.
    #[must_use]
    pub fn supervisor_tools() -> Self {
        Self {
            definitions: vec![def_run_rag_agent(), def_run_sql_agent()],
        }
    }
}

fn def_rag_tool() -> ToolDefinition {
    ToolDefinition {
        name: RAG_TOOL.to_string(),
        description: "Retrieve and answer questions from document embeddings.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The question to answer from the document collection."
                },
                "context": {
                    "type": "object",
                    "description": "Optional ModelContext overriding collection, namespace, models or k."
                }
            },
            "required": ["query"]
        }),
    }
}

fn def_sql_tool() -> ToolDefinition {
    ToolDefinition {
        name: SQL_TOOL.to_string(),
        description: "Generate SQL query from natural language.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "request_json": {
                    "type": "string",
                    "description": "JSON object {\"question\", \"dialect\", \"llm_model\"} or a plain-text question."
                }
            },
            "required": ["request_json"]
        }),
    }
}

fn def_run_rag_agent() -> ToolDefinition {
    ToolDefinition {
        name: RUN_RAG_AGENT.to_string(),
        description: "Delegate a document or knowledge-base question to the RAG Agent and \
                      return its answer."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "request": {
                    "type": "string",
                    "description": "The request to forward to the RAG Agent."
                }
            },
            "required": ["request"]
        }),
    }
}

fn def_run_sql_agent() -> ToolDefinition {
    ToolDefinition {
        name: RUN_SQL_AGENT.to_string(),
        description: "Delegate an analytical or structured-data question to the SQL Agent and \
                      return the generated SQL."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "request": {
                    "type": "string",
                    "description": "The request to forward to the SQL Agent."
                }
            },
            "required": ["request"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(set: &ToolSet) -> Vec<&str> {
        set.definitions().iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_supervisor_only_delegates() {
        let set = ToolSet::supervisor_tools();
        assert_eq!(names(&set), vec![RUN_RAG_AGENT, RUN_SQL_AGENT]);
    }

    #[test]
    fn test_specialists_have_one_tool_each() {
        assert_eq!(names(&ToolSet::rag_agent_tools()), vec![RAG_TOOL]);
        assert_eq!(names(&ToolSet::sql_agent_tools()), vec![SQL_TOOL]);
    }

    #[test]
    fn test_default_set_is_empty() {
        let set = ToolSet::default();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_all_definitions_have_object_schemas() {
        let all = [
            def_rag_tool(),
            def_sql_tool(),
            def_run_rag_agent(),
            def_run_sql_agent(),
        ];
        for def in &all {
            assert!(!def.description.is_empty());
            assert_eq!(def.parameters["type"], "object");
            assert!(def.parameters["required"].is_array());
        }
    }
}
