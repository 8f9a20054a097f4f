//! Tool executors that dispatch model tool calls to internal functions.
//!
//! Each delegate owns one executor: the specialists call straight into
//! [`crate::tools`], the supervisor's executor runs whole specialists. No
//! subprocesses and no reflection; dispatch is a `match` on the tool name.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::supervisor::AgentTeam;
use super::tool::{RAG_TOOL, RUN_RAG_AGENT, RUN_SQL_AGENT, SQL_TOOL, ToolCall, ToolResult};
use crate::context::ModelContext;
use crate::error::AgentError;
use crate::tools::{self, Gateways, RAG_ERROR_PREFIX};

/// Maximum raw byte length of tool argument JSON from the model.
const MAX_TOOL_ARGS_LEN: usize = 100_000;

/// Dispatches tool calls requested by the model.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Runs tool `name` with JSON-encoded `arguments`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolExecution`] for unknown tools or bad
    /// arguments, or whatever the tool itself propagates.
    async fn dispatch(&self, name: &str, arguments: &str) -> Result<String, AgentError>;

    /// Runs one tool call, folding any failure into an error result.
    ///
    /// Validates raw argument size before dispatch to reject oversized
    /// payloads.
    async fn execute(&self, call: &ToolCall) -> ToolResult {
        if call.arguments.len() > MAX_TOOL_ARGS_LEN {
            return ToolResult {
                tool_call_id: call.id.clone(),
                content: format!(
                    "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                    call.arguments.len()
                ),
                is_error: true,
            };
        }

        match self.dispatch(&call.name, &call.arguments).await {
            Ok(content) => ToolResult {
                tool_call_id: call.id.clone(),
                content,
                is_error: false,
            },
            Err(e) => ToolResult {
                tool_call_id: call.id.clone(),
                content: e.to_string(),
                is_error: true,
            },
        }
    }
}

fn unknown_tool(name: &str) -> AgentError {
    AgentError::ToolExecution {
        name: name.to_string(),
        message: "unknown tool".to_string(),
    }
}

fn invalid_arguments(name: &str, e: &serde_json::Error) -> AgentError {
    AgentError::ToolExecution {
        name: name.to_string(),
        message: format!("invalid arguments: {e}"),
    }
}

/// Executor for the RAG delegate's `rag_tool`.
///
/// Carries the request's [`ModelContext`] so the model never has to echo it
/// back; a `context` argument supplied by the model takes precedence.
pub struct RagToolExecutor<'a> {
    gateways: &'a Gateways,
    ctx: Option<&'a ModelContext>,
}

impl<'a> RagToolExecutor<'a> {
    /// Creates an executor bound to `gateways` and the request context.
    #[must_use]
    pub const fn new(gateways: &'a Gateways, ctx: Option<&'a ModelContext>) -> Self {
        Self { gateways, ctx }
    }
}

#[async_trait]
impl ToolExecutor for RagToolExecutor<'_> {
    async fn dispatch(&self, name: &str, arguments: &str) -> Result<String, AgentError> {
        #[derive(Deserialize)]
        struct Args {
            query: String,
            #[serde(default)]
            context: Option<Value>,
        }

        if name != RAG_TOOL {
            return Err(unknown_tool(name));
        }
        let args: Args =
            serde_json::from_str(arguments).map_err(|e| invalid_arguments(name, &e))?;

        // Model-supplied keys override the request context; omitted keys keep it.
        let supplied = match args.context {
            None | Some(Value::Null) => None,
            Some(value) => match self.ctx.cloned().unwrap_or_default().overlay(value) {
                Ok(ctx) => Some(ctx),
                Err(e) => return Ok(format!("{RAG_ERROR_PREFIX} invalid context: {e}")),
            },
        };

        let ctx = supplied.as_ref().or(self.ctx);
        debug!(query = args.query, model_supplied_context = supplied.is_some(), "rag_tool call");
        Ok(tools::answer(self.gateways, &args.query, ctx).await)
    }
}

/// Executor for the SQL delegate's `sql_tool`.
pub struct SqlToolExecutor<'a> {
    gateways: &'a Gateways,
}

impl<'a> SqlToolExecutor<'a> {
    /// Creates an executor bound to `gateways`.
    #[must_use]
    pub const fn new(gateways: &'a Gateways) -> Self {
        Self { gateways }
    }
}

#[async_trait]
impl ToolExecutor for SqlToolExecutor<'_> {
    async fn dispatch(&self, name: &str, arguments: &str) -> Result<String, AgentError> {
        #[derive(Deserialize)]
        struct Args {
            request_json: Value,
        }

        if name != SQL_TOOL {
            return Err(unknown_tool(name));
        }

        // Small models sometimes pass the payload as an object instead of a
        // JSON-encoded string, or skip the wrapper entirely.
        let payload = match serde_json::from_str::<Args>(arguments) {
            Ok(Args {
                request_json: Value::String(s),
            }) => s,
            Ok(Args { request_json }) => request_json.to_string(),
            Err(_) => arguments.to_string(),
        };
        tools::sql_tool(self.gateways, &payload).await
    }
}

/// Executor for the supervisor's delegate-running tools.
pub struct SupervisorExecutor<'a> {
    team: &'a AgentTeam,
    ctx: Option<&'a ModelContext>,
}

impl<'a> SupervisorExecutor<'a> {
    /// Creates an executor that runs delegates from `team`.
    #[must_use]
    pub const fn new(team: &'a AgentTeam, ctx: Option<&'a ModelContext>) -> Self {
        Self { team, ctx }
    }
}

#[async_trait]
impl ToolExecutor for SupervisorExecutor<'_> {
    async fn dispatch(&self, name: &str, arguments: &str) -> Result<String, AgentError> {
        #[derive(Deserialize)]
        struct Args {
            request: String,
        }

        if name != RUN_RAG_AGENT && name != RUN_SQL_AGENT {
            return Err(unknown_tool(name));
        }
        let args: Args =
            serde_json::from_str(arguments).map_err(|e| invalid_arguments(name, &e))?;
        if name == RUN_RAG_AGENT {
            self.team.run_rag_agent(&args.request, self.ctx).await
        } else {
            self.team.run_sql_agent(&args.request).await
        }
    }
}
