//! The delegate hierarchy.
//!
//! ```text
//! run_supervisor(query, ctx)
//!   └── supervisor ──run_rag_agent──▶ rag_agent ──rag_tool──▶ tools::answer
//!                  └─run_sql_agent──▶ sql_agent ──sql_tool──▶ tools::sql_tool
//! ```
//!
//! Routing is entirely model-driven. Each nested delegate starts from a
//! fresh `[system, user(request)]` conversation and only its final message
//! is handed back to the caller.

use tracing::{debug, error};

use super::delegate::Delegate;
use super::executor::{RagToolExecutor, SqlToolExecutor, SupervisorExecutor};
use super::message::{ChatMessage, system_message, user_message};
use super::prompt::PromptSet;
use super::traits::execute_with_tools;
use crate::config::AppConfig;
use crate::context::ModelContext;
use crate::error::AgentError;
use crate::tools::Gateways;

/// Reply returned when the supervisor fails for any reason.
pub const SUPERVISOR_FAILED: &str = "[ERROR] Supervisor failed";

/// The supervisor and its two specialists, sharing one set of gateways.
#[derive(Debug, Clone)]
pub struct AgentTeam {
    gateways: Gateways,
    supervisor: Delegate,
    rag: Delegate,
    sql: Delegate,
}

impl AgentTeam {
    /// Assembles the team from configuration and prompts.
    #[must_use]
    pub fn new(gateways: Gateways, config: &AppConfig, prompts: PromptSet) -> Self {
        Self {
            gateways,
            supervisor: Delegate::supervisor(config, prompts.supervisor),
            rag: Delegate::rag(config, prompts.rag_agent),
            sql: Delegate::sql(config, prompts.sql_agent),
        }
    }

    /// The gateways the team's tools use.
    #[must_use]
    pub const fn gateways(&self) -> &Gateways {
        &self.gateways
    }

    fn fresh_conversation(request: &str) -> Vec<ChatMessage> {
        vec![user_message(request)]
    }

    /// Runs the RAG delegate on `request` and returns its final message.
    ///
    /// # Errors
    ///
    /// Propagates provider failures and tool-loop exhaustion.
    pub async fn run_rag_agent(
        &self,
        request: &str,
        ctx: Option<&ModelContext>,
    ) -> Result<String, AgentError> {
        debug!(request, "run_rag_agent");
        let executor = RagToolExecutor::new(&self.gateways, ctx);
        let response = execute_with_tools(
            &self.rag,
            self.gateways.models.provider(),
            Self::fresh_conversation(request),
            &executor,
        )
        .await?;
        Ok(response.content)
    }

    /// Runs the SQL delegate on `request` and returns its final message.
    ///
    /// # Errors
    ///
    /// Propagates provider failures and tool-loop exhaustion.
    pub async fn run_sql_agent(&self, request: &str) -> Result<String, AgentError> {
        debug!(request, "run_sql_agent");
        let executor = SqlToolExecutor::new(&self.gateways);
        let response = execute_with_tools(
            &self.sql,
            self.gateways.models.provider(),
            Self::fresh_conversation(request),
            &executor,
        )
        .await?;
        Ok(response.content)
    }

    /// Answers `query` through the supervisor.
    ///
    /// The context (defaults if `None`) is serialized into a system message
    /// and injected into any `rag_tool` call. Never fails: every error is
    /// logged and replaced by [`SUPERVISOR_FAILED`].
    pub async fn run_supervisor(&self, query: &str, ctx: Option<ModelContext>) -> String {
        let ctx = ctx.unwrap_or_default();
        let ctx_json = ctx.to_json();
        debug!(query, context = ctx_json, "supervisor");

        let conversation = vec![
            system_message(&format!("ModelContext: {ctx_json}")),
            user_message(query),
        ];
        let executor = SupervisorExecutor::new(self, Some(&ctx));

        match execute_with_tools(
            &self.supervisor,
            self.gateways.models.provider(),
            conversation,
            &executor,
        )
        .await
        {
            Ok(response) => response.content,
            Err(e) => {
                error!(error = %e, query, "supervisor failed");
                SUPERVISOR_FAILED.to_string()
            }
        }
    }
}
