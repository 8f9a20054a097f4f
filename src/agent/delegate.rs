//! The three tool-calling delegates: RAG, SQL and supervisor.
//!
//! They differ only in name, system prompt and tool set; all of them run on
//! the orchestrator model.

use async_trait::async_trait;

use super::tool::{ToolDefinition, ToolSet};
use super::traits::Agent;
use crate::config::AppConfig;

/// A delegate agent bound to one tool set.
#[derive(Debug, Clone)]
pub struct Delegate {
    name: &'static str,
    model: String,
    temperature: f32,
    max_tool_iterations: usize,
    system_prompt: String,
    tools: ToolSet,
}

impl Delegate {
    fn from_config(
        name: &'static str,
        config: &AppConfig,
        system_prompt: String,
        tools: ToolSet,
    ) -> Self {
        Self {
            name,
            model: config.orchestrator_model.clone(),
            temperature: config.orchestrator_temperature,
            max_tool_iterations: config.max_tool_iterations,
            system_prompt,
            tools,
        }
    }

    /// The RAG specialist, armed with `rag_tool`.
    #[must_use]
    pub fn rag(config: &AppConfig, system_prompt: String) -> Self {
        Self::from_config("rag_agent", config, system_prompt, ToolSet::rag_agent_tools())
    }

    /// The SQL specialist, armed with `sql_tool`.
    #[must_use]
    pub fn sql(config: &AppConfig, system_prompt: String) -> Self {
        Self::from_config("sql_agent", config, system_prompt, ToolSet::sql_agent_tools())
    }

    /// The supervisor, whose tools run the two specialists.
    #[must_use]
    pub fn supervisor(config: &AppConfig, system_prompt: String) -> Self {
        Self::from_config(
            "supervisor",
            config,
            system_prompt,
            ToolSet::supervisor_tools(),
        )
    }
}

#[async_trait]
impl Agent for Delegate {
    fn name(&self) -> &'static str {
        self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        self.tools.definitions().to_vec()
    }

    fn max_tool_iterations(&self) -> usize {
        self.max_tool_iterations
    }
}
