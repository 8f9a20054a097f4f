//! System prompts for the delegates.
//!
//! Prompts can be overridden per file from a template directory; anything
//! missing falls back to the compiled-in default.

use std::path::{Path, PathBuf};

/// System prompt for the supervisor.
pub const SUPERVISOR_SYSTEM_PROMPT: &str = "You are the Supervisor Agent for a hybrid RAG + SQL system.\n\
Use run_rag_agent for document or knowledge-base queries.\n\
Use run_sql_agent for analytical or structured-data questions.\n\
Return a clear, concise final answer.";

/// System prompt for the RAG delegate.
pub const RAG_AGENT_SYSTEM_PROMPT: &str =
    "You are the RAG Agent. Use rag_tool to answer document-based questions.";

/// System prompt for the SQL delegate.
pub const SQL_AGENT_SYSTEM_PROMPT: &str =
    "You are the SQL Agent. Use sql_tool to generate SQL from natural language.";

/// Environment variable naming the prompt directory.
pub const PROMPT_DIR_ENV: &str = "RAGSQL_PROMPT_DIR";

/// Default prompt directory under the user's home.
const DEFAULT_PROMPT_DIR: &str = ".config/ragsql-rs/prompts";

const SUPERVISOR_FILENAME: &str = "supervisor.md";
const RAG_AGENT_FILENAME: &str = "rag_agent.md";
const SQL_AGENT_FILENAME: &str = "sql_agent.md";

/// A set of system prompts for all delegates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    /// System prompt for the supervisor.
    pub supervisor: String,
    /// System prompt for the RAG delegate.
    pub rag_agent: String,
    /// System prompt for the SQL delegate.
    pub sql_agent: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::defaults()
    }
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for the directory:
    /// 1. Explicit `prompt_dir` argument
    /// 2. `RAGSQL_PROMPT_DIR` environment variable
    /// 3. `~/.config/ragsql-rs/prompts/`
    ///
    /// Each file is loaded independently; a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var(PROMPT_DIR_ENV).ok().map(PathBuf::from))
            .or_else(Self::default_dir);

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(path).ok())
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            supervisor: load_file(SUPERVISOR_FILENAME, SUPERVISOR_SYSTEM_PROMPT),
            rag_agent: load_file(RAG_AGENT_FILENAME, RAG_AGENT_SYSTEM_PROMPT),
            sql_agent: load_file(SQL_AGENT_FILENAME, SQL_AGENT_SYSTEM_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            supervisor: SUPERVISOR_SYSTEM_PROMPT.to_string(),
            rag_agent: RAG_AGENT_SYSTEM_PROMPT.to_string(),
            sql_agent: SQL_AGENT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (SUPERVISOR_FILENAME, SUPERVISOR_SYSTEM_PROMPT),
            (RAG_AGENT_FILENAME, RAG_AGENT_SYSTEM_PROMPT),
            (SQL_AGENT_FILENAME, SQL_AGENT_SYSTEM_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    ///
    /// Returns `None` if the home directory cannot be determined.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}
