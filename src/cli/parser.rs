//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::context::DEFAULT_LLM_MODEL;
use crate::tools::sql::DEFAULT_DIALECT;

/// RAGSQL-RS: retrieval, text-to-SQL and a supervisor agent over Ollama.
///
/// Runs the HTTP API, or exercises the agents directly from the shell.
#[derive(Parser, Debug)]
#[command(name = "ragsql-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base URL of the Ollama runtime.
    ///
    /// Defaults to `http://localhost:11434`.
    #[arg(long, env = "OLLAMA_BASE_URL", global = true)]
    pub ollama_url: Option<String>,

    /// Root directory of the vector store.
    ///
    /// Defaults to `./vectorstore`.
    #[arg(long, env = "RAGSQL_PERSIST_DIR", global = true)]
    pub persist_dir: Option<PathBuf>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API.
    #[command(after_help = r#"Examples:
  ragsql-rs serve                         # Listen on 0.0.0.0:8000
  ragsql-rs serve --port 9000             # Custom port
  ragsql-rs serve --host 127.0.0.1        # Local only
"#)]
    Serve {
        /// Host to bind.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on.
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Ask the supervisor agent a question.
    ///
    /// The supervisor decides whether to consult the document store or
    /// write SQL, and prints its final answer.
    #[command(after_help = r#"Examples:
  ragsql-rs chat "What does the onboarding guide say about VPN access?"
  ragsql-rs chat "Top 5 customers by revenue" --context '{"namespace":"acme"}'
"#)]
    Chat {
        /// User query.
        query: String,

        /// Model context as a JSON object.
        #[arg(short, long)]
        context: Option<String>,
    },

    /// Generate SQL grounded in ingested schemas.
    #[command(after_help = r#"Examples:
  ragsql-rs sql "How many orders shipped last week?"
  ragsql-rs sql "List active users" --dialect postgresql
"#)]
    Sql {
        /// Natural-language question.
        question: String,

        /// Target SQL dialect.
        #[arg(short, long, default_value = DEFAULT_DIALECT)]
        dialect: String,

        /// Model that writes the statement.
        #[arg(short, long, default_value = DEFAULT_LLM_MODEL)]
        model: String,
    },

    /// Write default prompt templates to disk for customization.
    ///
    /// Existing files are left untouched.
    #[command(name = "init-prompts")]
    #[command(after_help = r#"Examples:
  ragsql-rs init-prompts                       # Write to ~/.config/ragsql-rs/prompts/
  ragsql-rs init-prompts --dir ./my-prompts    # Write to custom directory
"#)]
    InitPrompts {
        /// Target directory for prompt templates.
        ///
        /// Defaults to `~/.config/ragsql-rs/prompts/`.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}
