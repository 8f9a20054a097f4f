//! Command implementations.
//!
//! Each command returns the text to print on success; `serve` runs until
//! shutdown and returns an empty string.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::agent::prompt::PromptSet;
use crate::cli::parser::{Cli, Commands};
use crate::config::AppConfig;
use crate::context::ModelContext;
use crate::server::{self, AppState};
use crate::tools::generate_sql;

/// Executes the parsed command.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the command fails.
pub async fn execute(cli: &Cli) -> Result<String> {
    match &cli.command {
        Commands::Serve { host, port } => cmd_serve(cli, host, *port).await,
        Commands::Chat { query, context } => cmd_chat(cli, query, context.as_deref()).await,
        Commands::Sql {
            question,
            dialect,
            model,
        } => cmd_sql(cli, question, dialect, model).await,
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref()),
    }
}

/// Resolves configuration from the environment plus CLI overrides.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut builder = AppConfig::builder();
    if let Some(url) = &cli.ollama_url {
        builder = builder.ollama_base_url(url);
    }
    if let Some(dir) = &cli.persist_dir {
        builder = builder.persist_dir(dir);
    }
    let config = builder
        .from_env()
        .build()
        .context("invalid configuration")?;
    debug!(
        base_url = %config.ollama_base_url,
        persist_dir = %config.persist_dir.display(),
        "configuration loaded"
    );
    Ok(config)
}

fn build_state(cli: &Cli) -> Result<AppState> {
    let config = load_config(cli)?;
    AppState::from_config(&config).context("failed to initialize agents")
}

async fn cmd_serve(cli: &Cli, host: &str, port: u16) -> Result<String> {
    let state = build_state(cli)?;
    server::serve(state, host, port).await?;
    Ok(String::new())
}

async fn cmd_chat(cli: &Cli, query: &str, context: Option<&str>) -> Result<String> {
    let ctx = context
        .map(ModelContext::from_json_str)
        .transpose()
        .context("invalid --context")?;
    let state = build_state(cli)?;
    Ok(state.team().run_supervisor(query, ctx).await)
}

async fn cmd_sql(cli: &Cli, question: &str, dialect: &str, model: &str) -> Result<String> {
    let state = build_state(cli)?;
    let sql = generate_sql(state.gateways(), question, dialect, model)
        .await
        .context("SQL generation failed")?;
    Ok(sql)
}

fn cmd_init_prompts(dir: Option<&Path>) -> Result<String> {
    let target_dir = dir
        .map(Path::to_path_buf)
        .or_else(PromptSet::default_dir)
        .context("could not determine home directory for default prompt path")?;

    let written = PromptSet::write_defaults(&target_dir).with_context(|| {
        format!(
            "failed to write prompt templates to {}",
            target_dir.display()
        )
    })?;

    if written.is_empty() {
        return Ok(format!(
            "All prompt templates already exist in: {}",
            target_dir.display()
        ));
    }

    let mut output = format!(
        "Wrote {} prompt template(s) to: {}\n",
        written.len(),
        target_dir.display()
    );
    for path in &written {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        output.push_str(&format!("  {name}\n"));
    }
    output.push_str("\nEdit these files to customize agent system prompts.");
    Ok(output)
}
