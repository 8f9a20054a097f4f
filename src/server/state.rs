//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::client::create_provider;
use crate::agent::model::ModelGateway;
use crate::agent::prompt::PromptSet;
use crate::agent::providers::build_client;
use crate::agent::supervisor::AgentTeam;
use crate::config::AppConfig;
use crate::error::Result;
use crate::ingest::DbLocations;
use crate::store::{OpenAiEmbedderFactory, SqliteStoreGateway};
use crate::tools::Gateways;

/// State handed to every route. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    team: Arc<AgentTeam>,
    registry_path: Arc<PathBuf>,
    data_dir: Arc<PathBuf>,
}

impl AppState {
    /// Wires state from explicit gateways and prompts.
    #[must_use]
    pub fn new(gateways: Gateways, config: &AppConfig, prompts: PromptSet) -> Self {
        Self {
            team: Arc::new(AgentTeam::new(gateways, config, prompts)),
            registry_path: Arc::new(config.registry_path.clone()),
            data_dir: Arc::new(config.data_dir.clone()),
        }
    }

    /// Builds production state: an `SQLite` store under `persist_dir`, chat
    /// and embeddings through the configured OpenAI-compatible runtime, and
    /// prompts loaded from the prompt directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured provider is unsupported.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let provider = create_provider(config)?;
        let embedders = OpenAiEmbedderFactory::new(build_client(config));
        let stores = SqliteStoreGateway::new(config.persist_dir.clone(), Arc::new(embedders));
        let gateways = Gateways::new(Arc::new(stores), ModelGateway::new(Arc::from(provider)));
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        Ok(Self::new(gateways, config, prompts))
    }

    /// The delegate team.
    #[must_use]
    pub fn team(&self) -> &AgentTeam {
        &self.team
    }

    /// Store and model gateways.
    #[must_use]
    pub fn gateways(&self) -> &Gateways {
        self.team.gateways()
    }

    /// Registry and data directory for schema ingestion.
    #[must_use]
    pub fn db_locations(&self) -> DbLocations<'_> {
        DbLocations {
            registry_path: &self.registry_path,
            data_dir: &self.data_dir,
        }
    }
}
