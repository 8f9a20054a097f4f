//! Tool implementations backing the delegates and the HTTP routes.
//!
//! - [`rag`]: retrieve chunks and answer a question over them.
//! - [`sql`]: generate SQL from natural language, with or without schema
//!   retrieval.
//!
//! Both take their dependencies through [`Gateways`] rather than reaching
//! for process-wide state.

pub mod rag;
pub mod sql;

use std::sync::Arc;

use crate::agent::model::ModelGateway;
use crate::store::StoreGateway;

pub use rag::{RAG_ERROR_PREFIX, answer};
pub use sql::{SqlRequest, generate_sql, generate_sql_direct, sql_tool};

/// The two gateways every tool needs.
#[derive(Clone)]
pub struct Gateways {
    /// Vector store resolution.
    pub stores: Arc<dyn StoreGateway>,
    /// Chat model resolution.
    pub models: ModelGateway,
}

impl Gateways {
    /// Bundles a store gateway and a model gateway.
    #[must_use]
    pub fn new(stores: Arc<dyn StoreGateway>, models: ModelGateway) -> Self {
        Self { stores, models }
    }
}

impl std::fmt::Debug for Gateways {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateways")
            .field("models", &self.models)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fakes shared by the tool, executor and delegate tests.

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::Gateways;
    use crate::agent::message::{ChatRequest, ChatResponse};
    use crate::agent::model::ModelGateway;
    use crate::agent::provider::LlmProvider;
    use crate::error::{AgentError, StoreError};
    use crate::store::{Document, StoreGateway, VectorStore};

    /// Replays scripted responses and records every request.
    #[derive(Default)]
    pub struct ScriptedProvider {
        pub responses: Mutex<VecDeque<ChatResponse>>,
        pub requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        pub fn new(responses: Vec<ChatResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn text(content: &str) -> ChatResponse {
            ChatResponse {
                content: content.to_string(),
                tool_calls: Vec::new(),
                finish_reason: Some("stop".to_string()),
            }
        }

        pub fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
            if let Ok(mut seen) = self.requests.lock() {
                seen.push(request.clone());
            }
            self.responses
                .lock()
                .ok()
                .and_then(|mut r| r.pop_front())
                .ok_or_else(|| AgentError::ApiRequest {
                    message: "no scripted response left".to_string(),
                    status: None,
                })
        }
    }

    /// Store returning fixed search results and recording what was asked.
    pub struct FixedStore {
        pub results: Vec<Document>,
        pub fail_search: bool,
    }

    #[async_trait]
    impl VectorStore for FixedStore {
        async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, StoreError> {
            Ok(documents.len())
        }

        async fn similarity_search_with_score(
            &self,
            _query: &str,
            k: usize,
        ) -> Result<Vec<(Document, f32)>, StoreError> {
            if self.fail_search {
                return Err(StoreError::Embedding {
                    message: "embedding model not found".to_string(),
                });
            }
            Ok(self
                .results
                .iter()
                .take(k)
                .cloned()
                .enumerate()
                .map(|(i, d)| {
                    #[allow(clippy::cast_precision_loss)]
                    let score = i as f32 * 0.1;
                    (d, score)
                })
                .collect())
        }
    }

    /// Gateway handing out a [`FixedStore`] and recording the routing keys.
    #[derive(Default)]
    pub struct FixedGateway {
        pub results: Vec<Document>,
        pub fail: bool,
        pub fail_search: bool,
        pub lookups: Mutex<Vec<(String, String, String)>>,
    }

    impl FixedGateway {
        pub fn with_results(results: Vec<Document>) -> Self {
            Self {
                results,
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn failing_search() -> Self {
            Self {
                fail_search: true,
                ..Self::default()
            }
        }

        pub fn lookups(&self) -> Vec<(String, String, String)> {
            self.lookups.lock().map(|l| l.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl StoreGateway for FixedGateway {
        async fn get_store(
            &self,
            collection: &str,
            namespace: &str,
            embedding_model: &str,
        ) -> Result<Arc<dyn VectorStore>, StoreError> {
            if let Ok(mut l) = self.lookups.lock() {
                l.push((
                    collection.to_string(),
                    namespace.to_string(),
                    embedding_model.to_string(),
                ));
            }
            if self.fail {
                return Err(StoreError::Embedding {
                    message: "connection refused".to_string(),
                });
            }
            Ok(Arc::new(FixedStore {
                results: self.results.clone(),
                fail_search: self.fail_search,
            }))
        }
    }

    pub fn gateways(
        stores: Arc<FixedGateway>,
        provider: Arc<ScriptedProvider>,
    ) -> Gateways {
        Gateways::new(stores, ModelGateway::new(provider))
    }
}
