//! Natural-language to SQL generation.
//!
//! Two flavours exist: [`generate_sql`] grounds the prompt in schema chunks
//! retrieved from the `schemas` collection, while [`generate_sql_direct`]
//! (used by `POST /sql/generate`) sends the question alone. Both return the
//! model's raw output untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use super::Gateways;
use crate::agent::model::ModelGateway;
use crate::context::{
    DEFAULT_EMBEDDING_MODEL, DEFAULT_LLM_MODEL, DEFAULT_NAMESPACE, DEFAULT_TEMPERATURE,
};
use crate::error::AgentError;

/// Collection holding ingested schema chunks.
pub const SCHEMA_COLLECTION: &str = "schemas";
/// Default SQL dialect.
pub const DEFAULT_DIALECT: &str = "sqlite";
/// Schema chunks retrieved per question.
const SCHEMA_K: usize = 5;

/// A SQL generation request as accepted by `sql_tool` and `/sql/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlRequest {
    /// Natural-language question.
    pub question: String,
    /// Target SQL dialect.
    #[serde(default = "default_dialect")]
    pub dialect: String,
    /// Chat model used for generation.
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
}

fn default_dialect() -> String {
    DEFAULT_DIALECT.to_string()
}

fn default_llm_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}

impl SqlRequest {
    /// Creates a request with the default dialect and model.
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            dialect: default_dialect(),
            llm_model: default_llm_model(),
        }
    }

    /// Parses a `sql_tool` payload.
    ///
    /// A JSON object is read field by field (missing or non-string fields
    /// take their defaults). Anything else, including malformed JSON, is
    /// treated as the question itself.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => {
                let field = |key: &str, default: fn() -> String| {
                    map.get(key)
                        .and_then(Value::as_str)
                        .map_or_else(default, str::to_string)
                };
                Self {
                    question: field("question", String::new),
                    dialect: field("dialect", default_dialect),
                    llm_model: field("llm_model", default_llm_model),
                }
            }
            _ => Self::new(raw),
        }
    }
}

/// Builds the schema-grounded generation prompt.
fn schema_prompt(schema: &str, question: &str, dialect: &str) -> String {
    format!(
        "You are an expert SQL assistant.\n\
         Use ONLY the following database schema context to generate the query.\n\n\
         Schema:\n{schema}\n\n\
         Question:\n{question}\n\n\
         Return only a valid {dialect} SQL statement. No explanations."
    )
}

/// Generates SQL for `question`, grounded in the nearest schema chunks.
///
/// Looks up `schemas` in the `global` namespace with the default embedding
/// model, takes the top five chunks in result order and asks `llm_model`
/// for a single statement.
///
/// # Errors
///
/// Propagates store and model failures.
pub async fn generate_sql(
    gateways: &Gateways,
    question: &str,
    dialect: &str,
    llm_model: &str,
) -> Result<String, AgentError> {
    debug!(dialect, question, "sql generation");

    let store = gateways
        .stores
        .get_store(SCHEMA_COLLECTION, DEFAULT_NAMESPACE, DEFAULT_EMBEDDING_MODEL)
        .await?;
    let schema = store
        .similarity_search(question, SCHEMA_K)
        .await?
        .into_iter()
        .map(|d| d.content)
        .collect::<Vec<_>>()
        .join("\n\n");

    let sql = gateways
        .models
        .get_model(llm_model, DEFAULT_TEMPERATURE)
        .invoke(&schema_prompt(&schema, question, dialect))
        .await?;
    debug!(sql, "sql generated");
    Ok(sql)
}

/// Generates SQL from the question alone, with no schema retrieval.
///
/// # Errors
///
/// Propagates model failures.
pub async fn generate_sql_direct(
    models: &ModelGateway,
    request: &SqlRequest,
) -> Result<String, AgentError> {
    let prompt = format!(
        "You are an expert SQL assistant. Generate a {} query for: {}",
        request.dialect, request.question
    );
    models
        .get_model(&request.llm_model, DEFAULT_TEMPERATURE)
        .invoke(&prompt)
        .await
}

/// The `sql_tool` body: parse the payload leniently, generate, and wrap the
/// result as `{"sql": ...}`.
///
/// # Errors
///
/// Propagates [`generate_sql`] failures; the tool loop feeds them back to
/// the model.
pub async fn sql_tool(gateways: &Gateways, request_json: &str) -> Result<String, AgentError> {
    let request = SqlRequest::parse_lenient(request_json);
    let sql = generate_sql(gateways, &request.question, &request.dialect, &request.llm_model).await?;
    let result = json!({ "sql": sql }).to_string();
    debug!(result, "sql_tool returning");
    Ok(result)
}
