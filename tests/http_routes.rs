//! End-to-end tests for the HTTP routes.
//!
//! Requests go through the full router with a scripted chat provider and a
//! real `SQLite` store backed by a keyword embedder, so no Ollama runtime is
//! needed.

#![allow(clippy::panic)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use ragsql_rs::agent::{ChatRequest, ChatResponse, LlmProvider, ModelGateway, PromptSet};
use ragsql_rs::config::AppConfig;
use ragsql_rs::error::{AgentError, StoreError};
use ragsql_rs::server::{AppState, HEALTH_MESSAGE, router};
use ragsql_rs::store::{Embedder, EmbedderFactory, SqliteStoreGateway, StoreGateway};
use ragsql_rs::tools::Gateways;

const BOUNDARY: &str = "ragsql-test-boundary";

/// Replies with queued texts, then fails.
struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|s| (*s).to_string()).collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<ChatRequest> {
        self.seen.lock().unwrap_or_else(|_| unreachable!()).clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.seen
            .lock()
            .unwrap_or_else(|_| unreachable!())
            .push(request.clone());
        let next = self
            .replies
            .lock()
            .unwrap_or_else(|_| unreachable!())
            .pop_front();
        next.map(|content| ChatResponse {
            content,
            tool_calls: Vec::new(),
            finish_reason: Some("stop".to_string()),
        })
        .ok_or_else(|| AgentError::ApiRequest {
            message: "connection refused".to_string(),
            status: None,
        })
    }
}

/// Counts occurrences of a few keywords.
struct KeywordEmbedder;

const KEYWORDS: [&str; 4] = ["vacation", "salary", "users", "orders"];

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                #[allow(clippy::cast_precision_loss)]
                let mut v: Vec<f32> = KEYWORDS
                    .iter()
                    .map(|k| lower.matches(k).count() as f32)
                    .collect();
                v.push(0.01);
                v
            })
            .collect())
    }
}

struct KeywordFactory;

impl EmbedderFactory for KeywordFactory {
    fn embedder(&self, _model: &str) -> Arc<dyn Embedder> {
        Arc::new(KeywordEmbedder)
    }
}

/// Store gateway that counts lookups and delegates to `SQLite`.
struct CountingGateway {
    inner: SqliteStoreGateway,
    opens: Mutex<usize>,
}

impl CountingGateway {
    fn opens(&self) -> usize {
        *self.opens.lock().unwrap_or_else(|_| unreachable!())
    }
}

#[async_trait]
impl StoreGateway for CountingGateway {
    async fn get_store(
        &self,
        collection: &str,
        namespace: &str,
        embedding_model: &str,
    ) -> Result<Arc<dyn ragsql_rs::store::VectorStore>, StoreError> {
        *self.opens.lock().unwrap_or_else(|_| unreachable!()) += 1;
        self.inner
            .get_store(collection, namespace, embedding_model)
            .await
    }
}

struct Harness {
    app: axum::Router,
    provider: Arc<ScriptedProvider>,
    stores: Arc<CountingGateway>,
    _dir: tempfile::TempDir,
}

fn harness(replies: &[&str]) -> Harness {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let root = dir.path();
    let config = AppConfig::builder()
        .persist_dir(root.join("store"))
        .registry_path(root.join("db_registry.json"))
        .data_dir(root.join("data"))
        .build()
        .unwrap_or_else(|e| panic!("config: {e}"));

    let provider = ScriptedProvider::new(replies);
    let stores = Arc::new(CountingGateway {
        inner: SqliteStoreGateway::new(config.persist_dir.clone(), Arc::new(KeywordFactory)),
        opens: Mutex::new(0),
    });
    let gateways = Gateways::new(stores.clone(), ModelGateway::new(provider.clone()));
    let state = AppState::new(gateways, &config, PromptSet::defaults());

    Harness {
        app: router(state),
        provider,
        stores,
        _dir: dir,
    }
}

fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|e| panic!("request: {e}"))
}

fn multipart_request(uri: &str, filename: &str, file: &str, context: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {file}\r\n\
         --{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"context\"\r\n\r\n\
         {context}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap_or_else(|e| panic!("request: {e}"))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|e| panic!("oneshot: {e}"));
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .unwrap_or_else(|e| panic!("body: {e}"))
        .to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let h = harness(&[]);
    let request = Request::builder()
        .uri("/")
        .body(Body::empty())
        .unwrap_or_else(|e| panic!("request: {e}"));

    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": HEALTH_MESSAGE }));
}

#[tokio::test]
async fn test_unsupported_upload_reports_error_without_touching_store() {
    let h = harness(&[]);

    let (status, body) = send(
        &h.app,
        multipart_request("/rag/ingest-document", "notes.docx", "binary", "{}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "error": "Unsupported file type: .docx" }));
    assert_eq!(h.stores.opens(), 0);
}

#[tokio::test]
async fn test_ingest_then_retrieve() {
    let h = harness(&[]);
    let context = r#"{"collection":"handbook","namespace":"acme","chunk_size":40,"chunk_overlap":0}"#;
    let file = "Vacation policy: twenty vacation days.\n\nSalary reviews happen yearly.";

    let (status, body) = send(
        &h.app,
        multipart_request("/rag/ingest-document", "handbook.txt", file, context),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["collection"], "handbook");
    assert_eq!(body["chunks"], 2);

    let (status, hits) = send(
        &h.app,
        json_request(
            "/retrieve/",
            &json!({
                "query": "how many vacation days?",
                "context": { "collection": "handbook", "namespace": "acme", "k": 1 }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let hits = hits.as_array().unwrap_or_else(|| panic!("not an array: {hits}"));
    assert_eq!(hits.len(), 1);
    assert!(hits[0]["content"].as_str().unwrap_or_default().contains("vacation"));
    assert_eq!(hits[0]["metadata"]["source"], "handbook.txt");
    assert!(hits[0]["score"].is_number());
}

#[tokio::test]
async fn test_retrieve_rejects_unknown_context_keys() {
    let h = harness(&[]);

    let (status, body) = send(
        &h.app,
        json_request(
            "/retrieve/",
            &json!({ "query": "x", "context": { "top_k": 3 } }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_ingest_rejects_malformed_context() {
    let h = harness(&[]);

    let (status, body) = send(
        &h.app,
        multipart_request("/rag/ingest-document", "a.txt", "hello", "{oops"),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
    assert_eq!(h.stores.opens(), 0);
}

#[tokio::test]
async fn test_ingest_schema_stores_one_chunk_per_table() {
    let h = harness(&[]);
    let schema = "Database: shop\nTable: users\n  id INTEGER\nTable: orders\n  id INTEGER\n";

    let (status, body) = send(
        &h.app,
        multipart_request("/rag/ingest-schema", "shop.txt", schema, "{}"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["db"], "shop");
    assert_eq!(body["tables"], 2);
    assert_eq!(body["collection"], "schemas");
    let uri = body["uri"].as_str().unwrap_or_default();
    assert!(uri.starts_with("sqlite:///"));
    assert!(Path::new(uri.trim_start_matches("sqlite://")).ends_with("data/shop.db"));
}

#[tokio::test]
async fn test_sql_generate_returns_raw_model_output() {
    let h = harness(&["```sql\nSELECT COUNT(*) FROM users;\n```"]);

    let (status, body) = send(
        &h.app,
        json_request("/sql/generate", &json!({ "question": "how many users?" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "```sql\nSELECT COUNT(*) FROM users;\n```");
    let seen = h.provider.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].model, "qwen3:1.7b");
    assert_eq!(h.stores.opens(), 0);
}

#[tokio::test]
async fn test_sql_generate_requires_question() {
    let h = harness(&[]);

    let (status, _) = send(
        &h.app,
        json_request("/sql/generate", &json!({ "dialect": "postgresql" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_chat_answers_directly() {
    let h = harness(&["Hello! How can I help?"]);

    let (status, body) = send(&h.app, json_request("/chat/", &json!({ "query": "hi" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "Hello! How can I help?" }));
}

#[tokio::test]
async fn test_chat_reports_failure_in_body() {
    let h = harness(&[]);

    let (status, body) = send(
        &h.app,
        json_request("/chat/", &json!({ "query": "anything", "context": { "k": 2 } })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "response": "[ERROR] Supervisor failed" }));
}

#[tokio::test]
async fn test_chat_rejects_missing_query() {
    let h = harness(&[]);

    let (status, body) = send(&h.app, json_request("/chat/", &json!({}))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
    assert!(h.provider.seen().is_empty());
}
