//! Request-scoped model configuration.
//!
//! A [`ModelContext`] is built fresh for every request, handed by value to
//! exactly one pipeline run and dropped with the response. Deserialization is
//! strict: unknown keys are rejected so that typos surface as errors instead
//! of silently falling back to defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default chat model.
pub const DEFAULT_LLM_MODEL: &str = "qwen3:1.7b";
/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text:latest";
/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Default collection.
pub const DEFAULT_COLLECTION: &str = "default";
/// Default namespace.
pub const DEFAULT_NAMESPACE: &str = "global";
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Default retrieval fan-out.
pub const DEFAULT_K: usize = 5;

/// Model, chunking and routing parameters for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelContext {
    /// Chat model identifier.
    pub llm_model: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Maximum characters per ingested chunk.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Target collection inside the namespace.
    pub collection: String,
    /// Target namespace (one storage directory per namespace).
    pub namespace: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Number of chunks to retrieve.
    pub k: usize,
    /// Free-form metadata merged into every ingested document.
    pub metadata: Map<String, Value>,
}

impl Default for ModelContext {
    fn default() -> Self {
        Self {
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            collection: DEFAULT_COLLECTION.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            k: DEFAULT_K,
            metadata: Map::new(),
        }
    }
}

impl ModelContext {
    /// Parses a context from a JSON object string (e.g. a multipart form field).
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] for malformed JSON, unknown keys or
    /// type mismatches.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Parses a context from an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ModelContext::from_json_str`].
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Applies the keys of a JSON object on top of this context.
    ///
    /// Keys absent from `overrides` keep their current values; unknown keys
    /// and type mismatches are rejected as in [`ModelContext::from_value`].
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if `overrides` is not an object or the
    /// merged object is not a valid context.
    pub fn overlay(&self, overrides: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(overrides) = overrides else {
            return Self::from_value(overrides);
        };
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        merged.extend(overrides);
        Self::from_value(Value::Object(merged))
    }

    /// Serializes the context to compact JSON for prompt injection.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_empty_object_yields_defaults() {
        let ctx = ModelContext::from_json_str("{}").unwrap_or_else(|_| unreachable!());
        assert_eq!(ctx, ModelContext::default());
        assert_eq!(ctx.llm_model, "qwen3:1.7b");
        assert_eq!(ctx.embedding_model, "nomic-embed-text:latest");
        assert_eq!(ctx.chunk_size, 1000);
        assert_eq!(ctx.chunk_overlap, 200);
        assert_eq!(ctx.collection, "default");
        assert_eq!(ctx.namespace, "global");
        assert!((ctx.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(ctx.k, 5);
        assert!(ctx.metadata.is_empty());
    }

    #[test]
    fn test_partial_object_keeps_other_defaults() {
        let ctx = ModelContext::from_value(json!({"collection": "docs", "k": 8}))
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(ctx.collection, "docs");
        assert_eq!(ctx.k, 8);
        assert_eq!(ctx.namespace, DEFAULT_NAMESPACE);
        assert_eq!(ctx.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_overlay_keeps_unmentioned_fields() {
        let base = ModelContext {
            collection: "finance".to_string(),
            namespace: "tenant-9".to_string(),
            ..ModelContext::default()
        };
        let ctx = base
            .overlay(json!({"k": 3}))
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(ctx.k, 3);
        assert_eq!(ctx.collection, "finance");
        assert_eq!(ctx.namespace, "tenant-9");
        assert!((ctx.temperature - base.temperature).abs() < f32::EPSILON);

        let same = base.overlay(json!({})).unwrap_or_else(|_| unreachable!());
        assert_eq!(same, base);
    }

    #[test]
    fn test_overlay_still_rejects_bad_input() {
        let base = ModelContext::default();
        assert!(base.overlay(json!({"top_k": 3})).is_err());
        assert!(base.overlay(json!({"k": "three"})).is_err());
        assert!(base.overlay(json!("finance")).is_err());
    }

    #[test]
    fn test_metadata_is_preserved() {
        let ctx = ModelContext::from_value(json!({"metadata": {"team": "finance", "year": 2024}}))
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(ctx.metadata["team"], "finance");
        assert_eq!(ctx.metadata["year"], 2024);
    }

    #[test_case(r#"{"colection": "typo"}"# ; "unknown field")]
    #[test_case(r#"{"k": "five"}"# ; "string for integer")]
    #[test_case(r#"{"temperature": "hot"}"# ; "string for float")]
    #[test_case(r#"{"metadata": []}"# ; "array for metadata")]
    #[test_case("not json" ; "malformed")]
    fn test_rejected_inputs(raw: &str) {
        assert!(ModelContext::from_json_str(raw).is_err());
    }

    #[test]
    fn test_round_trips_through_prompt_json() {
        let ctx = ModelContext {
            collection: "reports".to_string(),
            ..ModelContext::default()
        };
        let parsed = ModelContext::from_json_str(&ctx.to_json()).unwrap_or_else(|_| unreachable!());
        assert_eq!(parsed, ctx);
    }
}
