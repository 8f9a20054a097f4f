//! Service configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::context::DEFAULT_LLM_MODEL;
use crate::error::ConfigError;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Placeholder key; Ollama ignores it but the OpenAI-compatible client sends one.
const DEFAULT_API_KEY: &str = "ollama";
/// Default vector store root directory.
const DEFAULT_PERSIST_DIR: &str = "./vectorstore";
/// Default database registry file.
const DEFAULT_REGISTRY_PATH: &str = "db_registry.json";
/// Default directory for file-backed databases.
const DEFAULT_DATA_DIR: &str = "data";
/// Default sampling temperature for the delegates.
const DEFAULT_ORCHESTRATOR_TEMPERATURE: f32 = 0.2;
/// Default maximum tool-calling loop iterations.
const DEFAULT_MAX_TOOL_ITERATIONS: usize = 10;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the whole service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// LLM provider name (`"openai"` = any OpenAI-compatible API).
    pub provider: String,
    /// Base URL of the Ollama runtime (without `/v1`).
    pub ollama_base_url: String,
    /// API key sent to the runtime.
    pub api_key: String,
    /// Root directory holding one vector store per namespace.
    pub persist_dir: PathBuf,
    /// JSON file mapping logical database names to connection URIs.
    pub registry_path: PathBuf,
    /// Directory for databases without a registry entry.
    pub data_dir: PathBuf,
    /// Model driving the supervisor and both specialist delegates.
    pub orchestrator_model: String,
    /// Sampling temperature for the delegates.
    pub orchestrator_temperature: f32,
    /// Maximum tool-calling loop iterations before aborting.
    pub max_tool_iterations: usize,
    /// Transport timeout for runtime requests.
    pub timeout: Duration,
    /// Directory containing prompt template files.
    ///
    /// Missing files fall back to compiled-in defaults.
    pub prompt_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Creates a new builder for `AppConfig`.
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a resolved value is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::builder().from_env().build()
    }

    /// OpenAI-compatible API base derived from the Ollama URL.
    #[must_use]
    pub fn api_base(&self) -> String {
        format!("{}/v1", self.ollama_base_url.trim_end_matches('/'))
    }
}

/// Builder for [`AppConfig`].
#[derive(Debug, Clone, Default)]
pub struct AppConfigBuilder {
    provider: Option<String>,
    ollama_base_url: Option<String>,
    api_key: Option<String>,
    persist_dir: Option<PathBuf>,
    registry_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    orchestrator_model: Option<String>,
    orchestrator_temperature: Option<f32>,
    max_tool_iterations: Option<usize>,
    timeout: Option<Duration>,
    prompt_dir: Option<PathBuf>,
}

impl AppConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("RAGSQL_PROVIDER").ok();
        }
        if self.ollama_base_url.is_none() {
            self.ollama_base_url = std::env::var("OLLAMA_BASE_URL").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("RAGSQL_API_KEY").ok();
        }
        if self.persist_dir.is_none() {
            self.persist_dir = std::env::var("RAGSQL_PERSIST_DIR").ok().map(PathBuf::from);
        }
        if self.registry_path.is_none() {
            self.registry_path = std::env::var("RAGSQL_DB_REGISTRY").ok().map(PathBuf::from);
        }
        if self.data_dir.is_none() {
            self.data_dir = std::env::var("RAGSQL_DATA_DIR").ok().map(PathBuf::from);
        }
        if self.orchestrator_model.is_none() {
            self.orchestrator_model = std::env::var("RAGSQL_ORCHESTRATOR_MODEL").ok();
        }
        if self.max_tool_iterations.is_none() {
            self.max_tool_iterations = std::env::var("RAGSQL_MAX_TOOL_ITERATIONS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.timeout.is_none() {
            self.timeout = std::env::var("RAGSQL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("RAGSQL_PROMPT_DIR").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the Ollama base URL.
    #[must_use]
    pub fn ollama_base_url(mut self, url: impl Into<String>) -> Self {
        self.ollama_base_url = Some(url.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the vector store root directory.
    #[must_use]
    pub fn persist_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.persist_dir = Some(dir.into());
        self
    }

    /// Sets the database registry path.
    #[must_use]
    pub fn registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = Some(path.into());
        self
    }

    /// Sets the directory for unregistered databases.
    #[must_use]
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Sets the delegate model.
    #[must_use]
    pub fn orchestrator_model(mut self, model: impl Into<String>) -> Self {
        self.orchestrator_model = Some(model.into());
        self
    }

    /// Sets the delegate sampling temperature.
    #[must_use]
    pub const fn orchestrator_temperature(mut self, temperature: f32) -> Self {
        self.orchestrator_temperature = Some(temperature);
        self
    }

    /// Sets the maximum tool-calling loop iterations.
    #[must_use]
    pub const fn max_tool_iterations(mut self, n: usize) -> Self {
        self.max_tool_iterations = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AppConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the iteration limit is zero or the
    /// temperature is outside `0.0..=2.0`.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let max_tool_iterations = self
            .max_tool_iterations
            .unwrap_or(DEFAULT_MAX_TOOL_ITERATIONS);
        if max_tool_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "max_tool_iterations",
                message: "must be at least 1".to_string(),
            });
        }

        let orchestrator_temperature = self
            .orchestrator_temperature
            .unwrap_or(DEFAULT_ORCHESTRATOR_TEMPERATURE);
        if !(0.0..=2.0).contains(&orchestrator_temperature) {
            return Err(ConfigError::Invalid {
                field: "orchestrator_temperature",
                message: format!("{orchestrator_temperature} is outside 0.0..=2.0"),
            });
        }

        Ok(AppConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            ollama_base_url: self
                .ollama_base_url
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            api_key: self.api_key.unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
            persist_dir: self
                .persist_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PERSIST_DIR)),
            registry_path: self
                .registry_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REGISTRY_PATH)),
            data_dir: self
                .data_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            orchestrator_model: self
                .orchestrator_model
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            orchestrator_temperature,
            max_tool_iterations,
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            prompt_dir: self.prompt_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AppConfig::builder()
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.ollama_base_url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.orchestrator_model, "qwen3:1.7b");
        assert!((config.orchestrator_temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.max_tool_iterations, DEFAULT_MAX_TOOL_ITERATIONS);
        assert_eq!(config.registry_path, PathBuf::from("db_registry.json"));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AppConfig::builder()
            .provider("custom")
            .ollama_base_url("http://gpu-box:11434/")
            .orchestrator_model("llama3.2")
            .max_tool_iterations(4)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "custom");
        assert_eq!(config.orchestrator_model, "llama3.2");
        assert_eq!(config.max_tool_iterations, 4);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.api_base(), "http://gpu-box:11434/v1");
    }

    #[test]
    fn test_builder_rejects_zero_iterations() {
        let result = AppConfig::builder().max_tool_iterations(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_out_of_range_temperature() {
        let result = AppConfig::builder().orchestrator_temperature(3.5).build();
        assert!(result.is_err());
    }
}
