#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    sync::{Arc, Mutex, OnceLock, PoisonError},
    time::Duration,
};

use anyhow::{Context, Result};
use reqwest::Client;
use state::InitCell;

use crate::{
    constants::{
        DEFAULT_BIND, DEFAULT_EMBEDDING_ENDPOINT, DEFAULT_EMBEDDING_MODEL, DEFAULT_LANGUAGE,
        DEFAULT_LANGUAGETOOL_URL,
    },
    engines::LanguageTool,
};

/// Embedding endpoint settings sourced from the environment.
#[derive(Clone, Debug)]
pub struct EmbeddingEnv {
    /// Base URL of the OpenAI-compatible API.
    api_base: String,
    /// API key, if the endpoint needs one.
    api_key:  Option<String>,
    /// Embedding model identifier.
    model:    String,
}

impl EmbeddingEnv {
    /// Builds settings from explicit values.
    pub fn new(api_base: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key,
            model: model.into(),
        }
    }

    /// Reads `AIGRADE_EMBEDDING_*`, falling back to `OPENAI_API_KEY` for the
    /// key and to public OpenAI defaults otherwise.
    fn from_env() -> Self {
        let api_base = read_var("AIGRADE_EMBEDDING_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_EMBEDDING_ENDPOINT.to_string());
        let api_key = read_var("AIGRADE_EMBEDDING_API_KEY").or_else(|| read_var("OPENAI_API_KEY"));
        let model =
            read_var("AIGRADE_EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());

        Self::new(api_base, api_key, model)
    }

    /// Returns the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the API key, if configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the embedding model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Runtime configuration shared across the crate.
pub struct ConfigState {
    /// Shared reqwest HTTP client reused by both engines.
    http_client:      Client,
    /// Embedding endpoint settings.
    embedding:        EmbeddingEnv,
    /// LanguageTool server base URL.
    languagetool_url: String,
    /// Language code for grammar checks.
    language:         String,
    /// Socket address the HTTP service binds to.
    bind:             String,
    /// Lazily constructed grammar tool handle.
    language_tool:    InitCell<Arc<LanguageTool>>,
}

impl ConfigState {
    /// Construct a new configuration instance from the environment.
    fn new() -> Result<Self> {
        let timeout = read_timeout_secs("AIGRADE_HTTP_TIMEOUT_SECS", 30);
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to construct shared HTTP client")?;

        Ok(Self {
            http_client,
            embedding: EmbeddingEnv::from_env(),
            languagetool_url: read_var("AIGRADE_LANGUAGETOOL_URL")
                .unwrap_or_else(|| DEFAULT_LANGUAGETOOL_URL.to_string()),
            language: read_var("AIGRADE_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            bind: read_var("AIGRADE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            language_tool: InitCell::new(),
        })
    }

    /// Returns a clone of the shared reqwest HTTP client.
    pub fn http_client(&self) -> Client {
        self.http_client.clone()
    }

    /// Returns the embedding endpoint settings.
    pub fn embedding(&self) -> &EmbeddingEnv {
        &self.embedding
    }

    /// Returns the LanguageTool server URL.
    pub fn languagetool_url(&self) -> &str {
        &self.languagetool_url
    }

    /// Returns the grammar-check language code.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the HTTP bind address.
    pub fn bind(&self) -> &str {
        &self.bind
    }

    /// Returns the process-wide LanguageTool handle, creating it on first
    /// call. The server handshake itself is deferred to the first check.
    pub fn language_tool(&self) -> Arc<LanguageTool> {
        if let Some(tool) = self.language_tool.try_get() {
            return Arc::clone(tool);
        }

        let tool = Arc::new(LanguageTool::new(
            self.languagetool_url(),
            self.language(),
            self.http_client(),
        ));
        // Losing a race here only drops an unused handle.
        self.language_tool.set(tool);
        Arc::clone(self.language_tool.get())
    }
}

/// Shared configuration handle used throughout the crate.
#[derive(Clone)]
pub struct ConfigHandle(Arc<ConfigState>);

impl std::ops::Deref for ConfigHandle {
    type Target = ConfigState;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Global storage for the lazily constructed configuration state.
static CONFIG_SLOT: OnceLock<Mutex<Option<Arc<ConfigState>>>> = OnceLock::new();

/// Returns the mutex guarding the global configuration slot.
fn slot() -> &'static Mutex<Option<Arc<ConfigState>>> {
    CONFIG_SLOT.get_or_init(|| Mutex::new(None))
}

/// Ensure the global configuration has been initialized and return a handle.
pub fn ensure_initialized() -> Result<ConfigHandle> {
    let mut guard = slot().lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(cfg) = guard.as_ref() {
        return Ok(ConfigHandle(Arc::clone(cfg)));
    }

    let cfg = Arc::new(ConfigState::new()?);
    *guard = Some(Arc::clone(&cfg));
    Ok(ConfigHandle(cfg))
}

/// Reads a trimmed, non-empty environment variable.
fn read_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parses an environment variable into a `Duration`, falling back to
/// `default_secs` when parsing fails or the variable is missing.
fn read_timeout_secs(env: &str, default_secs: u64) -> Duration {
    read_var(env)
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default_secs))
}
