#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::{Context, Result, anyhow, bail};
use async_openai::{Client as OpenAIClient, config::OpenAIConfig, types::CreateEmbeddingRequestArgs};

use crate::{config::EmbeddingEnv, util};

/// Turns text into a fixed-length vector and compares two such vectors.
///
/// Calls may block on network I/O; the grader only ever invokes them from
/// synchronous code.
pub trait Embedder: Send + Sync {
    /// Embeds a single piece of text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Similarity between two embeddings, in `[-1, 1]`.
    fn similarity(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        cosine_similarity(a, b)
    }
}

/// Cosine similarity between two vectors.
///
/// Empty or mismatched vectors are an error. A zero-norm vector has no
/// direction and yields `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.is_empty() || b.is_empty() {
        bail!("Cannot compare empty embeddings");
    }
    if a.len() != b.len() {
        bail!("Embedding dimensions differ ({} vs {})", a.len(), b.len());
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot_product / (norm_a * norm_b))
}

/// Embeddings from an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    /// Configured API client.
    client: OpenAIClient<OpenAIConfig>,
    /// Model identifier sent with every request.
    model:  String,
}

impl OpenAiEmbedder {
    /// Creates an embedder for the configured endpoint, reusing the shared
    /// HTTP client.
    pub fn new(env: &EmbeddingEnv, http_client: reqwest::Client) -> Self {
        let mut config = OpenAIConfig::new().with_api_base(env.api_base().to_owned());
        if let Some(key) = env.api_key() {
            config = config.with_api_key(key.to_owned());
        }

        Self {
            client: OpenAIClient::with_config(config).with_http_client(http_client),
            model:  env.model().to_owned(),
        }
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(text.to_owned())
            .build()
            .context("Failed to build embedding request")?;

        let response = util::block_on(self.client.embeddings().create(request))?
            .with_context(|| format!("Embedding request to model `{}` failed", self.model))?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Embedding response for model `{}` was empty", self.model))?;

        tracing::debug!(model = %self.model, dimensions = embedding.embedding.len(), "embedded text");
        Ok(embedding.embedding)
    }
}
