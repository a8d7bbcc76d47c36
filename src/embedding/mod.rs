//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait and an Ollama implementation. The provider
//! is created via [`create_provider`] from configuration. Embedding itself happens in
//! the external provider; this module only enforces the input cap and the call timeout.

pub mod ollama;

use async_trait::async_trait;

use crate::error::MemoryResult;

/// Maximum number of characters submitted for embedding.
pub const MAX_INPUT_CHARS: usize = 2000;

/// Trait for embedding text into vectors.
///
/// Implementations return vectors of a fixed, provider-specific dimension. Failures and
/// timeouts surface as [`MemoryError::Downstream`](crate::error::MemoryError::Downstream).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    async fn embed(&self, text: &str) -> MemoryResult<Vec<f32>>;

    /// Model identifier, for logs and diagnostics.
    fn model(&self) -> &str;
}

/// Truncate `text` to its first `max_chars` characters (not bytes).
pub fn truncate_input(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Create an embedding provider from config.
///
/// Currently only `"ollama"` is supported.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> anyhow::Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "ollama" => {
            let provider = ollama::OllamaEmbeddingProvider::new(config)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: ollama"),
    }
}
