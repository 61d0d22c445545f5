//! Embedding provider trait and factory.

use super::providers::{mock::MockProvider, openai::OpenAiEmbeddingProvider};
use pdfqa_core::config::EmbeddingSettings;
use pdfqa_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "openai")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Vector length, when known without calling the service
    fn dimensions(&self) -> Option<usize>;

    /// Generate embeddings for multiple texts in one call.
    ///
    /// The result has the same length and order as `texts`.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from configuration.
pub fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "mock" => Ok(Arc::new(MockProvider::new(settings.dimensions))),

        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI embedding provider requires an API key".to_string())
            })?;
            let mut provider =
                OpenAiEmbeddingProvider::new(api_key)?.with_model(settings.model.clone());
            if let Some(endpoint) = &settings.endpoint {
                provider = provider.with_base_url(endpoint.clone());
            }
            if let Some(timeout) = timeout {
                provider = provider.with_timeout(timeout)?;
            }
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, mock",
            settings.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str) -> EmbeddingSettings {
        EmbeddingSettings {
            provider: provider.to_string(),
            model: "text-embedding-ada-002".to_string(),
            endpoint: None,
            dimensions: 384,
        }
    }

    #[test]
    fn test_create_mock_provider() {
        let provider = create_provider(&settings("mock"), None, None).unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), Some(384));
    }

    #[test]
    fn test_create_openai_provider() {
        let provider = create_provider(&settings("openai"), Some("sk-test"), None).unwrap();
        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model_name(), "text-embedding-ada-002");
        assert_eq!(provider.dimensions(), Some(1536));
    }

    #[test]
    fn test_openai_requires_key() {
        let err = create_provider(&settings("openai"), None, None).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider(&settings("unknown"), None, None);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&settings("mock"), None, None).unwrap();
        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
