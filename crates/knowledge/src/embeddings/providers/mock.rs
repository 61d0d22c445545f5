//! Offline embedding provider based on hashed character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use pdfqa_core::AppResult;
use std::collections::HashMap;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Deterministic, content-dependent embeddings without a network call.
///
/// Texts sharing words land close under cosine similarity, which is enough to
/// exercise the pipeline offline. The vectors carry no real semantics.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let lower = text.to_lowercase();
        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let slot = hash_chars(window, 37) % self.dimensions;
                embedding[slot] += (*freq as f32).sqrt();
            }

            let slot = hash_chars(&chars, 31) % self.dimensions;
            embedding[slot] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

fn hash_chars(chars: &[char], multiplier: u64) -> usize {
    chars
        .iter()
        .fold(0u64, |acc, c| acc.wrapping_mul(multiplier).wrapping_add(*c as u64)) as usize
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.dimensions)
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_unit_norm_and_dimensions() {
        let provider = MockProvider::new(384);
        let embedding = provider.embed("annual leave policy").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_batch_matches_single_calls() {
        let provider = MockProvider::new(128);
        let texts = vec!["hello world".to_string(), "rust programming".to_string()];
        let batch = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], provider.embed("hello world").await.unwrap());
        assert_eq!(batch[1], provider.embed("rust programming").await.unwrap());
    }

    #[tokio::test]
    async fn test_shared_words_score_higher() {
        let provider = MockProvider::new(384);
        let leave = provider.embed("Employees receive twenty days of annual leave").await.unwrap();
        let parking = provider.embed("Parking permits are issued by facilities").await.unwrap();
        let query = provider.embed("How many days of annual leave?").await.unwrap();

        assert!(cosine(&query, &leave) > cosine(&query, &parking));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = MockProvider::new(16);
        let embedding = provider.embed("").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_non_ascii_text() {
        let provider = MockProvider::new(64);
        let embedding = provider.embed("Gamedex é um aplicativo brasileiro 🎮").await.unwrap();
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }
}
