//! Offline embedding provider based on feature hashing.

use crate::embeddings::provider::EmbeddingProvider;
use clausal_core::AppResult;

/// Deterministic, dependency-free embeddings.
///
/// Every lowercase word contributes its own hash and the hashes of its
/// boundary-padded character trigrams to a signed bucket; the vector is then
/// L2-normalized. Texts sharing vocabulary land close together, which is
/// enough for offline use and tests. Blank text maps to the zero vector.
#[derive(Debug, Clone)]
pub struct HashProvider {
    model: String,
    dimensions: usize,
}

impl HashProvider {
    pub fn new(model: &str, dimensions: usize) -> Self {
        Self {
            model: model.to_string(),
            dimensions,
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            self.add_feature(&mut vector, word.as_bytes(), 1.0);

            let padded: Vec<char> = std::iter::once('#')
                .chain(word.chars())
                .chain(std::iter::once('#'))
                .collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, trigram.as_bytes(), 0.5);
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }

        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &[u8], weight: f32) {
        let hash = fnv1a(feature);
        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign * weight;
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashProvider {
    fn provider_name(&self) -> &str {
        "hash"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::cosine_similarity;

    fn provider() -> HashProvider {
        HashProvider::new("trigram-v1", 384)
    }

    #[tokio::test]
    async fn test_unit_length() {
        let embedding = provider().embed("Either party may terminate").await.unwrap();
        assert_eq!(embedding.len(), 384);

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_batch_is_one_to_one() {
        let texts = vec![
            "governing law".to_string(),
            "indemnification".to_string(),
            "payment terms".to_string(),
        ];
        let embeddings = provider().embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 3);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let a = provider().embed("late payment fees").await.unwrap();
        let b = provider().embed("late payment fees").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_related_texts_score_higher() {
        let p = provider();
        let query = p.embed("termination of the agreement").await.unwrap();
        let related = p
            .embed("Either party may terminate this agreement with notice")
            .await
            .unwrap();
        let unrelated = p.embed("Invoices are payable in euros").await.unwrap();

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_blank_text_is_zero_vector() {
        let embedding = provider().embed("   ").await.unwrap();
        assert!(embedding.iter().all(|&x| x == 0.0));
    }
}
