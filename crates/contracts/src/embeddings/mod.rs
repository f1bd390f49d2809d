//! Embedding collaborator.
//!
//! Provider-agnostic embedding generation plus the vector helpers used to
//! compare embeddings outside the store.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};

use std::cmp::Ordering;

/// A candidate ranked by [`find_most_similar`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Index into the candidate slice
    pub index: usize,
    pub score: f32,
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// The `top_k` candidates most similar to `query`, best first.
pub fn find_most_similar(query: &[f32], candidates: &[Vec<f32>], top_k: usize) -> Vec<Similarity> {
    let mut scored: Vec<Similarity> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| Similarity {
            index,
            score: cosine_similarity(query, candidate),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(top_k);
    scored
}

/// Whether `embedding` has the expected length and only finite values.
pub fn validate_embedding(embedding: &[f32], dimensions: usize) -> bool {
    embedding.len() == dimensions && embedding.iter().all(|x| x.is_finite())
}
