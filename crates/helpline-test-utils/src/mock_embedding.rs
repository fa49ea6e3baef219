// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding providers.
//!
//! [`MockEmbedding`] derives a deterministic unit vector from the input
//! text, so identical texts embed identically and similar-prefix texts do
//! not -- enough to exercise retrieval ranking without a model.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use helpline_core::{EmbeddingProvider, HelplineError};

/// Embedding dimensionality of the mock.
pub const MOCK_DIM: usize = 8;

/// Deterministic hash-seeded embedding provider.
pub struct MockEmbedding;

impl MockEmbedding {
    pub fn new() -> Self {
        Self
    }

    /// The vector `embed` would produce, exposed so tests can seed an
    /// index with exactly-matching vectors.
    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut seed = hasher.finish();

        // Simple xorshift expansion of the hash into MOCK_DIM components.
        let mut raw = [0f32; MOCK_DIM];
        for slot in raw.iter_mut() {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            *slot = ((seed % 2000) as f32 / 1000.0) - 1.0;
        }

        let norm = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            return raw.to_vec();
        }
        raw.iter().map(|x| x / norm).collect()
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, HelplineError> {
        Ok(Self::vector_for(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, HelplineError> {
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }
}

/// An embedding provider whose every call fails, for exercising the
/// orchestrator's retrieval degradation path.
pub struct FailingEmbedding;

impl FailingEmbedding {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FailingEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, HelplineError> {
        Err(HelplineError::Embedding {
            message: "mock embedding configured to fail".into(),
            source: None,
        })
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, HelplineError> {
        Err(HelplineError::Embedding {
            message: "mock embedding configured to fail".into(),
            source: None,
        })
    }
}
