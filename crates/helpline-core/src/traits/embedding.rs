// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding capability used for query vectorization and knowledge ingestion.

use async_trait::async_trait;

use crate::error::HelplineError;

/// Text embedding interface over an LLM backend.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single text into a vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, HelplineError>;

    /// Embeds a batch of texts, preserving input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, HelplineError>;
}
