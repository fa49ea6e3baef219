// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge-base retriever.
//!
//! Embeds the query, runs nearest-neighbor search, converts distances to
//! similarity scores, drops below-threshold candidates, sorts descending,
//! and caches the result for a short TTL.
//!
//! Failures here propagate: whether retrieval is best-effort is the
//! orchestrator's decision, not this component's.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use helpline_core::{
    CacheStore, EmbeddingProvider, HelplineError, MetadataFilter, RetrievedDocument, VectorIndex,
};

/// Retriever over the embedded document knowledge base.
pub struct RagRetriever {
    embedding: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    cache: Arc<dyn CacheStore>,
    top_k: usize,
    score_threshold: f64,
    cache_ttl: Duration,
}

impl RagRetriever {
    pub fn new(
        embedding: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        cache: Arc<dyn CacheStore>,
        top_k: usize,
        score_threshold: f64,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            embedding,
            index,
            cache,
            top_k,
            score_threshold,
            cache_ttl,
        }
    }

    /// Retrieve the documents most similar to `query`, best first.
    ///
    /// Returns an empty list for empty queries and empty indexes. Embedding
    /// and index failures are returned to the caller.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: Option<usize>,
        filter: Option<&MetadataFilter>,
        use_cache: bool,
    ) -> Result<Vec<RetrievedDocument>, HelplineError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(vec![]);
        }

        let n = top_k.unwrap_or(self.top_k);
        let cache_key = format!("rag:{}:{n}", text_hash(trimmed));

        if use_cache
            && let Some(docs) = self.cache_lookup(&cache_key).await
        {
            debug!(query_head = head(trimmed), "retrieval cache hit");
            return Ok(docs);
        }

        let query_vector = self.embedding.embed(trimmed).await?;

        let index_size = self.index.count().await?;
        if index_size == 0 {
            return Ok(vec![]);
        }
        let k = n.min(index_size);

        let matches = self.index.query(&query_vector, k, filter).await?;

        let mut docs: Vec<RetrievedDocument> = matches
            .into_iter()
            .filter_map(|m| {
                // Cosine distance ranges [0, 2]; clamp at zero similarity.
                let score = round4((1.0 - m.distance).max(0.0));
                if score < self.score_threshold {
                    return None;
                }
                let source = source_label(&m.metadata);
                Some(RetrievedDocument {
                    id: m.id,
                    content: m.content,
                    source,
                    score,
                    metadata: m.metadata,
                })
            })
            .collect();

        docs.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        // Empty results are transient (index still filling, threshold too
        // tight for this query); don't pin them in the cache.
        if use_cache && !docs.is_empty() {
            self.cache_store(&cache_key, &docs).await;
        }

        info!(
            query_head = head(trimmed),
            returned = docs.len(),
            "retrieval complete"
        );
        Ok(docs)
    }

    async fn cache_lookup(&self, key: &str) -> Option<Vec<RetrievedDocument>> {
        match self.cache.get(key).await {
            Ok(Some(json)) => serde_json::from_str(&json).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "retrieval cache read failed, treating as miss");
                None
            }
        }
    }

    async fn cache_store(&self, key: &str, docs: &[RetrievedDocument]) {
        let Ok(json) = serde_json::to_string(docs) else {
            return;
        };
        if let Err(e) = self.cache.set(key, &json, self.cache_ttl).await {
            warn!(error = %e, "retrieval cache write failed");
        }
    }
}

/// Source label precedence: `source`, then `title`, then the generic
/// knowledge-base label.
fn source_label(metadata: &serde_json::Value) -> String {
    metadata
        .get("source")
        .and_then(|v| v.as_str())
        .or_else(|| metadata.get("title").and_then(|v| v.as_str()))
        .unwrap_or("知识库")
        .to_string()
}

fn round4(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

fn text_hash(trimmed: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    trimmed.hash(&mut hasher);
    hasher.finish()
}

fn head(text: &str) -> String {
    text.chars().take(30).collect()
}
