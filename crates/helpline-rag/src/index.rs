// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process vector index implementing the [`VectorIndex`] capability.
//!
//! Cosine-distance nearest-neighbor over a flat entry list. Serves tests,
//! the shell, and single-node deployments; larger deployments put a real
//! vector service behind the same trait.

use async_trait::async_trait;
use tokio::sync::RwLock;

use helpline_core::{HelplineError, IndexEntry, IndexMatch, MetadataFilter, VectorIndex};

/// Flat in-memory cosine-distance index.
pub struct MemoryVectorIndex {
    entries: RwLock<Vec<IndexEntry>>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn upsert(&self, new_entries: Vec<IndexEntry>) -> Result<(), HelplineError> {
        let mut entries = self.entries.write().await;
        for entry in new_entries {
            if let Some(existing) = entries.iter_mut().find(|e| e.id == entry.id) {
                *existing = entry;
            } else {
                entries.push(entry);
            }
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>, HelplineError> {
        if k == 0 {
            return Ok(vec![]);
        }
        let entries = self.entries.read().await;

        let mut matches: Vec<IndexMatch> = entries
            .iter()
            .filter(|e| filter.is_none_or(|f| metadata_matches(&e.metadata, f)))
            .filter_map(|e| {
                // Entries with a different dimensionality cannot be compared.
                if e.vector.len() != vector.len() {
                    return None;
                }
                let distance = 1.0 - f64::from(cosine_similarity(vector, &e.vector));
                Some(IndexMatch {
                    id: e.id.clone(),
                    content: e.content.clone(),
                    metadata: e.metadata.clone(),
                    distance,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(k);
        Ok(matches)
    }

    async fn delete_by_metadata(&self, filter: &MetadataFilter) -> Result<usize, HelplineError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| !metadata_matches(&e.metadata, filter));
        Ok(before - entries.len())
    }

    async fn count(&self) -> Result<usize, HelplineError> {
        Ok(self.entries.read().await.len())
    }
}

/// An entry matches when its metadata object contains every key-value pair
/// of the filter.
fn metadata_matches(metadata: &serde_json::Value, filter: &MetadataFilter) -> bool {
    filter
        .iter()
        .all(|(key, expected)| metadata.get(key) == Some(expected))
}

/// Cosine similarity between two vectors of equal length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
