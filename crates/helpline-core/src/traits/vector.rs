// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nearest-neighbor search capability over the document knowledge base.
//!
//! The index is a black box to the rest of the system: it stores vectors
//! with their document payloads and answers ranked distance queries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HelplineError;

/// Metadata filter: an entry matches when its metadata object contains
/// every key-value pair of the filter.
pub type MetadataFilter = serde_json::Map<String, serde_json::Value>;

/// One document chunk stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub vector: Vec<f32>,
    pub content: String,
    pub metadata: serde_json::Value,
}

/// One ranked candidate from a nearest-neighbor query.
#[derive(Debug, Clone)]
pub struct IndexMatch {
    pub id: String,
    pub content: String,
    pub metadata: serde_json::Value,
    /// Distance in the index's metric; smaller is more similar.
    pub distance: f64,
}

/// Vector nearest-neighbor search over embedded documents.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Inserts or replaces entries by id.
    async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<(), HelplineError>;

    /// Returns up to `k` candidates ranked by ascending distance.
    ///
    /// An empty index returns an empty list, never an error.
    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>, HelplineError>;

    /// Deletes every entry whose metadata matches the filter; returns the
    /// number of entries removed.
    async fn delete_by_metadata(&self, filter: &MetadataFilter) -> Result<usize, HelplineError>;

    /// Number of entries currently stored.
    async fn count(&self) -> Result<usize, HelplineError>;
}
