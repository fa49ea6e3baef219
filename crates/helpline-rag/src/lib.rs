// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval-augmented generation for the Helpline chat backend.
//!
//! [`RagRetriever`] embeds the query, asks the vector index for nearest
//! neighbors, converts distances to similarity scores, filters and ranks,
//! and caches results briefly. [`MemoryVectorIndex`] is the in-process
//! index used by tests and single-node deployments.

pub mod index;
pub mod retriever;

pub use index::{cosine_similarity, MemoryVectorIndex};
pub use retriever::RagRetriever;
