// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits consumed by the orchestration core.
//!
//! Concrete implementations live in their own crates (`helpline-openai`,
//! `helpline-cache`, `helpline-storage`, ...) and are injected at
//! construction time by the process entry point.

pub mod cache;
pub mod embedding;
pub mod provider;
pub mod storage;
pub mod vector;

pub use cache::CacheStore;
pub use embedding::EmbeddingProvider;
pub use provider::{CompletionProvider, FragmentStream};
pub use storage::ConversationStore;
pub use vector::{IndexEntry, IndexMatch, MetadataFilter, VectorIndex};
