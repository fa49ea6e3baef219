// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Helpline chat backend.
//!
//! This crate provides the domain types, the workspace error enum, and the
//! capability traits (completion, embedding, vector search, cache, durable
//! store) that the orchestration core composes. Concrete capability
//! implementations live in sibling crates and are wired together by the
//! binary at startup.

pub mod error;
pub mod traits;
pub mod types;

pub use error::HelplineError;
pub use types::{
    ChatMessage, ClassifyMethod, Conversation, ConversationStatus, Intent, IntentResult,
    MessageRecord, RetrievedDocument, Role, SourceRef, TokenUsage, TurnEvent, TurnRecord,
    TurnResult,
};

pub use traits::{
    CacheStore, CompletionProvider, ConversationStore, EmbeddingProvider, FragmentStream,
    IndexEntry, IndexMatch, MetadataFilter, VectorIndex,
};
