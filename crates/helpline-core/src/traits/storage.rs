// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable audit-trail store for conversations and messages.

use async_trait::async_trait;

use crate::error::HelplineError;
use crate::types::{Conversation, MessageRecord, TurnRecord};

/// Transactional store for the conversation audit trail.
///
/// Persistence is a best-effort side effect of a turn: the orchestrator
/// logs failures from `record_turn` without failing the already-produced
/// reply.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persists one completed turn in a single transaction:
    /// create-conversation-if-absent, insert the user and assistant
    /// message pair, and bump the conversation aggregates.
    ///
    /// Concurrent creation for the same session id must be resolved by the
    /// store's uniqueness constraint plus retry-as-fetch, not a lock.
    async fn record_turn(&self, turn: &TurnRecord) -> Result<(), HelplineError>;

    /// Fetches the conversation aggregate for a session id.
    async fn get_conversation(
        &self,
        session_id: &str,
    ) -> Result<Option<Conversation>, HelplineError>;

    /// Marks the conversation closed. Idempotent; closing an absent or
    /// already-closed conversation is a no-op.
    async fn close_conversation(&self, session_id: &str) -> Result<(), HelplineError>;

    /// Messages created at or after `cutoff` (ISO 8601), ascending by
    /// creation time. Used by the quality evaluator, not the hot path.
    async fn messages_since(&self, cutoff: &str) -> Result<Vec<MessageRecord>, HelplineError>;

    /// Conversations started at or after `cutoff` (ISO 8601).
    async fn conversations_since(&self, cutoff: &str)
        -> Result<Vec<Conversation>, HelplineError>;
}
