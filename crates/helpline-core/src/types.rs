// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Helpline workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Role of a message within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// String form used in SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    /// Parse from a storage string. Unknown values map to `System`.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::System,
        }
    }
}

/// One entry in the per-session memory window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Intent categories recognized by the classifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Chitchat,
    Inquiry,
    Complaint,
    AfterSales,
    Escalate,
    Unknown,
}

impl Intent {
    /// String form used in SQLite storage and cache values.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Chitchat => "chitchat",
            Intent::Inquiry => "inquiry",
            Intent::Complaint => "complaint",
            Intent::AfterSales => "after_sales",
            Intent::Escalate => "escalate",
            Intent::Unknown => "unknown",
        }
    }

    /// Parse from a storage string. Unrecognized values map to `Unknown`.
    pub fn from_str_value(s: &str) -> Self {
        match s {
            "chitchat" => Intent::Chitchat,
            "inquiry" => Intent::Inquiry,
            "complaint" => Intent::Complaint,
            "after_sales" => Intent::AfterSales,
            "escalate" => Intent::Escalate,
            _ => Intent::Unknown,
        }
    }
}

/// How an intent classification was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifyMethod {
    /// Keyword rule stage.
    Rule,
    /// LLM fallback stage.
    Llm,
}

/// Result of classifying one user message.
///
/// Immutable, cache-eligible value. Classification never fails: every
/// failure path resolves to a low-confidence result instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    /// Confidence in [0.0, 1.0].
    pub confidence: f64,
    /// Human-readable reason for the classification.
    pub reason: String,
    pub method: ClassifyMethod,
}

impl IntentResult {
    pub fn new(
        intent: Intent,
        confidence: f64,
        reason: impl Into<String>,
        method: ClassifyMethod,
    ) -> Self {
        Self {
            intent,
            confidence,
            reason: reason.into(),
            method,
        }
    }
}

/// A document returned from knowledge-base retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: String,
    pub content: String,
    /// Source label (document title or filename).
    pub source: String,
    /// Similarity score in [0.0, 1.0], derived from the index distance.
    pub score: f64,
    /// Raw metadata from the index.
    pub metadata: serde_json::Value,
}

/// Token usage statistics for one LLM call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Result of one completed conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    pub session_id: String,
    pub reply: String,
    pub intent: Intent,
    pub intent_confidence: f64,
    /// Source labels of the documents that informed the reply.
    pub sources: Vec<String>,
    pub usage: TokenUsage,
    pub latency_ms: u64,
}

/// One frame of a streaming turn.
///
/// A stream yields zero or more `Delta` frames followed by exactly one
/// terminal frame: `Completed` on normal exhaustion, `Error` on failure
/// after the stream opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    Delta { text: String },
    Completed { result: TurnResult },
    Error { message: String },
}

/// Lifecycle status of a durable conversation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Active,
    Closed,
    Escalated,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Active => "active",
            ConversationStatus::Closed => "closed",
            ConversationStatus::Escalated => "escalated",
        }
    }

    pub fn from_str_value(s: &str) -> Self {
        match s {
            "closed" => ConversationStatus::Closed,
            "escalated" => ConversationStatus::Escalated,
            _ => ConversationStatus::Active,
        }
    }
}

/// Durable conversation aggregate, one row per session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub session_id: String,
    pub user_id: Option<String>,
    pub status: ConversationStatus,
    /// Intent of the conversation's first turn; never overwritten.
    pub primary_intent: Intent,
    pub turn_count: i64,
    pub total_tokens: i64,
    /// ISO 8601 timestamps.
    pub started_at: String,
    pub updated_at: String,
}

/// Reference to a retrieval source attached to an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub source: String,
    pub score: f64,
}

/// Immutable audit record of one persisted message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    /// Classification attached to user messages.
    pub intent: Option<Intent>,
    pub intent_confidence: Option<f64>,
    /// Retrieval sources attached to assistant messages.
    pub sources: Vec<SourceRef>,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub latency_ms: Option<u64>,
    /// ISO 8601 creation timestamp; ordering is creation-time ascending.
    pub created_at: String,
}

/// Everything the durable store needs to persist one completed turn.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    pub session_id: String,
    pub user_id: Option<String>,
    pub user_message: String,
    pub assistant_reply: String,
    pub intent: IntentResult,
    pub sources: Vec<SourceRef>,
    pub usage: TokenUsage,
    pub latency_ms: u64,
}
